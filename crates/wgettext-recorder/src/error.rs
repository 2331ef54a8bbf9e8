use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    /// Neither the primary nor the pid-qualified output file could be created.
    #[error("cannot create output file {}: {source}", path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write to output file failed: {0}")]
    Write(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecorderError>;

use thiserror::Error;
use wgettext_recorder::RecorderError;

#[derive(Error, Debug)]
pub enum ShimError {
    /// No later definition in the search order. Forwarding would recurse
    /// into ourselves, so the shim was loaded out of order.
    #[error("next definition of `{symbol}` not found; is the shim preloaded ahead of the i18n library?")]
    Resolution { symbol: &'static str },

    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

pub type Result<T> = std::result::Result<T, ShimError>;

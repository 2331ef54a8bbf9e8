//! Output file ownership.
//!
//! The file is created exclusively as `watch-gettext-<prog>.po`. If that name
//! is taken (a previous run, or a sibling process with the same name) the
//! pid-qualified name is used instead and truncated unconditionally.

use std::ffi::CStr;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use wgettext_config::{log_sink_debug, log_sink_info, WatchConfig};

use crate::error::{RecorderError, Result};

pub struct PoSink {
    path: PathBuf,
    out: BufWriter<File>,
}

impl PoSink {
    /// Create the output file for `program` in the configured directory.
    pub fn create(config: &WatchConfig, program: &str, pid: u32) -> Result<Self> {
        let primary = config.output_path(program, None);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&primary)
        {
            Ok(file) => return Ok(Self::from_file(primary, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                log_sink_debug!(
                    "Output name taken, using pid-qualified name",
                    path = tracing::field::display(primary.display())
                );
            }
            Err(source) => {
                return Err(RecorderError::SinkOpen {
                    path: primary,
                    source,
                })
            }
        }

        let fallback = config.output_path(program, Some(pid));
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&fallback)
            .map_err(|source| RecorderError::SinkOpen {
                path: fallback.clone(),
                source,
            })?;
        Ok(Self::from_file(fallback, file))
    }

    fn from_file(path: PathBuf, file: File) -> Self {
        log_sink_info!(
            "Recording gettext lookups",
            path = tracing::field::display(path.display())
        );
        Self {
            path,
            out: BufWriter::new(file),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for PoSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.out.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl Drop for PoSink {
    fn drop(&mut self) {
        let _ = self.out.flush();
    }
}

/// Write the leading comment block.
pub fn write_header<W: Write>(
    out: &mut W,
    generated: &str,
    program: &str,
    pid: u32,
) -> io::Result<()> {
    writeln!(out, "# wrap-gettext pseudo-po file")?;
    writeln!(out, "# generated: {}", generated)?;
    writeln!(out, "# program: {}", program)?;
    writeln!(out, "# pid: {}", pid)?;
    out.flush()
}

/// Current local time in `asctime` layout, without the trailing newline.
pub fn asctime_now() -> String {
    // SAFETY: localtime_r and strftime only touch the buffers passed in.
    unsafe {
        let now = libc::time(std::ptr::null_mut());
        let mut tm: libc::tm = std::mem::zeroed();
        if libc::localtime_r(&now, &mut tm).is_null() {
            return format!("@{}", now);
        }
        let mut buf = [0 as libc::c_char; 64];
        let written = libc::strftime(
            buf.as_mut_ptr(),
            buf.len(),
            c"%a %b %e %H:%M:%S %Y".as_ptr(),
            &tm,
        );
        if written == 0 {
            return format!("@{}", now);
        }
        CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
    }
}

/// Short name of the running program, as `program_invocation_short_name`
/// would report it.
pub fn program_short_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name().map(|n| n.to_os_string()))
        .or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.file_name().map(|n| n.to_os_string()))
        })
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

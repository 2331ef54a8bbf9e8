//! Structured logging for the watch-gettext crates.
//!
//! Everything goes to stderr with a `component` field. Stdout belongs to the
//! host program and is never touched.
//!
//! # Usage
//!
//! ```ignore
//! use wgettext_config::{log_shim_info, log_sink_warn};
//!
//! log_shim_info!("Shim loaded", pid = 1234);
//! log_sink_warn!("Write failed", error = tracing::field::display(&err));
//! ```

/// Component identifiers for log filtering
pub struct Component;

impl Component {
    pub const SHIM: &'static str = "SHIM";
    pub const SINK: &'static str = "SINK";
    pub const PO: &'static str = "PO";
}

// === SHIM logging macros ===

#[macro_export]
macro_rules! log_shim_error {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::error!(component = "SHIM", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_shim_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = "SHIM", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_shim_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = "SHIM", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_shim_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "SHIM", $($key = $value,)* $msg)
    };
}

// === SINK logging macros ===

#[macro_export]
macro_rules! log_sink_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = "SINK", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_sink_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = "SINK", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_sink_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "SINK", $($key = $value,)* $msg)
    };
}

// === PO logging macros ===

#[macro_export]
macro_rules! log_po_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "PO", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_po_trace {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::trace!(component = "PO", $($key = $value,)* $msg)
    };
}

/// Install a stderr subscriber filtered by `filter`.
///
/// Falls back to `warn` if the directive does not parse. Returns `false` when
/// a global subscriber was already installed; that is not an error since the
/// host may have set up its own.
pub fn init_logging(filter: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new(crate::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

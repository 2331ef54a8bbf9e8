//! Process-wide recorder, installed at load and taken at unload.

use wgettext_config::{log_shim_debug, log_shim_error, log_shim_info, log_shim_warn, WatchConfig};
use wgettext_recorder::sink::{asctime_now, program_short_name, write_header};
use wgettext_recorder::{Backtracer, PoSink, Recorder, RecorderError, RecorderSlot, ReentryGuard};

use crate::error::{Result, ShimError};
use crate::reals::current_textdomain;

/// Exported names the backtrace skips past.
pub(crate) const ENTRY_POINTS: &[&str] = &["dcgettext", "dcngettext"];

pub(crate) type ShimRecorder = Recorder<PoSink, Backtracer>;

pub(crate) static STATE: RecorderSlot<PoSink, Backtracer> = RecorderSlot::new();

fn init_recorder(config: &WatchConfig) -> Result<ShimRecorder> {
    let program = program_short_name();
    let pid = std::process::id();

    let mut sink = PoSink::create(config, &program, pid)?;
    if let Err(err) = write_header(&mut sink, &asctime_now(), &program, pid) {
        log_shim_warn!(
            "Failed to write header",
            error = tracing::field::display(RecorderError::Write(err))
        );
    }

    let stack = Backtracer::new(config.stack_depth, config.stack_skip).with_anchors(ENTRY_POINTS);
    Ok(Recorder::new(sink, stack).with_default_domain(current_textdomain))
}

/// Report an unrecoverable error and abort before the host sees anything
/// wrong.
pub(crate) fn fatal(err: ShimError) -> ! {
    log_shim_error!("watch-gettext cannot continue", error = tracing::field::display(&err));
    std::process::abort()
}

/// Library load: logging, config, output file, header.
pub(crate) fn load() {
    let Some(_guard) = ReentryGuard::enter() else {
        return;
    };

    let config = wgettext_config::config();
    wgettext_config::logging::init_logging(&config.log_filter);
    for (var, value) in &config.rejected {
        log_shim_warn!("Ignoring invalid value", var = *var, value = value.as_str());
    }
    log_shim_debug!(
        "Configuration",
        stack_depth = config.stack_depth,
        stack_skip = config.stack_skip
    );

    let recorder = init_recorder(config).unwrap_or_else(|err| fatal(err));
    log_shim_info!(
        "Shim loaded",
        pid = std::process::id(),
        output = tracing::field::display(recorder.writer().path().display())
    );
    STATE.install(recorder);
}

/// Library unload: drop the recorder, flushing the file.
pub(crate) fn unload() {
    let _guard = ReentryGuard::enter();
    let Some(recorder) = STATE.take() else {
        return;
    };
    log_shim_info!(
        "Shim unloading",
        messages = recorder.messages() as u64,
        calls = recorder.calls(),
        write_failures = recorder.write_failures()
    );
    drop(recorder);
}

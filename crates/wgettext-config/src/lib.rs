//! # wgettext-config
//!
//! Configuration for the watch-gettext shim.
//!
//! The shim runs inside somebody else's process, so there are no config
//! files: everything comes from environment variables read once at load time.
//!
//! | variable | meaning |
//! |---|---|
//! | `WATCH_GETTEXT_DIR` | directory for the `.po` output (default: cwd) |
//! | `WATCH_GETTEXT_LOG` | `tracing` filter for shim diagnostics (default: `warn`) |
//! | `WATCH_GETTEXT_STACK_DEPTH` | frames written per stanza (default: 3) |
//! | `WATCH_GETTEXT_STACK_SKIP` | fallback count of shim frames to drop (default: 3) |

pub mod logging;

use once_cell::sync::Lazy;
use std::path::PathBuf;

pub const ENV_DIR: &str = "WATCH_GETTEXT_DIR";
pub const ENV_LOG: &str = "WATCH_GETTEXT_LOG";
pub const ENV_STACK_DEPTH: &str = "WATCH_GETTEXT_STACK_DEPTH";
pub const ENV_STACK_SKIP: &str = "WATCH_GETTEXT_STACK_SKIP";

pub const DEFAULT_LOG_FILTER: &str = "warn";
pub const DEFAULT_STACK_DEPTH: usize = 3;
pub const DEFAULT_STACK_SKIP: usize = 3;
pub const MAX_STACK_DEPTH: usize = 64;

/// Output file name prefix; the full name is `watch-gettext-<prog>[-<pid>].po`.
pub const OUTPUT_PREFIX: &str = "watch-gettext";

/// Global config instance
static CONFIG: Lazy<WatchConfig> = Lazy::new(WatchConfig::from_env);

/// Get global config (read once, immutable afterwards)
pub fn config() -> &'static WatchConfig {
    &CONFIG
}

/// Shim configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Directory the output file is created in. `None` means the current directory.
    pub output_dir: Option<PathBuf>,
    /// `EnvFilter` directive for diagnostics on stderr.
    pub log_filter: String,
    /// Maximum number of frames written under each stanza.
    pub stack_depth: usize,
    /// Frames dropped from the top of the stack when the interposer frame
    /// cannot be located by name.
    pub stack_skip: usize,
    /// Variables whose values were present but rejected. Reported once
    /// logging is up.
    pub rejected: Vec<(&'static str, String)>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            stack_depth: DEFAULT_STACK_DEPTH,
            stack_skip: DEFAULT_STACK_SKIP,
            rejected: Vec::new(),
        }
    }
}

impl WatchConfig {
    /// Load config from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut config = WatchConfig::default();

        if let Some(dir) = get(ENV_DIR) {
            config.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(filter) = get(ENV_LOG) {
            config.log_filter = filter;
        }
        if let Some(raw) = get(ENV_STACK_DEPTH) {
            match raw.trim().parse::<usize>() {
                Ok(n) => config.stack_depth = n.clamp(1, MAX_STACK_DEPTH),
                Err(_) => config.rejected.push((ENV_STACK_DEPTH, raw)),
            }
        }
        if let Some(raw) = get(ENV_STACK_SKIP) {
            match raw.trim().parse::<usize>() {
                Ok(n) => config.stack_skip = n,
                Err(_) => config.rejected.push((ENV_STACK_SKIP, raw)),
            }
        }

        config
    }

    /// Path of the output file for `program`. With `pid`, the collision
    /// fallback name `watch-gettext-<program>-<pid>.po` is produced.
    pub fn output_path(&self, program: &str, pid: Option<u32>) -> PathBuf {
        let name = match pid {
            Some(pid) => format!("{}-{}-{}.po", OUTPUT_PREFIX, program, pid),
            None => format!("{}-{}.po", OUTPUT_PREFIX, program),
        };
        match &self.output_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

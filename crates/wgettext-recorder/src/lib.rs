//! # wgettext-recorder
//!
//! Turns intercepted gettext lookups into a PO-shaped log.
//!
//! Each distinct message gets a reference number the first time it is seen
//! and exactly one stanza in the output file:
//!
//! ```text
//! #. [1] dcgettext()
//! #: app:0x55d0c0de1234
//! # main+0x2a [0x55d0c0de0f2a]
//! msgid "Hello"
//! msgstr "Bonjour"
//! ```
//!
//! The shim crate owns the process-wide [`RecorderSlot`]; everything here is
//! plain data and `io::Write`, so it can be driven directly from tests.

pub mod context;
pub mod error;
pub mod po;
pub mod recorder;
pub mod registry;
pub mod sink;
pub mod slot;
pub mod stack;
pub mod testing;

pub use context::split_context;
pub use error::{RecorderError, Result};
pub use recorder::{Lookup, Recorded, Recorder};
pub use registry::MessageRegistry;
pub use sink::PoSink;
pub use slot::{RecorderSlot, ReentryGuard};
pub use stack::{Backtracer, StackSource};

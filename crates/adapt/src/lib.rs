//! # adapt
//!
//! Annotate-and-abort error propagation.
//!
//! A function that may fail returns [`SigResult`]. Inside it, each fallible
//! step is written once with [`check!`], which annotates the failure with
//! the call site and a message and aborts the function. A [`Boundary`]
//! higher up turns whatever was raised into the shape its caller needs:
//! a typed error, a message on a channel, a process exit status, or an
//! errno. [`exit_if!`] marks failures that should end the process however
//! many typed boundaries sit in between.
//!
//! ## Modules
//!
//! - `macros` - `check!`, `assert_that!`, `exit_if!`, `boundary!`, `info!`, `uerr!`
//! - `raise` - `#[track_caller]` function forms of the primitives
//! - `recover` - Boundary converters and error sinks
//! - `kprint` - Leveled stderr logging with a replaceable sink
//! - `config` - `ADAPT_*` environment settings
//!
//! ## Quick Start
//!
//! ```rust
//! use adapt::{check, exit_if, recover_to_exit, Errno, SigResult};
//! use std::fs;
//!
//! fn run(path: &str) -> SigResult<usize> {
//!     let r = exit_if!(fs::read(path), Errno::EACCES, "no access to {}", path);
//!     let bytes = check!(r, "reading {}", path);
//!     Ok(bytes.len())
//! }
//!
//! let status = recover_to_exit(|| run("/nonexistent/input.bin")).unwrap_err();
//! assert_eq!(status.code, libc::ENOENT);
//! assert!(status.message.contains("reading /nonexistent/input.bin"));
//! ```

mod macros;
pub mod kprint;
pub mod config;
pub mod raise;
pub mod recover;

// ── Public API ────────────────────────────────────────────────────

pub use adapt_core::*;

pub use kprint::{reset_sink, set_flush_enabled, set_log_level, set_sink, LogLevel};
pub use config::{set_debug, Settings};
pub use raise::{assert_that, assert_that_with, check, check_with, exit_if, exit_if_with, OrRaise};
pub use recover::{
    recover_to_channel, recover_to_error, recover_to_exit, unpanic, Boundary, ErrorSink,
    ExitStatus,
};

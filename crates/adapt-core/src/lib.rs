//! # adapt-core
//!
//! Leaf data types for the `adapt` error-propagation framework.
//!
//! This crate has no logging and never touches the process. It defines
//! what gets raised and how a raised chain is read back.
//!
//! ## Modules
//!
//! - `origin` - Call-site provenance (`file:line`)
//! - `context` - Fields shared by every framework link
//! - `error` - `StructuredError`, the ordinary chain node
//! - `signal` - `ExitSignal`, `Signal` payload, `SigResult`
//! - `chain` - Head-first traversal, rendering, status extraction
//! - `codes` - errno extraction and the default status
//! - `target` - Chain-aware equality (`Sentinel`, `Errno`, `io::ErrorKind`)
//!
//! ## Quick Start
//!
//! ```rust
//! use adapt_core::{extract_status, Origin, StructuredError};
//! use std::io;
//!
//! let err = StructuredError::raised(
//!     Origin::new("src/main.rs", 12),
//!     "opening /etc/app.toml",
//!     io::Error::from_raw_os_error(libc::ENOENT),
//! );
//!
//! assert_eq!(extract_status(&err), libc::ENOENT);
//! assert!(err.format().starts_with("src/main.rs:12: opening /etc/app.toml: "));
//! assert!(err.short_message().starts_with("opening /etc/app.toml: "));
//! ```

mod origin;
mod context;
mod error;
mod signal;
mod target;
pub mod chain;
pub mod codes;

// ── Public API ────────────────────────────────────────────────────

pub use origin::Origin;
pub use context::{Cause, ErrorContext};
pub use error::StructuredError;
pub use signal::{ExitSignal, SigResult, Signal};
pub use target::{ChainTarget, Predicate, Sentinel};
pub use chain::{
    build_chain, chain_contains, extract_errno, extract_status, find_match, find_status,
    format_chain, preceding_match, short_message, Chain, Link, MAX_CHAIN_DEPTH,
};
pub use codes::{DEFAULT_ERRNO, DEFAULT_STATUS};

// Re-exported so callers can name errno targets without depending on nix.
pub use nix::errno::Errno;

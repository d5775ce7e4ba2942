//! Call-site provenance for raised errors.
//!
//! An `Origin` is the `file:line` of the primitive that raised a signal.
//! Macros build it from `file!()`/`line!()`; functions build it from
//! [`Origin::caller`] under `#[track_caller]`, so the recorded location is
//! the caller's and never a frame inside this crate.
//!
//! ```text
//! src/main.rs:42: opening config: No such file or directory (os error 2)
//! └─────┬─────┘   └──────┬──────┘ └───────────────┬────────────────────┘
//!     origin          message                  cause
//! ```

use core::fmt;
use core::panic::Location;

/// Source location captured when a signal is raised.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub file: &'static str,
    pub line: u32,
}

impl Origin {
    /// Build an origin from explicit parts.
    ///
    /// ```
    /// use adapt_core::Origin;
    /// let origin = Origin::new("src/lib.rs", 7);
    /// assert_eq!(origin.to_string(), "src/lib.rs:7");
    /// ```
    #[inline]
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Location of the caller of the nearest `#[track_caller]` frame.
    #[inline]
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&'static Location<'static>> for Origin {
    fn from(loc: &'static Location<'static>) -> Self {
        Self::new(loc.file(), loc.line())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Origin")
            .field("file", &self.file)
            .field("line", &self.line)
            .finish()
    }
}

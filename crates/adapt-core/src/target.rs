//! Chain-aware equality: what `exit_if!` looks for in a chain.

use std::error::Error;
use std::fmt;
use std::io;

use nix::errno::Errno;

use crate::chain::Link;
use crate::codes;

/// Something a chain link can be compared against.
///
/// A chain contains a target when [`is_match`](ChainTarget::is_match)
/// holds for any link, head included.
pub trait ChainTarget {
    fn is_match(&self, link: &(dyn Error + 'static)) -> bool;
}

impl<T: ChainTarget + ?Sized> ChainTarget for &T {
    fn is_match(&self, link: &(dyn Error + 'static)) -> bool {
        (**self).is_match(link)
    }
}

// ── Sentinel ──────────────────────────────────────────────────────

/// A named, comparable error value meant to be declared as a `const`.
///
/// ```
/// use adapt_core::{chain_contains, Sentinel, StructuredError};
///
/// const FOO_ERROR: Sentinel = Sentinel::new("foo error");
///
/// let err = StructuredError::new("loading").wrap("").wrap("outer");
/// assert!(!chain_contains(&err, &FOO_ERROR));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Sentinel {
    name: &'static str,
}

impl Sentinel {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sentinel({:?})", self.name)
    }
}

impl Error for Sentinel {}

impl ChainTarget for Sentinel {
    fn is_match(&self, link: &(dyn Error + 'static)) -> bool {
        link.downcast_ref::<Sentinel>() == Some(self)
    }
}

// ── System codes ──────────────────────────────────────────────────

impl ChainTarget for Errno {
    fn is_match(&self, link: &(dyn Error + 'static)) -> bool {
        match Link::classify(link) {
            Link::Foreign(err) => codes::system_errno(err) == Some(*self),
            framework => framework.status() == Some(*self as i32),
        }
    }
}

impl ChainTarget for io::ErrorKind {
    fn is_match(&self, link: &(dyn Error + 'static)) -> bool {
        link.downcast_ref::<io::Error>()
            .map_or(false, |err| err.kind() == *self)
    }
}

// ── Ad hoc ────────────────────────────────────────────────────────

/// Closure-backed target.
///
/// ```
/// use adapt_core::{chain_contains, Predicate, StructuredError};
///
/// let err = StructuredError::new("disk full").wrap("saving");
/// let full = Predicate(|e: &(dyn std::error::Error + 'static)| e.to_string().contains("full"));
/// assert!(chain_contains(&err, &full));
/// ```
pub struct Predicate<F>(pub F);

impl<F> ChainTarget for Predicate<F>
where
    F: Fn(&(dyn Error + 'static)) -> bool,
{
    fn is_match(&self, link: &(dyn Error + 'static)) -> bool {
        (self.0)(link)
    }
}

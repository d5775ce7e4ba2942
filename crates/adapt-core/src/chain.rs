//! Walking a chain of wrapped causes.
//!
//! A chain starts at a head error and follows `source()` until it runs
//! out. Order is always head first: the most recent annotation comes
//! first, the original failure last.
//!
//! ```text
//! head ──source()──▶ link ──source()──▶ ... ──source()──▶ root cause
//!  [0]                [1]                                   [n-1]
//! ```
//!
//! Framework links are acyclic by construction, but a foreign error can
//! implement `source()` any way it likes, so every walk stops after
//! [`MAX_CHAIN_DEPTH`] links.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use nix::errno::Errno;

use crate::codes::{self, DEFAULT_ERRNO, DEFAULT_STATUS};
use crate::target::ChainTarget;
use crate::{ExitSignal, Origin, Signal, StructuredError};

/// Upper bound on links visited by any walk.
pub const MAX_CHAIN_DEPTH: usize = 1 << 16;

const SEPARATOR: &str = ": ";

// ── Link ──────────────────────────────────────────────────────────

/// One link of a chain, classified.
#[derive(Copy, Clone)]
pub enum Link<'a> {
    Error(&'a StructuredError),
    Exit(&'a ExitSignal),
    Foreign(&'a (dyn Error + 'static)),
}

impl<'a> Link<'a> {
    /// Classify an error. A [`Signal`] is seen through to what it carries.
    pub fn classify(err: &'a (dyn Error + 'static)) -> Self {
        if let Some(e) = err.downcast_ref::<StructuredError>() {
            return Link::Error(e);
        }
        if let Some(s) = err.downcast_ref::<ExitSignal>() {
            return Link::Exit(s);
        }
        match err.downcast_ref::<Signal>() {
            Some(Signal::Error(e)) => Link::Error(e),
            Some(Signal::Exit(s)) => Link::Exit(s),
            None => Link::Foreign(err),
        }
    }

    pub fn as_error(&self) -> &'a (dyn Error + 'static) {
        match *self {
            Link::Error(e) => e,
            Link::Exit(s) => s,
            Link::Foreign(f) => f,
        }
    }

    pub fn is_framework(&self) -> bool {
        !matches!(self, Link::Foreign(_))
    }

    pub fn origin(&self) -> Option<&'a Origin> {
        match *self {
            Link::Error(e) => e.origin(),
            Link::Exit(s) => s.origin(),
            Link::Foreign(_) => None,
        }
    }

    /// This link's own text. Foreign links render with `Display`.
    pub fn message(&self) -> Cow<'a, str> {
        match *self {
            Link::Error(e) => Cow::Borrowed(e.message()),
            Link::Exit(s) => Cow::Borrowed(s.message()),
            Link::Foreign(f) => Cow::Owned(f.to_string()),
        }
    }

    /// Explicit status of a framework link, or the raw system code of a
    /// foreign one.
    pub fn status(&self) -> Option<i32> {
        match *self {
            Link::Error(e) => e.status(),
            Link::Exit(s) => s.status(),
            Link::Foreign(f) => codes::system_errno(f).map(|errno| errno as i32),
        }
    }

    /// Typed form of [`status`](Self::status).
    pub fn errno(&self) -> Option<Errno> {
        match *self {
            Link::Foreign(f) => codes::system_errno(f),
            framework => framework.status().map(Errno::from_raw),
        }
    }

    fn next(&self) -> Option<&'a (dyn Error + 'static)> {
        self.as_error().source()
    }
}

impl fmt::Debug for Link<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Link::Error(_) => "Error",
            Link::Exit(_) => "Exit",
            Link::Foreign(_) => "Foreign",
        };
        f.debug_struct("Link")
            .field("kind", &kind)
            .field("origin", &self.origin())
            .field("message", &self.message())
            .field("status", &self.status())
            .finish()
    }
}

// ── Chain ─────────────────────────────────────────────────────────

/// Iterator over the links of a chain, head first, bounded by
/// [`MAX_CHAIN_DEPTH`].
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
    remaining: usize,
}

impl<'a> Chain<'a> {
    pub fn new(head: &'a (dyn Error + 'static)) -> Self {
        Self {
            next: Some(head),
            remaining: MAX_CHAIN_DEPTH,
        }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = Link<'a>;

    fn next(&mut self) -> Option<Link<'a>> {
        if self.remaining == 0 {
            return None;
        }
        let link = Link::classify(self.next?);
        self.remaining -= 1;
        self.next = link.next();
        Some(link)
    }
}

/// All links of `err`, most recent first.
pub fn build_chain<'a>(err: &'a (dyn Error + 'static)) -> Vec<Link<'a>> {
    Chain::new(err).collect()
}

// ── Rendering ─────────────────────────────────────────────────────

/// Write the chain as `": "`-joined segments, skipping empty ones.
///
/// Each link contributes its origin (when `with_origin`) and its own
/// message.
pub fn write_chain(
    f: &mut fmt::Formatter<'_>,
    err: &(dyn Error + 'static),
    with_origin: bool,
) -> fmt::Result {
    let mut first = true;
    let mut segment = |f: &mut fmt::Formatter<'_>, text: &dyn fmt::Display| -> fmt::Result {
        if !first {
            f.write_str(SEPARATOR)?;
        }
        first = false;
        write!(f, "{}", text)
    };

    for link in Chain::new(err) {
        if with_origin {
            if let Some(origin) = link.origin() {
                segment(f, origin)?;
            }
        }
        let message = link.message();
        if !message.is_empty() {
            segment(f, &message)?;
        }
    }
    Ok(())
}

struct Rendered<'a> {
    head: &'a (dyn Error + 'static),
    with_origin: bool,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_chain(f, self.head, self.with_origin)
    }
}

/// Full rendering with provenance at every level.
pub fn format_chain(err: &(dyn Error + 'static)) -> String {
    Rendered { head: err, with_origin: true }.to_string()
}

/// Messages only; provenance omitted at every level.
pub fn short_message(err: &(dyn Error + 'static)) -> String {
    Rendered { head: err, with_origin: false }.to_string()
}

// ── Codes ─────────────────────────────────────────────────────────

/// First code found walking from the head, if any.
pub fn find_status(err: &(dyn Error + 'static)) -> Option<i32> {
    Chain::new(err).find_map(|link| link.status())
}

/// First code found walking from the head, else [`DEFAULT_STATUS`].
pub fn extract_status(err: &(dyn Error + 'static)) -> i32 {
    find_status(err).unwrap_or(DEFAULT_STATUS)
}

/// Typed variant of [`extract_status`]: first match wins, else
/// [`DEFAULT_ERRNO`].
pub fn extract_errno(err: &(dyn Error + 'static)) -> Errno {
    Chain::new(err)
        .find_map(|link| link.errno())
        .unwrap_or(DEFAULT_ERRNO)
}

// ── Matching ──────────────────────────────────────────────────────

/// Index of the first link matching `target`.
pub fn find_match<T>(err: &(dyn Error + 'static), target: &T) -> Option<usize>
where
    T: ChainTarget + ?Sized,
{
    Chain::new(err).position(|link| target.is_match(link.as_error()))
}

/// `true` when `err` or any of its causes matches `target`.
pub fn chain_contains<T>(err: &(dyn Error + 'static), target: &T) -> bool
where
    T: ChainTarget + ?Sized,
{
    find_match(err, target).is_some()
}

/// The link immediately before the first match, or the match itself when
/// it is the head. `None` when nothing matches.
pub fn preceding_match<'a, T>(err: &'a (dyn Error + 'static), target: &T) -> Option<Link<'a>>
where
    T: ChainTarget + ?Sized,
{
    let mut previous: Option<Link<'a>> = None;
    for link in Chain::new(err) {
        if target.is_match(link.as_error()) {
            return Some(previous.unwrap_or(link));
        }
        previous = Some(link);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ErrorContext;
    use crate::Sentinel;
    use proptest::prelude::*;
    use std::io;

    const FOO_ERROR: Sentinel = Sentinel::new("foo error");

    /// Foreign error with its own cause, like a library error type.
    #[derive(Debug)]
    struct MidError {
        bottom: io::Error,
    }

    impl fmt::Display for MidError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("lower error")
        }
    }

    impl Error for MidError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.bottom)
        }
    }

    /// Foreign error whose `source()` points back at itself.
    #[derive(Debug)]
    struct Cyclic;

    impl fmt::Display for Cyclic {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("cyclic")
        }
    }

    impl Error for Cyclic {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(self)
        }
    }

    fn sample() -> StructuredError {
        let mid = MidError { bottom: io::Error::other("bottom error") };
        StructuredError::raised(Origin::new("a.rs", 1), "", mid)
            .wrap("annotation")
    }

    fn deep(depth: usize) -> StructuredError {
        let mut err = StructuredError::raised(
            Origin::new("leaf.rs", 1),
            "leaf",
            io::Error::from_raw_os_error(libc::ENOENT),
        );
        for i in 1..depth {
            err = StructuredError::from_context(
                ErrorContext::new(format!("level {}", i)).with_cause(err),
            );
        }
        err
    }

    #[test]
    fn build_chain_is_head_first() {
        let err = sample();
        let chain = build_chain(&err);
        assert_eq!(chain.len(), 4, "chain: {:?}", chain);
        assert!(matches!(chain[0], Link::Error(_)));
        assert_eq!(chain[0].message(), "annotation");
        assert!(matches!(chain[1], Link::Error(_)));
        assert_eq!(chain[2].message(), "lower error");
        assert_eq!(chain[3].message(), "bottom error");
    }

    #[test]
    fn format_and_short() {
        let err = sample();
        assert_eq!(format_chain(&err), "annotation: a.rs:1: lower error: bottom error");
        assert_eq!(short_message(&err), "annotation: lower error: bottom error");
    }

    #[test]
    fn signal_is_transparent() {
        let sig = Signal::from(sample());
        assert_eq!(build_chain(&sig).len(), 4);
        assert_eq!(short_message(&sig), "annotation: lower error: bottom error");
    }

    #[test]
    fn status_first_match_wins() {
        let err = StructuredError::raised(
            Origin::new("a.rs", 1),
            "outer",
            io::Error::from_raw_os_error(libc::EPIPE),
        );
        assert_eq!(find_status(&err), Some(libc::EPIPE));

        let err = err.with_status(3);
        assert_eq!(extract_status(&err), 3);
        assert_eq!(extract_errno(&err), Errno::from_raw(3));
    }

    #[test]
    fn status_defaults() {
        let err = StructuredError::new("no code").wrap("outer");
        assert_eq!(find_status(&err), None);
        assert_eq!(extract_status(&err), DEFAULT_STATUS);
        assert_eq!(extract_errno(&err), DEFAULT_ERRNO);
    }

    #[test]
    fn errno_through_foreign_links() {
        let mid = MidError { bottom: io::Error::from_raw_os_error(libc::EACCES) };
        let err = StructuredError::raised(Origin::new("a.rs", 1), "", mid);
        assert_eq!(extract_errno(&err), Errno::EACCES);
    }

    #[test]
    fn contains_anywhere() {
        let err = StructuredError::raised(Origin::new("a.rs", 1), "", FOO_ERROR)
            .wrap("")
            .wrap("top");
        assert!(chain_contains(&err, &FOO_ERROR));
        assert_eq!(find_match(&err, &FOO_ERROR), Some(3));
        assert!(!chain_contains(&err, &Sentinel::new("other")));
        assert!(!chain_contains(&err, &Errno::EPIPE));
    }

    #[test]
    fn preceding_link_of_match() {
        let err = StructuredError::raised(Origin::new("a.rs", 1), "opening", FOO_ERROR);
        let link = preceding_match(&err, &FOO_ERROR).expect("match");
        assert_eq!(link.message(), "opening");

        let link = preceding_match(&FOO_ERROR, &FOO_ERROR).expect("head match");
        assert_eq!(link.message(), "foo error");

        assert!(preceding_match(&err, &Errno::ENOENT).is_none());
    }

    #[test]
    fn cyclic_foreign_chain_terminates() {
        assert_eq!(Chain::new(&Cyclic).count(), MAX_CHAIN_DEPTH);
        assert_eq!(find_status(&Cyclic), None);
        assert!(!chain_contains(&Cyclic, &FOO_ERROR));
    }

    #[test]
    fn ten_thousand_links() {
        let err = deep(10_000);
        assert_eq!(build_chain(&err).len(), 10_001);
        assert_eq!(extract_status(&err), libc::ENOENT);
        assert!(short_message(&err).starts_with("level 9999: level 9998"));
        drop(err);
    }

    proptest! {
        #[test]
        fn target_found_at_any_depth(hops in 0usize..64) {
            let mut head = StructuredError::raised(Origin::new("p.rs", 1), "", FOO_ERROR);
            for _ in 0..hops {
                head = head.wrap("hop");
            }
            prop_assert!(chain_contains(&head, &FOO_ERROR));
            prop_assert_eq!(find_match(&head, &FOO_ERROR), Some(hops + 1));
        }

        #[test]
        fn absent_target_never_matches(depth in 1usize..64) {
            let err = deep(depth);
            prop_assert!(!chain_contains(&err, &FOO_ERROR));
            prop_assert!(chain_contains(&err, &Errno::ENOENT));
        }

        #[test]
        fn walk_length_is_depth(depth in 1usize..2_000) {
            let err = deep(depth);
            prop_assert_eq!(Chain::new(&err).count(), depth + 1);
        }
    }
}

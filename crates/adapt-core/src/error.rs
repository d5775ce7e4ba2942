use std::error::Error;
use std::fmt;

use crate::chain;
use crate::context::{Cause, ErrorContext};
use crate::Origin;

/// Ordinary error-chain node: provenance, message, cause and an optional
/// status code.
///
/// Created by the annotation primitives at the raise site and by boundary
/// converters when they re-wrap an intercepted error. Immutable once built.
///
/// `Display` renders the whole chain with provenance (see [`format`]);
/// `source()` is the wrapped cause, so any `std::error::Error` walker sees
/// the same chain as [`Chain`](crate::Chain).
///
/// [`format`]: StructuredError::format
pub struct StructuredError {
    ctx: ErrorContext,
}

// ── Constructors ──────────────────────────────────────────────────

impl StructuredError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_context(ErrorContext::new(message))
    }

    /// Create an error from a pre-built context.
    ///
    /// Prefer the `check!`/`assert_that!` macros of the `adapt` crate.
    pub fn from_context(ctx: ErrorContext) -> Self {
        Self { ctx }
    }

    /// Error raised at `origin`, annotating `cause`.
    pub fn raised<E>(origin: Origin, message: impl Into<String>, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::from_context(
            ErrorContext::new(message)
                .with_origin(origin)
                .with_cause(cause),
        )
    }

    /// Wrap `self` as the cause of a new link carrying `message` and no
    /// provenance. This is what a boundary converter stores.
    pub fn wrap(self, message: impl Into<String>) -> Self {
        Self::from_context(ErrorContext::new(message).with_cause(self))
    }

    /// Same as `with_status` on the context, for already built errors.
    pub fn with_status(mut self, status: i32) -> Self {
        self.ctx.status = Some(status);
        self
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl StructuredError {
    #[inline]
    pub fn origin(&self) -> Option<&Origin> {
        self.ctx.origin.as_ref()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.ctx.message
    }

    #[inline]
    pub fn status(&self) -> Option<i32> {
        self.ctx.status
    }

    /// The wrapped cause, if any.
    #[inline]
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.ctx.cause.as_deref()
    }

    pub fn context(&self) -> &ErrorContext {
        &self.ctx
    }

    pub(crate) fn context_mut(&mut self) -> &mut ErrorContext {
        &mut self.ctx
    }

    /// Detach and return the cause, leaving this link without one.
    pub fn take_cause(&mut self) -> Option<Cause> {
        self.ctx.cause.take()
    }

    /// Attempt to downcast the direct cause to a concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.ctx.cause.as_ref()?.downcast_ref::<E>()
    }

    /// `"<origin>: <message>: <cause>"` over the whole chain, empty
    /// segments and their separators omitted.
    pub fn format(&self) -> String {
        chain::format_chain(self)
    }

    /// Like [`format`](Self::format) without provenance at any level.
    pub fn short_message(&self) -> String {
        chain::short_message(self)
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl Error for StructuredError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.ctx.cause.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

// ── Display / Debug ───────────────────────────────────────────────

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        chain::write_chain(f, self, true)
    }
}

impl fmt::Debug for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredError")
            .field("context", &self.ctx)
            .finish()
    }
}

impl Drop for StructuredError {
    fn drop(&mut self) {
        self.ctx.unlink();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn raised_keeps_cause_and_origin() {
        let origin = Origin::new("lib.rs", 10);
        let err = StructuredError::raised(origin, "reading", io::Error::from_raw_os_error(2));
        assert_eq!(err.origin(), Some(&origin));
        assert_eq!(err.message(), "reading");
        assert!(err.downcast_ref::<io::Error>().is_some());
        assert!(err.source().is_some());
    }

    #[test]
    fn format_all_segments() {
        let err = StructuredError::raised(
            Origin::new("lib.rs", 10),
            "reading",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.format(), "lib.rs:10: reading: gone");
        assert_eq!(err.to_string(), err.format());
    }

    #[test]
    fn format_skips_empty_segments() {
        let err = StructuredError::new("");
        assert_eq!(err.format(), "");

        let err = StructuredError::new("only message");
        assert_eq!(err.format(), "only message");

        let err = StructuredError::raised(Origin::new("x.rs", 1), "", io::Error::other("low"));
        assert_eq!(err.format(), "x.rs:1: low");
    }

    #[test]
    fn wrap_has_no_origin() {
        let inner = StructuredError::raised(Origin::new("x.rs", 1), "inner", io::Error::other("low"));
        let outer = inner.wrap("annotation");
        assert!(outer.origin().is_none());
        assert_eq!(outer.format(), "annotation: x.rs:1: inner: low");
        assert_eq!(outer.short_message(), "annotation: inner: low");
    }

    #[test]
    fn wrap_with_empty_annotation() {
        let outer = StructuredError::new("inner").wrap("");
        assert_eq!(outer.format(), "inner");
        assert!(outer.cause().is_some());
    }

    #[test]
    fn explicit_zero_status() {
        let err = StructuredError::new("done").with_status(0);
        assert_eq!(err.status(), Some(0));
        assert_eq!(StructuredError::new("done").status(), None);
    }

    #[test]
    fn take_cause_detaches() {
        let mut err = StructuredError::new("a").wrap("b");
        let cause = err.take_cause();
        assert!(cause.is_some());
        assert!(err.cause().is_none());
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<StructuredError>();
    }
}

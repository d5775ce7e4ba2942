//! Annotation primitives as plain functions.
//!
//! Each function here records its caller as the origin through
//! `#[track_caller]`, so `check(r)?` reports the line that wrote it. The
//! macros in this crate expand to the `*_at` variants with
//! `file!()`/`line!()` instead.

use std::error::Error;

use adapt_core::{chain, ChainTarget, ExitSignal, Origin, SigResult, Signal, StructuredError};

const ASSERTION_FAILED: &str = "assertion failed";

fn join(annotation: &str, text: &str) -> String {
    match (annotation.is_empty(), text.is_empty()) {
        (true, _) => text.to_string(),
        (false, true) => annotation.to_string(),
        (false, false) => format!("{}: {}", annotation, text),
    }
}

// ── Check ─────────────────────────────────────────────────────────

#[doc(hidden)]
pub fn check_at<T, E>(result: Result<T, E>, origin: Origin, annotation: String) -> Result<T, StructuredError>
where
    E: Error + Send + Sync + 'static,
{
    result.map_err(|err| StructuredError::raised(origin, annotation, err))
}

/// `Ok` value, or a [`StructuredError`] raised here with `err` as cause.
///
/// ```
/// use adapt::{check, SigResult};
///
/// fn port(text: &str) -> SigResult<u16> {
///     check(text.parse::<u16>())
/// }
///
/// assert_eq!(port("8080").unwrap(), 8080);
/// assert!(port("http").is_err());
/// ```
#[track_caller]
pub fn check<T, E>(result: Result<T, E>) -> SigResult<T>
where
    E: Error + Send + Sync + 'static,
{
    check_with(result, String::new())
}

#[track_caller]
pub fn check_with<T, E>(result: Result<T, E>, annotation: impl Into<String>) -> SigResult<T>
where
    E: Error + Send + Sync + 'static,
{
    let origin = Origin::caller();
    check_at(result, origin, annotation.into()).map_err(Signal::from)
}

// ── Assert ────────────────────────────────────────────────────────

#[doc(hidden)]
pub fn assert_at(cond: bool, origin: Origin, annotation: String) -> Result<(), StructuredError> {
    if cond {
        return Ok(());
    }
    let message = join(ASSERTION_FAILED, &annotation);
    Err(StructuredError::from_context(
        adapt_core::ErrorContext::new(message).with_origin(origin),
    ))
}

#[track_caller]
pub fn assert_that(cond: bool) -> SigResult<()> {
    assert_that_with(cond, String::new())
}

#[track_caller]
pub fn assert_that_with(cond: bool, annotation: impl Into<String>) -> SigResult<()> {
    let origin = Origin::caller();
    assert_at(cond, origin, annotation.into()).map_err(Signal::from)
}

// ── Exit classification ───────────────────────────────────────────

/// `Ok(result)` unless `result` is an error whose chain contains `target`.
///
/// The raised signal's message is `annotation` joined with the text of the
/// link just before the match. A match at the head adds no text of its
/// own, since it is rendered as the cause.
#[doc(hidden)]
pub fn exit_if_at<T, E, G>(
    result: Result<T, E>,
    target: &G,
    origin: Origin,
    annotation: String,
) -> Result<Result<T, E>, ExitSignal>
where
    E: Error + Send + Sync + 'static,
    G: ChainTarget + ?Sized,
{
    let err = match result {
        Ok(value) => return Ok(Ok(value)),
        Err(err) => err,
    };
    let message = match chain::find_match(&err, target) {
        None => return Ok(Err(err)),
        // The matched error is the cause and renders its own text.
        Some(0) => annotation,
        Some(_) => match chain::preceding_match(&err, target) {
            Some(link) => join(&annotation, &link.message()),
            None => annotation,
        },
    };
    Err(ExitSignal::raised(origin, message, Box::new(err)))
}

/// Raise an [`ExitSignal`] when `result` failed with `target` in its chain.
///
/// Otherwise `result` comes back untouched, so the caller can still
/// `check` or propagate it.
///
/// ```
/// use adapt::{exit_if, Errno, Signal, SigResult};
/// use std::io;
///
/// fn write_all() -> SigResult<()> {
///     let r: io::Result<()> = Err(io::Error::from_raw_os_error(libc::EPIPE));
///     let _ = exit_if(r, &Errno::EPIPE)?;
///     Ok(())
/// }
///
/// assert!(matches!(write_all(), Err(Signal::Exit(_))));
/// ```
#[track_caller]
pub fn exit_if<T, E, G>(result: Result<T, E>, target: &G) -> SigResult<Result<T, E>>
where
    E: Error + Send + Sync + 'static,
    G: ChainTarget + ?Sized,
{
    exit_if_with(result, target, String::new())
}

#[track_caller]
pub fn exit_if_with<T, E, G>(
    result: Result<T, E>,
    target: &G,
    annotation: impl Into<String>,
) -> SigResult<Result<T, E>>
where
    E: Error + Send + Sync + 'static,
    G: ChainTarget + ?Sized,
{
    let origin = Origin::caller();
    exit_if_at(result, target, origin, annotation.into()).map_err(Signal::from)
}

// ── Unwinding ─────────────────────────────────────────────────────

/// Abort by unwinding instead of returning.
///
/// For frames whose signature is fixed (trait methods, callbacks) and
/// cannot hand a [`Signal`] back. Only a boundary converter catches it.
pub trait OrRaise<T> {
    fn or_raise(self) -> T;
}

impl<T> OrRaise<T> for SigResult<T> {
    fn or_raise(self) -> T {
        match self {
            Ok(value) => value,
            Err(sig) => sig.raise(),
        }
    }
}

impl<T> OrRaise<T> for Result<T, StructuredError> {
    fn or_raise(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => Signal::from(err).raise(),
        }
    }
}

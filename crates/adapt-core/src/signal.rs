//! Exit-class errors and the abort payload.
//!
//! A [`Signal`] is what an annotation primitive raises. It travels either
//! as the `Err` of a [`SigResult`] or, when a frame cannot return it, as the
//! payload of an unwind started by [`Signal::raise`]. Boundary converters
//! recognise both carriers; anything else is left alone.

use std::any::Any;
use std::error::Error;
use std::fmt;

use crate::chain;
use crate::context::{Cause, ErrorContext};
use crate::{Origin, StructuredError};

/// "Stop the process with a derived status": skips every typed-error
/// boundary and is absorbed only by an rc+message converter.
pub struct ExitSignal {
    ctx: ErrorContext,
}

impl ExitSignal {
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_context(ErrorContext::new(message))
    }

    pub fn from_context(ctx: ErrorContext) -> Self {
        Self { ctx }
    }

    /// Exit signal raised at `origin` because `cause` matched a target.
    pub fn raised(origin: Origin, message: impl Into<String>, cause: Cause) -> Self {
        Self::from_context(
            ErrorContext::new(message)
                .with_origin(origin)
                .with_boxed_cause(cause),
        )
    }

    /// Forward through a boundary: new link, `self` as cause.
    pub fn wrap(self, message: impl Into<String>) -> Self {
        Self::from_context(ErrorContext::new(message).with_cause(self))
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.ctx.status = Some(status);
        self
    }

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

    pub fn format(&self) -> String {
        chain::format_chain(self)
    }

    pub fn short_message(&self) -> String {
        chain::short_message(self)
    }
}

impl Error for ExitSignal {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.ctx.cause.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl fmt::Display for ExitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        chain::write_chain(f, self, true)
    }
}

impl fmt::Debug for ExitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitSignal")
            .field("context", &self.ctx)
            .finish()
    }
}

impl Drop for ExitSignal {
    fn drop(&mut self) {
        self.ctx.unlink();
    }
}

// ── Signal ────────────────────────────────────────────────────────

/// The framework's abort payload.
#[derive(Debug)]
pub enum Signal {
    /// Ordinary propagated error.
    Error(StructuredError),
    /// Exit-class signal.
    Exit(ExitSignal),
}

/// Result of a function body that may raise.
pub type SigResult<T> = Result<T, Signal>;

impl Signal {
    /// Unwind the current stack with `self` as payload.
    ///
    /// Uses `resume_unwind`, so no panic hook runs and nothing is printed.
    /// Only a boundary converter (or another `catch_unwind`) stops it.
    pub fn raise(self) -> ! {
        std::panic::resume_unwind(Box::new(self))
    }

    /// Classify an unwind payload: ours, or handed back untouched.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Result<Signal, Box<dyn Any + Send>> {
        payload.downcast::<Signal>().map(|sig| *sig)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Signal::Exit(_))
    }

    /// Box the inner error or exit signal so it can become a cause.
    pub fn into_cause(self) -> Cause {
        match self {
            Signal::Error(err) => Box::new(err),
            Signal::Exit(sig) => Box::new(sig),
        }
    }

    /// The signal viewed as the head of its chain.
    pub fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        match self {
            Signal::Error(err) => err,
            Signal::Exit(sig) => sig,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Error(err) => fmt::Display::fmt(err, f),
            Signal::Exit(sig) => fmt::Display::fmt(sig, f),
        }
    }
}

impl Error for Signal {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Signal::Error(err) => err.source(),
            Signal::Exit(sig) => sig.source(),
        }
    }
}

impl From<StructuredError> for Signal {
    fn from(err: StructuredError) -> Self {
        Signal::Error(err)
    }
}

impl From<ExitSignal> for Signal {
    fn from(sig: ExitSignal) -> Self {
        Signal::Exit(sig)
    }
}

use std::error::Error;

use crate::Origin;

/// Boxed cause stored in a chain link.
pub type Cause = Box<dyn Error + Send + Sync + 'static>;

/// Fields shared by [`StructuredError`](crate::StructuredError) and
/// [`ExitSignal`](crate::ExitSignal).
///
/// Built once at the raise site and never mutated after it is wrapped
/// into a signal.
#[derive(Default)]
pub struct ErrorContext {
    // ── Provenance ────────────────────────────────────────────
    /// `None` for links added by a boundary converter.
    pub origin:  Option<Origin>,

    // ── Text ──────────────────────────────────────────────────
    /// Already formatted; empty means "no annotation".
    pub message: String,

    // ── Chain ─────────────────────────────────────────────────
    pub cause:   Option<Cause>,

    // ── Status ────────────────────────────────────────────────
    /// Explicit status code. `None` is "unset", `Some(0)` is a real zero.
    pub status:  Option<i32>,
}

impl ErrorContext {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_cause<E>(mut self, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(error));
        self
    }

    /// Attach an already boxed cause without boxing it twice.
    pub fn with_boxed_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.status = Some(status);
        self
    }

    /// Detach the cause and, if it is a framework link, its own cause too,
    /// until the chain is flat. Keeps drop depth constant for long chains.
    pub(crate) fn unlink(&mut self) {
        let mut next = self.cause.take();
        while let Some(cause) = next {
            next = match cause.downcast::<crate::StructuredError>() {
                Ok(mut err) => err.context_mut().cause.take(),
                Err(cause) => match cause.downcast::<crate::ExitSignal>() {
                    Ok(mut sig) => sig.context_mut().cause.take(),
                    Err(_foreign) => None,
                },
            };
        }
    }
}

impl core::fmt::Debug for ErrorContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut d = f.debug_struct("ErrorContext");

        if let Some(origin) = &self.origin {
            d.field("origin", &format_args!("{}", origin));
        }
        if !self.message.is_empty() {
            d.field("message", &self.message);
        }
        if let Some(status) = self.status {
            d.field("status", &status);
        }
        if let Some(cause) = &self.cause {
            d.field("cause", &crate::chain::format_chain(cause.as_ref()));
        }

        d.finish()
    }
}

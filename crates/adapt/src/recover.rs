//! Boundary converters.
//!
//! A [`Boundary`] runs a body that may raise and turns whatever it raised
//! into one output shape: a typed error, a message on a channel, an exit
//! status, or an errno. Both carriers are intercepted: a [`Signal`]
//! returned as `Err`, and a `Signal` unwinding out of the body after
//! [`Signal::raise`]. Any other panic passes through with its original
//! payload.
//!
//! Every conversion wraps the intercepted chain in one new link holding
//! the boundary annotation, even when that annotation is empty. An
//! [`ExitSignal`] is never absorbed by the typed-error or channel forms:
//! it is wrapped and raised again by unwinding until an exit-style
//! boundary takes it.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;

use adapt_core::{chain, Errno, ExitSignal, SigResult, Signal, StructuredError};

use crate::config;

// ── Error sinks ───────────────────────────────────────────────────

/// Destination for errors converted by [`Boundary::to_channel`].
pub trait ErrorSink {
    /// Hand `err` over without blocking, or give it back when the sink is
    /// full or nobody is listening.
    fn deliver(&self, err: StructuredError) -> Result<(), StructuredError>;
}

impl ErrorSink for crossbeam_channel::Sender<StructuredError> {
    fn deliver(&self, err: StructuredError) -> Result<(), StructuredError> {
        self.try_send(err).map_err(|e| e.into_inner())
    }
}

impl ErrorSink for mpsc::Sender<StructuredError> {
    fn deliver(&self, err: StructuredError) -> Result<(), StructuredError> {
        self.send(err).map_err(|e| e.0)
    }
}

impl ErrorSink for mpsc::SyncSender<StructuredError> {
    fn deliver(&self, err: StructuredError) -> Result<(), StructuredError> {
        self.try_send(err).map_err(|e| match e {
            mpsc::TrySendError::Full(err) | mpsc::TrySendError::Disconnected(err) => err,
        })
    }
}

impl<S: ErrorSink + ?Sized> ErrorSink for &S {
    fn deliver(&self, err: StructuredError) -> Result<(), StructuredError> {
        (**self).deliver(err)
    }
}

// ── Exit status ───────────────────────────────────────────────────

/// What a process should exit with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitStatus {
    pub code: i32,
    pub message: String,
}

impl ExitStatus {
    /// Print the message (when there is one) and end the process.
    pub fn exit(self) -> ! {
        if !self.message.is_empty() {
            crate::kprintln!("{}", self.message);
        }
        std::process::exit(self.code)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "exit status {}", self.code)
        } else {
            write!(f, "exit status {}: {}", self.code, self.message)
        }
    }
}

// ── Boundary ──────────────────────────────────────────────────────

/// A recovery point with the annotation it adds to what it intercepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Boundary {
    annotation: String,
}

impl Boundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotated(annotation: impl Into<String>) -> Self {
        Self { annotation: annotation.into() }
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Run `body`, yielding its value or the typed error it raised.
    ///
    /// ```
    /// use adapt::{boundary, check, StructuredError};
    ///
    /// fn parse(text: &str) -> Result<u16, StructuredError> {
    ///     boundary!("parsing {}", text).to_error(|| Ok(check!(text.parse::<u16>())))
    /// }
    ///
    /// assert_eq!(parse("80").unwrap(), 80);
    /// assert!(parse("eighty").unwrap_err().short_message().starts_with("parsing eighty: "));
    /// ```
    pub fn to_error<T, F>(self, body: F) -> Result<T, StructuredError>
    where
        F: FnOnce() -> SigResult<T>,
    {
        match intercept(body) {
            Ok(value) => Ok(value),
            Err(Signal::Error(err)) => Err(err.wrap(self.annotation)),
            Err(Signal::Exit(sig)) => self.forward(sig),
        }
    }

    /// Run `body`; on error deliver it to `sink` and yield `None`.
    ///
    /// Delivery never blocks: a full sink, or one with no receiver left,
    /// drops the error after a warning.
    pub fn to_channel<T, S, F>(self, sink: &S, body: F) -> Option<T>
    where
        S: ErrorSink + ?Sized,
        F: FnOnce() -> SigResult<T>,
    {
        match intercept(body) {
            Ok(value) => Some(value),
            Err(Signal::Error(err)) => {
                if let Err(lost) = sink.deliver(err.wrap(self.annotation)) {
                    crate::kwarn!("error sink full or closed, dropping: {}", lost.short_message());
                }
                None
            }
            Err(Signal::Exit(sig)) => self.forward(sig),
        }
    }

    /// Run `body`, turning anything it raised into an exit code and
    /// message. Exit signals are absorbed here.
    ///
    /// The message is the full rendering for errors. Exit signals render
    /// without provenance unless `ADAPT_DEBUG` is set.
    pub fn to_exit<T, F>(self, body: F) -> Result<T, ExitStatus>
    where
        F: FnOnce() -> SigResult<T>,
    {
        intercept(body).map_err(|sig| {
            let (code, message) = self.settle(sig);
            ExitStatus { code, message }
        })
    }

    /// Like [`to_exit`](Self::to_exit) but with a typed errno, the message
    /// going to `log` instead.
    pub fn unpanic<T, L, F>(self, log: L, body: F) -> Result<T, Errno>
    where
        L: FnOnce(&str),
        F: FnOnce() -> SigResult<T>,
    {
        intercept(body).map_err(|sig| {
            let head = self.absorb(sig);
            let errno = chain::extract_errno(head.as_error());
            log(&render(&head));
            errno
        })
    }

    fn absorb(self, sig: Signal) -> Signal {
        match sig {
            Signal::Error(err) => Signal::Error(err.wrap(self.annotation)),
            Signal::Exit(sig) => Signal::Exit(sig.wrap(self.annotation)),
        }
    }

    fn settle(self, sig: Signal) -> (i32, String) {
        let head = self.absorb(sig);
        (chain::extract_status(head.as_error()), render(&head))
    }

    fn forward(self, sig: ExitSignal) -> ! {
        let status = chain::find_status(&sig);
        crate::kdebug!(
            "exit signal crossing boundary {:?}: {}",
            self.annotation,
            sig.short_message()
        );
        let mut sig = sig.wrap(self.annotation);
        if let Some(code) = status {
            sig = sig.with_status(code);
        }
        Signal::Exit(sig).raise()
    }
}

fn render(head: &Signal) -> String {
    match head {
        Signal::Error(err) => err.format(),
        Signal::Exit(sig) if config::debug_enabled() => sig.format(),
        Signal::Exit(sig) => sig.short_message(),
    }
}

/// Run `body`, folding an unwinding [`Signal`] into its `Err`. Foreign
/// panics resume with their own payload.
fn intercept<T, F>(body: F) -> SigResult<T>
where
    F: FnOnce() -> SigResult<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => result,
        Err(payload) => match Signal::from_payload(payload) {
            Ok(sig) => Err(sig),
            Err(foreign) => panic::resume_unwind(foreign),
        },
    }
}

// ── Shorthands ────────────────────────────────────────────────────

pub fn recover_to_error<T, F>(body: F) -> Result<T, StructuredError>
where
    F: FnOnce() -> SigResult<T>,
{
    Boundary::new().to_error(body)
}

pub fn recover_to_channel<T, S, F>(sink: &S, body: F) -> Option<T>
where
    S: ErrorSink + ?Sized,
    F: FnOnce() -> SigResult<T>,
{
    Boundary::new().to_channel(sink, body)
}

pub fn recover_to_exit<T, F>(body: F) -> Result<T, ExitStatus>
where
    F: FnOnce() -> SigResult<T>,
{
    Boundary::new().to_exit(body)
}

pub fn unpanic<T, L, F>(log: L, body: F) -> Result<T, Errno>
where
    L: FnOnce(&str),
    F: FnOnce() -> SigResult<T>,
{
    Boundary::new().unpanic(log, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kprint::capture::Captured;
    use crate::kprint::LogLevel;
    use crate::raise::OrRaise;
    use crate::{assert_that, boundary, check, exit_if, Origin, Sentinel};
    use std::any::Any;
    use std::io;
    use std::thread;

    const FOO_ERROR: Sentinel = Sentinel::new("foo error");

    fn open(path: &str) -> io::Result<()> {
        let _ = path;
        Err(io::Error::from_raw_os_error(libc::ENOENT))
    }

    // Three frames deep: low-level failure, annotated at each level.
    fn read_config(path: &str) -> SigResult<()> {
        check!(open(path), "open {}", path);
        Ok(())
    }

    fn load(path: &str) -> SigResult<()> {
        check!(boundary!("load").to_error(|| read_config(path)));
        Ok(())
    }

    fn start(path: &str) -> SigResult<()> {
        check!(recover_to_error(|| load(path)), "start");
        Ok(())
    }

    #[test]
    fn three_level_chain_to_exit() {
        let status = recover_to_exit(|| start("/etc/app.toml")).unwrap_err();
        assert_eq!(status.code, libc::ENOENT);
        assert!(status.message.contains("open /etc/app.toml"), "got {}", status.message);
        assert!(status.message.contains("load"), "got {}", status.message);
        assert!(status.message.contains(": start: "), "got {}", status.message);
    }

    #[test]
    fn success_passes_value() {
        assert_eq!(recover_to_error(|| Ok(5)).unwrap(), 5);
        assert_eq!(recover_to_exit(|| Ok("done")).unwrap(), "done");
        let (tx, _rx) = crossbeam_channel::unbounded::<StructuredError>();
        assert_eq!(recover_to_channel(&tx, || Ok(1)), Some(1));
    }

    #[test]
    fn to_error_always_wraps() {
        let err = recover_to_error::<(), _>(|| Err(StructuredError::new("inner").into())).unwrap_err();
        assert_eq!(err.message(), "");
        assert!(err.origin().is_none());
        assert_eq!(err.cause().map(|e| e.to_string()), Some("inner".to_string()));
        assert_eq!(err.short_message(), "inner");
    }

    #[test]
    fn assertion_to_exit() {
        let status = recover_to_exit(|| -> SigResult<()> {
            assert_that!(false, "foo {}", "bar");
            Ok(())
        })
        .unwrap_err();
        assert_eq!(status.code, 1);
        assert!(status.message.ends_with("assertion failed: foo bar"), "got {}", status.message);
    }

    #[test]
    fn unwinding_carrier_is_intercepted() {
        fn deep() -> u32 {
            let r: SigResult<u32> = Err(StructuredError::new("deep failure").into());
            r.or_raise()
        }
        let err = boundary!("outer").to_error(|| Ok(deep())).unwrap_err();
        assert_eq!(err.short_message(), "outer: deep failure");
    }

    #[test]
    fn exit_signal_skips_typed_boundaries() {
        fn mid() -> Result<(), StructuredError> {
            recover_to_error(|| -> SigResult<()> {
                let r: io::Result<()> = Err(io::Error::from_raw_os_error(libc::EPIPE));
                let _ = exit_if!(r, Errno::EPIPE, "pipeline {} error", 7);
                Ok(())
            })
        }
        fn outer() -> Result<(), StructuredError> {
            boundary!("outer").to_error(|| {
                check!(mid(), "unreachable");
                Ok(())
            })
        }

        let _cap = Captured::start(LogLevel::Off);
        let status = recover_to_exit(|| -> SigResult<()> {
            check!(outer());
            Ok(())
        })
        .unwrap_err();
        assert_eq!(status.code, libc::EPIPE);
        assert!(status.message.starts_with("outer: pipeline 7 error"), "got {}", status.message);
        assert!(!status.message.contains("unreachable"));
    }

    #[test]
    fn debug_renders_exit_provenance() {
        let _cap = Captured::start(LogLevel::Off);
        config::set_debug(true);
        let status = recover_to_exit(|| -> SigResult<()> {
            let _ = exit_if!(Err::<(), _>(FOO_ERROR), FOO_ERROR, "stop");
            Ok(())
        })
        .unwrap_err();
        assert!(status.message.contains(file!()), "got {}", status.message);
        assert_eq!(status.code, 1);
    }

    #[test]
    fn exit_signal_default_status() {
        let _cap = Captured::start(LogLevel::Off);
        let status = recover_to_exit(|| -> SigResult<()> {
            let _ = exit_if!(Err::<(), _>(FOO_ERROR), FOO_ERROR, "stop");
            Ok(())
        })
        .unwrap_err();
        assert_eq!(status, ExitStatus { code: 1, message: "stop: foo error".into() });
    }

    #[test]
    fn foreign_panic_keeps_identity() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("not ours"));
        let addr = &*payload as *const (dyn Any + Send) as *const u8;

        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            recover_to_exit(|| {
                unpanic(|_| (), || {
                    let (tx, _rx) = crossbeam_channel::unbounded::<StructuredError>();
                    Boundary::new()
                        .to_channel(&tx, || {
                            recover_to_error(|| -> SigResult<()> { panic::resume_unwind(payload) })
                                .map_err(Signal::from)
                        })
                        .ok_or_else(|| Signal::from(StructuredError::new("delivered")))
                })
                .map_err(|e| Signal::from(StructuredError::new(e.desc())))
            })
        }))
        .unwrap_err();

        assert_eq!(&*caught as *const (dyn Any + Send) as *const u8, addr);
        assert_eq!(caught.downcast_ref::<String>().map(String::as_str), Some("not ours"));
    }

    #[test]
    fn unpanic_reports_errno() {
        let mut logged = String::new();
        let errno = boundary!("handler")
            .unpanic(|msg| logged = msg.to_string(), || -> SigResult<()> {
                check!(open("/run/app.sock"), "connect");
                Ok(())
            })
            .unwrap_err();
        assert_eq!(errno, Errno::ENOENT);
        assert!(logged.starts_with("handler: "), "got {}", logged);
        assert!(logged.contains("connect"));
    }

    #[test]
    fn unpanic_defaults_to_eperm() {
        let errno = unpanic(|_| (), || -> SigResult<()> {
            Err(StructuredError::new("no code").into())
        })
        .unwrap_err();
        assert_eq!(errno, Errno::EPERM);
    }

    #[test]
    fn channel_delivery_across_threads() {
        let (tx, rx) = crossbeam_channel::unbounded::<StructuredError>();
        let workers: Vec<_> = (0..4)
            .map(|id| {
                let tx = tx.clone();
                thread::spawn(move || {
                    boundary!("worker {}", id).to_channel(&tx, || -> SigResult<()> {
                        assert_that!(id % 2 == 0, "odd worker");
                        Ok(())
                    })
                })
            })
            .collect();
        drop(tx);

        let mut finished = 0;
        for worker in workers {
            if worker.join().expect("worker thread").is_some() {
                finished += 1;
            }
        }
        let mut messages: Vec<String> = rx.iter().map(|e| e.short_message()).collect();
        messages.sort();

        assert_eq!(finished, 2);
        assert_eq!(
            messages,
            vec![
                "worker 1: assertion failed: odd worker".to_string(),
                "worker 3: assertion failed: odd worker".to_string(),
            ]
        );
    }

    #[test]
    fn std_channel_sink() {
        let (tx, rx) = mpsc::sync_channel::<StructuredError>(1);
        let out = recover_to_channel(&tx, || -> SigResult<()> {
            Err(StructuredError::new("sent").into())
        });
        assert!(out.is_none());
        assert_eq!(rx.recv().map(|e| e.short_message()).ok(), Some("sent".to_string()));
    }

    #[test]
    fn disconnected_channel_warns() {
        let cap = Captured::start(LogLevel::Warn);
        let (tx, rx) = crossbeam_channel::bounded::<StructuredError>(1);
        drop(rx);
        let out = boundary!("orphan").to_channel(&tx, || -> SigResult<()> {
            Err(StructuredError::new("lost").into())
        });
        assert!(out.is_none());

        let lines = cap.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, LogLevel::Warn);
        assert!(lines[0].1.ends_with("orphan: lost"), "got {}", lines[0].1);
    }

    #[test]
    fn full_channel_drops_without_blocking() {
        let cap = Captured::start(LogLevel::Warn);
        let (tx, rx) = crossbeam_channel::bounded::<StructuredError>(1);
        tx.send(StructuredError::new("queued")).expect("room for one");

        let out = boundary!("busy").to_channel(&tx, || -> SigResult<()> {
            Err(StructuredError::new("overflow").into())
        });
        assert!(out.is_none());

        let lines = cap.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].1.ends_with("busy: overflow"), "got {}", lines[0].1);
        assert_eq!(rx.try_recv().map(|e| e.short_message()).ok(), Some("queued".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_std_sync_channel_drops() {
        let _cap = Captured::start(LogLevel::Off);
        let (tx, rx) = mpsc::sync_channel::<StructuredError>(0);
        let out = recover_to_channel(&tx, || -> SigResult<()> {
            Err(StructuredError::new("nobody waiting").into())
        });
        assert!(out.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn exit_signal_escapes_channel_boundary() {
        let _cap = Captured::start(LogLevel::Off);
        let (tx, rx) = crossbeam_channel::unbounded::<StructuredError>();
        let status = recover_to_exit(|| -> SigResult<()> {
            boundary!("worker").to_channel(&tx, || -> SigResult<()> {
                let r: Result<(), StructuredError> =
                    Err(StructuredError::raised(Origin::new("w.rs", 9), "", FOO_ERROR));
                let _ = exit_if!(r, FOO_ERROR, "foo exit");
                Ok(())
            });
            Ok(())
        })
        .unwrap_err();

        assert!(rx.try_recv().is_err());
        assert_eq!(status.code, 1);
        assert_eq!(status.message, "worker: foo exit: foo error");
    }

    #[test]
    fn exit_status_display() {
        let status = ExitStatus { code: 2, message: "bad".into() };
        assert_eq!(status.to_string(), "exit status 2: bad");
        assert_eq!(ExitStatus { code: 0, message: String::new() }.to_string(), "exit status 0");
    }
}

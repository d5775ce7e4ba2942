//! Leveled stderr logging for the framework and its callers.
//!
//! Lines go to stderr under its lock, or to a sink installed with
//! [`set_sink`]. Level and flush mode come from the environment the first
//! time anything is logged (see [`crate::config`]).
//!
//! # Environment Variables
//!
//! - `ADAPT_FLUSH_EPRINT=1` - Flush stderr after each line
//! - `ADAPT_LOG_LEVEL=<level>` - 0=off, 1=error, 2=warn, 3=info, 4=debug, 5=trace
//!
//! # Usage
//!
//! ```
//! use adapt::{kdebug, kwarn};
//!
//! let path = "/etc/app.toml";
//! kdebug!("loading {}", path);
//! kwarn!("{} missing, using defaults", path);
//! ```

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use crate::config;

/// Log levels, least verbose first.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Parse a level name or digit. Unknown text yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let level = match text.trim().to_ascii_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "1" => LogLevel::Error,
            "warn" | "2" => LogLevel::Warn,
            "info" | "3" => LogLevel::Info,
            "debug" | "4" => LogLevel::Debug,
            "trace" | "5" => LogLevel::Trace,
            _ => return None,
        };
        Some(level)
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }
}

/// Receives each formatted line (prefix included, no newline).
pub type Sink = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

static FLUSH_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static SINK: RwLock<Option<Sink>> = RwLock::new(None);

pub(crate) fn apply(level: LogLevel, flush: bool) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
    FLUSH_ENABLED.store(flush, Ordering::Relaxed);
}

#[inline]
pub fn flush_enabled() -> bool {
    config::init();
    FLUSH_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn log_level() -> LogLevel {
    config::init();
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Override the level read from `ADAPT_LOG_LEVEL`.
pub fn set_log_level(level: LogLevel) {
    config::init();
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn set_flush_enabled(enabled: bool) {
    config::init();
    FLUSH_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && level <= log_level()
}

/// Route log lines to `sink` instead of stderr.
pub fn set_sink<F>(sink: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    let mut slot = SINK.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = Some(Arc::new(sink));
}

/// Back to stderr.
pub fn reset_sink() {
    let mut slot = SINK.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = None;
}

fn write_stderr(line: fmt::Arguments<'_>) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = handle.write_fmt(line);
    let _ = handle.write_all(b"\n");
    if flush_enabled() {
        let _ = handle.flush();
    }
}

/// Internal: unleveled line, always written to stderr.
#[doc(hidden)]
pub fn _kprintln_impl(args: fmt::Arguments<'_>) {
    write_stderr(args);
}

/// Internal: leveled line, to the sink when one is installed.
#[doc(hidden)]
pub fn _klog_impl(level: LogLevel, args: fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }
    // The guard is released before the call, so a sink may log or swap sinks.
    let sink = SINK
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .as_ref()
        .map(Arc::clone);
    match sink {
        Some(sink) => sink(level, &format!("{} {}", level.prefix(), args)),
        None => write_stderr(format_args!("{} {}", level.prefix(), args)),
    }
}

// ── Template rendering ────────────────────────────────────────────

/// Render a message built at run time from a template and arguments.
///
/// Each `{}` in `template` takes the next argument. A template with no
/// placeholder gets its arguments appended, space separated. Surplus
/// placeholders stay as written.
pub fn render(template: &str, args: &[&dyn fmt::Display]) -> String {
    use fmt::Write as _;

    let mut out = String::with_capacity(template.len());
    let mut rest = args.iter();
    if template.contains("{}") {
        let mut pieces = template.split("{}");
        if let Some(first) = pieces.next() {
            out.push_str(first);
        }
        for piece in pieces {
            match rest.next() {
                Some(arg) => {
                    let _ = write!(out, "{}", arg);
                }
                None => out.push_str("{}"),
            }
            out.push_str(piece);
        }
    } else {
        out.push_str(template);
    }
    for arg in rest {
        let _ = write!(out, " {}", arg);
    }
    out
}

// ── Public Macros ─────────────────────────────────────────────────

/// Print a line to stderr regardless of level.
#[macro_export]
macro_rules! kprintln {
    ($($arg:tt)*) => {{
        $crate::kprint::_kprintln_impl(format_args!($($arg)*));
    }};
}

/// Error level log (always shown unless logging is off)
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Error,
            format_args!($($arg)*)
        );
    }};
}

#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Warn,
            format_args!($($arg)*)
        );
    }};
}

#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Info,
            format_args!($($arg)*)
        );
    }};
}

#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Debug,
            format_args!($($arg)*)
        );
    }};
}

/// Trace level log (most verbose)
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Trace,
            format_args!($($arg)*)
        );
    }};
}

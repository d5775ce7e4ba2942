//! Process-wide settings read from the environment once.
//!
//! | Variable             | Effect                                        |
//! |----------------------|-----------------------------------------------|
//! | `ADAPT_LOG_LEVEL`    | log level name or digit (default `info`)      |
//! | `ADAPT_FLUSH_EPRINT` | flush stderr after every line                 |
//! | `ADAPT_DEBUG`        | rc converters render exit chains in full      |
//!
//! Settings are loaded lazily on first use, or eagerly with [`init`].
//! The `set_*` functions override them afterwards.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::kprint::{self, LogLevel};

pub const ENV_LOG_LEVEL: &str = "ADAPT_LOG_LEVEL";
pub const ENV_FLUSH_EPRINT: &str = "ADAPT_FLUSH_EPRINT";
pub const ENV_DEBUG: &str = "ADAPT_DEBUG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub log_level: LogLevel,
    pub flush_eprint: bool,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            flush_eprint: false,
            debug: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset or unparsable values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_level: lookup(ENV_LOG_LEVEL)
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(defaults.log_level),
            flush_eprint: lookup(ENV_FLUSH_EPRINT)
                .map_or(defaults.flush_eprint, |v| parse_bool(&v)),
            debug: lookup(ENV_DEBUG).map_or(defaults.debug, |v| parse_bool(&v)),
        }
    }
}

static DEBUG: AtomicBool = AtomicBool::new(false);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Load [`Settings::from_env`] into the globals. Later calls are no-ops.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    let settings = Settings::from_env();
    kprint::apply(settings.log_level, settings.flush_eprint);
    DEBUG.store(settings.debug, Ordering::Relaxed);
}

#[inline]
pub fn debug_enabled() -> bool {
    init();
    DEBUG.load(Ordering::Relaxed)
}

pub fn set_debug(enabled: bool) {
    init();
    DEBUG.store(enabled, Ordering::Relaxed);
}

// ── Environment helpers ───────────────────────────────────────────

/// Accepts "1", "true", "yes", "on" (any case) as true.
#[inline]
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Variable parsed as `T`, or `default` when unset or unparsable.
#[inline]
pub fn env_get<T: FromStr>(key: &str, default: T) -> T {
    env_get_opt(key).unwrap_or(default)
}

#[inline]
pub fn env_get_opt<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    std::env::var(key).map_or(default, |v| parse_bool(&v))
}

//! Annotation macros.
//!
//! Every macro that takes a trailing annotation formats it the same way
//! (see [`annotation!`]) and records `file!()`/`line!()` of the call as
//! the origin. The raising macros early-return from the enclosing
//! function with `Err(From::from(..))`, so that function must return a
//! [`SigResult`](crate::SigResult) or any error type with a `From` impl
//! for the raised value.

/// Annotation text from zero or more arguments.
///
/// - no argument: empty
/// - one argument: its `Display` text, braces included verbatim
/// - a literal followed by arguments: `format!`
///
/// ```
/// use adapt::annotation;
///
/// assert_eq!(annotation!(), "");
/// assert_eq!(annotation!(42), "42");
/// assert_eq!(annotation!("{}"), "{}");
/// assert_eq!(annotation!("foo {}", "bar"), "foo bar");
/// ```
#[macro_export]
macro_rules! annotation {
    () => {
        ::std::string::String::new()
    };
    ($fmt:literal, $($arg:tt)+) => {
        ::std::format!($fmt, $($arg)+)
    };
    ($msg:expr $(,)?) => {
        ::std::string::ToString::to_string(&$msg)
    };
}

/// Unwrap an `Ok` or raise a `StructuredError` with the error as cause.
///
/// ```
/// use adapt::{check, SigResult};
/// use std::fs;
///
/// fn load(path: &str) -> SigResult<String> {
///     let text = check!(fs::read_to_string(path), "reading {}", path);
///     Ok(text)
/// }
///
/// let err = load("/nonexistent/adapt.toml").unwrap_err();
/// assert!(err.to_string().contains("reading /nonexistent/adapt.toml"));
/// ```
#[macro_export]
macro_rules! check {
    ($result:expr $(, $($ann:tt)+)?) => {
        match $crate::raise::check_at(
            $result,
            $crate::Origin::new(::std::file!(), ::std::line!()),
            $crate::annotation!($($($ann)+)?),
        ) {
            ::std::result::Result::Ok(value) => value,
            ::std::result::Result::Err(err) => {
                return ::std::result::Result::Err(::std::convert::From::from(err));
            }
        }
    };
}

/// Raise `"assertion failed[: <annotation>]"` when `cond` is false.
#[macro_export]
macro_rules! assert_that {
    ($cond:expr $(, $($ann:tt)+)?) => {
        if let ::std::result::Result::Err(err) = $crate::raise::assert_at(
            $cond,
            $crate::Origin::new(::std::file!(), ::std::line!()),
            $crate::annotation!($($($ann)+)?),
        ) {
            return ::std::result::Result::Err(::std::convert::From::from(err));
        }
    };
}

/// Raise an `ExitSignal` when `result` failed with `target` in its chain;
/// otherwise evaluate to `result` unchanged.
///
/// ```
/// use adapt::{exit_if, Errno, SigResult, Signal};
/// use std::io;
///
/// fn copy() -> SigResult<()> {
///     let r: io::Result<()> = Err(io::Error::from_raw_os_error(libc::EPIPE));
///     let r = exit_if!(r, Errno::ENOENT);
///     let _ = exit_if!(r, Errno::EPIPE, "pipeline {} error", 7);
///     Ok(())
/// }
///
/// match copy() {
///     Err(Signal::Exit(sig)) => {
///         assert_eq!(sig.message(), "pipeline 7 error");
///         assert_eq!(sig.short_message(), "pipeline 7 error: Broken pipe (os error 32)");
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[macro_export]
macro_rules! exit_if {
    ($result:expr, $target:expr $(, $($ann:tt)+)?) => {
        match $crate::raise::exit_if_at(
            $result,
            &$target,
            $crate::Origin::new(::std::file!(), ::std::line!()),
            $crate::annotation!($($($ann)+)?),
        ) {
            ::std::result::Result::Ok(result) => result,
            ::std::result::Result::Err(sig) => {
                return ::std::result::Result::Err(::std::convert::From::from(sig));
            }
        }
    };
}

/// A [`Boundary`](crate::Boundary) annotated by the formatting rule.
#[macro_export]
macro_rules! boundary {
    () => {
        $crate::Boundary::new()
    };
    ($($ann:tt)+) => {
        $crate::Boundary::annotated($crate::annotation!($($ann)+))
    };
}

/// Log `"<file>:<line>: <text>"` at info level.
///
/// With a template and arguments, each `{}` takes the next argument; when
/// the template has no placeholder the arguments are appended, space
/// separated.
///
/// ```
/// adapt::info!("foo{}", "bar"); // foobar
/// adapt::info!("foo", "bar");   // foo bar
/// ```
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::kinfo!(
            "{}: {}",
            $crate::Origin::new(::std::file!(), ::std::line!()),
            $crate::__user_text!($($arg)*)
        )
    };
}

/// Log like [`info!`] at error level, then return the text as a
/// `StructuredError` raised here.
#[macro_export]
macro_rules! uerr {
    ($($arg:tt)*) => {{
        let origin = $crate::Origin::new(::std::file!(), ::std::line!());
        let text = $crate::__user_text!($($arg)*);
        $crate::kerror!("{}: {}", origin, text);
        return ::std::result::Result::Err(::std::convert::From::from(
            $crate::StructuredError::from_context(
                $crate::ErrorContext::new(text).with_origin(origin),
            ),
        ));
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __user_text {
    () => {
        ::std::string::String::new()
    };
    ($template:expr $(,)?) => {
        ::std::string::ToString::to_string(&$template)
    };
    ($template:expr, $($arg:expr),+ $(,)?) => {
        $crate::kprint::render(
            &$template,
            &[$(&$arg as &dyn ::std::fmt::Display),+],
        )
    };
}

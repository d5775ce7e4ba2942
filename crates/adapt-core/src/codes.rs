//! POSIX errno extraction for chain links.
//!
//! A link "carries a code" when it is a raw system error: an `io::Error`
//! with a raw OS errno (or a kind that maps to one), or a bare
//! [`Errno`]. Framework links may also carry an explicit status.
//!
//! When a chain carries no code at all, the derived status is
//! [`DEFAULT_STATUS`] (`EPERM`, numerically `1`). Every converter uses the
//! same default.

use std::error::Error;
use std::io;

use nix::errno::Errno;

/// Status used when no link in a chain carries a code.
pub const DEFAULT_STATUS: i32 = libc::EPERM;

/// Typed form of [`DEFAULT_STATUS`].
pub const DEFAULT_ERRNO: Errno = Errno::EPERM;

/// Maps `io::ErrorKind` to the errno it normally comes from.
///
/// Used for `io::Error`s built from a kind rather than a raw OS code.
/// Kinds with no errno counterpart map to `None`.
pub fn errno_from_kind(kind: io::ErrorKind) -> Option<Errno> {
    let errno = match kind {
        io::ErrorKind::NotFound          => Errno::ENOENT,
        io::ErrorKind::PermissionDenied  => Errno::EACCES,
        io::ErrorKind::ConnectionRefused => Errno::ECONNREFUSED,
        io::ErrorKind::ConnectionReset   => Errno::ECONNRESET,
        io::ErrorKind::ConnectionAborted => Errno::ECONNABORTED,
        io::ErrorKind::NotConnected      => Errno::ENOTCONN,
        io::ErrorKind::AddrInUse         => Errno::EADDRINUSE,
        io::ErrorKind::AddrNotAvailable  => Errno::EADDRNOTAVAIL,
        io::ErrorKind::BrokenPipe        => Errno::EPIPE,
        io::ErrorKind::AlreadyExists     => Errno::EEXIST,
        io::ErrorKind::WouldBlock        => Errno::EAGAIN,
        io::ErrorKind::InvalidInput      => Errno::EINVAL,
        io::ErrorKind::TimedOut          => Errno::ETIMEDOUT,
        io::ErrorKind::Interrupted       => Errno::EINTR,
        io::ErrorKind::OutOfMemory       => Errno::ENOMEM,
        _                                => return None,
    };
    Some(errno)
}

/// Raw system error code carried by a single foreign link, if any.
///
/// Does not look at `source()`; chain walking is the caller's job.
pub fn system_errno(link: &(dyn Error + 'static)) -> Option<Errno> {
    if let Some(io_err) = link.downcast_ref::<io::Error>() {
        return match io_err.raw_os_error() {
            Some(raw) => Some(Errno::from_raw(raw)),
            None => errno_from_kind(io_err.kind()),
        };
    }
    link.downcast_ref::<Errno>().copied()
}

//! Exit-class classification at `main`.
//!
//! `some_func` fails in one of four ways, three typed boundaries deep.
//! `run` turns the failures it recognises into exit signals; anything else
//! is checked as an ordinary error. Either way the process exits with the
//! derived status.
//!
//! # Environment Variables
//!
//! - `EXITIF_CASE=<0..3>` - Pick the failure instead of choosing at random
//! - `ADAPT_DEBUG=1` - Show provenance in exit messages
//! - `ADAPT_LOG_LEVEL=debug` - Log exit signals crossing boundaries

use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use adapt::config::env_get_opt;
use adapt::{
    assert_that, check, exit_if, kdebug, recover_to_error, recover_to_exit, Errno, Sentinel,
    SigResult, StructuredError,
};

const FOO_ERROR: Sentinel = Sentinel::new("foo error");

fn main() {
    if let Err(status) = recover_to_exit(run) {
        status.exit();
    }
}

fn run() -> SigResult<()> {
    classify(mid(pick()))
}

fn classify(r: Result<(), StructuredError>) -> SigResult<()> {
    let r = exit_if!(r, FOO_ERROR);
    let r = exit_if!(r, Errno::EPIPE, "pipeline {} error", 7);
    let r = exit_if!(r, Errno::ENOENT);
    check!(r);
    Ok(())
}

fn mid(case: u32) -> Result<(), StructuredError> {
    recover_to_error(|| {
        check!(adapted(case));
        Ok(())
    })
}

fn adapted(case: u32) -> Result<(), StructuredError> {
    recover_to_error(|| {
        check!(some_func(case));
        Ok(())
    })
}

fn some_func(case: u32) -> Result<(), StructuredError> {
    kdebug!("some_func: case {}", case);
    recover_to_error(|| {
        match case {
            0 => check!(Err::<(), _>(Errno::EPIPE)),
            1 => check!(Err::<(), _>(FOO_ERROR)),
            2 => {
                let path = "/notafileordir";
                check!(fs::metadata(path), "stat {}", path);
            }
            _ => assert_that!(false, "lksadjfslkjf dsalkjf"),
        }
        Ok(())
    })
}

fn pick() -> u32 {
    env_get_opt::<u32>("EXITIF_CASE").unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0)
    }) % 4
}

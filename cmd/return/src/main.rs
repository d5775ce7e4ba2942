//! Typed-error boundaries with and without annotations.
//!
//! Each example fails an assertion and prints the error its boundary
//! produced.

use adapt::{assert_that, boundary, SigResult, StructuredError};

fn main() {
    for result in [eg1(), eg2(), eg3()] {
        match result {
            Ok(()) => println!("ok"),
            Err(err) => println!("{}", err),
        }
    }
}

fn eg1() -> Result<(), StructuredError> {
    boundary!().to_error(|| -> SigResult<()> {
        assert_that!(false, "foo {}", "bar");
        Ok(())
    })
}

fn eg2() -> Result<(), StructuredError> {
    boundary!("some annotation").to_error(|| -> SigResult<()> {
        assert_that!(false, "foo {}", "bar");
        Ok(())
    })
}

fn eg3() -> Result<(), StructuredError> {
    boundary!("some annotation with {}", "formatting").to_error(|| -> SigResult<()> {
        assert_that!(false, "foo {}", "bar");
        Ok(())
    })
}

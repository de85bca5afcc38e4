//! Assertion helpers shared by the workspace tests.

pub mod option;
pub mod result;

pub mod prelude {
    pub use crate::{assert_err, assert_len, assert_none, assert_ok, assert_some};
}

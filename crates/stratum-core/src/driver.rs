pub mod operation;
pub use operation::{Operation, Param};

mod response;
pub use response::Response;

use crate::Result;

use std::{borrow::Cow, fmt::Debug};

/// SQL dialect a driver speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgresql,
    Sqlite,
}

pub trait Driver: Debug + Send + Sync + 'static {
    /// Returns the URL this driver is connecting to.
    fn url(&self) -> Cow<'_, str>;

    /// The dialect statements must be compiled for.
    fn dialect(&self) -> Dialect;

    /// Opens a new connection.
    fn connect(&self) -> Result<Box<dyn Connection>>;

    /// Returns the maximum number of simultaneous connections supported by
    /// this driver, or `None` for no driver-imposed limit.
    fn max_connections(&self) -> Option<usize> {
        None
    }
}

pub trait Connection: Debug + Send + 'static {
    /// Executes one auto-committed statement.
    fn exec(&mut self, op: Operation) -> Result<Response>;
}

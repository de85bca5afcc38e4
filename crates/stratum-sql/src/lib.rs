//! Compiles schema-described writes and queries into parameterized SQL.

#[macro_use]
mod fmt;
use fmt::{Formatter, ToSql};

mod delim;
mod ident;

pub mod binder;
pub use binder::Binder;

mod compiler;
pub use compiler::Compiler;

pub mod ddl;

pub mod dialect;
pub use dialect::SqlDialect;

pub mod naming;

pub mod row;
pub use row::Materializer;

pub mod statement;
pub use statement::{Column, Shape, StatementKind, StatementMeta, SubSelect};

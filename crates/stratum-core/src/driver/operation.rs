use crate::{Kind, Value};

/// One bound parameter.
///
/// A `List` value bound with a scalar kind is a native array whose elements
/// have that kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub kind: Kind,
    pub value: Value,
}

impl Param {
    pub fn new(kind: Kind, value: Value) -> Param {
        Param { kind, value }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.value, Value::List(_)) && self.kind.is_scalar()
    }
}

/// A compiled statement ready for a connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub sql: String,
    pub params: Vec<Param>,

    /// Column kinds when the statement returns rows. A `List` column holds
    /// JSON text produced by an aggregated sub-select.
    pub ret: Option<Vec<Kind>>,
}

impl Operation {
    /// A statement returning an affected-row count.
    pub fn execute(sql: impl Into<String>, params: Vec<Param>) -> Operation {
        Operation {
            sql: sql.into(),
            params,
            ret: None,
        }
    }

    /// A statement returning rows of the given column kinds.
    pub fn query(sql: impl Into<String>, params: Vec<Param>, ret: Vec<Kind>) -> Operation {
        Operation {
            sql: sql.into(),
            params,
            ret: Some(ret),
        }
    }
}

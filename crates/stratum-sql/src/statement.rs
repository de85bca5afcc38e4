use stratum_core::{
    driver::{Operation, Param},
    Kind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    Select,
    Count,
}

/// A compiled statement: SQL text plus what is needed to bind and read it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementMeta {
    pub kind: StatementKind,
    pub model: String,
    pub sql: String,

    /// Record fields bound positionally by writes, in placeholder order.
    pub fields: Vec<String>,

    /// Parameters bound while compiling a query's predicates.
    pub params: Vec<Param>,

    /// Selected columns, in row order.
    pub columns: Vec<Column>,

    /// Field read back from an INSERT.
    pub returning: Option<String>,
}

/// One selected column and how its value is turned back into a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub field: String,

    /// Kind the driver reads the column as.
    pub kind: Kind,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar,

    /// A list of scalars stored as JSON text.
    JsonList { element: Option<Kind> },

    /// The id of a foreign record.
    Foreign { model: String },

    /// Child records aggregated into JSON by a correlated sub-select.
    Referenced(Box<SubSelect>),
}

/// Companion of a referenced-list column: the child model and the columns
/// carried by each aggregated JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct SubSelect {
    pub model: String,
    pub alias: String,
    pub columns: Vec<Column>,
}

impl StatementMeta {
    pub(crate) fn new(kind: StatementKind, model: impl Into<String>, sql: String) -> StatementMeta {
        StatementMeta {
            kind,
            model: model.into(),
            sql,
            fields: vec![],
            params: vec![],
            columns: vec![],
            returning: None,
        }
    }

    /// Column kinds of the rows this statement returns, if any.
    pub fn ret(&self) -> Option<Vec<Kind>> {
        match self.kind {
            StatementKind::Select => Some(self.columns.iter().map(|column| column.kind).collect()),
            StatementKind::Count => Some(vec![Kind::Long]),
            StatementKind::Insert if self.returning.is_some() => Some(vec![Kind::Long]),
            _ => None,
        }
    }

    /// The operation to hand to a connection, with `params` bound.
    pub fn operation(&self, params: Vec<Param>) -> Operation {
        match self.ret() {
            Some(ret) => Operation::query(self.sql.clone(), params, ret),
            None => Operation::execute(self.sql.clone(), params),
        }
    }

    /// The operation for a query whose parameters were bound at compile
    /// time.
    pub fn query_operation(&self) -> Operation {
        self.operation(self.params.clone())
    }
}

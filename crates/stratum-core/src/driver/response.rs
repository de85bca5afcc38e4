use crate::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Count(u64),
    Rows(Vec<Vec<Value>>),
}

impl Response {
    pub fn count(count: u64) -> Response {
        Response::Count(count)
    }

    pub fn rows(rows: Vec<Vec<Value>>) -> Response {
        Response::Rows(rows)
    }

    /// Affected rows, or the number of returned rows.
    pub fn affected(&self) -> u64 {
        match self {
            Response::Count(count) => *count,
            Response::Rows(rows) => rows.len() as u64,
        }
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        match self {
            Response::Rows(rows) => rows,
            Response::Count(_) => vec![],
        }
    }
}

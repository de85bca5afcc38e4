use crate::{store::RecordKey, Record, Value};

use serde::{Deserialize, Serialize};

/// Predicate comparator. The two group comparators combine nested fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equals,
    NotEquals,
    Like,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    In,
    NotIn,
    Any,
    NotAny,
    GroupAnd,
    GroupOr,
}

impl Comparator {
    pub fn is_group(self) -> bool {
        matches!(self, Comparator::GroupAnd | Comparator::GroupOr)
    }

    /// Comparators whose value is a list bound as one array parameter.
    pub fn is_array(self) -> bool {
        matches!(self, Comparator::In | Comparator::NotIn)
    }

    /// Comparators testing membership inside a list-valued field.
    pub fn is_membership(self) -> bool {
        matches!(self, Comparator::Any | Comparator::NotAny)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    #[serde(alias = "ASCENDING")]
    Ascending,
    #[serde(alias = "DESCENDING")]
    Descending,
}

/// One predicate of a query, or a group of nested predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryField {
    pub name: String,
    pub comparator: Comparator,
    pub value: Value,
    pub fields: Vec<QueryField>,
}

impl QueryField {
    pub fn new(name: impl Into<String>, comparator: Comparator, value: impl Into<Value>) -> QueryField {
        QueryField {
            name: name.into(),
            comparator,
            value: value.into(),
            fields: vec![],
        }
    }

    pub fn group(comparator: Comparator, fields: Vec<QueryField>) -> QueryField {
        QueryField {
            name: String::new(),
            comparator,
            value: Value::Null,
            fields,
        }
    }

    pub fn is_group(&self) -> bool {
        self.comparator.is_group()
    }
}

/// A schema-described query: predicates, projection, sort and page.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    model: String,
    comparator: Comparator,
    fields: Vec<QueryField>,
    request: Vec<String>,
    sort_field: Option<String>,
    order: Order,
    start: u64,
    count: u64,
}

impl Query {
    pub fn new(model: impl Into<String>) -> Query {
        Query {
            model: model.into(),
            comparator: Comparator::GroupAnd,
            fields: vec![],
            request: vec![],
            sort_field: None,
            order: Order::Ascending,
            start: 0,
            count: 0,
        }
    }

    /// A query matching one record by key.
    pub fn by_key(model: impl Into<String>, key: &RecordKey) -> Query {
        Query::new(model).equals(key.field(), key.value())
    }

    pub fn field(mut self, name: impl Into<String>, comparator: Comparator, value: impl Into<Value>) -> Query {
        self.fields.push(QueryField::new(name, comparator, value));
        self
    }

    pub fn equals(self, name: impl Into<String>, value: impl Into<Value>) -> Query {
        self.field(name, Comparator::Equals, value)
    }

    pub fn group(mut self, comparator: Comparator, fields: Vec<QueryField>) -> Query {
        self.fields.push(QueryField::group(comparator, fields));
        self
    }

    /// Sets how top-level predicates combine: `GroupAnd` (default) or `GroupOr`.
    pub fn combine(mut self, comparator: Comparator) -> Query {
        debug_assert!(comparator.is_group());
        self.comparator = comparator;
        self
    }

    /// Restricts the projection. An empty request means every field.
    pub fn request<I, S>(mut self, fields: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: Order) -> Query {
        self.sort_field = Some(field.into());
        self.order = order;
        self
    }

    /// Requests `count` records starting at offset `start`. A count of zero
    /// means no paging.
    pub fn page(mut self, start: u64, count: u64) -> Query {
        self.start = start;
        self.count = count;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn fields(&self) -> &[QueryField] {
        &self.fields
    }

    pub fn requested(&self) -> &[String] {
        &self.request
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref()
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Paging applies only when both a sort key and a page size are set.
    pub fn is_paginated(&self) -> bool {
        self.sort_field.is_some() && self.count > 0
    }
}

/// Records returned by a search, with the total matching count when known.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub model: String,
    pub records: Vec<Record>,
    pub total_count: Option<u64>,
}

impl QueryResult {
    pub fn new(model: impl Into<String>, records: Vec<Record>) -> QueryResult {
        QueryResult {
            model: model.into(),
            records,
            total_count: None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }
}

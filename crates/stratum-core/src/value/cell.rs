use super::{Kind, Value};
use crate::{codec::scalar, schema::FieldSchema, Error, Result};

/// Relationship metadata carried next to a cell's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relation {
    /// Target model of a nested record or of list elements.
    pub base_model: Option<String>,

    /// Element kind of a list, or the enum type name.
    pub base_type: Option<String>,
}

impl Relation {
    /// Scalar element kind for list cells, when one is declared.
    pub fn element_kind(&self) -> Option<Kind> {
        self.base_type
            .as_deref()
            .and_then(Kind::parse)
            .filter(|kind| kind.is_scalar())
    }
}

/// One named value of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    name: String,
    kind: Kind,
    value: Value,
    relation: Relation,
}

impl Cell {
    pub fn new(name: impl Into<String>, kind: Kind) -> Cell {
        Cell {
            name: name.into(),
            kind,
            value: Value::Null,
            relation: Relation::default(),
        }
    }

    /// Builds the cell a schema field declares, with its default applied.
    pub fn declared(field: &FieldSchema) -> Cell {
        let relation = Relation {
            base_model: field.base_model.clone(),
            base_type: field.base_type.clone(),
        };

        let value = match &field.default {
            Some(default) => match scalar::from_json(field.kind, relation.element_kind(), default) {
                Some(value) => value,
                None => {
                    tracing::warn!(
                        field = %field.name,
                        kind = %field.kind,
                        "ignoring default that does not fit the declared kind"
                    );
                    implicit_default(field.kind)
                }
            },
            None => implicit_default(field.kind),
        };

        Cell {
            name: field.name.clone(),
            kind: field.kind,
            value,
            relation,
        }
    }

    /// Builds a concrete cell whose kind is inferred from `value`.
    pub fn flex(name: impl Into<String>, value: Value) -> Result<Cell> {
        let name = name.into();
        let Some(kind) = value.kind() else {
            return Err(Error::value_type_mismatch(name, Kind::Flex, None));
        };

        Ok(Cell {
            name,
            kind,
            value,
            relation: Relation::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub(crate) fn with_relation(mut self, relation: Relation) -> Cell {
        self.relation = relation;
        self
    }

    pub fn is_flex(&self) -> bool {
        self.kind == Kind::Flex
    }

    /// Reads the value. Fails for placeholder cells.
    pub fn value(&self) -> Result<&Value> {
        if self.is_flex() {
            return Err(Error::abstract_field_access(&self.name));
        }
        Ok(&self.value)
    }

    /// Replaces the value after coercing it to the declared kind.
    pub fn set(&mut self, value: Value) -> Result<()> {
        if self.is_flex() {
            return Err(Error::abstract_field_access(&self.name));
        }

        let value = value.coerce(self.kind, &self.name)?;

        let value = match value {
            Value::List(items) => Value::List(self.coerce_elements(items)?),
            Value::Model(record) => {
                if let Some(base) = &self.relation.base_model {
                    if !record.inherits(base) {
                        tracing::debug!(
                            field = %self.name,
                            expected = %base,
                            actual = %record.model(),
                            "nested record does not extend the declared model"
                        );
                        return Err(Error::value_type_mismatch(
                            &self.name,
                            Kind::Model,
                            Some(Kind::Model),
                        ));
                    }
                }
                Value::Model(record)
            }
            value => value,
        };

        self.value = value;
        Ok(())
    }

    fn coerce_elements(&self, items: Vec<Value>) -> Result<Vec<Value>> {
        if let Some(kind) = self.relation.element_kind() {
            return items
                .into_iter()
                .map(|item| item.coerce(kind, &self.name))
                .collect();
        }

        if self.relation.base_model.is_some() {
            if let Some(item) = items.iter().find(|item| !matches!(item, Value::Model(_))) {
                return Err(Error::value_type_mismatch(
                    &self.name,
                    Kind::Model,
                    item.kind(),
                ));
            }
        }

        Ok(items)
    }

    /// The stored value without the placeholder check.
    pub(crate) fn raw(&self) -> &Value {
        &self.value
    }

    pub(crate) fn raw_mut(&mut self) -> &mut Value {
        &mut self.value
    }
}

fn implicit_default(kind: Kind) -> Value {
    match kind {
        Kind::Int => Value::Int(0),
        Kind::Long => Value::Long(0),
        Kind::Double => Value::Double(0.0),
        Kind::Boolean => Value::Boolean(false),
        Kind::List => Value::List(vec![]),
        _ => Value::Null,
    }
}

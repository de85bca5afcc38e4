//! Maps field values to typed, positionally bound parameters.

use crate::{
    fmt::{Formatter, ToSql},
    StatementMeta,
};

use stratum_core::{
    codec::scalar,
    driver::Param,
    schema::{names, FieldSchema},
    Error, Kind, Record, Result, Value,
};

use serde_json::Value as Json;

/// Parameters of one statement, addressed 1-based.
#[derive(Debug, Default)]
pub struct Binder {
    params: Vec<Option<Param>>,
}

/// A rendered parameter marker, `$n` or `?n` depending on the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl ToSql for Placeholder {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dialect.placeholder(f.dst, self.0);
    }
}

impl Binder {
    pub fn new() -> Binder {
        Binder::default()
    }

    /// Binds `param` at the 1-based `index`. Index 0 is a programming error.
    pub fn bind(&mut self, index: usize, param: Param) -> Result<()> {
        if index == 0 {
            return Err(Error::invalid_statement(
                "parameter indexes are 1-based; got 0",
            ));
        }
        if self.params.len() < index {
            self.params.resize(index, None);
        }
        self.params[index - 1] = Some(param);
        Ok(())
    }

    /// Binds `param` after the last bound parameter.
    pub fn push(&mut self, param: Param) -> Placeholder {
        self.params.push(Some(param));
        Placeholder(self.params.len())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The bound parameters in order. Fails if any index was skipped.
    pub fn finish(self) -> Result<Vec<Param>> {
        self.params
            .into_iter()
            .enumerate()
            .map(|(i, param)| {
                param.ok_or_else(|| {
                    Error::invalid_statement(format!("parameter {} was never bound", i + 1))
                })
            })
            .collect()
    }
}

/// Binds the fields a write statement names from `record`.
pub fn bind_record(meta: &StatementMeta, record: &Record) -> Result<Vec<Param>> {
    let mut binder = Binder::new();

    for (i, name) in meta.fields.iter().enumerate() {
        let Some(field) = record.schema().field(name) else {
            return Err(Error::field_not_found(record.model(), name));
        };
        let value = record.get(name)?;
        binder.bind(i + 1, column_param(field, &value)?)?;
    }

    binder.finish()
}

/// Kind of the column a field is stored in.
pub fn column_kind(field: &FieldSchema) -> Kind {
    match field.kind {
        Kind::Enum => Kind::String,
        Kind::Model => Kind::Long,
        kind => kind,
    }
}

/// Converts a field value to the parameter stored in its column.
///
/// Enums are stored as their upper-case constant, foreign records as the
/// target's id and scalar lists as JSON text.
pub fn column_param(field: &FieldSchema, value: &Value) -> Result<Param> {
    let kind = column_kind(field);

    let value = match (field.kind, value) {
        (_, Value::Null) => Value::Null,
        (Kind::Model, Value::Model(target)) => foreign_id(target)?,
        (Kind::Model, value) => value.clone().coerce(Kind::Long, &field.name)?,
        (Kind::List, Value::List(items)) => {
            let json = Json::Array(items.iter().map(scalar::to_json).collect());
            return Ok(Param::new(Kind::String, Value::String(serde_json::to_string(&json)?)));
        }
        (Kind::Enum, value) => match value.clone().coerce(Kind::Enum, &field.name)? {
            Value::Enum(v) => Value::String(v),
            value => value,
        },
        (_, value) => value.clone().coerce(kind, &field.name)?,
    };

    let kind = if field.kind == Kind::List { Kind::String } else { kind };
    Ok(Param::new(kind, value))
}

/// The JSON form of one element of a list field, as it appears in the
/// stored JSON text.
pub fn element_json(field: &FieldSchema, value: &Value) -> Result<Json> {
    let element = field
        .base_type
        .as_deref()
        .and_then(Kind::parse)
        .filter(|kind| kind.is_scalar());

    let value = match element {
        Some(kind) => value.clone().coerce(kind, &field.name)?,
        None => value.clone(),
    };
    Ok(scalar::to_json(&value))
}

fn foreign_id(target: &Record) -> Result<Value> {
    let key = target
        .schema()
        .sequence_field()
        .map_or(names::ID, |field| field.name.as_str());

    match target.value(key).and_then(Value::as_long) {
        Some(id) if id > 0 => Ok(Value::Long(id)),
        _ => Err(Error::identity_missing(target.model())),
    }
}

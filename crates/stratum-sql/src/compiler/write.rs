use super::Compiler;
use crate::{
    binder::Placeholder,
    delim::Comma,
    fmt::{Formatter, ToSql},
    ident::Ident,
    StatementKind, StatementMeta,
};

use stratum_core::{Error, Record, Result};

impl Compiler<'_> {
    /// `INSERT` of every column the record holds. The sequence identity is
    /// left to the database and read back with `RETURNING`.
    pub fn insert(&self, record: &Record) -> Result<StatementMeta> {
        let schema = record.schema();
        self.concrete(schema)?;

        let fields: Vec<String> = schema
            .columns()
            .filter(|field| !field.sequence && record.has_field(&field.name))
            .map(|field| field.name.clone())
            .collect();
        let returning = schema.sequence_field().map(|field| field.name.clone());
        let table = self.table(record.model());

        let mut sql = String::new();
        let f = &mut Formatter::new(&mut sql, self.dialect);

        if fields.is_empty() {
            fmt!(f, "INSERT INTO " table.as_str() " DEFAULT VALUES");
        } else {
            fmt!(
                f,
                "INSERT INTO " table.as_str()
                " (" Comma(fields.iter().map(Ident)) ")"
                " VALUES (" Comma((1..=fields.len()).map(Placeholder)) ")"
            );
        }

        if let Some(returning) = &returning {
            fmt!(f, " RETURNING " Ident(returning));
        }

        let mut meta = StatementMeta::new(StatementKind::Insert, record.model(), sql);
        meta.fields = fields;
        meta.returning = returning;
        tracing::debug!(sql = %meta.sql, "compiled insert");
        Ok(meta)
    }

    /// `UPDATE` of the mutable columns the record holds, keyed by the first
    /// populated identity field. Returns `None` when there is nothing to
    /// set.
    pub fn update(&self, record: &Record) -> Result<Option<StatementMeta>> {
        let schema = record.schema();
        self.concrete(schema)?;

        let Some((identity, _)) = record.identity() else {
            return Err(Error::identity_missing(record.model()));
        };

        let mut fields: Vec<String> = schema
            .fields
            .iter()
            .filter(|field| field.is_mutable_column() && record.has_field(&field.name))
            .map(|field| field.name.clone())
            .collect();

        if fields.is_empty() {
            tracing::debug!(model = %record.model(), "no mutable columns to update");
            return Ok(None);
        }

        let table = self.table(record.model());
        let assignments = fields
            .iter()
            .enumerate()
            .map(|(i, name)| Assign(name, Placeholder(i + 1)));

        let mut sql = String::new();
        let f = &mut Formatter::new(&mut sql, self.dialect);
        fmt!(
            f,
            "UPDATE " table.as_str() " SET " Comma(assignments)
            " WHERE " Ident(identity) " = " Placeholder(fields.len() + 1)
        );

        fields.push(identity.to_string());

        let mut meta = StatementMeta::new(StatementKind::Update, record.model(), sql);
        meta.fields = fields;
        tracing::debug!(sql = %meta.sql, "compiled update");
        Ok(Some(meta))
    }

    /// `DELETE` keyed by the first populated identity field.
    pub fn delete(&self, record: &Record) -> Result<StatementMeta> {
        let schema = record.schema();
        self.concrete(schema)?;

        let Some((identity, _)) = record.identity() else {
            return Err(Error::identity_missing(record.model()));
        };

        let table = self.table(record.model());
        let mut sql = String::new();
        let f = &mut Formatter::new(&mut sql, self.dialect);
        fmt!(f, "DELETE FROM " table.as_str() " WHERE " Ident(identity) " = " Placeholder(1));

        let mut meta = StatementMeta::new(StatementKind::Delete, record.model(), sql);
        meta.fields = vec![identity.to_string()];
        tracing::debug!(sql = %meta.sql, "compiled delete");
        Ok(meta)
    }
}

/// `column = placeholder`
struct Assign<'a>(&'a String, Placeholder);

impl ToSql for Assign<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Ident(self.0) " = " self.1);
    }
}

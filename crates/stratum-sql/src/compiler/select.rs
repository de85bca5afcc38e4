use super::{Compiler, Scope};
use crate::{
    binder::column_kind,
    delim::Comma,
    fmt::{Formatter, ToSql},
    ident::Qualified,
    naming, Binder, Column, Shape, StatementKind, StatementMeta, SubSelect,
};

use stratum_core::{
    schema::{names, FieldSchema, ModelSchema},
    Error, Kind, Order, Query, Result,
};

impl Compiler<'_> {
    /// `SELECT` of the requested fields (every field when none are
    /// requested). Referenced lists become correlated sub-selects.
    pub fn select(&self, query: &Query) -> Result<StatementMeta> {
        let schema = self.registry.require(query.model())?;
        self.concrete(&schema)?;

        let mut scope = Scope::default();
        let alias = scope.alias(&schema.name);
        let mut chain = vec![schema.name.clone()];

        let fields = self.requested(&schema, query.requested())?;
        let mut columns = Vec::with_capacity(fields.len());
        let mut exprs = Vec::with_capacity(fields.len());

        for field in fields {
            if let Some((column, expr)) = self.column(&schema, &alias, field, &mut scope, &mut chain, false)? {
                columns.push(column);
                exprs.push(expr);
            }
        }

        if columns.is_empty() {
            return Err(Error::invalid_statement(format!(
                "query on `{}` selects no columns",
                schema.name
            )));
        }

        let mut binder = Binder::new();
        let filter = self.filter(&schema, &alias, query, &mut binder)?;
        let table = self.table(&schema.name);

        let mut sql = String::new();
        let f = &mut Formatter::new(&mut sql, self.dialect);
        fmt!(f, "SELECT " Comma(exprs.iter()) " FROM " table.as_str() " " alias.as_str());
        if let Some(filter) = &filter {
            fmt!(f, " WHERE " filter);
        }
        self.order_and_page(f, &schema, &alias, query)?;

        let mut meta = StatementMeta::new(StatementKind::Select, &schema.name, sql);
        meta.params = binder.finish()?;
        meta.columns = columns;
        tracing::debug!(sql = %meta.sql, params = meta.params.len(), "compiled select");
        Ok(meta)
    }

    /// `SELECT count(..)` over the query's predicates. Sort and page are
    /// ignored.
    pub fn count(&self, query: &Query) -> Result<StatementMeta> {
        let schema = self.registry.require(query.model())?;
        self.concrete(&schema)?;

        let mut scope = Scope::default();
        let alias = scope.alias(&schema.name);

        let mut binder = Binder::new();
        let filter = self.filter(&schema, &alias, query, &mut binder)?;
        let table = self.table(&schema.name);

        let counted = match schema.identity_fields().next() {
            Some(field) => Qualified(alias.as_str(), field.name.as_str()).render(),
            None => "*".to_string(),
        };

        let mut sql = String::new();
        let f = &mut Formatter::new(&mut sql, self.dialect);
        fmt!(f, "SELECT count(" counted.as_str() ") FROM " table.as_str() " " alias.as_str());
        if let Some(filter) = &filter {
            fmt!(f, " WHERE " filter);
        }

        let mut meta = StatementMeta::new(StatementKind::Count, &schema.name, sql);
        meta.params = binder.finish()?;
        tracing::debug!(sql = %meta.sql, "compiled count");
        Ok(meta)
    }

    fn requested<'s>(&self, schema: &'s ModelSchema, request: &[String]) -> Result<Vec<&'s FieldSchema>> {
        if request.is_empty() {
            return Ok(schema.fields.iter().collect());
        }

        request
            .iter()
            .map(|name| {
                schema
                    .field(name)
                    .ok_or_else(|| Error::field_not_found(&schema.name, name))
            })
            .collect()
    }

    /// The column and select expression for one field, or `None` when the
    /// field is not stored in a way a select can read.
    fn column(
        &self,
        owner: &ModelSchema,
        alias: &str,
        field: &FieldSchema,
        scope: &mut Scope,
        chain: &mut Vec<String>,
        nested: bool,
    ) -> Result<Option<(Column, String)>> {
        if !field.is_persisted() {
            return Ok(None);
        }

        if field.referenced {
            let Some(child) = field.base_model.as_deref() else {
                return Ok(None);
            };
            if chain.iter().any(|model| model == child) && nested {
                tracing::debug!(field = %field.name, model = child, "not expanding recursive reference");
                return Ok(None);
            }
            return self.referenced(owner, alias, field, child, scope, chain).map(Some);
        }

        if !field.is_column() || (nested && field.kind == Kind::Blob) {
            return Ok(None);
        }

        let column_ref = Qualified(alias, field.name.as_str()).render();
        let (shape, expr) = match field.kind {
            Kind::Model => {
                let model = field.base_model.clone().unwrap_or_default();
                (Shape::Foreign { model }, column_ref)
            }
            Kind::List => {
                let element = field
                    .base_type
                    .as_deref()
                    .and_then(Kind::parse)
                    .filter(|kind| kind.is_scalar());
                let expr = if nested {
                    self.dialect.embed_json(&column_ref)
                } else {
                    column_ref
                };
                (Shape::JsonList { element }, expr)
            }
            _ => (Shape::Scalar, column_ref),
        };

        let column = Column {
            field: field.name.clone(),
            kind: column_kind(field),
            shape,
        };
        Ok(Some((column, expr)))
    }

    /// A correlated sub-select aggregating the children of `field` into JSON.
    fn referenced(
        &self,
        owner: &ModelSchema,
        owner_alias: &str,
        field: &FieldSchema,
        child: &str,
        scope: &mut Scope,
        chain: &mut Vec<String>,
    ) -> Result<(Column, String)> {
        let owner_key = owner
            .sequence_field()
            .or_else(|| owner.identity_fields().find(|field| field.kind == Kind::Long))
            .ok_or_else(|| {
                Error::invalid_statement(format!(
                    "`{}` needs a numeric identity to own referenced `{}`",
                    owner.name, field.name
                ))
            })?;

        let schema = self.registry.require(child)?;
        for required in [names::REFERENCE_ID, names::REFERENCE_TYPE] {
            if !schema.has_field(required) {
                return Err(Error::invalid_statement(format!(
                    "`{child}` lacks `{required}` and cannot be referenced"
                )));
            }
        }

        let alias = scope.alias(&schema.name);
        chain.push(schema.name.clone());

        let mut columns = vec![];
        let mut pairs = vec![];
        for child_field in &schema.fields {
            let Some((column, expr)) = self.column(&schema, &alias, child_field, scope, chain, true)? else {
                continue;
            };
            let expr = match column.shape {
                Shape::Referenced(_) => self.dialect.embed_json(&expr),
                _ => expr,
            };
            pairs.push((column.field.clone(), expr));
            columns.push(column);
        }

        chain.pop();

        let from = format!("{} {alias}", self.table(&schema.name));
        let filter = format!(
            "{} = {} AND {} = {}",
            Qualified(alias.as_str(), names::REFERENCE_TYPE).render(),
            naming::literal(&owner.name),
            Qualified(alias.as_str(), names::REFERENCE_ID).render(),
            Qualified(owner_alias, owner_key.name.as_str()).render(),
        );
        let expr = self.dialect.aggregate(&pairs, &from, &filter);

        let column = Column {
            field: field.name.clone(),
            kind: Kind::List,
            shape: Shape::Referenced(Box::new(SubSelect {
                model: schema.name.clone(),
                alias,
                columns,
            })),
        };
        Ok((column, expr))
    }

    /// `ORDER BY` on the query's sort field, falling back to the schema's
    /// default sort and then to the sequence identity, plus `LIMIT`/`OFFSET`
    /// when the query itself names a sort field and a page size.
    fn order_and_page(&self, f: &mut Formatter<'_>, schema: &ModelSchema, alias: &str, query: &Query) -> Result<()> {
        let (sort, order) = match query.sort_field() {
            Some(sort) => (sort, query.order()),
            None => match default_order(schema) {
                Some(default) => default,
                None => return Ok(()),
            },
        };

        match schema.field(sort) {
            Some(field) if field.is_column() => {}
            Some(_) => {
                return Err(Error::invalid_statement(format!(
                    "cannot sort `{}` on `{sort}`, which is not a column",
                    schema.name
                )))
            }
            None => return Err(Error::field_not_found(&schema.name, sort)),
        }

        let order = match order {
            Order::Ascending => " ASC",
            Order::Descending => " DESC",
        };
        fmt!(f, " ORDER BY " Qualified(alias, sort) order);

        if query.is_paginated() {
            fmt!(f, " LIMIT " query.count() " OFFSET " query.start());
        }
        Ok(())
    }
}

fn default_order(schema: &ModelSchema) -> Option<(&str, Order)> {
    if let Some(sort) = schema.sort_field.as_deref() {
        return Some((sort, schema.sort_order));
    }
    schema
        .sequence_field()
        .map(|field| (field.name.as_str(), Order::Ascending))
}

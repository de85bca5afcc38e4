use super::Compiler;
use crate::{
    binder::{column_kind, column_param, element_json},
    delim::Join,
    fmt::{Formatter, ToSql},
    ident::Qualified,
    Binder,
};

use stratum_core::{
    driver::Param, schema::ModelSchema, Comparator, Error, Kind, Query, QueryField, Result, Value,
};

impl Compiler<'_> {
    /// The `WHERE` condition of `query`, or `None` when it has no
    /// predicates.
    pub(super) fn filter(
        &self,
        schema: &ModelSchema,
        alias: &str,
        query: &Query,
        binder: &mut Binder,
    ) -> Result<Option<String>> {
        self.group(schema, alias, query.comparator(), query.fields(), binder)
    }

    fn group(
        &self,
        schema: &ModelSchema,
        alias: &str,
        comparator: Comparator,
        fields: &[QueryField],
        binder: &mut Binder,
    ) -> Result<Option<String>> {
        let mut parts = vec![];
        for field in fields {
            if let Some(part) = self.predicate(schema, alias, field, binder)? {
                parts.push(part);
            }
        }

        match parts.len() {
            0 => Ok(None),
            1 => Ok(parts.pop()),
            _ => {
                let sep = match comparator {
                    Comparator::GroupOr => " OR ",
                    _ => " AND ",
                };
                let mut sql = String::new();
                let f = &mut Formatter::new(&mut sql, self.dialect);
                fmt!(f, "(" Join(sep, parts.iter()) ")");
                Ok(Some(sql))
            }
        }
    }

    fn predicate(
        &self,
        schema: &ModelSchema,
        alias: &str,
        predicate: &QueryField,
        binder: &mut Binder,
    ) -> Result<Option<String>> {
        if predicate.is_group() {
            return self.group(schema, alias, predicate.comparator, &predicate.fields, binder);
        }

        let Some(field) = schema.field(&predicate.name) else {
            return Err(Error::field_not_found(&schema.name, &predicate.name));
        };
        if !field.is_column() {
            return Err(Error::invalid_statement(format!(
                "`{}` is not a column of `{}` and cannot be filtered on",
                field.name, schema.name
            )));
        }

        let column = Qualified(alias, field.name.as_str()).render();
        let value = &predicate.value;

        let sql = match predicate.comparator {
            Comparator::Equals | Comparator::NotEquals if value.is_null() => {
                let not = if predicate.comparator == Comparator::NotEquals { " NOT" } else { "" };
                format!("{column} IS{not} NULL")
            }
            Comparator::Like => {
                let Some(pattern) = value.as_str() else {
                    return Err(Error::invalid_statement(format!(
                        "LIKE on `{}` needs a string value",
                        field.name
                    )));
                };
                let pattern = if pattern.contains('%') {
                    pattern.to_string()
                } else {
                    format!("%{pattern}%")
                };
                let placeholder = binder.push(Param::new(Kind::String, Value::String(pattern)));
                self.render(|f| fmt!(f, column.as_str() " LIKE " placeholder))
            }
            Comparator::In | Comparator::NotIn => {
                let Value::List(items) = value else {
                    return Err(Error::invalid_statement(format!(
                        "IN on `{}` needs a list value",
                        field.name
                    )));
                };
                if field.kind == Kind::List {
                    return Err(Error::invalid_statement(format!(
                        "IN is not supported on list field `{}`",
                        field.name
                    )));
                }
                let items = items
                    .iter()
                    .map(|item| column_param(field, item).map(|param| param.value))
                    .collect::<Result<Vec<_>>>()?;
                let negate = predicate.comparator == Comparator::NotIn;
                self.dialect
                    .in_list(binder, &column, column_kind(field), items, negate)
            }
            Comparator::Any | Comparator::NotAny => {
                if field.kind != Kind::List {
                    return Err(Error::invalid_statement(format!(
                        "ANY needs a list field; `{}` is {}",
                        field.name, field.kind
                    )));
                }
                let element = element_json(field, value)?;
                let negate = predicate.comparator == Comparator::NotAny;
                self.dialect.membership(binder, &column, &element, negate)
            }
            comparator => {
                let op = match comparator {
                    Comparator::Equals => " = ",
                    Comparator::NotEquals => " <> ",
                    Comparator::GreaterThan => " > ",
                    Comparator::GreaterThanOrEquals => " >= ",
                    Comparator::LessThan => " < ",
                    Comparator::LessThanOrEquals => " <= ",
                    _ => {
                        return Err(Error::invalid_statement(format!(
                            "unsupported comparator {comparator:?} on `{}`",
                            field.name
                        )))
                    }
                };
                let placeholder = binder.push(column_param(field, value)?);
                self.render(|f| fmt!(f, column.as_str() op placeholder))
            }
        };

        Ok(Some(sql))
    }

    fn render(&self, write: impl FnOnce(&mut Formatter<'_>)) -> String {
        let mut sql = String::new();
        write(&mut Formatter::new(&mut sql, self.dialect));
        sql
    }
}

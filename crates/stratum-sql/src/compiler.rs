mod filter;
mod select;
mod write;

use crate::{naming, SqlDialect};

use stratum_core::{schema::ModelSchema, Error, Result, SchemaRegistry};

/// Compiles one statement per call from a schema and a record or query.
///
/// The compiler holds no per-statement state; aliases are numbered within
/// each compiled statement.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'a> {
    registry: &'a SchemaRegistry,
    dialect: &'a dyn SqlDialect,
    prefix: &'a str,
}

/// Alias numbering within one statement.
#[derive(Debug, Default)]
struct Scope {
    ordinal: usize,
}

impl Scope {
    fn alias(&mut self, model: &str) -> String {
        self.ordinal += 1;
        naming::alias(model, self.ordinal)
    }
}

impl<'a> Compiler<'a> {
    pub fn new(registry: &'a SchemaRegistry, dialect: &'a dyn SqlDialect, prefix: &'a str) -> Compiler<'a> {
        Compiler {
            registry,
            dialect,
            prefix,
        }
    }

    pub fn dialect(&self) -> &'a dyn SqlDialect {
        self.dialect
    }

    pub fn table(&self, model: &str) -> String {
        naming::table_name(self.prefix, model)
    }

    fn concrete(&self, schema: &ModelSchema) -> Result<()> {
        if schema.is_abstract {
            return Err(Error::invalid_statement(format!(
                "`{}` is abstract and has no table",
                schema.name
            )));
        }
        if !schema.has_identity() {
            return Err(Error::identity_missing(&schema.name));
        }
        Ok(())
    }
}

mod builder;
pub use builder::Builder;

pub mod connect;

mod pool;
pub use pool::{Pool, PoolConfig, PoolConnection};

use std::sync::Arc;
use stratum_core::{
    driver::{Driver, Operation, Response},
    schema::names,
    Error, Query, QueryResult, Reader, Record, RecordFactory, RecordKey, Result, Search, Value,
    Writer,
};
use stratum_sql::{binder::bind_record, ddl, Compiler, Materializer, SqlDialect};

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    pub(crate) factory: Arc<RecordFactory>,
    pub(crate) dialect: &'static dyn SqlDialect,
    pub(crate) prefix: String,
    pub(crate) pool: Pool,
}

/// A relational database handle.
///
/// Every statement checks a connection out of the pool and returns it when
/// done; there is no transaction spanning statements. Cloning is cheap and
/// shares the pool.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn factory(&self) -> &Arc<RecordFactory> {
        &self.shared.factory
    }

    pub fn driver(&self) -> &dyn Driver {
        self.shared.pool.driver()
    }

    pub fn table_prefix(&self) -> &str {
        &self.shared.prefix
    }

    /// The statement compiler for this database.
    pub fn compiler(&self) -> Compiler<'_> {
        Compiler::new(
            self.shared.factory.registry(),
            self.shared.dialect,
            &self.shared.prefix,
        )
    }

    /// Runs one operation on a pooled connection.
    pub fn exec(&self, op: Operation) -> Result<Response> {
        let mut connection = self.shared.pool.get()?;
        connection.exec(op)
    }

    /// Creates the table and indexes of `model` if they do not exist.
    pub fn create_table(&self, model: &str) -> Result<()> {
        let schema = self.shared.factory.schema(model)?;
        for sql in ddl::create_table(self.shared.dialect, &self.shared.prefix, &schema)? {
            tracing::debug!(%sql, "create table");
            self.exec(Operation::execute(sql, vec![]))?;
        }
        Ok(())
    }

    fn insert(&self, record: &mut Record) -> Result<bool> {
        let schema = record.schema().clone();

        if let Some(field) = schema.generated_field() {
            if record.value(&field.name).map_or(true, Value::is_empty) {
                record.set(&field.name, uuid::Uuid::new_v4().to_string())?;
            }
        }

        let meta = self.compiler().insert(record)?;
        let params = bind_record(&meta, record)?;
        let response = self.exec(meta.operation(params))?;

        if let Some(returning) = &meta.returning {
            let id = response
                .into_rows()
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .and_then(|value| value.as_long())
                .ok_or_else(|| Error::invalid_statement("insert did not return an identity"))?;
            record.set(returning, Value::Long(id))?;
        }

        tracing::debug!(model = record.model(), id = ?record.get_long(names::ID).ok().flatten(), "inserted record");
        self.write_references(record)?;
        Ok(true)
    }

    fn update(&self, record: &mut Record) -> Result<bool> {
        let updated = match self.compiler().update(record)? {
            Some(meta) => {
                let params = bind_record(&meta, record)?;
                let affected = self.exec(meta.operation(params))?.affected();
                if affected == 0 {
                    tracing::debug!(model = record.model(), "update matched no rows");
                }
                affected > 0
            }
            None => false,
        };

        let referenced = self.write_references(record)?;
        Ok(updated || referenced)
    }

    /// Writes the children of every referenced list `record` holds, pointing
    /// each back at `record`. Children are written one statement at a time,
    /// so a failure part way leaves the earlier children written.
    fn write_references(&self, record: &mut Record) -> Result<bool> {
        let schema = record.schema().clone();
        let mut wrote = false;

        for field in schema.fields.iter().filter(|field| field.is_model_list() && field.referenced) {
            let Some(Value::List(items)) = record.value(&field.name).cloned() else {
                continue;
            };
            if items.is_empty() {
                continue;
            }

            let Some(parent) = record.value(names::ID).and_then(Value::as_long).filter(|id| *id > 0) else {
                return Err(Error::identity_missing(record.model()));
            };

            let mut children = Vec::with_capacity(items.len());
            for item in items {
                let Value::Model(child) = item else {
                    return Err(Error::invalid_statement(format!(
                        "`{}.{}` holds a value that is not a record",
                        record.model(),
                        field.name
                    )));
                };

                let mut child = Record::clone(&child);
                child.set(names::REFERENCE_ID, parent)?;
                child.set(names::REFERENCE_TYPE, record.model())?;
                self.write(&mut child)?;
                children.push(Value::from(child));
            }

            record.set(&field.name, Value::List(children))?;
            wrote = true;
        }

        Ok(wrote)
    }
}

impl Reader for Db {
    fn read(&self, model: &str, key: &RecordKey) -> Result<Record> {
        let query = Query::by_key(model, key);
        self.find(&query)?
            .records
            .into_iter()
            .next()
            .ok_or_else(|| Error::record_not_found(format!("{model} {key}")))
    }
}

impl Writer for Db {
    /// Inserts `record` when it holds no identity, otherwise updates it.
    fn write(&self, record: &mut Record) -> Result<bool> {
        match record.identity() {
            None => self.insert(record),
            Some(_) => self.update(record),
        }
    }

    fn delete(&self, record: &Record) -> Result<bool> {
        if record.identity().is_none() {
            return Err(Error::identity_missing(record.model()));
        }

        let meta = self.compiler().delete(record)?;
        let params = bind_record(&meta, record)?;
        Ok(self.exec(meta.operation(params))?.affected() > 0)
    }
}

impl Search for Db {
    fn find(&self, query: &Query) -> Result<QueryResult> {
        let meta = self.compiler().select(query)?;
        let rows = self.exec(meta.query_operation())?.into_rows();

        let materializer = Materializer::new(&self.shared.factory, self.shared.dialect);
        let records = rows
            .into_iter()
            .map(|row| materializer.record(&meta, row))
            .collect::<Result<Vec<_>>>()?;

        let total_count = match query.is_paginated() {
            true => self.count(query)?,
            false => records.len() as u64,
        };

        Ok(QueryResult {
            model: query.model().to_string(),
            records,
            total_count: Some(total_count),
        })
    }

    fn count(&self, query: &Query) -> Result<u64> {
        let meta = self.compiler().count(query)?;
        let count = self
            .exec(meta.query_operation())?
            .into_rows()
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .and_then(|value| value.as_long())
            .unwrap_or(0);
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

impl core::fmt::Debug for Db {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Db")
            .field("url", &self.driver().url())
            .field("prefix", &self.shared.prefix)
            .field("pool_size", &self.shared.pool.max_size())
            .finish()
    }
}

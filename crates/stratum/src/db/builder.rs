use super::{pool::PoolConfig, Db, Pool, Shared};

use std::sync::Arc;
use stratum_core::{
    config::{DatabaseConfig, DEFAULT_TABLE_PREFIX},
    driver::Driver,
    RecordFactory, Result,
};

pub struct Builder {
    factory: Option<Arc<RecordFactory>>,
    table_prefix: String,
    pool: PoolConfig,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            factory: None,
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl Builder {
    /// A builder seeded from the `database` section of a configuration
    /// file. The URL is left to [`connect`](Builder::connect).
    pub fn from_config(config: &DatabaseConfig) -> Builder {
        let mut builder = Builder::default();
        builder.table_prefix(&config.table_prefix);
        if let Some(max_connections) = config.max_connections {
            builder.max_connections(max_connections);
        }
        builder
    }

    /// The factory records are built from. Required.
    pub fn factory(&mut self, factory: Arc<RecordFactory>) -> &mut Self {
        self.factory = Some(factory);
        self
    }

    /// Set the table name prefix for all tables
    pub fn table_prefix(&mut self, prefix: &str) -> &mut Self {
        self.table_prefix = prefix.to_string();
        self
    }

    pub fn max_connections(&mut self, max_connections: usize) -> &mut Self {
        self.pool.max_size = max_connections;
        self
    }

    pub fn pool_config(&mut self, config: PoolConfig) -> &mut Self {
        self.pool = config;
        self
    }

    pub fn connect(&mut self, url: &str) -> Result<Db> {
        self.build_boxed(super::connect::driver(url)?)
    }

    pub fn build(&mut self, driver: impl Driver) -> Result<Db> {
        self.build_boxed(Box::new(driver))
    }

    fn build_boxed(&mut self, driver: Box<dyn Driver>) -> Result<Db> {
        let Some(factory) = self.factory.clone() else {
            return Err(stratum_core::err!("a record factory must be set before connecting"));
        };

        let dialect = stratum_sql::dialect::strategy(driver.dialect());
        let pool = Pool::new(driver, self.pool.clone())?;

        Ok(Db {
            shared: Arc::new(Shared {
                factory,
                dialect,
                prefix: self.table_prefix.clone(),
                pool,
            }),
        })
    }
}

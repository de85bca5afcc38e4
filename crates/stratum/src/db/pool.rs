//! Connection pooling for database connections.

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
    time::Duration,
};
use stratum_core::{driver::Driver, Connection, Error, Result};

/// Get the default maximum size of a pool, which is `cpu_core_count * 2`
/// including logical cores.
fn default_max_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(4)
}

/// Configuration for connection pool behavior.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_size: usize,

    /// How long [`Pool::get`] waits for a free connection.
    pub timeout: Duration,
}

impl PoolConfig {
    pub fn new() -> Self {
        Self {
            max_size: default_max_size(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A connection pool that manages database connections.
///
/// Connections open lazily up to the size limit and are never reaped while
/// idle, so an in-memory database lives as long as the pool.
#[derive(Debug)]
pub struct Pool {
    inner: r2d2::Pool<Manager>,
    driver: Arc<dyn Driver>,
}

impl Pool {
    /// Creates a new connection pool from the given driver.
    ///
    /// One connection is opened up front so a bad URL or an unreachable
    /// server fails here with the driver's own error.
    pub fn new(driver: Box<dyn Driver>, config: PoolConfig) -> Result<Self> {
        let mut max_size = config.max_size;
        if let Some(max_connections) = driver.max_connections() {
            max_size = max_size.min(max_connections);
        }
        if max_size == 0 {
            return Err(Error::connection_pool("pool size must be at least 1"));
        }
        if config.timeout.is_zero() {
            return Err(Error::connection_pool("pool timeout must be positive"));
        }

        let driver: Arc<dyn Driver> = Arc::from(driver);
        let manager = Manager {
            driver: driver.clone(),
        };
        drop(r2d2::ManageConnection::connect(&manager)?);

        let url = manager.driver.url().into_owned();
        let inner = r2d2::Pool::builder()
            .max_size(u32::try_from(max_size).unwrap_or(u32::MAX))
            .min_idle(Some(0))
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_timeout(config.timeout)
            .error_handler(Box::new(LogErrors))
            .build(manager)
            .map_err(|err| Error::connection_pool(err.to_string()))?;

        tracing::debug!(%url, max_size, "opened connection pool");
        Ok(Self { inner, driver })
    }

    /// Retrieves a connection from the pool, waiting up to the configured
    /// timeout when every connection is checked out.
    pub fn get(&self) -> Result<PoolConnection> {
        let connection = self
            .inner
            .get()
            .map_err(|err| Error::connection_pool(err.to_string()))?;
        Ok(PoolConnection { inner: connection })
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn max_size(&self) -> usize {
        self.inner.max_size() as usize
    }
}

#[derive(Debug)]
struct Manager {
    driver: Arc<dyn Driver>,
}

impl r2d2::ManageConnection for Manager {
    type Connection = Box<dyn Connection>;
    type Error = Error;

    fn connect(&self) -> Result<Self::Connection> {
        self.driver.connect()
    }

    fn is_valid(&self, _conn: &mut Self::Connection) -> Result<()> {
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// Reports background connection failures through `tracing`.
#[derive(Debug)]
struct LogErrors;

impl r2d2::HandleError<Error> for LogErrors {
    fn handle_error(&self, error: Error) {
        tracing::warn!(%error, "pooled connection failed");
    }
}

/// A connection retrieved from a pool.
///
/// When dropped, the connection is returned to the pool for reuse.
#[derive(Debug)]
pub struct PoolConnection {
    inner: r2d2::PooledConnection<Manager>,
}

impl Deref for PoolConnection {
    type Target = Box<dyn Connection>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PoolConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

use super::Error;

#[derive(Debug)]
pub(super) struct ConnectionPoolError {
    message: Box<str>,
}

impl std::error::Error for ConnectionPoolError {}

impl core::fmt::Display for ConnectionPoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "connection pool error: {}", self.message)
    }
}

impl Error {
    pub fn connection_pool(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ConnectionPool(ConnectionPoolError {
            message: message.into().into(),
        }))
    }

    pub fn is_connection_pool(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ConnectionPool(_))
    }
}

use super::Error;

#[derive(Debug)]
pub(super) struct SerializationError {
    message: Box<str>,
}

impl std::error::Error for SerializationError {}

impl core::fmt::Display for SerializationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "serialization failed: {}", self.message)
    }
}

impl Error {
    /// Creates a serialization error.
    ///
    /// Returned when a record, an index, or a wire payload cannot be encoded
    /// or decoded.
    pub fn serialization(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Serialization(SerializationError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a serialization error.
    pub fn is_serialization(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Serialization(_))
    }
}

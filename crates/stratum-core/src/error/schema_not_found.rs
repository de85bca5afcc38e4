use super::Error;

/// Error when a model name resolves to no schema, either because no source
/// provides it or because its resource is malformed.
#[derive(Debug)]
pub(super) struct SchemaNotFound {
    model: Box<str>,
}

impl std::error::Error for SchemaNotFound {}

impl core::fmt::Display for SchemaNotFound {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "schema not found: {}", self.model)
    }
}

impl Error {
    pub fn schema_not_found(model: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::SchemaNotFound(SchemaNotFound {
            model: model.into().into(),
        }))
    }

    pub fn is_schema_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::SchemaNotFound(_))
    }
}

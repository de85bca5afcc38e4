use super::Error;

#[derive(Debug)]
pub(super) struct FieldNotFound {
    model: Box<str>,
    field: Box<str>,
}

impl std::error::Error for FieldNotFound {}

impl core::fmt::Display for FieldNotFound {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "field `{}` not found on model `{}`", self.field, self.model)
    }
}

impl Error {
    /// Creates an error for a field name the model does not declare.
    pub fn field_not_found(model: impl Into<String>, field: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::FieldNotFound(FieldNotFound {
            model: model.into().into(),
            field: field.into().into(),
        }))
    }

    /// Returns `true` if this error is a field not found error.
    pub fn is_field_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::FieldNotFound(_))
    }
}

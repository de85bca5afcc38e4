use super::Error;

/// Error when a placeholder (`flex`) cell is read or written before it has
/// been concretized.
#[derive(Debug)]
pub(super) struct AbstractFieldAccess {
    field: Box<str>,
}

impl std::error::Error for AbstractFieldAccess {}

impl core::fmt::Display for AbstractFieldAccess {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "field `{}` has a placeholder kind and cannot be accessed directly",
            self.field
        )
    }
}

impl Error {
    /// Creates an abstract field access error.
    pub fn abstract_field_access(field: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::AbstractFieldAccess(AbstractFieldAccess {
            field: field.into().into(),
        }))
    }

    /// Returns `true` if this error is an abstract field access error.
    pub fn is_abstract_field_access(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::AbstractFieldAccess(_))
    }
}

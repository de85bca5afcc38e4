use super::Error;
use crate::Kind;

/// Error when a value does not fit the kind its cell declares.
#[derive(Debug)]
pub(super) struct ValueTypeMismatch {
    field: Box<str>,
    expected: Kind,
    actual: Option<Kind>,
}

impl std::error::Error for ValueTypeMismatch {}

impl core::fmt::Display for ValueTypeMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "field `{}` expects {}", self.field, self.expected)?;
        match self.actual {
            Some(actual) => write!(f, " but got {}", actual),
            None => f.write_str(" but got null"),
        }
    }
}

impl Error {
    pub fn value_type_mismatch(
        field: impl Into<String>,
        expected: Kind,
        actual: Option<Kind>,
    ) -> Error {
        Error::from(super::ErrorKind::ValueTypeMismatch(ValueTypeMismatch {
            field: field.into().into(),
            expected,
            actual,
        }))
    }

    pub fn is_value_type_mismatch(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ValueTypeMismatch(_))
    }
}

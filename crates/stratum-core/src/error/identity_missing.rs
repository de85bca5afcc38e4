use super::Error;

/// Error when a write path needs an identity value and the record carries
/// none, or the model declares no identity field at all.
#[derive(Debug)]
pub(super) struct IdentityMissing {
    model: Box<str>,
}

impl std::error::Error for IdentityMissing {}

impl core::fmt::Display for IdentityMissing {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "no identity field provided for `{}`", self.model)
    }
}

impl Error {
    pub fn identity_missing(model: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::IdentityMissing(IdentityMissing {
            model: model.into().into(),
        }))
    }

    pub fn is_identity_missing(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::IdentityMissing(_))
    }
}

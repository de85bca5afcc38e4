use super::Error;

#[derive(Debug)]
pub(super) struct PrototypeReadOnly {
    model: Box<str>,
}

impl std::error::Error for PrototypeReadOnly {}

impl core::fmt::Display for PrototypeReadOnly {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "prototype of `{}` is read-only", self.model)
    }
}

impl Error {
    /// Creates an error for a mutation attempted on a prototype record.
    pub fn prototype_read_only(model: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::PrototypeReadOnly(PrototypeReadOnly {
            model: model.into().into(),
        }))
    }

    pub fn is_prototype_read_only(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::PrototypeReadOnly(_))
    }
}

use super::Error;

/// The index holds no entry matching the record's identity.
#[derive(Debug)]
pub(super) struct IndexEntryNotFound {
    model: Box<str>,
}

impl std::error::Error for IndexEntryNotFound {}

impl core::fmt::Display for IndexEntryNotFound {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "index entry not found for `{}`", self.model)
    }
}

/// The index already holds an entry with the record's identity.
#[derive(Debug)]
pub(super) struct IndexEntryAlreadyExists {
    model: Box<str>,
}

impl std::error::Error for IndexEntryAlreadyExists {}

impl core::fmt::Display for IndexEntryAlreadyExists {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "index entry already exists for `{}`", self.model)
    }
}

/// The record carries neither an `id` nor an `objectId`, or it belongs to a
/// different model than the indexer.
#[derive(Debug)]
pub(super) struct NotIndexable {
    model: Box<str>,
    reason: Box<str>,
}

impl std::error::Error for NotIndexable {}

impl core::fmt::Display for NotIndexable {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "`{}` record is not indexable: {}", self.model, self.reason)
    }
}

impl Error {
    pub fn index_entry_not_found(model: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::IndexEntryNotFound(IndexEntryNotFound {
            model: model.into().into(),
        }))
    }

    pub fn is_index_entry_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::IndexEntryNotFound(_))
    }

    pub fn index_entry_already_exists(model: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::IndexEntryAlreadyExists(
            IndexEntryAlreadyExists {
                model: model.into().into(),
            },
        ))
    }

    pub fn is_index_entry_already_exists(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::IndexEntryAlreadyExists(_))
    }

    pub fn not_indexable(model: impl Into<String>, reason: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::NotIndexable(NotIndexable {
            model: model.into().into(),
            reason: reason.into().into(),
        }))
    }

    pub fn is_not_indexable(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NotIndexable(_))
    }
}

use super::Error;

/// Error when the file backend fails to read or write its storage: loose
/// files, index files, or the archive.
#[derive(Debug)]
pub(super) struct StoreIo {
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for StoreIo {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for StoreIo {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "store I/O failed: {}", self.inner)
    }
}

impl Error {
    pub fn store_io(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::StoreIo(StoreIo {
            inner: Box::new(err),
        }))
    }

    pub fn is_store_io(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::StoreIo(_))
    }
}

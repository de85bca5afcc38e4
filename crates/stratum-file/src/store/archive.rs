use crate::{IndexEntry, RecordStore};

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use stratum_core::{Error, Result};
use tempfile::NamedTempFile;
use zip::{result::ZipError, write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

/// Every record as a named entry of one zip archive.
///
/// Zip has no in-place update, so each write or removal rewrites the whole
/// archive into a temporary file that then replaces the original. One lock
/// per store serializes mutation; share a single store per archive.
#[derive(Debug)]
pub struct ArchiveStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> ArchiveStore {
        ArchiveStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of every entry in the archive.
    pub fn names(&self) -> Result<Vec<String>> {
        let _guard = self.guard()?;
        let Some(archive) = self.open()? else {
            return Ok(vec![]);
        };
        Ok(archive.file_names().map(str::to_string).collect())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| stratum_core::err!("archive lock poisoned: {}", self.path.display()))
    }

    fn open(&self) -> Result<Option<ZipArchive<File>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::store_io(err)),
        };
        ZipArchive::new(file).map(Some).map_err(Error::store_io)
    }

    /// Copies every entry except `skip` into a fresh archive, lets `append`
    /// add to it, then swaps it in. Returns whether `skip` was present.
    fn rewrite(
        &self,
        skip: &str,
        append: impl FnOnce(&mut ZipWriter<&mut File>) -> Result<()>,
    ) -> Result<bool> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(Error::store_io)?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(Error::store_io)?;
        let mut skipped = false;
        {
            let mut writer = ZipWriter::new(temp.as_file_mut());

            if let Some(mut archive) = self.open()? {
                for i in 0..archive.len() {
                    let file = archive.by_index_raw(i).map_err(Error::store_io)?;
                    if file.name() == skip {
                        skipped = true;
                        continue;
                    }
                    writer.raw_copy_file(file).map_err(Error::store_io)?;
                }
            }

            append(&mut writer)?;
            writer.finish().map_err(Error::store_io)?;
        }

        temp.persist(&self.path).map_err(Error::store_io)?;
        Ok(skipped)
    }
}

impl RecordStore for ArchiveStore {
    fn record_name(&self, entry: &IndexEntry) -> String {
        match entry.object_id() {
            Some(object_id) => format!("{object_id}.json"),
            None => format!("{}-{}.json", entry.model, entry.id()),
        }
    }

    fn index_name(&self, model: &str) -> String {
        crate::index_name(model)
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let _guard = self.guard()?;
        let Some(mut archive) = self.open()? else {
            return Ok(None);
        };

        let mut file = match archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(Error::store_io(err)),
        };

        let mut contents = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut contents).map_err(Error::store_io)?;
        Ok(Some(contents))
    }

    fn write(&self, name: &str, contents: &[u8]) -> Result<()> {
        let _guard = self.guard()?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        self.rewrite(name, |writer| {
            writer.start_file(name, options).map_err(Error::store_io)?;
            writer.write_all(contents).map_err(Error::store_io)
        })?;
        tracing::debug!(archive = %self.path.display(), name, "rewrote archive");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let _guard = self.guard()?;
        if !self.path.exists() {
            tracing::warn!(archive = %self.path.display(), "archive does not exist");
            return Ok(false);
        }
        self.rewrite(name, |_| Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_replace_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path().join("stratum.zip"));

        assert_eq!(store.read("a.json").unwrap(), None);
        assert!(!store.remove("a.json").unwrap());

        store.write("a.json", b"{\"v\":1}").unwrap();
        store.write("b.json", b"{\"v\":2}").unwrap();
        store.write("a.json", b"{\"v\":3}").unwrap();

        assert_eq!(store.read("a.json").unwrap().as_deref(), Some(&b"{\"v\":3}"[..]));
        assert_eq!(store.names().unwrap(), ["b.json", "a.json"]);

        assert!(store.remove("b.json").unwrap());
        assert!(!store.remove("b.json").unwrap());
        assert_eq!(store.names().unwrap(), ["a.json"]);
    }
}

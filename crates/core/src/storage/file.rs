use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;

use super::format;
use super::traits::KeyValueStorage;

/// Key-value storage persisted to a single WLKV file (native only).
///
/// The whole map is held in memory and the file is rewritten after every
/// mutation, so a write that returns `Ok` is on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let bytes = std::fs::read(&path)?;
            format::read_file(&bytes)?
        } else {
            BTreeMap::new()
        };
        log::debug!("Opened {} with {} keys", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, then rename over the target.
    fn flush(&self) -> Result<(), CoreError> {
        let bytes = format::write_file(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), CoreError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush() {
            self.entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

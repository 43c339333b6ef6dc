//! File-backed key-value store.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a temporary sibling file that
//! is synced and renamed over the target, so a crash never leaves a half-written
//! blob behind.

use super::KeyValueStore;
use crate::errors::{Error, Result};
use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

/// Store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) the data directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| Error::Storage {
            key: dir.display().to_string(),
            message: format!("Failed to create data directory: {e}"),
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the stored files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`. Characters outside `[A-Za-z0-9._-]` become `_`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn location(&self) -> Option<String> {
        Some(self.dir.display().to_string())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage {
                key: key.to_string(),
                message: format!("Failed to read {}: {e}", path.display()),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let temp = path.with_extension("tmp");

        let written = File::create(&temp)
            .and_then(|mut file| {
                file.write_all(value.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp, &path));

        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(Error::Storage {
                key: key.to_string(),
                message: format!("Failed to write {}: {e}", path.display()),
            });
        }

        debug!(key, bytes = value.len(), path = %path.display(), "wrote store entry");
        Ok(())
    }
}

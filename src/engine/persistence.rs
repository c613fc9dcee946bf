use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;

use crate::{Error, Result};

#[allow(unused_imports)]
use crate::engine::MemStore;

/// Handles disk I/O for the [`MemStore`].
///
/// Persistence uses an atomic "write-then-rename" strategy to ensure data integrity.
/// Each store key is kept in its own `<key>.json` file holding the raw stored string.
pub struct Persistence {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl Persistence {
    /// Initializes a new `Persistence` handler in the specified directory.
    ///
    /// If the directory does not exist, it will be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self {
            data_dir: dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(Error::Internal(format!("invalid store key: {:?}", key)));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }

    /// Writes a single key's value to its file atomically.
    ///
    /// This method writes to a temporary file first and then renames it to the
    /// final destination, preventing file corruption during power failures.
    pub fn save_key(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.key_path(key)?;
        let temp_path = file_path.with_extension("json.tmp");

        fs::write(&temp_path, value.as_bytes())?;
        fs::rename(&temp_path, &file_path)?;

        Ok(())
    }

    /// Deletes the file backing `key`, if any.
    pub fn remove_key(&self, key: &str) -> Result<()> {
        let file_path = self.key_path(key)?;
        match fs::remove_file(&file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Brings the file for `key` in line with the value returned by `current`.
    ///
    /// `current` is evaluated while holding the write lock, so concurrent syncs of
    /// the same key always leave the most recent value on disk.
    pub fn sync_key<F>(&self, key: &str, current: F) -> Result<()>
    where
        F: FnOnce() -> Result<Option<String>>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::Internal("persistence lock poisoned".to_string()))?;
        match current()? {
            Some(value) => self.save_key(key, &value),
            None => self.remove_key(key),
        }
    }

    /// Loads every key found in the data directory.
    ///
    /// Files that cannot be read are skipped with a warning. Contents are not
    /// parsed here; a malformed collection surfaces when it is listed.
    pub fn load_all(&self) -> Result<HashMap<String, String>> {
        let mut all_data = HashMap::new();

        if !self.data_dir.exists() {
            return Ok(all_data);
        }

        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let key = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| Error::Internal("Invalid filename".to_string()))?
                    .to_string();

                let content = match fs::read_to_string(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("Could not read key file {:?}: {}", path, e);
                        continue;
                    }
                };

                all_data.insert(key, content);
            }
        }

        Ok(all_data)
    }
}

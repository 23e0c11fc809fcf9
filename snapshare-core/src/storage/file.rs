use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{SnapError, SnapResult};
use crate::storage::KeyValueStorage;

const EXTENSION: &str = "json";

/// One `<key>.json` file per key inside a data directory.
///
/// The directory is created on the first write; until then every key reads
/// as absent.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> SnapResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(SnapError::InvalidInput(format!("'{key}' is not a valid storage key")));
        }
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }

    /// Dot-prefixed and not `.json`, so `keys` never lists it.
    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.{EXTENSION}.tmp"))
    }
}

fn unavailable(action: &str, path: &Path, err: std::io::Error) -> SnapError {
    SnapError::StorageUnavailable(format!("could not {action} {}: {err}", path.display()))
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> SnapResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable("read", &path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> SnapResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| unavailable("create", &self.dir, e))?;

        // Write to a temp file first, then rename over the record so a crash
        // never leaves it truncated.
        let temp = self.temp_path_for(key);
        std::fs::write(&temp, value).map_err(|e| unavailable("write", &temp, e))?;
        std::fs::rename(&temp, &path).map_err(|e| unavailable("replace", &path, e))
    }

    fn remove(&self, key: &str) -> SnapResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable("delete", &path, e)),
        }
    }

    fn keys(&self) -> SnapResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unavailable("list", &self.dir, e)),
        };

        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == EXTENSION))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();

        keys.sort();
        Ok(keys)
    }
}

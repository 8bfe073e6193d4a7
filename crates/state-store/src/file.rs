// In crates/state-store/src/file.rs

//! JSON persistence shared by every store.
//!
//! Writes go to a sibling `.tmp` file which is then renamed over the target,
//! so a reader sees either the previous document or the new one, never a
//! partial write.

use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads and parses a JSON document. A missing file is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| Error::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads a store document, falling back to the empty default when the file is
/// missing, unreadable or malformed.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path, store: &str) -> T {
    match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            tracing::debug!(store, path = %path.display(), "No persisted state found, starting empty.");
            T::default()
        }
        Err(e) => {
            tracing::warn!(store, error = %e, "Ignoring unreadable persisted state, starting empty.");
            T::default()
        }
    }
}

/// Serializes `value` and atomically replaces `path` with it.
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, body).map_err(|source| Error::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<BTreeMap<String, u32>> = read_json(&dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn malformed_file_is_reported_as_corrupt_and_defaults_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_json::<BTreeMap<String, u32>>(&path).unwrap_err();
        assert!(matches!(err, Error::Corrupt { .. }));

        let loaded: BTreeMap<String, u32> = load_or_default(&path, "test");
        assert!(loaded.is_empty());
    }

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let mut value = BTreeMap::new();
        value.insert("AAPL".to_string(), 3u32);

        write_atomic(&path, &value).unwrap();

        assert_eq!(read_json::<BTreeMap<String, u32>>(&path).unwrap(), Some(value));
        assert!(!tmp_path_for(&path).exists());
    }

    #[test]
    fn write_atomic_replaces_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        write_atomic(&path, &vec![1, 2, 3]).unwrap();
        write_atomic(&path, &vec![4]).unwrap();

        assert_eq!(read_json::<Vec<u32>>(&path).unwrap(), Some(vec![4]));
    }
}

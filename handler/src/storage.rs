// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::error::ErrorKind;
use anyhow::Error;
use serde_json::Value as Json;
use std::{
    collections::HashMap,
    fs,
    io,
    path::{Path, PathBuf},
};

/// Scoped key-value persistence for trained models.
pub trait ModelStorage {
    /// Store an opaque blob under `key`
    fn file_set(&mut self, key: &str, content: &[u8]) -> Result<(), Error>;

    /// Get the blob stored under `key`
    fn file_get(&self, key: &str) -> Result<Vec<u8>, Error>;

    /// Store a JSON document under `key`
    fn json_set(&mut self, key: &str, content: &Json) -> Result<(), Error>;

    /// Get the JSON document stored under `key`
    fn json_get(&self, key: &str) -> Result<Json, Error>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: HashMap<String, Vec<u8>>,
    documents: HashMap<String, Json>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStorage for MemoryStorage {
    fn file_set(&mut self, key: &str, content: &[u8]) -> Result<(), Error> {
        self.files.insert(key.into(), content.to_vec());
        Ok(())
    }

    fn file_get(&self, key: &str) -> Result<Vec<u8>, Error> {
        self.files
            .get(key)
            .cloned()
            .ok_or_else(|| ErrorKind::MissingKey(key.into()).into())
    }

    fn json_set(&mut self, key: &str, content: &Json) -> Result<(), Error> {
        self.documents.insert(key.into(), content.clone());
        Ok(())
    }

    fn json_get(&self, key: &str) -> Result<Json, Error> {
        self.documents
            .get(key)
            .cloned()
            .ok_or_else(|| ErrorKind::MissingKey(key.into()).into())
    }
}

/// Storage backed by a single directory, blobs live at `<root>/<key>` and
/// documents at `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str, extension: Option<&str>) -> Result<PathBuf, Error> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(|c: char| c == '/' || c == '\\');

        if !valid {
            return Err(ErrorKind::InvalidKey(key.into()).into());
        }

        let name = match extension {
            Some(extension) => format!("{}.{}", key, extension),
            None => key.to_owned(),
        };

        Ok(self.root.join(name))
    }

    fn read(&self, key: &str, path: &Path) -> Result<Vec<u8>, Error> {
        fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ErrorKind::MissingKey(key.into()).into(),
            _ => e.into(),
        })
    }
}

impl ModelStorage for FileStorage {
    fn file_set(&mut self, key: &str, content: &[u8]) -> Result<(), Error> {
        let path = self.path_for(key, None)?;
        log::debug!("Writing {} bytes to {}", content.len(), path.display());

        fs::write(path, content)?;
        Ok(())
    }

    fn file_get(&self, key: &str) -> Result<Vec<u8>, Error> {
        let path = self.path_for(key, None)?;
        self.read(key, &path)
    }

    fn json_set(&mut self, key: &str, content: &Json) -> Result<(), Error> {
        let path = self.path_for(key, Some("json"))?;
        log::debug!("Writing document to {}", path.display());

        fs::write(path, serde_json::to_vec_pretty(content)?)?;
        Ok(())
    }

    fn json_get(&self, key: &str) -> Result<Json, Error> {
        let path = self.path_for(key, Some("json"))?;
        let contents = self.read(key, &path)?;

        Ok(serde_json::from_slice(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;
    use serde_json::json;

    fn roundtrip(storage: &mut dyn ModelStorage) -> Result<(), Error> {
        storage.file_set("model", &[1, 2, 3])?;
        storage.json_set("args", &json!({ "user_id": "user", "n_users_items": [2, 3] }))?;

        assert_eq!(storage.file_get("model")?, vec![1, 2, 3]);
        assert_eq!(storage.json_get("args")?["n_users_items"], json!([2, 3]));

        storage.file_set("model", &[4])?;
        assert_eq!(storage.file_get("model")?, vec![4]);

        let err = storage.file_get("missing").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::MissingKey("missing".into()))
        );
        assert!(storage.json_get("model").is_err());

        Ok(())
    }

    #[test]
    fn memory_storage_roundtrip() -> Result<(), Error> {
        roundtrip(&mut MemoryStorage::new())
    }

    #[test]
    fn file_storage_roundtrip() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::new(dir.path().join("nested"))?;

        roundtrip(&mut storage)?;
        assert!(dir.path().join("nested").join("args.json").exists());

        let reopened = FileStorage::new(storage.root())?;
        assert_eq!(reopened.file_get("model")?, vec![4]);

        Ok(())
    }

    #[test]
    fn file_storage_rejects_paths_as_keys() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::new(dir.path())?;

        for key in &["", "..", "../model", "a/b"] {
            let err = storage.file_set(key, &[0]).unwrap_err();
            assert_eq!(
                err.downcast_ref::<ErrorKind>(),
                Some(&ErrorKind::InvalidKey((*key).into()))
            );
        }

        Ok(())
    }
}

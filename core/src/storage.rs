use hashbrown::HashMap;
use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;

use crate::*;

/// Key/value slot storage for persisted JSON, in the shape of browser local storage.
pub trait SnapshotStorage {
    fn load(&self, key: &str) -> core::result::Result<Option<String>, StorageError>;

    fn save(&mut self, key: &str, value: &str) -> core::result::Result<(), StorageError>;
}

/// In-process storage. Clones share the same slots, so a caller can keep a handle to inspect what a session wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn save(&mut self, key: &str, value: &str) -> core::result::Result<(), StorageError> {
        self.slots.borrow_mut().insert(key.into(), value.into());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `geocoin:session:v1` is stored as `geocoin_session_v1.json`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(name).with_extension("json")
    }
}

impl SnapshotStorage for FileStorage {
    fn load(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> core::result::Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        log::trace!("wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

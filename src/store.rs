//! Persisted key-value stores
//!
//! The configuration layer only ever talks to a [`KeyValueStore`]; the
//! concrete store is picked by the host.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{RepoBrowserError, Result};

/// String store that persists synchronously before returning
pub trait KeyValueStore: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

fn lock_map(map: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        lock_map(&self.values).get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        lock_map(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock_map(&self.values).remove(key);
        Ok(())
    }
}

/// JSON object on disk, rewritten on every mutation
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match File::open(&path) {
            Ok(file) => {
                let values: BTreeMap<String, String> =
                    serde_json::from_reader(BufReader::new(file))?;
                info!("Loaded {} settings from {}", values.len(), path.display());
                values
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, values).map_err(|e| {
            RepoBrowserError::StoreError(format!(
                "Failed to write {}: {}",
                self.path.display(),
                e
            ))
        })?;
        writer.flush()?;
        Ok(())
    }

    /// Persist `values` and only then make them visible to readers
    fn commit(
        &self,
        current: &mut MutexGuard<'_, BTreeMap<String, String>>,
        values: BTreeMap<String, String>,
    ) -> Result<()> {
        self.persist(&values)?;
        **current = values;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_string(&self, key: &str) -> Option<String> {
        lock_map(&self.values).get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let mut current = lock_map(&self.values);
        let mut values = current.clone();
        values.insert(key.to_string(), value.to_string());
        self.commit(&mut current, values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut current = lock_map(&self.values);
        if !current.contains_key(key) {
            return Ok(());
        }
        let mut values = current.clone();
        values.remove(key);
        self.commit(&mut current, values)
    }
}

use anyhow::{Context, Result};
use billed_core::KeyValueStorage;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

pub fn billed_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BILLED_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".billed"))
}

pub fn ensure_billed_home() -> Result<PathBuf> {
    let dir = billed_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn storage_path() -> Result<PathBuf> {
    Ok(ensure_billed_home()?.join("storage.json"))
}

/// `localStorage` persisted as a JSON object on disk. Every write is flushed.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let items = if path.exists() {
            let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut items);
        if let Err(e) = self.flush(&items) {
            warn!(error = %e, "storage not persisted");
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.modify(|items| {
            items.insert(key.to_string(), value.to_string());
        });
    }

    fn remove_item(&self, key: &str) {
        self.modify(|items| {
            items.remove(key);
        });
    }
}

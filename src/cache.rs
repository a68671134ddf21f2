//! Persistent item cache, one entry per source URL.
//!
//! Entries are JSON files named after the md5 digest of the source URL, so
//! pointing the slideshow at a different site never serves the previous
//! site's posts. Cached contents are trusted as-is once they parse.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::source::Item;

enum Backend {
    Disk(PathBuf),
    Memory(HashMap<String, String>),
}

pub struct ItemCache {
    backend: Backend,
}

impl ItemCache {
    /// Cache stored under `dir`. The directory is created on first write.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Disk(dir.into()),
        }
    }

    /// Cache that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(HashMap::new()),
        }
    }

    /// Storage key for a source URL.
    pub fn key(source_url: &str) -> String {
        format!("{:x}", md5::compute(source_url.as_bytes()))
    }

    fn entry_path(dir: &Path, source_url: &str) -> PathBuf {
        dir.join(format!("{}.json", Self::key(source_url)))
    }

    /// Cached items for `source_url`, or `None` on a miss.
    pub fn get(&self, source_url: &str) -> Result<Option<Vec<Item>>, CacheError> {
        let text = match &self.backend {
            Backend::Memory(map) => map.get(&Self::key(source_url)).cloned(),
            Backend::Disk(dir) => {
                let path = Self::entry_path(dir, source_url);
                match fs::read_to_string(&path) {
                    Ok(text) => Some(text),
                    Err(e) if e.kind() == ErrorKind::NotFound => None,
                    Err(source) => return Err(CacheError::Read { path, source }),
                }
            }
        };

        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Store `items` as the entry for `source_url`, replacing any previous one.
    pub fn put(&mut self, source_url: &str, items: &[Item]) -> Result<(), CacheError> {
        let text = serde_json::to_string(items)?;

        match &mut self.backend {
            Backend::Memory(map) => {
                map.insert(Self::key(source_url), text);
            }
            Backend::Disk(dir) => {
                fs::create_dir_all(&*dir).map_err(|source| CacheError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;
                let path = Self::entry_path(dir, source_url);
                fs::write(&path, text).map_err(|source| CacheError::Write { path, source })?;
            }
        }
        Ok(())
    }

    /// Drop the entry for `source_url`. Removing a missing entry is not an
    /// error.
    pub fn remove(&mut self, source_url: &str) -> Result<(), CacheError> {
        match &mut self.backend {
            Backend::Memory(map) => {
                map.remove(&Self::key(source_url));
            }
            Backend::Disk(dir) => {
                let path = Self::entry_path(dir, source_url);
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(source) => return Err(CacheError::Remove { path, source }),
                }
            }
        }
        Ok(())
    }
}

//! Storage backends for action logs.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::ActionLog;
use crate::errors::{IngestError, Result};

/// Backend holding one [`ActionLog`] per fingerprint.
///
/// Implementations must allow concurrent writers on distinct fingerprints.
pub trait RecordStore: Send + Sync + Debug {
    /// Applies `apply` to the log of `fingerprint`, creating it if needed.
    ///
    /// A log that is still empty after `apply` is not persisted.
    fn update(&self, fingerprint: &str, apply: &mut dyn FnMut(&mut ActionLog)) -> Result<()>;

    /// Returns a copy of the log for `fingerprint`.
    fn load(&self, fingerprint: &str) -> Result<Option<ActionLog>>;

    /// Deletes the log for `fingerprint`.
    fn remove(&self, fingerprint: &str) -> Result<()>;

    /// Lists every fingerprint with a stored log.
    fn fingerprints(&self) -> Result<Vec<String>>;
}

/// Process-local store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    logs: DashMap<String, ActionLog>,
}

impl InMemoryRecordStore {
    /// Creates a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored logs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn update(&self, fingerprint: &str, apply: &mut dyn FnMut(&mut ActionLog)) -> Result<()> {
        match self.logs.entry(fingerprint.to_string()) {
            Entry::Occupied(mut occupied) => apply(occupied.get_mut()),
            Entry::Vacant(vacant) => {
                let mut log = ActionLog::new();
                apply(&mut log);
                if !log.is_empty() {
                    vacant.insert(log);
                }
            }
        }
        Ok(())
    }

    fn load(&self, fingerprint: &str) -> Result<Option<ActionLog>> {
        Ok(self.logs.get(fingerprint).map(|log| log.value().clone()))
    }

    fn remove(&self, fingerprint: &str) -> Result<()> {
        self.logs.remove(fingerprint);
        Ok(())
    }

    fn fingerprints(&self) -> Result<Vec<String>> {
        Ok(self.logs.iter().map(|e| e.key().clone()).collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LogDocument {
    fingerprint: String,
    #[serde(flatten)]
    log: ActionLog,
}

/// Durable store writing one JSON document per fingerprint into a directory.
#[derive(Debug)]
pub struct JsonFileRecordStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRecordStore {
    /// Opens (and creates if missing) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// The directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, fingerprint: &str) -> PathBuf {
        let digest = Sha256::digest(fingerprint.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(&digest[..16])))
    }

    fn read_document(path: &Path) -> Result<Option<LogDocument>> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(path: &Path, doc: &LogDocument) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(doc)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl RecordStore for JsonFileRecordStore {
    fn update(&self, fingerprint: &str, apply: &mut dyn FnMut(&mut ActionLog)) -> Result<()> {
        let _guard = self.write_lock.lock();
        let path = self.path_for(fingerprint);

        let mut doc = Self::read_document(&path)?.unwrap_or_else(|| LogDocument {
            fingerprint: fingerprint.to_string(),
            log: ActionLog::new(),
        });
        if doc.fingerprint != fingerprint {
            return Err(IngestError::store(format!(
                "{} holds the log of '{}', not '{fingerprint}'",
                path.display(),
                doc.fingerprint
            )));
        }

        apply(&mut doc.log);
        if doc.log.is_empty() {
            return Ok(());
        }
        Self::write_document(&path, &doc)
    }

    fn load(&self, fingerprint: &str) -> Result<Option<ActionLog>> {
        Ok(Self::read_document(&self.path_for(fingerprint))?
            .filter(|doc| doc.fingerprint == fingerprint)
            .map(|doc| doc.log))
    }

    fn remove(&self, fingerprint: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        match fs::remove_file(self.path_for(fingerprint)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn fingerprints(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(doc) = Self::read_document(&path)? {
                out.push(doc.fingerprint);
            }
        }
        out.sort();
        Ok(out)
    }
}

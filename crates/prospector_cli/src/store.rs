//! File-backed collaborator implementations.
//!
//! The engine's store and queue boundaries are traits; the CLI backs them
//! with a JSON document of last-write-wins maps and an append-only JSONL
//! file respectively. Both write through on every call so an interrupted
//! crawl loses nothing already handed off.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use prospector::crawl::{
    CollaboratorError, ContributionStore, DiscoveredRepo, DiscoveryQueue, RepoRecord, UserRecord,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    /// Repository records keyed by URL.
    repos: BTreeMap<String, RepoRecord>,
    /// User records keyed by profile link.
    users: BTreeMap<String, UserRecord>,
}

/// JSON-file store with insert-or-update, last-write-wins semantics.
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Open the store, loading existing records if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(std::io::Error::other)?
        } else {
            StoreData::default()
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Number of repository records held.
    pub fn repo_count(&self) -> usize {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).repos.len()
    }

    /// Number of user records held.
    pub fn user_count(&self) -> usize {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).users.len()
    }

    fn persist(&self, data: &StoreData) -> Result<(), CollaboratorError> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| CollaboratorError::new(format!("store encode failed: {e}")))?;
        fs::write(&self.path, content)
            .map_err(|e| CollaboratorError::new(format!("store write failed: {e}")))
    }
}

#[async_trait]
impl ContributionStore for JsonFileStore {
    async fn upsert_repo(&self, record: RepoRecord) -> Result<(), CollaboratorError> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.repos.insert(record.url.clone(), record);
        self.persist(&data)
    }

    async fn upsert_user(&self, record: UserRecord) -> Result<(), CollaboratorError> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.users.insert(record.github_link.clone(), record);
        self.persist(&data)
    }
}

/// Append-only JSONL writer for the crawl queue: one discovered-repo
/// payload per line, consumed later by a separate process.
pub struct JsonlQueueWriter {
    file: Mutex<File>,
}

impl JsonlQueueWriter {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl DiscoveryQueue for JsonlQueueWriter {
    async fn push(&self, repo: DiscoveredRepo) -> Result<(), CollaboratorError> {
        let line = serde_json::to_string(&repo)
            .map_err(|e| CollaboratorError::new(format!("queue encode failed: {e}")))?;
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(file, "{line}")
            .map_err(|e| CollaboratorError::new(format!("queue write failed: {e}")))
    }
}

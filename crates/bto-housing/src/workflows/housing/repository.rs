use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::domain::{Application, Flat, OfficerRegistration, User, WithdrawalRequest};
use super::project::Project;
use super::store::lock;

/// Whole-entity copy of the housing core, keyed by each record's identity field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingSnapshot {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub flats: Vec<Flat>,
    pub applications: Vec<Application>,
    pub registrations: Vec<OfficerRegistration>,
    pub withdrawals: Vec<WithdrawalRequest>,
}

/// Persistence collaborator contract; the storage format belongs to the implementation.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Option<HousingSnapshot>, RepositoryError>;
    fn save(&self, snapshot: &HousingSnapshot) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Stores the snapshot as pretty printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn load(&self) -> Result<Option<HousingSnapshot>, RepositoryError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn save(&self, snapshot: &HousingSnapshot) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_vec_pretty(snapshot)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Option<HousingSnapshot>>,
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<HousingSnapshot>, RepositoryError> {
        Ok(lock(&self.snapshot).clone())
    }

    fn save(&self, snapshot: &HousingSnapshot) -> Result<(), RepositoryError> {
        *lock(&self.snapshot) = Some(snapshot.clone());
        Ok(())
    }
}

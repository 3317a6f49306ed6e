//! Configuration store
//!
//! Persists the last used credentials (never the password) and the locally
//! tracked repositories in a small TOML document:
//!
//! ```toml
//! [user]
//! login = "alice"
//! host = "git.example.org"
//! port = 22
//!
//! [repos]
//! docs = "/home/alice/src/docs"
//! ```
//!
//! Every operation loads the whole document; mutations write the whole
//! document back before returning. Reads share a lock, mutations hold it
//! exclusively from load to save. I/O failures are logged and absorbed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::external::{Credentials, DEFAULT_SSH_PORT};

/// Locally tracked clone of a remote repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub local_path: PathBuf,
}

impl RepositoryRecord {
    pub fn new(name: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            local_path: local_path.into(),
        }
    }
}

/// `[user]` section: credentials without the password
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// The persisted aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSection>,
    #[serde(default)]
    pub repos: BTreeMap<String, String>,
}

pub struct ConfigStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // A panic in another holder leaves nothing half-written in memory, so a
    // poisoned lock is still usable.
    fn read_lock(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the document, replacing a missing or unreadable file with a
    /// freshly persisted default.
    fn load(&self) -> ConfigDocument {
        match fs::read_to_string(&self.path) {
            Ok(content) => match toml::from_str::<ConfigDocument>(&content) {
                Ok(document) => return document,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Failed to parse config, using defaults")
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No config yet, creating one")
            }
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to read config, using defaults"),
        }

        let document = ConfigDocument::default();
        self.save(&document);
        document
    }

    /// Writes the whole document through a temporary sibling file
    fn save(&self, document: &ConfigDocument) {
        if let Err(e) = self.try_save(document) {
            warn!(path = %self.path.display(), error = %e, "Failed to write config");
        }
    }

    fn try_save(&self, document: &ConfigDocument) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(document)?;
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(format!(".{}.tmp", Uuid::new_v4()));
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, content)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        debug!(path = %self.path.display(), "Config saved");
        Ok(())
    }

    /// Last used credentials; the password is always absent
    pub fn get_last_credentials(&self) -> Credentials {
        let _guard = self.read_lock();
        let user = self.load().user.unwrap_or_default();
        Credentials {
            login: user.login.unwrap_or_default(),
            password: None,
            host: user.host.unwrap_or_default(),
            port: user.port.unwrap_or(DEFAULT_SSH_PORT),
        }
    }

    /// Stores login, host and port. The password is never written.
    pub fn save_credentials(&self, credentials: &Credentials) {
        let _guard = self.write_lock();
        let mut document = self.load();
        document.user = Some(UserSection {
            login: Some(credentials.login.clone()),
            host: Some(credentials.host.clone()),
            port: Some(credentials.port),
        });
        self.save(&document);
    }

    /// Tracked repositories, ordered by name
    pub fn list_repositories(&self) -> Vec<RepositoryRecord> {
        let _guard = self.read_lock();
        self.load()
            .repos
            .into_iter()
            .map(|(name, path)| RepositoryRecord::new(name, path))
            .collect()
    }

    /// Inserts or replaces the record with the same name
    pub fn add_repository(&self, record: &RepositoryRecord) {
        let _guard = self.write_lock();
        let mut document = self.load();
        document
            .repos
            .insert(record.name.clone(), record.local_path.to_string_lossy().into_owned());
        self.save(&document);
    }

    /// Removes the named records and returns the names that were tracked,
    /// in name order. Unknown names are ignored.
    pub fn delete_repositories(&self, names: &HashSet<String>) -> Vec<String> {
        let _guard = self.write_lock();
        let mut document = self.load();
        let mut removed = Vec::new();
        document.repos.retain(|name, _| {
            let remove = names.contains(name);
            if remove {
                removed.push(name.clone());
            }
            !remove
        });
        self.save(&document);
        removed
    }
}

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sess_repo::{JournalConfig, JournaledDocumentStore, SessionRepository, SyncMode};

use crate::error::{ServerError, ServerResult};

/// Server configuration, loadable from TOML.
///
/// Every field has a default, so a file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Journal file for durable storage. `None` keeps sessions in memory only.
    pub journal_path: Option<PathBuf>,
    pub sync_mode: SyncMode,
    /// Upper bound on request bodies, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            journal_path: None,
            sync_mode: SyncMode::default(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Open the repository this configuration describes.
    pub fn open_repository(&self) -> ServerResult<SessionRepository> {
        match &self.journal_path {
            Some(path) => {
                let config = JournalConfig {
                    sync_mode: self.sync_mode,
                };
                let store = JournaledDocumentStore::open(path, config)?;
                Ok(SessionRepository::new(Arc::new(store)))
            }
            None => Ok(SessionRepository::in_memory()),
        }
    }
}

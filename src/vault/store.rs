//! Credential persistence, consumed through the `CredentialStore` trait.
//!
//! The vault treats stored records as opaque: it validates names before
//! saving and otherwise hands lists in and out unchanged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::credential::Credential;
use super::format::{self, CardRecord};
use crate::errors::{Result, VaultError};
use crate::reveal::scheduler::lock;

/// Persists credential lists keyed by card id.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Credentials attached to `card_id`; empty if the card has none.
    async fn load(&self, card_id: &str) -> Result<Vec<Credential>>;

    /// Replace the credentials attached to `card_id`.
    async fn save(&self, card_id: &str, credentials: Vec<Credential>) -> Result<()>;

    /// Every card id that has credentials saved, sorted.
    async fn card_ids(&self) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// A store that lives and dies with the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    cards: Mutex<HashMap<String, Vec<Credential>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self, card_id: &str) -> Result<Vec<Credential>> {
        Ok(lock(&self.cards).get(card_id).cloned().unwrap_or_default())
    }

    async fn save(&self, card_id: &str, credentials: Vec<Credential>) -> Result<()> {
        let mut cards = lock(&self.cards);
        if credentials.is_empty() {
            cards.remove(card_id);
        } else {
            cards.insert(card_id.to_string(), credentials);
        }
        Ok(())
    }

    async fn card_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = lock(&self.cards).keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// A store backed by one JSON file (see `format`).
///
/// File I/O runs on tokio's blocking pool.  Saves within one process
/// are serialized so concurrent read-modify-write cycles cannot lose
/// each other's cards.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(PathBuf) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || op(path))
            .await
            .map_err(|e| VaultError::Store(format!("store task failed: {e}")))?
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn load(&self, card_id: &str) -> Result<Vec<Credential>> {
        let card_id = card_id.to_string();
        self.blocking(move |path| {
            let mut document = format::read_document(&path)?;
            Ok(document
                .cards
                .remove(&card_id)
                .map(|record| record.credentials)
                .unwrap_or_default())
        })
        .await
    }

    async fn save(&self, card_id: &str, credentials: Vec<Credential>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let card_id = card_id.to_string();
        self.blocking(move |path| {
            let mut document = format::read_document(&path)?;
            if credentials.is_empty() {
                document.cards.remove(&card_id);
            } else {
                document.cards.insert(
                    card_id.clone(),
                    CardRecord {
                        updated_at: Utc::now(),
                        credentials,
                    },
                );
            }
            format::write_document(&path, &document)?;
            tracing::debug!(card_id = %card_id, path = %path.display(), "credential store written");
            Ok(())
        })
        .await
    }

    async fn card_ids(&self) -> Result<Vec<String>> {
        self.blocking(|path| Ok(format::read_document(&path)?.cards.into_keys().collect()))
            .await
    }
}

//! Key providers — where encryption keys come from and go to.
//!
//! The vault never stores a key itself.  It asks a `KeyProvider` for the
//! key of a *context* (an opaque label such as a workspace or board id)
//! and hands newly generated keys back to it.
//!
//! This module provides:
//! - The `KeyProvider` trait and an in-memory implementation
//! - `FileKeyProvider`, one owner-only key file per context (`file`)
//! - `KeyringKeyProvider` in `crate::keyring` (feature `keyring-store`)

pub mod file;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::crypto::EncryptionKey;
use crate::errors::{Result, VaultError};
use crate::reveal::scheduler::lock;

pub use file::FileKeyProvider;

/// Supplies and stores the symmetric key for a context.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// The key for `context`, or `KeyNotFound`.
    async fn get_key(&self, context: &str) -> Result<EncryptionKey>;

    /// Store `key` as the key for `context`, replacing any previous one.
    async fn put_key(&self, context: &str, key: EncryptionKey) -> Result<()>;

    /// Whether a key is stored for `context`.
    async fn has_key(&self, context: &str) -> Result<bool> {
        match self.get_key(context).await {
            Ok(_) => Ok(true),
            Err(VaultError::KeyNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Keys held in process memory only.
#[derive(Default)]
pub struct MemoryKeyProvider {
    keys: Mutex<HashMap<String, EncryptionKey>>,
}

impl MemoryKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyProvider for MemoryKeyProvider {
    async fn get_key(&self, context: &str) -> Result<EncryptionKey> {
        lock(&self.keys)
            .get(context)
            .cloned()
            .ok_or_else(|| VaultError::KeyNotFound(context.to_string()))
    }

    async fn put_key(&self, context: &str, key: EncryptionKey) -> Result<()> {
        lock(&self.keys).insert(context.to_string(), key);
        Ok(())
    }
}

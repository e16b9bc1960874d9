//! OS keyring key provider.
//!
//! Stores each context's encryption key (as `export_key` text) in the
//! operating system's secure credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! The `keyring` crate is blocking, so every call runs on tokio's
//! blocking pool.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::crypto::{export_key, import_key, EncryptionKey};
use crate::errors::{Result, VaultError};
use crate::provider::KeyProvider;

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "cardvault";

/// Build a keyring entry key from a key context.
fn entry_key(context: &str) -> String {
    format!("key:{context}")
}

/// Keys kept in the OS keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringKeyProvider;

impl KeyringKeyProvider {
    pub fn new() -> Self {
        Self
    }
}

fn entry(context: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE_NAME, &entry_key(context))
        .map_err(|e| VaultError::KeyringError(format!("failed to create keyring entry: {e}")))
}

async fn blocking<T, F>(op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| VaultError::KeyringError(format!("keyring task failed: {e}")))?
}

#[async_trait]
impl KeyProvider for KeyringKeyProvider {
    async fn get_key(&self, context: &str) -> Result<EncryptionKey> {
        let context = context.to_string();
        blocking(move || {
            let encoded = match entry(&context)?.get_password() {
                Ok(encoded) => Zeroizing::new(encoded),
                Err(keyring::Error::NoEntry) => return Err(VaultError::KeyNotFound(context)),
                Err(e) => {
                    return Err(VaultError::KeyringError(format!(
                        "failed to read from keyring: {e}"
                    )))
                }
            };
            import_key(&encoded)
        })
        .await
    }

    async fn put_key(&self, context: &str, key: EncryptionKey) -> Result<()> {
        let context = context.to_string();
        blocking(move || {
            let encoded = Zeroizing::new(export_key(&key));
            entry(&context)?.set_password(&encoded).map_err(|e| {
                VaultError::KeyringError(format!("failed to store key in keyring: {e}"))
            })?;
            tracing::info!(context = %context, "encryption key stored in keyring");
            Ok(())
        })
        .await
    }
}

//! Key files on disk.
//!
//! Each context's key lives in `<dir>/<context>.key` as the base64 text
//! produced by `export_key`.  Files are written owner-only.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use zeroize::Zeroizing;

use super::KeyProvider;
use crate::crypto::{export_key, import_key, EncryptionKey};
use crate::errors::{Result, VaultError};

/// Longest accepted context name.
const MAX_CONTEXT_LEN: usize = 128;

/// Keys stored as one file per context under a directory.
pub struct FileKeyProvider {
    dir: PathBuf,
}

impl FileKeyProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the key file for `context`.
    pub fn key_path(&self, context: &str) -> Result<PathBuf> {
        validate_context(context)?;
        Ok(self.dir.join(format!("{context}.key")))
    }
}

#[async_trait]
impl KeyProvider for FileKeyProvider {
    async fn get_key(&self, context: &str) -> Result<EncryptionKey> {
        let path = self.key_path(context)?;

        let encoded = match tokio::fs::read_to_string(&path).await {
            Ok(text) => Zeroizing::new(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VaultError::KeyNotFound(context.to_string()));
            }
            Err(e) => {
                return Err(VaultError::KeyProvider(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        import_key(&encoded)
    }

    async fn put_key(&self, context: &str, key: EncryptionKey) -> Result<()> {
        let path = self.key_path(context)?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            VaultError::KeyProvider(format!("cannot create key directory: {e}"))
        })?;

        let tmp_path = self.dir.join(format!(".{context}.key.tmp"));
        let encoded = Zeroizing::new(export_key(&key));
        tokio::fs::write(&tmp_path, encoded.as_bytes())
            .await
            .map_err(|e| VaultError::KeyProvider(format!("failed to write key file: {e}")))?;

        // On Unix, restrict permissions to owner-only read/write.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp_path, perms).await.map_err(|e| {
                VaultError::KeyProvider(format!("failed to set key file permissions: {e}"))
            })?;
        }

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| VaultError::KeyProvider(format!("failed to move key file: {e}")))?;

        tracing::info!(context, path = %path.display(), "encryption key stored");
        Ok(())
    }
}

/// Validate that a context name is safe to use as a file name.
///
/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty, not start with a period, and be at most 128 characters.
fn validate_context(context: &str) -> Result<()> {
    if context.is_empty() {
        return Err(VaultError::KeyProvider("key context cannot be empty".into()));
    }
    if context.len() > MAX_CONTEXT_LEN {
        return Err(VaultError::KeyProvider(format!(
            "key context cannot exceed {MAX_CONTEXT_LEN} characters"
        )));
    }
    if context.starts_with('.')
        || !context
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(VaultError::KeyProvider(format!(
            "key context '{context}' contains invalid characters — only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}

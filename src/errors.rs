use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in CardVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Cannot decrypt this value — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // --- Credential errors ---
    #[error("Invalid credential: {0}")]
    Validation(String),

    #[error("Credential '{0}' not found")]
    CredentialNotFound(String),

    #[error("No credential at position {0}")]
    CredentialIndexOutOfRange(usize),

    #[error("Credential '{0}' holds no encrypted secret")]
    NotEncrypted(String),

    // --- Collaborator errors ---
    #[error("No encryption key stored for context '{0}'")]
    KeyNotFound(String),

    #[error("Key already exists for context '{0}' (use --force to replace it)")]
    KeyAlreadyExists(String),

    #[error("Key provider error: {0}")]
    KeyProvider(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Invalid store format in {0}: {1}")]
    InvalidStoreFormat(PathBuf, String),

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for CardVault results.
pub type Result<T> = std::result::Result<T, VaultError>;

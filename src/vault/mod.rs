//! Vault module — credentials, their persistence, and the vault API.
//!
//! This module provides:
//! - The `Credential` tagged union and `CredentialKind` (`credential`)
//! - The JSON store file format (`format`)
//! - The `CredentialStore` trait with memory and JSON-file stores (`store`)
//! - `CredentialVault`, tying keys, store, masking and encryption together (`service`)
//! - `CredentialEditor`, an open form over one card's credentials (`editor`)

pub mod credential;
pub mod editor;
pub mod format;
pub mod service;
pub mod store;

// Re-export the most commonly used items.
pub use credential::{Credential, CredentialKind};
pub use editor::{CredentialEditor, EntryId};
pub use service::{CommitOutcome, CredentialVault, RejectedCredential, RotationReport};
pub use store::{CredentialStore, JsonFileStore, MemoryCredentialStore};

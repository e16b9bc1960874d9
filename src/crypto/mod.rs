//! Cryptographic primitives for CardVault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption with a base64 wire format (`encryption`)
//! - The `EncryptionKey` handle plus key generation, export and import (`keys`)

pub mod encryption;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, generate_key, ...};
pub use encryption::{decrypt, decrypt_async, encrypt, encrypt_async, CipherText};
pub use keys::{export_key, generate_key, import_key, EncryptionKey, KEY_LEN};

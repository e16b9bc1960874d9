//! The symmetric key handle used by the encryption engine.
//!
//! An `EncryptionKey` is 32 random bytes (AES-256).  The vault never
//! writes it anywhere itself: callers hand it to a key provider as a
//! base64 string produced by `export_key` and get it back through
//! `import_key`.

use std::fmt;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{Result, VaultError};

/// Length of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// A 256-bit AES-GCM key that zeroes its memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build a cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl PartialEq for EncryptionKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for EncryptionKey {}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// Generate a fresh random 256-bit key from the OS RNG.
pub fn generate_key() -> EncryptionKey {
    let mut bytes = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut bytes);
    let key = EncryptionKey::from_bytes(bytes);
    bytes.zeroize();
    key
}

/// Encode the raw key bytes as standard base64.
pub fn export_key(key: &EncryptionKey) -> String {
    BASE64.encode(key.as_bytes())
}

/// Decode a key previously produced by `export_key`.
///
/// Fails with `InvalidKey` if the input is not base64 or does not
/// decode to exactly 32 bytes.
pub fn import_key(encoded: &str) -> Result<EncryptionKey> {
    let decoded = Zeroizing::new(
        BASE64
            .decode(encoded.trim())
            .map_err(|e| VaultError::InvalidKey(format!("not valid base64: {e}")))?,
    );

    if decoded.len() != KEY_LEN {
        return Err(VaultError::InvalidKey(format!(
            "key must be exactly {KEY_LEN} bytes, got {}",
            decoded.len()
        )));
    }

    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&decoded);
    let key = EncryptionKey::from_bytes(bytes);
    bytes.zeroize();
    Ok(key)
}

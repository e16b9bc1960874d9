//! AES-256-GCM authenticated encryption of single secret strings.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the decoded wire bytes:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! The whole buffer travels as a standard, padded base64 string
//! (`CipherText`).

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::keys::EncryptionKey;
use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Base64 wire form of an encrypted secret: `base64(nonce || ciphertext || tag)`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CipherText(String);

impl CipherText {
    /// Wrap an already-encoded wire string without validating it.
    ///
    /// Malformed input is only detected by `decrypt`.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CipherText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherText({} chars)", self.0.len())
    }
}

impl fmt::Display for CipherText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encrypt `plaintext` under `key`.
///
/// A new random nonce is drawn on every call, so encrypting the same
/// value twice never yields the same `CipherText`.
pub fn encrypt(plaintext: &str, key: &EncryptionKey) -> Result<CipherText> {
    let sealed = encrypt_bytes(key, plaintext.as_bytes())?;
    tracing::trace!(
        plaintext_len = plaintext.len(),
        sealed_len = sealed.len(),
        "encrypted secret"
    );
    Ok(CipherText(BASE64.encode(sealed)))
}

/// Decrypt a `CipherText` produced by `encrypt`.
///
/// Every failure mode (bad base64, short payload, failed tag check,
/// non-UTF-8 plaintext) collapses into `DecryptionFailed`.
pub fn decrypt(cipher_text: &CipherText, key: &EncryptionKey) -> Result<String> {
    let sealed = BASE64
        .decode(cipher_text.as_str())
        .map_err(|_| VaultError::DecryptionFailed)?;

    let plaintext_bytes = decrypt_bytes(key, &sealed)?;

    // On error, zeroize the bytes inside the error before discarding.
    String::from_utf8(plaintext_bytes).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        VaultError::DecryptionFailed
    })
}

/// `encrypt` on tokio's blocking pool, so callers on the async runtime
/// never stall other tasks while the cipher runs.
pub async fn encrypt_async(plaintext: Zeroizing<String>, key: EncryptionKey) -> Result<CipherText> {
    tokio::task::spawn_blocking(move || encrypt(&plaintext, &key))
        .await
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption task failed: {e}")))?
}

/// `decrypt` on tokio's blocking pool.
///
/// A failed or cancelled worker is reported as `DecryptionFailed`; the
/// caller is never handed an empty value in its place.
pub async fn decrypt_async(
    cipher_text: CipherText,
    key: EncryptionKey,
) -> Result<Zeroizing<String>> {
    tokio::task::spawn_blocking(move || decrypt(&cipher_text, &key).map(Zeroizing::new))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "decryption task failed");
            VaultError::DecryptionFailed
        })?
}

/// Encrypt raw bytes, returning `nonce || ciphertext || tag`.
pub fn encrypt_bytes(key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt bytes produced by `encrypt_bytes`.
pub fn decrypt_bytes(key: &EncryptionKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        return Err(VaultError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| VaultError::DecryptionFailed)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::generate_key;

    #[test]
    fn wire_layout_is_nonce_then_ciphertext_and_tag() {
        let key = generate_key();
        let ct = encrypt("hello", &key).unwrap();
        let raw = BASE64.decode(ct.as_str()).unwrap();
        assert_eq!(raw.len(), NONCE_LEN + "hello".len() + TAG_LEN);
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = generate_key();
        let ct = encrypt("", &key).unwrap();
        assert_eq!(decrypt(&ct, &key).unwrap(), "");
    }

    #[test]
    fn nonce_only_payload_fails() {
        let key = generate_key();
        let ct = CipherText::new(BASE64.encode([0u8; NONCE_LEN]));
        assert!(matches!(
            decrypt(&ct, &key).unwrap_err(),
            VaultError::DecryptionFailed
        ));
    }

    #[test]
    fn non_utf8_plaintext_is_a_decryption_failure() {
        let key = generate_key();
        let sealed = encrypt_bytes(&key, &[0xff, 0xfe, 0xfd]).unwrap();
        let ct = CipherText::new(BASE64.encode(sealed));
        assert!(matches!(
            decrypt(&ct, &key).unwrap_err(),
            VaultError::DecryptionFailed
        ));
    }

    #[test]
    fn debug_does_not_print_payload() {
        let ct = CipherText::new("QUJDRA==");
        assert_eq!(format!("{ct:?}"), "CipherText(8 chars)");
    }
}

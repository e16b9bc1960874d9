//! Integration tests for the CardVault encryption engine.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cardvault::crypto::{
    decrypt, decrypt_async, encrypt, encrypt_async, export_key, generate_key, import_key,
    CipherText, EncryptionKey,
};
use cardvault::errors::VaultError;
use zeroize::Zeroizing;

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = generate_key();
    let plaintext = "sk_live_51H4RdE2BqJhGwM5N8";

    let ct = encrypt(plaintext, &key).expect("encrypt should succeed");
    assert_ne!(ct.as_str(), plaintext);

    let recovered = decrypt(&ct, &key).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn roundtrip_preserves_unicode() {
    let key = generate_key();
    let plaintext = "pässwörd 🔑 パスワード";

    let ct = encrypt(plaintext, &key).expect("encrypt");
    assert_eq!(decrypt(&ct, &key).expect("decrypt"), plaintext);
}

#[test]
fn roundtrip_empty_string() {
    let key = generate_key();
    let ct = encrypt("", &key).expect("encrypt");
    assert_eq!(decrypt(&ct, &key).expect("decrypt"), "");
}

#[test]
fn payload_is_nonce_then_ciphertext_then_tag() {
    let key = generate_key();
    let plaintext = "hunter2";

    let ct = encrypt(plaintext, &key).expect("encrypt");
    let raw = STANDARD.decode(ct.as_str()).expect("cipher text is base64");

    // 12-byte nonce + plaintext + 16-byte tag.
    assert_eq!(raw.len(), 12 + plaintext.len() + 16);
}

#[test]
fn encrypting_twice_gives_different_cipher_text() {
    let key = generate_key();

    let ct1 = encrypt("same value", &key).expect("encrypt 1");
    let ct2 = encrypt("same value", &key).expect("encrypt 2");
    assert_ne!(ct1, ct2, "each encryption must use a fresh nonce");

    let raw1 = STANDARD.decode(ct1.as_str()).unwrap();
    let raw2 = STANDARD.decode(ct2.as_str()).unwrap();
    assert_ne!(raw1[..12], raw2[..12]);
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn decrypt_with_other_key_fails() {
    let key = generate_key();
    let other = generate_key();

    let ct = encrypt("TOP_SECRET", &key).expect("encrypt");
    let err = decrypt(&ct, &other).unwrap_err();
    assert!(matches!(err, VaultError::DecryptionFailed));
}

#[test]
fn flipping_any_byte_fails_authentication() {
    let key = generate_key();
    let ct = encrypt("tamper me", &key).expect("encrypt");
    let raw = STANDARD.decode(ct.as_str()).unwrap();

    for i in 0..raw.len() {
        let mut tampered = raw.clone();
        tampered[i] ^= 0x01;
        let result = decrypt(&CipherText::new(STANDARD.encode(&tampered)), &key);
        assert!(
            matches!(result, Err(VaultError::DecryptionFailed)),
            "flipping byte {i} must be detected"
        );
    }
}

#[test]
fn malformed_base64_fails() {
    let key = generate_key();
    let result = decrypt(&CipherText::new("not base64!!"), &key);
    assert!(matches!(result, Err(VaultError::DecryptionFailed)));
}

#[test]
fn truncated_payload_fails() {
    let key = generate_key();
    let short = CipherText::new(STANDARD.encode([0u8; 20]));
    assert!(matches!(
        decrypt(&short, &key),
        Err(VaultError::DecryptionFailed)
    ));
}

#[test]
fn decryption_error_message_is_user_facing() {
    let msg = VaultError::DecryptionFailed.to_string();
    assert!(msg.contains("wrong key or corrupted data"));
}

// ---------------------------------------------------------------------------
// Async wrappers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn async_roundtrip_matches_sync_engine() {
    let key = generate_key();

    let ct = encrypt_async(Zeroizing::new("async secret".to_string()), key.clone())
        .await
        .expect("encrypt");
    assert_eq!(decrypt(&ct, &key).expect("sync decrypt"), "async secret");

    let plain = decrypt_async(ct, key).await.expect("async decrypt");
    assert_eq!(plain.as_str(), "async secret");
}

#[tokio::test]
async fn async_decrypt_with_wrong_key_fails() {
    let ct = encrypt("value", &generate_key()).expect("encrypt");
    let result = decrypt_async(ct, generate_key()).await;
    assert!(matches!(result, Err(VaultError::DecryptionFailed)));
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[test]
fn exported_key_decrypts_after_import() {
    let key = generate_key();
    let ct = encrypt("carried over", &key).expect("encrypt");

    let imported = import_key(&export_key(&key)).expect("import");
    assert_eq!(imported, key);
    assert_eq!(decrypt(&ct, &imported).expect("decrypt"), "carried over");
}

#[test]
fn import_rejects_wrong_length() {
    let encoded = STANDARD.encode([7u8; 16]);
    assert!(matches!(
        import_key(&encoded),
        Err(VaultError::InvalidKey(_))
    ));
}

#[test]
fn key_from_bytes_is_deterministic() {
    let a = EncryptionKey::from_bytes([0x42; 32]);
    let b = EncryptionKey::from_bytes([0x42; 32]);
    let c = EncryptionKey::from_bytes([0x43; 32]);
    assert_eq!(a, b);
    assert_ne!(a, c);

    let ct = encrypt("shared", &a).expect("encrypt");
    assert_eq!(decrypt(&ct, &b).expect("decrypt"), "shared");
}

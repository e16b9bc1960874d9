//! High-level vault operations used by the editor and CLI commands.
//!
//! `CredentialVault` ties the encryption engine and masking generator to
//! the two external collaborators: a `KeyProvider` for the key of one
//! context, and a `CredentialStore` for the card records.

use std::sync::Arc;
use std::time::Duration;

use zeroize::Zeroizing;

use super::credential::{Credential, CredentialKind};
use super::editor::CredentialEditor;
use super::store::CredentialStore;
use crate::crypto::{self, decrypt_async, encrypt_async, CipherText, EncryptionKey};
use crate::errors::{Result, VaultError};
use crate::masking;
use crate::provider::KeyProvider;
use crate::reveal::Scheduler;

/// A credential left out of a commit because it failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCredential {
    /// Position in the list handed to `commit_card`.
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Result of `commit_card`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// How many credentials reached the store.
    pub saved: usize,
    pub rejected: Vec<RejectedCredential>,
}

/// Result of `rotate_key`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    pub cards: usize,
    pub reencrypted: usize,
}

/// The vault for one key context.
pub struct CredentialVault {
    keys: Arc<dyn KeyProvider>,
    store: Arc<dyn CredentialStore>,
    context: String,
}

impl CredentialVault {
    pub fn new(
        keys: Arc<dyn KeyProvider>,
        store: Arc<dyn CredentialStore>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            keys,
            store,
            context: context.into(),
        }
    }

    /// The key context this vault reads and writes keys under.
    pub fn context(&self) -> &str {
        &self.context
    }

    // ------------------------------------------------------------------
    // Engine pass-throughs
    // ------------------------------------------------------------------

    /// The default display string for `plaintext`.
    pub fn mask(plaintext: &str) -> String {
        masking::mask(plaintext)
    }

    pub async fn encrypt(&self, plaintext: &str, key: &EncryptionKey) -> Result<CipherText> {
        encrypt_async(Zeroizing::new(plaintext.to_string()), key.clone()).await
    }

    pub async fn decrypt(
        &self,
        cipher_text: &CipherText,
        key: &EncryptionKey,
    ) -> Result<Zeroizing<String>> {
        decrypt_async(cipher_text.clone(), key.clone()).await
    }

    // ------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------

    /// Fetch this context's key from the provider.
    pub async fn current_key(&self) -> Result<EncryptionKey> {
        self.keys.get_key(&self.context).await
    }

    /// Whether the provider holds a key for this context.
    pub async fn has_key(&self) -> Result<bool> {
        self.keys.has_key(&self.context).await
    }

    /// Generate a key for this context and hand it to the provider.
    ///
    /// Refuses to replace an existing key unless `force` is set, since
    /// that would orphan everything encrypted under it.
    pub async fn init_key(&self, force: bool) -> Result<()> {
        if !force && self.has_key().await? {
            return Err(VaultError::KeyAlreadyExists(self.context.clone()));
        }
        self.keys
            .put_key(&self.context, crypto::generate_key())
            .await?;
        tracing::info!(context = %self.context, "new encryption key generated");
        Ok(())
    }

    /// Make `key` (e.g. from `import_key`) the key for this context.
    pub async fn import_key(&self, key: EncryptionKey) -> Result<()> {
        self.keys.put_key(&self.context, key).await?;
        tracing::info!(context = %self.context, "encryption key imported");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    /// Mask and encrypt `plaintext` into a new `Encrypted` credential.
    pub async fn seal(&self, name: &str, plaintext: &str) -> Result<Credential> {
        let key = self.current_key().await?;
        self.seal_with(Credential::blank(CredentialKind::Encrypted, name), plaintext, &key)
            .await
    }

    /// Replace the secret of `credential` (switching it to `Encrypted`
    /// if needed), keeping its name and note.
    pub(crate) async fn seal_with(
        &self,
        credential: Credential,
        plaintext: &str,
        key: &EncryptionKey,
    ) -> Result<Credential> {
        let masked_display = masking::mask(plaintext);
        let cipher_text = self.encrypt(plaintext, key).await?;

        let mut sealed = Credential::encrypted(credential.name(), cipher_text, masked_display);
        sealed.set_note(credential.note().map(str::to_string));
        Ok(sealed)
    }

    /// Decrypt the secret of an `Encrypted` credential with this
    /// context's key.
    pub async fn open(&self, credential: &Credential) -> Result<Zeroizing<String>> {
        let cipher_text = secret_of(credential)?;
        let key = self.current_key().await?;
        self.decrypt(cipher_text, &key).await
    }

    pub async fn load_card(&self, card_id: &str) -> Result<Vec<Credential>> {
        self.store.load(card_id).await
    }

    /// Card ids with saved credentials.
    pub async fn card_ids(&self) -> Result<Vec<String>> {
        self.store.card_ids().await
    }

    /// Validate and save `credentials` for `card_id`.
    ///
    /// Invalid entries (empty name, encrypted without a secret) are
    /// filtered out and reported; they never abort the save.
    pub async fn commit_card(
        &self,
        card_id: &str,
        credentials: Vec<Credential>,
    ) -> Result<CommitOutcome> {
        let mut outcome = CommitOutcome::default();
        let mut accepted = Vec::with_capacity(credentials.len());

        for (index, credential) in credentials.into_iter().enumerate() {
            match credential.validate() {
                Ok(()) => accepted.push(credential),
                Err(e) => {
                    tracing::warn!(card_id, index, "credential dropped at commit: {e}");
                    outcome.rejected.push(RejectedCredential {
                        index,
                        name: credential.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome.saved = accepted.len();
        self.store.save(card_id, accepted).await?;
        tracing::info!(
            card_id,
            saved = outcome.saved,
            rejected = outcome.rejected.len(),
            "card credentials committed"
        );
        Ok(outcome)
    }

    /// Open an editing session over the credentials of `card_id`.
    ///
    /// Reveals made through the editor re-mask after `window`, timed by
    /// `scheduler`.
    pub async fn edit_card(
        self: &Arc<Self>,
        card_id: &str,
        scheduler: Arc<dyn Scheduler>,
        window: Duration,
    ) -> Result<CredentialEditor> {
        let credentials = self.load_card(card_id).await?;
        Ok(CredentialEditor::new(
            Arc::clone(self),
            card_id,
            credentials,
            scheduler,
            window,
        ))
    }

    // ------------------------------------------------------------------
    // Rotation
    // ------------------------------------------------------------------

    /// Re-encrypt every secret on `card_ids` under a fresh key, then make
    /// that key current.
    ///
    /// Nothing is written unless every secret decrypts under the current
    /// key.  If saving any card or storing the new key fails, every card
    /// already written is put back to its old records, so no secret is
    /// ever left under a key the provider does not hold.
    pub async fn rotate_key(&self, card_ids: &[String]) -> Result<RotationReport> {
        let old_key = self.current_key().await?;
        let new_key = crypto::generate_key();

        let mut originals = Vec::with_capacity(card_ids.len());
        let mut rotated = Vec::with_capacity(card_ids.len());
        let mut report = RotationReport::default();

        for card_id in card_ids {
            let credentials = self.store.load(card_id).await?;
            let mut updated = Vec::with_capacity(credentials.len());

            for credential in &credentials {
                let Credential::Encrypted {
                    cipher_text,
                    masked_display,
                    ..
                } = credential
                else {
                    updated.push(credential.clone());
                    continue;
                };
                if !credential.has_secret() {
                    updated.push(credential.clone());
                    continue;
                }

                let plaintext = self.decrypt(cipher_text, &old_key).await?;
                let mut reencrypted = Credential::encrypted(
                    credential.name(),
                    self.encrypt(&plaintext, &new_key).await?,
                    masked_display.clone(),
                );
                reencrypted.set_note(credential.note().map(str::to_string));
                updated.push(reencrypted);
                report.reencrypted += 1;
            }

            originals.push((card_id.clone(), credentials));
            rotated.push((card_id.clone(), updated));
        }

        for (card_id, credentials) in rotated {
            if let Err(e) = self.store.save(&card_id, credentials).await {
                tracing::error!(card_id = %card_id, "saving rotated card failed, restoring records: {e}");
                // The failed save may have been partial, so it is restored too.
                self.restore(&originals[..=report.cards]).await;
                return Err(e);
            }
            report.cards += 1;
        }

        if let Err(e) = self.keys.put_key(&self.context, new_key).await {
            tracing::error!(context = %self.context, "storing rotated key failed, restoring records: {e}");
            self.restore(&originals).await;
            return Err(e);
        }

        tracing::info!(
            context = %self.context,
            cards = report.cards,
            reencrypted = report.reencrypted,
            "encryption key rotated"
        );
        Ok(report)
    }

    /// Save `cards` back as they were before a rotation.
    ///
    /// Keeps going past a failed card so one bad save cannot strand the
    /// others under the discarded key.
    async fn restore(&self, cards: &[(String, Vec<Credential>)]) {
        let mut failed = 0;
        for (card_id, credentials) in cards {
            if let Err(e) = self.store.save(card_id, credentials.clone()).await {
                tracing::error!(card_id = %card_id, "restoring card after failed rotation: {e}");
                failed += 1;
            }
        }
        tracing::warn!(cards = cards.len(), failed, "rotation rolled back");
    }
}

/// The cipher text of an `Encrypted` credential that has a secret.
pub(crate) fn secret_of(credential: &Credential) -> Result<&CipherText> {
    match credential.cipher_text() {
        Some(ct) if !ct.as_str().is_empty() => Ok(ct),
        _ => Err(VaultError::NotEncrypted(credential.name().to_string())),
    }
}

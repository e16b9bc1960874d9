//! An editing session over one card's credentials.
//!
//! `CredentialEditor` is what a form or dialog holds while it is open:
//! the working list of credentials plus their reveal sessions.  Each
//! entry gets an id that survives reordering and removal, so hiding or
//! removing one credential never disturbs another's reveal state.
//! Dropping the editor hides everything.

use std::sync::Arc;
use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use super::credential::{Credential, CredentialKind};
use super::service::{secret_of, CommitOutcome, CredentialVault};
use crate::errors::{Result, VaultError};
use crate::reveal::{RevealSessionManager, Scheduler};

/// Stable identity of an entry for the lifetime of one editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

struct Entry {
    id: EntryId,
    credential: Credential,
}

pub struct CredentialEditor {
    vault: Arc<CredentialVault>,
    card_id: String,
    entries: Vec<Entry>,
    next_id: u64,
    sessions: RevealSessionManager<EntryId>,
}

impl CredentialEditor {
    pub fn new(
        vault: Arc<CredentialVault>,
        card_id: impl Into<String>,
        credentials: Vec<Credential>,
        scheduler: Arc<dyn Scheduler>,
        window: Duration,
    ) -> Self {
        let mut editor = Self {
            vault,
            card_id: card_id.into(),
            entries: Vec::new(),
            next_id: 0,
            sessions: RevealSessionManager::new(scheduler, window),
        };
        for credential in credentials {
            editor.add(credential);
        }
        editor
    }

    pub fn card_id(&self) -> &str {
        &self.card_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Credential> {
        self.entries.get(index).map(|entry| &entry.credential)
    }

    pub fn credentials(&self) -> impl Iterator<Item = &Credential> {
        self.entries.iter().map(|entry| &entry.credential)
    }

    /// Index of the first credential called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.credential.name() == name)
    }

    fn entry(&self, index: usize) -> Result<&Entry> {
        self.entries
            .get(index)
            .ok_or(VaultError::CredentialIndexOutOfRange(index))
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut Entry> {
        self.entries
            .get_mut(index)
            .ok_or(VaultError::CredentialIndexOutOfRange(index))
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Append a credential; returns its index.
    pub fn add(&mut self, credential: Credential) -> usize {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, credential });
        self.entries.len() - 1
    }

    /// Remove the credential at `index`, hiding it first.
    pub fn remove(&mut self, index: usize) -> Result<Credential> {
        let id = self.entry(index)?.id;
        self.sessions.hide(&id);
        Ok(self.entries.remove(index).credential)
    }

    pub fn set_name(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.entry_mut(index)?.credential.set_name(name);
        Ok(())
    }

    pub fn set_note(&mut self, index: usize, note: Option<String>) -> Result<()> {
        self.entry_mut(index)?.credential.set_note(note);
        Ok(())
    }

    /// Switch the credential at `index` to `kind`.
    ///
    /// Any reveal is ended first: the secret no longer exists under this
    /// entry once the variant changes.
    pub fn switch_kind(&mut self, index: usize, kind: CredentialKind) -> Result<()> {
        let entry = self.entry_mut(index)?;
        let id = entry.id;
        let current = std::mem::replace(
            &mut entry.credential,
            Credential::blank(kind, String::new()),
        );
        entry.credential = current.switch_kind(kind);
        self.sessions.hide(&id);
        Ok(())
    }

    pub fn set_reference_url(&mut self, index: usize, url: impl Into<String>) -> Result<()> {
        match &mut self.entry_mut(index)?.credential {
            Credential::Reference { reference_url, .. } => {
                *reference_url = url.into();
                Ok(())
            }
            other => Err(VaultError::Validation(format!(
                "'{}' is a {} credential, not a reference",
                other.name(),
                other.kind()
            ))),
        }
    }

    pub fn set_location(&mut self, index: usize, location: impl Into<String>) -> Result<()> {
        match &mut self.entry_mut(index)?.credential {
            Credential::External {
                location: current, ..
            } => {
                *current = location.into();
                Ok(())
            }
            other => Err(VaultError::Validation(format!(
                "'{}' is a {} credential, not an external one",
                other.name(),
                other.kind()
            ))),
        }
    }

    /// Encrypt a new secret for the `Encrypted` credential at `index`.
    ///
    /// The old value's reveal (if any) ends; the new masked display is
    /// computed from `plaintext`.
    pub async fn set_secret(&mut self, index: usize, plaintext: &str) -> Result<()> {
        let current = self.entry(index)?.credential.clone();
        if current.kind() != CredentialKind::Encrypted {
            return Err(VaultError::NotEncrypted(current.name().to_string()));
        }

        let key = self.vault.current_key().await?;
        let sealed = self.vault.seal_with(current, plaintext, &key).await?;

        let entry = self.entry_mut(index)?;
        let id = entry.id;
        entry.credential = sealed;
        self.sessions.hide(&id);
        Ok(())
    }

    /// Swap in a whole new list, ending every reveal.
    pub fn replace_all(&mut self, credentials: Vec<Credential>) {
        self.sessions.teardown();
        self.entries.clear();
        for credential in credentials {
            self.add(credential);
        }
    }

    // ------------------------------------------------------------------
    // Reveal
    // ------------------------------------------------------------------

    /// Decrypt and show the credential at `index` for the reveal window.
    pub async fn reveal(&self, index: usize) -> Result<()> {
        let entry = self.entry(index)?;
        let cipher_text = secret_of(&entry.credential)?;
        let key = self.vault.current_key().await?;
        self.sessions.reveal(entry.id, cipher_text, &key).await
    }

    /// Hide the credential at `index`.  Returns whether it was revealed.
    pub fn hide(&self, index: usize) -> bool {
        match self.entries.get(index) {
            Some(entry) => self.sessions.hide(&entry.id),
            None => false,
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .is_some_and(|entry| self.sessions.is_revealed(&entry.id))
    }

    /// The plaintext of the credential at `index`, while revealed.
    pub fn revealed_value(&self, index: usize) -> Option<Zeroizing<String>> {
        let entry = self.entries.get(index)?;
        self.sessions.revealed_value(&entry.id)
    }

    /// What to render for the credential at `index`: the plaintext while
    /// revealed, otherwise its default display.
    pub fn display(&self, index: usize) -> Option<Zeroizing<String>> {
        let entry = self.entries.get(index)?;
        self.sessions
            .revealed_value(&entry.id)
            .or_else(|| Some(Zeroizing::new(entry.credential.display().to_string())))
    }

    pub fn expires_at(&self, index: usize) -> Option<Instant> {
        let entry = self.entries.get(index)?;
        self.sessions.expires_at(&entry.id)
    }

    /// Hide every credential and cancel every pending auto-hide.
    pub fn teardown(&self) {
        self.sessions.teardown();
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Save the working list through the vault's validation filter.
    pub async fn commit(&self) -> Result<CommitOutcome> {
        let credentials: Vec<Credential> = self.credentials().cloned().collect();
        self.vault.commit_card(&self.card_id, credentials).await
    }
}

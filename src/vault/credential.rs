//! The three kinds of credential a card can carry.
//!
//! Only `Encrypted` ever holds protected material.  `Reference` and
//! `External` are pointers elsewhere and never need a key.
//!
//! In JSON a credential is tagged by a `type` field:
//!
//! ```json
//! { "type": "encrypted", "name": "Stripe", "cipher_text": "...", "masked_display": "sk_live_*****wM5N8" }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::CipherText;
use crate::errors::{Result, VaultError};

/// A credential attached to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    /// A link to a dashboard where the secret can be looked up.
    Reference {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        reference_url: String,
    },

    /// A secret stored encrypted, plus its precomputed masked form.
    Encrypted {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        cipher_text: CipherText,
        /// Computed from the plaintext when it was last entered; it cannot
        /// be rebuilt from `cipher_text` without the key.
        masked_display: String,
    },

    /// Free text pointing into a third-party secret manager.
    External {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        location: String,
    },
}

/// Which disclosure pattern a credential uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Reference,
    Encrypted,
    External,
}

impl CredentialKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Encrypted => "encrypted",
            Self::External => "external",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "reference" => Ok(Self::Reference),
            "encrypted" => Ok(Self::Encrypted),
            "external" => Ok(Self::External),
            other => Err(VaultError::Validation(format!(
                "unknown credential kind '{other}' (expected reference, encrypted or external)"
            ))),
        }
    }
}

impl Credential {
    pub fn reference(name: impl Into<String>, reference_url: impl Into<String>) -> Self {
        Self::Reference {
            name: name.into(),
            note: None,
            reference_url: reference_url.into(),
        }
    }

    pub fn encrypted(
        name: impl Into<String>,
        cipher_text: CipherText,
        masked_display: impl Into<String>,
    ) -> Self {
        Self::Encrypted {
            name: name.into(),
            note: None,
            cipher_text,
            masked_display: masked_display.into(),
        }
    }

    pub fn external(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::External {
            name: name.into(),
            note: None,
            location: location.into(),
        }
    }

    /// Builder-style note setter.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.set_note(Some(note.into()));
        self
    }

    /// A blank credential of `kind`: nothing but the name.
    pub fn blank(kind: CredentialKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            CredentialKind::Reference => Self::reference(name, ""),
            CredentialKind::Encrypted => Self::encrypted(name, CipherText::new(""), ""),
            CredentialKind::External => Self::external(name, ""),
        }
    }

    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::Reference { .. } => CredentialKind::Reference,
            Self::Encrypted { .. } => CredentialKind::Encrypted,
            Self::External { .. } => CredentialKind::External,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Reference { name, .. }
            | Self::Encrypted { name, .. }
            | Self::External { name, .. } => name,
        }
    }

    pub fn set_name(&mut self, new_name: impl Into<String>) {
        match self {
            Self::Reference { name, .. }
            | Self::Encrypted { name, .. }
            | Self::External { name, .. } => *name = new_name.into(),
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Self::Reference { note, .. }
            | Self::Encrypted { note, .. }
            | Self::External { note, .. } => note.as_deref(),
        }
    }

    pub fn set_note(&mut self, new_note: Option<String>) {
        match self {
            Self::Reference { note, .. }
            | Self::Encrypted { note, .. }
            | Self::External { note, .. } => *note = new_note.filter(|n| !n.is_empty()),
        }
    }

    /// The protected payload, for `Encrypted` credentials only.
    pub fn cipher_text(&self) -> Option<&CipherText> {
        match self {
            Self::Encrypted { cipher_text, .. } => Some(cipher_text),
            _ => None,
        }
    }

    /// Whether this credential carries material that needs the key.
    pub fn has_secret(&self) -> bool {
        self.cipher_text().is_some_and(|ct| !ct.as_str().is_empty())
    }

    /// What to show by default: the masked secret, the URL or the location.
    pub fn display(&self) -> &str {
        match self {
            Self::Reference { reference_url, .. } => reference_url,
            Self::Encrypted { masked_display, .. } => masked_display,
            Self::External { location, .. } => location,
        }
    }

    /// Rebuild this credential as `kind`, keeping only name and note.
    ///
    /// Every variant-specific field is dropped, even when switching to
    /// the same kind.
    pub fn switch_kind(self, kind: CredentialKind) -> Self {
        let note = self.note().map(str::to_string);
        let mut switched = Self::blank(kind, self.name());
        switched.set_note(note);
        switched
    }

    /// Check the credential is fit to hand to a store.
    pub fn validate(&self) -> Result<()> {
        if self.name().trim().is_empty() {
            return Err(VaultError::Validation("name cannot be empty".into()));
        }
        if self.kind() == CredentialKind::Encrypted && !self.has_secret() {
            return Err(VaultError::Validation(format!(
                "'{}' has no secret value",
                self.name()
            )));
        }
        Ok(())
    }
}

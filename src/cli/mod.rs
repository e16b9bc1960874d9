//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::provider::{FileKeyProvider, KeyProvider};
use crate::vault::{CredentialKind, CredentialVault, JsonFileStore};

/// Environment variable holding the log filter (e.g. `cardvault=debug`).
pub const LOG_ENV: &str = "CARDVAULT_LOG";

/// Longest accepted card id.
const MAX_CARD_ID_LEN: usize = 128;

/// CardVault CLI: credentials attached to project-tracker cards.
#[derive(Parser)]
#[command(
    name = "cardvault",
    about = "Encrypted, masked credentials for project-tracker cards",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: from .cardvault.toml, else .cardvault)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,

    /// Key context to encrypt under (default: from .cardvault.toml, else "default")
    #[arg(short, long, global = true)]
    pub context: Option<String>,

    /// Keep encryption keys in the OS keyring instead of key files
    #[cfg(feature = "keyring-store")]
    #[arg(long, global = true)]
    pub keyring: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate the encryption key for the current context
    Init {
        /// Replace an existing key (secrets encrypted under it become unreadable)
        #[arg(long)]
        force: bool,
    },

    /// Attach a credential to a card (add or update by name)
    Add {
        /// Card id
        card: String,
        /// Credential name (e.g. "Stripe live key")
        name: String,
        /// Disclosure pattern: encrypted, reference or external
        #[arg(short, long, default_value = "encrypted")]
        kind: CredentialKind,
        /// Secret, URL or location (omit for a secure prompt / stdin)
        value: Option<String>,
        /// Free-form note shown next to the credential
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List a card's credentials (secrets are masked)
    List {
        /// Card id
        card: String,
    },

    /// Show a secret for a limited time
    Reveal {
        /// Card id
        card: String,
        /// Credential name
        name: String,
    },

    /// Remove a credential from a card
    Remove {
        /// Card id
        card: String,
        /// Credential name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Print the masked form of a value
    Mask {
        /// Value to mask
        value: String,
    },

    /// Re-encrypt secrets under a freshly generated key
    RotateKey {
        /// Cards to re-encrypt (default: every card in the store)
        cards: Vec<String>,
    },

    /// Hand the encryption key to or from another key holder
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Key subcommands.
#[derive(clap::Subcommand)]
pub enum KeyAction {
    /// Print the current key as base64
    Export,

    /// Store a base64 key as the current key
    Import {
        /// The key, as printed by `cardvault key export`
        key: String,
        /// Replace an existing key
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Install the stderr log subscriber, filtered by `CARDVAULT_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// Settings from `.cardvault.toml` in the working directory, with CLI
/// flags applied on top.
pub fn load_settings(cli: &Cli) -> Result<(PathBuf, Settings)> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(dir) = &cli.vault_dir {
        settings.vault_dir = dir.clone();
    }
    if let Some(context) = &cli.context {
        settings.key_context = context.clone();
    }
    Ok((cwd, settings))
}

/// The key provider selected by the CLI flags.
fn key_provider(cli: &Cli, cwd: &std::path::Path, settings: &Settings) -> Arc<dyn KeyProvider> {
    #[cfg(feature = "keyring-store")]
    if cli.keyring {
        return Arc::new(crate::keyring::KeyringKeyProvider::new());
    }

    // Suppress unused variable warning when keyring feature is off.
    #[cfg(not(feature = "keyring-store"))]
    let _ = cli;

    Arc::new(FileKeyProvider::new(settings.key_dir(cwd)))
}

/// Build the vault for the working directory.
pub fn open_vault(cli: &Cli) -> Result<(Settings, Arc<CredentialVault>)> {
    let (cwd, settings) = load_settings(cli)?;
    let keys = key_provider(cli, &cwd, &settings);
    let store = Arc::new(JsonFileStore::new(settings.store_path(&cwd)));
    let vault = CredentialVault::new(keys, store, settings.key_context.clone());
    Ok((settings, Arc::new(vault)))
}

/// Get a secret value from one of three sources:
/// 1. Inline on the command line (warned: it lands in shell history)
/// 2. Piped stdin
/// 3. Interactive hidden prompt
pub fn read_secret(prompt: &str, inline: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = inline {
        output::warning("Value provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed_len = buf.trim_end().len();
        buf.truncate(trimmed_len);
        return Ok(buf);
    }

    let value = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(value))
}

/// Validate that a card id is usable as a store key.
///
/// Must not be empty or blank, contain control characters, or exceed
/// 128 characters.
pub fn validate_card_id(card: &str) -> Result<()> {
    if card.trim().is_empty() {
        return Err(VaultError::Validation("card id cannot be empty".into()));
    }

    if card.chars().count() > MAX_CARD_ID_LEN {
        return Err(VaultError::Validation(format!(
            "card id cannot exceed {MAX_CARD_ID_LEN} characters"
        )));
    }

    if card.chars().any(char::is_control) {
        return Err(VaultError::Validation(format!(
            "card id '{}' contains control characters",
            card.escape_debug()
        )));
    }

    Ok(())
}

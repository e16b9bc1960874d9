use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Project-level configuration, loaded from `.cardvault.toml`.
///
/// Every field has a sensible default so CardVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the store and keys.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Key context used when none is given on the command line.
    #[serde(default = "default_key_context")]
    pub key_context: String,

    /// Seconds a revealed secret stays visible (default: 30).
    #[serde(default = "default_reveal_window_secs")]
    pub reveal_window_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".cardvault".to_string()
}

fn default_key_context() -> String {
    "default".to_string()
}

fn default_reveal_window_secs() -> u64 {
    30
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            key_context: default_key_context(),
            reveal_window_secs: default_reveal_window_secs(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".cardvault.toml";

    /// Load settings from `<project_dir>/.cardvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.reveal_window_secs == 0 {
            return Err(VaultError::ConfigError(
                "reveal_window_secs must be at least 1".into(),
            ));
        }
        if self.key_context.is_empty() {
            return Err(VaultError::ConfigError("key_context cannot be empty".into()));
        }
        Ok(())
    }

    /// The reveal window as a `Duration`.
    pub fn reveal_window(&self) -> Duration {
        Duration::from_secs(self.reveal_window_secs)
    }

    /// Full path to the credential store file.
    ///
    /// Example: `project_dir/.cardvault/credentials.json`
    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir).join("credentials.json")
    }

    /// Directory holding per-context key files.
    ///
    /// Example: `project_dir/.cardvault/keys`
    pub fn key_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir).join("keys")
    }
}

// ── Tests ────────────────────────────────────────────────────────────

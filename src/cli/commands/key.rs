//! `cardvault key` — export or import the raw encryption key.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::crypto::{export_key, import_key};
use crate::errors::{Result, VaultError};

/// Execute `key export`.
pub async fn execute_export(cli: &Cli) -> Result<()> {
    let (_, vault) = open_vault(cli)?;
    let key = vault.current_key().await?;

    output::warning("Anyone holding this key can decrypt every secret in this context.");
    let encoded = Zeroizing::new(export_key(&key));
    println!("{}", encoded.as_str());
    Ok(())
}

/// Execute `key import`.
pub async fn execute_import(cli: &Cli, encoded: &str, force: bool) -> Result<()> {
    let key = import_key(encoded)?;
    let (_, vault) = open_vault(cli)?;

    if !force && vault.has_key().await? {
        return Err(VaultError::KeyAlreadyExists(vault.context().to_string()));
    }

    vault.import_key(key).await?;
    output::success(&format!("Key imported for context '{}'", vault.context()));
    Ok(())
}

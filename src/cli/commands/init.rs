//! `cardvault init` — generate the encryption key for a context.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `init` command.
pub async fn execute(cli: &Cli, force: bool) -> Result<()> {
    let (_, vault) = open_vault(cli)?;

    match vault.init_key(force).await {
        Ok(()) => {}
        Err(e @ VaultError::KeyAlreadyExists(_)) => {
            output::tip("Use `cardvault rotate-key` to replace a key without losing secrets.");
            return Err(e);
        }
        Err(e) => return Err(e),
    }

    if force {
        output::warning("Existing key replaced — secrets encrypted under it can no longer be revealed.");
    }
    output::success(&format!(
        "Encryption key created for context '{}'",
        vault.context()
    ));
    output::tip("Run `cardvault add <CARD> <NAME>` to attach a credential.");

    Ok(())
}

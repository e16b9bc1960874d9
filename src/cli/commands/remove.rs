//! `cardvault remove` — detach a credential from a card.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, validate_card_id, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `remove` command.
pub async fn execute(cli: &Cli, card: &str, name: &str, force: bool) -> Result<()> {
    validate_card_id(card)?;
    let (_, vault) = open_vault(cli)?;

    let mut credentials = vault.load_card(card).await?;
    let index = credentials
        .iter()
        .position(|c| c.name() == name)
        .ok_or_else(|| VaultError::CredentialNotFound(name.to_string()))?;

    // Unless --force is set, ask for confirmation before removing.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove credential '{name}' from {card}?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    credentials.remove(index);
    let outcome = vault.commit_card(card, credentials).await?;

    output::success(&format!(
        "Credential '{name}' removed from {card} ({} remaining)",
        outcome.saved
    ));

    Ok(())
}

//! `cardvault list` — display a card's credentials in a table.

use crate::cli::output;
use crate::cli::{open_vault, validate_card_id, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub async fn execute(cli: &Cli, card: &str) -> Result<()> {
    validate_card_id(card)?;
    let (_, vault) = open_vault(cli)?;

    let credentials = vault.load_card(card).await?;

    output::info(&format!("{card} — {} credential(s)", credentials.len()));
    output::print_credentials_table(&credentials);

    Ok(())
}

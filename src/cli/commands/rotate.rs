//! `cardvault rotate-key` — re-encrypt secrets under a new key.

use crate::cli::output;
use crate::cli::{open_vault, validate_card_id, Cli};
use crate::errors::Result;

/// Execute the `rotate-key` command.
pub async fn execute(cli: &Cli, cards: &[String]) -> Result<()> {
    let (_, vault) = open_vault(cli)?;

    let partial = !cards.is_empty();
    let cards = if cards.is_empty() {
        vault.card_ids().await?
    } else {
        for card in cards {
            validate_card_id(card)?;
        }
        cards.to_vec()
    };

    let report = vault.rotate_key(&cards).await?;

    output::success(&format!(
        "Key for '{}' rotated — {} secret(s) re-encrypted across {} card(s)",
        vault.context(),
        report.reencrypted,
        report.cards
    ));
    if partial {
        output::warning("Secrets on cards not included in this rotation can no longer be revealed.");
    }

    Ok(())
}

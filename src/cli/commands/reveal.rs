//! `cardvault reveal` — show a secret until its reveal window lapses.
//!
//! On a terminal the value stays on screen until auto-hide fires (or
//! Ctrl-C), then the lines are cleared.  When stdout is not a terminal
//! the value is printed once and the session ends immediately.

use std::sync::Arc;
use std::time::Duration;

use console::Term;

use crate::cli::output;
use crate::cli::{open_vault, validate_card_id, Cli};
use crate::errors::{Result, VaultError};
use crate::reveal::TokioScheduler;
use crate::vault::CredentialKind;

/// How often the terminal checks whether the session is still open.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Execute the `reveal` command.
pub async fn execute(cli: &Cli, card: &str, name: &str) -> Result<()> {
    validate_card_id(card)?;
    let (settings, vault) = open_vault(cli)?;

    let scheduler = Arc::new(TokioScheduler::current());
    let editor = vault
        .edit_card(card, scheduler, settings.reveal_window())
        .await?;

    let index = editor
        .position(name)
        .ok_or_else(|| VaultError::CredentialNotFound(name.to_string()))?;

    if let Some(credential) = editor.get(index) {
        if credential.kind() != CredentialKind::Encrypted {
            output::info(&format!(
                "'{name}' is a {} credential — nothing is hidden: {}",
                credential.kind(),
                credential.display()
            ));
            return Ok(());
        }
    }

    editor.reveal(index).await?;
    let value = editor
        .revealed_value(index)
        .ok_or_else(|| VaultError::CommandFailed("reveal session closed early".into()))?;

    let term = Term::stdout();
    if !term.is_term() {
        println!("{}", value.as_str());
        editor.hide(index);
        return Ok(());
    }

    term.write_line(value.as_str())?;
    output::tip(&format!(
        "Hidden again in {}s (Ctrl-C to hide now)",
        settings.reveal_window_secs
    ));

    while editor.is_revealed(index) {
        tokio::select! {
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
            _ = tokio::signal::ctrl_c() => {
                editor.hide(index);
            }
        }
    }

    term.clear_last_lines(2)?;
    output::info(&format!("'{name}' hidden."));
    Ok(())
}

//! `cardvault add` — attach a credential to a card, or update it by name.

use crate::cli::output;
use crate::cli::{open_vault, read_secret, validate_card_id, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::{Credential, CredentialKind};

/// Execute the `add` command.
pub async fn execute(
    cli: &Cli,
    card: &str,
    name: &str,
    kind: CredentialKind,
    value: Option<&str>,
    note: Option<&str>,
) -> Result<()> {
    validate_card_id(card)?;
    let (_, vault) = open_vault(cli)?;

    let mut credential = match kind {
        CredentialKind::Encrypted => {
            let secret = read_secret(&format!("Enter secret for {name}"), value)?;
            if secret.is_empty() {
                return Err(VaultError::Validation("secret value cannot be empty".into()));
            }
            vault.seal(name, &secret).await?
        }
        CredentialKind::Reference => Credential::reference(name, required(value, "URL")?),
        CredentialKind::External => Credential::external(name, required(value, "location")?),
    };
    credential.set_note(note.map(str::to_string));

    let mut credentials = vault.load_card(card).await?;
    let existed = match credentials.iter().position(|c| c.name() == name) {
        Some(index) => {
            credentials[index] = credential;
            true
        }
        None => {
            credentials.push(credential);
            false
        }
    };

    let outcome = vault.commit_card(card, credentials).await?;
    for rejected in &outcome.rejected {
        output::warning(&format!(
            "Dropped invalid credential #{} '{}': {}",
            rejected.index + 1,
            rejected.name,
            rejected.reason
        ));
    }
    if outcome.rejected.iter().any(|r| r.name == name) {
        return Err(VaultError::Validation(format!("'{name}' was not saved")));
    }

    let verb = if existed { "updated on" } else { "added to" };
    output::success(&format!(
        "{kind} credential '{name}' {verb} {card} ({} total)",
        outcome.saved
    ));
    if kind == CredentialKind::Encrypted {
        output::tip(&format!("Run `cardvault reveal {card} \"{name}\"` to see it."));
    }

    Ok(())
}

/// Non-secret values must be given on the command line.
fn required(value: Option<&str>, what: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(VaultError::Validation(format!("a {what} is required"))),
    }
}

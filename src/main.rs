use cardvault::cli::{Cli, Commands, KeyAction};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cardvault::cli::init_tracing();

    let result = match cli.command {
        Commands::Init { force } => cardvault::cli::commands::init::execute(&cli, force).await,
        Commands::Add {
            ref card,
            ref name,
            kind,
            ref value,
            ref note,
        } => {
            cardvault::cli::commands::add::execute(
                &cli,
                card,
                name,
                kind,
                value.as_deref(),
                note.as_deref(),
            )
            .await
        }
        Commands::List { ref card } => cardvault::cli::commands::list::execute(&cli, card).await,
        Commands::Reveal { ref card, ref name } => {
            cardvault::cli::commands::reveal::execute(&cli, card, name).await
        }
        Commands::Remove {
            ref card,
            ref name,
            force,
        } => cardvault::cli::commands::remove::execute(&cli, card, name, force).await,
        Commands::Mask { ref value } => cardvault::cli::commands::mask::execute(value),
        Commands::RotateKey { ref cards } => {
            cardvault::cli::commands::rotate::execute(&cli, cards).await
        }
        Commands::Key { ref action } => match action {
            KeyAction::Export => cardvault::cli::commands::key::execute_export(&cli).await,
            KeyAction::Import { key, force } => {
                cardvault::cli::commands::key::execute_import(&cli, key, *force).await
            }
        },
        Commands::Completions { shell } => cardvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        cardvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

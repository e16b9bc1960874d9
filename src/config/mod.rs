//! Project configuration (`.cardvault.toml`).

pub mod settings;

pub use settings::Settings;

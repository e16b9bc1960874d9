pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod masking;
pub mod provider;
pub mod reveal;
pub mod vault;

#[cfg(feature = "keyring-store")]
pub mod keyring;

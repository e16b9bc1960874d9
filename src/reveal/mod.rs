//! Reveal module — temporary exposure of decrypted secrets.
//!
//! This module provides:
//! - The `Scheduler` trait with tokio and manual-clock timers (`scheduler`)
//! - `RevealSessionManager`, the per-credential hidden/revealed state machine (`session`)

pub mod scheduler;
pub mod session;

pub use scheduler::{ManualScheduler, Scheduler, TimerCallback, TimerId, TokioScheduler};
pub use session::{RevealSessionManager, REVEAL_WINDOW};

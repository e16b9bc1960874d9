//! Time-boxed reveal sessions.
//!
//! A credential is either hidden (no entry in the table) or revealed
//! (an entry holding the decrypted value, its expiry and the auto-hide
//! timer).  Sessions are keyed by whatever identifies a credential to
//! the owner: a list index, a stable id, a name.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use super::scheduler::{lock, Scheduler, TimerId};
use crate::crypto::{decrypt_async, CipherText, EncryptionKey};
use crate::errors::Result;

/// How long a revealed value stays visible before it is re-masked.
pub const REVEAL_WINDOW: Duration = Duration::from_secs(30);

struct RevealSession {
    plaintext: Zeroizing<String>,
    expires_at: Instant,
    timer: TimerId,
    /// Ties the armed auto-hide callback to this particular session.
    generation: u64,
}

/// Revealed sessions plus the counters that let an in-flight reveal
/// notice it was cancelled while it was decrypting.
struct SessionTable<K> {
    sessions: HashMap<K, RevealSession>,
    /// Bumped by every `teardown`.
    teardowns: u64,
    /// Bumped by every `hide` of that id, revealed or not.
    hides: HashMap<K, u64>,
}

impl<K: Eq + Hash> SessionTable<K> {
    fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            teardowns: 0,
            hides: HashMap::new(),
        }
    }

    fn ticket(&self, id: &K) -> Ticket {
        Ticket {
            teardowns: self.teardowns,
            hides: self.hides.get(id).copied().unwrap_or(0),
        }
    }
}

/// Snapshot of the cancellation counters taken when a reveal starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    teardowns: u64,
    hides: u64,
}

type SharedTable<K> = Mutex<SessionTable<K>>;

/// Owns every reveal session of one form/dialog.
///
/// Dropping the manager tears all sessions down.
pub struct RevealSessionManager<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
    scheduler: Arc<dyn Scheduler>,
    window: Duration,
    next_generation: AtomicU64,
    table: Arc<SharedTable<K>>,
}

impl<K> RevealSessionManager<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
    /// Build a manager that re-masks revealed values after `window`.
    pub fn new(scheduler: Arc<dyn Scheduler>, window: Duration) -> Self {
        Self {
            scheduler,
            window,
            next_generation: AtomicU64::new(0),
            table: Arc::new(Mutex::new(SessionTable::new())),
        }
    }

    /// Build a manager using the standard 30-second window.
    pub fn with_default_window(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::new(scheduler, REVEAL_WINDOW)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decrypt `cipher_text` and show it for `id` until the window lapses.
    ///
    /// Revealing an already-revealed id does nothing: the running timer
    /// is kept, never duplicated.  On a decryption failure the session
    /// stays hidden and the error is returned.
    ///
    /// A `hide` of `id` or a `teardown` that lands while the value is
    /// being decrypted wins: the plaintext is dropped and `id` stays
    /// hidden.
    pub async fn reveal(&self, id: K, cipher_text: &CipherText, key: &EncryptionKey) -> Result<()> {
        let ticket = {
            let table = lock(&self.table);
            if table.sessions.contains_key(&id) {
                tracing::debug!(?id, "credential already revealed");
                return Ok(());
            }
            table.ticket(&id)
        };

        let plaintext = decrypt_async(cipher_text.clone(), key.clone())
            .await
            .map_err(|e| {
                tracing::warn!(?id, "reveal failed: {e}");
                e
            })?;

        self.open_session(id, plaintext, Some(ticket));
        Ok(())
    }

    /// Show an already-decrypted value for `id`.
    ///
    /// Returns `false` (and discards `plaintext`) if `id` is already
    /// revealed.
    pub fn reveal_plaintext(&self, id: K, plaintext: Zeroizing<String>) -> bool {
        self.open_session(id, plaintext, None)
    }

    /// `ticket` is the counter snapshot taken before an await; `None`
    /// for synchronous callers.
    fn open_session(&self, id: K, plaintext: Zeroizing<String>, ticket: Option<Ticket>) -> bool {
        let mut table = lock(&self.table);

        if ticket.is_some_and(|ticket| ticket != table.ticket(&id)) {
            tracing::debug!(?id, "reveal cancelled while decrypting");
            return false;
        }

        // Another reveal for the same id may have finished while we were
        // decrypting.
        if table.sessions.contains_key(&id) {
            return false;
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let timer = self.arm_auto_hide(id.clone(), generation);
        let expires_at = self.scheduler.now() + self.window;

        table.sessions.insert(
            id.clone(),
            RevealSession {
                plaintext,
                expires_at,
                timer,
                generation,
            },
        );
        tracing::info!(?id, window_secs = self.window.as_secs(), "credential revealed");
        true
    }

    fn arm_auto_hide(&self, id: K, generation: u64) -> TimerId {
        let table: Weak<SharedTable<K>> = Arc::downgrade(&self.table);
        self.scheduler.schedule(
            self.window,
            Box::new(move || {
                let Some(table) = table.upgrade() else {
                    return;
                };
                let mut table = lock(&table);
                let current = table
                    .sessions
                    .get(&id)
                    .is_some_and(|session| session.generation == generation);
                if current {
                    table.sessions.remove(&id);
                    tracing::info!(?id, "credential auto-hidden");
                }
            }),
        )
    }

    /// Hide `id` now, cancelling its timer and dropping the plaintext.
    ///
    /// Also cancels a reveal of `id` that is still decrypting.  Returns
    /// whether the credential was revealed.
    pub fn hide(&self, id: &K) -> bool {
        let removed = {
            let mut table = lock(&self.table);
            *table.hides.entry(id.clone()).or_insert(0) += 1;
            table.sessions.remove(id)
        };
        match removed {
            Some(session) => {
                self.scheduler.cancel(session.timer);
                tracing::info!(?id, "credential hidden");
                true
            }
            None => false,
        }
    }

    /// Hide every credential, cancel every outstanding timer and every
    /// reveal still decrypting.
    pub fn teardown(&self) {
        let drained: Vec<(K, RevealSession)> = {
            let mut table = lock(&self.table);
            table.teardowns += 1;
            table.hides.clear();
            table.sessions.drain().collect()
        };
        if drained.is_empty() {
            return;
        }
        for (_, session) in &drained {
            self.scheduler.cancel(session.timer);
        }
        tracing::debug!(count = drained.len(), "reveal sessions torn down");
    }

    pub fn is_revealed(&self, id: &K) -> bool {
        lock(&self.table).sessions.contains_key(id)
    }

    /// The decrypted value, while `id` is revealed.
    pub fn revealed_value(&self, id: &K) -> Option<Zeroizing<String>> {
        lock(&self.table)
            .sessions
            .get(id)
            .map(|session| session.plaintext.clone())
    }

    /// When the current reveal of `id` will be re-masked.
    pub fn expires_at(&self, id: &K) -> Option<Instant> {
        lock(&self.table)
            .sessions
            .get(id)
            .map(|session| session.expires_at)
    }

    /// Ids currently revealed, in no particular order.
    pub fn revealed_ids(&self) -> Vec<K> {
        lock(&self.table).sessions.keys().cloned().collect()
    }

    /// Number of auto-hide timers this manager has outstanding.
    ///
    /// Every revealed session owns exactly one.
    pub fn pending_timers(&self) -> usize {
        lock(&self.table).sessions.len()
    }
}

impl<K> Drop for RevealSessionManager<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

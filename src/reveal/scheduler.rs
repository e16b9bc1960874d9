//! Deferred-callback scheduling behind a small trait.
//!
//! The reveal session manager never sleeps itself; it asks a
//! `Scheduler` to run a callback later and keeps the returned
//! `TimerId` so it can cancel it.  Two implementations ship:
//!
//! - `TokioScheduler` — real timers on a tokio runtime.
//! - `ManualScheduler` — a fake clock that only moves when `advance`
//!   is called, for deterministic tests and embedding hosts that drive
//!   their own event loop.
//!
//! Both guarantee that once `cancel` returns, the callback will not run.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Opaque handle to a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A callback run once when its timer expires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// The host's timer primitive.
pub trait Scheduler: Send + Sync {
    /// Run `callback` once after `delay`.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a pending timer.  Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);

    /// The scheduler's notion of "now", used to compute expiry instants.
    fn now(&self) -> Instant;
}

/// Lock a mutex, recovering the data if a panicking callback poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tokio
// ---------------------------------------------------------------------------

/// Timers backed by `tokio::time::sleep` tasks.
pub struct TokioScheduler {
    handle: Handle,
    next_id: AtomicU64,
    armed: Arc<Mutex<HashMap<TimerId, AbortHandle>>>,
}

impl TokioScheduler {
    /// Spawn timer tasks onto the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            next_id: AtomicU64::new(1),
            armed: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Use the runtime the caller is currently running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        lock(&self.armed).len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let armed = Arc::clone(&self.armed);

        // Hold the table lock until the abort handle is registered, so the
        // task cannot look itself up before it exists.
        let mut table = lock(&self.armed);
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            // Whoever removes the entry owns the timer: if `cancel` got
            // there first, the callback must not run.
            let still_armed = lock(&armed).remove(&id).is_some();
            if still_armed {
                callback();
            }
        });
        table.insert(id, task.abort_handle());
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some(task) = lock(&self.armed).remove(&id) {
            task.abort();
        }
    }

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

// ---------------------------------------------------------------------------
// Manual clock
// ---------------------------------------------------------------------------

struct ManualState {
    elapsed: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), TimerCallback>,
    deadlines: HashMap<TimerId, Duration>,
}

/// A fake clock.  Time stands still until `advance` moves it.
pub struct ManualScheduler {
    origin: Instant,
    state: Mutex<ManualState>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(ManualState {
                elapsed: Duration::ZERO,
                next_id: 1,
                queue: BTreeMap::new(),
                deadlines: HashMap::new(),
            }),
        }
    }

    /// Time elapsed on the fake clock since construction.
    pub fn elapsed(&self) -> Duration {
        lock(&self.state).elapsed
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// Move the clock forward by `by`, firing every timer whose deadline
    /// falls inside the window, in deadline order.
    ///
    /// Returns how many callbacks ran.  Callbacks run without the clock
    /// lock held, so they may schedule or cancel further timers.
    pub fn advance(&self, by: Duration) -> usize {
        let target = lock(&self.state).elapsed + by;
        let mut fired = 0;

        loop {
            let due = {
                let mut state = lock(&self.state);
                let next_key = state
                    .queue
                    .keys()
                    .next()
                    .copied()
                    .filter(|(deadline, _)| *deadline <= target);

                match next_key {
                    Some(key) => {
                        state.elapsed = key.0;
                        state.deadlines.remove(&key.1);
                        state.queue.remove(&key)
                    }
                    None => {
                        state.elapsed = target;
                        None
                    }
                }
            };

            match due {
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }

        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let mut state = lock(&self.state);
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let deadline = state.elapsed + delay;
        state.queue.insert((deadline, id), callback);
        state.deadlines.insert(id, deadline);
        id
    }

    fn cancel(&self, id: TimerId) {
        let mut state = lock(&self.state);
        if let Some(deadline) = state.deadlines.remove(&id) {
            state.queue.remove(&(deadline, id));
        }
    }

    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> TimerCallback) {
        let hits = Arc::new(AtomicUsize::new(0));
        let for_cb = Arc::clone(&hits);
        let make = move || -> TimerCallback {
            let hits = Arc::clone(&for_cb);
            Box::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        (hits, make)
    }

    #[test]
    fn manual_timer_fires_at_its_deadline() {
        let clock = ManualScheduler::new();
        let (hits, cb) = counter();
        clock.schedule(Duration::from_secs(30), cb());

        assert_eq!(clock.advance(Duration::from_secs(29)), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(clock.advance(Duration::from_secs(1)), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn manual_cancelled_timer_never_fires() {
        let clock = ManualScheduler::new();
        let (hits, cb) = counter();
        let id = clock.schedule(Duration::from_secs(5), cb());
        clock.cancel(id);

        assert_eq!(clock.advance(Duration::from_secs(60)), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn manual_clock_fires_in_deadline_order() {
        let clock = ManualScheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for (delay, tag) in [(3, "c"), (1, "a"), (2, "b")] {
            let order = Arc::clone(&order);
            clock.schedule(
                Duration::from_secs(delay),
                Box::new(move || lock(&order).push(tag)),
            );
        }

        assert_eq!(clock.advance(Duration::from_secs(10)), 3);
        assert_eq!(*lock(&order), vec!["a", "b", "c"]);
        assert_eq!(clock.elapsed(), Duration::from_secs(10));
    }

    #[test]
    fn manual_now_tracks_elapsed_time() {
        let clock = ManualScheduler::new();
        let start = clock.now();
        clock.advance(Duration::from_secs(7));
        assert_eq!(clock.now() - start, Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_fires_after_delay() {
        let scheduler = TokioScheduler::current();
        let (hits, cb) = counter();
        scheduler.schedule(Duration::from_secs(30), cb());
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_cancelled_timer_never_fires() {
        let scheduler = TokioScheduler::current();
        let (hits, cb) = counter();
        let id = scheduler.schedule(Duration::from_secs(30), cb());
        scheduler.cancel(id);
        assert_eq!(scheduler.pending(), 0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}

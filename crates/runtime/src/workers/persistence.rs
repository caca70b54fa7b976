//! Debounced persistence of player records.
//!
//! The game worker sends a snapshot of every player it mutated. Snapshots
//! are coalesced per nick and written together once the debounce window
//! elapses, so a burst of shots costs one write.
//!
//! # Failure handling
//!
//! A failed write keeps its records pending (unless a newer snapshot of the
//! same player arrived meanwhile) and schedules the next attempt with
//! exponential backoff. When the game worker goes away the scheduler makes a
//! final flush with a bounded number of retries before exiting.

use std::collections::BTreeMap;
use std::sync::Arc;

use duckhunt_core::{Player, PlayerId};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant, sleep, sleep_until};
use tracing::{debug, error, info, warn};

use crate::api::Result;
use crate::events::{EventBus, PersistenceEvent};
use crate::repository::{PlayerStore, RepositoryError};

/// Requests accepted by the save scheduler.
pub(crate) enum SaveRequest {
    /// Fresh snapshots of players that changed.
    Dirty(Vec<Player>),
    /// Write everything pending now.
    Flush { reply: oneshot::Sender<Result<usize>> },
}

/// Background worker that batches player saves.
pub(crate) struct SaveScheduler {
    store: Arc<dyn PlayerStore>,
    request_rx: mpsc::UnboundedReceiver<SaveRequest>,
    event_bus: EventBus,
    debounce: Duration,
    pending: BTreeMap<PlayerId, Player>,
    deadline: Option<Instant>,
    failures: u32,
}

impl SaveScheduler {
    const MAX_BACKOFF_SHIFT: u32 = 3;
    const FINAL_ATTEMPTS: u32 = 3;
    const FINAL_BASE_DELAY_MS: u64 = 100;

    pub(crate) fn new(
        store: Arc<dyn PlayerStore>,
        request_rx: mpsc::UnboundedReceiver<SaveRequest>,
        event_bus: EventBus,
        debounce: Duration,
    ) -> Self {
        Self {
            store,
            request_rx,
            event_bus,
            debounce,
            pending: BTreeMap::new(),
            deadline: None,
            failures: 0,
        }
    }

    /// Main worker loop. Returns after the final flush.
    pub(crate) async fn run(mut self) {
        info!("SaveScheduler started (debounce {:?})", self.debounce);

        loop {
            let deadline = self.deadline;
            tokio::select! {
                request = self.request_rx.recv() => match request {
                    Some(SaveRequest::Dirty(players)) => self.enqueue(players),
                    Some(SaveRequest::Flush { reply }) => {
                        let result = self.flush().await.map_err(Into::into);
                        if reply.send(result).is_err() {
                            debug!("Flush reply channel closed (caller dropped)");
                        }
                    }
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    // Failures are published and rescheduled inside flush.
                    let _ = self.flush().await;
                }
            }
        }

        self.finalize().await;
        info!("SaveScheduler stopped");
    }

    fn enqueue(&mut self, players: Vec<Player>) {
        for player in players {
            self.pending.insert(player.id.clone(), player);
        }
        if self.deadline.is_none() && !self.pending.is_empty() {
            self.deadline = Some(Instant::now() + self.debounce);
        }
    }

    /// Writes every pending record in one batch.
    async fn flush(&mut self) -> std::result::Result<usize, RepositoryError> {
        self.deadline = None;
        if self.pending.is_empty() {
            return Ok(0);
        }

        let batch = std::mem::take(&mut self.pending);
        let players: Vec<Player> = batch.values().cloned().collect();
        let count = players.len();

        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || store.save_all(&players))
            .await
            .unwrap_or_else(|e| {
                Err(RepositoryError::CorruptedData(format!(
                    "save task panicked: {e}"
                )))
            });

        match outcome {
            Ok(()) => {
                if self.failures > 0 {
                    info!("Player records saved after {} failed attempts", self.failures);
                }
                self.failures = 0;
                debug!("Flushed {} player records", count);
                self.event_bus
                    .publish(PersistenceEvent::Flushed { players: count });
                Ok(count)
            }
            Err(e) => {
                // Keep the failed snapshots unless something newer arrived.
                for (id, player) in batch {
                    self.pending.entry(id).or_insert(player);
                }
                self.failures += 1;
                let delay = self.debounce * (1 << self.failures.min(Self::MAX_BACKOFF_SHIFT));
                self.deadline = Some(Instant::now() + delay);

                error!("Failed to save {} player records: {}", count, e);
                warn!(
                    "Retrying save in {:?} (attempt {})",
                    delay,
                    self.failures + 1
                );
                self.event_bus.publish(PersistenceEvent::Failed {
                    pending: self.pending.len(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn finalize(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        info!("Final flush of {} player records", self.pending.len());
        for attempt in 0..Self::FINAL_ATTEMPTS {
            if self.flush().await.is_ok() {
                return;
            }
            if attempt + 1 < Self::FINAL_ATTEMPTS {
                sleep(Duration::from_millis(Self::FINAL_BASE_DELAY_MS * (1 << attempt))).await;
            }
        }
        error!(
            "Giving up on {} player records after {} attempts",
            self.pending.len(),
            Self::FINAL_ATTEMPTS
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, Topic};
    use crate::repository::InMemoryPlayerStore;
    use duckhunt_core::PlayerDefaults;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn player(nick: &str, xp: u64) -> Player {
        let mut p = Player::new(PlayerId::new(nick), &PlayerDefaults::default());
        p.xp = xp;
        p
    }

    /// Store that fails a fixed number of writes before delegating.
    struct Flaky {
        inner: InMemoryPlayerStore,
        failures_left: AtomicU32,
        writes: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                inner: InMemoryPlayerStore::new(),
                failures_left: AtomicU32::new(failures),
                writes: AtomicU32::new(0),
            }
        }
    }

    impl PlayerStore for Flaky {
        fn load(&self, id: &PlayerId) -> crate::repository::Result<Option<Player>> {
            self.inner.load(id)
        }

        fn save(&self, player: &Player) -> crate::repository::Result<()> {
            self.save_all(std::slice::from_ref(player))
        }

        fn save_all(&self, players: &[Player]) -> crate::repository::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(RepositoryError::Io(std::io::Error::other("disk full")));
            }
            players.iter().try_for_each(|p| self.inner.save(p))
        }

        fn list_ids(&self) -> crate::repository::Result<Vec<PlayerId>> {
            self.inner.list_ids()
        }
    }

    fn spawn(store: Arc<Flaky>, bus: EventBus) -> (mpsc::UnboundedSender<SaveRequest>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = SaveScheduler::new(store, rx, bus, Duration::from_secs(5));
        (tx, tokio::spawn(scheduler.run()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_coalesced_into_one_write() {
        let store = Arc::new(Flaky::new(0));
        let bus = EventBus::new();
        let mut events = bus.subscribe(Topic::Persistence);
        let (tx, worker) = spawn(Arc::clone(&store), bus);

        tx.send(SaveRequest::Dirty(vec![player("alice", 1)])).unwrap();
        tx.send(SaveRequest::Dirty(vec![player("alice", 2), player("bob", 7)])).unwrap();
        tx.send(SaveRequest::Dirty(vec![player("alice", 3)])).unwrap();

        match events.recv().await.unwrap() {
            Event::Persistence(PersistenceEvent::Flushed { players }) => assert_eq!(players, 2),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner.load(&PlayerId::new("alice")).unwrap().unwrap().xp, 3);

        drop(tx);
        worker.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_is_retried() {
        let store = Arc::new(Flaky::new(1));
        let bus = EventBus::new();
        let mut events = bus.subscribe(Topic::Persistence);
        let (tx, worker) = spawn(Arc::clone(&store), bus);

        tx.send(SaveRequest::Dirty(vec![player("alice", 9)])).unwrap();

        match events.recv().await.unwrap() {
            Event::Persistence(PersistenceEvent::Failed { pending, .. }) => assert_eq!(pending, 1),
            other => panic!("unexpected event {other:?}"),
        }
        match events.recv().await.unwrap() {
            Event::Persistence(PersistenceEvent::Flushed { players }) => assert_eq!(players, 1),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(store.inner.load(&PlayerId::new("alice")).unwrap().unwrap().xp, 9);

        drop(tx);
        worker.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_the_channel_flushes_pending() {
        let store = Arc::new(Flaky::new(0));
        let (tx, worker) = spawn(Arc::clone(&store), EventBus::new());

        tx.send(SaveRequest::Dirty(vec![player("carol", 4)])).unwrap();
        drop(tx);
        worker.await.unwrap();

        assert_eq!(store.inner.load(&PlayerId::new("carol")).unwrap().unwrap().xp, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_flush_reports_count() {
        let store = Arc::new(Flaky::new(0));
        let (tx, worker) = spawn(Arc::clone(&store), EventBus::new());

        tx.send(SaveRequest::Dirty(vec![player("dave", 1), player("erin", 2)])).unwrap();
        let (reply, rx) = oneshot::channel();
        tx.send(SaveRequest::Flush { reply }).unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), 2);

        let (reply, rx) = oneshot::channel();
        tx.send(SaveRequest::Flush { reply }).unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), 0);

        drop(tx);
        worker.await.unwrap();
    }
}

//! Periodic loops that drive time-based game events.
//!
//! Neither loop touches game state. Each one only enqueues a command for the
//! game worker, so spawning and timeouts interleave with player actions in
//! one sequential order.

use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info};

use super::game::Command;

/// Which periodic job a [`TickLoop`] drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickKind {
    /// Spawn a duck in every channel whose spawn is due.
    Spawn,
    /// Remove ducks that outstayed their timeout.
    Timeout,
}

/// Background task that wakes up every `period` and asks the game worker to
/// run one [`TickKind`] job.
///
/// Exits within one period of the shutdown signal, or as soon as the game
/// worker stops accepting commands.
pub(crate) struct TickLoop {
    kind: TickKind,
    period: Duration,
    command_tx: mpsc::Sender<Command>,
    shutdown_rx: watch::Receiver<bool>,
}

impl TickLoop {
    pub(crate) fn new(
        kind: TickKind,
        period: Duration,
        command_tx: mpsc::Sender<Command>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            kind,
            period: period.max(Duration::from_millis(1)),
            command_tx,
            shutdown_rx,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("{:?} loop started (every {:?})", self.kind, self.period);

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    if self.command_tx.send(Command::Tick(self.kind)).await.is_err() {
                        debug!("{:?} loop: game worker gone", self.kind);
                        break;
                    }
                }
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("{:?} loop stopped", self.kind);
    }
}

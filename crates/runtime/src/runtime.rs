//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the hunt.

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use duckhunt_content::ContentBundle;
use duckhunt_core::RngOracle;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::oracle::{Clock, SeededRng, SystemClock};
use crate::repository::{InMemoryPlayerStore, PlayerStore};
use crate::workers::{Command, GameWorker, GameWorkerParts, SaveRequest, SaveScheduler, TickKind, TickLoop};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    /// Quiet period before dirty players are written.
    pub save_debounce: Duration,
    /// Run the automatic spawn loop (default: true)
    pub enable_spawning: bool,
    /// Run the timeout sweep loop (default: true)
    pub enable_timeouts: bool,
    /// Fixed RNG seed for reproducible sessions. OS entropy when unset.
    pub rng_seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32,
            event_buffer_size: 100,
            save_debounce: Duration::from_secs(5),
            enable_spawning: true,
            enable_timeouts: true,
            rng_seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `DUCKHUNT_*` environment variables.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            command_buffer_size: read_env("DUCKHUNT_COMMAND_BUFFER").unwrap_or(defaults.command_buffer_size),
            event_buffer_size: read_env("DUCKHUNT_EVENT_BUFFER").unwrap_or(defaults.event_buffer_size),
            save_debounce: read_env("DUCKHUNT_SAVE_DEBOUNCE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.save_debounce),
            enable_spawning: read_env_bool("DUCKHUNT_SPAWNING").unwrap_or(defaults.enable_spawning),
            enable_timeouts: read_env_bool("DUCKHUNT_TIMEOUTS").unwrap_or(defaults.enable_timeouts),
            rng_seed: read_env("DUCKHUNT_RNG_SEED"),
        }
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    let value = env::var(key).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Main runtime that orchestrates the hunt
///
/// Design: Runtime owns workers and coordinates shutdown.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    // Shared handle (can be cloned for clients)
    handle: RuntimeHandle,

    shutdown_tx: watch::Sender<bool>,

    // Background workers
    game_worker_handle: JoinHandle<()>,
    save_worker_handle: JoinHandle<()>,
    tick_handles: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Tick loops stop first, then the game worker finishes the commands it
    /// already accepted, then the save scheduler writes what is pending.
    /// Handles still held elsewhere get `CommandChannelClosed` afterwards.
    pub async fn shutdown(self) -> Result<()> {
        info!("Runtime shutting down");
        // Receivers may already be gone; the workers then stop on their own.
        let _ = self.shutdown_tx.send(true);
        drop(self.handle);

        for tick in self.tick_handles {
            tick.await.map_err(RuntimeError::WorkerJoin)?;
        }
        self.game_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;
        self.save_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        info!("Runtime stopped");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    content: ContentBundle,
    store: Option<Arc<dyn PlayerStore>>,
    clock: Option<Arc<dyn Clock>>,
    rng: Option<Box<dyn RngOracle + Send>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            content: ContentBundle::default(),
            store: None,
            clock: None,
            rng: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Game config, level table and shop catalog (stock content by default)
    pub fn content(mut self, content: ContentBundle) -> Self {
        self.content = content;
        self
    }

    /// Player store (in-memory by default)
    pub fn store(mut self, store: impl PlayerStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Player store shared with the caller
    pub fn shared_store(mut self, store: Arc<dyn PlayerStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Time source (system clock by default)
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Random source, overriding `RuntimeConfig::rng_seed`
    pub fn rng(mut self, rng: impl RngOracle + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    fn validate(content: &ContentBundle) -> Result<()> {
        let spawning = &content.config.spawning;
        if spawning.poll_interval_secs == 0 {
            return Err(RuntimeError::InvalidContent(
                "spawning.poll_interval_secs must be at least 1".into(),
            ));
        }
        if spawning.max_ducks_per_channel == 0 {
            return Err(RuntimeError::InvalidContent(
                "spawning.max_ducks_per_channel must be at least 1".into(),
            ));
        }
        if content.config.ducks.kinds.iter().all(|p| p.weight == 0) {
            return Err(RuntimeError::InvalidContent(
                "at least one duck kind needs a positive weight".into(),
            ));
        }
        Ok(())
    }

    /// Build the runtime and start its workers
    pub async fn build(self) -> Result<Runtime> {
        Self::validate(&self.content)?;

        let rng: Box<dyn RngOracle + Send> = match (self.rng, self.config.rng_seed) {
            (Some(rng), _) => rng,
            (None, Some(seed)) => Box::new(SeededRng::seeded(seed)),
            (None, None) => Box::new(SeededRng::from_entropy()),
        };
        let store: Arc<dyn PlayerStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryPlayerStore::new()),
        };
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let poll = Duration::from_secs(self.content.config.spawning.poll_interval_secs);

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let (save_tx, save_rx) = mpsc::unbounded_channel::<SaveRequest>();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx.clone(), event_bus.clone());

        let save_worker = SaveScheduler::new(
            Arc::clone(&store),
            save_rx,
            event_bus.clone(),
            self.config.save_debounce,
        );
        let save_worker_handle = tokio::spawn(save_worker.run());

        let game_worker = GameWorker::new(
            GameWorkerParts {
                content: self.content,
                rng,
                clock,
                store,
            },
            command_rx,
            save_tx,
            shutdown_rx.clone(),
            event_bus,
        );
        let game_worker_handle = tokio::spawn(game_worker.run());

        let mut tick_handles = Vec::new();
        let enabled = [
            (TickKind::Spawn, self.config.enable_spawning),
            (TickKind::Timeout, self.config.enable_timeouts),
        ];
        for (kind, _) in enabled.into_iter().filter(|(_, on)| *on) {
            let tick = TickLoop::new(kind, poll, command_tx.clone(), shutdown_rx.clone());
            tick_handles.push(tokio::spawn(tick.run()));
        }

        info!(
            "Runtime started (spawning: {}, timeouts: {}, poll: {:?})",
            self.config.enable_spawning, self.config.enable_timeouts, poll
        );

        Ok(Runtime {
            handle,
            shutdown_tx,
            game_worker_handle,
            save_worker_handle,
            tick_handles,
        })
    }
}

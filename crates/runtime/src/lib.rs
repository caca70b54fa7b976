//! Runtime orchestration for the duck hunt engine.
//!
//! This crate wires the pure `duckhunt-core` rules to time, randomness,
//! channel presence and durable storage. Consumers embed [`Runtime`] to start
//! the workers and interact with the hunt through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`workers`] keeps background tasks internal to the crate
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
pub mod api;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{DuckEvent, Event, EventBus, PersistenceEvent, Topic};
pub use oracle::{ChannelRoster, Clock, ManualClock, SeededRng, SystemClock};
pub use repository::{FilePlayerStore, InMemoryPlayerStore, PlayerStore, RepositoryError};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};

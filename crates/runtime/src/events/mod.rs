//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Command replies carry the outcome of an action to
//! its caller; events tell everyone else what happened in a channel.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{DuckEvent, PersistenceEvent};

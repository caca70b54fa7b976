//! Repository layer for player records.
//!
//! Players are the only data that survives a restart. Ducks, channel presence
//! and static content (config, levels, catalog) are rebuilt at startup.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FilePlayerStore;
pub use memory::InMemoryPlayerStore;
pub use traits::PlayerStore;

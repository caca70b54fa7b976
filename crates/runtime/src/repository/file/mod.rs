//! File-based repository implementations.

mod legacy;
mod state;

pub use state::FilePlayerStore;

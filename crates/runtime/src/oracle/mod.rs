//! Runtime implementations of the oracles `duckhunt-core` consults.
//!
//! The engine never reads a clock, owns a random source or tracks who is in
//! which channel. The game worker owns one of each and lends them to every
//! operation.
mod clock;
mod presence;
mod rng;

pub use clock::{Clock, ManualClock, SystemClock};
pub use presence::ChannelRoster;
pub use rng::SeededRng;

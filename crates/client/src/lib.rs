//! Console client for the duck hunt runtime.
//!
//! The `duckhunt` binary is the composition root: it reads [`ClientConfig`],
//! installs logging, loads game content, opens the player save file and
//! starts the [`Runtime`](duckhunt_runtime::Runtime). Input lines are parsed
//! by [`console`] and every result is rendered by [`presentation`].

pub mod config;
pub mod console;
pub mod logging;
pub mod presentation;

pub use config::ClientConfig;
pub use console::{Console, ConsoleCommand, Flow, ParseError};
pub use presentation::Presenter;

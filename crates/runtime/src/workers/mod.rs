//! Worker tasks that back the runtime orchestration.
//!
//! The game worker executes gameplay commands, tick loops feed it spawn and
//! timeout jobs, and the save scheduler persists the players it touched.

mod game;
mod persistence;
mod ticker;

pub(crate) use game::{Command, GameWorker, GameWorkerParts};
pub(crate) use persistence::{SaveRequest, SaveScheduler};
pub(crate) use ticker::{TickKind, TickLoop};

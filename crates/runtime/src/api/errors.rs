//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, and shop
//! validation so clients can bubble them up with consistent context.
//! Gameplay misfortune (misses, jams, confiscation) is never an error; it
//! arrives as an outcome value.
use thiserror::Error;
use tokio::sync::oneshot;

use duckhunt_core::{ChannelId, PlayerId, ShopError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("game worker command channel closed")]
    CommandChannelClosed,

    #[error("game worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("runtime worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error("nobody is in {0}")]
    UnknownChannel(ChannelId),

    #[error("{player} is not in {channel}")]
    NotInChannel { player: PlayerId, channel: ChannelId },

    #[error("invalid game content: {0}")]
    InvalidContent(String),
}

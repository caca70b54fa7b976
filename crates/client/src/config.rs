//! Client process configuration.
use std::env;
use std::path::PathBuf;

use duckhunt_core::{ChannelId, PlayerId};

/// Configuration required to bootstrap the console client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Directory holding the player save file.
    pub data_dir: PathBuf,
    /// Explicit save file path. Overrides `data_dir`.
    pub save_file: Option<PathBuf>,
    /// Enables the file log layer when set.
    pub log_dir: Option<PathBuf>,
    /// Directory with `config.toml`, `levels.ron` and `shop.ron`.
    pub content_dir: Option<PathBuf>,
    pub nick: PlayerId,
    pub channel: ChannelId,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            save_file: None,
            log_dir: None,
            content_dir: None,
            nick: PlayerId::new("hunter"),
            channel: ChannelId::new("#pond"),
        }
    }
}

impl ClientConfig {
    pub const SAVE_FILE_NAME: &'static str = "players.json";

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DUCKHUNT_DATA_DIR` - Directory for save data (default: platform-specific)
    /// - `DUCKHUNT_SAVE_FILE` - Player save file (default: `<data dir>/players.json`)
    /// - `DUCKHUNT_LOG_DIR` - Also write logs to `<dir>/duckhunt.log` (default: stderr only)
    /// - `DUCKHUNT_CONTENT_DIR` - Game data directory (default: stock data)
    /// - `DUCKHUNT_NICK` - Starting nick (default: hunter)
    /// - `DUCKHUNT_CHANNEL` - Starting channel (default: #pond)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("DUCKHUNT_DATA_DIR") {
            config.data_dir = dir;
        }
        config.save_file = read_env("DUCKHUNT_SAVE_FILE");
        config.log_dir = read_env("DUCKHUNT_LOG_DIR");
        config.content_dir = read_env("DUCKHUNT_CONTENT_DIR");

        if let Some(nick) = read_env::<String>("DUCKHUNT_NICK").filter(|n| !n.trim().is_empty()) {
            config.nick = PlayerId::new(nick.trim());
        }
        if let Some(channel) = read_env::<String>("DUCKHUNT_CHANNEL").filter(|c| !c.trim().is_empty()) {
            config.channel = ChannelId::new(channel.trim());
        }

        config
    }

    /// Resolved path of the player save file.
    pub fn save_path(&self) -> PathBuf {
        self.save_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(Self::SAVE_FILE_NAME))
    }
}

/// Platform data directory, e.g. `~/.local/share/duckhunt` on Linux.
fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "duckhunt")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

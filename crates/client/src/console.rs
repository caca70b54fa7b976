//! Line-driven console: parses chat-style commands and runs them against a
//! [`RuntimeHandle`] as the current nick in the current channel.

use duckhunt_core::{ChannelId, DuckKind, ItemId, PlayerId, PurchaseMode, Timestamp};
use duckhunt_runtime::{RuntimeError, RuntimeHandle};
use thiserror::Error;
use tracing::debug;

use crate::presentation::Presenter;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Bang,
    Reload,
    Befriend,
    ShopList,
    Buy {
        item: ItemId,
        target: Option<PlayerId>,
        mode: PurchaseMode,
    },
    Use {
        item: ItemId,
        target: Option<PlayerId>,
    },
    Sell(ItemId),
    Spawn(Option<DuckKind>),
    Stats(Option<PlayerId>),
    Ducks,
    Join(ChannelId),
    Part,
    Nick(PlayerId),
    Flush,
    Help,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command: {0} (try !help)")]
    Unknown(String),

    #[error("{0} is missing its argument")]
    MissingArgument(&'static str),

    #[error("not an item id: {0}")]
    InvalidItem(String),

    #[error("unknown duck type: {0}")]
    InvalidKind(String),
}

pub const HELP: &[&str] = &[
    "!bang | !reload | !bef",
    "!shop                      list items",
    "!shop <id> [nick]          buy and apply now",
    "!shop store <id>           buy and keep for later",
    "!use <id> [nick] | !sell <id>",
    "!stats [nick] | !ducks | !spawn [kind]",
    "/join <#channel> | /part | /nick <name> | /flush | /quit",
];

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let arg = |i: usize| args.get(i).copied();
    let nick = |i: usize| arg(i).map(PlayerId::new);

    let command = match head.to_ascii_lowercase().as_str() {
        "!bang" => ConsoleCommand::Bang,
        "!reload" => ConsoleCommand::Reload,
        "!bef" | "!befriend" => ConsoleCommand::Befriend,
        "!shop" => match arg(0) {
            None => ConsoleCommand::ShopList,
            Some(word) if word.eq_ignore_ascii_case("store") => ConsoleCommand::Buy {
                item: item_id(arg(1).ok_or(ParseError::MissingArgument("!shop store"))?)?,
                target: None,
                mode: PurchaseMode::Store,
            },
            Some(id) => ConsoleCommand::Buy {
                item: item_id(id)?,
                target: nick(1),
                mode: PurchaseMode::Apply,
            },
        },
        "!use" => ConsoleCommand::Use {
            item: item_id(arg(0).ok_or(ParseError::MissingArgument("!use"))?)?,
            target: nick(1),
        },
        "!sell" => ConsoleCommand::Sell(item_id(arg(0).ok_or(ParseError::MissingArgument("!sell"))?)?),
        "!spawn" => ConsoleCommand::Spawn(
            arg(0)
                .map(|k| k.parse::<DuckKind>().map_err(|_| ParseError::InvalidKind(k.to_string())))
                .transpose()?,
        ),
        "!stats" => ConsoleCommand::Stats(nick(0)),
        "!ducks" => ConsoleCommand::Ducks,
        "!help" | "/help" => ConsoleCommand::Help,
        "/join" => ConsoleCommand::Join(ChannelId::new(arg(0).ok_or(ParseError::MissingArgument("/join"))?)),
        "/part" => ConsoleCommand::Part,
        "/nick" => ConsoleCommand::Nick(nick(0).ok_or(ParseError::MissingArgument("/nick"))?),
        "/flush" => ConsoleCommand::Flush,
        "/quit" | "/exit" => ConsoleCommand::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn item_id(word: &str) -> Result<ItemId, ParseError> {
    word.parse::<u32>()
        .map(ItemId)
        .map_err(|_| ParseError::InvalidItem(word.to_string()))
}

/// What the driver should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(Vec<String>),
    Quit,
}

/// Session state of the console user.
pub struct Console {
    handle: RuntimeHandle,
    presenter: Presenter,
    nick: PlayerId,
    channel: ChannelId,
}

impl Console {
    pub fn new(handle: RuntimeHandle, presenter: Presenter, nick: PlayerId, channel: ChannelId) -> Self {
        Self {
            handle,
            presenter,
            nick,
            channel,
        }
    }

    pub fn nick(&self) -> &PlayerId {
        &self.nick
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Joins the starting channel.
    pub async fn enter(&self) -> Result<String, RuntimeError> {
        self.handle.join_channel(self.nick.clone(), self.channel.clone()).await?;
        Ok(format!("{} joined {}", self.nick, self.channel))
    }

    /// Runs one command. Runtime failures are rendered, not returned, except
    /// for a closed runtime.
    pub async fn execute(&mut self, command: ConsoleCommand, now: Timestamp) -> Result<Flow, RuntimeError> {
        debug!("{} in {}: {:?}", self.nick, self.channel, command);
        match self.run(command, now).await {
            Ok(flow) => Ok(flow),
            Err(RuntimeError::CommandChannelClosed) => Err(RuntimeError::CommandChannelClosed),
            Err(e) => Ok(Flow::Continue(vec![self.presenter.error(self.nick.as_str(), &e)])),
        }
    }

    async fn run(&mut self, command: ConsoleCommand, now: Timestamp) -> Result<Flow, RuntimeError> {
        let (nick, channel) = (self.nick.clone(), self.channel.clone());
        let p = &self.presenter;
        let line = match command {
            ConsoleCommand::Bang => p.shoot(nick.as_str(), &self.handle.shoot(nick.clone(), channel).await?),
            ConsoleCommand::Reload => p.reload(nick.as_str(), &self.handle.reload(nick.clone()).await?),
            ConsoleCommand::Befriend => {
                p.befriend(nick.as_str(), &self.handle.befriend(nick.clone(), channel).await?)
            }
            ConsoleCommand::ShopList => return Ok(Flow::Continue(p.shop())),
            ConsoleCommand::Buy { item, target, mode } => {
                let receipt = self.handle.purchase(nick.clone(), channel, item, target, mode).await?;
                p.purchase(nick.as_str(), &receipt)
            }
            ConsoleCommand::Use { item, target } => {
                let receipt = self.handle.use_item(nick.clone(), channel, item, target).await?;
                p.use_receipt(nick.as_str(), &receipt)
            }
            ConsoleCommand::Sell(item) => p.sale(nick.as_str(), &self.handle.sell(nick.clone(), item).await?),
            ConsoleCommand::Spawn(kind) => match self.handle.spawn_duck(channel.clone(), kind).await? {
                Some(_) => format!("A duck was released in {channel}"),
                None => format!("{channel} is full of ducks already"),
            },
            ConsoleCommand::Stats(who) => {
                let who = who.unwrap_or(nick);
                match self.handle.player(who.clone()).await? {
                    Some(player) => p.player(&player, now),
                    None => format!("{who} has never hunted here"),
                }
            }
            ConsoleCommand::Ducks => p.ducks(channel.as_str(), &self.handle.ducks(channel.clone()).await?),
            ConsoleCommand::Join(next) => {
                self.handle.part_channel(nick.clone(), channel).await?;
                self.handle.join_channel(nick.clone(), next.clone()).await?;
                self.channel = next;
                format!("{nick} joined {}", self.channel)
            }
            ConsoleCommand::Part => {
                self.handle.part_channel(nick.clone(), channel.clone()).await?;
                format!("{nick} left {channel}")
            }
            ConsoleCommand::Nick(next) => {
                self.handle.part_channel(nick.clone(), channel.clone()).await?;
                self.handle.join_channel(next.clone(), channel).await?;
                self.nick = next;
                format!("{nick} is now known as {}", self.nick)
            }
            ConsoleCommand::Flush => format!("Saved {} player(s)", self.handle.flush().await?),
            ConsoleCommand::Help => return Ok(Flow::Continue(HELP.iter().map(|l| l.to_string()).collect())),
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        };
        Ok(Flow::Continue(vec![line]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckhunt_content::ContentBundle;
    use duckhunt_core::ScriptedRolls;
    use duckhunt_runtime::{ManualClock, Runtime, RuntimeConfig};

    #[test]
    fn test_parse_shop_forms() {
        assert_eq!(parse("!shop").unwrap(), Some(ConsoleCommand::ShopList));
        assert_eq!(
            parse("!shop 16 Bob").unwrap(),
            Some(ConsoleCommand::Buy {
                item: ItemId(16),
                target: Some(PlayerId::new("bob")),
                mode: PurchaseMode::Apply,
            })
        );
        assert_eq!(
            parse("!shop store 2").unwrap(),
            Some(ConsoleCommand::Buy {
                item: ItemId(2),
                target: None,
                mode: PurchaseMode::Store,
            })
        );
        assert_eq!(parse("!shop store"), Err(ParseError::MissingArgument("!shop store")));
        assert_eq!(parse("!shop bread"), Err(ParseError::InvalidItem("bread".into())));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("!BANG").unwrap(), Some(ConsoleCommand::Bang));
        assert_eq!(
            parse("!spawn golden").unwrap(),
            Some(ConsoleCommand::Spawn(Some(DuckKind::Golden)))
        );
        assert_eq!(parse("!spawn goose"), Err(ParseError::InvalidKind("goose".into())));
        assert_eq!(parse("!quack"), Err(ParseError::Unknown("!quack".into())));
        assert_eq!(
            parse("/join #Lake").unwrap(),
            Some(ConsoleCommand::Join(ChannelId::new("#lake")))
        );
    }

    #[tokio::test]
    async fn test_console_session() {
        let content = ContentBundle::default();
        let runtime = Runtime::builder()
            .config(RuntimeConfig {
                enable_spawning: false,
                enable_timeouts: false,
                ..RuntimeConfig::default()
            })
            .content(content.clone())
            .clock(ManualClock::new(Timestamp::from_secs(1_000)))
            .rng(ScriptedRolls::default())
            .build()
            .await
            .unwrap();

        let mut console = Console::new(
            runtime.handle(),
            Presenter::new(&content),
            PlayerId::new("alice"),
            ChannelId::new("#pond"),
        );
        console.enter().await.unwrap();
        let now = Timestamp::from_secs(1_000);

        let Flow::Continue(lines) = console.execute(ConsoleCommand::Reload, now).await.unwrap() else {
            panic!("reload should not quit");
        };
        assert!(lines[0].contains("doesn't need"));

        let Flow::Continue(lines) = console
            .execute(ConsoleCommand::Sell(ItemId(1)), now)
            .await
            .unwrap()
        else {
            panic!("sell should not quit");
        };
        assert!(lines[0].starts_with("alice > "));

        console
            .execute(ConsoleCommand::Join(ChannelId::new("#lake")), now)
            .await
            .unwrap();
        assert_eq!(console.channel().as_str(), "#lake");

        assert_eq!(console.execute(ConsoleCommand::Quit, now).await.unwrap(), Flow::Quit);
        runtime.shutdown().await.unwrap();
    }
}

//! Duck hunt console client.
//!
//! Composition root that assembles:
//! 1. Content (game config, levels, shop) via `ContentFactory`
//! 2. Player storage via `FilePlayerStore`
//! 3. Runtime (game worker, tick loops, save scheduler) via `RuntimeBuilder`
//! 4. The console driver reading commands from stdin
//!
//! # Examples
//!
//! ```bash
//! DUCKHUNT_NICK=alice RUST_LOG=duckhunt_runtime=debug cargo run -p duckhunt-client
//! ```

use anyhow::{Context, Result};
use duckhunt_content::ContentFactory;
use duckhunt_runtime::{
    Clock, Event, FilePlayerStore, Runtime, RuntimeConfig, SystemClock, Topic,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use duckhunt_client::console::parse;
use duckhunt_client::{ClientConfig, Console, Flow, Presenter, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Load configuration from environment
    let config = ClientConfig::from_env();
    let runtime_config = RuntimeConfig::from_env();

    // 2. Setup logging
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;
    tracing::info!("Starting duckhunt as {} in {}", config.nick, config.channel);

    // 3. Content and storage
    let factory = match &config.content_dir {
        Some(dir) => ContentFactory::new(dir),
        None => ContentFactory::stock(),
    };
    let content = factory
        .load_all()
        .with_context(|| format!("Failed to load game content from {}", factory.data_dir().display()))?;

    let save_path = config.save_path();
    let store = FilePlayerStore::open(&save_path, &content.config.player)
        .with_context(|| format!("Failed to open save file {}", save_path.display()))?;
    if store.was_migrated() {
        tracing::info!("Migrated legacy save file {}", save_path.display());
    }
    tracing::info!("Players: {}", save_path.display());

    // 4. Runtime
    let runtime = Runtime::builder()
        .config(runtime_config)
        .content(content.clone())
        .store(store)
        .build()
        .await?;
    let handle = runtime.handle();
    let presenter = Presenter::new(&content);

    let printer = spawn_event_printer(
        handle.subscribe(Topic::Ducks),
        handle.subscribe(Topic::Persistence),
        presenter.clone(),
        config.nick.to_string(),
    );

    // 5. Console loop
    let mut console = Console::new(handle, presenter, config.nick, config.channel);
    println!("{}", console.enter().await?);
    println!("Type !help for commands.");

    let clock = SystemClock;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match console.execute(command, clock.now()).await? {
            Flow::Continue(output) => output.iter().for_each(|l| println!("{l}")),
            Flow::Quit => break,
        }
    }

    // 6. Shutdown (flushes pending saves)
    runtime.shutdown().await?;
    printer.abort();
    let _ = printer.await;

    tracing::info!("Client shutdown complete");
    Ok(())
}

/// Prints duck and persistence events as they happen.
fn spawn_event_printer(
    mut ducks: broadcast::Receiver<Event>,
    mut persistence: broadcast::Receiver<Event>,
    presenter: Presenter,
    nick: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                event = ducks.recv() => event,
                event = persistence.recv() => event,
            };
            match received {
                Ok(event) => {
                    if let Some(line) = presenter.event(&nick, &event) {
                        println!("{line}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event printer lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

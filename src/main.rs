//! universe-game - demo entry point
//!
//! Initializes a game from the environment, plays `GAME_ROUNDS` rounds and
//! reacts to game events the way an embedding page would.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use universe_game::{printers_for, BroadcastBus, Game, GameConfig, GameEvent};

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "universe_game=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GameConfig::from_env()?;
    let rounds: usize = std::env::var("GAME_ROUNDS")
        .ok()
        .map(|raw| raw.trim().parse())
        .transpose()
        .context("Invalid value for GAME_ROUNDS")?
        .unwrap_or(2);
    info!(
        "Loaded configuration: game={}, max_delay={}ms, rounds={}",
        config.game, config.max_delay_ms, rounds
    );

    let bus = Arc::new(BroadcastBus::default());
    let mut events = bus.subscribe();
    let (log, foos) = printers_for(&config);

    let mut game = Game::init(config, log.clone(), foos.clone(), bus)?;
    react(&game, &mut events);

    for round in 1..=rounds {
        let summary = game.play().await?;
        info!(
            "Round {} finished: {} tasks in {:?}",
            round, summary.total, summary.elapsed
        );
        react(&game, &mut events);
    }

    for line in foos.lines().into_iter().chain(log.lines()) {
        println!("{}", line);
    }
    Ok(())
}

/// Handle every event emitted since the last call.
fn react(game: &Game, events: &mut broadcast::Receiver<GameEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            GameEvent::Initialized => game.log("initialized!", "event"),
            GameEvent::Finished => {
                game.log("finished!", "event");
                game.select_winners(&[42, 42 * 42]);
            }
        }
    }
}

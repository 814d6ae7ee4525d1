//! Game facade.
//!
//! Ties a task set, the staggered tracker, two output surfaces and an event
//! bus together:
//! - `init` populates the first set and emits `initialized`
//! - `play` resets a used set, runs every task and emits `finished`
//! - `select_winners` reports where query answers landed in the firing order

use std::sync::Arc;

use tracing::info;

use crate::config::GameConfig;
use crate::events::{EventBus, GameEvent};
use crate::matcher::{match_answers, Winner};
use crate::render::{Printer, PrinterSettings, Renderer};
use crate::task::{TaskError, TaskSet, UNIVERSE_CONSTANT};
use crate::tracker::{RunState, RunSummary, StaggeredTracker};

/// Build the log and task printers described by `config`.
pub fn printers_for(config: &GameConfig) -> (Arc<Printer>, Arc<Printer>) {
    let log = Printer::new(PrinterSettings {
        container: config.containers.log.clone(),
        ..Default::default()
    });
    let foos = Printer::new(PrinterSettings {
        container: config.containers.foos.clone(),
        class_name: config.class_names.foo.clone(),
        ..Default::default()
    });
    (Arc::new(log), Arc::new(foos))
}

pub struct Game {
    config: GameConfig,
    set: TaskSet,
    tracker: StaggeredTracker,
    /// General log surface
    log: Arc<dyn Renderer>,
    /// Surface that fired tasks are rendered to
    foos: Arc<dyn Renderer>,
    bus: Arc<dyn EventBus>,
}

impl Game {
    /// Populate the first task set and emit `initialized`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `config.game` is negative or above `MAX_TASKS`.
    pub fn init(
        config: GameConfig,
        log: Arc<dyn Renderer>,
        foos: Arc<dyn Renderer>,
        bus: Arc<dyn EventBus>,
    ) -> Result<Self, TaskError> {
        let mut set = TaskSet::new();
        set.populate(config.game)?;

        let game = Self {
            tracker: StaggeredTracker::new(config.max_delay()),
            config,
            set,
            log,
            foos,
            bus,
        };
        info!(
            "Game initialized with {} tasks, max delay {}ms",
            game.config.game, game.config.max_delay_ms
        );
        game.bus.notify(GameEvent::Initialized);
        Ok(game)
    }

    /// Replace the tracker, e.g. to use fixed delays.
    pub fn with_tracker(mut self, tracker: StaggeredTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn task_set(&self) -> &TaskSet {
        &self.set
    }

    /// Run one play-through and emit `finished` once every task fired.
    ///
    /// A set left over from a previous play-through is cleared, both surfaces
    /// are emptied and the set is repopulated first.
    pub async fn play(&mut self) -> Result<RunSummary, TaskError> {
        if RunState::of(&self.set) != RunState::Idle {
            self.reset()?;
        }

        let summary = self
            .tracker
            .start(&mut self.set, Arc::clone(&self.foos))?
            .finish()
            .await?;

        self.bus.notify(GameEvent::Finished);
        Ok(summary)
    }

    fn reset(&mut self) -> Result<(), TaskError> {
        info!("Resetting game for a new play-through");
        self.set.clear();
        self.log.clear_output();
        self.foos.clear_output();
        self.set.populate(self.config.game)
    }

    /// Write a line to the log surface.
    pub fn log(&self, text: &str, category: &str) {
        self.log.render(text, category);
    }

    /// Find each query's position in the firing order, log it and highlight
    /// the winning line.
    ///
    /// An empty query list does nothing.
    pub fn select_winners(&self, queries: &[u64]) -> Vec<Winner> {
        if queries.is_empty() {
            return Vec::new();
        }

        let winners = match_answers(&self.set.fired_order(), queries);
        for winner in &winners {
            let label = winner.query as f64 / UNIVERSE_CONSTANT as f64;
            match winner.position {
                Some(position) => {
                    self.log(&format!("Answer {} is at position {}", label, position), "");
                    self.foos.highlight(position, &self.config.class_names.selected);
                }
                None => self.log(&format!("Answer {} was not found", label), ""),
            }
        }
        winners
    }
}

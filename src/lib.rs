//! # Universe Game
//!
//! A small game of staggered tasks: every task carries an answer derived
//! from its index, fires after its own random delay, and once all have fired
//! the caller can ask where given answers landed in the firing order.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────┐  start   ┌──────────────────┐  render   ┌──────────┐
//!   │  TaskSet   │ ───────▶ │ StaggeredTracker │ ────────▶ │ Renderer │
//!   └────────────┘          └────────┬─────────┘           └──────────┘
//!         ▲                          │ finished
//!         │ fired order              ▼
//!   ┌─────┴──────┐            ┌────────────┐
//!   │  matcher   │            │  EventBus  │
//!   └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//! - `task`: tasks and the set that owns them
//! - `tracker`: schedules fires and signals completion exactly once
//! - `matcher`: maps query answers to 1-based firing positions
//! - `render` / `events`: output surfaces and the event bus
//! - `game`: facade tying the pieces together
//! - `config`: defaults, settings file and environment overrides

pub mod config;
pub mod events;
pub mod game;
pub mod matcher;
pub mod render;
pub mod task;
pub mod tracker;

pub use config::{ConfigError, GameConfig, GameSettings};
pub use events::{BroadcastBus, EventBus, GameEvent};
pub use game::{printers_for, Game};
pub use matcher::{match_answers, Winner};
pub use render::{Printer, PrinterSettings, Renderer};
pub use task::{Task, TaskError, TaskSet};
pub use tracker::{DelayStrategy, Run, RunState, RunSummary, StaggeredTracker};

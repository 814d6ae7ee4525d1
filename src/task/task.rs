//! Core Task type.
//!
//! # Invariants
//! - `index` is immutable after construction
//! - `answer() == UNIVERSE_CONSTANT * (index + 1)`

use std::fmt;
use std::sync::OnceLock;

use rand::Rng;

/// Multiplier applied to every task's origin position.
pub const UNIVERSE_CONSTANT: u64 = 42;

/// A single unit of derived work.
///
/// The answer is computed on first access and cached afterwards.
#[derive(Debug, Clone)]
pub struct Task {
    /// Position in the originating set
    index: usize,

    /// Random tag used only for logging
    instance_id: String,

    answer: OnceLock<u64>,
}

impl Task {
    /// Create a task for the given origin index.
    ///
    /// # Postcondition
    /// The answer is not yet computed.
    pub fn new(index: usize) -> Self {
        let instance_id = format!("_foo_{}", rand::thread_rng().gen_range(0..1_000_000));
        Self {
            index,
            instance_id,
            answer: OnceLock::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// The task's answer to the universe.
    ///
    /// # Property
    /// `answer() == 42 * (index + 1)`, saturating on overflow.
    pub fn answer(&self) -> u64 {
        *self.answer.get_or_init(|| calc_universe(self.index as u64 + 1))
    }

    /// Whether `answer()` has been evaluated yet.
    pub fn is_evaluated(&self) -> bool {
        self.answer.get().is_some()
    }

    /// Text shown on the output surface when the task fires.
    pub fn describe(&self) -> String {
        format!("my answer to the universe={}", self.answer())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task #{} ({})", self.index, self.instance_id)
    }
}

fn calc_universe(value: u64) -> u64 {
    value.saturating_mul(UNIVERSE_CONSTANT)
}

/// Errors that can occur during task set and run operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Run interrupted after {fired} of {total} tasks fired")]
    Interrupted { fired: usize, total: usize },
}

//! Staggered completion tracker.
//!
//! Every task in a set is scheduled to fire after its own delay. Fires are
//! reported back over a channel and applied one at a time by the `Run`, so
//! the firing order, rendering and countdown all happen on the caller's
//! task even though the delays elapse concurrently.
//!
//! # State Machine
//! ```text
//! Idle -> Running -> Complete
//!            \-> Cancelled (partial firing order, set not dirty)
//! ```
//! Only `TaskSet::clear()` / `TaskSet::populate()` lead back to Idle.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::render::Renderer;
use crate::task::{Task, TaskError, TaskSet};

/// Upper bound (exclusive) of the default uniform delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(3000);

/// How the delay before each fire is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelayStrategy {
    /// Uniform whole milliseconds in `[0, max)`. A zero `max` fires everything immediately.
    Uniform { max: Duration },

    /// Task `i` waits `delays[i % delays.len()]`; an empty list means no delay.
    Fixed(Vec<Duration>),
}

impl Default for DelayStrategy {
    fn default() -> Self {
        DelayStrategy::Uniform {
            max: DEFAULT_MAX_DELAY,
        }
    }
}

impl DelayStrategy {
    /// Draw one delay per task.
    ///
    /// # Postcondition
    /// `result.len() == count`
    pub fn delays(&self, count: usize) -> Vec<Duration> {
        match self {
            DelayStrategy::Uniform { max } => {
                let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
                if max_ms == 0 {
                    return vec![Duration::ZERO; count];
                }
                let mut rng = rand::thread_rng();
                (0..count)
                    .map(|_| Duration::from_millis(rng.gen_range(0..max_ms)))
                    .collect()
            }
            DelayStrategy::Fixed(delays) if delays.is_empty() => vec![Duration::ZERO; count],
            DelayStrategy::Fixed(delays) => {
                (0..count).map(|i| delays[i % delays.len()]).collect()
            }
        }
    }
}

/// Where a task set stands with respect to runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has fired yet
    Idle,
    /// Some tasks fired but the run never completed
    Partial { fired: usize, total: usize },
    /// Every task fired; the set must be reset before the next run
    Complete,
}

impl RunState {
    pub fn of(set: &TaskSet) -> Self {
        if set.is_dirty() {
            RunState::Complete
        } else if set.fired_count() > 0 {
            RunState::Partial {
                fired: set.fired_count(),
                total: set.len(),
            }
        } else {
            RunState::Idle
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    /// Origin indices in firing order
    pub fired_order: Vec<usize>,
    pub elapsed: Duration,
}

/// Fires every task of a set exactly once after a random delay.
#[derive(Debug, Clone, Default)]
pub struct StaggeredTracker {
    delays: DelayStrategy,
}

impl StaggeredTracker {
    /// Tracker with uniform delays in `[0, max_delay)`.
    pub fn new(max_delay: Duration) -> Self {
        Self::with_delays(DelayStrategy::Uniform { max: max_delay })
    }

    pub fn with_delays(delays: DelayStrategy) -> Self {
        Self { delays }
    }

    pub fn delays(&self) -> &DelayStrategy {
        &self.delays
    }

    /// Schedule every task of `set` and return the in-flight run.
    ///
    /// Must be called from within a tokio runtime. Nothing fires until the
    /// returned `Run` is driven.
    ///
    /// # Errors
    /// Returns `InvalidState` if the set has already completed a run, or has
    /// a partial firing order from a cancelled one, and was not reset.
    pub fn start<'a>(
        &self,
        set: &'a mut TaskSet,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Run<'a>, TaskError> {
        match RunState::of(set) {
            RunState::Idle => {}
            RunState::Complete => {
                return Err(TaskError::InvalidState(
                    "task set already completed a run; clear and populate it first".to_string(),
                ))
            }
            RunState::Partial { fired, total } => {
                return Err(TaskError::InvalidState(format!(
                    "task set holds a partial run ({} of {} fired); clear and populate it first",
                    fired, total
                )))
            }
        }

        let total = set.len();
        let (tx, rx) = mpsc::channel(total.max(1));
        let mut timers = JoinSet::new();

        for (index, delay) in self.delays.delays(total).into_iter().enumerate() {
            let tx = tx.clone();
            timers.spawn(async move {
                tokio::time::sleep(delay).await;
                // Receiver is gone only if the run was dropped.
                let _ = tx.send(index).await;
            });
        }
        drop(tx);

        info!("Started run over {} tasks", total);
        Ok(Run {
            set,
            renderer,
            rx,
            timers,
            remaining: total,
            total,
            started: Instant::now(),
        })
    }
}

/// One in-flight run over a borrowed task set.
///
/// Dropping an unfinished run aborts the timers that have not fired yet.
pub struct Run<'a> {
    set: &'a mut TaskSet,
    renderer: Arc<dyn Renderer>,
    rx: mpsc::Receiver<usize>,
    timers: JoinSet<()>,
    /// Countdown of tasks still to fire
    remaining: usize,
    total: usize,
    started: Instant,
}

impl<'a> Run<'a> {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn fired(&self) -> usize {
        self.total - self.remaining
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Tasks fired so far, in firing order.
    pub fn fired_order(&self) -> Vec<&Task> {
        self.set.fired_order()
    }

    /// Wait for the next task to fire and apply it.
    ///
    /// Returns the fired task's origin index, or `None` once every task has
    /// fired. The step that fires the last task marks the set dirty; for an
    /// empty set the first step does.
    ///
    /// # Errors
    /// Returns `Interrupted` if every timer ended before the countdown
    /// reached zero.
    pub async fn step(&mut self) -> Result<Option<usize>, TaskError> {
        if self.total == 0 && !self.set.is_dirty() {
            self.set.mark_dirty();
            info!("Run complete: empty task set");
        }

        while self.remaining > 0 {
            let Some(index) = self.rx.recv().await else {
                warn!(
                    "Run interrupted: {} of {} tasks fired",
                    self.fired(),
                    self.total
                );
                return Err(TaskError::Interrupted {
                    fired: self.fired(),
                    total: self.total,
                });
            };

            if !self.set.record_fire(index) {
                warn!("Ignoring repeated fire for task #{}", index);
                continue;
            }

            self.remaining -= 1;
            if let Some(task) = self.set.get(index) {
                debug!("Fired {} ({} left)", task, self.remaining);
                self.renderer.render(&task.describe(), "");
            }

            if self.remaining == 0 {
                self.set.mark_dirty();
                info!(
                    "Run complete: {} tasks fired in {:?}",
                    self.total,
                    self.started.elapsed()
                );
            }
            return Ok(Some(index));
        }
        Ok(None)
    }

    /// Drive the run until every task has fired.
    ///
    /// For an empty set this resolves immediately without rendering.
    pub async fn finish(mut self) -> Result<RunSummary, TaskError> {
        while self.step().await?.is_some() {}

        Ok(RunSummary {
            total: self.total,
            fired_order: self.set.fired_indices().to_vec(),
            elapsed: self.started.elapsed(),
        })
    }

    /// Abort the timers that have not fired yet.
    ///
    /// Returns how many tasks fired before cancellation. The set keeps its
    /// partial firing order and must be reset before another run.
    pub fn cancel(mut self) -> usize {
        self.timers.abort_all();
        let fired = self.fired();
        info!("Run cancelled after {} of {} tasks fired", fired, self.total);
        fired
    }
}

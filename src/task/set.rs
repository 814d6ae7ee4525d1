//! The pool of tasks for one play-through.
//!
//! # Invariants
//! - `fired_order` is a permutation-prefix of `tasks`: no index twice,
//!   `fired_order.len() <= tasks.len()`
//! - `fired_order` only grows during a run, and only through `record_fire`

use tracing::{debug, info};

use super::{Task, TaskError};

/// Largest task count `populate` accepts.
pub const MAX_TASKS: usize = 1 << 20;

/// Ordered, index-addressable collection of tasks plus their firing order.
#[derive(Debug, Default)]
pub struct TaskSet {
    tasks: Vec<Task>,

    /// Origin indices in the order their tasks fired
    fired_order: Vec<usize>,

    /// `fired[i]` is true once `tasks[i]` has fired
    fired: Vec<bool>,

    /// True once a run has completed
    dirty: bool,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tasks with `count` fresh entries indexed `0..count`.
    ///
    /// Any previous firing order and dirty flag are discarded along with the
    /// old tasks.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `count` is negative or above `MAX_TASKS`.
    pub fn populate(&mut self, count: i64) -> Result<(), TaskError> {
        let count = usize::try_from(count).map_err(|_| {
            TaskError::InvalidArgument(format!("task count must be non-negative, got {}", count))
        })?;
        if count > MAX_TASKS {
            return Err(TaskError::InvalidArgument(format!(
                "task count must be at most {}, got {}",
                MAX_TASKS, count
            )));
        }

        self.clear();
        self.tasks = (0..count).map(Task::new).collect();
        self.fired = vec![false; count];

        for task in &self.tasks {
            debug!("new instance of Foo={}", task.instance_id());
        }
        info!("Populated task set with {} tasks", count);
        Ok(())
    }

    /// Drop every task and the firing order, and reset the dirty flag.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.fired_order.clear();
        self.fired.clear();
        self.dirty = false;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of tasks that have fired so far.
    pub fn fired_count(&self) -> usize {
        self.fired_order.len()
    }

    /// Origin indices in firing order.
    pub fn fired_indices(&self) -> &[usize] {
        &self.fired_order
    }

    /// Tasks in the order they fired.
    pub fn fired_order(&self) -> Vec<&Task> {
        self.fired_order.iter().map(|&i| &self.tasks[i]).collect()
    }

    /// Append a task to the firing order.
    ///
    /// Returns `false` (and records nothing) if the index is out of range or
    /// has already fired.
    pub(crate) fn record_fire(&mut self, index: usize) -> bool {
        match self.fired.get_mut(index) {
            Some(seen) if !*seen => {
                *seen = true;
                self.fired_order.push(index);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populate_assigns_indices_and_answers() {
        let mut set = TaskSet::new();
        set.populate(3).unwrap();

        let indices: Vec<_> = set.tasks().iter().map(Task::index).collect();
        let answers: Vec<_> = set.tasks().iter().map(Task::answer).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(answers, vec![42, 84, 126]);
        assert!(set.fired_order().is_empty());
        assert!(!set.is_dirty());
    }

    #[test]
    fn test_populate_rejects_negative_count() {
        let mut set = TaskSet::new();
        let err = set.populate(-1).unwrap_err();
        assert!(matches!(err, TaskError::InvalidArgument(_)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_populate_rejects_oversized_count() {
        let mut set = TaskSet::new();
        set.populate(2).unwrap();

        let err = set.populate(i64::MAX).unwrap_err();
        assert!(matches!(err, TaskError::InvalidArgument(_)));
        let err = set.populate(MAX_TASKS as i64 + 1).unwrap_err();
        assert!(matches!(err, TaskError::InvalidArgument(_)));
        // A rejected count leaves the current tasks alone
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_populate_zero() {
        let mut set = TaskSet::new();
        set.populate(0).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_record_fire_keeps_permutation_prefix() {
        let mut set = TaskSet::new();
        set.populate(3).unwrap();

        assert!(set.record_fire(2));
        assert!(set.record_fire(0));
        // Duplicates and out-of-range indices are refused
        assert!(!set.record_fire(2));
        assert!(!set.record_fire(3));

        assert_eq!(set.fired_indices(), &[2, 0]);
        let answers: Vec<_> = set.fired_order().iter().map(|t| t.answer()).collect();
        assert_eq!(answers, vec![126, 42]);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut set = TaskSet::new();
        set.populate(2).unwrap();
        set.record_fire(1);
        set.mark_dirty();

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.fired_count(), 0);
        assert!(!set.is_dirty());
    }

    #[test]
    fn test_repopulate_discards_previous_run() {
        let mut set = TaskSet::new();
        set.populate(2).unwrap();
        set.record_fire(0);
        set.record_fire(1);
        set.mark_dirty();

        set.populate(4).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.fired_count(), 0);
        assert!(!set.is_dirty());
    }
}

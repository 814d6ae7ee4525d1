//! Task module - units of derived work and the set that owns them.
//!
//! - `Task`: one unit of work keyed by its origin index
//! - `TaskSet`: the ordered pool of tasks plus the order in which they fired

mod set;
pub mod task;

pub use set::{TaskSet, MAX_TASKS};
pub use task::{Task, TaskError, UNIVERSE_CONSTANT};

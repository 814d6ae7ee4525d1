//! Answer matching.
//!
//! # Pure Function
//! `match_answers` reads the firing order and never mutates it; the same
//! inputs always give the same outputs.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Where one query landed in the firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub query: u64,
    /// 1-based position of the first task whose answer equals `query`,
    /// `None` if no task matches
    pub position: Option<usize>,
}

/// For each query, in order, find the first task in `fired_order` with that
/// answer.
///
/// # Postconditions
/// - `result.len() == queries.len()`
/// - duplicate answers resolve to the earliest position
pub fn match_answers(fired_order: &[&Task], queries: &[u64]) -> Vec<Winner> {
    queries
        .iter()
        .map(|&query| Winner {
            query,
            position: fired_order
                .iter()
                .position(|task| task.answer() == query)
                .map(|i| i + 1),
        })
        .collect()
}

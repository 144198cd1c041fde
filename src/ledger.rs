//! Per-date completion ledger for tasks and subtasks.
//!
//! All operations are pure: a toggle returns a replacement value with one
//! date-key changed and never mutates the caller's structures. Task ledgers
//! are sparse maps over "true" facts; subtask ledgers are tri-state (a key may
//! be present-false), and subtasks created before per-date tracking fall back
//! to a single legacy `completed` flag when queried without a date.

use chrono::NaiveDate;

use crate::recur::occurs_on;
use crate::task::{Subtask, Task};

/// Subtask completion summary for one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionStats {
    pub total: usize,
    pub completed: usize,
}

/// Whether a task is marked complete for the given date-key.
pub fn is_task_completed(task: &Task, date_key: &str) -> bool {
    task.completed_dates.contains_key(date_key)
}

/// Toggle a task's completion for a date, returning the updated task.
///
/// Applying the toggle twice restores the original completion state for that
/// key; other keys are untouched.
pub fn toggle_task_completion(task: &Task, date_key: &str) -> Task {
    let mut updated = task.clone();
    if updated.completed_dates.remove(date_key).is_none() {
        updated.completed_dates.insert(date_key.to_string(), true);
    }
    updated
}

/// Whether a subtask is complete, either for a specific date or overall.
///
/// A date-keyed query reads only the per-date ledger: an absent key is false,
/// never a fallback to the legacy flag. The legacy `completed` flag answers
/// only date-less queries.
pub fn is_subtask_completed(subtask: &Subtask, date_key: Option<&str>) -> bool {
    match date_key {
        Some(key) => subtask.completed_dates.get(key).copied().unwrap_or(false),
        None => subtask.completed,
    }
}

/// Toggle a subtask's completion for a date, returning the updated subtask.
pub fn toggle_subtask_completion(subtask: &Subtask, date_key: &str) -> Subtask {
    let mut updated = subtask.clone();
    if is_subtask_completed(subtask, Some(date_key)) {
        updated.completed_dates.remove(date_key);
    } else {
        updated.completed_dates.insert(date_key.to_string(), true);
    }
    updated
}

/// Count a task's subtasks and how many are complete for the given date.
pub fn completion_stats(task: &Task, date_key: &str) -> CompletionStats {
    CompletionStats {
        total: task.subtasks.len(),
        completed: task
            .subtasks
            .iter()
            .filter(|s| is_subtask_completed(s, Some(date_key)))
            .count(),
    }
}

/// Whether every task occurring on `date` is complete for it.
///
/// An empty occurrence set is never "all completed"; calendar summaries only
/// light up days that had something scheduled and finished.
pub fn day_all_completed(tasks: &[Task], date: NaiveDate) -> bool {
    let key = crate::dates::date_key(date);
    let mut any = false;
    for task in tasks.iter().filter(|t| occurs_on(t, date)) {
        any = true;
        if !is_task_completed(task, &key) {
            return false;
        }
    }
    any
}

//! Quantum progress tracking: numeric accumulation against a per-task target.
//!
//! Timer tasks measure seconds against a duration target, count tasks measure
//! repetitions against an integer threshold. Repeating tasks keep one progress
//! bucket per date-key; one-off tasks keep a single global bucket. Reads
//! default to zero and derived values degrade to zero/`None` when a target is
//! missing or zero, so no data shape ever produces a division error.

use crate::fields::QuantumMode;
use crate::recur::recurs;
use crate::task::{Quantum, QuantumProgress, Task};

/// Progress accumulated for a task, date-scoped when the task recurs.
///
/// Non-quantum tasks read as zero progress.
pub fn read_progress(task: &Task, date_key: Option<&str>) -> QuantumProgress {
    let quantum = match &task.quantum {
        Some(q) if task.is_quantum() => q,
        _ => return QuantumProgress::default(),
    };
    if recurs(task) {
        if let Some(key) = date_key {
            return quantum.progress_by_date.get(key).copied().unwrap_or_default();
        }
    }
    QuantumProgress {
        done_seconds: quantum.done_seconds,
        done_count: quantum.done_count,
    }
}

/// Normalized progress in `[0, 1]`; zero when the target is unset or zero.
pub fn progress_percent(task: &Task, date_key: Option<&str>) -> f64 {
    let quantum = match &task.quantum {
        Some(q) if task.is_quantum() => q,
        _ => return 0.0,
    };
    let progress = read_progress(task, date_key);
    let (done, target) = match quantum.mode {
        QuantumMode::Timer => (progress.done_seconds, quantum.total_seconds.unwrap_or(0)),
        QuantumMode::Count => (progress.done_count, quantum.count_target.unwrap_or(0)),
    };
    if target == 0 {
        return 0.0;
    }
    (done as f64 / target as f64).clamp(0.0, 1.0)
}

/// Display label for a task's progress, `None` when the task is not quantum
/// or has no usable target.
///
/// Timer tasks render `H:MM/H:MM` (hours unpadded, minutes two-digit,
/// seconds rounded to the nearest minute); count tasks render
/// `done/target unit`, dropping the unit when blank.
pub fn progress_label(task: &Task, date_key: Option<&str>) -> Option<String> {
    let quantum = match &task.quantum {
        Some(q) if task.is_quantum() => q,
        _ => return None,
    };
    let progress = read_progress(task, date_key);
    match quantum.mode {
        QuantumMode::Timer => {
            let total = quantum.total_seconds.filter(|&t| t > 0)?;
            Some(format!(
                "{}/{}",
                format_clock(progress.done_seconds),
                format_clock(total)
            ))
        }
        QuantumMode::Count => {
            let target = quantum.count_target.filter(|&t| t > 0)?;
            let base = format!("{}/{}", progress.done_count, target);
            match quantum.unit.as_deref().map(str::trim) {
                Some(unit) if !unit.is_empty() => Some(format!("{base} {unit}")),
                _ => Some(base),
            }
        }
    }
}

/// Add `delta_seconds`/`delta_count` to the right bucket, returning the
/// updated task. Progress is clamped to `[0, target]`; negative deltas wind
/// progress back, and an unset target leaves accrual uncapped. Non-quantum
/// tasks come back unchanged.
pub fn advance_progress(
    task: &Task,
    date_key: &str,
    delta_seconds: i64,
    delta_count: i64,
) -> Task {
    let mut updated = task.clone();
    if !task.is_quantum() {
        return updated;
    }
    let per_date = recurs(task);
    let Some(quantum) = updated.quantum.as_mut() else {
        return updated;
    };

    let (seconds_cap, count_cap) = targets(quantum);
    if per_date {
        let entry = quantum
            .progress_by_date
            .entry(date_key.to_string())
            .or_default();
        entry.done_seconds = clamp_add(entry.done_seconds, delta_seconds, seconds_cap);
        entry.done_count = clamp_add(entry.done_count, delta_count, count_cap);
    } else {
        quantum.done_seconds = clamp_add(quantum.done_seconds, delta_seconds, seconds_cap);
        quantum.done_count = clamp_add(quantum.done_count, delta_count, count_cap);
    }
    updated
}

fn targets(quantum: &Quantum) -> (u32, u32) {
    match quantum.mode {
        QuantumMode::Timer => (quantum.total_seconds.unwrap_or(u32::MAX), u32::MAX),
        QuantumMode::Count => (u32::MAX, quantum.count_target.unwrap_or(u32::MAX)),
    }
}

fn clamp_add(current: u32, delta: i64, cap: u32) -> u32 {
    let next = (current as i64 + delta).max(0);
    (next.min(cap as i64)) as u32
}

/// Seconds as `H:MM`, rounding to the nearest whole minute.
fn format_clock(seconds: u32) -> String {
    let minutes = (seconds + 30) / 60;
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

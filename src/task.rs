//! Task and subtask data structures.
//!
//! This module defines the core `Task` struct that represents a single habit or
//! to-do item, together with its repeat rule, optional quantum (numeric
//! progress) target, scheduled time-of-day, and checklist subtasks. All
//! per-date state is keyed by the canonical `YYYY-MM-DD` date-key string.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A habit or to-do item anchored to a start date.
///
/// `completed_dates` is a sparse map over "true" facts: a present key means
/// the task was completed on that day, an absent key means it was not. All
/// mutation goes through the ledger operations, which return replacement
/// values rather than aliasing the stored task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
    pub anchor_date: NaiveDate,
    #[serde(default)]
    pub time: Option<TaskTime>,
    #[serde(default)]
    pub repeat: Option<RepeatRule>,
    #[serde(default)]
    pub completed_dates: BTreeMap<String, bool>,
    #[serde(default)]
    pub kind: TaskKind,
    #[serde(default)]
    pub quantum: Option<Quantum>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub tag_label: Option<String>,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

/// A checklist item scoped to its parent task.
///
/// Completion is tri-state per date: present-true, present-false, or absent.
/// Subtasks created before per-date tracking carry only the legacy `completed`
/// flag, which is consulted only when no date is supplied to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_dates: BTreeMap<String, bool>,
}

/// Recurrence rule carrying both supported schemas.
///
/// The legacy discrete schema uses `option` (+ `weekdays` for `custom`,
/// `interval` for `interval`). The parametric schema uses `enabled`,
/// `frequency`, `interval`, `weekdays`, `month_days` and `end_date`. When a
/// stored rule carries fields of both, the parametric schema silently wins;
/// the detection predicate is [`RepeatRule::is_parametric`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepeatRule {
    #[serde(default)]
    pub option: Option<RepeatOption>,
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
    #[serde(default)]
    pub interval: Option<i64>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub month_days: Vec<u32>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl RepeatRule {
    /// True when the rule should be interpreted under the parametric schema.
    ///
    /// Presence of the `enabled` boolean or of a `frequency` selects the
    /// parametric arm even when legacy fields are also populated.
    pub fn is_parametric(&self) -> bool {
        self.enabled.is_some() || self.frequency.is_some()
    }

    /// True when the rule produces no recurrence at all (single occurrence on
    /// the anchor date only).
    pub fn is_inert(&self) -> bool {
        if self.is_parametric() {
            self.enabled == Some(false)
        } else {
            matches!(self.option, None | Some(RepeatOption::Off))
        }
    }
}

/// Numeric progress target for a quantum task.
///
/// Non-repeating tasks accumulate into the global `done_seconds`/`done_count`
/// fields; repeating tasks accumulate per date into `progress_by_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantum {
    pub mode: QuantumMode,
    #[serde(default)]
    pub total_seconds: Option<u32>,
    #[serde(default)]
    pub count_target: Option<u32>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub done_seconds: u32,
    #[serde(default)]
    pub done_count: u32,
    #[serde(default)]
    pub progress_by_date: BTreeMap<String, QuantumProgress>,
}

/// Accumulated progress for one calendar day (or globally, for one-off tasks).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumProgress {
    #[serde(default)]
    pub done_seconds: u32,
    #[serde(default)]
    pub done_count: u32,
}

/// A 12-hour wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Meridiem,
}

impl ClockTime {
    /// Minutes past midnight, normalising the 12-hour representation
    /// (12am -> 0, 12pm -> 12:00, 7:30pm -> 19:30).
    pub fn minute_of_day(&self) -> u32 {
        let hour = match self.meridiem {
            Meridiem::Am => self.hour % 12,
            Meridiem::Pm => self.hour % 12 + 12,
        };
        hour * 60 + self.minute
    }
}

/// Scheduled time for a task: a point in time or a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskTime {
    At(ClockTime),
    Between { start: ClockTime, end: ClockTime },
}

impl TaskTime {
    /// Sort key in minutes past midnight; periods sort by their start.
    pub fn start_minute(&self) -> u32 {
        match self {
            TaskTime::At(t) => t.minute_of_day(),
            TaskTime::Between { start, .. } => start.minute_of_day(),
        }
    }
}

impl Task {
    /// True when the task is of quantum type and carries quantum data.
    pub fn is_quantum(&self) -> bool {
        self.kind == TaskKind::Quantum && self.quantum.is_some()
    }
}

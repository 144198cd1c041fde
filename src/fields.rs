//! Enumerations and field types for habit tracking.
//!
//! This module defines the structured vocabulary shared by tasks, repeat rules,
//! and the calendar utilities: weekday tokens, repeat schemas, quantum modes,
//! and 12-hour clock meridiems.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Weekday token vocabulary used by both repeat schemas and calendar utilities.
///
/// Serialized as the three-letter lowercase tokens (`sun`..`sat`) that the
/// stored JSON uses everywhere a weekday appears.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    /// Convert a chrono weekday to the token vocabulary.
    pub fn from_chrono(wd: chrono::Weekday) -> Self {
        match wd {
            chrono::Weekday::Sun => Weekday::Sun,
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
        }
    }
}

/// Legacy discrete repeat options.
///
/// Stored data may carry values this build does not know about; those
/// deserialize to `Unknown` and never recur.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RepeatOption {
    Off,
    Daily,
    Weekly,
    Monthly,
    Weekend,
    Weekdays,
    Custom,
    Interval,
    #[serde(other)]
    #[value(skip)]
    Unknown,
}

/// Parametric repeat frequency (period kind, multiplied by `interval`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    #[serde(other)]
    #[value(skip)]
    Unknown,
}

/// How a quantum task measures progress against its target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuantumMode {
    /// Target is a duration; progress accrues as seconds.
    Timer,
    /// Target is an integer threshold; progress accrues as a count.
    Count,
}

/// Whether a task is a plain checkbox or tracks quantum progress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    #[default]
    Checkbox,
    Quantum,
}

/// 12-hour clock half-day marker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Meridiem {
    Am,
    Pm,
}

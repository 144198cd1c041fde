//! File-backed store and input-parsing helpers.
//!
//! The whole tracker state lives in one JSON document: the task collection, a
//! small settings record (active tab, selected tag filter) and a bounded
//! most-recent-first history log. The engine itself never touches the disk;
//! this module loads the collection, hands it to the engine, and writes back
//! the replacement entities the engine returns.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::fields::Meridiem;
use crate::task::{ClockTime, Task};

/// Maximum history entries kept; older entries fall off the end.
pub const HISTORY_CAP: usize = 200;

/// In-memory store for tasks, settings, and the action history.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Persisted UI selections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub active_tab: String,
    pub tag_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            active_tab: "today".into(),
            tag_filter: crate::view::TAG_FILTER_ALL.into(),
        }
    }
}

/// One audit-log line: what happened, to which task, on which day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at_utc: i64,
    pub action: String,
    #[serde(default)]
    pub task_id: Option<u64>,
    #[serde(default)]
    pub date_key: Option<String>,
}

impl Store {
    /// Load the store from a JSON file, starting fresh if the file is missing
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Store::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error parsing store, starting fresh: {e}");
                    Store::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading store, starting fresh: {e}");
                Store::default()
            }
        }
    }

    /// Save the store to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).unwrap();
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the next available task ID.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Replace a task in place by ID with an engine-produced update.
    /// Returns false when no task carries that ID.
    pub fn replace(&mut self, updated: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Remove a task by ID. Returns the removed task when it existed.
    pub fn remove(&mut self, id: u64) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(idx))
    }

    /// Prepend a history entry, truncating the log to [`HISTORY_CAP`].
    pub fn record(&mut self, action: &str, task_id: Option<u64>, date_key: Option<&str>) {
        self.history.insert(
            0,
            HistoryEntry {
                at_utc: chrono::Utc::now().timestamp(),
                action: action.to_string(),
                task_id,
                date_key: date_key.map(String::from),
            },
        );
        self.history.truncate(HISTORY_CAP);
    }

    /// Distinct derived tags across all tasks, with task counts per tag key.
    pub fn tag_counts(&self) -> BTreeMap<String, (String, usize)> {
        let mut counts: BTreeMap<String, (String, usize)> = BTreeMap::new();
        for task in &self.tasks {
            if let Some(tag) = crate::view::derive_tag(task) {
                let entry = counts.entry(tag.key).or_insert((tag.label, 0));
                entry.1 += 1;
            }
        }
        counts
    }
}

/// Parse a date argument: "today", "tomorrow", "yesterday", or `YYYY-MM-DD`.
pub fn parse_date_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();
    match s.as_str() {
        "today" => Some(today),
        "tomorrow" => Some(today + Duration::days(1)),
        "yesterday" => Some(today - Duration::days(1)),
        _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok(),
    }
}

/// Parse a clock argument like "7am", "7:30pm", or "12:05am".
pub fn parse_clock_input(s: &str) -> Option<ClockTime> {
    let s = s.trim().to_lowercase();
    let (rest, meridiem) = if let Some(rest) = s.strip_suffix("am") {
        (rest, Meridiem::Am)
    } else if let Some(rest) = s.strip_suffix("pm") {
        (rest, Meridiem::Pm)
    } else {
        return None;
    };
    let rest = rest.trim();
    let (hour, minute) = match rest.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (rest.parse::<u32>().ok()?, 0),
    };
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    Some(ClockTime { hour, minute, meridiem })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TaskKind;

    fn task(id: u64, title: &str) -> Task {
        Task {
            id,
            title: title.into(),
            color: None,
            anchor_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            time: None,
            repeat: None,
            completed_dates: Default::default(),
            kind: TaskKind::Checkbox,
            quantum: None,
            subtasks: Vec::new(),
            tag: None,
            tag_label: None,
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn test_next_id_and_replace() {
        let mut store = Store::default();
        assert_eq!(store.next_id(), 1);
        store.tasks.push(task(1, "a"));
        store.tasks.push(task(7, "b"));
        assert_eq!(store.next_id(), 8);

        let mut updated = task(7, "b renamed");
        updated.completed_dates.insert("2024-06-01".into(), true);
        assert!(store.replace(updated));
        assert_eq!(store.get(7).unwrap().title, "b renamed");
        assert!(!store.replace(task(99, "ghost")));
    }

    #[test]
    fn test_remove() {
        let mut store = Store::default();
        store.tasks.push(task(1, "a"));
        assert_eq!(store.remove(1).unwrap().title, "a");
        assert!(store.remove(1).is_none());
    }

    #[test]
    fn test_history_is_capped_and_most_recent_first() {
        let mut store = Store::default();
        for i in 0..(HISTORY_CAP + 10) {
            store.record(&format!("action {i}"), Some(i as u64), None);
        }
        assert_eq!(store.history.len(), HISTORY_CAP);
        assert_eq!(store.history[0].action, format!("action {}", HISTORY_CAP + 9));
    }

    #[test]
    fn test_store_round_trips_through_json() {
        let mut store = Store::default();
        let mut t = task(1, "run");
        t.completed_dates.insert("2024-06-01".into(), true);
        store.tasks.push(t);
        store.record("toggle", Some(1), Some("2024-06-01"));

        let json = serde_json::to_string(&store).unwrap();
        let loaded: Store = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.tasks, store.tasks);
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.settings.tag_filter, "all");
    }

    #[test]
    fn test_parse_date_input() {
        assert_eq!(
            parse_date_input("2024-06-01"),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert!(parse_date_input("today").is_some());
        assert!(parse_date_input("nonsense").is_none());
    }

    #[test]
    fn test_parse_clock_input() {
        assert_eq!(
            parse_clock_input("7:30pm"),
            Some(ClockTime { hour: 7, minute: 30, meridiem: Meridiem::Pm })
        );
        assert_eq!(
            parse_clock_input("12am"),
            Some(ClockTime { hour: 12, minute: 0, meridiem: Meridiem::Am })
        );
        assert_eq!(parse_clock_input("19:30"), None);
        assert_eq!(parse_clock_input("13pm"), None);
        assert_eq!(parse_clock_input("7:75am"), None);
    }
}

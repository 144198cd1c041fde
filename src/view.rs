//! View composition: the ordered, annotated task list for one calendar day.
//!
//! Pulls the occurrence test, completion ledger and quantum tracker together
//! into display-ready rows. Source tasks are never mutated; each row carries
//! an augmented copy.

use chrono::NaiveDate;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::dates::date_key;
use crate::ledger::{completion_stats, is_task_completed, CompletionStats};
use crate::quantum::{progress_label, progress_percent, read_progress};
use crate::recur::occurs_on;
use crate::task::{QuantumProgress, Task};

/// Sentinel tag filter meaning "no tag filtering".
pub const TAG_FILTER_ALL: &str = "all";

/// Tag keys that mean "no tag" in stored data and are rejected outright.
const NO_TAG_KEYS: [&str; 2] = ["none", "no_tag"];

/// Derived tag classification: a lowercase grouping key plus a display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub key: String,
    pub label: String,
}

/// One display-ready row of the composed view.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub task: Task,
    pub completed: bool,
    pub stats: CompletionStats,
    pub progress: QuantumProgress,
    pub progress_percent: f64,
    pub progress_label: Option<String>,
    pub tag: Option<TagInfo>,
}

/// Compose the visible task list for a date.
///
/// Filters to tasks occurring on `target_date`, annotates each with per-date
/// completion and progress, derives tag metadata, applies the tag filter
/// (`"all"` keeps everything), and sorts ascending by scheduled time with
/// untimed tasks last. The sort is stable: ties keep their original relative
/// order.
pub fn visible_tasks(all_tasks: &[Task], target_date: NaiveDate, tag_filter: &str) -> Vec<TaskView> {
    let key = date_key(target_date);
    let mut rows: Vec<TaskView> = all_tasks
        .iter()
        .filter(|t| occurs_on(t, target_date))
        .map(|t| TaskView {
            task: t.clone(),
            completed: is_task_completed(t, &key),
            stats: completion_stats(t, &key),
            progress: read_progress(t, Some(&key)),
            progress_percent: progress_percent(t, Some(&key)),
            progress_label: progress_label(t, Some(&key)),
            tag: derive_tag(t),
        })
        .collect();

    if tag_filter != TAG_FILTER_ALL {
        rows.retain(|row| row.tag.as_ref().is_some_and(|t| t.key == tag_filter));
    }

    rows.sort_by_key(|row| sort_minute(&row.task));
    rows
}

/// Sort key: minutes past midnight, with untimed tasks pushed to the end.
fn sort_minute(task: &Task) -> u32 {
    task.time.as_ref().map(|t| t.start_minute()).unwrap_or(u32::MAX)
}

/// Resolve a task's tag key and label.
///
/// Precedence is explicit: a usable raw `tag` wins and is used verbatim as
/// the grouping key, displayed under the task's own label when it carries a
/// usable one and under a reconstruction of the token otherwise; a task
/// without a raw tag falls back to a usable `tag_label`, transliterated into
/// the key with the trimmed original as label; a task with neither
/// contributes no tag.
pub fn derive_tag(task: &Task) -> Option<TagInfo> {
    let label = usable_label(task);
    if let Some(raw) = task.tag.as_deref() {
        let raw = raw.trim();
        if !raw.is_empty() && !NO_TAG_KEYS.contains(&raw) {
            return Some(TagInfo {
                key: raw.to_string(),
                label: label
                    .map(String::from)
                    .unwrap_or_else(|| title_case_token(raw)),
            });
        }
    }
    if let Some(label) = label {
        let key = slugify(label);
        if !key.is_empty() {
            return Some(TagInfo {
                key,
                label: label.to_string(),
            });
        }
    }
    None
}

/// The trimmed `tag_label`, unless it is blank or the "no tag" marker.
fn usable_label(task: &Task) -> Option<&str> {
    let label = task.tag_label.as_deref()?.trim();
    if label.is_empty() || label.eq_ignore_ascii_case("no tag") {
        None
    } else {
        Some(label)
    }
}

/// Transliterate a label into a tag token: strip diacritics, lowercase,
/// collapse runs of non-alphanumerics into single underscores, and trim
/// leading/trailing underscores.
pub fn slugify(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Rebuild a display label from a tag token: underscores become spaces and
/// each word is capitalised.
fn title_case_token(token: &str) -> String {
    token
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

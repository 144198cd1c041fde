//! Command implementations for the CLI interface.
//!
//! Each handler is a thin shell over one engine operation: it resolves the
//! user's date/id arguments, calls the pure function, writes the replacement
//! entity back into the store, and prints the result. The engine never sees
//! the store or the terminal.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::path::Path;

use chrono::{Local, NaiveDate, Utc};

use crate::dates::date_key;
use crate::fields::*;
use crate::ledger::{
    day_all_completed, is_task_completed, toggle_subtask_completion, toggle_task_completion,
};
use crate::quantum::{advance_progress, progress_label};
use crate::recur::occurs_on;
use crate::store::{parse_clock_input, parse_date_input, Store};
use crate::task::{Quantum, RepeatRule, Subtask, Task, TaskTime};
use crate::view::{visible_tasks, TAG_FILTER_ALL};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task anchored to a date.
    Add {
        /// Short title for the task.
        title: String,
        /// Anchor date: YYYY-MM-DD, "today", "tomorrow" (default today).
        #[arg(long)]
        date: Option<String>,
        /// Legacy repeat option: daily | weekly | monthly | weekend | weekdays | custom | interval.
        #[arg(long, value_enum)]
        repeat: Option<RepeatOption>,
        /// Parametric repeat frequency: daily | weekly | monthly. Takes
        /// precedence over --repeat.
        #[arg(long, value_enum)]
        freq: Option<Frequency>,
        /// Repeat interval: day count for --repeat interval, period
        /// multiplier for --freq.
        #[arg(long)]
        every: Option<i64>,
        /// Weekday for custom/weekly repeats. May be repeated.
        #[arg(long = "on", value_enum)]
        weekdays: Vec<Weekday>,
        /// Day-of-month for monthly parametric repeats. May be repeated.
        #[arg(long = "month-day")]
        month_days: Vec<u32>,
        /// Last date the repeat applies (inclusive).
        #[arg(long)]
        until: Option<String>,
        /// Make this a timer task with a target in minutes.
        #[arg(long)]
        timer: Option<u32>,
        /// Make this a count task with a target threshold.
        #[arg(long)]
        target: Option<u32>,
        /// Unit label for a count task (e.g. "pages", "glasses").
        #[arg(long)]
        unit: Option<String>,
        /// Scheduled time, e.g. "7:30am" or "9pm".
        #[arg(long)]
        at: Option<String>,
        /// Tag key for grouping.
        #[arg(long)]
        tag: Option<String>,
        /// Human tag label (used when no --tag is given).
        #[arg(long)]
        tag_label: Option<String>,
        /// Display colour.
        #[arg(long)]
        color: Option<String>,
        /// Subtask title. May be repeated.
        #[arg(long = "sub")]
        subtasks: Vec<String>,
    },

    /// List the tasks visible on a date, in display order.
    List {
        /// Date to list (default today).
        date: Option<String>,
        /// Tag filter ("all" disables filtering; default is the saved filter).
        #[arg(long)]
        tag: Option<String>,
    },

    /// Toggle a task's completion for a date.
    Toggle {
        /// Task ID.
        id: u64,
        /// Date to toggle (default today).
        #[arg(long)]
        date: Option<String>,
    },

    /// Toggle a subtask's completion for a date.
    Sub {
        /// Parent task ID.
        id: u64,
        /// Subtask ID.
        sub_id: u64,
        /// Date to toggle (default today).
        #[arg(long)]
        date: Option<String>,
    },

    /// Advance a quantum task's progress for a date.
    Progress {
        /// Task ID.
        id: u64,
        /// Minutes to add to a timer task (negative winds back).
        #[arg(long, allow_negative_numbers = true)]
        minutes: Option<i64>,
        /// Seconds to add to a timer task.
        #[arg(long, allow_negative_numbers = true)]
        seconds: Option<i64>,
        /// Count to add to a count task.
        #[arg(long, allow_negative_numbers = true)]
        count: Option<i64>,
        /// Date to credit (default today).
        #[arg(long)]
        date: Option<String>,
    },

    /// View a single task with its schedule and progress.
    View {
        /// Task ID.
        id: u64,
        /// Date to report completion/progress for (default today).
        #[arg(long)]
        date: Option<String>,
    },

    /// Update fields on a task.
    Update {
        /// Task ID.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// New scheduled time, e.g. "7:30am".
        #[arg(long)]
        at: Option<String>,
        /// Clear the scheduled time.
        #[arg(long)]
        clear_time: bool,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        tag_label: Option<String>,
        /// Clear both tag fields.
        #[arg(long)]
        clear_tag: bool,
        /// Append a subtask. May be repeated.
        #[arg(long = "add-sub")]
        add_subs: Vec<String>,
        /// Remove a subtask by ID. May be repeated.
        #[arg(long = "rm-sub")]
        rm_subs: Vec<u64>,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: u64,
    },

    /// List distinct tags and task counts.
    Tags,

    /// Show the completion summary for a date.
    Day {
        /// Date to summarise (default today).
        date: Option<String>,
    },

    /// Save the default tag filter used by `list`.
    Filter {
        /// Tag key, or "all" to disable filtering.
        tag: String,
    },

    /// Show recent actions, most recent first.
    History {
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Resolve a date argument, defaulting to today; exits on malformed input.
fn resolve_date(input: Option<&str>) -> NaiveDate {
    match input {
        None => Local::now().date_naive(),
        Some(s) => match parse_date_input(s) {
            Some(d) => d,
            None => {
                eprintln!("Unrecognised date '{s}'. Use YYYY-MM-DD, today, tomorrow or yesterday.");
                std::process::exit(1);
            }
        },
    }
}

fn require_task(store: &Store, id: u64) -> Task {
    match store.get(id) {
        Some(t) => t.clone(),
        None => {
            eprintln!("Task with ID {id} not found");
            std::process::exit(1);
        }
    }
}

fn save_or_die(store: &Store, path: &Path) {
    if let Err(e) = store.save(path) {
        eprintln!("Failed to save store: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the store.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    store: &mut Store,
    path: &Path,
    title: String,
    date: Option<String>,
    repeat: Option<RepeatOption>,
    freq: Option<Frequency>,
    every: Option<i64>,
    weekdays: Vec<Weekday>,
    month_days: Vec<u32>,
    until: Option<String>,
    timer: Option<u32>,
    target: Option<u32>,
    unit: Option<String>,
    at: Option<String>,
    tag: Option<String>,
    tag_label: Option<String>,
    color: Option<String>,
    subtasks: Vec<String>,
) {
    let anchor = resolve_date(date.as_deref());
    let end_date = until.as_deref().map(|s| match parse_date_input(s) {
        Some(d) => d,
        None => {
            eprintln!("Unrecognised --until date '{s}'.");
            std::process::exit(1);
        }
    });

    let rule = if let Some(frequency) = freq {
        Some(RepeatRule {
            enabled: Some(true),
            frequency: Some(frequency),
            interval: every,
            weekdays,
            month_days,
            end_date,
            ..Default::default()
        })
    } else {
        repeat.map(|option| RepeatRule {
            option: Some(option),
            weekdays,
            interval: every,
            ..Default::default()
        })
    };

    let quantum = if let Some(minutes) = timer {
        Some(Quantum {
            mode: QuantumMode::Timer,
            total_seconds: Some(minutes * 60),
            count_target: None,
            unit: None,
            done_seconds: 0,
            done_count: 0,
            progress_by_date: Default::default(),
        })
    } else {
        target.map(|value| Quantum {
            mode: QuantumMode::Count,
            total_seconds: None,
            count_target: Some(value),
            unit,
            done_seconds: 0,
            done_count: 0,
            progress_by_date: Default::default(),
        })
    };

    let time = at.as_deref().map(|s| match parse_clock_input(s) {
        Some(t) => TaskTime::At(t),
        None => {
            eprintln!("Unrecognised time '{s}'. Use e.g. 7:30am or 9pm.");
            std::process::exit(1);
        }
    });

    let now_utc = Utc::now().timestamp();
    let id = store.next_id();
    let kind = if quantum.is_some() { TaskKind::Quantum } else { TaskKind::Checkbox };
    let subtasks = subtasks
        .into_iter()
        .enumerate()
        .map(|(i, title)| Subtask {
            id: i as u64 + 1,
            title,
            completed: false,
            completed_dates: Default::default(),
        })
        .collect();

    let task = Task {
        id,
        title,
        color,
        anchor_date: anchor,
        time,
        repeat: rule,
        completed_dates: Default::default(),
        kind,
        quantum,
        subtasks,
        tag,
        tag_label,
        created_at_utc: now_utc,
        updated_at_utc: now_utc,
    };

    store.tasks.push(task);
    store.record("add", Some(id), Some(&date_key(anchor)));
    save_or_die(store, path);
    println!("Added task {id} anchored to {}", date_key(anchor));
}

/// List the composed view for a date.
pub fn cmd_list(store: &Store, date: Option<String>, tag: Option<String>) {
    let date = resolve_date(date.as_deref());
    let tag_filter = tag.unwrap_or_else(|| store.settings.tag_filter.clone());
    let rows = visible_tasks(&store.tasks, date, &tag_filter);

    if rows.is_empty() {
        println!("Nothing scheduled for {}.", date_key(date));
        return;
    }
    println!(
        "{:<5} {:<4} {:<8} {:<30} {:<14} {:<8} {}",
        "ID", "Done", "Time", "Title", "Progress", "Subs", "Tag"
    );
    for row in &rows {
        let done = if row.completed { "[x]" } else { "[ ]" };
        let time = row
            .task
            .time
            .as_ref()
            .map(format_time)
            .unwrap_or_else(|| "-".into());
        let progress = row.progress_label.clone().unwrap_or_else(|| "-".into());
        let subs = if row.stats.total == 0 {
            "-".into()
        } else {
            format!("{}/{}", row.stats.completed, row.stats.total)
        };
        let tag = row
            .tag
            .as_ref()
            .map(|t| t.label.clone())
            .unwrap_or_default();
        println!(
            "{:<5} {:<4} {:<8} {:<30} {:<14} {:<8} {}",
            row.task.id,
            done,
            time,
            truncate(&row.task.title, 30),
            progress,
            subs,
            tag
        );
    }
}

/// Toggle a task's completion for a date.
pub fn cmd_toggle(store: &mut Store, path: &Path, id: u64, date: Option<String>) {
    let date = resolve_date(date.as_deref());
    let task = require_task(store, id);
    if !occurs_on(&task, date) {
        eprintln!("Task {id} does not occur on {}", date_key(date));
        std::process::exit(1);
    }
    let key = date_key(date);
    let mut updated = toggle_task_completion(&task, &key);
    updated.updated_at_utc = Utc::now().timestamp();
    let completed = is_task_completed(&updated, &key);
    store.replace(updated);
    store.record(if completed { "complete" } else { "uncomplete" }, Some(id), Some(&key));
    save_or_die(store, path);
    println!(
        "Task {id} {} for {key}",
        if completed { "completed" } else { "reopened" }
    );
}

/// Toggle one subtask of a task for a date, returning the updated task.
/// Checking off a subtask on a day the parent never occurs is rejected, the
/// same as toggling the task itself.
fn toggle_subtask_for_date(task: &Task, sub_id: u64, date: NaiveDate) -> Result<Task, String> {
    if !occurs_on(task, date) {
        return Err(format!(
            "Task {} does not occur on {}",
            task.id,
            date_key(date)
        ));
    }
    let Some(idx) = task.subtasks.iter().position(|s| s.id == sub_id) else {
        return Err(format!("Task {} has no subtask {sub_id}", task.id));
    };
    let key = date_key(date);
    let mut updated = task.clone();
    updated.subtasks[idx] = toggle_subtask_completion(&task.subtasks[idx], &key);
    Ok(updated)
}

/// Toggle a subtask's completion for a date.
pub fn cmd_sub(store: &mut Store, path: &Path, id: u64, sub_id: u64, date: Option<String>) {
    let date = resolve_date(date.as_deref());
    let key = date_key(date);
    let task = require_task(store, id);
    let mut updated = match toggle_subtask_for_date(&task, sub_id, date) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    updated.updated_at_utc = Utc::now().timestamp();
    store.replace(updated);
    store.record("toggle-subtask", Some(id), Some(&key));
    save_or_die(store, path);
    println!("Toggled subtask {sub_id} of task {id} for {key}");
}

/// Advance a quantum task's progress for a date.
pub fn cmd_progress(
    store: &mut Store,
    path: &Path,
    id: u64,
    minutes: Option<i64>,
    seconds: Option<i64>,
    count: Option<i64>,
    date: Option<String>,
) {
    let date = resolve_date(date.as_deref());
    let key = date_key(date);
    let task = require_task(store, id);
    if !task.is_quantum() {
        eprintln!("Task {id} is not a quantum task");
        std::process::exit(1);
    }
    let delta_seconds = minutes.unwrap_or(0) * 60 + seconds.unwrap_or(0);
    let delta_count = count.unwrap_or(0);
    if delta_seconds == 0 && delta_count == 0 {
        eprintln!("Nothing to add: pass --minutes, --seconds or --count.");
        std::process::exit(1);
    }
    let mut updated = advance_progress(&task, &key, delta_seconds, delta_count);
    updated.updated_at_utc = Utc::now().timestamp();
    let label = progress_label(&updated, Some(&key));
    store.replace(updated);
    store.record("progress", Some(id), Some(&key));
    save_or_die(store, path);
    match label {
        Some(label) => println!("Task {id} progress for {key}: {label}"),
        None => println!("Task {id} progress recorded for {key}"),
    }
}

/// Print a single task's details.
pub fn cmd_view(store: &Store, id: u64, date: Option<String>) {
    let date = resolve_date(date.as_deref());
    let key = date_key(date);
    let task = require_task(store, id);

    println!("ID:       {}", task.id);
    println!("Title:    {}", task.title);
    println!("Anchor:   {}", date_key(task.anchor_date));
    if let Some(time) = &task.time {
        println!("Time:     {}", format_time(time));
    }
    if let Some(color) = &task.color {
        println!("Colour:   {color}");
    }
    if let Some(tag) = crate::view::derive_tag(&task) {
        println!("Tag:      {} ({})", tag.label, tag.key);
    }
    println!("Repeats:  {}", if crate::recur::recurs(&task) { "yes" } else { "no" });
    println!(
        "{}:  {}",
        key,
        if occurs_on(&task, date) {
            if is_task_completed(&task, &key) { "completed" } else { "due" }
        } else {
            "not scheduled"
        }
    );
    if let Some(label) = progress_label(&task, Some(&key)) {
        println!("Progress: {label}");
    }
    for sub in &task.subtasks {
        let mark = if crate::ledger::is_subtask_completed(sub, Some(&key)) {
            "[x]"
        } else {
            "[ ]"
        };
        println!("  {mark} {} {}", sub.id, sub.title);
    }
}

/// Update fields on a task.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    store: &mut Store,
    path: &Path,
    id: u64,
    title: Option<String>,
    color: Option<String>,
    at: Option<String>,
    clear_time: bool,
    tag: Option<String>,
    tag_label: Option<String>,
    clear_tag: bool,
    add_subs: Vec<String>,
    rm_subs: Vec<u64>,
) {
    let mut task = require_task(store, id);
    if let Some(title) = title {
        task.title = title;
    }
    if let Some(color) = color {
        task.color = Some(color);
    }
    if clear_time {
        task.time = None;
    } else if let Some(s) = at.as_deref() {
        match parse_clock_input(s) {
            Some(t) => task.time = Some(TaskTime::At(t)),
            None => {
                eprintln!("Unrecognised time '{s}'.");
                std::process::exit(1);
            }
        }
    }
    if clear_tag {
        task.tag = None;
        task.tag_label = None;
    } else {
        if let Some(tag) = tag {
            task.tag = Some(tag);
        }
        if let Some(label) = tag_label {
            task.tag_label = Some(label);
        }
    }
    if !rm_subs.is_empty() {
        task.subtasks.retain(|s| !rm_subs.contains(&s.id));
    }
    // Appended subtasks keep the existing order; IDs continue from the max.
    let mut next_sub = task.subtasks.iter().map(|s| s.id).max().unwrap_or(0) + 1;
    for title in add_subs {
        task.subtasks.push(Subtask {
            id: next_sub,
            title,
            completed: false,
            completed_dates: Default::default(),
        });
        next_sub += 1;
    }
    task.updated_at_utc = Utc::now().timestamp();
    store.replace(task);
    store.record("update", Some(id), None);
    save_or_die(store, path);
    println!("Updated task {id}");
}

/// Delete a task.
pub fn cmd_delete(store: &mut Store, path: &Path, id: u64) {
    match store.remove(id) {
        Some(task) => {
            store.record("delete", Some(id), None);
            save_or_die(store, path);
            println!("Deleted task {id}: {}", task.title);
        }
        None => {
            eprintln!("Task with ID {id} not found");
            std::process::exit(1);
        }
    }
}

/// List distinct tags and task counts.
pub fn cmd_tags(store: &Store) {
    let counts = store.tag_counts();
    if counts.is_empty() {
        println!("No tags.");
        return;
    }
    for (key, (label, count)) in counts {
        println!("{key:<20} {label:<24} {count}");
    }
}

/// Print the completion summary for a date.
pub fn cmd_day(store: &Store, date: Option<String>) {
    let date = resolve_date(date.as_deref());
    let key = date_key(date);
    let rows = visible_tasks(&store.tasks, date, TAG_FILTER_ALL);
    let completed = rows.iter().filter(|r| r.completed).count();
    println!("{key}: {completed}/{} tasks completed", rows.len());
    if day_all_completed(&store.tasks, date) {
        println!("All done.");
    }
}

/// Persist the default tag filter used by `list`.
pub fn cmd_filter(store: &mut Store, path: &Path, tag: String) {
    store.settings.tag_filter = tag.clone();
    save_or_die(store, path);
    if tag == TAG_FILTER_ALL {
        println!("Tag filter cleared.");
    } else {
        println!("Tag filter set to '{tag}'.");
    }
}

/// Show recent actions, most recent first.
pub fn cmd_history(store: &Store, limit: Option<usize>) {
    let limit = limit.unwrap_or(20);
    for entry in store.history.iter().take(limit) {
        let when = chrono::DateTime::from_timestamp(entry.at_utc, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        let task = entry
            .task_id
            .map(|id| format!("task {id}"))
            .unwrap_or_default();
        let date = entry.date_key.clone().unwrap_or_default();
        println!("{when}  {:<16} {task:<10} {date}", entry.action);
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Format a scheduled time for display, e.g. "7:30pm" or "2pm-4pm".
fn format_time(time: &TaskTime) -> String {
    fn clock(t: &crate::task::ClockTime) -> String {
        let suffix = match t.meridiem {
            Meridiem::Am => "am",
            Meridiem::Pm => "pm",
        };
        if t.minute == 0 {
            format!("{}{suffix}", t.hour)
        } else {
            format!("{}:{:02}{suffix}", t.hour, t.minute)
        }
    }
    match time {
        TaskTime::At(t) => clock(t),
        TaskTime::Between { start, end } => format!("{}-{}", clock(start), clock(end)),
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

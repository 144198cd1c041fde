//! # hab - Habit Tracker CLI
//!
//! A local-first habit and daily task tracker for the terminal.
//!
//! ## Key Features
//!
//! - **Recurring Schedules**: two repeat schemas — simple presets (daily,
//!   weekend, custom weekdays, every-N-days) and a parametric form
//!   (frequency × interval with weekday/month-day sets and an end date)
//! - **Per-Day Completion**: every task and subtask is checked off per
//!   calendar day, keyed by `YYYY-MM-DD`
//! - **Quantum Progress**: timer and count tasks accumulate progress against
//!   a target, per day for repeating tasks
//! - **Tag Grouping**: tasks carry a tag key or free-form label, normalised
//!   into grouping tokens
//! - **Local File Storage**: one JSON store under `~/.habits`, written
//!   atomically, with a capped action history
//!
//! ## Quick Start
//!
//! ```bash
//! # A daily habit with a 30 minute timer, scheduled for the morning
//! hab add "Practice guitar" --repeat daily --timer 30 --at 7am
//!
//! # Every second week on Monday and Wednesday
//! hab add "Water plants" --freq weekly --every 2 --on mon --on wed
//!
//! # What's on today, and check one off
//! hab list
//! hab toggle 1
//!
//! # Credit 10 minutes of practice
//! hab progress 1 --minutes 10
//! ```
//!
//! Data is stored locally in `~/.habits/habits.json`. We recommend you source
//! control this folder via `git init` and back it up periodically.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod dates;
pub mod fields;
pub mod ledger;
pub mod quantum;
pub mod recur;
pub mod store;
pub mod task;
pub mod view;

use cli::Cli;
use cmd::*;
use store::Store;

fn main() {
    let cli = Cli::parse();

    // Commands that never touch the store.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let dir = PathBuf::from(home).join(".habits");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Failed to create habits directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
        dir.join("habits.json")
    });

    let mut store = Store::load(&db_path);

    match cli.command {
        Commands::Completions { .. } => unreachable!("handled above"),

        Commands::Add {
            title, date, repeat, freq, every, weekdays, month_days, until,
            timer, target, unit, at, tag, tag_label, color, subtasks,
        } => cmd_add(&mut store, &db_path, title, date, repeat, freq, every,
                     weekdays, month_days, until, timer, target, unit, at,
                     tag, tag_label, color, subtasks),

        Commands::List { date, tag } => cmd_list(&store, date, tag),

        Commands::Toggle { id, date } => cmd_toggle(&mut store, &db_path, id, date),

        Commands::Sub { id, sub_id, date } => cmd_sub(&mut store, &db_path, id, sub_id, date),

        Commands::Progress { id, minutes, seconds, count, date } =>
            cmd_progress(&mut store, &db_path, id, minutes, seconds, count, date),

        Commands::View { id, date } => cmd_view(&store, id, date),

        Commands::Update { id, title, color, at, clear_time, tag, tag_label,
                           clear_tag, add_subs, rm_subs } =>
            cmd_update(&mut store, &db_path, id, title, color, at, clear_time,
                       tag, tag_label, clear_tag, add_subs, rm_subs),

        Commands::Delete { id } => cmd_delete(&mut store, &db_path, id),

        Commands::Tags => cmd_tags(&store),

        Commands::Day { date } => cmd_day(&store, date),

        Commands::Filter { tag } => cmd_filter(&mut store, &db_path, tag),

        Commands::History { limit } => cmd_history(&store, limit),
    }
}

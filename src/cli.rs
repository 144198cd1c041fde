use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed habit tracker CLI.
/// Storage defaults to ~/.habits/habits.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "hab", version, about = "Daily habit and task tracking CLI")]
pub struct Cli {
    /// Path to the JSON store file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

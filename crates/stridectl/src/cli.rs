//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Stride - curriculum progress, tasks and workout streaks
#[derive(Parser, Debug)]
#[command(name = "stridectl")]
#[command(about = "Stride - curriculum progress, tasks and workout streaks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (overrides $STRIDE_CONFIG and ~/.config/stride/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding progress documents (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Treat this day as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Output JSON only
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// User + curriculum pair addressing one progress document
#[derive(Args, Debug, Clone)]
pub struct Owner {
    /// User id
    #[arg(long)]
    pub user: String,

    /// Curriculum JSON file (see `import`)
    #[arg(long)]
    pub curriculum: PathBuf,
}

/// Step/topic/problem indices
#[derive(Args, Debug, Clone, Copy)]
pub struct Address {
    #[arg(long, allow_negative_numbers = true)]
    pub step: i64,

    #[arg(long, allow_negative_numbers = true)]
    pub topic: i64,

    #[arg(long, allow_negative_numbers = true)]
    pub problem: i64,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a course structure export into a curriculum file
    Import {
        /// Course structure JSON
        #[arg(long)]
        structure: PathBuf,

        /// Where to write the curriculum JSON
        #[arg(long)]
        out: PathBuf,
    },

    /// Create progress for a user (no-op when it already exists)
    Init {
        #[command(flatten)]
        owner: Owner,
    },

    /// Show completion, difficulty and revision rollups
    Metrics {
        #[command(flatten)]
        owner: Owner,
    },

    /// Mark a problem completed (or not, with --undo)
    Complete {
        #[command(flatten)]
        owner: Owner,

        #[command(flatten)]
        at: Address,

        #[arg(long)]
        undo: bool,
    },

    /// Save code, language or notes for a problem
    Code {
        #[command(flatten)]
        owner: Owner,

        #[command(flatten)]
        at: Address,

        /// File whose contents become the saved code
        #[arg(long)]
        code_file: Option<PathBuf>,

        #[arg(long)]
        lang: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a revision of a problem
    Revise {
        #[command(flatten)]
        owner: Owner,

        #[command(flatten)]
        at: Address,

        /// solid | needs_review
        #[arg(long, default_value = "solid")]
        status: String,

        #[arg(long, default_value = "")]
        note: String,

        /// Revision time (RFC 3339), defaults to now
        #[arg(long)]
        revised_at: Option<String>,
    },

    /// List a problem's latest revisions
    Revisions {
        #[command(flatten)]
        owner: Owner,

        #[command(flatten)]
        at: Address,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export solved problems as CSV
    Export {
        #[command(flatten)]
        owner: Owner,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Current streaks
    Streak {
        #[command(subcommand)]
        kind: StreakCommands,
    },

    /// Month calendar, one entry per day
    Calendar {
        #[command(subcommand)]
        kind: CalendarCommands,
    },

    /// Task completion for the last 7 days
    Weekly {
        #[arg(long)]
        user: String,

        /// Tasks JSON array
        #[arg(long)]
        tasks: PathBuf,
    },

    /// Workout activity for the last 30 days
    MonthlyGym {
        #[arg(long)]
        user: String,

        /// Workout logs JSON array
        #[arg(long)]
        logs: PathBuf,

        /// Workout templates JSON array, for workout names
        #[arg(long)]
        templates: Option<PathBuf>,
    },

    /// Schedule a task, appended after the day's existing tasks
    AddTask {
        /// Tasks JSON array (created when missing)
        #[arg(long)]
        tasks: PathBuf,

        #[arg(long)]
        user: String,

        #[arg(long)]
        title: String,

        /// YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// low | medium | high
        #[arg(long, default_value = "medium")]
        priority: String,
    },

    /// Swap the order of two tasks
    SwapTasks {
        #[arg(long)]
        tasks: PathBuf,

        #[arg(long)]
        first: String,

        #[arg(long)]
        second: String,
    },

    /// Create or update the workout log for a day
    LogWorkout {
        /// Workout logs JSON array (created when missing)
        #[arg(long)]
        logs: PathBuf,

        #[arg(long)]
        user: String,

        /// YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Workout template id
        #[arg(long)]
        template: String,

        /// Performed exercises JSON array (kept as-is when omitted)
        #[arg(long)]
        exercises: Option<PathBuf>,

        /// Set the completed flag (kept as-is when omitted)
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum StreakCommands {
    /// Consecutive days with a completed workout
    Gym {
        #[arg(long)]
        user: String,

        #[arg(long)]
        logs: PathBuf,
    },

    /// Consecutive days meeting the task completion threshold
    Work {
        #[arg(long)]
        user: String,

        #[arg(long)]
        tasks: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum CalendarCommands {
    Gym {
        #[arg(long)]
        user: String,

        #[arg(long)]
        logs: PathBuf,

        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,
    },

    Tasks {
        #[arg(long)]
        user: String,

        #[arg(long)]
        tasks: PathBuf,

        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
}

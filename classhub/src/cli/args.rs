//! CLI argument definitions.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use classhub::config::DEFAULT_PORT;
use classhub::models::{SessionStatus, StatusTab, MAX_DURATION, MIN_DURATION};

/// Classhub - schedule and run live classroom sessions
#[derive(Parser, Debug)]
#[command(name = "classhub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides config and CLASSHUB_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Id of the signed-in user
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Role of the signed-in user (admin, teacher, student, ...)
    #[arg(long, global = true)]
    pub role: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage live sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// List teachers
    Teachers,

    /// List classes
    Classes,

    /// Show the students enrolled in a class
    Roster {
        /// Class ID
        class_id: String,
    },

    /// Run the in-memory development backend
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// JSON file with teachers, classes and students (defaults to demo data)
        #[arg(long)]
        seed: Option<PathBuf>,
    },
}

/// Live session operations
#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// List sessions visible to the current user
    List {
        /// Status tab
        #[arg(long, value_enum, default_value_t = TabArg::All)]
        tab: TabArg,

        /// Case-insensitive text to find in title or description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one session
    Show {
        /// Session ID
        id: String,
    },

    /// Schedule a new session
    Create(SessionFields),

    /// Edit a session (unspecified fields keep their current values)
    Edit {
        /// Session ID
        id: String,

        #[command(flatten)]
        fields: SessionFields,
    },

    /// Change a session's status
    Status {
        /// Session ID
        id: String,

        /// New status
        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Delete a session
    Delete {
        /// Session ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Editable session fields. Everything is optional here; the form decides
/// what is required.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionFields {
    /// Session title
    #[arg(long)]
    pub title: Option<String>,

    /// Longer description
    #[arg(long)]
    pub description: Option<String>,

    /// Meeting URL
    #[arg(long)]
    pub link: Option<String>,

    /// Teacher ID
    #[arg(long)]
    pub teacher: Option<String>,

    /// Class ID
    #[arg(long)]
    pub class: Option<String>,

    /// Student IDs (repeat or comma-separate)
    #[arg(long = "student", value_delimiter = ',')]
    pub students: Vec<String>,

    /// Invite every student on the class roster
    #[arg(long, conflicts_with = "students")]
    pub all_students: bool,

    /// Start time (RFC 3339, or "YYYY-MM-DD HH:MM" in UTC)
    #[arg(long, value_parser = parse_start)]
    pub start: Option<DateTime<Utc>>,

    /// Length in minutes
    #[arg(long, value_parser = clap::value_parser!(u32).range(i64::from(MIN_DURATION)..=i64::from(MAX_DURATION)))]
    pub duration: Option<u32>,
}

/// Status tabs
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TabArg {
    All,
    Ongoing,
    Scheduled,
    Completed,
}

impl From<TabArg> for StatusTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::All => Self::All,
            TabArg::Ongoing => Self::Ongoing,
            TabArg::Scheduled => Self::Scheduled,
            TabArg::Completed => Self::Completed,
        }
    }
}

/// Session statuses
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl From<StatusArg> for SessionStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Scheduled => Self::Scheduled,
            StatusArg::Ongoing => Self::Ongoing,
            StatusArg::Completed => Self::Completed,
            StatusArg::Cancelled => Self::Cancelled,
        }
    }
}

/// Parse a start time flexibly.
fn parse_start(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!("invalid start time: {s}"))
}

//! CLI argument definitions.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::deploy::LinuxType;

pub const DEFAULT_SETTINGS_PATH: &str = "configs/settings.yaml";
pub const DEFAULT_PROJECT_PATH: &str = "configs/project.yaml";
pub const DEFAULT_MIGRATIONS_PATH: &str = "configs/migrations.yaml";

/// Settings loading and deployment planning for dye-managed Django projects
#[derive(Parser, Debug)]
#[command(name = "dye")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

/// Verbosity of the stderr log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the settings record and log a summary without the password
    Settings {
        /// Tracked settings file
        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        config: String,

        /// Where DB_PASSWORD comes from: `env`, or the path of a private settings file
        #[arg(long, default_value = "env")]
        secrets: String,
    },

    /// Print the server paths for one environment
    Layout {
        /// Project settings file
        #[arg(long, default_value = DEFAULT_PROJECT_PATH)]
        project: String,

        /// Environment from host_list
        #[arg(long)]
        env: String,

        /// Distribution of the server, needed for webserver paths
        #[arg(long, value_enum)]
        linux: Option<LinuxType>,
    },

    /// Print the tasks.py command a deploy step runs
    Tasks {
        #[arg(long, default_value = DEFAULT_PROJECT_PATH)]
        project: String,

        #[arg(long)]
        env: String,

        /// Pass -v to tasks.py
        #[arg(short, long)]
        verbose: bool,

        /// Task and arguments, e.g. `deploy:staging`
        #[arg(required = true)]
        args: Vec<String>,
    },

    /// Print the command running the project tests on a server
    RemoteTest {
        #[arg(long, default_value = DEFAULT_PROJECT_PATH)]
        project: String,

        #[arg(long)]
        env: String,

        /// The server has /usr/bin/python2.6
        #[arg(long)]
        python26: bool,
    },

    /// Print the migration log and flag stale names in a tracked file
    Migrations {
        #[arg(long, default_value = DEFAULT_MIGRATIONS_PATH)]
        log: String,

        /// Only entries on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Tracked settings file to scan for renamed names
        #[arg(long)]
        check: Option<String>,
    },

    /// Print the rollback versions a deploy would delete (reads `ls -1 previous` on stdin)
    Prune {
        #[arg(long, default_value = DEFAULT_PROJECT_PATH)]
        project: String,

        /// Versions to keep, defaults to the project's versions_to_keep
        #[arg(long)]
        keep: Option<usize>,
    },
}

//! Command-line interface for the dye helper binary.
//!
//! Provides commands for:
//! - `settings` - Load and summarise the settings record
//! - `layout` - Show the server paths for an environment
//! - `tasks` - Show the `tasks.py` invocation for an environment
//! - `remote-test` - Show the remote test command
//! - `migrations` - Read the migration log and check for stale names
//! - `prune` - List rollback versions a deploy would delete

pub mod args;

pub use args::{Cli, Commands, LogLevel};

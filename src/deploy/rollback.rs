//! Rollback versions kept under `prev_root`, and downtime reporting.

use chrono::{DateTime, Local, NaiveDateTime};
use std::fmt;

use super::DeployError;

/// Name format of rollback version directories.
pub const VERSION_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Versions kept when neither the caller nor the project says otherwise.
pub const DEFAULT_VERSIONS_TO_KEEP: usize = 5;

/// Directory name for a rollback copy taken at `at`.
pub fn version_dir_name(at: NaiveDateTime) -> String {
    at.format(VERSION_FORMAT).to_string()
}

/// Whether `name` looks like a rollback version directory.
pub fn is_version_dir(name: &str) -> bool {
    NaiveDateTime::parse_from_str(name, VERSION_FORMAT).is_ok()
}

/// Sorts a raw directory listing oldest first.
///
/// Entries that are not version directories (blank lines, `lost+found`, ...)
/// are dropped. Timestamps in [`VERSION_FORMAT`] sort lexically in time order.
pub fn sorted_versions<'a>(listing: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut versions: Vec<&str> = listing
        .into_iter()
        .map(str::trim)
        .filter(|v| is_version_dir(v))
        .collect();
    versions.sort_unstable();
    versions
}

/// Versions to delete so that only the newest `keep` remain.
///
/// `keep` falls back to `project_keep`, then [`DEFAULT_VERSIONS_TO_KEEP`].
/// Zero means keep everything.
pub fn versions_to_delete<'a>(
    listing: impl IntoIterator<Item = &'a str>,
    keep: Option<usize>,
    project_keep: Option<usize>,
) -> Vec<&'a str> {
    let keep = keep.or(project_keep).unwrap_or(DEFAULT_VERSIONS_TO_KEEP);
    if keep == 0 {
        return Vec::new();
    }

    let versions = sorted_versions(listing);
    let cut = versions.len().saturating_sub(keep);
    versions[..cut].to_vec()
}

/// Picks the version to roll back to: `"last"` is the newest one.
pub fn select_version<'a>(
    listing: impl IntoIterator<Item = &'a str>,
    requested: &str,
) -> Result<&'a str, DeployError> {
    let versions = sorted_versions(listing);

    if requested == "last" {
        return versions
            .last()
            .copied()
            .ok_or(DeployError::NoPreviousVersions);
    }

    versions
        .into_iter()
        .find(|v| *v == requested)
        .ok_or_else(|| DeployError::UnknownVersion(requested.to_string()))
}

/// What a rollback should do besides restoring code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollbackOptions {
    /// Migrate the database back to the old schema.
    pub migrate: bool,
    /// Load the dump taken alongside the rollback copy.
    pub restore_db: bool,
}

impl RollbackOptions {
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.migrate && self.restore_db {
            return Err(DeployError::ConflictingRollbackOptions);
        }
        if self.migrate {
            return Err(DeployError::MigrateUnsupported);
        }
        Ok(())
    }
}

/// Window during which the vhost served the maintenance page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downtime {
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
}

impl Downtime {
    pub fn new(started: DateTime<Local>, finished: DateTime<Local>) -> Self {
        Self { started, finished }
    }

    pub fn seconds(&self) -> f64 {
        (self.finished - self.started).num_milliseconds() as f64 / 1000.0
    }
}

impl fmt::Display for Downtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Downtime lasted for {:.1} seconds", self.seconds())?;
        write!(
            f,
            "(Downtime started at {} and finished at {})",
            self.started.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.finished.format("%Y-%m-%d %H:%M:%S%.6f")
        )
    }
}

//! Migration log: dated, append-only notes on renames operators apply by hand.
//!
//! Entries are kept newest first. Nothing here rewrites configuration; the log
//! only tells an operator what changed and which tracked names went stale.

mod error;

pub use error::MigrationError;

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;

/// A name that was renamed or a file that moved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// One published log entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MigrationEntry {
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub renames: Vec<Rename>,
    /// Commit that introduced the change, if recorded.
    #[serde(default)]
    pub commit: Option<String>,
}

/// A tracked name that a published entry renamed away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleName<'a> {
    pub name: &'a str,
    pub replacement: &'a str,
    pub entry: &'a MigrationEntry,
}

/// Ordered migration log, newest entry first.
#[derive(Debug, Clone, Default)]
pub struct MigrationLog {
    entries: Vec<MigrationEntry>,
}

impl MigrationLog {
    /// Load the log from a YAML list of entries.
    pub fn load(path: &str) -> Result<Self, MigrationError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse the log, rejecting entries that are not newest first.
    pub fn from_yaml(yaml: &str) -> Result<Self, MigrationError> {
        let entries: Vec<MigrationEntry> = serde_yaml::from_str(yaml)?;

        for pair in entries.windows(2) {
            if pair[0].date < pair[1].date {
                return Err(MigrationError::OutOfOrder {
                    earlier: pair[0].date,
                    later: pair[1].date,
                });
            }
        }

        for entry in &entries {
            entry.validate()?;
        }

        Ok(Self { entries })
    }

    /// Entries newest first.
    pub fn entries(&self) -> &[MigrationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest(&self) -> Option<&MigrationEntry> {
        self.entries.first()
    }

    /// Publishes a new entry at the top of the log.
    ///
    /// Published entries are history: an entry dated before the newest one is refused.
    pub fn append(&mut self, entry: MigrationEntry) -> Result<(), MigrationError> {
        entry.validate()?;
        if let Some(newest) = self.newest() {
            if entry.date < newest.date {
                return Err(MigrationError::OutOfOrder {
                    earlier: entry.date,
                    later: newest.date,
                });
            }
        }
        self.entries.insert(0, entry);
        Ok(())
    }

    /// Entries published strictly after `date`, newest first.
    pub fn since(&self, date: NaiveDate) -> impl Iterator<Item = &MigrationEntry> {
        self.entries.iter().take_while(move |e| e.date > date)
    }

    /// Every name in `names` that an entry renamed, with its replacement.
    ///
    /// When a name was renamed more than once the newest entry wins.
    pub fn stale_names<'a, I>(&'a self, names: I) -> Vec<StaleName<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| {
                self.entries.iter().find_map(|entry| {
                    entry
                        .renames
                        .iter()
                        .find(|r| r.from == name)
                        .map(|r| StaleName {
                            name,
                            replacement: &r.to,
                            entry,
                        })
                })
            })
            .collect()
    }
}

/// Top-level keys of a tracked YAML file, i.e. the names a stale check looks at.
pub fn tracked_names(yaml: &str) -> Result<Vec<String>, MigrationError> {
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(yaml)?;
    Ok(mapping
        .keys()
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

impl MigrationEntry {
    fn validate(&self) -> Result<(), MigrationError> {
        if self.description.trim().is_empty() {
            return Err(MigrationError::Invalid(format!(
                "entry {} has no description",
                self.date
            )));
        }

        if let Some(rename) = self.renames.iter().find(|r| r.from.is_empty() || r.from == r.to) {
            return Err(MigrationError::Invalid(format!(
                "entry {}: rename {} -> {} is not a rename",
                self.date, rename.from, rename.to
            )));
        }

        Ok(())
    }
}

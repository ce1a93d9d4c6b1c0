//! Web framework settings record.

use secrecy::SecretString;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::ConfigError;
use super::database::{DatabaseConfig, DatabaseFile};

/// Alias of the only database the settings record carries.
pub const DEFAULT_DATABASE: &str = "default";

/// Tracked settings file as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct SettingsFile {
    #[serde(rename = "DEBUG", default)]
    pub debug: bool,
    /// Falls back to `DEBUG` when absent.
    #[serde(rename = "TEMPLATE_DEBUG")]
    pub template_debug: Option<bool>,
    #[serde(rename = "DATABASES")]
    pub databases: BTreeMap<String, DatabaseFile>,
    #[serde(rename = "EMAIL_HOST", default = "default_email_host")]
    pub email_host: String,
}

fn default_email_host() -> String {
    "localhost".to_string()
}

/// Debug mode and template debug mode. Always equal once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugFlags {
    debug: bool,
    template_debug: bool,
}

impl DebugFlags {
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn template_debug(&self) -> bool {
        self.template_debug
    }
}

/// Immutable settings record handed to the hosting framework at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    debug: DebugFlags,
    database: DatabaseConfig,
    email_host: String,
}

impl Settings {
    pub fn debug_flags(&self) -> DebugFlags {
        self.debug
    }

    /// The `default` entry of `DATABASES`, with its password resolved.
    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }

    /// Outbound mail relay.
    pub fn email_host(&self) -> &str {
        &self.email_host
    }
}

/// Validated tracked settings still waiting for the database password.
#[derive(Debug)]
pub(super) struct UnresolvedSettings {
    debug: DebugFlags,
    database: DatabaseFile,
    email_host: String,
}

impl UnresolvedSettings {
    pub fn with_password(self, password: SecretString) -> Settings {
        Settings {
            debug: self.debug,
            database: self.database.with_password(password),
            email_host: self.email_host,
        }
    }
}

impl SettingsFile {
    /// Validate the tracked file and pick out the default database.
    pub fn validate(mut self) -> Result<UnresolvedSettings, ConfigError> {
        let template_debug = self.template_debug.unwrap_or(self.debug);
        if template_debug != self.debug {
            return Err(ConfigError::Validation(
                "DEBUG and TEMPLATE_DEBUG must be equal".into(),
            ));
        }

        if let Some(alias) = self.databases.keys().find(|a| *a != DEFAULT_DATABASE) {
            return Err(ConfigError::Validation(format!(
                "DATABASES.{}: only the \"{}\" database is supported",
                alias, DEFAULT_DATABASE
            )));
        }

        let database = self.databases.remove(DEFAULT_DATABASE).ok_or_else(|| {
            ConfigError::Validation(format!("DATABASES.{} is required", DEFAULT_DATABASE))
        })?;

        if database.password_present {
            return Err(ConfigError::Validation(format!(
                "DATABASES.{}.PASSWORD must not be set in tracked settings (provide DB_PASSWORD instead)",
                DEFAULT_DATABASE
            )));
        }

        if database.name.is_empty() {
            return Err(ConfigError::Validation(format!(
                "DATABASES.{}.NAME is required",
                DEFAULT_DATABASE
            )));
        }

        if self.email_host.is_empty() {
            return Err(ConfigError::Validation("EMAIL_HOST must not be empty".into()));
        }

        Ok(UnresolvedSettings {
            debug: DebugFlags {
                debug: self.debug,
                template_debug,
            },
            database,
            email_host: self.email_host,
        })
    }
}

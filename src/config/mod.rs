//! Configuration loading and validation.
//!
//! Uses serde_yaml to load the tracked settings file. The database password
//! never lives in that file; it is injected through a [`SecretResolver`].

mod database;
mod error;
mod port;
mod project;
mod secret;
mod settings;

pub use database::{ConnectionParams, DatabaseConfig, DatabaseEngine};
pub use error::ConfigError;
pub use project::{PathOverrides, ProjectSettings, ProjectType, RepoType};
pub use secret::{DB_PASSWORD, EnvSecretResolver, PrivateSettings, SecretError, SecretResolver};
pub use settings::{DEFAULT_DATABASE, DebugFlags, Settings};

use secrecy::ExposeSecret;
use settings::SettingsFile;
use std::fs;
use tracing::{debug, warn};

impl Settings {
    /// Load the settings record from a YAML file.
    ///
    /// The password is asked from `secrets` after the tracked file validates.
    /// A resolver failure is fatal: no record is returned and nothing is retried.
    pub fn load(path: &str, secrets: &dyn SecretResolver) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        debug!(path = %path, "Loading settings");
        Self::from_yaml(&content, secrets)
    }

    /// Build the settings record from a YAML string.
    pub fn from_yaml(yaml: &str, secrets: &dyn SecretResolver) -> Result<Self, ConfigError> {
        let file: SettingsFile = serde_yaml::from_str(yaml)?;
        let settings = file.validate()?;

        let password = secrets.database_password()?;
        if password.expose_secret().is_empty() {
            warn!(database = DEFAULT_DATABASE, "Database password is empty");
        }

        Ok(settings.with_password(password))
    }
}

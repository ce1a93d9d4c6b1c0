//! Secret resolution for credentials kept out of version control.

use secrecy::SecretString;
use serde::Deserialize;
use std::{env, fs};
use thiserror::Error;

/// Name of the secret holding the database password.
pub const DB_PASSWORD: &str = "DB_PASSWORD";

/// Secret lookup error.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("{0} is not set")]
    NotFound(&'static str),
    #[error("failed to read private settings {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse private settings {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("secret backend failed: {0}")]
    Backend(String),
}

/// SecretResolver supplies credentials that never appear in tracked settings.
///
/// It is asked once per settings load. An error is not retried.
pub trait SecretResolver {
    /// Returns the password for the default database.
    fn database_password(&self) -> Result<SecretString, SecretError>;
}

/// Reads secrets from process environment variables.
///
/// Call [`EnvSecretResolver::with_dotenv`] to pull a local `.env` file in first.
#[derive(Debug, Clone, Copy)]
pub struct EnvSecretResolver {
    lookup: fn(&str) -> Option<String>,
}

impl Default for EnvSecretResolver {
    fn default() -> Self {
        Self {
            lookup: |name| env::var(name).ok(),
        }
    }
}

impl EnvSecretResolver {
    /// Loads `.env` (if present) into the environment and returns a resolver.
    pub fn with_dotenv() -> Self {
        // Missing .env is fine, the variables may come from the real environment
        dotenvy::dotenv().ok();
        Self::default()
    }

    /// Resolver reading variables through `lookup` instead of the process environment.
    pub fn with_lookup(lookup: fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }
}

impl SecretResolver for EnvSecretResolver {
    fn database_password(&self) -> Result<SecretString, SecretError> {
        (self.lookup)(DB_PASSWORD)
            .map(SecretString::from)
            .ok_or(SecretError::NotFound(DB_PASSWORD))
    }
}

/// Untracked private settings file, e.g. `private_settings.yaml`:
///
/// ```yaml
/// DB_PASSWORD: secret123
/// ```
///
/// The file is only read when the password is asked for.
#[derive(Debug, Clone)]
pub struct PrivateSettings {
    path: String,
}

#[derive(Deserialize)]
struct PrivateSettingsFile {
    #[serde(rename = "DB_PASSWORD")]
    db_password: Option<SecretString>,
}

impl PrivateSettings {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl SecretResolver for PrivateSettings {
    fn database_password(&self) -> Result<SecretString, SecretError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SecretError::ReadFile {
            path: self.path.clone(),
            source,
        })?;
        let file: PrivateSettingsFile =
            serde_yaml::from_str(&content).map_err(|source| SecretError::Parse {
                path: self.path.clone(),
                source,
            })?;

        file.db_password.ok_or(SecretError::NotFound(DB_PASSWORD))
    }
}

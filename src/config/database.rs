//! Database connection settings.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, de::IgnoredAny};
use std::collections::BTreeMap;
use std::fmt;

use super::port;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum DatabaseEngine {
    Mysql,
    Postgresql,
    /// Older name of the postgres backend, kept as written.
    PostgresqlPsycopg2,
    Sqlite3,
    Oracle,
}

impl DatabaseEngine {
    /// Dotted backend path as the web framework expects it.
    pub fn backend_path(&self) -> String {
        format!("django.db.backends.{}", self)
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseEngine::Mysql => write!(f, "mysql"),
            DatabaseEngine::Postgresql => write!(f, "postgresql"),
            DatabaseEngine::PostgresqlPsycopg2 => write!(f, "postgresql_psycopg2"),
            DatabaseEngine::Sqlite3 => write!(f, "sqlite3"),
            DatabaseEngine::Oracle => write!(f, "oracle"),
        }
    }
}

impl std::str::FromStr for DatabaseEngine {
    type Err = String;

    /// Accepts both `django.db.backends.mysql` and `mysql`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().rsplit('.').next().unwrap_or_default();
        match name {
            "mysql" => Ok(DatabaseEngine::Mysql),
            "postgresql" => Ok(DatabaseEngine::Postgresql),
            "postgresql_psycopg2" => Ok(DatabaseEngine::PostgresqlPsycopg2),
            "sqlite3" => Ok(DatabaseEngine::Sqlite3),
            "oracle" => Ok(DatabaseEngine::Oracle),
            _ => Err(format!("unsupported database engine: {}", s)),
        }
    }
}

impl TryFrom<String> for DatabaseEngine {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One entry under `DATABASES` as written in the tracked file.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct DatabaseFile {
    #[serde(rename = "ENGINE")]
    pub engine: DatabaseEngine,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "USER", default)]
    pub user: String,
    /// True when a `PASSWORD` key is present, whatever its value.
    #[serde(rename = "PASSWORD", default, deserialize_with = "key_present")]
    pub password_present: bool,
    #[serde(rename = "HOST", default)]
    pub host: String,
    #[serde(rename = "PORT", default, with = "port")]
    pub port: Option<u16>,
    #[serde(rename = "OPTIONS", default)]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

fn key_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

impl DatabaseFile {
    pub fn with_password(self, password: SecretString) -> DatabaseConfig {
        DatabaseConfig {
            engine: self.engine,
            name: self.name,
            user: self.user,
            password,
            host: self.host,
            port: self.port,
            options: self.options,
        }
    }
}

/// Default database settings with the password resolved.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    engine: DatabaseEngine,
    name: String,
    user: String,
    password: SecretString,
    host: String,
    port: Option<u16>,
    options: BTreeMap<String, serde_yaml::Value>,
}

impl DatabaseConfig {
    pub fn engine(&self) -> DatabaseEngine {
        self.engine
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Empty means the backend's default host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// `None` means the backend's default port.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Backend specific options, e.g. `init_command`.
    pub fn options(&self) -> &BTreeMap<String, serde_yaml::Value> {
        &self.options
    }

    /// Parameters for the framework's connection-init call.
    ///
    /// `options` is handed over untouched.
    pub fn connection_params(&self) -> ConnectionParams<'_> {
        ConnectionParams {
            backend: self.engine.backend_path(),
            database: &self.name,
            user: &self.user,
            password: &self.password,
            host: &self.host,
            port: self.port,
            options: &self.options,
        }
    }
}

/// Borrowed view consumed by the hosting framework when opening connections.
#[derive(Debug, Clone)]
pub struct ConnectionParams<'a> {
    pub backend: String,
    pub database: &'a str,
    pub user: &'a str,
    pub password: &'a SecretString,
    pub host: &'a str,
    pub port: Option<u16>,
    pub options: &'a BTreeMap<String, serde_yaml::Value>,
}

//! Deployment planning error types.

/// Deployment planning error.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("unknown environment {name} (valid: {valid})")]
    UnknownEnvironment { name: String, valid: String },
    #[error("refusing to {0} on the production environment")]
    ProductionRefused(&'static str),
    #[error("could not determine linux type of the server")]
    UnknownLinuxType,
    #[error("webserver {webserver} is not supported (linux type {linux_type})")]
    UnsupportedWebserver { webserver: String, linux_type: String },
    #[error("no {webserver} conf file found - expected {expected}")]
    MissingWebserverConf { webserver: String, expected: String },
    #[error("cannot roll back to version {0}, it does not exist")]
    UnknownVersion(String),
    #[error("no previous versions available")]
    NoPreviousVersions,
    #[error("rollback cannot do both migrate and restore_db")]
    ConflictingRollbackOptions,
    #[error("rollback with migrate is not supported")]
    MigrateUnsupported,
    #[error("branch {0} is not one of the available branches")]
    UnknownBranch(String),
    #[error("{0} is not set for this project")]
    MissingSetting(&'static str),
}

//! Deployment planning: the paths, names and decisions a dye deploy works with.
//!
//! Nothing here touches a server. File existence is asked through
//! predicates so the same plan works for local and remote lookups.

mod branch;
mod celery;
mod command;
mod environment;
mod error;
mod layout;
mod rollback;
mod webserver;

pub use branch::{BranchDecision, BranchMismatch, BranchState, parse_remote_branches};
pub use celery::{CeleryDaemon, CeleryInstall};
pub use command::{
    RemoteCommand, bootstrap_command, local_changes_command, python_bin, remote_test_command,
    tasks_command,
};
pub use environment::{Environment, PRODUCTION};
pub use error::DeployError;
pub use layout::{DeployLayout, DjangoLayout};
pub use rollback::{
    DEFAULT_VERSIONS_TO_KEEP, Downtime, RollbackOptions, VERSION_FORMAT, is_version_dir,
    select_version, sorted_versions, version_dir_name, versions_to_delete,
};
pub use webserver::{LinuxType, WebserverPlan};

#[cfg(test)]
mod tests;

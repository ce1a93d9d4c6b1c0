//! Shell commands a deploy runs on the server.
//!
//! Each command carries whether it runs through sudo, which comes from the
//! project's `use_sudo` setting.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{ProjectSettings, RepoType};

use super::{DeployError, DeployLayout, Environment};

/// A command line planned for one server, with the directory to run it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub sudo: bool,
}

impl RemoteCommand {
    pub fn new(command: impl Into<String>, sudo: bool) -> Self {
        Self {
            command: command.into(),
            cwd: None,
            sudo,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cwd) = &self.cwd {
            write!(f, "cd {} && ", cwd.display())?;
        }
        if self.sudo {
            write!(f, "sudo ")?;
        }
        write!(f, "{}", self.command)
    }
}

/// Python interpreter on the server: `python2.6` when installed, else `python`.
pub fn python_bin(exists: impl Fn(&Path) -> bool) -> PathBuf {
    let python26 = Path::new("/usr/bin/python2.6");
    if exists(python26) {
        python26.to_path_buf()
    } else {
        PathBuf::from("/usr/bin/python")
    }
}

/// Invocation of the server-side `tasks.py` with `args`, e.g. `deploy:staging`.
///
/// `-v` is added when either the project or the caller asks for verbose output.
pub fn tasks_command(
    project: &ProjectSettings,
    layout: &DeployLayout,
    args: &str,
    verbose: bool,
) -> RemoteCommand {
    let mut command = layout.tasks_bin.display().to_string();
    if project.verbose || verbose {
        command.push_str(" -v");
    }
    command.push(' ');
    command.push_str(args);

    RemoteCommand::new(command, project.use_sudo)
}

/// Rebuilds the deploy virtualenv from `bootstrap.py`.
pub fn bootstrap_command(
    project: &ProjectSettings,
    layout: &DeployLayout,
    in_next: bool,
    exists: impl Fn(&Path) -> bool,
) -> RemoteCommand {
    let command = format!(
        "{} {} --full-rebuild --quiet",
        python_bin(exists).display(),
        layout.bootstrap_script(in_next).display()
    );
    RemoteCommand::new(command, project.use_sudo)
}

/// Runs the project's `test_cmd` in the django directory. Never on production.
pub fn remote_test_command(
    project: &ProjectSettings,
    layout: &DeployLayout,
    environment: &Environment,
    exists: impl Fn(&Path) -> bool,
) -> Result<RemoteCommand, DeployError> {
    environment.ensure_not_production("run tests")?;

    let django = layout
        .django
        .as_ref()
        .ok_or(DeployError::MissingSetting("django_dir"))?;
    let test_cmd = project
        .test_cmd
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(DeployError::MissingSetting("test_cmd"))?;

    let command = format!("{} {}", python_bin(exists).display(), test_cmd);
    Ok(RemoteCommand::new(command, project.use_sudo).in_dir(&django.django_dir))
}

/// Status command listing uncommitted changes in the served checkout.
///
/// `None` for cvs, and when `exists` finds no `.git`/`.svn` marker in
/// `vcs_root_dir` (nothing checked out yet).
pub fn local_changes_command(
    project: &ProjectSettings,
    layout: &DeployLayout,
    exists: impl Fn(&Path) -> bool,
) -> Option<RemoteCommand> {
    let status = match project.repo_type {
        RepoType::Git => "git status --short",
        RepoType::Svn => "svn status --quiet",
        RepoType::Cvs => return None,
    };

    let marker = layout.vcs_root_dir.join(format!(".{}", project.repo_type));
    if !exists(&marker) {
        return None;
    }

    Some(RemoteCommand::new(status, project.use_sudo).in_dir(&layout.vcs_root_dir))
}

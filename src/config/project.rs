//! Deployment project settings (the `project_settings` of a dye checkout).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use super::ConfigError;

/// Kind of project being deployed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Django,
    #[serde(other)]
    Other,
}

/// Version control system holding the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    Git,
    Svn,
    Cvs,
}

impl std::fmt::Display for RepoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoType::Git => write!(f, "git"),
            RepoType::Svn => write!(f, "svn"),
            RepoType::Cvs => write!(f, "cvs"),
        }
    }
}

/// Optional overrides for the derived server paths.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathOverrides {
    pub server_project_home: Option<PathBuf>,
    pub vcs_root_dir: Option<PathBuf>,
    pub prev_root: Option<PathBuf>,
    pub next_dir: Option<PathBuf>,
    pub dump_dir: Option<PathBuf>,
    pub deploy_dir: Option<PathBuf>,
    pub tasks_bin: Option<PathBuf>,
    pub local_tasks_bin: Option<PathBuf>,
    pub relative_django_dir: Option<PathBuf>,
    pub relative_django_settings_dir: Option<PathBuf>,
    pub relative_ve_dir: Option<PathBuf>,
    pub django_dir: Option<PathBuf>,
    pub django_settings_dir: Option<PathBuf>,
    pub ve_dir: Option<PathBuf>,
    pub manage_py: Option<PathBuf>,
    pub settings: Option<String>,
}

/// Project-wide deployment settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSettings {
    pub project_name: String,
    pub project_type: ProjectType,
    /// Parent directory of every project on the server, e.g. `/var/django`.
    pub server_home: PathBuf,
    pub repo_type: RepoType,
    pub repository: String,
    /// Webserver fronting the project; `None` skips webserver handling.
    #[serde(default)]
    pub webserver: Option<String>,
    /// Environment name to hosts. The keys are the valid environments.
    pub host_list: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_branches")]
    pub default_branch: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub use_sudo: bool,
    #[serde(default)]
    pub verbose: bool,
    /// Rollback versions kept after a deploy (default 5).
    #[serde(default)]
    pub versions_to_keep: Option<usize>,
    #[serde(default)]
    pub test_cmd: Option<String>,
    #[serde(default)]
    pub paths: PathOverrides,
}

fn default_true() -> bool {
    true
}

fn default_branches() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("production".to_string(), "master".to_string()),
        ("staging".to_string(), "master".to_string()),
    ])
}

impl ProjectSettings {
    /// Load project settings from a YAML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate project settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let project: ProjectSettings = serde_yaml::from_str(yaml)?;
        project.validate()?;
        Ok(project)
    }

    /// Environments the project can be deployed to.
    pub fn valid_envs(&self) -> impl Iterator<Item = &str> {
        self.host_list.keys().map(String::as_str)
    }

    /// Branch deployed to `environment` unless the operator picks another.
    pub fn default_branch_for(&self, environment: &str) -> &str {
        self.default_branch
            .get(environment)
            .map(String::as_str)
            .unwrap_or("master")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.project_name.is_empty() {
            return Err(ConfigError::Validation("project_name is required".into()));
        }

        if self.project_name.contains('/') {
            return Err(ConfigError::Validation(
                "project_name must not contain '/'".into(),
            ));
        }

        if self.repository.is_empty() {
            return Err(ConfigError::Validation("repository is required".into()));
        }

        if self.host_list.is_empty() {
            return Err(ConfigError::Validation(
                "host_list must define at least one environment".into(),
            ));
        }

        Ok(())
    }
}

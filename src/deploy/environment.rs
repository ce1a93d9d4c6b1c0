//! Target environment selection and safety guards.

use crate::config::ProjectSettings;

use super::DeployError;

/// Name of the environment that destructive tasks refuse to touch.
pub const PRODUCTION: &str = "production";

/// A validated deployment target taken from `host_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: String,
    pub hosts: Vec<String>,
    /// Branch expected to be checked out on these hosts.
    pub default_branch: String,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        self.name == PRODUCTION
    }

    /// Fails for production. Guards `deploy_clean`, `clean_db` and remote tests.
    pub fn ensure_not_production(&self, action: &'static str) -> Result<(), DeployError> {
        if self.is_production() {
            return Err(DeployError::ProductionRefused(action));
        }
        Ok(())
    }
}

impl ProjectSettings {
    /// Looks up `name` among the environments in `host_list`.
    pub fn environment(&self, name: &str) -> Result<Environment, DeployError> {
        let hosts = self
            .host_list
            .get(name)
            .ok_or_else(|| DeployError::UnknownEnvironment {
                name: name.to_string(),
                valid: self.valid_envs().collect::<Vec<_>>().join(", "),
            })?;

        Ok(Environment {
            name: name.to_string(),
            hosts: hosts.clone(),
            default_branch: self.default_branch_for(name).to_string(),
        })
    }
}

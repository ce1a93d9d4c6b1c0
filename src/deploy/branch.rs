//! Deciding which git branch a deploy should use on the server.

use std::fmt;

use super::DeployError;

/// What git reports on the server and locally before a deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchState {
    /// `git rev-parse --abbrev-ref HEAD` on the server; `HEAD` when detached.
    pub server_branch: String,
    /// `git rev-parse HEAD` on the server.
    pub server_commit: String,
    /// `git rev-parse --abbrev-ref HEAD` in the local checkout.
    pub local_branch: String,
    /// Default branch of the target environment.
    pub default_branch: String,
}

/// Outcome of comparing the branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchDecision {
    /// Server, local and default branch agree.
    UseBranch(String),
    /// The operator has to pick a branch.
    Mismatch(BranchMismatch),
}

/// Details shown to the operator when branches disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchMismatch {
    pub state: BranchState,
    pub available: Vec<String>,
}

impl BranchState {
    pub fn is_detached(&self) -> bool {
        self.server_branch == "HEAD"
    }

    /// Compare against the remote branch listing (`git branch -r`).
    pub fn decide(self, remote_listing: &str) -> BranchDecision {
        if self.server_branch == self.local_branch && self.local_branch == self.default_branch {
            return BranchDecision::UseBranch(self.server_branch);
        }

        BranchDecision::Mismatch(BranchMismatch {
            available: parse_remote_branches(remote_listing),
            state: self,
        })
    }
}

impl BranchMismatch {
    /// Resolve the operator's answer; empty means the default branch.
    pub fn choose(&self, answer: &str) -> Result<String, DeployError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(self.state.default_branch.clone());
        }

        self.available
            .iter()
            .find(|b| *b == answer)
            .cloned()
            .ok_or_else(|| DeployError::UnknownBranch(answer.to_string()))
    }
}

impl fmt::Display for BranchMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = &self.state;
        if state.is_detached() {
            writeln!(f, "The server git repository is not on a branch")?;
        }
        writeln!(f, "Branch mismatch found:")?;
        writeln!(f, "* {} is the default branch for this server", state.default_branch)?;
        if state.is_detached() {
            writeln!(f, "* {} is the commit checked out on the server.", state.server_commit)?;
        } else {
            writeln!(
                f,
                "* {} is the branch currently checked out on the server",
                state.server_branch
            )?;
        }
        writeln!(f, "* {} is the current branch of your local git repo", state.local_branch)?;
        writeln!(f)?;
        writeln!(f, "Available branches are:")?;
        for branch in &self.available {
            writeln!(f, "* {}", branch)?;
        }
        Ok(())
    }
}

/// Branch names from `git branch -r`, skipping the `HEAD` pointer line.
pub fn parse_remote_branches(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.contains("HEAD"))
        .filter_map(|line| line.rsplit('/').next())
        .map(|name| name.trim().to_string())
        .collect()
}

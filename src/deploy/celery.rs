//! Celery init script and defaults file placement.

use std::fmt;
use std::path::{Path, PathBuf};

/// Celery daemons installed per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeleryDaemon {
    Beat,
    Worker,
}

impl CeleryDaemon {
    pub const ALL: [CeleryDaemon; 2] = [CeleryDaemon::Beat, CeleryDaemon::Worker];

    /// Command name used for the init script.
    pub fn command(&self) -> &'static str {
        match self {
            CeleryDaemon::Beat => "celerybeat",
            CeleryDaemon::Worker => "celeryd",
        }
    }
}

impl fmt::Display for CeleryDaemon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// Where one daemon's files come from and go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeleryInstall {
    pub daemon: CeleryDaemon,
    pub init_source: PathBuf,
    /// `/etc/init.d/<command>_<project>`
    pub init_script: PathBuf,
    pub config_source: PathBuf,
    /// `/etc/default/<command>_<project>`
    pub config_file: PathBuf,
    /// Script location used before scripts were suffixed with the project name.
    pub legacy_init_script: PathBuf,
    pub legacy_config_file: PathBuf,
}

impl CeleryInstall {
    pub fn new(daemon: CeleryDaemon, project_name: &str, vcs_root_dir: &Path) -> Self {
        let command = daemon.command();
        let installed = format!("{}_{}", command, project_name);

        Self {
            daemon,
            init_source: vcs_root_dir.join("celery").join("init").join(command),
            init_script: Path::new("/etc/init.d").join(&installed),
            config_source: vcs_root_dir.join("celery").join("config").join(command),
            config_file: Path::new("/etc/default").join(&installed),
            legacy_init_script: Path::new("/etc/init.d").join(command),
            legacy_config_file: Path::new("/etc/default").join(command),
        }
    }

    /// Installs for every daemon, beat first.
    pub fn all(project_name: &str, vcs_root_dir: &Path) -> Vec<Self> {
        CeleryDaemon::ALL
            .iter()
            .map(|daemon| Self::new(*daemon, project_name, vcs_root_dir))
            .collect()
    }

    /// Legacy files still present on the server, for cleanup after the relocation.
    pub fn stale_files(&self, exists: impl Fn(&Path) -> bool) -> Vec<&Path> {
        [&self.legacy_init_script, &self.legacy_config_file]
            .into_iter()
            .map(PathBuf::as_path)
            .filter(|p| exists(*p))
            .collect()
    }
}

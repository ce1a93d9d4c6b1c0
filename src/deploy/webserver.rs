//! Webserver conf file, init script and configtest naming per distribution.

use std::fmt;
use std::path::{Path, PathBuf};

use super::{DeployError, DeployLayout};

/// Distribution family of the target server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LinuxType {
    Redhat,
    Debian,
}

impl LinuxType {
    /// Checks the release marker files through `exists`.
    ///
    /// Redhat wins when both markers are present.
    pub fn detect(exists: impl Fn(&Path) -> bool) -> Result<Self, DeployError> {
        if exists(Path::new("/etc/redhat-release")) {
            Ok(LinuxType::Redhat)
        } else if exists(Path::new("/etc/debian_version")) {
            Ok(LinuxType::Debian)
        } else {
            Err(DeployError::UnknownLinuxType)
        }
    }
}

impl fmt::Display for LinuxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinuxType::Redhat => write!(f, "redhat"),
            LinuxType::Debian => write!(f, "debian"),
        }
    }
}

/// Names and paths for managing the project's vhost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebserverPlan {
    pub webserver: String,
    pub linux_type: LinuxType,
    /// Live conf path the webserver reads, e.g. `/etc/httpd/conf.d/shop_staging.conf`.
    pub conf_path: PathBuf,
    /// Debian `sites-enabled` link pointing at `conf_path`.
    pub enabled_link: Option<PathBuf>,
    /// Conf kept in the checkout for normal operation.
    pub vcs_conf: PathBuf,
    /// Conf kept in the checkout for the maintenance page.
    pub vcs_maintenance_conf: PathBuf,
    pub init_script: PathBuf,
    pub configtest: String,
}

impl WebserverPlan {
    /// Build the plan for `project_name` in `environment`.
    pub fn new(
        webserver: &str,
        linux_type: LinuxType,
        project_name: &str,
        environment: &str,
        layout: &DeployLayout,
    ) -> Result<Self, DeployError> {
        let (conf_dir, init_script, configtest) = match (webserver, linux_type) {
            ("apache", LinuxType::Redhat) => {
                ("/etc/httpd/conf.d", "/etc/init.d/httpd", "/usr/sbin/httpd -S")
            }
            ("apache", LinuxType::Debian) => (
                "/etc/apache2/sites-available",
                "/etc/init.d/apache2",
                "/usr/sbin/apache2ctl -S",
            ),
            _ => {
                return Err(DeployError::UnsupportedWebserver {
                    webserver: webserver.to_string(),
                    linux_type: linux_type.to_string(),
                });
            }
        };

        let conf_path =
            Path::new(conf_dir).join(format!("{}_{}.conf", project_name, environment));
        let enabled_link = (linux_type == LinuxType::Debian).then(|| {
            PathBuf::from(conf_path.to_string_lossy().replace("available", "enabled"))
        });

        let vcs_stub = layout.vcs_root_dir.join(webserver);

        Ok(Self {
            webserver: webserver.to_string(),
            linux_type,
            conf_path,
            enabled_link,
            vcs_conf: vcs_stub.join(format!("{}.conf", environment)),
            vcs_maintenance_conf: vcs_stub.join(format!("{}-maintenance.conf", environment)),
            init_script: PathBuf::from(init_script),
            configtest: configtest.to_string(),
        })
    }

    /// Init script invocation for `action` (`start`, `stop`, `reload`, `restart`).
    pub fn command(&self, action: &str) -> String {
        format!("{} {}", self.init_script.display(), action)
    }

    /// Conf to link in: the maintenance conf if requested and present, else the live one.
    ///
    /// `Ok(None)` means there is no maintenance conf, so the vhost just stays unlinked.
    pub fn conf_to_link(
        &self,
        maintenance: bool,
        exists: impl Fn(&Path) -> bool,
    ) -> Result<Option<&Path>, DeployError> {
        if maintenance {
            let conf = self.vcs_maintenance_conf.as_path();
            return Ok(exists(conf).then_some(conf));
        }

        if !exists(self.vcs_conf.as_path()) {
            return Err(DeployError::MissingWebserverConf {
                webserver: self.webserver.clone(),
                expected: self.vcs_conf.display().to_string(),
            });
        }
        Ok(Some(self.vcs_conf.as_path()))
    }
}

//! Server-side directory layout derived from project settings.

use std::path::{Path, PathBuf};

use crate::config::{ProjectSettings, ProjectType};

/// Paths specific to django projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DjangoLayout {
    pub relative_django_dir: PathBuf,
    pub relative_django_settings_dir: PathBuf,
    pub relative_ve_dir: PathBuf,
    pub django_dir: PathBuf,
    pub django_settings_dir: PathBuf,
    pub ve_dir: PathBuf,
    pub manage_py: PathBuf,
}

/// Every path the deploy tasks work with on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployLayout {
    pub server_project_home: PathBuf,
    /// Checkout currently served.
    pub vcs_root_dir: PathBuf,
    /// Parent of the timestamped rollback copies.
    pub prev_root: PathBuf,
    /// Staging copy updated while the site stays up.
    pub next_dir: PathBuf,
    pub dump_dir: PathBuf,
    pub deploy_dir: PathBuf,
    /// Python settings module, e.g. `shop.settings`.
    pub settings_module: String,
    pub tasks_bin: PathBuf,
    pub local_tasks_bin: PathBuf,
    pub wsgi_handler: PathBuf,
    pub django: Option<DjangoLayout>,
}

impl DeployLayout {
    /// Derive the layout, honouring any `paths` overrides.
    ///
    /// `deploydir` is the local `DEPLOYDIR`; without it (and without a
    /// `local_tasks_bin` override) `tasks.py` is looked up in `./deploy`.
    pub fn resolve(project: &ProjectSettings, deploydir: Option<&Path>) -> Self {
        let paths = &project.paths;

        let server_project_home = paths
            .server_project_home
            .clone()
            .unwrap_or_else(|| project.server_home.join(&project.project_name));
        let vcs_root_dir = paths
            .vcs_root_dir
            .clone()
            .unwrap_or_else(|| server_project_home.join("dev"));
        let prev_root = paths
            .prev_root
            .clone()
            .unwrap_or_else(|| server_project_home.join("previous"));
        let next_dir = paths
            .next_dir
            .clone()
            .unwrap_or_else(|| server_project_home.join("next"));
        let dump_dir = paths
            .dump_dir
            .clone()
            .unwrap_or_else(|| server_project_home.join("dbdumps"));
        let deploy_dir = paths
            .deploy_dir
            .clone()
            .unwrap_or_else(|| vcs_root_dir.join("deploy"));
        let settings_module = paths
            .settings
            .clone()
            .unwrap_or_else(|| format!("{}.settings", project.project_name));

        let tasks_bin = paths
            .tasks_bin
            .clone()
            .unwrap_or_else(|| deploy_dir.join("tasks.py"));
        let local_tasks_bin = paths.local_tasks_bin.clone().unwrap_or_else(|| match deploydir {
            Some(dir) => dir.join("tasks.py"),
            None => Path::new("deploy").join("tasks.py"),
        });

        let django = (project.project_type == ProjectType::Django)
            .then(|| django_layout(project, &vcs_root_dir));

        Self {
            tasks_bin,
            wsgi_handler: vcs_root_dir.join("wsgi").join("wsgi_handler.py"),
            server_project_home,
            vcs_root_dir,
            prev_root,
            next_dir,
            dump_dir,
            deploy_dir,
            settings_module,
            local_tasks_bin,
            django,
        }
    }

    /// Checkout root to update: the `next` copy during a deploy, else the live one.
    pub fn checkout_dir(&self, in_next: bool) -> &Path {
        if in_next {
            self.next_dir.as_path()
        } else {
            self.vcs_root_dir.as_path()
        }
    }

    /// `bootstrap.py` that builds the deploy virtualenv.
    pub fn bootstrap_script(&self, in_next: bool) -> PathBuf {
        if in_next {
            self.next_dir.join("deploy").join("bootstrap.py")
        } else {
            self.deploy_dir.join("bootstrap.py")
        }
    }
}

fn django_layout(project: &ProjectSettings, vcs_root_dir: &Path) -> DjangoLayout {
    let paths = &project.paths;

    let relative_django_dir = paths
        .relative_django_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&project.project_name));
    let relative_django_settings_dir = paths
        .relative_django_settings_dir
        .clone()
        .unwrap_or_else(|| relative_django_dir.clone());
    let relative_ve_dir = paths
        .relative_ve_dir
        .clone()
        .unwrap_or_else(|| relative_django_dir.join(".ve"));

    let django_dir = paths
        .django_dir
        .clone()
        .unwrap_or_else(|| vcs_root_dir.join(&relative_django_dir));
    let django_settings_dir = paths
        .django_settings_dir
        .clone()
        .unwrap_or_else(|| vcs_root_dir.join(&relative_django_settings_dir));
    let ve_dir = paths
        .ve_dir
        .clone()
        .unwrap_or_else(|| vcs_root_dir.join(&relative_ve_dir));
    let manage_py = paths
        .manage_py
        .clone()
        .unwrap_or_else(|| django_dir.join("manage.py"));

    DjangoLayout {
        relative_django_dir,
        relative_django_settings_dir,
        relative_ve_dir,
        django_dir,
        django_settings_dir,
        ve_dir,
        manage_py,
    }
}

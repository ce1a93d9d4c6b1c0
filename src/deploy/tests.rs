//! Tests for deploy planning.

use super::*;
use crate::config::ProjectSettings;
use chrono::{Local, NaiveDate, TimeZone};
use std::path::{Path, PathBuf};

fn project() -> ProjectSettings {
    ProjectSettings::from_yaml(
        r#"
project_name: shop
project_type: django
server_home: /var/django
repo_type: git
repository: git@example.org:shop.git
webserver: apache
host_list:
  staging: [stage.example.org]
  production: [www1.example.org]
"#,
    )
    .unwrap()
}

fn layout() -> DeployLayout {
    DeployLayout::resolve(&project(), None)
}

// ==================== Environment tests ====================

#[test]
fn test_environment_lookup() {
    let env = project().environment("staging").unwrap();
    assert_eq!(env.hosts, vec!["stage.example.org".to_string()]);
    assert_eq!(env.default_branch, "master");
    assert!(!env.is_production());
    assert!(env.ensure_not_production("clean_db").is_ok());
}

#[test]
fn test_environment_unknown() {
    let err = project().environment("qa").unwrap_err();
    match err {
        DeployError::UnknownEnvironment { name, valid } => {
            assert_eq!(name, "qa");
            assert_eq!(valid, "production, staging");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_production_refuses_destructive_actions() {
    let env = project().environment(PRODUCTION).unwrap();
    let err = env.ensure_not_production("deploy_clean").unwrap_err();
    assert!(err.to_string().contains("deploy_clean"));
}

// ==================== Layout tests ====================

#[test]
fn test_layout_defaults() {
    let layout = layout();

    assert_eq!(layout.server_project_home, PathBuf::from("/var/django/shop"));
    assert_eq!(layout.vcs_root_dir, PathBuf::from("/var/django/shop/dev"));
    assert_eq!(layout.prev_root, PathBuf::from("/var/django/shop/previous"));
    assert_eq!(layout.next_dir, PathBuf::from("/var/django/shop/next"));
    assert_eq!(layout.dump_dir, PathBuf::from("/var/django/shop/dbdumps"));
    assert_eq!(layout.deploy_dir, PathBuf::from("/var/django/shop/dev/deploy"));
    assert_eq!(layout.tasks_bin, PathBuf::from("/var/django/shop/dev/deploy/tasks.py"));
    assert_eq!(layout.local_tasks_bin, PathBuf::from("deploy/tasks.py"));
    assert_eq!(
        layout.wsgi_handler,
        PathBuf::from("/var/django/shop/dev/wsgi/wsgi_handler.py")
    );
    assert_eq!(layout.settings_module, "shop.settings");
}

#[test]
fn test_layout_django_paths() {
    let django = layout().django.unwrap();

    assert_eq!(django.relative_django_dir, PathBuf::from("shop"));
    assert_eq!(django.relative_ve_dir, PathBuf::from("shop/.ve"));
    assert_eq!(django.django_dir, PathBuf::from("/var/django/shop/dev/shop"));
    assert_eq!(django.django_settings_dir, PathBuf::from("/var/django/shop/dev/shop"));
    assert_eq!(django.ve_dir, PathBuf::from("/var/django/shop/dev/shop/.ve"));
    assert_eq!(django.manage_py, PathBuf::from("/var/django/shop/dev/shop/manage.py"));
}

#[test]
fn test_layout_non_django_has_no_django_paths() {
    let mut project = project();
    project.project_type = crate::config::ProjectType::Other;
    assert!(DeployLayout::resolve(&project, None).django.is_none());
}

#[test]
fn test_layout_override_propagates() {
    let mut project = project();
    project.paths.vcs_root_dir = Some(PathBuf::from("/srv/shop/current"));
    project.paths.relative_django_dir = Some(PathBuf::from("django/shop"));

    let layout = DeployLayout::resolve(&project, Some(Path::new("/home/me/shop/deploy")));

    assert_eq!(layout.deploy_dir, PathBuf::from("/srv/shop/current/deploy"));
    assert_eq!(layout.prev_root, PathBuf::from("/var/django/shop/previous"));
    assert_eq!(layout.local_tasks_bin, PathBuf::from("/home/me/shop/deploy/tasks.py"));

    let django = layout.django.unwrap();
    assert_eq!(django.django_dir, PathBuf::from("/srv/shop/current/django/shop"));
    assert_eq!(django.relative_django_settings_dir, PathBuf::from("django/shop"));
}

#[test]
fn test_layout_tasks_bin_overrides() {
    let mut project = project();
    project.paths.tasks_bin = Some(PathBuf::from("/opt/dye/bin/tasks.py"));
    project.paths.local_tasks_bin = Some(PathBuf::from("tools/tasks.py"));

    let layout = DeployLayout::resolve(&project, Some(Path::new("/home/me/shop/deploy")));

    assert_eq!(layout.tasks_bin, PathBuf::from("/opt/dye/bin/tasks.py"));
    assert_eq!(layout.local_tasks_bin, PathBuf::from("tools/tasks.py"));
}

#[test]
fn test_layout_tasks_bin_defaults() {
    let layout = layout();
    assert_eq!(layout.tasks_bin, PathBuf::from("/var/django/shop/dev/deploy/tasks.py"));
    assert_eq!(layout.local_tasks_bin, PathBuf::from("deploy/tasks.py"));
}

#[test]
fn test_layout_checkout_dir_and_bootstrap() {
    let layout = layout();

    assert_eq!(layout.checkout_dir(true), Path::new("/var/django/shop/next"));
    assert_eq!(layout.checkout_dir(false), Path::new("/var/django/shop/dev"));
    assert_eq!(
        layout.bootstrap_script(true),
        PathBuf::from("/var/django/shop/next/deploy/bootstrap.py")
    );
}

// ==================== Webserver tests ====================

#[test]
fn test_detect_linux_type() {
    let redhat = LinuxType::detect(|p| p == Path::new("/etc/redhat-release")).unwrap();
    assert_eq!(redhat, LinuxType::Redhat);

    let debian = LinuxType::detect(|p| p == Path::new("/etc/debian_version")).unwrap();
    assert_eq!(debian, LinuxType::Debian);

    assert!(matches!(
        LinuxType::detect(|_| false),
        Err(DeployError::UnknownLinuxType)
    ));
}

#[test]
fn test_apache_redhat_plan() {
    let plan = WebserverPlan::new("apache", LinuxType::Redhat, "shop", "staging", &layout())
        .unwrap();

    assert_eq!(plan.conf_path, PathBuf::from("/etc/httpd/conf.d/shop_staging.conf"));
    assert_eq!(plan.enabled_link, None);
    assert_eq!(plan.command("reload"), "/etc/init.d/httpd reload");
    assert_eq!(plan.configtest, "/usr/sbin/httpd -S");
    assert_eq!(
        plan.vcs_conf,
        PathBuf::from("/var/django/shop/dev/apache/staging.conf")
    );
}

#[test]
fn test_apache_debian_plan_has_enabled_link() {
    let plan = WebserverPlan::new("apache", LinuxType::Debian, "shop", "production", &layout())
        .unwrap();

    assert_eq!(
        plan.conf_path,
        PathBuf::from("/etc/apache2/sites-available/shop_production.conf")
    );
    assert_eq!(
        plan.enabled_link,
        Some(PathBuf::from("/etc/apache2/sites-enabled/shop_production.conf"))
    );
    assert_eq!(plan.command("stop"), "/etc/init.d/apache2 stop");
}

#[test]
fn test_unsupported_webserver() {
    let result = WebserverPlan::new("nginx", LinuxType::Debian, "shop", "staging", &layout());
    assert!(matches!(
        result,
        Err(DeployError::UnsupportedWebserver { .. })
    ));
}

#[test]
fn test_conf_to_link() {
    let plan = WebserverPlan::new("apache", LinuxType::Redhat, "shop", "staging", &layout())
        .unwrap();

    // No maintenance conf: leave the vhost unlinked
    assert_eq!(plan.conf_to_link(true, |_| false).unwrap(), None);
    assert_eq!(
        plan.conf_to_link(true, |_| true).unwrap(),
        Some(plan.vcs_maintenance_conf.as_path())
    );
    assert_eq!(
        plan.conf_to_link(false, |_| true).unwrap(),
        Some(plan.vcs_conf.as_path())
    );
    assert!(matches!(
        plan.conf_to_link(false, |_| false),
        Err(DeployError::MissingWebserverConf { .. })
    ));
}

// ==================== Celery tests ====================

#[test]
fn test_celery_install_paths() {
    let layout = layout();
    let installs = CeleryInstall::all("shop", &layout.vcs_root_dir);

    assert_eq!(installs.len(), 2);
    let beat = &installs[0];
    assert_eq!(beat.daemon, CeleryDaemon::Beat);
    assert_eq!(
        beat.init_source,
        PathBuf::from("/var/django/shop/dev/celery/init/celerybeat")
    );
    assert_eq!(beat.init_script, PathBuf::from("/etc/init.d/celerybeat_shop"));
    assert_eq!(beat.config_file, PathBuf::from("/etc/default/celerybeat_shop"));

    let worker = &installs[1];
    assert_eq!(worker.init_script, PathBuf::from("/etc/init.d/celeryd_shop"));
    assert_eq!(
        worker.config_source,
        PathBuf::from("/var/django/shop/dev/celery/config/celeryd")
    );
}

#[test]
fn test_celery_stale_files() {
    let install = CeleryInstall::new(CeleryDaemon::Worker, "shop", Path::new("/srv/shop"));
    let stale = install.stale_files(|p| p == Path::new("/etc/init.d/celeryd"));
    assert_eq!(stale, vec![Path::new("/etc/init.d/celeryd")]);
}

// ==================== Rollback tests ====================

#[test]
fn test_version_dir_name() {
    let at = NaiveDate::from_ymd_opt(2013, 4, 9)
        .unwrap()
        .and_hms_opt(14, 5, 3)
        .unwrap();
    let name = version_dir_name(at);

    assert_eq!(name, "2013-04-09_14-05-03");
    assert!(is_version_dir(&name));
    assert!(!is_version_dir("lost+found"));
}

#[test]
fn test_versions_to_delete_keeps_newest() {
    let listing = "2013-01-03_10-00-00\n2013-01-01_10-00-00\n\n2013-01-02_10-00-00\n";
    let doomed = versions_to_delete(listing.lines(), Some(2), None);
    assert_eq!(doomed, vec!["2013-01-01_10-00-00"]);
}

#[test]
fn test_versions_to_delete_defaults() {
    let listing: Vec<String> = (1..=7).map(|d| format!("2013-01-0{}_10-00-00", d)).collect();
    let refs = listing.iter().map(String::as_str);

    let doomed = versions_to_delete(refs.clone(), None, None);
    assert_eq!(doomed, vec!["2013-01-01_10-00-00", "2013-01-02_10-00-00"]);

    let doomed = versions_to_delete(refs, None, Some(6));
    assert_eq!(doomed, vec!["2013-01-01_10-00-00"]);
}

#[test]
fn test_versions_to_delete_zero_keeps_all() {
    let doomed = versions_to_delete(["2013-01-01_10-00-00"], Some(0), Some(1));
    assert!(doomed.is_empty());
}

#[test]
fn test_versions_to_delete_fewer_than_keep() {
    let doomed = versions_to_delete(["2013-01-01_10-00-00"], Some(5), None);
    assert!(doomed.is_empty());
}

#[test]
fn test_select_version() {
    let listing = ["2013-01-02_10-00-00", "2013-01-01_10-00-00"];

    assert_eq!(select_version(listing, "last").unwrap(), "2013-01-02_10-00-00");
    assert_eq!(
        select_version(listing, "2013-01-01_10-00-00").unwrap(),
        "2013-01-01_10-00-00"
    );
    assert!(matches!(
        select_version(listing, "2012-12-31_10-00-00"),
        Err(DeployError::UnknownVersion(_))
    ));
    assert!(matches!(
        select_version([], "last"),
        Err(DeployError::NoPreviousVersions)
    ));
}

#[test]
fn test_version_listing_ignores_other_entries() {
    let listing = ["2013-01-01_10-00-00", "2013-01-02_10-00-00", "lost+found", ".keep"];

    assert_eq!(
        sorted_versions(listing),
        vec!["2013-01-01_10-00-00", "2013-01-02_10-00-00"]
    );
    assert_eq!(select_version(listing, "last").unwrap(), "2013-01-02_10-00-00");
    assert_eq!(
        versions_to_delete(listing, Some(1), None),
        vec!["2013-01-01_10-00-00"]
    );
    assert!(matches!(
        select_version(listing, "lost+found"),
        Err(DeployError::UnknownVersion(_))
    ));
    assert!(matches!(
        select_version(["lost+found"], "last"),
        Err(DeployError::NoPreviousVersions)
    ));
}

#[test]
fn test_rollback_options() {
    assert!(RollbackOptions::default().validate().is_ok());
    assert!(RollbackOptions { migrate: false, restore_db: true }.validate().is_ok());
    assert!(matches!(
        RollbackOptions { migrate: true, restore_db: true }.validate(),
        Err(DeployError::ConflictingRollbackOptions)
    ));
    assert!(matches!(
        RollbackOptions { migrate: true, restore_db: false }.validate(),
        Err(DeployError::MigrateUnsupported)
    ));
}

#[test]
fn test_downtime_report() {
    let started = Local.with_ymd_and_hms(2013, 4, 9, 14, 5, 3).unwrap();
    let finished = started + chrono::Duration::milliseconds(12_340);
    let downtime = Downtime::new(started, finished);

    assert!((downtime.seconds() - 12.34).abs() < 1e-9);
    let report = downtime.to_string();
    assert!(report.starts_with("Downtime lasted for 12.3 seconds\n"));
    assert!(report.contains("2013-04-09 14:05:03"));
}

// ==================== Branch tests ====================

fn branch_state(server: &str, local: &str, default: &str) -> BranchState {
    BranchState {
        server_branch: server.to_string(),
        server_commit: "3f2a9c1".to_string(),
        local_branch: local.to_string(),
        default_branch: default.to_string(),
    }
}

const REMOTE: &str = "  origin/HEAD -> origin/master\n  origin/develop\n  origin/master\n";

#[test]
fn test_parse_remote_branches() {
    assert_eq!(parse_remote_branches(REMOTE), vec!["develop", "master"]);
}

#[test]
fn test_branches_agree() {
    let decision = branch_state("master", "master", "master").decide(REMOTE);
    assert_eq!(decision, BranchDecision::UseBranch("master".to_string()));
}

#[test]
fn test_branch_mismatch_choice() {
    let decision = branch_state("master", "develop", "master").decide(REMOTE);
    let BranchDecision::Mismatch(mismatch) = decision else {
        panic!("expected mismatch");
    };

    assert_eq!(mismatch.choose("").unwrap(), "master");
    assert_eq!(mismatch.choose(" develop ").unwrap(), "develop");
    assert!(matches!(
        mismatch.choose("feature"),
        Err(DeployError::UnknownBranch(_))
    ));

    let shown = mismatch.to_string();
    assert!(shown.contains("* master is the branch currently checked out on the server"));
    assert!(shown.contains("* develop is the current branch of your local git repo"));
}

#[test]
fn test_detached_server_mismatch() {
    let decision = branch_state("HEAD", "master", "master").decide(REMOTE);
    let BranchDecision::Mismatch(mismatch) = decision else {
        panic!("expected mismatch");
    };

    let shown = mismatch.to_string();
    assert!(shown.starts_with("The server git repository is not on a branch"));
    assert!(shown.contains("* 3f2a9c1 is the commit checked out on the server."));
}

// ==================== Command tests ====================

fn no_python26(p: &Path) -> bool {
    p != Path::new("/usr/bin/python2.6")
}

#[test]
fn test_python_bin() {
    assert_eq!(python_bin(|_| true), PathBuf::from("/usr/bin/python2.6"));
    assert_eq!(python_bin(no_python26), PathBuf::from("/usr/bin/python"));
}

#[test]
fn test_tasks_command_uses_sudo_by_default() {
    let cmd = tasks_command(&project(), &layout(), "deploy:staging", false);

    assert!(cmd.sudo);
    assert_eq!(cmd.command, "/var/django/shop/dev/deploy/tasks.py deploy:staging");
    assert_eq!(
        cmd.to_string(),
        "sudo /var/django/shop/dev/deploy/tasks.py deploy:staging"
    );
}

#[test]
fn test_tasks_command_verbose_and_plain_run() {
    let mut project = project();
    project.use_sudo = false;

    let cmd = tasks_command(&project, &layout(), "update_ve", true);
    assert!(!cmd.sudo);
    assert_eq!(cmd.to_string(), "/var/django/shop/dev/deploy/tasks.py -v update_ve");

    project.verbose = true;
    let cmd = tasks_command(&project, &layout(), "clean_db", false);
    assert_eq!(cmd.command, "/var/django/shop/dev/deploy/tasks.py -v clean_db");
}

#[test]
fn test_use_sudo_and_verbose_from_yaml() {
    let project = ProjectSettings::from_yaml(
        r#"
project_name: shop
project_type: django
server_home: /var/django
repo_type: git
repository: git@example.org:shop.git
host_list:
  staging: [stage.example.org]
use_sudo: false
verbose: true
"#,
    )
    .unwrap();

    let layout = DeployLayout::resolve(&project, None);
    let cmd = tasks_command(&project, &layout, "dump_db", false);
    assert_eq!(cmd.to_string(), "/var/django/shop/dev/deploy/tasks.py -v dump_db");
}

#[test]
fn test_bootstrap_command() {
    let cmd = bootstrap_command(&project(), &layout(), true, no_python26);
    assert_eq!(
        cmd.command,
        "/usr/bin/python /var/django/shop/next/deploy/bootstrap.py --full-rebuild --quiet"
    );
}

#[test]
fn test_remote_test_command() {
    let mut project = project();
    project.test_cmd = Some("manage.py test shop".to_string());
    let env = project.environment("staging").unwrap();

    let cmd = remote_test_command(&project, &layout(), &env, no_python26).unwrap();

    assert_eq!(cmd.command, "/usr/bin/python manage.py test shop");
    assert_eq!(cmd.cwd, Some(PathBuf::from("/var/django/shop/dev/shop")));
    assert_eq!(
        cmd.to_string(),
        "cd /var/django/shop/dev/shop && sudo /usr/bin/python manage.py test shop"
    );
}

#[test]
fn test_remote_test_refused_on_production() {
    let mut project = project();
    project.test_cmd = Some("manage.py test".to_string());
    let env = project.environment(PRODUCTION).unwrap();

    let err = remote_test_command(&project, &layout(), &env, |_| true).unwrap_err();
    assert!(matches!(err, DeployError::ProductionRefused(_)));
}

#[test]
fn test_remote_test_needs_test_cmd() {
    let project = project();
    let env = project.environment("staging").unwrap();

    let err = remote_test_command(&project, &layout(), &env, |_| true).unwrap_err();
    assert!(matches!(err, DeployError::MissingSetting("test_cmd")));
}

#[test]
fn test_local_changes_command() {
    let project = project();
    let layout = layout();
    let git_marker = |p: &Path| p == Path::new("/var/django/shop/dev/.git");

    let cmd = local_changes_command(&project, &layout, git_marker).unwrap();
    assert_eq!(cmd.to_string(), "cd /var/django/shop/dev && sudo git status --short");

    assert!(local_changes_command(&project, &layout, |_| false).is_none());
}

#[test]
fn test_local_changes_command_per_repo_type() {
    let mut project = project();
    let layout = layout();

    project.repo_type = crate::config::RepoType::Svn;
    let cmd = local_changes_command(&project, &layout, |_| true).unwrap();
    assert_eq!(cmd.command, "svn status --quiet");

    project.repo_type = crate::config::RepoType::Cvs;
    assert!(local_changes_command(&project, &layout, |_| true).is_none());
}

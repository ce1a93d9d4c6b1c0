use chrono::NaiveDate;
use clap::Parser;
use dye::cli::{Cli, Commands, LogLevel};
use dye::config::{EnvSecretResolver, PrivateSettings, ProjectSettings, SecretResolver, Settings};
use dye::deploy::{
    CeleryInstall, DeployLayout, LinuxType, WebserverPlan, remote_test_command, tasks_command,
    versions_to_delete,
};
use dye::migration::{MigrationLog, tracked_names};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{env, fs};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing(log_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_filter()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let result = match cli.command {
        Commands::Settings { config, secrets } => show_settings(&config, &secrets),
        Commands::Layout {
            project,
            env,
            linux,
        } => show_layout(&project, &env, linux),
        Commands::Tasks {
            project,
            env,
            verbose,
            args,
        } => show_tasks(&project, &env, verbose, &args),
        Commands::RemoteTest {
            project,
            env,
            python26,
        } => show_remote_test(&project, &env, python26),
        Commands::Migrations { log, since, check } => {
            show_migrations(&log, since, check.as_deref())
        }
        Commands::Prune { project, keep } => show_prune(&project, keep),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn deploydir() -> Option<PathBuf> {
    env::var_os("DEPLOYDIR").map(PathBuf::from)
}

/// Load the settings record and log a summary without the password.
fn show_settings(path: &str, secrets: &str) -> CommandResult {
    let secrets: Box<dyn SecretResolver> = match secrets {
        "env" => Box::new(EnvSecretResolver::with_dotenv()),
        private => Box::new(PrivateSettings::new(private)),
    };

    let settings = Settings::load(path, secrets.as_ref())?;
    let db = settings.database();

    info!(
        config = %path,
        debug = settings.debug_flags().debug(),
        template_debug = settings.debug_flags().template_debug(),
        email_host = %settings.email_host(),
        "Settings loaded"
    );
    info!(
        engine = %db.engine(),
        name = %db.name(),
        user = %db.user(),
        host = %db.host(),
        port = ?db.port(),
        options = ?db.options(),
        "Database configured"
    );
    Ok(())
}

/// Print the server paths for one environment.
fn show_layout(path: &str, env_name: &str, linux: Option<LinuxType>) -> CommandResult {
    let project = ProjectSettings::load(path)?;
    let environment = project.environment(env_name)?;

    let deploydir = deploydir();
    let layout = DeployLayout::resolve(&project, deploydir.as_deref());
    debug!(project = %project.project_name, env = %environment.name, "Resolved layout");

    println!("environment          {}", environment.name);
    println!("hosts                {}", environment.hosts.join(", "));
    println!("default_branch       {}", environment.default_branch);
    println!("server_project_home  {}", layout.server_project_home.display());
    println!("vcs_root_dir         {}", layout.vcs_root_dir.display());
    println!("next_dir             {}", layout.next_dir.display());
    println!("prev_root            {}", layout.prev_root.display());
    println!("dump_dir             {}", layout.dump_dir.display());
    println!("deploy_dir           {}", layout.deploy_dir.display());
    println!("tasks_bin            {}", layout.tasks_bin.display());
    println!("local_tasks_bin      {}", layout.local_tasks_bin.display());
    println!("settings             {}", layout.settings_module);

    if let Some(django) = &layout.django {
        println!("django_dir           {}", django.django_dir.display());
        println!("django_settings_dir  {}", django.django_settings_dir.display());
        println!("ve_dir               {}", django.ve_dir.display());
        println!("manage_py            {}", django.manage_py.display());

        for install in CeleryInstall::all(&project.project_name, &layout.vcs_root_dir) {
            println!("{:<20} {}", install.daemon.command(), install.init_script.display());
        }
    }

    if let Some(webserver) = &project.webserver {
        match linux {
            Some(linux_type) => {
                let plan = WebserverPlan::new(
                    webserver,
                    linux_type,
                    &project.project_name,
                    &environment.name,
                    &layout,
                )?;
                println!("webserver_conf       {}", plan.conf_path.display());
                if let Some(link) = &plan.enabled_link {
                    println!("webserver_enabled    {}", link.display());
                }
                println!("webserver_init       {}", plan.init_script.display());
                println!("webserver_configtest {}", plan.configtest);
            }
            None => warn!(webserver = %webserver, "Pass --linux to include webserver paths"),
        }
    }

    Ok(())
}

/// Print the tasks.py command for one environment.
fn show_tasks(path: &str, env_name: &str, verbose: bool, args: &[String]) -> CommandResult {
    let project = ProjectSettings::load(path)?;
    let environment = project.environment(env_name)?;
    let layout = DeployLayout::resolve(&project, deploydir().as_deref());

    let command = tasks_command(&project, &layout, &args.join(" "), verbose);
    debug!(env = %environment.name, hosts = ?environment.hosts, "Planned tasks command");
    println!("{}", command);
    Ok(())
}

/// Print the test command for one environment.
fn show_remote_test(path: &str, env_name: &str, python26: bool) -> CommandResult {
    let project = ProjectSettings::load(path)?;
    let environment = project.environment(env_name)?;
    let layout = DeployLayout::resolve(&project, deploydir().as_deref());

    let has_python26 = |p: &Path| python26 && p == Path::new("/usr/bin/python2.6");
    let command = remote_test_command(&project, &layout, &environment, has_python26)?;
    println!("{}", command);
    Ok(())
}

/// Print the migration log and flag stale names in a tracked file.
fn show_migrations(path: &str, since: Option<NaiveDate>, check: Option<&str>) -> CommandResult {
    let log = MigrationLog::load(path)?;

    let entries: Vec<_> = match since {
        Some(since) => log.since(since).collect(),
        None => log.entries().iter().collect(),
    };

    for entry in &entries {
        match &entry.commit {
            Some(commit) => println!("{} ({})", entry.date, commit),
            None => println!("{}", entry.date),
        }
        println!("  {}", entry.description);
        for rename in &entry.renames {
            println!("  {} -> {}", rename.from, rename.to);
        }
    }
    info!(log = %path, shown = entries.len(), total = log.len(), "Migration log read");

    if let Some(check) = check {
        let names = tracked_names(&fs::read_to_string(check)?)?;
        let stale = log.stale_names(names.iter().map(String::as_str));
        for hit in &stale {
            warn!(
                file = %check,
                name = %hit.name,
                replacement = %hit.replacement,
                since = %hit.entry.date,
                "Stale name, rename it"
            );
        }
        if !stale.is_empty() {
            return Err(format!("{} stale name(s) in {}", stale.len(), check).into());
        }
    }

    Ok(())
}

/// Print the rollback versions that a deploy would delete.
fn show_prune(path: &str, keep: Option<usize>) -> CommandResult {
    let project = ProjectSettings::load(path)?;

    let mut listing = String::new();
    io::stdin().read_to_string(&mut listing)?;

    let doomed = versions_to_delete(listing.lines(), keep, project.versions_to_keep);
    for version in &doomed {
        println!("{}", version);
    }
    info!(deleted = doomed.len(), "Rollback versions to delete");
    Ok(())
}

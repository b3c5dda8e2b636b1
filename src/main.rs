use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use action_update_checker::config::{self, CheckerConfig};
use action_update_checker::version::registries::github::github_repo;
use action_update_checker::version::{
    Dependency, Requirement, RequirementsToUnlock, UpdateChecker,
};

const LOG_ENV: &str = "ACTION_UPDATE_CHECKER_LOG";

#[derive(Parser)]
#[command(name = "action-update-checker")]
#[command(version, about = "Update checker for git-pinned workflow actions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether a pinned action has a newer version
    Check(CheckArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Repository URL of the action
    url: String,

    /// Pinned reference, once per declaration
    #[arg(long = "ref", required = true)]
    refs: Vec<String>,

    /// Dependency name (defaults to owner/repo of the URL)
    #[arg(long)]
    name: Option<String>,

    /// Workflow file the declarations live in
    #[arg(long, default_value = ".github/workflows/ci.yml")]
    file: PathBuf,

    /// Commit the tag pointed at when it was pinned
    #[arg(long)]
    pinned_commit: Option<String>,

    /// Version constraint to ignore, e.g. ">= 5"
    #[arg(long = "ignore")]
    ignored_versions: Vec<String>,

    /// Fail when every version is ignored
    #[arg(long)]
    strict: bool,

    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    name: String,
    current_refs: Vec<String>,
    can_update: bool,
    latest_version: Option<String>,
    updated_requirements: Vec<Requirement>,
}

fn init_logging() -> anyhow::Result<WorkerGuard> {
    let dir = config::data_dir();
    std::fs::create_dir_all(&dir)?;

    let file_name = config::log_path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "action-update-checker.log".to_string());
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

async fn check(args: CheckArgs) -> anyhow::Result<Report> {
    let mut config = CheckerConfig::load(args.config.as_deref())?;
    if args.strict {
        config.update.raise_on_ignored = true;
    }

    let name = args
        .name
        .or_else(|| github_repo(&args.url))
        .unwrap_or_else(|| args.url.clone());

    let requirements = args
        .refs
        .iter()
        .map(|r| {
            Requirement::git(&args.url, r, &args.file).with_declaration(format!("{name}@{r}"))
        })
        .collect();
    let mut dependency = Dependency::new(&name, requirements);
    if let Some(commit) = args.pinned_commit {
        dependency = dependency.with_pinned_commit(commit);
    }

    let options = config.check_options(&name, &args.ignored_versions);
    let checker = UpdateChecker::new(dependency, options, config.collaborators())?;

    Ok(Report {
        name,
        current_refs: args.refs,
        can_update: checker.can_update(RequirementsToUnlock::Own).await?,
        latest_version: checker.latest_version().await?,
        updated_requirements: checker.updated_requirements().await?,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Command::Check(args) => {
            let report = runtime.block_on(check(args))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

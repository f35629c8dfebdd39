pub mod dashboard;
pub mod record;
pub mod status;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use dashboard::{open_dashboard, BrowserLauncher, SystemBrowser};
use record::{process_daily_command, process_track_post_command, DailyCommand, TrackPostCommand};
use status::process_status_command;
use tracing::{debug, info, level_filters::LevelFilter};

use crate::{
    config::WorkspaceConfig,
    store::{analytics::AnalyticsStorage, tasks::merge_task_lists},
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

const LOCK_FILES_HELP: &str = "Commands that write a file take a lock on a `<file>.lock` next to it, \
for example data/tasks.json.lock. The lock files are empty and safe to delete while no command is running.";

#[derive(Parser, Debug)]
#[command(name = "growthtrack", version, long_about = None)]
#[command(about = "Tracks daily outreach activity, post performance and strategy tasks", long_about = None)]
#[command(after_help = LOCK_FILES_HELP)]
pub struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Workspace root. By default $GROWTHTRACK_WORKSPACE or the current directory"
    )]
    workspace: Option<PathBuf>,
    #[arg(
        long = "task-category",
        global = true,
        help = "Only tasks whose category contains this text are counted by status"
    )]
    task_category: Option<String>,
    #[arg(long, global = true, help = "Print logs to stderr")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Show metrics and task counts")]
    Status,
    #[command(about = "Log today's outreach activity")]
    Daily {
        #[command(flatten)]
        command: DailyCommand,
    },
    #[command(about = "Weekly review (not implemented)")]
    Weekly,
    #[command(about = "Monthly review (not implemented)")]
    Monthly,
    #[command(about = "Record a new connection (not implemented)")]
    AddConnection,
    #[command(about = "Record how a post performed")]
    TrackPost {
        #[command(flatten)]
        command: TrackPostCommand,
    },
    #[command(about = "Print the raw analytics document")]
    Analytics,
    #[command(about = "Append the strategy tasks to the master task list")]
    Merge,
    #[command(about = "Open the dashboard in a browser")]
    Dashboard,
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(
        CLI_PREFIX,
        &create_application_default_path()?,
        logging_level,
        args.log,
    )?;

    run_command(args, &DefaultClock, &SystemBrowser).await
}

/// Executes already parsed arguments. Dates come from `clock`, the dashboard is opened through
/// `launcher`.
pub async fn run_command(
    args: Args,
    clock: &dyn Clock,
    launcher: &dyn BrowserLauncher,
) -> Result<()> {
    let mut config = WorkspaceConfig::resolve(args.workspace.as_deref())?;
    if let Some(category) = args.task_category {
        config = config.with_task_category(category);
    }
    debug!("Using workspace {:?}", config.root);

    let Some(command) = args.commands else {
        return print_help();
    };

    match command {
        Commands::Status => process_status_command(&config).await,
        Commands::Daily { command } => process_daily_command(command, &config, clock).await,
        Commands::TrackPost { command } => {
            process_track_post_command(command, &config, clock).await
        }
        Commands::Analytics => print_analytics(&config).await,
        Commands::Merge => process_merge_command(&config).await,
        Commands::Dashboard => {
            open_dashboard(&config.dashboard_path, launcher);
            Ok(())
        }
        other @ (Commands::Weekly | Commands::Monthly | Commands::AddConnection) => {
            info!("{other:?} has no handler, showing help");
            print_help()
        }
        Commands::Unknown(command) => {
            debug!("Unknown command {command:?}");
            print_help()
        }
    }
}

fn print_help() -> Result<()> {
    Args::command().print_help()?;
    Ok(())
}

async fn print_analytics(config: &WorkspaceConfig) -> Result<()> {
    let storage = AnalyticsStorage::new(config.analytics_path.clone());
    let Some(document) = storage.load_raw().await? else {
        bail!(
            "No analytics store at {:?}, log some activity first",
            storage.path()
        );
    };
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

async fn process_merge_command(config: &WorkspaceConfig) -> Result<()> {
    let report = merge_task_lists(&config.strategy_tasks_path, &config.master_tasks_path).await?;
    println!(
        "Merged {} strategy tasks into {} ({} tasks in total)",
        report.appended,
        config.master_tasks_path.display(),
        report.total
    );
    Ok(())
}

use crate::demo::{run_demo, DemoArgs};
use crate::watch::{run_watch, WatchArgs};
use clap::{Args, Parser, Subcommand};
use halalguard::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "HalalGuard Console",
    about = "Analyze transactions for sharia compliance and watch service health from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a JSON batch to the analysis service and print the verdicts
    Analyze(AnalyzeArgs),
    /// Fetch previously analyzed transactions from the service
    History,
    /// Poll service metrics and push notifications until interrupted
    Watch(WatchArgs),
    /// Run an offline end-to-end demo on the bundled sample dataset (default command)
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct AnalyzeArgs {
    /// Path to a JSON file holding a transaction array or a single object
    #[arg(long, conflicts_with = "json")]
    pub(crate) file: Option<PathBuf>,
    /// Inline JSON payload
    #[arg(long)]
    pub(crate) json: Option<String>,
    /// Append the formal audit report after the per-transaction verdicts
    #[arg(long)]
    pub(crate) report: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Analyze(args) => crate::demo::run_analyze(args).await,
        Command::History => crate::demo::run_history().await,
        Command::Watch(args) => run_watch(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

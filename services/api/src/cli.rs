use crate::demo::{run_backfill, run_demo, BackfillArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use leadscore::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lead Scoring Service",
    about = "Run and exercise the behavioral lead-scoring engine from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Replay an exported activity feed through a fresh engine
    Backfill(BackfillArgs),
    /// Run a scripted end-to-end scoring demo
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Backfill(args) => run_backfill(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

use crate::commands::{run_ask, run_plan, AskArgs, PlanArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use praxis::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "praxis",
    about = "Score vessel operations and ask the PRAXIS analyst from the command line",
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
    /// Score a dataset export and write prioritised results as CSV
    Plan(PlanArgs),
    /// Ask the analyst one or more questions about a dataset export
    Ask(AskArgs),
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
        Command::Plan(args) => run_plan(args),
        Command::Ask(args) => run_ask(args).await,
    }
}

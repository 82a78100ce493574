use crate::demo::{run_analyze, run_quote, AnalyzeArgs, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credpulse::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "CredPulse",
    about = "Run the CredPulse invoice factoring pipeline from the command line",
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
    /// Run the factoring workflow for a seeded demo invoice
    Analyze(AnalyzeArgs),
    /// Price a factoring offer without running the workflow
    Quote(QuoteArgs),
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
        Command::Analyze(args) => run_analyze(args).await,
        Command::Quote(args) => run_quote(args),
    }
}

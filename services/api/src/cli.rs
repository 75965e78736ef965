use crate::demo::{run_demo, DemoArgs};
use crate::server;
use childcare_ops::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Municipal Childcare Operations",
    about = "Run the municipal childcare operations service and its scheduled jobs from the command line",
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
    /// Income review scheduler utilities
    IncomeReview {
        #[command(subcommand)]
        command: IncomeReviewCommand,
    },
}

#[derive(Subcommand, Debug)]
enum IncomeReviewCommand {
    /// Run the scheduler against a seeded demonstration dataset
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
        Command::IncomeReview {
            command: IncomeReviewCommand::Demo(args),
        } => run_demo(args),
    }
}

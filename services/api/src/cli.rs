use clap::{Args, Parser, Subcommand};
use realty_catalog::error::AppError;

use crate::demo::{run_demo, DemoArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Ramos Realty Catalog",
    about = "Run the listing catalog service or exercise it from the command line",
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
    /// Run an end-to-end demo: seed a catalog, filter it, and submit a
    /// listing with a deliberately failing asset
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
    /// Seed the in-memory record store with sample listings
    #[arg(long)]
    pub(crate) seed: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;
mod session;

use cli::{Cli, Commands};
use output::OutputFormat;
use session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("binderkit=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        // Needs no document file
        Commands::Grids => commands::grids::run(format),
        command => {
            let mut session = Session::open(&cli.store).await?;
            commands::dispatch(&mut session, command, format).await
        }
    }
}

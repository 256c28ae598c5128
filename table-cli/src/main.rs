use clap::Parser;

use crate::cli::Cli;
use crate::commands::Commands;
pub use crate::error::AppError;

mod cli;
mod commands;
mod error;
mod script;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let args = Cli::parse();

    let result = match &args.command {
        Commands::Run(run) => run.run().await,
        Commands::Render(render) => render.run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

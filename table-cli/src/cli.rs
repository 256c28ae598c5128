use crate::commands::Commands;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "table-cli")]
#[clap(about = "Drive a tiny name table", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

use clap::Subcommand;

mod render;
mod run;

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(run::Run),
    Render(render::Render),
}

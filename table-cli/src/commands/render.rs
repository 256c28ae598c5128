use std::ops::ControlFlow;
use std::path::PathBuf;

use tinytable::{Event, HtmlTable, ServiceConfig, TableService};

use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "render", about = "Print the seeded table page as HTML")]
pub struct Render {
    #[clap(long, value_parser, help = "Path to a TOML service configuration")]
    config: Option<PathBuf>,
}

impl Render {
    pub fn run(&self) -> Result<(), AppError> {
        let config = ServiceConfig::load_or_default(self.config.as_deref())?;
        let mut service = TableService::new(&config, HtmlTable::new())?;
        if let ControlFlow::Break(()) = service.handle_event(Event::Open) {
            return Err(AppError::SessionFailed(
                "service stopped while opening".to_owned(),
            ));
        }
        print!("{}", service.state().view.to_html());
        Ok(())
    }
}

use std::path::PathBuf;

use log::{debug, warn};
use rpc::Reply;
use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tinytable::{
    Entry, HtmlTable, Loopback, Renderer, ServiceConfig, TableService,
};

use crate::script::Line;
use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(
    name = "run",
    about = "Run a scripted session against an in-process table service"
)]
pub struct Run {
    #[clap(long, value_parser, help = "Path to a TOML service configuration")]
    config: Option<PathBuf>,
    #[clap(
        long,
        value_parser,
        help = "File with one command per line (stdin if omitted)"
    )]
    script: Option<PathBuf>,
    #[clap(long, help = "Print the final table as HTML")]
    html: bool,
}

impl Run {
    pub async fn run(&self) -> Result<(), AppError> {
        let config = ServiceConfig::load_or_default(self.config.as_deref())?;
        let (transport, events) = Loopback::from_config(&config)?;
        let service = TableService::new(&config, HtmlTable::new())?;

        transport.open()?;
        let session = tokio::spawn(service.run(events));

        let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &self.script
        {
            Some(path) => Box::new(BufReader::new(File::open(path).await?)),
            None => Box::new(BufReader::new(io::stdin())),
        };
        let mut lines = reader.lines();
        let mut number = 0;
        while let Some(text) = lines.next_line().await? {
            number += 1;
            let line = match text.parse::<Line>() {
                Ok(line) => line,
                Err(e) => {
                    warn!("Skipping line {}: {}", number, e);
                    eprintln!("line {}: {}", number, e);
                    continue;
                }
            };
            if line == Line::Close {
                break;
            }
            if let Some(request) = line.to_request(&config.solicit_prefix) {
                debug!("Line {} solicits {}", number, request.verb);
                let reply = transport.request(request).await?;
                println!("{}", format_reply(&reply));
            }
        }

        transport.close()?;
        let state = session
            .await
            .map_err(|e| AppError::SessionFailed(e.to_string()))?;

        if self.html {
            let entries: Vec<Entry> = state.store.entries().collect();
            let mut page = HtmlTable::new();
            page.create_table(&entries);
            print!("{}", page.to_html());
        }
        Ok(())
    }
}

fn format_reply(reply: &Reply) -> String {
    match reply.error_message() {
        Some(message) => format!("error: {}", message),
        None => reply.data.to_string(),
    }
}

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rpc::{Outcome, Reply, Request};
use serde_json::json;

use crate::{
    handlers::Verb,
    store::EntryId,
    transport::{ReplyCallback, Transport},
    Result,
};

/// What the user can do on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Text typed into the name input field.
    Typed(String),
    /// Submit button pressed.
    Submit,
    /// Delete button of a row pressed.
    DeleteClicked(EntryId),
}

/// Client-side page state touched by reply callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub input: String,
    pub alerts: Vec<String>,
}

/// Browser side of the demo: turns UI events into solicits and applies the
/// replies. Any `Error` reply is surfaced as an alert; a successful insert
/// clears the input field.
pub struct TableClient<T> {
    transport: T,
    ui: Arc<Mutex<UiState>>,
    solicit_prefix: String,
}

impl<T: Transport> TableClient<T> {
    pub fn new(transport: T, solicit_prefix: &str) -> Self {
        Self {
            transport,
            ui: Arc::new(Mutex::new(UiState::default())),
            solicit_prefix: solicit_prefix.to_owned(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn ui(&self) -> UiState {
        lock(&self.ui).clone()
    }

    pub fn handle(&self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::Typed(text) => {
                lock(&self.ui).input = text;
                Ok(())
            }
            UiEvent::Submit => self.insert_name(),
            UiEvent::DeleteClicked(id) => self.delete_name(id),
        }
    }

    fn insert_name(&self) -> Result<()> {
        let name = lock(&self.ui).input.clone();
        let ui = Arc::clone(&self.ui);
        let callback: ReplyCallback = Box::new(move |reply| {
            let mut ui = lock(&ui);
            match reply.outcome {
                Outcome::Error => ui.alerts.push(alert_text(&reply)),
                Outcome::Ok => ui.input.clear(),
            }
        });
        self.transport.solicit(
            Request::new(
                Verb::Insert.path(&self.solicit_prefix),
                json!({ "name": name }),
            ),
            callback,
        )
    }

    fn delete_name(&self, id: EntryId) -> Result<()> {
        let ui = Arc::clone(&self.ui);
        let callback: ReplyCallback = Box::new(move |reply| {
            if reply.outcome == Outcome::Error {
                lock(&ui).alerts.push(alert_text(&reply));
            }
        });
        // Row ids live in the DOM as strings.
        self.transport.solicit(
            Request::new(
                Verb::Delete.path(&self.solicit_prefix),
                json!({ "id": id.to_string() }),
            ),
            callback,
        )
    }
}

fn alert_text(reply: &Reply) -> String {
    reply
        .error_message()
        .unwrap_or("Unknown error")
        .to_owned()
}

fn lock(ui: &Mutex<UiState>) -> MutexGuard<'_, UiState> {
    ui.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ServiceConfig, service::TableService, transport::Loopback,
        view::HtmlTable,
    };

    #[tokio::test]
    async fn submit_clears_input_on_success() {
        let config = ServiceConfig::default();
        let (transport, events) = Loopback::from_config(&config).unwrap();
        let service = TableService::new(&config, HtmlTable::new()).unwrap();
        let client =
            TableClient::new(transport.clone(), &config.solicit_prefix);

        transport.open().unwrap();
        client.handle(UiEvent::Typed("Bob".into())).unwrap();
        client.handle(UiEvent::Submit).unwrap();
        transport.close().unwrap();

        let state = service.run(events).await;
        assert_eq!(client.ui(), UiState::default());
        assert_eq!(state.store.get(EntryId(3)).unwrap(), "Bob");
        assert!(state.view.is_closed());
    }

    #[tokio::test]
    async fn failures_become_alerts_and_keep_input() {
        let config = ServiceConfig::default();
        let (transport, events) = Loopback::from_config(&config).unwrap();
        let service = TableService::new(&config, HtmlTable::new()).unwrap();
        let client =
            TableClient::new(transport.clone(), &config.solicit_prefix);

        transport.open().unwrap();
        client.handle(UiEvent::Typed("Andrew".into())).unwrap();
        client.handle(UiEvent::Submit).unwrap();
        client.handle(UiEvent::DeleteClicked(EntryId(42))).unwrap();
        transport.close().unwrap();

        service.run(events).await;
        let ui = client.ui();
        assert_eq!(ui.input, "Andrew");
        assert_eq!(
            ui.alerts,
            vec![
                "Name already in table: Andrew.".to_owned(),
                "No such key: 42.".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn delete_click_removes_row() {
        let config = ServiceConfig::default();
        let (transport, mut events) = Loopback::from_config(&config).unwrap();
        let mut service = TableService::new(&config, HtmlTable::new()).unwrap();
        let client =
            TableClient::new(transport.clone(), &config.solicit_prefix);

        transport.open().unwrap();
        client.handle(UiEvent::DeleteClicked(EntryId(0))).unwrap();

        let open = events.recv().await.unwrap();
        assert!(service.handle_event(open).is_continue());
        let delete = events.recv().await.unwrap();
        assert!(service.handle_event(delete).is_continue());

        assert!(client.ui().alerts.is_empty());
        assert!(service.state().view.row(EntryId(0)).is_none());
        assert_eq!(service.state().view.rows().len(), 2);
    }

    #[test]
    fn solicit_on_closed_transport_is_an_error() {
        let config = ServiceConfig::default();
        let (transport, _events) = Loopback::from_config(&config).unwrap();
        let client = TableClient::new(transport, &config.solicit_prefix);
        client.transport().close().unwrap();
        assert!(client.handle(UiEvent::Submit).is_err());
        assert!(client.ui().alerts.is_empty());
    }
}

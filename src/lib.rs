//! A tiny name table served over a request/response connection.
//!
//! The [`service::TableService`] owns a [`store::ListStore`] and a
//! [`view::Renderer`] and answers the `Insert`, `Delete`, `Get` and `List`
//! operations dispatched through an [`rpc::Router`]. The
//! [`client::TableClient`] is the page side: it turns UI events into
//! solicits on a [`transport::Transport`] and surfaces failed replies as
//! alerts.

pub mod client;
pub mod config;
mod errors;
pub mod handlers;
pub mod service;
pub mod store;
pub mod transport;
pub mod view;

pub use client::{TableClient, UiEvent, UiState};
pub use config::ServiceConfig;
pub use errors::{Result, TableError};
pub use handlers::Verb;
pub use service::{Phase, TableService, TableState};
pub use store::{Entry, EntryId, ListStore, NameLimits, Slot};
pub use transport::{Endpoint, Event, Loopback, Transport};
pub use view::{HtmlTable, Renderer};

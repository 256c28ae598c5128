use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use rpc::{Reply, Request};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use url::Url;

use crate::{config::ServiceConfig, Result, TableError};

pub type ReplyCallback = Box<dyn FnOnce(Reply) + Send + 'static>;

/// What the service loop receives from the connection.
pub enum Event {
    Open,
    Request {
        request: Request,
        reply: ReplyCallback,
    },
    Close,
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Open => f.write_str("Open"),
            Event::Request { request, .. } => {
                f.debug_struct("Request").field("request", request).finish()
            }
            Event::Close => f.write_str("Close"),
        }
    }
}

/// Where the service lives: a connection url plus the topic it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: Url,
    pub topic: String,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.url.as_str().trim_end_matches('/');
        write!(f, "{} ({})", url, self.topic)
    }
}

/// Outbound side of a connection.
pub trait Transport: Send + Sync {
    fn endpoint(&self) -> &Endpoint;

    /// Send `request` without waiting. `callback` runs once the reply
    /// arrives; it is dropped unanswered if the connection goes away first.
    fn solicit(&self, request: Request, callback: ReplyCallback) -> Result<()>;
}

/// In-process connection: solicits are rewritten from the solicit prefix to
/// the implementation prefix and queued for the service loop.
#[derive(Clone)]
pub struct Loopback {
    endpoint: Endpoint,
    events: mpsc::UnboundedSender<Event>,
    closed: Arc<AtomicBool>,
    solicit_prefix: String,
    impl_prefix: String,
}

impl Loopback {
    pub fn new(
        endpoint: Endpoint,
        solicit_prefix: &str,
        impl_prefix: &str,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let transport = Loopback {
            endpoint,
            events,
            closed: Arc::new(AtomicBool::new(false)),
            solicit_prefix: solicit_prefix.to_owned(),
            impl_prefix: impl_prefix.to_owned(),
        };
        (transport, receiver)
    }

    pub fn from_config(
        config: &ServiceConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Event>)> {
        Ok(Self::new(
            config.endpoint()?,
            &config.solicit_prefix,
            &config.impl_prefix,
        ))
    }

    pub fn open(&self) -> Result<()> {
        self.push(Event::Open)
    }

    /// Queue the close event; later solicits fail with `TransportClosed`.
    pub fn close(&self) -> Result<()> {
        let result = self.push(Event::Close);
        self.closed.store(true, Ordering::SeqCst);
        result
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.events.is_closed()
    }

    /// Solicit and wait for the reply.
    pub async fn request(&self, request: Request) -> Result<Reply> {
        let (sender, receiver) = oneshot::channel();
        self.solicit(
            request,
            Box::new(move |reply| {
                let _ = sender.send(reply);
            }),
        )?;
        receiver.await.map_err(|_| self.closed_error())
    }

    /// Map `API/Insert` to `Impl/Insert`; other verbs pass through.
    pub fn route(&self, verb: &str) -> String {
        match verb.strip_prefix(&self.solicit_prefix) {
            Some(operation) => format!("{}{}", self.impl_prefix, operation),
            None => verb.to_owned(),
        }
    }

    fn push(&self, event: Event) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(self.closed_error());
        }
        self.events.send(event).map_err(|_| self.closed_error())
    }

    fn closed_error(&self) -> TableError {
        TableError::TransportClosed(self.endpoint.to_string())
    }
}

impl Transport for Loopback {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn solicit(&self, request: Request, callback: ReplyCallback) -> Result<()> {
        let request = Request {
            verb: self.route(&request.verb),
            data: request.data,
        };
        log::debug!("soliciting {} on {}", request.verb, self.endpoint);
        self.push(Event::Request {
            request,
            reply: callback,
        })
    }
}

use std::ops::ControlFlow;

use rpc::{Reply, Request, Router};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    config::ServiceConfig,
    handlers,
    store::{Entry, ListStore},
    transport::{Endpoint, Event},
    view::Renderer,
    Result, TableError,
};

/// Everything a handler may touch: the store and the view reflecting it.
#[derive(Debug)]
pub struct TableState<R> {
    pub store: ListStore,
    pub view: R,
}

/// Connection lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Open,
    Closed,
}

/// The service side of the demo: owns the store and the view and answers
/// requests arriving over the transport.
pub struct TableService<R> {
    router: Router<TableState<R>>,
    state: TableState<R>,
    endpoint: Endpoint,
    phase: Phase,
}

impl<R: Renderer + 'static> TableService<R> {
    /// Build a service from `config`, seeding the store.
    pub fn new(config: &ServiceConfig, view: R) -> Result<Self> {
        config.validate()?;
        let store = ListStore::with_names(config.limits, &config.seed)?;
        Ok(Self::with_store(
            config.endpoint()?,
            &config.impl_prefix,
            store,
            view,
        ))
    }

    pub fn with_store(
        endpoint: Endpoint,
        impl_prefix: &str,
        store: ListStore,
        view: R,
    ) -> Self {
        Self {
            router: handlers::router(impl_prefix),
            state: TableState { store, view },
            endpoint,
            phase: Phase::Connecting,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> &TableState<R> {
        &self.state
    }

    pub fn into_state(self) -> TableState<R> {
        self.state
    }

    /// Dispatch a single request.
    pub fn handle(&mut self, request: &Request) -> Reply {
        if self.phase == Phase::Closed {
            log::warn!("{} arrived after close", request.verb);
            return Reply::failure(&TableError::TransportClosed(
                self.endpoint.to_string(),
            ));
        }
        self.router.call(&mut self.state, request)
    }

    pub fn handle_event(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::Open => {
                self.open();
                ControlFlow::Continue(())
            }
            Event::Request { request, reply } => {
                let response = self.handle(&request);
                reply(response);
                ControlFlow::Continue(())
            }
            Event::Close => {
                self.close();
                ControlFlow::Break(())
            }
        }
    }

    /// Drain `events` until the connection closes or every sender is gone,
    /// then hand back the final state.
    ///
    /// Requests still queued behind the close are answered with
    /// `TransportClosed`.
    pub async fn run(
        mut self,
        mut events: UnboundedReceiver<Event>,
    ) -> TableState<R> {
        while let Some(event) = events.recv().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }
        if self.phase != Phase::Closed {
            self.close();
        }

        events.close();
        while let Ok(event) = events.try_recv() {
            let _ = self.handle_event(event);
        }
        self.state
    }

    fn open(&mut self) {
        match self.phase {
            Phase::Closed => {
                log::warn!("{} is closed, ignoring open", self.endpoint)
            }
            _ => {
                log::info!("Opened: {}", self.endpoint);
                let entries: Vec<Entry> = self.state.store.entries().collect();
                self.state.view.create_table(&entries);
                self.phase = Phase::Open;
            }
        }
    }

    fn close(&mut self) {
        if self.phase == Phase::Closed {
            return;
        }
        log::info!("Closed: {}", self.endpoint);
        self.state.view.teardown(&self.endpoint.url);
        self.phase = Phase::Closed;
    }
}

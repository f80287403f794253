//! The notification channel: connection lifecycle and unread count reconciliation.
//!
//! All handlers are plain `&mut self` methods and never block. They are meant
//! to be driven one at a time, in transport delivery order, either by hand or
//! by the [`run`](NotificationChannel::run) dispatch loop.

mod count;
mod dispatch;
mod mapper;
mod state;

pub use count::{parse_unread_count, ProtocolError};
pub use mapper::{
    ErrorMapper, StatusMessages, AUTHORIZATION_ERROR, CONNECTION_CLOSED, CONNECTION_ERROR,
    SERVER_ERROR, SESSION_EXPIRED,
};
pub use state::{ConnectionState, Lifecycle, Projection};

use std::fmt::Debug;

use snafu::prelude::*;
use tokio::sync::watch;
use url::Url;

use crate::{
    error,
    page::{Page, UnloadListener},
    ws::{CloseInfo, ConnectionEvent, Connector, EventStream, TransportError},
    Result,
};
use state::ChannelState;

/// Stateful consumer of the notification stream of one page.
///
/// Rendering surfaces get a [`Projection`] through [`project`](Self::project)
/// or subscribe to every change with [`subscribe`](Self::subscribe).
pub struct NotificationChannel<M = StatusMessages> {
    state: ChannelState,
    mapper: M,
    view: watch::Sender<Projection>,
    unload: Option<UnloadListener>,
}

impl<M> Debug for NotificationChannel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("state", &self.state)
            .field("unload", &self.unload)
            .finish_non_exhaustive()
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel {
    /// Create an inactive channel using the default status message table
    pub fn new() -> Self {
        Self::with_error_mapper(StatusMessages)
    }
}

impl<M> NotificationChannel<M>
where
    M: ErrorMapper,
{
    /// Create an inactive channel with a custom status message mapping
    pub fn with_error_mapper(mapper: M) -> Self {
        let (view, _) = watch::channel(Projection::default());
        Self {
            state: ChannelState::default(),
            mapper,
            view,
            unload: None,
        }
    }

    /// Open the notification stream of `page` and start observing its unload signal.
    ///
    /// Returns the connection event stream, to be fed back through
    /// [`handle`](Self::handle) or [`run`](Self::run).
    pub fn activate<P, C>(&mut self, page: &P, connector: &C) -> Result<EventStream>
    where
        P: Page + ?Sized,
        C: Connector + ?Sized,
    {
        ensure!(
            self.state.lifecycle == Lifecycle::Inactive,
            error::AlreadyActivated
        );

        let location = page
            .location()
            .context(error::LocationUnavailable)?;

        let endpoint = location
            .endpoint()
            .with_context(|_| error::InvalidEndpoint {
                page: location.clone(),
            })?;

        log::debug!("Activate notification channel, endpoint: {}", endpoint);

        self.unload = Some(page.unload_listener());

        let events = connector.open(endpoint.clone());

        self.state.endpoint = Some(endpoint);
        self.state.connection = ConnectionState::Connecting;
        self.state.lifecycle = Lifecycle::Active;

        log::debug!("Move to connecting state");

        Ok(events)
    }

    fn accepts(&self, callback: &str) -> bool {
        match self.state.lifecycle {
            Lifecycle::Active => true,
            Lifecycle::Inactive => {
                log::debug!("Ignore {} callback on inactive channel", callback);
                false
            }
            Lifecycle::Deactivated => {
                log::debug!("Ignore late {} callback on deactivated channel", callback);
                false
            }
        }
    }

    fn publish(&self) {
        self.view.send_replace(self.state.project());
    }

    /// Transport confirmed the connection
    pub fn on_open(&mut self) {
        if !self.accepts("open") {
            return;
        }

        log::info!("Notification stream opened");
        log::debug!("Move to connected state");

        self.state.connection = ConnectionState::Connected;
    }

    /// One inbound frame, carrying the new unread count.
    ///
    /// The count is replaced, never accumulated. A payload that is not a
    /// count is dropped and the displayed value stays as it was.
    pub fn on_message(&mut self, payload: &[u8]) {
        if !self.accepts("message") {
            return;
        }

        match parse_unread_count(payload) {
            Ok(count) => {
                log::debug!("Unread count {} -> {}", self.state.unread_count, count);
                self.state.unread_count = count;
                self.publish();
            }
            Err(err) => {
                log::warn!("Drop notification message: {}", err);
            }
        }
    }

    /// Transport closed, for whatever reason
    pub fn on_close(&mut self, info: Option<CloseInfo>) {
        if !self.accepts("close") {
            return;
        }

        log::info!("Notification stream closed: {:?}", info);

        if self.state.unloading {
            log::debug!("Page is unloading, closing is expected");
        } else if self.state.error_reported {
            log::debug!("Error already reported for this connection");
        } else {
            self.state.errors.push(CONNECTION_CLOSED.to_string());
            self.state.error_reported = true;
        }

        log::debug!("Move to disconnected state");

        self.state.connection = ConnectionState::Disconnected;
        self.state.endpoint = None;
        self.publish();
    }

    /// Transport failure; the close that usually follows finalizes the state
    pub fn on_error(&mut self, err: &TransportError) {
        if !self.accepts("error") {
            return;
        }

        log::warn!("Notification stream error: {}", err);

        self.state.errors = match err.status {
            Some(status) => self.mapper.messages_for_status(status),
            None => vec![CONNECTION_ERROR.to_string()],
        };
        self.state.error_reported = true;
        self.publish();
    }

    /// Page is navigating away: the coming close is not a failure
    pub fn on_before_unload(&mut self) {
        if !self.accepts("unload") {
            return;
        }

        log::debug!("Page unloading");

        self.state.unloading = true;
    }

    /// Detach from the page. The transport is left to the host to tear down.
    pub fn deactivate(&mut self) {
        if self.state.is_deactivated() {
            return;
        }

        log::debug!("Deactivate notification channel");

        // dropping the listener unregisters it
        self.unload.take();
        self.state.lifecycle = Lifecycle::Deactivated;
    }

    /// Dispatch one connection event to its handler
    pub fn handle(&mut self, event: ConnectionEvent) {
        log::trace!("Handle {} event", event.type_name());

        match event {
            ConnectionEvent::Open => self.on_open(),
            ConnectionEvent::Message(payload) => self.on_message(&payload),
            ConnectionEvent::Close(info) => self.on_close(info),
            ConnectionEvent::Error(err) => self.on_error(&err),
        }
    }
}

impl<M> NotificationChannel<M> {
    /// Current view for the rendering surface
    pub fn project(&self) -> Projection {
        self.state.project()
    }

    /// Observe every projection change
    pub fn subscribe(&self) -> watch::Receiver<Projection> {
        self.view.subscribe()
    }

    /// Transport state
    pub fn connection_state(&self) -> ConnectionState {
        self.state.connection
    }

    /// Lifecycle of this instance
    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle
    }

    /// Endpoint of the live connection, if any
    pub fn endpoint(&self) -> Option<&Url> {
        self.state.endpoint.as_ref()
    }

    /// true once the page unload signal was observed
    pub fn is_unloading(&self) -> bool {
        self.state.unloading
    }
}

//! Notification stream transport

mod connector;
mod event;
mod stream;

pub use connector::{Connector, WebsocketConnector};
pub use event::{CloseInfo, ConnectionEvent, TransportError};
pub use stream::{EventSender, EventStream};

//! Connection events delivered by the notification transport.

use std::fmt::Display;

use bytes::Bytes;
use enum_as_inner::EnumAsInner;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;

/// Close frame details sent by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// websocket close code
    pub code: u16,
    /// reason for human read
    pub reason: String,
}

impl From<CloseFrame<'_>> for CloseInfo {
    fn from(frame: CloseFrame<'_>) -> Self {
        Self {
            code: frame.code.into(),
            reason: frame.reason.into_owned(),
        }
    }
}

/// Transport level failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// HTTP status the server rejected the connection with, if known
    pub status: Option<u16>,
    /// reason for human read, only logged
    pub reason: String,
}

impl TransportError {
    /// Failure carrying an HTTP status code
    pub fn with_status<S: Into<String>>(status: u16, reason: S) -> Self {
        Self {
            status: Some(status),
            reason: reason.into(),
        }
    }

    /// Failure without any status, like a network error
    pub fn without_status<S: Into<String>>(reason: S) -> Self {
        Self {
            status: None,
            reason: reason.into(),
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "status {}: {}", status, self.reason),
            None => f.write_str(&self.reason),
        }
    }
}

/// One event of a notification connection, in transport delivery order
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum ConnectionEvent {
    /// Transport confirmed the connection
    Open,
    /// One inbound frame payload
    Message(Bytes),
    /// Connection closed, for any reason. Always the last event of a connection.
    Close(Option<CloseInfo>),
    /// Transport failure, usually followed by [`Close`](Self::Close)
    Error(TransportError),
}

impl ConnectionEvent {
    /// get type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Message(_) => "message",
            Self::Close(_) => "close",
            Self::Error(_) => "error",
        }
    }
}

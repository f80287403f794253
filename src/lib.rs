//! # Notibell
//!
//! Unread notification indicator fed by a server-pushed websocket stream.
//!
//! A [`NotificationChannel`] connects to the notification endpoint of the
//! hosting page, keeps the last unread count the server sent, and turns
//! connection failures into messages for the user. Rendering surfaces read a
//! [`Projection`](channel::Projection) of it.

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(missing_debug_implementations, missing_docs)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod page;
pub mod ws;

mod error;
pub use error::{Error, Result};

pub use channel::NotificationChannel;

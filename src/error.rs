//! crate error types

use snafu::prelude::*;

use crate::page::PageLocation;

/// crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// Activation error, fatal for the channel: no notification capability is offered.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), context(suffix(false)))]
pub enum Error {
    /// The environment can't tell the current page location
    #[snafu(display("current page location is unavailable"))]
    LocationUnavailable,

    /// Notification endpoint url can't be built from page location
    #[snafu(display("invalid notification endpoint for page {page}: {source}"))]
    InvalidEndpoint {
        /// page location used to build the endpoint
        page: PageLocation,
        /// source error
        source: url::ParseError,
    },

    /// Channel was already activated (or activated then deactivated)
    #[snafu(display("notification channel was already activated"))]
    AlreadyActivated,
}

use std::{fmt::Display, str::FromStr};

use snafu::prelude::*;
use url::Url;

/// Fixed path of the notification websocket endpoint
pub const NOTIFICATIONS_PATH: &str = "/rhn/websocket/notifications";

/// Link target of the full notification message list
pub const NOTIFICATION_MESSAGES_PATH: &str = "/rhn/manager/notification-messages";

static ENDPOINT_SCHEME: &str = "wss";

/// Parse string as page location error
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module(parse_location_error_variant), context(suffix(false)))]
pub enum ParseLocationError {
    /// the str is not a valid url
    #[snafu(display("{s} is an invalid url: {source}"))]
    InvalidURL {
        /// string be parsed
        s: String,
        /// source error
        source: url::ParseError,
    },

    /// the parsed url has no host
    #[snafu(display("the page url {s} has no host"))]
    NoHost {
        /// the url
        s: String,
    },
}

/// Location of the page hosting the indicator.
///
/// `port` is `None` when the page is served on the scheme default port,
/// the same way a browser reports an empty `location.port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// page scheme, `https` in production
    pub scheme: String,
    /// page host name
    pub hostname: String,
    /// explicit page port
    pub port: Option<u16>,
}

impl PageLocation {
    /// Build a location from its parts
    pub fn new<S: Into<String>>(scheme: S, hostname: S, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.into(),
            hostname: hostname.into(),
            port,
        }
    }

    fn url_on(&self, scheme: &str, path: &str) -> Result<Url, url::ParseError> {
        let authority = match self.port {
            Some(port) => format!("{}:{}", self.hostname, port),
            None => self.hostname.clone(),
        };
        Url::parse(&format!("{}://{}{}", scheme, authority, path))
    }

    /// Secure websocket endpoint serving notification counts for this page
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        self.url_on(ENDPOINT_SCHEME, NOTIFICATIONS_PATH)
    }

    /// Link to the notification message list, on the page's own origin
    pub fn messages_link(&self) -> Result<Url, url::ParseError> {
        self.url_on(&self.scheme, NOTIFICATION_MESSAGES_PATH)
    }
}

impl FromStr for PageLocation {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url =
            Url::parse(s).with_context(|_| parse_location_error_variant::InvalidURL { s })?;

        let hostname = url
            .host_str()
            .with_context(|| parse_location_error_variant::NoHost { s })?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            hostname: hostname.to_string(),
            port: url.port(),
        })
    }
}

impl Display for PageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.hostname)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}

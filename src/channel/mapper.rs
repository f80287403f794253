//! Status code to user-facing error message mapping.

/// Shown on 401, the session cookie is gone
pub const SESSION_EXPIRED: &str =
    "Session expired, please reload the page to receive notifications in real-time.";
/// Shown on 403
pub const AUTHORIZATION_ERROR: &str =
    "Authorization error, please reload the page or try to logout/login again.";
/// Shown on any 5xx
pub const SERVER_ERROR: &str = "Server error, please check log files.";
/// Shown when a transport error carries no status at all
pub const CONNECTION_ERROR: &str = "Error connecting to server. Refresh the page to try again.";
/// Shown when the connection closes without an error being reported first
pub const CONNECTION_CLOSED: &str = "Websocket connection closed. Refresh the page to try again.";

/// Type implements this trait turns an HTTP-like status into error messages.
///
/// An empty result means nothing is surfaced to the user.
pub trait ErrorMapper {
    /// messages for a transport error with given status
    fn messages_for_status(&self, status: u16) -> Vec<String>;
}

impl<F> ErrorMapper for F
where
    F: Fn(u16) -> Vec<String>,
{
    fn messages_for_status(&self, status: u16) -> Vec<String> {
        self(status)
    }
}

/// Default mapping table.
#[derive(Debug, Default, Copy, Clone)]
pub struct StatusMessages;

impl ErrorMapper for StatusMessages {
    fn messages_for_status(&self, status: u16) -> Vec<String> {
        let message = match status {
            401 => SESSION_EXPIRED,
            403 => AUTHORIZATION_ERROR,
            s if s >= 500 => SERVER_ERROR,
            _ => return Vec::new(),
        };
        vec![message.to_string()]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_table() {
        let m = StatusMessages;

        assert_eq!(m.messages_for_status(401), vec![SESSION_EXPIRED]);
        assert_eq!(m.messages_for_status(403), vec![AUTHORIZATION_ERROR]);
        assert_eq!(m.messages_for_status(500), vec![SERVER_ERROR]);
        assert_eq!(m.messages_for_status(503), vec![SERVER_ERROR]);
        assert!(m.messages_for_status(404).is_empty());
        assert!(m.messages_for_status(400).is_empty());
    }

    #[test]
    fn test_closure_mapper() {
        let m = |status: u16| vec![format!("failed with {}", status)];

        assert_eq!(m.messages_for_status(418), vec!["failed with 418"]);
    }
}

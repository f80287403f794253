use serde::Serialize;
use url::Url;

/// Transport state as seen by the channel
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live connection
    #[default]
    Disconnected,
    /// Opened, transport not confirmed yet
    Connecting,
    /// Transport confirmed open
    Connected,
}

/// Where a channel instance is in its life
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, not activated yet
    #[default]
    Inactive,
    /// Activated, receiving events
    Active,
    /// Torn down, every further callback is ignored
    Deactivated,
}

/// What the rendering surface displays.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// unread notification messages
    pub unread_count: u64,
    /// error messages to show near the indicator, usually empty
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct ChannelState {
    pub lifecycle: Lifecycle,
    pub connection: ConnectionState,
    /// endpoint of the live connection; the event stream itself belongs to the caller
    pub endpoint: Option<Url>,
    pub unread_count: u64,
    pub errors: Vec<String>,
    pub unloading: bool,
    /// an error was already surfaced for the current episode
    pub error_reported: bool,
}

impl ChannelState {
    pub fn project(&self) -> Projection {
        Projection {
            unread_count: self.unread_count,
            errors: self.errors.clone(),
        }
    }

    pub fn is_deactivated(&self) -> bool {
        self.lifecycle == Lifecycle::Deactivated
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_projection_json() {
        let view = Projection {
            unread_count: 5,
            errors: vec!["oops".to_string()],
        };

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({ "unreadCount": 5, "errors": ["oops"] })
        );
    }
}

//! Hosting page environment: location and unload notification.

mod location;
mod unload;

pub use location::{
    ParseLocationError, PageLocation, NOTIFICATIONS_PATH, NOTIFICATION_MESSAGES_PATH,
};
pub use unload::{UnloadListener, UnloadSignal};

/// Environment the notification channel is activated in.
pub trait Page {
    /// Current page location, `None` if the environment can't resolve one
    fn location(&self) -> Option<PageLocation>;

    /// Register an observer of the page-unload signal
    fn unload_listener(&self) -> UnloadListener;
}

/// A [`Page`] driven by its host: a fixed location and an owned unload signal.
#[derive(Debug, Default)]
pub struct HostPage {
    location: Option<PageLocation>,
    unload: UnloadSignal,
}

impl HostPage {
    /// Create a page at given location
    pub fn new(location: PageLocation) -> Self {
        Self {
            location: Some(location),
            unload: UnloadSignal::new(),
        }
    }

    /// Create a page whose location can't be resolved
    pub fn detached() -> Self {
        Self::default()
    }

    /// Fire the unload signal, as a navigation away from the page would
    pub fn unload(&self) {
        self.unload.fire();
    }
}

impl Page for HostPage {
    fn location(&self) -> Option<PageLocation> {
        self.location.clone()
    }

    fn unload_listener(&self) -> UnloadListener {
        self.unload.listen()
    }
}

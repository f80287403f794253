use futures_util::future;
use tokio::sync::watch;

/// Host side of the page-unload notification, fired once when the page is navigating away.
#[derive(Debug)]
pub struct UnloadSignal {
    tx: watch::Sender<bool>,
}

impl Default for UnloadSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl UnloadSignal {
    /// Create a signal that has not fired yet
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Notify every listener that the page is unloading
    pub fn fire(&self) {
        log::debug!("Page unload signal fired");
        self.tx.send_replace(true);
    }

    /// true once [`fire`](Self::fire) was called
    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Register a new listener
    pub fn listen(&self) -> UnloadListener {
        UnloadListener {
            rx: self.tx.subscribe(),
        }
    }
}

/// A registered page-unload observer, unregistered on drop.
#[derive(Debug, Clone)]
pub struct UnloadListener {
    rx: watch::Receiver<bool>,
}

impl UnloadListener {
    /// Wait until the page unload signal fires.
    ///
    /// Never resolves if the signal is dropped without firing.
    pub async fn fired(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                log::trace!("Unload signal dropped without firing");
                future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_listener_wakes_on_fire() {
        let signal = UnloadSignal::new();
        let mut listener = signal.listen();

        let waiter = tokio::spawn(async move { listener.fired().await });
        signal.fire();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(signal.is_fired());
    }

    #[tokio::test]
    async fn test_listener_registered_after_fire_resolves_at_once() {
        let signal = UnloadSignal::new();
        signal.fire();

        let mut listener = signal.listen();
        tokio::time::timeout(Duration::from_secs(1), listener.fired())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_listener_pending_when_signal_dropped() {
        let signal = UnloadSignal::new();
        let mut listener = signal.listen();
        drop(signal);

        let result = tokio::time::timeout(Duration::from_millis(50), listener.fired()).await;
        assert!(result.is_err());
    }
}

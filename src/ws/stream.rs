use std::task::Poll;

use futures_util::Stream;
use tokio::sync::mpsc;

use super::ConnectionEvent;

/// Producer side of a connection event queue, held by the transport.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ConnectionEvent>,
}

impl EventSender {
    /// Push an event; false means the receive side dropped and the producer should stop.
    pub async fn send(&self, event: ConnectionEvent) -> bool {
        let type_name = event.type_name();
        if self.tx.send(event).await.is_ok() {
            log::trace!("Send {} event to event stream success", type_name);
            true
        } else {
            log::debug!(
                "Send {} event to event stream failed, means receive side dropped",
                type_name
            );
            false
        }
    }

    /// true if the receive side was dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Wait until the receive side is dropped
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

/// In-order stream of events of one notification connection
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<ConnectionEvent>,
}

impl EventStream {
    /// Create a bounded event queue, holding at least one event
    pub fn channel(capacity: usize) -> (EventSender, EventStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (EventSender { tx }, EventStream { rx })
    }
}

impl Stream for EventStream {
    type Item = ConnectionEvent;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod test {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn test_zero_capacity_still_delivers() {
        let (sender, mut stream) = EventStream::channel(0);

        assert!(sender.send(ConnectionEvent::Open).await);
        drop(sender);

        assert!(matches!(stream.next().await, Some(ConnectionEvent::Open)));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_send_after_stream_dropped() {
        let (sender, stream) = EventStream::channel(4);
        drop(stream);

        assert!(sender.is_closed());
        assert!(!sender.send(ConnectionEvent::Close(None)).await);
    }
}

use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio_tungstenite as websocket;
use url::Url;
use websocket::tungstenite;

use super::{CloseInfo, ConnectionEvent, EventSender, EventStream, TransportError};

pub(crate) type WebsocketClient =
    websocket::WebSocketStream<websocket::MaybeTlsStream<tokio::net::TcpStream>>;

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(6);
const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Opens notification connections.
///
/// Opening never blocks: the outcome, including connect failures, is
/// delivered through the returned stream, which ends after a
/// [`Close`](ConnectionEvent::Close) event.
pub trait Connector {
    /// Start connecting to `endpoint`
    fn open(&self, endpoint: Url) -> EventStream;
}

/// [`Connector`] speaking websocket (rustls for `wss`), driven by a spawned tokio task.
#[derive(Debug, Clone)]
pub struct WebsocketConnector {
    handshake_timeout: Duration,
    queue_capacity: usize,
}

impl Default for WebsocketConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl WebsocketConnector {
    /// Create a connector with default handshake timeout and event queue capacity
    pub fn new() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Give up the opening handshake after `timeout`
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Buffer at most `capacity` undelivered events, the reader waits when full
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

impl Connector for WebsocketConnector {
    fn open(&self, endpoint: Url) -> EventStream {
        let (sender, stream) = EventStream::channel(self.queue_capacity);
        tokio::spawn(connection_background(
            endpoint,
            self.handshake_timeout,
            sender,
        ));
        stream
    }
}

fn handshake_failure(err: tungstenite::Error) -> TransportError {
    match err {
        // server answered the upgrade request with a plain http response
        tungstenite::Error::Http(ref response) => {
            TransportError::with_status(response.status().as_u16(), err.to_string())
        }
        _ => TransportError::without_status(err.to_string()),
    }
}

async fn connect(endpoint: &Url, timeout: Duration) -> Result<WebsocketClient, TransportError> {
    match tokio::time::timeout(timeout, websocket::connect_async(endpoint)).await {
        Ok(Ok((ws, _))) => Ok(ws),
        Ok(Err(err)) => Err(handshake_failure(err)),
        Err(_) => Err(TransportError::without_status(format!(
            "handshake not finished in {:?}",
            timeout
        ))),
    }
}

/// Report a failure the way browsers do: an error event, then the close event.
async fn fail(sender: &EventSender, err: TransportError, close: Option<CloseInfo>) {
    if sender.send(ConnectionEvent::Error(err)).await {
        sender.send(ConnectionEvent::Close(close)).await;
    }
}

async fn connection_background(endpoint: Url, timeout: Duration, sender: EventSender) {
    log::debug!("Connecting notification endpoint: {}", endpoint);

    let mut ws = match connect(&endpoint, timeout).await {
        Ok(ws) => ws,
        Err(err) => {
            log::warn!("Connect notification endpoint {} failed: {}", endpoint, err);
            fail(&sender, err, None).await;
            return;
        }
    };

    log::info!("Notification endpoint {} connected", endpoint);

    if !sender.send(ConnectionEvent::Open).await {
        return;
    }

    let mut close = None;

    loop {
        let frame = tokio::select! {
            biased;

            _ = sender.closed() => {
                log::debug!("Event stream dropped, stop reading {}", endpoint);
                return;
            }

            frame = ws.next() => frame,
        };

        match frame {
            Some(Ok(tungstenite::Message::Text(text))) => {
                log::trace!("Received text frame: {}", text);
                if !sender.send(ConnectionEvent::Message(Bytes::from(text))).await {
                    return;
                }
            }
            Some(Ok(tungstenite::Message::Binary(data))) => {
                log::trace!("Received binary frame, {} bytes", data.len());
                if !sender.send(ConnectionEvent::Message(Bytes::from(data))).await {
                    return;
                }
            }
            Some(Ok(tungstenite::Message::Close(frame))) => {
                log::debug!("Received close frame: {:?}", frame);
                close = frame.map(CloseInfo::from);
            }
            Some(Ok(_)) => {
                log::trace!("Ignore control frame");
            }
            Some(Err(
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
            ))
            | None => {
                log::info!("Notification connection {} closed", endpoint);
                sender.send(ConnectionEvent::Close(close.take())).await;
                return;
            }
            Some(Err(err)) => {
                log::warn!("Notification connection {} broken: {}", endpoint, err);
                fail(
                    &sender,
                    TransportError::without_status(err.to_string()),
                    close.take(),
                )
                .await;
                return;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::{future::Future, time::Duration};

    use futures_util::{SinkExt, StreamExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::{
        tungstenite::{
            handshake::server::{ErrorResponse, Request, Response},
            http,
            protocol::{frame::coding::CloseCode, CloseFrame},
            Message,
        },
        WebSocketStream,
    };

    use super::*;

    async fn serve_once<F, Fut>(handler: F) -> Url
    where
        F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = websocket::accept_async(tcp).await.unwrap();
            handler(ws).await;
        });

        Url::parse(&format!("ws://{}/rhn/websocket/notifications", addr)).unwrap()
    }

    async fn collect(stream: EventStream) -> Vec<ConnectionEvent> {
        tokio::time::timeout(Duration::from_secs(5), stream.collect::<Vec<_>>())
            .await
            .expect("event stream should end")
    }

    #[tokio::test]
    async fn test_open_messages_close() {
        let url = serve_once(|mut ws| async move {
            ws.send(Message::Text("3".to_string())).await.unwrap();
            ws.send(Message::Binary(b"7".to_vec())).await.unwrap();
            ws.close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "bye".into(),
            }))
            .await
            .unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        })
        .await;

        let events = collect(WebsocketConnector::new().open(url)).await;

        assert_eq!(
            events,
            vec![
                ConnectionEvent::Open,
                ConnectionEvent::Message(Bytes::from_static(b"3")),
                ConnectionEvent::Message(Bytes::from_static(b"7")),
                ConnectionEvent::Close(Some(CloseInfo {
                    code: 1000,
                    reason: "bye".to_string(),
                })),
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_upgrade_reports_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let reject = |_req: &Request, _resp: Response| -> Result<Response, ErrorResponse> {
                Err(http::Response::builder().status(401).body(None).unwrap())
            };
            let _ = websocket::accept_hdr_async(tcp, reject).await;
        });

        let url = Url::parse(&format!("ws://{}/rhn/websocket/notifications", addr)).unwrap();
        let events = collect(WebsocketConnector::new().open(url)).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_error().unwrap().status, Some(401));
        assert_eq!(events[1], ConnectionEvent::Close(None));
    }

    #[tokio::test]
    async fn test_refused_connection_has_no_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("ws://{}/rhn/websocket/notifications", addr)).unwrap();
        let events = collect(WebsocketConnector::new().open(url)).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_error().unwrap().status, None);
        assert_eq!(events[1], ConnectionEvent::Close(None));
    }

    #[tokio::test]
    async fn test_handshake_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // accept and stay silent
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(tcp);
        });

        let url = Url::parse(&format!("ws://{}/rhn/websocket/notifications", addr)).unwrap();
        let connector =
            WebsocketConnector::new().with_handshake_timeout(Duration::from_millis(100));
        let events = collect(connector.open(url)).await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ConnectionEvent::Error(_)));
        assert!(matches!(events[1], ConnectionEvent::Close(_)));

        server.abort();
    }
}

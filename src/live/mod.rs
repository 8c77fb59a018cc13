// Live module - push channel from the backend
//
// The manager owns a single WebSocket connection and runs this loop until
// shutdown:
//
//   disconnected -> connecting -> connected -> (close | error) -> disconnected
//        ^                                                            |
//        +---------------- sleep min(cap, step * retries) ------------+
//
// Inbound frames are decoded into notifications and routed through a
// dispatch table. Nothing here is fatal: failures only move the state back
// to disconnected and schedule another attempt.

mod backoff;
mod dispatch;
mod error;
mod notification;
mod state;

pub use backoff::{Backoff, BackoffPolicy};
pub use dispatch::DispatchTable;
pub use error::{ChannelError, DecodeError};
pub use notification::{Notification, NotificationKind};
pub use state::ConnectionState;

use crate::transport::SharedTransport;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::COOKIE, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Endpoint and timing of the live channel
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// ws:// URL of the push endpoint
    pub url: String,
    pub backoff: BackoffPolicy,
    /// Upper bound for the WebSocket handshake
    pub connect_timeout: Duration,
}

/// How a connected session ended
enum Exit {
    Shutdown,
    Closed(ChannelError),
}

/// Owner of the push connection
pub struct LiveChannelManager {
    config: LiveConfig,
    dispatch: DispatchTable,
    /// Source of the session cookie for the handshake
    credentials: Option<SharedTransport>,
    backoff: Backoff,
    state_tx: watch::Sender<ConnectionState>,
}

impl LiveChannelManager {
    pub fn new(config: LiveConfig, dispatch: DispatchTable) -> Self {
        let backoff = Backoff::new(config.backoff);
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            dispatch,
            credentials: None,
            backoff,
            state_tx,
        }
    }

    /// Authenticate the handshake with the transport's session cookie
    pub fn with_credentials(mut self, transport: SharedTransport) -> Self {
        self.credentials = Some(transport);
        self
    }

    /// Run the manager on its own task
    pub fn spawn(self) -> LiveHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let state_rx = self.state_tx.subscribe();
        let task = tokio::spawn(self.run(shutdown_rx));
        LiveHandle {
            shutdown_tx: Some(shutdown_tx),
            state_rx,
            task,
        }
    }

    /// Connect / pump / back off until `shutdown` fires or its sender is dropped
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        tracing::info!(
            "Live channel starting ({}, {} handlers)",
            self.config.url,
            self.dispatch.len()
        );

        loop {
            self.set_state(ConnectionState::Connecting);

            let connected = tokio::select! {
                _ = &mut shutdown => break,
                result = self.connect() => result,
            };

            let reason = match connected {
                Ok(ws) => {
                    self.set_state(ConnectionState::Connected);
                    self.backoff.reset();
                    tracing::info!("Live channel connected");
                    match self.pump(ws, &mut shutdown).await {
                        Exit::Shutdown => break,
                        Exit::Closed(reason) => reason,
                    }
                }
                Err(reason) => reason,
            };

            self.set_state(ConnectionState::Disconnected);
            let delay = self.backoff.next_delay();
            tracing::warn!(
                "Live channel {}; retry #{} in {:?}",
                reason,
                self.backoff.retries(),
                delay
            );

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(ConnectionState::Disconnected);
        tracing::info!("Live channel stopped");
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            tracing::debug!("Live channel {} -> {}", previous, state);
        }
    }

    /// Open one connection, bounded by the handshake timeout
    async fn connect(&self) -> Result<WsStream, ChannelError> {
        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| ChannelError::InvalidEndpoint(e.to_string()))?;

        if let Some(cookie) = self.credentials.as_ref().and_then(|t| t.session_cookie()) {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| ChannelError::InvalidEndpoint(e.to_string()))?;
            request.headers_mut().insert(COOKIE, value);
        }

        match tokio::time::timeout(self.config.connect_timeout, connect_async(request)).await {
            Ok(Ok((ws, _response))) => Ok(ws),
            Ok(Err(e)) => Err(ChannelError::Connect(e.to_string())),
            Err(_) => Err(ChannelError::ConnectTimeout(self.config.connect_timeout)),
        }
    }

    /// Read frames until the connection ends or shutdown is requested
    async fn pump(&self, ws: WsStream, shutdown: &mut oneshot::Receiver<()>) -> Exit {
        let (mut sink, mut stream) = ws.split();

        loop {
            tokio::select! {
                _ = &mut *shutdown => {
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        tracing::debug!("Live channel close frame not sent: {}", e);
                    }
                    return Exit::Shutdown;
                }
                frame = stream.next() => match frame {
                    Some(Ok(message)) => {
                        if let Some(reason) = self.handle_message(message) {
                            return Exit::Closed(reason);
                        }
                    }
                    // An error event ends the connection; the caller counts it once
                    Some(Err(e)) => return Exit::Closed(ChannelError::Stream(e.to_string())),
                    None => return Exit::Closed(ChannelError::EndOfStream),
                }
            }
        }
    }

    /// Handle one inbound frame; `Some` means the connection is closing
    fn handle_message(&self, message: Message) -> Option<ChannelError> {
        match message {
            Message::Text(text) => self.handle_text(text.as_str()),
            Message::Binary(data) => match std::str::from_utf8(&data) {
                Ok(text) => self.handle_text(text),
                Err(_) => tracing::warn!("Dropping live frame: {}", DecodeError::NotUtf8),
            },
            Message::Close(frame) => {
                let reason =
                    frame.map(|f| format!("{} {}", u16::from(f.code), f.reason.as_str()));
                return Some(ChannelError::ClosedByServer(reason));
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
        None
    }

    fn handle_text(&self, text: &str) {
        match Notification::decode(text) {
            Ok(notification) => {
                if self.dispatch.dispatch(&notification) {
                    tracing::debug!("Dispatched '{}' notification", notification.kind);
                } else {
                    tracing::debug!(
                        "Ignoring notification of unknown kind '{}'",
                        notification.kind
                    );
                }
            }
            Err(e) => tracing::warn!("Dropping live frame: {}", e),
        }
    }
}

/// Handle to a spawned manager
pub struct LiveHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    state_rx: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl LiveHandle {
    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// A receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Close the connection, stop retrying and wait for the task to end
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::error!("Live channel task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use tokio_tungstenite::accept_async;

    const WAIT: Duration = Duration::from_secs(5);

    fn fast_config(url: String) -> LiveConfig {
        LiveConfig {
            url,
            backoff: BackoffPolicy {
                step: Duration::from_millis(10),
                cap: Duration::from_millis(50),
            },
            connect_timeout: Duration::from_secs(2),
        }
    }

    /// Table that reports every dispatched kind on a channel
    fn recording_table() -> (DispatchTable, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut table = DispatchTable::new();
        for kind in NotificationKind::ALL {
            let tx = tx.clone();
            table.register(kind.as_str(), move |n: &Notification| {
                let _ = tx.send(n.kind.clone());
            });
        }
        (table, rx)
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
        tokio::time::timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for dispatch")
            .expect("dispatch channel closed")
    }

    #[tokio::test]
    async fn test_dispatches_known_kinds_and_survives_garbage() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            for frame in [
                r#"{"type":"greeting_sent","user_id":1}"#,
                "definitely not json",
                r#"{"type":"bot_restarted"}"#,
                "[1,2,3]",
                r#"{"type":"user_upserted","user_id":2}"#,
            ] {
                ws.send(Message::text(frame)).await.unwrap();
            }
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (table, mut dispatched) = recording_table();
        let handle = LiveChannelManager::new(fast_config(url), table).spawn();

        assert_eq!(recv(&mut dispatched).await, "greeting_sent");
        assert_eq!(recv(&mut dispatched).await, "user_upserted");
        assert!(dispatched.try_recv().is_err());
        // Malformed frames did not drop the connection
        assert_eq!(handle.state(), ConnectionState::Connected);

        let mut state = handle.subscribe();
        handle.shutdown().await;
        assert_eq!(*state.borrow_and_update(), ConnectionState::Disconnected);
        tokio::time::timeout(WAIT, server).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_reconnects_after_server_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            // First session: close right away
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            ws.close(None).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}

            // Second session: deliver one notification
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            ws.send(Message::text(r#"{"type":"message_received"}"#))
                .await
                .unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (table, mut dispatched) = recording_table();
        let handle = LiveChannelManager::new(fast_config(url), table).spawn();

        assert_eq!(recv(&mut dispatched).await, "message_received");
        assert_eq!(handle.state(), ConnectionState::Connected);

        handle.shutdown().await;
        tokio::time::timeout(WAIT, server).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_backoff_sleep() {
        // Grab a free port, then release it so every connect is refused
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        drop(listener);

        let config = LiveConfig {
            url,
            backoff: BackoffPolicy {
                step: Duration::from_secs(60),
                cap: Duration::from_secs(60),
            },
            connect_timeout: Duration::from_secs(2),
        };
        let handle = LiveChannelManager::new(config, DispatchTable::new()).spawn();

        let state = handle.subscribe();
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The first attempt was refused and the manager now sleeps for a
        // minute; shutdown must not wait for it
        tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
            .await
            .expect("shutdown blocked on backoff");
        assert_eq!(*state.borrow(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_malformed_frame_keeps_state_and_connection() {
        let (table, mut dispatched) = recording_table();
        let manager = LiveChannelManager::new(fast_config("ws://127.0.0.1:1/ws".into()), table);
        manager.set_state(ConnectionState::Connected);
        let state = manager.state_tx.subscribe();

        assert!(manager.handle_message(Message::text("{oops")).is_none());
        assert!(manager
            .handle_message(Message::binary(vec![0xff, 0xfe]))
            .is_none());

        assert_eq!(*state.borrow(), ConnectionState::Connected);
        assert!(dispatched.try_recv().is_err());
    }

    #[test]
    fn test_close_frame_ends_connection() {
        let manager =
            LiveChannelManager::new(fast_config("ws://127.0.0.1:1/ws".into()), DispatchTable::new());
        let reason = manager.handle_message(Message::Close(None));
        assert_eq!(reason, Some(ChannelError::ClosedByServer(None)));
    }
}

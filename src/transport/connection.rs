//! Connection endpoints and their event loop.
//!
//! A [`Connection`] is one end of a bidirectional message channel. Two kinds
//! exist:
//!
//! | Kind | Identity | Typical peer |
//! |------|----------|--------------|
//! | [`ConnectionKind::Channel`] | never | Same-process page script |
//! | [`ConnectionKind::Port`] | sender's `(tab, frame)` if any | Content script, bridge host |
//!
//! Both kinds share one capability set: `send`, `on_message`, `disconnect`,
//! `on_disconnect` and `identity`.
//!
//! # Event Loop
//!
//! Each connection spawns a tokio task that:
//!
//! - Delivers inbound messages to the message handler, in order
//! - Buffers inbound messages until a handler is installed
//! - Detects the peer going away and runs disconnect handlers
//!
//! # Disconnect Semantics
//!
//! Disconnecting is idempotent. Disconnect handlers run exactly once per
//! connection, whether the local side called [`Connection::disconnect`],
//! the peer disconnected, or both happened at once. Handlers registered
//! after the connection closed run immediately. Sends after disconnect are
//! silently dropped.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::ContentIdentity;
use crate::protocol::Message;

// ============================================================================
// Types
// ============================================================================

/// Message handler callback type.
///
/// Called on the connection's event loop for each inbound message.
pub type MessageHandler = Box<dyn Fn(Message) + Send + Sync>;

/// Disconnect handler callback type.
///
/// Called at most once, when the connection closes.
pub type DisconnectHandler = Box<dyn FnOnce() + Send>;

// ============================================================================
// ConnectionKind
// ============================================================================

/// Transport kind of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Same-process channel. Already scoped to one page by its creator.
    Channel,
    /// Cross-context port, carrying the sender metadata captured when the
    /// port was opened.
    Port {
        /// Sender tab and frame, if the sender was a tab.
        identity: Option<ContentIdentity>,
    },
}

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Install or replace the message handler.
    SetHandler(MessageHandler),
    /// Stop the event loop.
    Shutdown,
}

// ============================================================================
// Shared
// ============================================================================

/// State shared between handles and the event loop.
struct Shared {
    kind: ConnectionKind,
    /// Sender towards the peer. Dropped on close, which the peer observes.
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    disconnect_handlers: Mutex<Vec<DisconnectHandler>>,
    closed: AtomicBool,
}

impl Shared {
    /// Closes the connection. Returns `false` if it was already closed.
    fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }

        drop(self.outbound.lock().take());

        let handlers = mem::take(&mut *self.disconnect_handlers.lock());
        for handler in handlers {
            handler();
        }

        true
    }
}

// ============================================================================
// Connection
// ============================================================================

/// One endpoint of a message channel.
///
/// Cloning yields another handle to the same endpoint. The event loop stops
/// when the endpoint is disconnected, when the peer goes away, or when the
/// last handle is dropped.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    shared: Arc<Shared>,
}

impl Connection {
    /// Creates a connected pair of same-process channel endpoints.
    ///
    /// Neither end reports an identity.
    #[must_use]
    pub fn channel_pair() -> (Self, Self) {
        Self::pair(ConnectionKind::Channel, ConnectionKind::Channel)
    }

    /// Creates a connected pair of cross-context port endpoints.
    ///
    /// The first endpoint is the receiving side: it reports `identity`, the
    /// sender metadata of whoever opened the port. The second endpoint is the
    /// opener's side and reports no identity.
    #[must_use]
    pub fn port_pair(identity: Option<ContentIdentity>) -> (Self, Self) {
        Self::pair(
            ConnectionKind::Port { identity },
            ConnectionKind::Port { identity: None },
        )
    }

    /// Wires two endpoints together and spawns their event loops.
    fn pair(local: ConnectionKind, remote: ConnectionKind) -> (Self, Self) {
        let (local_tx, remote_rx) = mpsc::unbounded_channel();
        let (remote_tx, local_rx) = mpsc::unbounded_channel();

        (Self::new(local, local_tx, local_rx), Self::new(remote, remote_tx, remote_rx))
    }

    /// Creates an endpoint from its channel halves.
    ///
    /// Spawns the event loop task internally.
    fn new(
        kind: ConnectionKind,
        outbound: mpsc::UnboundedSender<Message>,
        inbound: mpsc::UnboundedReceiver<Message>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            kind,
            outbound: Mutex::new(Some(outbound)),
            disconnect_handlers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        });

        tokio::spawn(Self::run_event_loop(
            Arc::clone(&shared),
            inbound,
            command_rx,
        ));

        Self { command_tx, shared }
    }
}

// ============================================================================
// Connection - Public API
// ============================================================================

impl Connection {
    /// Returns the transport kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ConnectionKind {
        self.shared.kind
    }

    /// Returns the sender identity.
    ///
    /// Channels never have one; ports have one when opened from a tab.
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Option<ContentIdentity> {
        match self.shared.kind {
            ConnectionKind::Channel => None,
            ConnectionKind::Port { identity } => identity,
        }
    }

    /// Returns `true` once the connection has been closed from either side.
    #[inline]
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Sends a message to the peer.
    ///
    /// Silently dropped if the connection is closed.
    pub fn send(&self, message: Message) {
        if let Err(e) = self.try_send(message) {
            trace!(error = %e, "Dropping message on closed connection");
        }
    }

    /// Sends a message to the peer, reporting a closed connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if either side has disconnected.
    pub fn try_send(&self, message: Message) -> Result<()> {
        let outbound = self.shared.outbound.lock();
        let tx = outbound.as_ref().ok_or(Error::ConnectionClosed)?;
        tx.send(message).map_err(|_| Error::ConnectionClosed)
    }

    /// Sets the message handler.
    ///
    /// Messages received before a handler was set are delivered to it first,
    /// in arrival order. Replaces any previous handler.
    pub fn on_message(&self, handler: MessageHandler) {
        if self
            .command_tx
            .send(ConnectionCommand::SetHandler(handler))
            .is_err()
        {
            trace!("Message handler set on stopped connection");
        }
    }

    /// Registers a disconnect handler.
    ///
    /// Runs once when the connection closes, or immediately if it already has.
    pub fn on_disconnect(&self, handler: DisconnectHandler) {
        {
            let mut handlers = self.shared.disconnect_handlers.lock();
            if !self.is_disconnected() {
                handlers.push(handler);
                return;
            }
        }

        handler();
    }

    /// Disconnects this endpoint.
    ///
    /// Runs local disconnect handlers and lets the peer observe the
    /// disconnect. Calling it again is a no-op.
    pub fn disconnect(&self) {
        if self.shared.close() {
            debug!(kind = ?self.shared.kind, "Connection disconnected locally");
        }
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Returns a stream of inbound messages.
    ///
    /// Installs a message handler that forwards into the returned receiver,
    /// replacing any previous handler. The receiver ends when the connection
    /// closes.
    #[must_use]
    pub fn messages(&self) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx = Arc::new(Mutex::new(Some(tx)));

        let on_close = Arc::clone(&tx);
        self.on_message(Box::new(move |message| {
            if let Some(tx) = tx.lock().as_ref() {
                let _ = tx.send(message);
            }
        }));
        self.on_disconnect(Box::new(move || {
            on_close.lock().take();
        }));

        rx
    }

    /// Waits until the connection closes.
    pub async fn closed(&self) {
        let (tx, rx) = oneshot::channel();
        self.on_disconnect(Box::new(move || {
            let _ = tx.send(());
        }));
        let _ = rx.await;
    }
}

// ============================================================================
// Connection - Event Loop
// ============================================================================

impl Connection {
    /// Event loop that delivers inbound messages and watches for closure.
    async fn run_event_loop(
        shared: Arc<Shared>,
        mut inbound: mpsc::UnboundedReceiver<Message>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
    ) {
        let mut handler: Option<MessageHandler> = None;
        let mut pending: Vec<Message> = Vec::new();

        loop {
            tokio::select! {
                biased;

                // Commands from handles
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::SetHandler(new_handler)) => {
                            for message in pending.drain(..) {
                                new_handler(message);
                            }
                            handler = Some(new_handler);
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            trace!("Shutdown command received");
                            break;
                        }

                        None => {
                            debug!("All connection handles dropped");
                            break;
                        }
                    }
                }

                // Messages from the peer
                message = inbound.recv() => {
                    match message {
                        Some(message) => match handler {
                            Some(ref handler) => handler(message),
                            None => pending.push(message),
                        },

                        None => {
                            debug!(kind = ?shared.kind, "Peer disconnected");
                            break;
                        }
                    }
                }
            }
        }

        shared.close();

        if !pending.is_empty() {
            trace!(count = pending.len(), "Discarded undelivered messages");
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("kind", &self.shared.kind)
            .field("disconnected", &self.is_disconnected())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::time::timeout;

    use crate::identifiers::{FrameId, TabId};

    const WAIT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_channel_has_no_identity() {
        let (a, b) = Connection::channel_pair();
        assert_eq!(a.identity(), None);
        assert_eq!(b.identity(), None);
        assert_eq!(a.kind(), ConnectionKind::Channel);
    }

    #[tokio::test]
    async fn test_port_reports_sender_identity() {
        let identity = ContentIdentity::new(TabId::new(5), FrameId::main());
        let (relay_side, content_side) = Connection::port_pair(Some(identity));

        assert_eq!(relay_side.identity(), Some(identity));
        assert_eq!(content_side.identity(), None);
    }

    #[tokio::test]
    async fn test_messages_delivered_in_order() {
        let (a, b) = Connection::channel_pair();
        let mut rx = b.messages();

        for i in 0..10 {
            a.send(Message::new(format!("bridge:/m{i}")));
        }

        for i in 0..10 {
            let message = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
            assert_eq!(message.subject, format!("bridge:/m{i}"));
        }
    }

    #[tokio::test]
    async fn test_messages_buffered_until_handler_set() {
        let (a, b) = Connection::channel_pair();
        a.send(Message::new("bridge:/early"));
        tokio::task::yield_now().await;

        let mut rx = b.messages();
        a.send(Message::new("bridge:/late"));

        assert_eq!(rx.recv().await.unwrap().subject, "bridge:/early");
        assert_eq!(rx.recv().await.unwrap().subject, "bridge:/late");
    }

    #[tokio::test]
    async fn test_disconnect_observed_by_peer() {
        let (a, b) = Connection::port_pair(None);
        a.disconnect();

        timeout(WAIT, b.closed()).await.unwrap();
        assert!(a.is_disconnected());
        assert!(b.is_disconnected());
    }

    #[tokio::test]
    async fn test_disconnect_handlers_fire_once() {
        let (a, b) = Connection::channel_pair();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        a.on_disconnect(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        a.disconnect();
        b.disconnect();
        a.disconnect();
        timeout(WAIT, a.closed()).await.unwrap();
        tokio::task::yield_now().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_on_disconnect_after_close_runs_immediately() {
        let (a, _b) = Connection::channel_pair();
        a.disconnect();

        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        a.on_disconnect(Box::new(move || flag.store(true, Ordering::SeqCst)));

        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_send_after_disconnect_is_silent() {
        let (a, _b) = Connection::channel_pair();
        a.disconnect();

        a.send(Message::new("bridge:/ignored"));
        assert!(matches!(
            a.try_send(Message::new("bridge:/ignored")),
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_dropping_all_handles_disconnects_peer() {
        let (a, b) = Connection::port_pair(None);
        drop(a);

        timeout(WAIT, b.closed()).await.unwrap();
    }
}

//! Message routing between a relay's two connections.
//!
//! # Routing Rules
//!
//! **Bridge → content**: every message, verbatim.
//!
//! **Content → relay**:
//! - `bridge:/…` is forwarded verbatim to the bridge
//! - `main:/shimInitialized` replays `shim:/serviceUp` for every known receiver
//! - `main:/selectReceiverBegin` starts a selection
//! - `main:/sessionCreated` closes the shared selector if the user asked to
//!   keep it open until a session was established
//! - any other `main:/…` subject is ignored

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::collaborators::{
    OptionStore, RECEIVER_SELECTOR_WAIT_FOR_CONNECTION, ReceiverSelector, ReceiverStatus,
};
use crate::error::Result;
use crate::protocol::{ContentMessage, Message, Namespace};

use super::core::Relay;
use super::selection::SelectionCoordinator;

// ============================================================================
// MessageRouter
// ============================================================================

/// Cross-wires relay connections and handles `main:/…` control messages.
pub struct MessageRouter {
    status: Arc<dyn ReceiverStatus>,
    selector: Arc<dyn ReceiverSelector>,
    options: Arc<dyn OptionStore>,
    coordinator: Arc<SelectionCoordinator>,
}

impl MessageRouter {
    /// Creates a router.
    #[must_use]
    pub fn new(
        status: Arc<dyn ReceiverStatus>,
        selector: Arc<dyn ReceiverSelector>,
        options: Arc<dyn OptionStore>,
        coordinator: Arc<SelectionCoordinator>,
    ) -> Self {
        Self {
            status,
            selector,
            options,
            coordinator,
        }
    }

    /// Installs message handlers on both connections of `relay`.
    ///
    /// Handlers hold the relay weakly; once it is gone they do nothing.
    pub fn wire(self: &Arc<Self>, relay: &Arc<Relay>) {
        let content = relay.content().clone();
        let id = relay.id();
        relay.bridge().on_message(Box::new(move |message| {
            trace!(relay_id = %id, subject = %message.subject, "bridge → content");
            content.send(message);
        }));

        let router = Arc::clone(self);
        let weak = Arc::downgrade(relay);
        relay.content().on_message(Box::new(move |message| {
            if let Some(relay) = weak.upgrade() {
                router.dispatch(&relay, message);
            }
        }));
    }

    /// Handles one message from the content side.
    pub fn dispatch(self: &Arc<Self>, relay: &Arc<Relay>, message: Message) {
        if message.namespace() == Namespace::Bridge {
            trace!(relay_id = %relay.id(), subject = %message.subject, "content → bridge");
            relay.bridge().send(message.clone());
        }

        match message.parse() {
            ContentMessage::ShimInitialized => self.replay_receivers(relay),

            ContentMessage::SelectReceiverBegin => {
                let coordinator = Arc::clone(&self.coordinator);
                let relay = Arc::clone(relay);
                tokio::spawn(async move {
                    coordinator.run(&relay).await;
                });
            }

            ContentMessage::SessionCreated => {
                let router = Arc::clone(self);
                let id = relay.id();
                tokio::spawn(async move {
                    if let Err(e) = router.close_selector_after_session().await {
                        warn!(relay_id = %id, error = %e, "Failed to close receiver selector");
                    }
                });
            }

            ContentMessage::UnknownMain => {
                debug!(relay_id = %relay.id(), subject = %message.subject, "Ignoring unknown subject");
            }

            ContentMessage::Bridge | ContentMessage::Other => {}
        }
    }

    /// Sends `shim:/serviceUp` for every receiver already known.
    fn replay_receivers(&self, relay: &Relay) {
        let receivers = self.status.receivers();
        debug!(relay_id = %relay.id(), count = receivers.len(), "Replaying known receivers");

        for receiver in receivers {
            relay.content().send(Message::service_up(&receiver.id));
        }
    }

    /// Closes the shared selector if it waited for the session.
    async fn close_selector_after_session(&self) -> Result<()> {
        let selector = self.selector.shared_selector().await?;
        if !selector.is_open() {
            return Ok(());
        }

        let wait_for_connection = self
            .options
            .get(RECEIVER_SELECTOR_WAIT_FOR_CONNECTION)
            .await?
            .and_then(|value| value.as_bool())
            .unwrap_or(false);

        if wait_for_connection {
            debug!("Session created, closing receiver selector");
            selector.close();
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{Value, json};
    use tokio::sync::{broadcast, mpsc};
    use tokio::time::{sleep, timeout};

    use crate::collaborators::{LoadSenderRequest, SelectorWindow, SenderLoader, StatusEvent};
    use crate::identifiers::ReceiverId;
    use crate::protocol::{MediaType, MediaTypes, ReceiverDevice, Selection, subject};
    use crate::transport::Connection;

    const WAIT: Duration = Duration::from_secs(1);

    struct FixedStatus(Vec<ReceiverDevice>);

    impl ReceiverStatus for FixedStatus {
        fn receivers(&self) -> Vec<ReceiverDevice> {
            self.0.clone()
        }

        fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
            broadcast::channel(1).1
        }
    }

    struct Window {
        open: AtomicBool,
        closed: AtomicBool,
    }

    impl SelectorWindow for Window {
        fn is_open(&self) -> bool {
            self.open.load(Ordering::SeqCst)
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    struct TestSelector {
        window: Arc<Window>,
        selection: Option<Selection>,
    }

    #[async_trait]
    impl ReceiverSelector for TestSelector {
        async fn selection(
            &self,
            _preferred: MediaType,
            _allowed: MediaTypes,
        ) -> Result<Option<Selection>> {
            Ok(self.selection.clone())
        }

        async fn shared_selector(&self) -> Result<Arc<dyn SelectorWindow>> {
            Ok(self.window.clone())
        }
    }

    struct TestOptions(Option<Value>);

    #[async_trait]
    impl OptionStore for TestOptions {
        async fn get(&self, key: &str) -> Result<Option<Value>> {
            assert_eq!(key, RECEIVER_SELECTOR_WAIT_FOR_CONNECTION);
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct NoopLoader(Mutex<Vec<LoadSenderRequest>>);

    #[async_trait]
    impl SenderLoader for NoopLoader {
        async fn load_sender(&self, request: LoadSenderRequest) -> Result<()> {
            self.0.lock().push(request);
            Ok(())
        }
    }

    struct Fixture {
        relay: Arc<Relay>,
        page: Connection,
        host: Connection,
        window: Arc<Window>,
    }

    fn fixture(window_open: bool, wait_option: Option<Value>) -> Fixture {
        let window = Arc::new(Window {
            open: AtomicBool::new(window_open),
            closed: AtomicBool::new(false),
        });
        let selector = Arc::new(TestSelector {
            window: window.clone(),
            selection: Some(Selection::new(MediaType::App)),
        });
        let coordinator = Arc::new(SelectionCoordinator::new(
            selector.clone(),
            Arc::new(NoopLoader::default()),
            MediaTypes::ALL,
        ));
        let router = Arc::new(MessageRouter::new(
            Arc::new(FixedStatus(vec![ReceiverDevice::new("a"), ReceiverDevice::new("b")])),
            selector,
            Arc::new(TestOptions(wait_option)),
            coordinator,
        ));

        let (content, page) = Connection::channel_pair();
        let (bridge, host) = Connection::port_pair(None);
        let relay = Arc::new(Relay::new(bridge, content));
        router.wire(&relay);

        Fixture {
            relay,
            page,
            host,
            window,
        }
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Message>) -> Message {
        timeout(WAIT, rx.recv()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_bridge_messages_forwarded_to_content() {
        let f = fixture(false, None);
        let mut page_rx = f.page.messages();

        for i in 0..5 {
            f.host.send(Message::with_data("shim:/castMessage", json!(i)));
        }

        for i in 0..5 {
            assert_eq!(next(&mut page_rx).await.data, Some(json!(i)));
        }
    }

    #[tokio::test]
    async fn test_bridge_namespace_forwarded_to_bridge() {
        let f = fixture(false, None);
        let mut host_rx = f.host.messages();

        let message = Message::with_data("bridge:/sendCastMessage", json!({ "x": 1 }));
        f.page.send(message.clone());

        assert_eq!(next(&mut host_rx).await, message);
    }

    #[tokio::test]
    async fn test_main_namespace_not_forwarded() {
        let f = fixture(false, None);
        let mut host_rx = f.host.messages();

        f.page.send(Message::new("main:/unknownThing"));
        f.page.send(Message::new("bridge:/marker"));

        assert_eq!(next(&mut host_rx).await.subject, "bridge:/marker");
    }

    #[tokio::test]
    async fn test_shim_initialized_replays_receivers() {
        let f = fixture(false, None);
        let mut page_rx = f.page.messages();

        f.page.send(Message::new(subject::MAIN_SHIM_INITIALIZED));

        assert_eq!(next(&mut page_rx).await, Message::service_up(&ReceiverId::new("a")));
        assert_eq!(next(&mut page_rx).await, Message::service_up(&ReceiverId::new("b")));
    }

    #[tokio::test]
    async fn test_select_receiver_begin_runs_selection() {
        let f = fixture(false, None);
        let mut page_rx = f.page.messages();

        f.page.send(Message::new(subject::MAIN_SELECT_RECEIVER_BEGIN));

        let message = next(&mut page_rx).await;
        assert_eq!(message.subject, subject::SHIM_SELECT_RECEIVER_END);
        assert_eq!(message.data, Some(json!({ "mediaType": 1 })));
    }

    #[tokio::test]
    async fn test_session_created_closes_waiting_selector() {
        let f = fixture(true, Some(json!(true)));

        f.page.send(Message::new(subject::MAIN_SESSION_CREATED));

        timeout(WAIT, async {
            while !f.window.closed.load(Ordering::SeqCst) {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_session_created_keeps_selector_without_option() {
        let f = fixture(true, Some(json!(false)));
        let mut page_rx = f.page.messages();

        f.page.send(Message::new(subject::MAIN_SESSION_CREATED));
        f.page.send(Message::new(subject::MAIN_SHIM_INITIALIZED));
        next(&mut page_rx).await;
        sleep(Duration::from_millis(20)).await;

        assert!(!f.window.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_session_created_ignores_closed_selector() {
        let f = fixture(false, Some(json!(true)));

        f.page.send(Message::new(subject::MAIN_SESSION_CREATED));
        sleep(Duration::from_millis(20)).await;

        assert!(!f.window.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_forwarding_stops_after_relay_dropped() {
        let f = fixture(false, None);
        let page = f.page.clone();
        drop(f.relay);

        timeout(WAIT, page.closed()).await.unwrap();
        timeout(WAIT, f.host.closed()).await.unwrap();
    }
}

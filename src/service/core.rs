//! The relay service.
//!
//! [`ShimRelay`] owns the relay registry, the message router and the status
//! broadcaster, and accepts incoming content connections.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collaborators::{Bridge, OptionStore, ReceiverSelector, ReceiverStatus, SenderLoader};
use crate::error::Result;
use crate::protocol::Message;
use crate::relay::{MessageRouter, Relay, RelayRegistry, SelectionCoordinator, StatusBroadcaster};
use crate::transport::Connection;

use super::builder::ShimRelayBuilder;
use super::options::RelayOptions;

// ============================================================================
// ShimRelay
// ============================================================================

/// Accepts content connections and relays them to the bridge.
///
/// Use [`ShimRelay::builder()`] to create one.
pub struct ShimRelay {
    bridge: Arc<dyn Bridge>,
    registry: Arc<RelayRegistry>,
    router: Arc<MessageRouter>,
    broadcaster: StatusBroadcaster,
    options: RelayOptions,
}

// ============================================================================
// ShimRelay - Constructor
// ============================================================================

impl ShimRelay {
    /// Creates a new builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ShimRelayBuilder {
        ShimRelayBuilder::new()
    }

    /// Wires the components together and starts the status broadcaster.
    pub(crate) fn new(
        bridge: Arc<dyn Bridge>,
        status: Arc<dyn ReceiverStatus>,
        selector: Arc<dyn ReceiverSelector>,
        option_store: Arc<dyn OptionStore>,
        sender_loader: Arc<dyn SenderLoader>,
        options: RelayOptions,
    ) -> Self {
        let registry = RelayRegistry::new(Arc::clone(&bridge), options.bridge_connect_timeout);

        let coordinator = Arc::new(SelectionCoordinator::new(
            Arc::clone(&selector),
            sender_loader,
            options.allowed_media_types,
        ));
        let router = Arc::new(MessageRouter::new(
            Arc::clone(&status),
            selector,
            option_store,
            coordinator,
        ));
        let broadcaster = StatusBroadcaster::spawn(Arc::clone(&status), Arc::clone(&registry));

        info!(port_name = %options.port_name, "Shim relay started");

        Self {
            bridge,
            registry,
            router,
            broadcaster,
            options,
        }
    }
}

// ============================================================================
// ShimRelay - Public API
// ============================================================================

impl ShimRelay {
    /// Accepts a content connection and creates its relay.
    ///
    /// Opens the bridge side, evicts any relay with the same content
    /// identity, wires both connections and sends `shim:/initialized`.
    ///
    /// # Errors
    ///
    /// Returns the relay creation error. The content connection has been
    /// disconnected in that case.
    pub async fn accept(&self, content: Connection) -> Result<Arc<Relay>> {
        let relay = match self.registry.create(content.clone()).await {
            Ok(relay) => relay,
            Err(e) => {
                warn!(error = %e, identity = ?content.identity(), "Relay creation failed");
                content.disconnect();
                return Err(e);
            }
        };

        self.router.wire(&relay);

        let info = self.bridge.info().await;
        match Message::initialized(&info) {
            Ok(message) => relay.content().send(message),
            Err(e) => warn!(relay_id = %relay.id(), error = %e, "Failed to encode bridge info"),
        }

        Ok(relay)
    }

    /// Accepts a named cross-context port.
    ///
    /// Ports with a name other than [`RelayOptions::port_name`] belong to
    /// someone else and are left untouched.
    ///
    /// # Errors
    ///
    /// See [`ShimRelay::accept`].
    pub async fn accept_named(&self, name: &str, content: Connection) -> Result<Option<Arc<Relay>>> {
        if name != self.options.port_name {
            debug!(port_name = %name, "Ignoring port with foreign name");
            return Ok(None);
        }

        self.accept(content).await.map(Some)
    }

    /// Returns the relay registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<RelayRegistry> {
        &self.registry
    }

    /// Returns the relay options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &RelayOptions {
        &self.options
    }

    /// Stops status forwarding and closes every relay.
    pub fn shutdown(&self) {
        info!(active = self.registry.len(), "Shim relay shutting down");
        self.broadcaster.stop();
        self.registry.disconnect_all();
    }
}

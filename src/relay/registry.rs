//! Registry of active relays.
//!
//! Owns every live [`Relay`] and enforces that at most one relay exists per
//! content identity.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             RelayRegistry               │
//! │  ┌─────────────────────────────────┐    │
//! │  │ RelayId=a → Relay (tab 5, f 0)  │    │
//! │  │ RelayId=b → Relay (tab 9, f 2)  │    │
//! │  │ RelayId=c → Relay (channel)     │    │
//! │  └─────────────────────────────────┘    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Creating a relay whose identity collides with a registered one evicts the
//! older relay: its bridge connection is disconnected, which tears the rest
//! of it down.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::collaborators::Bridge;
use crate::error::{Error, Result};
use crate::identifiers::{ContentIdentity, RelayId};
use crate::protocol::Message;
use crate::transport::Connection;

use super::core::Relay;

// ============================================================================
// RelayRegistry
// ============================================================================

/// Process-wide set of active relays.
///
/// The map lock is never held across an `.await` or while connection
/// callbacks run.
pub struct RelayRegistry {
    /// Bridge used to open the bridge side of new relays.
    bridge: Arc<dyn Bridge>,
    /// Upper bound on a bridge connect.
    connect_timeout: Duration,
    /// Active relays by ID.
    relays: RwLock<FxHashMap<RelayId, Arc<Relay>>>,
    /// Handle to self for teardown callbacks.
    this: Weak<Self>,
}

// ============================================================================
// RelayRegistry - Constructor
// ============================================================================

impl RelayRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(bridge: Arc<dyn Bridge>, connect_timeout: Duration) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            bridge,
            connect_timeout,
            relays: RwLock::new(FxHashMap::default()),
            this: this.clone(),
        })
    }
}

// ============================================================================
// RelayRegistry - Lifecycle
// ============================================================================

impl RelayRegistry {
    /// Creates and registers a relay for a content connection.
    ///
    /// Opens a bridge connection first. If the content connection carries an
    /// identity, any registered relay with the same identity is evicted
    /// before this call returns.
    ///
    /// # Errors
    ///
    /// - [`Error::BridgeConnection`] if the bridge cannot be reached
    /// - [`Error::ConnectionTimeout`] if the bridge does not connect in time
    /// - [`Error::ConnectionClosed`] if the content side disconnected while
    ///   the bridge was connecting
    ///
    /// On error nothing stays registered and no existing relay is evicted;
    /// closing the content connection is up to the caller.
    pub async fn create(&self, content: Connection) -> Result<Arc<Relay>> {
        let bridge = self.connect_bridge().await?;
        let relay = Arc::new(Relay::new(bridge, content));

        let evicted = {
            let mut relays = self.relays.write();

            // A content side that left during the connect must not displace a live relay.
            if relay.content().is_disconnected() {
                drop(relays);
                debug!(
                    relay_id = %relay.id(),
                    identity = ?relay.identity(),
                    "Content closed before registration"
                );
                return Err(Error::ConnectionClosed);
            }

            let evicted: Vec<Arc<Relay>> = match relay.identity() {
                Some(identity) => {
                    let colliding: Vec<RelayId> = relays
                        .values()
                        .filter(|r| r.identity() == Some(identity))
                        .map(|r| r.id())
                        .collect();
                    colliding
                        .iter()
                        .filter_map(|id| relays.remove(id))
                        .collect()
                }
                None => Vec::new(),
            };
            relays.insert(relay.id(), Arc::clone(&relay));
            evicted
        };

        for old in evicted {
            debug!(
                relay_id = %old.id(),
                replaced_by = %relay.id(),
                identity = ?old.identity(),
                "Evicting relay with colliding identity"
            );
            old.bridge().disconnect();
        }

        self.install_teardown(&relay);

        if relay.is_closed() {
            self.remove(relay.id());
            return Err(Error::ConnectionClosed);
        }

        info!(
            relay_id = %relay.id(),
            identity = ?relay.identity(),
            active = self.len(),
            "Relay created"
        );

        Ok(relay)
    }

    /// Deregisters a relay.
    ///
    /// Returns the relay if it was registered; removing an absent relay is a
    /// no-op.
    pub fn remove(&self, id: RelayId) -> Option<Arc<Relay>> {
        let removed = self.relays.write().remove(&id);

        if removed.is_some() {
            debug!(relay_id = %id, "Relay removed from registry");
        }

        removed
    }

    /// Disconnects and deregisters every relay.
    pub fn disconnect_all(&self) {
        let relays: Vec<_> = {
            let mut map = self.relays.write();
            map.drain().map(|(_, relay)| relay).collect()
        };

        for relay in relays {
            relay.disconnect();
            debug!(relay_id = %relay.id(), "Relay closed during shutdown");
        }
    }

    /// Opens the bridge side of a relay, bounded by the connect timeout.
    async fn connect_bridge(&self) -> Result<Connection> {
        match timeout(self.connect_timeout, self.bridge.connect()).await {
            Ok(Ok(connection)) => Ok(connection),
            Ok(Err(e)) if e.is_bridge_failure() => Err(e),
            Ok(Err(e)) => Err(Error::bridge_connection(e.to_string())),
            Err(_) => {
                let timeout_ms = u64::try_from(self.connect_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(timeout_ms, "Bridge connect timed out");
                Err(Error::connection_timeout(timeout_ms))
            }
        }
    }

    /// Couples the two connections of a relay.
    ///
    /// Either side disconnecting deregisters the relay and disconnects the
    /// other side. Both steps are idempotent, so concurrent closes are harmless.
    fn install_teardown(&self, relay: &Arc<Relay>) {
        let id = relay.id();

        let content = relay.content().clone();
        let registry = self.this.clone();
        relay.bridge().on_disconnect(Box::new(move || {
            debug!(relay_id = %id, "Bridge side disconnected");
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
            content.disconnect();
        }));

        let bridge = relay.bridge().clone();
        let registry = self.this.clone();
        relay.content().on_disconnect(Box::new(move || {
            debug!(relay_id = %id, "Content side disconnected");
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
            bridge.disconnect();
        }));
    }
}

// ============================================================================
// RelayRegistry - Queries
// ============================================================================

impl RelayRegistry {
    /// Sends a message to the content side of every relay.
    ///
    /// Fire-and-forget: closed connections are skipped silently.
    pub fn broadcast(&self, message: &Message) {
        for relay in self.relays() {
            relay.content().send(message.clone());
        }
    }

    /// Returns a snapshot of all registered relays.
    #[must_use]
    pub fn relays(&self) -> Vec<Arc<Relay>> {
        self.relays.read().values().cloned().collect()
    }

    /// Returns the relay registered for an identity.
    #[must_use]
    pub fn find(&self, identity: ContentIdentity) -> Option<Arc<Relay>> {
        self.relays
            .read()
            .values()
            .find(|r| r.identity() == Some(identity))
            .cloned()
    }

    /// Returns the relay with the given ID.
    #[must_use]
    pub fn get(&self, id: RelayId) -> Option<Arc<Relay>> {
        self.relays.read().get(&id).cloned()
    }

    /// Returns the number of registered relays.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.relays.read().len()
    }

    /// Returns `true` if no relay is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relays.read().is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

//! A single relay session between a content endpoint and the bridge.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::identifiers::{ContentIdentity, RelayId};
use crate::transport::Connection;

// ============================================================================
// Relay
// ============================================================================

/// One active bridge session.
///
/// Owns both connections. The two are lifecycle-coupled: once either side
/// disconnects the relay is torn down, see [`Relay::disconnect`].
pub struct Relay {
    /// Registry key.
    id: RelayId,
    /// Bridge-side connection.
    bridge: Connection,
    /// Content-side connection.
    content: Connection,
    /// Content identity, captured at creation. `None` for channels.
    identity: Option<ContentIdentity>,
    /// Set while a receiver selection is in flight.
    selecting: AtomicBool,
}

impl Relay {
    /// Creates a relay from its two connections.
    pub(crate) fn new(bridge: Connection, content: Connection) -> Self {
        Self {
            id: RelayId::generate(),
            identity: content.identity(),
            bridge,
            content,
            selecting: AtomicBool::new(false),
        }
    }

    /// Returns the relay ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RelayId {
        self.id
    }

    /// Returns the content identity, if the content side is a port.
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Option<ContentIdentity> {
        self.identity
    }

    /// Returns the bridge-side connection.
    #[inline]
    #[must_use]
    pub fn bridge(&self) -> &Connection {
        &self.bridge
    }

    /// Returns the content-side connection.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &Connection {
        &self.content
    }

    /// Returns `true` once either side has disconnected.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.bridge.is_disconnected() || self.content.is_disconnected()
    }

    /// Disconnects both sides. Idempotent.
    pub fn disconnect(&self) {
        self.bridge.disconnect();
        self.content.disconnect();
    }

    /// Marks a selection as in flight.
    ///
    /// Returns `None` if another selection is already in flight for this
    /// relay. The returned guard clears the mark when dropped.
    #[must_use]
    pub fn try_begin_selection(&self) -> Option<SelectionGuard<'_>> {
        self.selecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SelectionGuard { relay: self })
    }

    /// Returns `true` while a selection is in flight.
    #[inline]
    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.selecting.load(Ordering::Acquire)
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        if !self.is_closed() {
            debug!(relay_id = %self.id, "Relay dropped while open");
        }
        self.disconnect();
    }
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ============================================================================
// SelectionGuard
// ============================================================================

/// Marks a relay as awaiting a selection until dropped.
#[derive(Debug)]
pub struct SelectionGuard<'a> {
    relay: &'a Relay,
}

impl Drop for SelectionGuard<'_> {
    fn drop(&mut self) {
        self.relay.selecting.store(false, Ordering::Release);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::time::timeout;

    use crate::identifiers::{FrameId, TabId};

    #[tokio::test]
    async fn test_relay_takes_identity_from_content() {
        let identity = ContentIdentity::new(TabId::new(7), FrameId::new(2));
        let (content, _page) = Connection::port_pair(Some(identity));
        let (bridge, _host) = Connection::port_pair(None);

        let relay = Relay::new(bridge, content);
        assert_eq!(relay.identity(), Some(identity));
    }

    #[tokio::test]
    async fn test_channel_relay_has_no_identity() {
        let (content, _page) = Connection::channel_pair();
        let (bridge, _host) = Connection::port_pair(None);

        let relay = Relay::new(bridge, content);
        assert_eq!(relay.identity(), None);
    }

    #[tokio::test]
    async fn test_selection_guard_is_exclusive() {
        let (content, _page) = Connection::channel_pair();
        let (bridge, _host) = Connection::port_pair(None);
        let relay = Relay::new(bridge, content);

        let guard = relay.try_begin_selection();
        assert!(guard.is_some());
        assert!(relay.is_selecting());
        assert!(relay.try_begin_selection().is_none());

        drop(guard);
        assert!(!relay.is_selecting());
        assert!(relay.try_begin_selection().is_some());
    }

    #[tokio::test]
    async fn test_drop_disconnects_peers() {
        let (content, page) = Connection::channel_pair();
        let (bridge, host) = Connection::port_pair(None);

        drop(Relay::new(bridge, content));

        timeout(Duration::from_secs(1), page.closed()).await.unwrap();
        timeout(Duration::from_secs(1), host.closed()).await.unwrap();
    }
}

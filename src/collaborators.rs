//! Interfaces of the services the relay depends on.
//!
//! | Trait | Role |
//! |-------|------|
//! | [`Bridge`] | Opens bridge connections, reports bridge version |
//! | [`ReceiverStatus`] | Known receivers and availability events |
//! | [`ReceiverSelector`] | Receiver selection UI |
//! | [`SelectorWindow`] | Handle to the shared selector UI |
//! | [`OptionStore`] | Persisted user options |
//! | [`SenderLoader`] | Starts a sender for a non-app media type |
//!
//! Implementations are shared behind `Arc<dyn Trait>`.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::identifiers::{ContentIdentity, FrameId, ReceiverId, TabId};
use crate::protocol::{BridgeInfo, MediaType, MediaTypes, ReceiverDevice, Selection};
use crate::transport::Connection;

// ============================================================================
// Constants
// ============================================================================

/// Option key: keep the selector open until the session is established.
pub const RECEIVER_SELECTOR_WAIT_FOR_CONNECTION: &str = "receiverSelectorWaitForConnection";

// ============================================================================
// Bridge
// ============================================================================

/// The out-of-process bridge that talks to receivers.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Opens a new bridge connection.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::BridgeConnection`] if the bridge cannot be
    /// reached.
    async fn connect(&self) -> Result<Connection>;

    /// Returns bridge version information.
    async fn info(&self) -> BridgeInfo;
}

// ============================================================================
// ReceiverStatus
// ============================================================================

/// Receiver availability event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// A receiver was discovered.
    ServiceUp {
        /// Receiver identifier.
        id: ReceiverId,
    },
    /// A receiver disappeared.
    ServiceDown {
        /// Receiver identifier.
        id: ReceiverId,
    },
}

/// Receiver discovery state.
pub trait ReceiverStatus: Send + Sync {
    /// Returns the receivers currently known.
    fn receivers(&self) -> Vec<ReceiverDevice>;

    /// Subscribes to availability events.
    fn subscribe(&self) -> broadcast::Receiver<StatusEvent>;
}

// ============================================================================
// ReceiverSelector
// ============================================================================

/// Handle to the selector UI shared between relays.
pub trait SelectorWindow: Send + Sync {
    /// Returns `true` while the selector is shown.
    fn is_open(&self) -> bool;

    /// Closes the selector.
    fn close(&self);
}

/// The receiver selection service.
#[async_trait]
pub trait ReceiverSelector: Send + Sync {
    /// Asks the user to pick a receiver.
    ///
    /// Suspends until the user decides. Returns `Ok(None)` if the user
    /// dismissed the selector.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Selection`] if the selector is unavailable.
    async fn selection(
        &self,
        preferred: MediaType,
        allowed: MediaTypes,
    ) -> Result<Option<Selection>>;

    /// Returns the shared selector UI handle.
    async fn shared_selector(&self) -> Result<Arc<dyn SelectorWindow>>;
}

// ============================================================================
// OptionStore
// ============================================================================

/// Persisted user options.
#[async_trait]
pub trait OptionStore: Send + Sync {
    /// Reads an option. `Ok(None)` if unset.
    async fn get(&self, key: &str) -> Result<Option<Value>>;
}

// ============================================================================
// SenderLoader
// ============================================================================

/// Request to start a sender for a non-app selection.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSenderRequest {
    /// Tab to load the sender into.
    pub tab_id: TabId,
    /// Frame to load the sender into.
    pub frame_id: FrameId,
    /// The selection the sender should act on.
    pub selection: Selection,
}

impl LoadSenderRequest {
    /// Creates a request targeting `identity`.
    #[inline]
    #[must_use]
    pub fn new(identity: ContentIdentity, selection: Selection) -> Self {
        Self {
            tab_id: identity.tab_id,
            frame_id: identity.frame_id,
            selection,
        }
    }
}

/// Starts senders for media types other than a cast application.
#[async_trait]
pub trait SenderLoader: Send + Sync {
    /// Loads a sender.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SenderLoad`] if the sender cannot be started.
    async fn load_sender(&self, request: LoadSenderRequest) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================

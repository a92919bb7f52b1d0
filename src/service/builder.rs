//! Builder pattern for the relay service.
//!
//! # Example
//!
//! ```ignore
//! use cast_shim_relay::ShimRelay;
//!
//! let relay = ShimRelay::builder()
//!     .bridge(bridge)
//!     .status(status)
//!     .selector(selector)
//!     .options(options)
//!     .sender_loader(loader)
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::collaborators::{Bridge, OptionStore, ReceiverSelector, ReceiverStatus, SenderLoader};
use crate::error::{Error, Result};

use super::core::ShimRelay;
use super::options::RelayOptions;

// ============================================================================
// ShimRelayBuilder
// ============================================================================

/// Builder for configuring a [`ShimRelay`].
///
/// Use [`ShimRelay::builder()`] to create a new builder.
#[derive(Default)]
pub struct ShimRelayBuilder {
    bridge: Option<Arc<dyn Bridge>>,
    status: Option<Arc<dyn ReceiverStatus>>,
    selector: Option<Arc<dyn ReceiverSelector>>,
    option_store: Option<Arc<dyn OptionStore>>,
    sender_loader: Option<Arc<dyn SenderLoader>>,
    relay_options: RelayOptions,
}

// ============================================================================
// ShimRelayBuilder Implementation
// ============================================================================

impl ShimRelayBuilder {
    /// Creates a builder with no collaborators.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bridge.
    #[inline]
    #[must_use]
    pub fn bridge(mut self, bridge: Arc<dyn Bridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Sets the receiver status source.
    #[inline]
    #[must_use]
    pub fn status(mut self, status: Arc<dyn ReceiverStatus>) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the receiver selector.
    #[inline]
    #[must_use]
    pub fn selector(mut self, selector: Arc<dyn ReceiverSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Sets the persisted option store.
    #[inline]
    #[must_use]
    pub fn options(mut self, store: Arc<dyn OptionStore>) -> Self {
        self.option_store = Some(store);
        self
    }

    /// Sets the sender loader.
    #[inline]
    #[must_use]
    pub fn sender_loader(mut self, loader: Arc<dyn SenderLoader>) -> Self {
        self.sender_loader = Some(loader);
        self
    }

    /// Sets the relay options.
    #[inline]
    #[must_use]
    pub fn relay_options(mut self, options: RelayOptions) -> Self {
        self.relay_options = options;
        self
    }

    /// Builds the service and starts the status broadcaster.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a collaborator is missing or the relay
    /// options are inconsistent.
    pub fn build(self) -> Result<ShimRelay> {
        self.relay_options.validate()?;

        let bridge = self.bridge.ok_or_else(|| Error::config("Bridge is required"))?;
        let status = self
            .status
            .ok_or_else(|| Error::config("Receiver status is required"))?;
        let selector = self
            .selector
            .ok_or_else(|| Error::config("Receiver selector is required"))?;
        let option_store = self
            .option_store
            .ok_or_else(|| Error::config("Option store is required"))?;
        let sender_loader = self
            .sender_loader
            .ok_or_else(|| Error::config("Sender loader is required"))?;

        Ok(ShimRelay::new(
            bridge,
            status,
            selector,
            option_store,
            sender_loader,
            self.relay_options,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::MediaTypes;

    #[test]
    fn test_build_without_collaborators_fails() {
        let result = ShimRelayBuilder::new().build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_build_rejects_invalid_options() {
        let result = ShimRelayBuilder::new()
            .relay_options(RelayOptions::default().with_allowed_media_types(MediaTypes::NONE))
            .build();

        match result {
            Err(Error::Config { message }) => assert_eq!(message, "No media type allowed"),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_bridge_reported_first() {
        match ShimRelayBuilder::new().build() {
            Err(Error::Config { message }) => assert_eq!(message, "Bridge is required"),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }
}

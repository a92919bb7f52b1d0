//! Relay service options.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use cast_shim_relay::RelayOptions;
//!
//! let options = RelayOptions::new()
//!     .with_bridge_connect_timeout(Duration::from_secs(5))
//!     .with_port_name("shim");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};
use crate::protocol::{MediaType, MediaTypes};

// ============================================================================
// Constants
// ============================================================================

/// Default upper bound on a bridge connect.
pub const DEFAULT_BRIDGE_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Port name content scripts use to reach the relay.
pub const DEFAULT_PORT_NAME: &str = "shim";

// ============================================================================
// RelayOptions
// ============================================================================

/// Tunables of the relay service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOptions {
    /// Media types a selection may resolve to.
    ///
    /// Selections always prefer [`MediaType::App`], so the mask must contain it.
    pub allowed_media_types: MediaTypes,

    /// Upper bound on opening the bridge side of a relay.
    pub bridge_connect_timeout: Duration,

    /// Port name accepted by [`crate::ShimRelay::accept_named`].
    pub port_name: String,
}

// ============================================================================
// Constructors
// ============================================================================

impl RelayOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            allowed_media_types: MediaTypes::ALL,
            bridge_connect_timeout: DEFAULT_BRIDGE_CONNECT_TIMEOUT,
            port_name: DEFAULT_PORT_NAME.to_string(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl RelayOptions {
    /// Sets the media types a selection may resolve to.
    #[inline]
    #[must_use]
    pub fn with_allowed_media_types(mut self, media_types: MediaTypes) -> Self {
        self.allowed_media_types = media_types;
        self
    }

    /// Sets the bridge connect timeout.
    #[inline]
    #[must_use]
    pub fn with_bridge_connect_timeout(mut self, timeout: Duration) -> Self {
        self.bridge_connect_timeout = timeout;
        self
    }

    /// Sets the accepted port name.
    #[inline]
    #[must_use]
    pub fn with_port_name(mut self, name: impl Into<String>) -> Self {
        self.port_name = name.into();
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl RelayOptions {
    /// Checks that the options are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the allowed mask is empty or lacks
    /// [`MediaType::App`], the timeout is zero or the port name is empty.
    pub fn validate(&self) -> Result<()> {
        if self.allowed_media_types.is_empty() {
            return Err(Error::config("No media type allowed"));
        }

        if !self.allowed_media_types.contains(MediaType::App) {
            return Err(Error::config(format!(
                "Allowed media types must include {}",
                MediaType::App
            )));
        }

        if self.bridge_connect_timeout.is_zero() {
            return Err(Error::config("Bridge connect timeout must be positive"));
        }

        if self.port_name.is_empty() {
            return Err(Error::config("Port name must not be empty"));
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

    #[test]
    fn test_default_options() {
        let options = RelayOptions::default();
        assert_eq!(options.allowed_media_types, MediaTypes::ALL);
        assert_eq!(options.bridge_connect_timeout, DEFAULT_BRIDGE_CONNECT_TIMEOUT);
        assert_eq!(options.port_name, "shim");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let options = RelayOptions::default()
            .with_bridge_connect_timeout(Duration::from_secs(5))
            .with_port_name("cast");

        assert_eq!(options.bridge_connect_timeout.as_secs(), 5);
        assert_eq!(options.port_name, "cast");
    }

    #[test]
    fn test_validate_requires_app() {
        let options = RelayOptions::default()
            .with_allowed_media_types(MediaTypes::only(MediaType::Tab).with(MediaType::Screen));

        match options.validate() {
            Err(Error::Config { message }) => assert!(message.contains("must include")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_narrowed_mask_with_app() {
        let options = RelayOptions::default()
            .with_allowed_media_types(MediaTypes::only(MediaType::App).with(MediaType::Tab));

        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_mask() {
        let options = RelayOptions::default().with_allowed_media_types(MediaTypes::NONE);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let options = RelayOptions::default().with_bridge_connect_timeout(Duration::ZERO);
        assert!(options.validate().is_err());
    }
}

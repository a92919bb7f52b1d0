//! Error types for the shim relay.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use cast_shim_relay::{Result, ShimRelay};
//!
//! async fn example(relay: &ShimRelay, port: Connection) -> Result<()> {
//!     let relay = relay.accept(port).await?;
//!     println!("relay {} active", relay.id());
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::BridgeConnection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Collaborators | [`Error::Selection`], [`Error::SenderLoad`] |
//! | Protocol | [`Error::Protocol`] |
//! | External | [`Error::Json`] |
//!
//! An identity collision between two relays is not an error: the older
//! relay is evicted silently.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the relay service is built with missing collaborators
    /// or inconsistent options.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Bridge connection could not be established.
    ///
    /// Returned by relay creation. No relay is registered and the caller
    /// is expected to close the content connection.
    #[error("Bridge connection failed: {message}")]
    BridgeConnection {
        /// Description of the connection error.
        message: String,
    },

    /// Bridge did not connect within the configured timeout.
    #[error("Bridge connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Connection already disconnected.
    ///
    /// Only returned by checked sends; plain sends on a closed connection
    /// are silent no-ops.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// Receiver selection failed.
    ///
    /// Raised by selector implementations. The selection coordinator
    /// reports it to content as a cancellation.
    #[error("Receiver selection failed: {message}")]
    Selection {
        /// Description of the selection failure.
        message: String,
    },

    /// Loading an alternate sender failed.
    #[error("Sender load failed: {message}")]
    SenderLoad {
        /// Description of the load failure.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Malformed message or subject.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a bridge connection error.
    #[inline]
    pub fn bridge_connection(message: impl Into<String>) -> Self {
        Self::BridgeConnection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a selection error.
    #[inline]
    pub fn selection(message: impl Into<String>) -> Self {
        Self::Selection {
            message: message.into(),
        }
    }

    /// Creates a sender load error.
    #[inline]
    pub fn sender_load(message: impl Into<String>) -> Self {
        Self::SenderLoad {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. })
    }

    /// Returns `true` if the bridge side of a relay could not be set up.
    #[inline]
    #[must_use]
    pub fn is_bridge_failure(&self) -> bool {
        matches!(
            self,
            Self::BridgeConnection { .. } | Self::ConnectionTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::BridgeConnection { .. } | Self::ConnectionTimeout { .. } | Self::ConnectionClosed
        )
    }

    /// Returns `true` if a collaborator reported the failure.
    #[inline]
    #[must_use]
    pub fn is_collaborator_error(&self) -> bool {
        matches!(self, Self::Selection { .. } | Self::SenderLoad { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

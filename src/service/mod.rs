//! Relay service and its configuration.
//!
//! Use [`ShimRelay::builder()`] to create a configured service.

// ============================================================================
// Submodules
// ============================================================================

/// Builder for the relay service.
pub mod builder;

/// The relay service.
pub mod core;

/// Relay service options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ShimRelayBuilder;
pub use self::core::ShimRelay;
pub use options::{DEFAULT_BRIDGE_CONNECT_TIMEOUT, DEFAULT_PORT_NAME, RelayOptions};

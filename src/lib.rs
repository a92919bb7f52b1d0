//! Cast shim relay - bridges in-page cast shims to the cast bridge process.
//!
//! A web page using the emulated casting API talks to a *content* endpoint.
//! The relay pairs every content endpoint with its own connection to the
//! *bridge*, the out-of-process service that talks to physical receivers,
//! and forwards messages between the two.
//!
//! # Architecture
//!
//! - **Content side**: a same-process channel or a cross-context port that
//!   carries the sender's `(tab, frame)`
//! - **Bridge side**: one bridge connection per relay
//! - **Control traffic**: `main:/…` messages are handled by the relay,
//!   `bridge:/…` messages are forwarded, `shim:/…` messages go to content
//!
//! Key invariants:
//!
//! - At most one relay per `(tab, frame)`; a newer one evicts the older
//! - Either side disconnecting tears the whole relay down, exactly once
//! - Messages on one connection are forwarded in order
//!
//! # Quick Start
//!
//! ```ignore
//! use cast_shim_relay::{Connection, ContentIdentity, FrameId, Result, ShimRelay, TabId};
//!
//! async fn run(relay: ShimRelay) -> Result<()> {
//!     let identity = ContentIdentity::new(TabId::new(5), FrameId::main());
//!     let (relay_side, content_side) = Connection::port_pair(Some(identity));
//!
//!     let relay = relay.accept(relay_side).await?;
//!     println!("relay {} ready", relay.id());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`collaborators`] | Interfaces of bridge, status, selector, options, sender loader |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Message envelope, subjects and selections |
//! | [`relay`] | Relays, registry, routing, selection, status fan-out |
//! | [`service`] | The [`ShimRelay`] service and its options |
//! | [`transport`] | Connection endpoints |

// ============================================================================
// Modules
// ============================================================================

/// Interfaces of the services the relay depends on.
pub mod collaborators;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Message types.
pub mod protocol;

/// Relays between content endpoints and the bridge.
pub mod relay;

/// Relay service.
///
/// Use [`ShimRelay::builder()`] to create a configured service.
pub mod service;

/// Connection transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Collaborator interfaces
pub use collaborators::{
    Bridge, LoadSenderRequest, OptionStore, RECEIVER_SELECTOR_WAIT_FOR_CONNECTION,
    ReceiverSelector, ReceiverStatus, SelectorWindow, SenderLoader, StatusEvent,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ContentIdentity, FrameId, ReceiverId, RelayId, TabId};

// Protocol types
pub use protocol::{BridgeInfo, MediaType, MediaTypes, Message, ReceiverDevice, Selection};

// Relay types
pub use relay::{Relay, RelayRegistry, SelectionOutcome};

// Service types
pub use service::{RelayOptions, ShimRelay, ShimRelayBuilder};

// Transport types
pub use transport::{Connection, ConnectionKind};

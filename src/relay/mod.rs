//! Relays between content endpoints and the bridge.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   content    ┌───────────────────────────┐    bridge    ┌──────────────┐
//! │  In-page     │  connection  │          Relay            │  connection  │  Bridge      │
//! │  shim        │◄────────────►│  MessageRouter            │◄────────────►│  process     │
//! │              │              │  SelectionCoordinator     │              │              │
//! └──────────────┘              └───────────────────────────┘              └──────────────┘
//!                                  ▲                    ▲
//!                      RelayRegistry (dedup)   StatusBroadcaster (fan-out)
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | A single relay and its selection guard |
//! | `registry` | Active relays, identity dedup, broadcast |
//! | `router` | Message forwarding and control dispatch |
//! | `selection` | Receiver selection handshake |
//! | `status` | Receiver availability fan-out |

// ============================================================================
// Submodules
// ============================================================================

/// A single relay session.
pub mod core;

/// Registry of active relays.
pub mod registry;

/// Message routing.
pub mod router;

/// Receiver selection handshake.
pub mod selection;

/// Receiver availability fan-out.
pub mod status;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::{Relay, SelectionGuard};
pub use registry::RelayRegistry;
pub use router::MessageRouter;
pub use selection::{SelectionCoordinator, SelectionOutcome};
pub use status::StatusBroadcaster;

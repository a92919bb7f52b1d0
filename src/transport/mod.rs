//! Connection transport layer.
//!
//! Unifies the two transport kinds a relay deals with behind one
//! [`Connection`] type:
//!
//! ```text
//! ┌─────────────────┐   same-process channel   ┌─────────────────┐
//! │  Page script    │◄────────────────────────►│                 │
//! └─────────────────┘                          │   Relay         │
//! ┌─────────────────┐   cross-context port     │                 │
//! │  Content script │◄────────────────────────►│                 │
//! │  (tab, frame)   │                          └─────────────────┘
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Connection endpoints and their event loop |

// ============================================================================
// Submodules
// ============================================================================

/// Connection endpoints and their event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ConnectionKind, DisconnectHandler, MessageHandler};

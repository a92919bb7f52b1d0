//! Message types exchanged between content, relay and bridge.
//!
//! # Protocol Overview
//!
//! | Subject | Direction | Payload |
//! |---------|-----------|---------|
//! | `shim:/initialized` | relay → content | [`BridgeInfo`] |
//! | `shim:/serviceUp` | relay → content | `{ id }` |
//! | `shim:/serviceDown` | relay → content | `{ id }` |
//! | `shim:/selectReceiverCancelled` | relay → content | none |
//! | `shim:/selectReceiverEnd` | relay → content | [`Selection`] |
//! | `main:/shimInitialized` | content → relay | none |
//! | `main:/selectReceiverBegin` | content → relay | none |
//! | `main:/sessionCreated` | content → relay | none |
//! | `bridge:/…` | content → bridge | opaque |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `info` | Bridge info and receiver descriptions |
//! | `message` | The `{ subject, data? }` envelope |
//! | `selection` | Media types and selection results |
//! | `subject` | Subject grammar and constants |

// ============================================================================
// Submodules
// ============================================================================

/// Bridge info and receiver descriptions.
pub mod info;

/// Message envelope.
pub mod message;

/// Media types and selections.
pub mod selection;

/// Subject grammar and constants.
pub mod subject;

// ============================================================================
// Re-exports
// ============================================================================

pub use info::{BridgeInfo, ReceiverDevice};
pub use message::{ContentMessage, Message};
pub use selection::{MediaType, MediaTypes, Selection};
pub use subject::Namespace;

//! Type-safe identifiers for relays, content contexts and receivers.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Wraps | Source |
//! |------|-------|--------|
//! | [`TabId`] | `u32` | Sender metadata of a cross-context port |
//! | [`FrameId`] | `u64` | Sender metadata (0 = top-level frame) |
//! | [`ContentIdentity`] | `(TabId, FrameId)` | Dedup key for relays |
//! | [`RelayId`] | `Uuid` | Generated per relay |
//! | [`ReceiverId`] | `String` | Opaque id from receiver discovery |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// TabId
// ============================================================================

/// Browser tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u32);

impl TabId {
    /// Creates a tab ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// FrameId
// ============================================================================

/// Frame identifier within a tab.
///
/// Frame `0` is the top-level document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(u64);

impl FrameId {
    /// Creates a frame ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the top-level frame ID.
    #[inline]
    #[must_use]
    pub const fn main() -> Self {
        Self(0)
    }

    /// Returns `true` for the top-level frame.
    #[inline]
    #[must_use]
    pub const fn is_main(self) -> bool {
        self.0 == 0
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ContentIdentity
// ============================================================================

/// The (tab, frame) pair a cross-context content connection belongs to.
///
/// At most one relay may exist per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIdentity {
    /// Tab the content endpoint lives in.
    pub tab_id: TabId,
    /// Frame the content endpoint lives in.
    pub frame_id: FrameId,
}

impl ContentIdentity {
    /// Creates an identity from its parts.
    #[inline]
    #[must_use]
    pub const fn new(tab_id: TabId, frame_id: FrameId) -> Self {
        Self { tab_id, frame_id }
    }
}

impl fmt::Display for ContentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab={}, frame={}", self.tab_id, self.frame_id)
    }
}

// ============================================================================
// RelayId
// ============================================================================

/// Unique identifier of a relay within the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayId(Uuid);

impl RelayId {
    /// Generates a new random relay ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ReceiverId
// ============================================================================

/// Opaque receiver identifier assigned by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiverId(String);

impl ReceiverId {
    /// Creates a receiver ID.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReceiverId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id_main() {
        assert!(FrameId::main().is_main());
        assert!(!FrameId::new(3).is_main());
    }

    #[test]
    fn test_identity_equality() {
        let a = ContentIdentity::new(TabId::new(5), FrameId::main());
        let b = ContentIdentity::new(TabId::new(5), FrameId::new(0));
        let c = ContentIdentity::new(TabId::new(5), FrameId::new(1));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "tab=5, frame=0");
    }

    #[test]
    fn test_relay_id_unique() {
        assert_ne!(RelayId::generate(), RelayId::generate());
    }

    #[test]
    fn test_receiver_id_serializes_as_string() {
        let id = ReceiverId::from("living-room");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"living-room\"");
    }
}

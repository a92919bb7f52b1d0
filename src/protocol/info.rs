//! Bridge and receiver descriptions exchanged with content.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identifiers::ReceiverId;

// ============================================================================
// BridgeInfo
// ============================================================================

/// Bridge version information, sent with `shim:/initialized`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeInfo {
    /// Bridge application name.
    pub name: String,
    /// Installed bridge version.
    pub version: String,
    /// Version the extension was built against.
    pub expected_version: String,
    /// Installed version equals the expected one.
    pub is_version_exact: bool,
    /// Installed version is protocol compatible.
    pub is_version_compatible: bool,
    /// Installed version is older than expected.
    pub is_version_older: bool,
    /// Installed version is newer than expected.
    pub is_version_newer: bool,
}

// ============================================================================
// ReceiverDevice
// ============================================================================

/// A receiver known to the status collaborator.
///
/// Only `id` is interpreted; everything else is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverDevice {
    /// Receiver identifier.
    pub id: ReceiverId,

    /// Remaining receiver fields (name, address, status, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReceiverDevice {
    /// Creates a receiver with only an ID.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ReceiverId>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_bridge_info_camel_case() {
        let info = BridgeInfo {
            name: "fx_cast_bridge".into(),
            version: "0.3.1".into(),
            expected_version: "0.3.1".into(),
            is_version_exact: true,
            is_version_compatible: true,
            ..Default::default()
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["expectedVersion"], "0.3.1");
        assert_eq!(value["isVersionCompatible"], true);
        assert_eq!(value["isVersionNewer"], false);
    }

    #[test]
    fn test_receiver_device_keeps_extra_fields() {
        let device: ReceiverDevice = serde_json::from_value(json!({
            "id": "r1",
            "friendlyName": "Kitchen"
        }))
        .unwrap();

        assert_eq!(device.id.as_str(), "r1");
        assert_eq!(device.extra["friendlyName"], "Kitchen");
    }
}

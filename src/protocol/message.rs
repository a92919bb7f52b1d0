//! The message envelope carried on every connection.
//!
//! # Format
//!
//! ```json
//! {
//!   "subject": "namespace:/action",
//!   "data": { ... }
//! }
//! ```
//!
//! `data` is optional. The relay only looks at the subject namespace;
//! payloads are relayed verbatim.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;
use crate::identifiers::ReceiverId;

use super::info::BridgeInfo;
use super::selection::Selection;
use super::subject::{self, Namespace};

// ============================================================================
// Message
// ============================================================================

/// A message exchanged between content, relay and bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Subject in `namespace:/action` format.
    pub subject: String,

    /// Optional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Message {
    /// Creates a message without payload.
    #[inline]
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            data: None,
        }
    }

    /// Creates a message with payload.
    #[inline]
    #[must_use]
    pub fn with_data(subject: impl Into<String>, data: Value) -> Self {
        Self {
            subject: subject.into(),
            data: Some(data),
        }
    }

    /// Returns the subject namespace.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        Namespace::of(&self.subject)
    }

    /// Returns the subject action.
    #[inline]
    #[must_use]
    pub fn action(&self) -> &str {
        subject::action(&self.subject)
    }

    /// Parses a content message into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ContentMessage {
        match self.subject.as_str() {
            subject::MAIN_SHIM_INITIALIZED => ContentMessage::ShimInitialized,
            subject::MAIN_SELECT_RECEIVER_BEGIN => ContentMessage::SelectReceiverBegin,
            subject::MAIN_SESSION_CREATED => ContentMessage::SessionCreated,
            _ => match self.namespace() {
                Namespace::Bridge => ContentMessage::Bridge,
                Namespace::Main => ContentMessage::UnknownMain,
                _ => ContentMessage::Other,
            },
        }
    }
}

// ============================================================================
// Message - Relay Constructors
// ============================================================================

impl Message {
    /// `shim:/initialized` with bridge info.
    pub fn initialized(info: &BridgeInfo) -> Result<Self> {
        Ok(Self::with_data(
            subject::SHIM_INITIALIZED,
            serde_json::to_value(info)?,
        ))
    }

    /// `shim:/serviceUp` with `{ id }`.
    #[must_use]
    pub fn service_up(id: &ReceiverId) -> Self {
        Self::with_data(subject::SHIM_SERVICE_UP, json!({ "id": id }))
    }

    /// `shim:/serviceDown` with `{ id }`.
    #[must_use]
    pub fn service_down(id: &ReceiverId) -> Self {
        Self::with_data(subject::SHIM_SERVICE_DOWN, json!({ "id": id }))
    }

    /// `shim:/selectReceiverCancelled` without payload.
    #[must_use]
    pub fn select_receiver_cancelled() -> Self {
        Self::new(subject::SHIM_SELECT_RECEIVER_CANCELLED)
    }

    /// `shim:/selectReceiverEnd` with the selection.
    pub fn select_receiver_end(selection: &Selection) -> Result<Self> {
        Ok(Self::with_data(
            subject::SHIM_SELECT_RECEIVER_END,
            serde_json::to_value(selection)?,
        ))
    }
}

// ============================================================================
// ContentMessage
// ============================================================================

/// Content-originated messages, classified for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMessage {
    /// `main:/shimInitialized`.
    ShimInitialized,
    /// `main:/selectReceiverBegin`.
    SelectReceiverBegin,
    /// `main:/sessionCreated`.
    SessionCreated,
    /// Any `bridge:/…` subject.
    Bridge,
    /// A `main:/…` subject this relay does not handle.
    UnknownMain,
    /// Any other namespace.
    Other,
}

// ============================================================================
// Tests
// ============================================================================

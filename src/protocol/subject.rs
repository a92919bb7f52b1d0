//! Message subjects and namespaces.
//!
//! Subjects have the form `<namespace>:/<action>`:
//!
//! | Namespace | Direction | Handling |
//! |-----------|-----------|----------|
//! | `shim` | relay → content | Control messages emitted by the relay |
//! | `main` | content → relay | Control messages handled by the relay |
//! | `bridge` | content → bridge | Forwarded verbatim |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Separator between namespace and action.
pub const SEPARATOR: &str = ":/";

/// Relay → content: bridge info after wiring.
pub const SHIM_INITIALIZED: &str = "shim:/initialized";

/// Relay → content: a receiver became available.
pub const SHIM_SERVICE_UP: &str = "shim:/serviceUp";

/// Relay → content: a receiver went away.
pub const SHIM_SERVICE_DOWN: &str = "shim:/serviceDown";

/// Relay → content: selection ended without an app selection.
pub const SHIM_SELECT_RECEIVER_CANCELLED: &str = "shim:/selectReceiverCancelled";

/// Relay → content: selection completed.
pub const SHIM_SELECT_RECEIVER_END: &str = "shim:/selectReceiverEnd";

/// Content → relay: the shim finished loading.
pub const MAIN_SHIM_INITIALIZED: &str = "main:/shimInitialized";

/// Content → relay: start a receiver selection.
pub const MAIN_SELECT_RECEIVER_BEGIN: &str = "main:/selectReceiverBegin";

/// Content → relay: the bridge established a session.
pub const MAIN_SESSION_CREATED: &str = "main:/sessionCreated";

// ============================================================================
// Namespace
// ============================================================================

/// Namespace prefix of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `shim:/…` control messages to content.
    Shim,
    /// `main:/…` control messages from content.
    Main,
    /// `bridge:/…` messages for the bridge.
    Bridge,
    /// Anything else, including subjects without a separator.
    Unknown,
}

impl Namespace {
    /// Returns the namespace of a subject string.
    #[must_use]
    pub fn of(subject: &str) -> Self {
        match split(subject) {
            Some(("shim", _)) => Self::Shim,
            Some(("main", _)) => Self::Main,
            Some(("bridge", _)) => Self::Bridge,
            _ => Self::Unknown,
        }
    }

    /// Returns the namespace prefix as written in subjects.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shim => "shim",
            Self::Main => "main",
            Self::Bridge => "bridge",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Splits a subject into `(namespace, action)`.
///
/// Returns `None` if the subject has no `:/` separator.
#[inline]
#[must_use]
pub fn split(subject: &str) -> Option<(&str, &str)> {
    subject.split_once(SEPARATOR)
}

/// Returns the action part of a subject, or `""` without a separator.
#[inline]
#[must_use]
pub fn action(subject: &str) -> &str {
    split(subject).map(|(_, action)| action).unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_namespace_of_known_subjects() {
        assert_eq!(Namespace::of(SHIM_SERVICE_UP), Namespace::Shim);
        assert_eq!(Namespace::of(MAIN_SESSION_CREATED), Namespace::Main);
        assert_eq!(Namespace::of("bridge:/createCastSession"), Namespace::Bridge);
    }

    #[test]
    fn test_namespace_unknown() {
        assert_eq!(Namespace::of("popup:/open"), Namespace::Unknown);
        assert_eq!(Namespace::of("bridge"), Namespace::Unknown);
        assert_eq!(Namespace::of(""), Namespace::Unknown);
    }

    #[test]
    fn test_action() {
        assert_eq!(action(MAIN_SELECT_RECEIVER_BEGIN), "selectReceiverBegin");
        assert_eq!(action("no-separator"), "");
    }

    #[test]
    fn test_action_keeps_nested_separators() {
        assert_eq!(action("bridge:/session:/stop"), "session:/stop");
    }

    proptest! {
        #[test]
        fn prop_namespace_roundtrip(action in "[a-zA-Z/:]{0,24}") {
            for ns in [Namespace::Shim, Namespace::Main, Namespace::Bridge] {
                let subject = format!("{ns}{SEPARATOR}{action}");
                prop_assert_eq!(Namespace::of(&subject), ns);
                prop_assert_eq!(super::action(&subject), action.as_str());
            }
        }
    }
}

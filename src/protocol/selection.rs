//! Receiver selection types.
//!
//! A selection names the media type the user picked plus type-specific
//! details (receiver, file path, ...). Media types travel as numeric flags.
//!
//! | Media type | Flag |
//! |------------|------|
//! | [`MediaType::App`] | `1` |
//! | [`MediaType::Tab`] | `2` |
//! | [`MediaType::Screen`] | `4` |
//! | [`MediaType::File`] | `8` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ============================================================================
// MediaType
// ============================================================================

/// What the user chose to cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum MediaType {
    /// A cast application (the page's own sender).
    App = 1,
    /// Mirror the current tab.
    Tab = 2,
    /// Mirror the screen.
    Screen = 4,
    /// Cast a local file.
    File = 8,
}

impl MediaType {
    /// All media types in flag order.
    pub const ALL: [Self; 4] = [Self::App, Self::Tab, Self::Screen, Self::File];

    /// Returns the numeric flag.
    #[inline]
    #[must_use]
    pub const fn flag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MediaType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::App),
            2 => Ok(Self::Tab),
            4 => Ok(Self::Screen),
            8 => Ok(Self::File),
            other => Err(Error::protocol(format!("Unknown media type flag: {other}"))),
        }
    }
}

impl From<MediaType> for u8 {
    fn from(media_type: MediaType) -> Self {
        media_type.flag()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::App => "app",
            Self::Tab => "tab",
            Self::Screen => "screen",
            Self::File => "file",
        };
        f.write_str(name)
    }
}

// ============================================================================
// MediaTypes
// ============================================================================

/// Set of media types, encoded as the OR of their flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaTypes(u8);

impl MediaTypes {
    /// Empty set.
    pub const NONE: Self = Self(0);

    /// Every media type.
    pub const ALL: Self = Self(0b1111);

    /// Creates a set holding one media type.
    #[inline]
    #[must_use]
    pub const fn only(media_type: MediaType) -> Self {
        Self(media_type.flag())
    }

    /// Returns the set with `media_type` added.
    #[inline]
    #[must_use]
    pub const fn with(self, media_type: MediaType) -> Self {
        Self(self.0 | media_type.flag())
    }

    /// Returns `true` if `media_type` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, media_type: MediaType) -> bool {
        self.0 & media_type.flag() != 0
    }

    /// Returns `true` if the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 & Self::ALL.0 == 0
    }

    /// Returns the raw mask.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Iterates the contained media types in flag order.
    pub fn iter(self) -> impl Iterator<Item = MediaType> {
        MediaType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<MediaType> for MediaTypes {
    fn from_iter<I: IntoIterator<Item = MediaType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Outcome of a receiver selection.
///
/// # Format
///
/// ```json
/// {
///   "mediaType": 1,
///   "receiver": { "id": "...", "friendlyName": "Living Room" }
/// }
/// ```
///
/// Everything except `mediaType` is kept verbatim in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Chosen media type.
    #[serde(rename = "mediaType")]
    pub media_type: MediaType,

    /// Type-specific details.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Selection {
    /// Creates a selection without details.
    #[inline]
    #[must_use]
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            details: Map::new(),
        }
    }

    /// Adds a detail field.
    #[inline]
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Returns `true` if the selection continues the cast-application flow.
    #[inline]
    #[must_use]
    pub fn is_app(&self) -> bool {
        self.media_type == MediaType::App
    }

    /// Returns a detail field by name.
    #[inline]
    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

// ============================================================================
// Tests
// ============================================================================

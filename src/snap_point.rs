//! The closed set of rest positions a sheet can settle at.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A rest position of the sheet.
///
/// Ordered from most closed to most open, which is also the order used by
/// the keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnapPoint {
    /// Only the drag handle peeks out from the bottom edge
    #[default]
    Closed,
    /// Sheet covers the lower half of the viewport
    Half,
    /// Sheet covers almost the whole viewport
    Full,
}

/// Rejected conversion into a [`SnapPoint`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapPointError {
    #[error("Unknown snap point name {0:?} (expected closed, half or full)")]
    UnknownName(String),
    #[error("Snap point index {0} out of range (expected 0..=2)")]
    OutOfRange(u8),
}

impl SnapPoint {
    /// All snap points, in resolver tie-break order (most open first).
    pub const ALL: [SnapPoint; 3] = [SnapPoint::Full, SnapPoint::Half, SnapPoint::Closed];

    /// The next point towards `Full`, or `None` when already fully open.
    pub fn more_open(self) -> Option<SnapPoint> {
        match self {
            SnapPoint::Closed => Some(SnapPoint::Half),
            SnapPoint::Half => Some(SnapPoint::Full),
            SnapPoint::Full => None,
        }
    }

    /// The next point towards `Closed`, or `None` when already closed.
    pub fn more_closed(self) -> Option<SnapPoint> {
        match self {
            SnapPoint::Full => Some(SnapPoint::Half),
            SnapPoint::Half => Some(SnapPoint::Closed),
            SnapPoint::Closed => None,
        }
    }

    pub fn is_closed(self) -> bool {
        self == SnapPoint::Closed
    }

    /// Opacity of the backdrop dimmer while resting at this point.
    pub fn backdrop_opacity(self) -> f32 {
        match self {
            SnapPoint::Closed => 0.0,
            SnapPoint::Half => 0.3,
            SnapPoint::Full => 0.5,
        }
    }

    /// Whether the backdrop should receive clicks (and close the sheet).
    pub fn backdrop_interactive(self) -> bool {
        !self.is_closed()
    }

    /// Whether the host page should stop scrolling underneath the sheet.
    pub fn locks_scroll(self) -> bool {
        self == SnapPoint::Full
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SnapPoint::Closed => "closed",
            SnapPoint::Half => "half",
            SnapPoint::Full => "full",
        }
    }
}

impl fmt::Display for SnapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapPoint {
    type Err = SnapPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closed" => Ok(SnapPoint::Closed),
            "half" => Ok(SnapPoint::Half),
            "full" => Ok(SnapPoint::Full),
            _ => Err(SnapPointError::UnknownName(s.to_string())),
        }
    }
}

impl TryFrom<u8> for SnapPoint {
    type Error = SnapPointError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SnapPoint::Closed),
            1 => Ok(SnapPoint::Half),
            2 => Ok(SnapPoint::Full),
            other => Err(SnapPointError::OutOfRange(other)),
        }
    }
}

impl From<SnapPoint> for u8 {
    fn from(point: SnapPoint) -> Self {
        match point {
            SnapPoint::Closed => 0,
            SnapPoint::Half => 1,
            SnapPoint::Full => 2,
        }
    }
}

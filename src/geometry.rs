//! Mapping from snap points to pixel offsets for a given viewport.
//!
//! Offsets are measured from the top of the viewport to the sheet's top
//! edge, so a smaller offset means a more open sheet.

use crate::snap_point::SnapPoint;

/// Parameters of the snap point formulas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    /// Offset of the fully open sheet on tall viewports (default: 100.0)
    pub full_offset: f32,
    /// Fraction of the viewport height where the half-open sheet rests (default: 0.5)
    pub half_fraction: f32,
    /// Visible height of the closed sheet, i.e. the drag handle (default: 80.0)
    pub closed_peek: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            full_offset: 100.0,
            half_fraction: 0.5,
            closed_peek: 80.0,
        }
    }
}

/// Pixel offsets of every snap point for one viewport height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPointGeometry {
    pub full: f32,
    pub half: f32,
    pub closed: f32,
}

impl SnapPointGeometry {
    /// Build geometry from explicit offsets.
    pub fn new(full: f32, half: f32, closed: f32) -> Self {
        Self { full, half, closed }
    }

    /// Compute the offsets for a viewport of the given height.
    ///
    /// The full offset never exceeds half of the half offset, which keeps
    /// `full < half < closed` for every height above `2 * closed_peek`
    /// with the default parameters.
    pub fn for_viewport(height: f32, config: &GeometryConfig) -> Self {
        let half = height * config.half_fraction;
        let closed = height - config.closed_peek;
        let full = config.full_offset.min(half * 0.5);
        Self { full, half, closed }
    }

    pub fn offset(&self, point: SnapPoint) -> f32 {
        match point {
            SnapPoint::Full => self.full,
            SnapPoint::Half => self.half,
            SnapPoint::Closed => self.closed,
        }
    }

    /// Whether `full < half < closed` holds.
    pub fn is_ordered(&self) -> bool {
        self.full < self.half && self.half < self.closed
    }

    /// Clamp an offset into the draggable range `[full, closed]`.
    pub fn clamp(&self, offset: f32) -> f32 {
        offset.max(self.full).min(self.closed)
    }

    /// How far open the sheet is at `offset`: 0.0 when closed, 1.0 when full.
    pub fn progress(&self, offset: f32) -> f32 {
        let span = self.closed - self.full;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.closed - offset) / span).clamp(0.0, 1.0)
    }

    /// Offset at which [`progress`](Self::progress) reports `progress`.
    pub fn offset_at_progress(&self, progress: f32) -> f32 {
        self.closed - progress.clamp(0.0, 1.0) * (self.closed - self.full)
    }
}

pub mod animation;
pub mod driver;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod gesture;
pub mod resolver;
pub mod sheet;
pub mod snap_point;

use std::time::Duration;

use animation::SpringConfig;
use geometry::GeometryConfig;
use snap_point::SnapPoint;

pub mod prelude {
    pub use crate::animation::{SpringConfig, SpringStatus};
    pub use crate::driver::{DriverError, SheetLoop};
    pub use crate::event::{EventResponse, Key, SheetEvent};
    pub use crate::geometry::{GeometryConfig, SnapPointGeometry};
    pub use crate::resolver::{resolve, VELOCITY_THRESHOLD};
    pub use crate::sheet::{
        Backdrop, SheetCallbacks, SheetChanges, SheetController, SheetPhase, SheetState,
    };
    pub use crate::snap_point::{SnapPoint, SnapPointError};
    pub use crate::SheetConfig;
}

#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub geometry: GeometryConfig,
    pub spring: SpringConfig,
    /// Release speed (px/s) above which a drag counts as a flick
    pub velocity_threshold: f32,
    /// Simulated time after which a spring run is forced to settle
    pub max_animation: Duration,
    pub initial_snap_point: SnapPoint,
    /// Frame cadence used by [`driver::SheetLoop`]
    pub frame_interval: Duration,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            spring: SpringConfig::DEFAULT,
            velocity_threshold: resolver::VELOCITY_THRESHOLD,
            max_animation: Duration::from_secs(10),
            initial_snap_point: SnapPoint::Closed,
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl SheetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(mut self, geometry: GeometryConfig) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn spring(mut self, spring: SpringConfig) -> Self {
        self.spring = spring;
        self
    }

    pub fn velocity_threshold(mut self, threshold: f32) -> Self {
        self.velocity_threshold = threshold;
        self
    }

    pub fn max_animation(mut self, max_animation: Duration) -> Self {
        self.max_animation = max_animation;
        self
    }

    pub fn initial_snap_point(mut self, point: SnapPoint) -> Self {
        self.initial_snap_point = point;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}

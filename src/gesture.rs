//! Drag tracking and velocity estimation from discrete pointer samples.

use std::time::Instant;

/// One pointer sample along the drag axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    pub position: f32,
    pub time: Instant,
}

/// State of the drag in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    /// Pointer position when the drag started
    pub start_position: f32,
    /// Most recent accepted sample
    pub last_sample: DragSample,
    /// Velocity over the last sample interval, in units per second
    pub velocity: f32,
}

/// Tracks one drag at a time.
///
/// Velocity is the slope of the most recent sample interval only. A
/// zero or negative interval keeps the previous estimate.
#[derive(Debug, Default)]
pub struct GestureTracker {
    state: Option<GestureState>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Start a gesture at `position`.
    ///
    /// Returns false (and keeps the running gesture) if one is already active.
    pub fn begin(&mut self, position: f32, time: Instant) -> bool {
        if self.state.is_some() {
            log::debug!("Ignoring gesture start at {position}: a gesture is already active");
            return false;
        }
        self.state = Some(GestureState {
            start_position: position,
            last_sample: DragSample { position, time },
            velocity: 0.0,
        });
        true
    }

    /// Feed a new sample and return the accumulated delta from the start
    /// position, or `None` when no gesture is active.
    pub fn update(&mut self, position: f32, time: Instant) -> Option<f32> {
        let state = self.state.as_mut()?;

        let elapsed = time
            .checked_duration_since(state.last_sample.time)
            .map(|d| d.as_secs_f32())
            .unwrap_or(0.0);
        if elapsed > 0.0 {
            state.velocity = (position - state.last_sample.position) / elapsed;
        } else {
            log::trace!("Non-increasing sample time, holding velocity {}", state.velocity);
        }
        state.last_sample = DragSample { position, time };

        Some(position - state.start_position)
    }

    /// Finish the gesture and return its final velocity.
    pub fn end(&mut self) -> Option<f32> {
        self.state.take().map(|state| state.velocity)
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&GestureState> {
        self.state.as_ref()
    }

    /// Current velocity estimate (0.0 when idle)
    pub fn velocity(&self) -> f32 {
        self.state.map_or(0.0, |state| state.velocity)
    }
}

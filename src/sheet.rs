//! The sheet state machine.
//!
//! [`SheetController`] owns the authoritative snap point and the single
//! published offset. It switches between following the pointer 1:1 while
//! dragging and running a spring towards a snap point afterwards.
//!
//! ```text
//! Idle(s) --pointer down--> Dragging(s) --pointer up--> Animating(t) --settled--> Idle(t)
//!    \--set_snap_point / key / close--> Animating(t)        |
//!                        Dragging <--pointer down-----------/
//! ```

use std::fmt;
use std::time::Instant;

use bitflags::bitflags;

use crate::animation::{SpringIntegrator, SpringStatus};
use crate::event::{EventResponse, Key, SheetEvent};
use crate::frame::{FrameRequests, FrameToken};
use crate::geometry::SnapPointGeometry;
use crate::gesture::GestureTracker;
use crate::resolver::resolve_with_threshold;
use crate::snap_point::SnapPoint;
use crate::SheetConfig;

bitflags! {
    /// What the controller published since the last [`SheetController::take_changes`]
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct SheetChanges: u8 {
        /// Published offset moved
        const OFFSET     = 0b0001;
        /// Dragging flag flipped
        const DRAGGING   = 0b0010;
        /// A new snap point was committed
        const SNAP_POINT = 0b0100;
        /// Viewport geometry was recomputed
        const GEOMETRY   = 0b1000;
    }
}

/// Receives the offset and dragging flag on every published frame.
pub type RenderCallback = Box<dyn FnMut(f32, bool)>;
/// Receives every committed snap point change.
pub type SnapPointCallback = Box<dyn FnMut(SnapPoint)>;
/// Called when the sheet commits to `Closed`.
pub type CloseCallback = Box<dyn FnMut()>;

/// Hooks through which the controller talks to its host.
#[derive(Default)]
pub struct SheetCallbacks {
    render: Option<RenderCallback>,
    on_snap_point_change: Option<SnapPointCallback>,
    on_close: Option<CloseCallback>,
}

impl SheetCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render<F: FnMut(f32, bool) + 'static>(mut self, callback: F) -> Self {
        self.render = Some(Box::new(callback));
        self
    }

    pub fn on_snap_point_change<F: FnMut(SnapPoint) + 'static>(mut self, callback: F) -> Self {
        self.on_snap_point_change = Some(Box::new(callback));
        self
    }

    pub fn on_close<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    fn emit_render(&mut self, offset: f32, dragging: bool) {
        if let Some(ref mut render) = self.render {
            render(offset, dragging);
        }
    }

    fn emit_snap_point_change(&mut self, point: SnapPoint) {
        if let Some(ref mut callback) = self.on_snap_point_change {
            callback(point);
        }
    }

    fn emit_close(&mut self) {
        if let Some(ref mut callback) = self.on_close {
            callback();
        }
    }
}

impl fmt::Debug for SheetCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetCallbacks")
            .field("render", &self.render.is_some())
            .field("on_snap_point_change", &self.on_snap_point_change.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// Externally visible phase of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetPhase {
    /// At rest on the committed snap point
    Idle(SnapPoint),
    /// Following the pointer; carries the committed snap point the drag started from
    Dragging(SnapPoint),
    /// Spring running towards the pending snap point
    Animating(SnapPoint),
}

/// Backdrop dimmer presentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    pub opacity: f32,
    pub interactive: bool,
}

/// Snapshot of everything the rendering layer reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetState {
    pub offset: f32,
    pub is_dragging: bool,
    /// Committed snap point
    pub snap_point: SnapPoint,
    pub phase: SheetPhase,
    /// 0.0 when closed, 1.0 when fully open
    pub progress: f32,
    pub backdrop: Backdrop,
    pub scroll_locked: bool,
    pub close_button_visible: bool,
}

/// Orchestrates gesture tracking, snap resolution and spring animation.
#[derive(Debug)]
pub struct SheetController {
    config: SheetConfig,
    geometry: SnapPointGeometry,
    snap_point: SnapPoint,
    phase: SheetPhase,
    /// The single published offset
    offset: f32,
    /// Offset the current drag started from
    drag_base: f32,
    /// Snap point the current drag started resting on, if it did
    drag_anchor: Option<SnapPoint>,
    /// Current run was started by an explicit close request
    close_requested: bool,
    tracker: GestureTracker,
    spring: SpringIntegrator,
    frames: FrameRequests,
    changes: SheetChanges,
    callbacks: SheetCallbacks,
}

impl SheetController {
    pub fn new(config: SheetConfig, viewport_height: f32, callbacks: SheetCallbacks) -> Self {
        let geometry = SnapPointGeometry::for_viewport(viewport_height, &config.geometry);
        if !geometry.is_ordered() {
            log::warn!(
                "Viewport height {} gives unordered snap points: {:?}",
                viewport_height,
                geometry
            );
        }
        let snap_point = config.initial_snap_point;
        let spring = SpringIntegrator::new(config.spring).with_max_duration(config.max_animation);

        Self {
            offset: geometry.offset(snap_point),
            drag_base: geometry.offset(snap_point),
            drag_anchor: None,
            geometry,
            snap_point,
            phase: SheetPhase::Idle(snap_point),
            close_requested: false,
            tracker: GestureTracker::new(),
            spring,
            frames: FrameRequests::new(),
            changes: SheetChanges::all(),
            callbacks,
            config,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn geometry(&self) -> &SnapPointGeometry {
        &self.geometry
    }

    /// Committed snap point
    pub fn snap_point(&self) -> SnapPoint {
        self.snap_point
    }

    /// Where the sheet is heading: the pending point while animating,
    /// the committed point otherwise.
    pub fn target_snap_point(&self) -> SnapPoint {
        match self.phase {
            SheetPhase::Animating(pending) => pending,
            SheetPhase::Idle(_) | SheetPhase::Dragging(_) => self.snap_point,
        }
    }

    pub fn phase(&self) -> SheetPhase {
        self.phase
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, SheetPhase::Dragging(_))
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, SheetPhase::Animating(_))
    }

    /// The outstanding frame request, if an animation wants a frame
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.frames.pending()
    }

    pub fn state(&self) -> SheetState {
        let target = self.target_snap_point();
        SheetState {
            offset: self.offset,
            is_dragging: self.is_dragging(),
            snap_point: self.snap_point,
            phase: self.phase,
            progress: self.geometry.progress(self.offset),
            backdrop: Backdrop {
                opacity: target.backdrop_opacity(),
                interactive: target.backdrop_interactive(),
            },
            scroll_locked: target.locks_scroll(),
            close_button_visible: !target.is_closed(),
        }
    }

    /// Drain the accumulated change flags
    pub fn take_changes(&mut self) -> SheetChanges {
        std::mem::take(&mut self.changes)
    }

    pub fn handle_event(&mut self, event: SheetEvent) -> EventResponse {
        match event {
            SheetEvent::PointerDown { y, time } => self.pointer_down(y, time),
            SheetEvent::PointerMove { y, time } => self.pointer_move(y, time),
            SheetEvent::PointerUp => self.pointer_up(),
            SheetEvent::PointerCancel => self.pointer_cancel(),
            SheetEvent::KeyDown { key } => self.handle_key(key),
            SheetEvent::Resize { height } => self.resize(height),
            SheetEvent::BackdropClick => self.backdrop_click(),
            SheetEvent::SetSnapPoint(point) => self.set_snap_point(point),
            SheetEvent::Close => self.close(),
        }
    }

    pub fn pointer_down(&mut self, y: f32, time: Instant) -> EventResponse {
        if self.tracker.is_active() {
            log::debug!("Ignoring pointer down at {}: already dragging", y);
            return EventResponse::Ignored;
        }

        self.drag_anchor = match self.phase {
            SheetPhase::Idle(point) => Some(point),
            SheetPhase::Dragging(_) | SheetPhase::Animating(_) => None,
        };
        self.stop_animation();
        self.tracker.begin(y, time);
        self.drag_base = self.offset;
        self.close_requested = false;
        self.phase = SheetPhase::Dragging(self.snap_point);
        log::debug!("Drag started at {} from offset {}", y, self.offset);

        self.changes |= SheetChanges::DRAGGING;
        self.publish();
        EventResponse::Handled
    }

    pub fn pointer_move(&mut self, y: f32, time: Instant) -> EventResponse {
        if !self.is_dragging() {
            return EventResponse::Ignored;
        }
        let Some(delta) = self.tracker.update(y, time) else {
            return EventResponse::Ignored;
        };

        self.offset = self.geometry.clamp(self.drag_base + delta);
        self.publish();
        EventResponse::Handled
    }

    pub fn pointer_up(&mut self) -> EventResponse {
        if !self.is_dragging() {
            return EventResponse::Ignored;
        }
        let velocity = self.tracker.end().unwrap_or(0.0);
        let target = resolve_with_threshold(
            self.offset,
            velocity,
            &self.geometry,
            self.config.velocity_threshold,
        );
        log::debug!(
            "Drag released at {} with velocity {:.0}px/s, settling at {}",
            self.offset,
            velocity,
            target
        );

        self.changes |= SheetChanges::DRAGGING;
        self.animate_to(target, velocity);
        EventResponse::Handled
    }

    /// A cancelled pointer settles exactly like a release.
    pub fn pointer_cancel(&mut self) -> EventResponse {
        self.pointer_up()
    }

    /// Animate to `point`, abandoning any drag or animation in progress.
    pub fn set_snap_point(&mut self, point: SnapPoint) -> EventResponse {
        match self.phase {
            SheetPhase::Idle(current) | SheetPhase::Animating(current) if current == point => {
                log::trace!("Already at or heading to {}", point);
                return EventResponse::Ignored;
            }
            SheetPhase::Dragging(_) => self.abandon_drag(),
            SheetPhase::Idle(_) | SheetPhase::Animating(_) => {}
        }

        log::debug!("Moving to {} on request", point);
        self.close_requested = false;
        let velocity = self.spring.motion().map_or(0.0, |motion| motion.velocity);
        self.animate_to(point, velocity);
        EventResponse::Handled
    }

    /// Animate to `Closed`; `on_close` fires once the sheet gets there.
    pub fn close(&mut self) -> EventResponse {
        match self.phase {
            SheetPhase::Idle(SnapPoint::Closed) => {
                log::trace!("Close requested while already closed");
                return EventResponse::Ignored;
            }
            SheetPhase::Animating(SnapPoint::Closed) => {
                self.close_requested = true;
                return EventResponse::Handled;
            }
            SheetPhase::Dragging(_) => self.abandon_drag(),
            SheetPhase::Idle(_) | SheetPhase::Animating(_) => {}
        }

        log::debug!("Closing from offset {}", self.offset);
        let velocity = self.spring.motion().map_or(0.0, |motion| motion.velocity);
        self.animate_to(SnapPoint::Closed, velocity);
        self.close_requested = true;
        EventResponse::Handled
    }

    /// Escape closes, arrows step between snap points. Keys do nothing
    /// while the sheet is closed or being dragged.
    pub fn handle_key(&mut self, key: Key) -> EventResponse {
        if self.is_dragging() {
            return EventResponse::Ignored;
        }
        let current = self.target_snap_point();
        if current.is_closed() {
            log::trace!("Ignoring {:?} while closed", key);
            return EventResponse::Ignored;
        }

        match key {
            Key::Escape => self.close(),
            Key::Up => match current.more_open() {
                Some(next) => self.set_snap_point(next),
                None => EventResponse::Ignored,
            },
            Key::Down => match current.more_closed() {
                Some(next) => self.set_snap_point(next),
                None => EventResponse::Ignored,
            },
            Key::Char(_) => EventResponse::Ignored,
        }
    }

    pub fn backdrop_click(&mut self) -> EventResponse {
        if self.is_dragging() || !self.target_snap_point().backdrop_interactive() {
            return EventResponse::Ignored;
        }
        self.close()
    }

    /// Recompute geometry for a new viewport height.
    ///
    /// A resting sheet jumps to its new offset without animating; a
    /// running spring is retargeted. A drag is re-anchored so it keeps
    /// following the pointer from the same snap point.
    pub fn resize(&mut self, height: f32) -> EventResponse {
        let previous = self.geometry;
        self.geometry = SnapPointGeometry::for_viewport(height, &self.config.geometry);
        if !self.geometry.is_ordered() {
            log::warn!(
                "Viewport height {} gives unordered snap points: {:?}",
                height,
                self.geometry
            );
        }
        self.changes |= SheetChanges::GEOMETRY;

        match self.phase {
            SheetPhase::Idle(point) => {
                self.offset = self.geometry.offset(point);
                self.publish();
            }
            SheetPhase::Animating(pending) => {
                self.spring.retarget(self.geometry.offset(pending));
            }
            SheetPhase::Dragging(_) => {
                self.drag_base = match self.drag_anchor {
                    Some(point) => self.geometry.offset(point),
                    None => self
                        .geometry
                        .offset_at_progress(previous.progress(self.drag_base)),
                };
                let delta = self.tracker.state().map_or(0.0, |state| {
                    state.last_sample.position - state.start_position
                });
                self.offset = self.geometry.clamp(self.drag_base + delta);
                self.publish();
            }
        }
        EventResponse::Handled
    }

    /// Advance the animation by one frame if a frame is outstanding.
    pub fn frame(&mut self, now: Instant) -> SpringStatus {
        match self.frames.pending() {
            Some(token) => self.on_frame(token, now),
            None => SpringStatus::Idle,
        }
    }

    /// Frame callback for `token`. Stale tokens are dropped.
    pub fn on_frame(&mut self, token: FrameToken, now: Instant) -> SpringStatus {
        if !self.frames.accept(token) {
            return SpringStatus::Idle;
        }
        let SheetPhase::Animating(pending) = self.phase else {
            return SpringStatus::Idle;
        };

        let Self {
            spring,
            callbacks,
            offset,
            changes,
            ..
        } = self;
        let status = spring.tick(now, |position| {
            *offset = position;
            changes.insert(SheetChanges::OFFSET);
            callbacks.emit_render(position, false);
        });

        match status {
            SpringStatus::Running => {
                self.frames.request();
            }
            SpringStatus::Settled => self.commit(pending),
            SpringStatus::Idle => {}
        }
        status
    }

    fn animate_to(&mut self, target: SnapPoint, velocity: f32) {
        self.stop_animation();
        self.spring
            .run(self.offset, velocity, self.geometry.offset(target));
        self.phase = SheetPhase::Animating(target);
        self.frames.request();
        self.publish();
    }

    fn stop_animation(&mut self) {
        if self.spring.is_running() {
            log::debug!("Interrupting animation at offset {}", self.offset);
        }
        self.spring.cancel();
        self.frames.cancel();
    }

    fn abandon_drag(&mut self) {
        log::debug!("Abandoning drag at offset {}", self.offset);
        self.tracker.end();
        self.changes |= SheetChanges::DRAGGING;
    }

    fn commit(&mut self, pending: SnapPoint) {
        let previous = self.snap_point;
        let explicit_close = std::mem::take(&mut self.close_requested);
        self.snap_point = pending;
        self.phase = SheetPhase::Idle(pending);

        if previous == pending && !explicit_close {
            log::debug!("Settled back at {}", pending);
            return;
        }

        log::info!("Snap point committed: {} -> {}", previous, pending);
        self.changes |= SheetChanges::SNAP_POINT;
        self.callbacks.emit_snap_point_change(pending);
        if pending.is_closed() {
            self.callbacks.emit_close();
        }
    }

    fn publish(&mut self) {
        self.changes |= SheetChanges::OFFSET;
        let dragging = self.is_dragging();
        self.callbacks.emit_render(self.offset, dragging);
    }
}

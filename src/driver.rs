//! calloop event loop that drives a [`SheetController`].
//!
//! Input arrives through a channel; every outstanding frame request of the
//! controller is backed by exactly one timer source. A timer whose frame
//! token went stale (because a gesture or command cancelled the run) is
//! removed before its replacement is registered.

use std::time::{Duration, Instant};

use calloop::channel::{self, Sender};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle, RegistrationToken};
use thiserror::Error;

use crate::event::SheetEvent;
use crate::frame::FrameToken;
use crate::sheet::SheetController;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] calloop::Error),
    #[error("Failed to register {source_name} source: {error}")]
    Register {
        source_name: &'static str,
        error: calloop::Error,
    },
}

/// Called after every dispatch with the controller, e.g. to redraw.
pub type UpdateCallback = Box<dyn FnMut(&mut SheetController)>;

struct LoopState {
    controller: SheetController,
    handle: LoopHandle<'static, LoopState>,
    /// Timer backing the controller's outstanding frame request
    scheduled: Option<(RegistrationToken, FrameToken)>,
    frame_interval: Duration,
    input_closed: bool,
}

impl LoopState {
    fn dispatch(&mut self, event: SheetEvent) {
        if event.is_pointer() {
            log::trace!("Pointer input {:?} at y={:?}", event, event.pointer_y());
        } else {
            log::debug!("Input {:?}", event);
        }
        let response = self.controller.handle_event(event);
        if !response.is_handled() {
            log::trace!("Input ignored in phase {:?}", self.controller.phase());
        }
        self.sync_frame_timer();
    }

    fn sync_frame_timer(&mut self) {
        let wanted = self.controller.pending_frame();
        if let (Some((_, scheduled)), Some(wanted)) = (self.scheduled, wanted) {
            if scheduled == wanted {
                return;
            }
        }

        if let Some((registration, stale)) = self.scheduled.take() {
            log::trace!("Removing frame timer of generation {}", stale.generation());
            self.handle.remove(registration);
        }

        let Some(token) = wanted else {
            return;
        };
        let timer = Timer::from_duration(self.frame_interval);
        let inserted = self
            .handle
            .insert_source(timer, move |_deadline, _, state: &mut LoopState| {
                state.scheduled = None;
                state.controller.on_frame(token, Instant::now());
                state.sync_frame_timer();
                TimeoutAction::Drop
            });
        match inserted {
            Ok(registration) => self.scheduled = Some((registration, token)),
            Err(err) => log::error!("Failed to schedule frame: {}", err.error),
        }
    }

    fn is_finished(&self) -> bool {
        self.input_closed && self.scheduled.is_none()
    }
}

/// Runs a sheet until its input channel closes and it comes to rest.
pub struct SheetLoop {
    event_loop: EventLoop<'static, LoopState>,
    state: LoopState,
    on_update: Option<UpdateCallback>,
}

impl SheetLoop {
    /// Wrap `controller` in a new event loop, returning the loop and the
    /// sender for its input.
    pub fn new(controller: SheetController) -> Result<(Self, Sender<SheetEvent>), DriverError> {
        let event_loop: EventLoop<'static, LoopState> = EventLoop::try_new()?;
        let handle = event_loop.handle();

        let (sender, input) = channel::channel::<SheetEvent>();
        handle
            .insert_source(input, |event, _, state: &mut LoopState| match event {
                channel::Event::Msg(event) => state.dispatch(event),
                channel::Event::Closed => {
                    log::debug!("Input channel closed");
                    state.input_closed = true;
                }
            })
            .map_err(|err| DriverError::Register {
                source_name: "input channel",
                error: err.error,
            })?;

        let frame_interval = controller.config().frame_interval;
        let state = LoopState {
            controller,
            handle,
            scheduled: None,
            frame_interval,
            input_closed: false,
        };

        Ok((
            Self {
                event_loop,
                state,
                on_update: None,
            },
            sender,
        ))
    }

    /// Set a callback that gets called after every dispatch.
    pub fn on_update<F: FnMut(&mut SheetController) + 'static>(mut self, callback: F) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    pub fn run(&mut self) -> Result<(), DriverError> {
        if env_logger::try_init().is_err() {
            log::debug!("Logger already installed, keeping it");
        }
        log::info!(
            "Sheet loop running at {:?} per frame",
            self.state.frame_interval
        );

        while !self.state.is_finished() {
            self.event_loop.dispatch(None, &mut self.state)?;
            if let Some(ref mut callback) = self.on_update {
                callback(&mut self.state.controller);
            }
        }

        log::info!(
            "Sheet loop finished at {} ({})",
            self.state.controller.snap_point(),
            self.state.controller.offset()
        );
        Ok(())
    }

    pub fn controller(&self) -> &SheetController {
        &self.state.controller
    }

    pub fn into_controller(self) -> SheetController {
        self.state.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Key;
    use crate::sheet::{SheetCallbacks, SheetPhase};
    use crate::snap_point::SnapPoint;
    use crate::SheetConfig;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_loop_settles_after_input_closes() {
        let _ = env_logger::builder().is_test(true).try_init();

        let committed = Rc::new(RefCell::new(Vec::new()));
        let sink = committed.clone();
        let callbacks =
            SheetCallbacks::new().on_snap_point_change(move |point| sink.borrow_mut().push(point));
        let controller = SheetController::new(SheetConfig::default(), 800.0, callbacks);

        let (sheet_loop, sender) = SheetLoop::new(controller).unwrap();
        let updates = Rc::new(RefCell::new(0));
        let counter = updates.clone();
        let mut sheet_loop = sheet_loop.on_update(move |_| *counter.borrow_mut() += 1);

        sender.send(SheetEvent::SetSnapPoint(SnapPoint::Full)).unwrap();
        // Preempts the run towards Full before its first frame
        sender.send(SheetEvent::SetSnapPoint(SnapPoint::Half)).unwrap();
        sender.send(SheetEvent::KeyDown { key: Key::Up }).unwrap();
        drop(sender);

        sheet_loop.run().unwrap();

        let controller = sheet_loop.into_controller();
        assert_eq!(controller.phase(), SheetPhase::Idle(SnapPoint::Full));
        assert_eq!(controller.offset(), 100.0);
        assert_eq!(*committed.borrow(), vec![SnapPoint::Full]);
        assert!(*updates.borrow() > 0);
    }

    #[test]
    fn test_loop_with_no_input_finishes_immediately() {
        let controller =
            SheetController::new(SheetConfig::default(), 800.0, SheetCallbacks::new());
        let (mut sheet_loop, sender) = SheetLoop::new(controller).unwrap();
        drop(sender);
        sheet_loop.run().unwrap();
        assert_eq!(
            sheet_loop.controller().phase(),
            SheetPhase::Idle(SnapPoint::Closed)
        );
    }
}

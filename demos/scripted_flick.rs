//! Drives a sheet through a scripted session: an upward flick from the
//! closed position, a keyboard step down, then Escape.
//!
//! Run with `RUST_LOG=debug cargo run --example scripted_flick` to see the
//! state transitions.

use std::thread;
use std::time::{Duration, Instant};

use snapsheet::prelude::*;

const VIEWPORT_HEIGHT: f32 = 800.0;

fn main() -> Result<(), DriverError> {
    let callbacks = SheetCallbacks::new()
        .on_snap_point_change(|point| println!("snap point -> {point}"))
        .on_close(|| println!("sheet closed"));
    let controller = SheetController::new(SheetConfig::default(), VIEWPORT_HEIGHT, callbacks);

    let (sheet_loop, sender) = SheetLoop::new(controller)?;
    let mut last_printed = None;
    let mut sheet_loop = sheet_loop.on_update(move |sheet| {
        let changes = sheet.take_changes();
        if changes.contains(SheetChanges::OFFSET) {
            let state = sheet.state();
            let bucket = (state.progress * 10.0).round() as i32;
            if last_printed != Some(bucket) {
                last_printed = Some(bucket);
                println!(
                    "offset {:7.1}  progress {:4.2}  dragging {}  backdrop {:.1}",
                    state.offset, state.progress, state.is_dragging, state.backdrop.opacity
                );
            }
        }
    });

    let script = thread::spawn(move || {
        let pause = |ms| thread::sleep(Duration::from_millis(ms));

        // Flick up from the handle: 720 -> 320 in 150ms
        let start = Instant::now();
        let _ = sender.send(SheetEvent::PointerDown { y: 720.0, time: start });
        for step in 1..=10u32 {
            pause(15);
            let _ = sender.send(SheetEvent::PointerMove {
                y: 720.0 - 40.0 * step as f32,
                time: start + Duration::from_millis(15 * step as u64),
            });
        }
        let _ = sender.send(SheetEvent::PointerUp);
        pause(800);

        let _ = sender.send(SheetEvent::KeyDown { key: Key::Down });
        pause(800);

        let _ = sender.send(SheetEvent::KeyDown { key: Key::Escape });
    });

    sheet_loop.run()?;
    if script.join().is_err() {
        eprintln!("input script panicked");
    }

    println!("final snap point: {}", sheet_loop.controller().snap_point());
    Ok(())
}

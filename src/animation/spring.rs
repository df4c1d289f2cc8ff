use std::time::{Duration, Instant};

/// Configuration for spring physics animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    /// Stiffness of the spring (default: 300.0)
    pub tension: f32,
    /// Damping coefficient (default: 30.0)
    pub friction: f32,
    /// Mass of the spring (default: 1.0)
    pub mass: f32,
    /// Maximum distance from the target at rest, in pixels (default: 1.0)
    pub rest_distance: f32,
    /// Maximum speed at rest, in pixels per second (default: 50.0)
    pub rest_velocity: f32,
}

impl SpringConfig {
    /// Close to critically damped: at most one small overshoot
    pub const DEFAULT: Self = Self {
        tension: 300.0,
        friction: 30.0,
        mass: 1.0,
        rest_distance: 1.0,
        rest_velocity: 50.0,
    };

    /// Snappy spring with quick response
    pub const SNAPPY: Self = Self {
        tension: 500.0,
        friction: 40.0,
        ..Self::DEFAULT
    };

    /// Gentle spring with slower, softer motion
    pub const GENTLE: Self = Self {
        tension: 170.0,
        friction: 26.0,
        ..Self::DEFAULT
    };

    pub fn tension(mut self, tension: f32) -> Self {
        self.tension = tension;
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Position and velocity of a running spring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    pub position: f32,
    /// Units per second
    pub velocity: f32,
    pub target: f32,
}

/// Outcome of a single integrator tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpringStatus {
    /// No run in progress; nothing was emitted
    Idle,
    /// Still moving; another frame is needed
    Running,
    /// Arrived this tick. Returned exactly once per run.
    Settled,
}

/// Frame-by-frame damped oscillator driving a value towards a target.
///
/// A run is started with [`run`](Self::run) and advanced by calling
/// [`tick`](Self::tick) once per frame with the frame timestamp.
#[derive(Debug)]
pub struct SpringIntegrator {
    config: SpringConfig,
    motion: Option<MotionState>,
    last_tick: Option<Instant>,
    /// Simulated time of the current run
    elapsed: Duration,
    /// Force-settle after this much simulated time
    max_duration: Duration,
}

/// Step used for the first tick of a run, before a frame interval is known
const NOMINAL_DT: f32 = 1.0 / 60.0;

/// Cap individual timestep for numerical stability (~30fps minimum)
const MAX_DT: f32 = 1.0 / 30.0;

impl SpringIntegrator {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            config,
            motion: None,
            last_tick: None,
            elapsed: Duration::ZERO,
            max_duration: Duration::from_secs(10),
        }
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    /// Begin a run from `position` with `velocity` towards `target`.
    /// Replaces any run in progress without settling it.
    pub fn run(&mut self, position: f32, velocity: f32, target: f32) {
        self.motion = Some(MotionState {
            position,
            velocity,
            target,
        });
        self.last_tick = None;
        self.elapsed = Duration::ZERO;
    }

    /// Move the target of the current run, keeping position and velocity.
    pub fn retarget(&mut self, target: f32) {
        if let Some(motion) = self.motion.as_mut() {
            motion.target = target;
        }
    }

    /// Stop the current run without settling it. Idempotent.
    pub fn cancel(&mut self) {
        self.motion = None;
        self.last_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.motion.is_some()
    }

    pub fn motion(&self) -> Option<&MotionState> {
        self.motion.as_ref()
    }

    /// Advance the run to `now`, reporting every published position to
    /// `on_frame`.
    ///
    /// On the settling tick the position is forced onto the target and
    /// reported a second time before [`SpringStatus::Settled`] is returned.
    pub fn tick<F>(&mut self, now: Instant, mut on_frame: F) -> SpringStatus
    where
        F: FnMut(f32),
    {
        let Some(motion) = self.motion.as_mut() else {
            return SpringStatus::Idle;
        };

        let dt = match self.last_tick {
            Some(last) => now
                .checked_duration_since(last)
                .map_or(0.0, |d| d.as_secs_f32())
                .min(MAX_DT),
            None => NOMINAL_DT,
        };
        self.last_tick = Some(now);

        // Settlement is judged on the displacement the step started from
        let displacement = motion.position - motion.target;
        if dt > 0.0 {
            // F = -k * x - c * v
            let force = -self.config.tension * displacement - self.config.friction * motion.velocity;
            let acceleration = force / self.config.mass;

            // Semi-implicit Euler
            motion.velocity += acceleration * dt;
            motion.position += motion.velocity * dt;
            self.elapsed += Duration::from_secs_f32(dt);
        }

        on_frame(motion.position);

        let timed_out = self.elapsed >= self.max_duration;
        if timed_out {
            log::warn!(
                "Spring did not settle within {:?} (position {}, target {}), forcing settlement",
                self.max_duration,
                motion.position,
                motion.target
            );
        }

        let at_rest = displacement.abs() < self.config.rest_distance
            && motion.velocity.abs() < self.config.rest_velocity;
        if at_rest || timed_out {
            let target = motion.target;
            self.motion = None;
            self.last_tick = None;
            on_frame(target);
            return SpringStatus::Settled;
        }

        SpringStatus::Running
    }
}

impl Default for SpringIntegrator {
    fn default() -> Self {
        Self::new(SpringConfig::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive a run at a fixed frame interval, returning every published
    /// position and the simulated time until settlement.
    fn drive(
        spring: &mut SpringIntegrator,
        frame: Duration,
        max_frames: usize,
    ) -> (Vec<f32>, Duration, usize) {
        let start = Instant::now();
        let mut frames = Vec::new();
        let mut settled = 0;
        for i in 0..max_frames {
            let now = start + frame * i as u32;
            match spring.tick(now, |p| frames.push(p)) {
                SpringStatus::Settled => {
                    settled += 1;
                    return (frames, frame * i as u32, settled);
                }
                SpringStatus::Running => {}
                SpringStatus::Idle => break,
            }
        }
        (frames, Duration::MAX, settled)
    }

    #[test]
    fn test_spring_reaches_target() {
        let mut spring = SpringIntegrator::default();
        spring.run(0.0, 0.0, 1000.0);

        let (frames, elapsed, settled) = drive(&mut spring, Duration::from_millis(16), 1000);

        assert_eq!(settled, 1);
        assert!(elapsed < Duration::from_secs(5), "took {:?}", elapsed);
        assert_eq!(*frames.last().unwrap(), 1000.0);
        assert!(!spring.is_running());
    }

    #[test]
    fn test_spring_converges_from_any_start() {
        let cases = [
            (720.0, -2666.0, 100.0),
            (400.0, 5000.0, 720.0),
            (100.0, 0.0, 720.0),
            (500.0, -20_000.0, 100.0),
            (0.0, 0.0, 1.0),
        ];
        for (position, velocity, target) in cases {
            let mut spring = SpringIntegrator::default();
            spring.run(position, velocity, target);
            let (frames, elapsed, _) = drive(&mut spring, Duration::from_millis(16), 1000);
            assert!(
                elapsed < Duration::from_secs(5),
                "run from {} at {} to {} did not settle",
                position,
                velocity,
                target
            );
            assert_eq!(*frames.last().unwrap(), target);
        }
    }

    #[test]
    fn test_default_spring_barely_overshoots() {
        let mut spring = SpringIntegrator::default();
        spring.run(720.0, 0.0, 100.0);
        let (frames, _, _) = drive(&mut spring, Duration::from_millis(16), 1000);
        let lowest = frames.iter().copied().fold(f32::INFINITY, f32::min);
        assert!(lowest > 90.0, "overshot to {}", lowest);
    }

    #[test]
    fn test_settles_once_then_idles() {
        let mut spring = SpringIntegrator::default();
        spring.run(10.0, 0.0, 0.0);

        let start = Instant::now();
        let mut settled = 0;
        for i in 0..400u32 {
            if spring.tick(start + Duration::from_millis(16) * i, |_| {}) == SpringStatus::Settled {
                settled += 1;
            }
        }
        assert_eq!(settled, 1);

        let mut frames = 0;
        assert_eq!(spring.tick(start, |_| frames += 1), SpringStatus::Idle);
        assert_eq!(frames, 0);
    }

    #[test]
    fn test_settling_tick_publishes_exact_target() {
        let mut spring = SpringIntegrator::default();
        // Already inside the rest thresholds
        spring.run(100.5, 0.0, 100.0);
        let mut frames = Vec::new();
        let status = spring.tick(Instant::now(), |p| frames.push(p));
        assert_eq!(status, SpringStatus::Settled);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], 100.0);
    }

    #[test]
    fn test_settlement_uses_displacement_before_step() {
        let mut spring = SpringIntegrator::default();
        // The step lands within a pixel, but it started 1.2px away
        spring.run(101.2, -60.0, 100.0);
        let start = Instant::now();
        let mut frames = Vec::new();
        assert_eq!(spring.tick(start, |p| frames.push(p)), SpringStatus::Running);
        assert_eq!(frames.len(), 1);
        assert!((frames[0] - 100.6).abs() < 0.01, "position {}", frames[0]);

        assert_eq!(
            spring.tick(start + Duration::from_millis(16), |p| frames.push(p)),
            SpringStatus::Settled
        );
        assert_eq!(*frames.last().unwrap(), 100.0);
    }

    #[test]
    fn test_cancel_is_idempotent_and_silent() {
        let mut spring = SpringIntegrator::default();
        spring.run(0.0, 0.0, 500.0);
        let start = Instant::now();
        assert_eq!(spring.tick(start, |_| {}), SpringStatus::Running);

        spring.cancel();
        spring.cancel();
        assert!(!spring.is_running());
        assert_eq!(
            spring.tick(start + Duration::from_millis(16), |_| panic!("frame after cancel")),
            SpringStatus::Idle
        );
    }

    #[test]
    fn test_slow_frames_are_capped() {
        let mut spring = SpringIntegrator::default();
        spring.run(720.0, 0.0, 100.0);
        let start = Instant::now();
        spring.tick(start, |_| {});
        // A one second stall advances by at most one capped step
        let mut position = 0.0;
        spring.tick(start + Duration::from_secs(1), |p| position = p);
        assert!(position > 100.0 && position < 720.0, "position {}", position);
    }

    #[test]
    fn test_max_duration_forces_settlement() {
        // Undamped spring never settles on its own
        let config = SpringConfig::DEFAULT.friction(0.0);
        let mut spring =
            SpringIntegrator::new(config).with_max_duration(Duration::from_millis(500));
        spring.run(0.0, 0.0, 300.0);
        let (frames, elapsed, settled) = drive(&mut spring, Duration::from_millis(16), 1000);
        assert_eq!(settled, 1);
        assert!(elapsed <= Duration::from_millis(600));
        assert_eq!(*frames.last().unwrap(), 300.0);
    }

    #[test]
    fn test_retarget_keeps_motion() {
        let mut spring = SpringIntegrator::default();
        spring.run(0.0, 0.0, 100.0);
        let start = Instant::now();
        spring.tick(start, |_| {});
        let before = *spring.motion().unwrap();
        spring.retarget(200.0);
        let after = *spring.motion().unwrap();
        assert_eq!(after.position, before.position);
        assert_eq!(after.velocity, before.velocity);
        assert_eq!(after.target, 200.0);

        let (frames, _, _) = drive(&mut spring, Duration::from_millis(16), 1000);
        assert_eq!(*frames.last().unwrap(), 200.0);
    }

    #[test]
    fn test_presets_settle() {
        for config in [SpringConfig::SNAPPY, SpringConfig::GENTLE] {
            let mut spring = SpringIntegrator::new(config);
            spring.run(0.0, 0.0, 600.0);
            let (frames, elapsed, _) = drive(&mut spring, Duration::from_millis(16), 1000);
            assert!(elapsed < Duration::from_secs(5), "{:?} too slow", config);
            assert_eq!(*frames.last().unwrap(), 600.0);
        }
    }
}

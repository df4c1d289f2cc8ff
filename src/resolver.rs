//! Deciding where a released sheet should settle.

use crate::geometry::SnapPointGeometry;
use crate::snap_point::SnapPoint;

/// Release speed above which the drag direction wins over proximity,
/// in pixels per second.
pub const VELOCITY_THRESHOLD: f32 = 500.0;

/// Pick the snap point for a sheet released at `position` moving at
/// `velocity` (positive = towards closed).
pub fn resolve(position: f32, velocity: f32, geometry: &SnapPointGeometry) -> SnapPoint {
    resolve_with_threshold(position, velocity, geometry, VELOCITY_THRESHOLD)
}

/// [`resolve`] with a custom flick threshold.
pub fn resolve_with_threshold(
    position: f32,
    velocity: f32,
    geometry: &SnapPointGeometry,
    threshold: f32,
) -> SnapPoint {
    if velocity.abs() > threshold {
        // A flick advances in its direction; Half catches flicks that start
        // on the far side of it.
        return if velocity > 0.0 {
            if position > geometry.half {
                SnapPoint::Closed
            } else {
                SnapPoint::Half
            }
        } else if position < geometry.half {
            SnapPoint::Full
        } else {
            SnapPoint::Half
        };
    }

    let mut nearest = SnapPoint::ALL[0];
    let mut min_distance = (position - geometry.offset(nearest)).abs();
    for point in SnapPoint::ALL.into_iter().skip(1) {
        let distance = (position - geometry.offset(point)).abs();
        if distance < min_distance {
            min_distance = distance;
            nearest = point;
        }
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: f32 = 800.0;

    fn geometry() -> SnapPointGeometry {
        SnapPointGeometry::new(100.0, 0.5 * H, H - 80.0)
    }

    #[test]
    fn test_downward_flick() {
        let g = geometry();
        assert_eq!(resolve(0.5 * H + 10.0, 600.0, &g), SnapPoint::Closed);
        assert_eq!(resolve(0.5 * H - 10.0, 600.0, &g), SnapPoint::Half);
        assert_eq!(resolve(150.0, 600.0, &g), SnapPoint::Half);
    }

    #[test]
    fn test_upward_flick() {
        let g = geometry();
        assert_eq!(resolve(200.0, -600.0, &g), SnapPoint::Full);
        assert_eq!(resolve(0.5 * H + 10.0, -600.0, &g), SnapPoint::Half);
        assert_eq!(resolve(700.0, -600.0, &g), SnapPoint::Half);
    }

    #[test]
    fn test_flick_exactly_at_half_stays_half() {
        let g = geometry();
        assert_eq!(resolve(g.half, 900.0, &g), SnapPoint::Half);
        assert_eq!(resolve(g.half, -900.0, &g), SnapPoint::Half);
    }

    // A fast downward flick just past Half goes all the way to Closed, even
    // when the sheet sits much nearer to Half. Kept as the decisive-flick rule.
    #[test]
    fn test_downward_flick_just_below_half_closes() {
        let g = geometry();
        assert_eq!(resolve(g.half + 1.0, 501.0, &g), SnapPoint::Closed);
    }

    #[test]
    fn test_threshold_is_strict() {
        let g = geometry();
        // 500 is not a flick, so the nearest point (Half) wins
        assert_eq!(resolve(g.half + 20.0, 500.0, &g), SnapPoint::Half);
        assert_eq!(resolve(g.half + 20.0, 500.5, &g), SnapPoint::Closed);
    }

    #[test]
    fn test_nearest_point() {
        let g = geometry();
        assert_eq!(resolve(120.0, 0.0, &g), SnapPoint::Full);
        assert_eq!(resolve(390.0, 100.0, &g), SnapPoint::Half);
        assert_eq!(resolve(600.0, -100.0, &g), SnapPoint::Closed);
        assert_eq!(resolve(5000.0, 0.0, &g), SnapPoint::Closed);
    }

    #[test]
    fn test_ties_prefer_more_open() {
        let g = geometry();
        // Midway between Full (100) and Half (400)
        assert_eq!(resolve(250.0, 0.0, &g), SnapPoint::Full);
        // Midway between Half (400) and Closed (720)
        assert_eq!(resolve(560.0, 0.0, &g), SnapPoint::Half);
        // Just past the midpoint, Closed is strictly nearer
        assert_eq!(resolve(560.5, 0.0, &g), SnapPoint::Closed);
    }

    #[test]
    fn test_custom_threshold() {
        let g = geometry();
        assert_eq!(
            resolve_with_threshold(g.half + 20.0, 300.0, &g, 200.0),
            SnapPoint::Closed
        );
        assert_eq!(
            resolve_with_threshold(g.half + 20.0, 300.0, &g, 400.0),
            SnapPoint::Half
        );
    }

    #[test]
    fn test_deterministic() {
        let g = geometry();
        let inputs = [
            (0.0, 0.0),
            (250.0, 0.0),
            (410.0, 501.0),
            (390.0, -501.0),
            (720.0, -10_000.0),
            (-40.0, 40.0),
        ];
        for (position, velocity) in inputs {
            let first = resolve(position, velocity, &g);
            for _ in 0..10 {
                assert_eq!(resolve(position, velocity, &g), first);
            }
        }
    }
}

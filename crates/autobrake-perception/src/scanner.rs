//! Obstacle scanner.
//!
//! For every sample of a [`RangeScan`]:
//!
//! 1. Skip it unless [`RangeScan::is_valid_range`] accepts the reading.
//! 2. Project it into the vehicle frame through the [`SensorMount`].
//! 3. Bring the lateral coordinate into the corridor frame and test
//!    [`PathCorridor::contains`].
//! 4. For members, compute the path distance and the time to impact.
//!
//! Samples that fail step 1 or 3 are dropped silently; only a malformed scan
//! header is an error.

use autobrake_types::{AutobrakeError, Obstacle, RangeScan};
use tracing::debug;

use crate::corridor::PathCorridor;
use crate::mount::SensorMount;

/// Seconds until a point `distance` metres down the path is reached.
///
/// A stationary vehicle never arrives, so zero velocity yields `+inf`.
pub fn time_to_hit(distance: f64, velocity: f64) -> f64 {
    if velocity == 0.0 {
        f64::INFINITY
    } else {
        distance / velocity
    }
}

/// Finds the scan samples that lie inside a [`PathCorridor`].
#[derive(Debug, Clone, Copy)]
pub struct ObstacleScanner {
    corridor: PathCorridor,
    velocity: f64,
    mount: SensorMount,
}

impl ObstacleScanner {
    pub fn new(corridor: PathCorridor, velocity: f64, mount: SensorMount) -> Self {
        Self {
            corridor,
            velocity,
            mount,
        }
    }

    pub fn corridor(&self) -> &PathCorridor {
        &self.corridor
    }

    /// Return every valid in-corridor sample, in ascending sample order.
    ///
    /// # Errors
    ///
    /// [`AutobrakeError::InvalidScan`] when the scan header is malformed; no
    /// samples are examined in that case.
    pub fn scan(&self, scan: &RangeScan) -> Result<Vec<Obstacle>, AutobrakeError> {
        let usable = scan.validate()?;

        let obstacles: Vec<Obstacle> = scan.ranges[..usable]
            .iter()
            .enumerate()
            .filter(|&(_, &range)| scan.is_valid_range(range))
            .filter_map(|(i, &range)| self.locate(scan.angle_at(i), range))
            .collect();

        debug!(
            samples = usable,
            in_corridor = obstacles.len(),
            straight = self.corridor.is_straight(),
            "scan evaluated"
        );
        Ok(obstacles)
    }

    /// Locate a single sample, returning `None` when it lies outside the
    /// corridor.  The reading is assumed valid.
    pub fn locate(&self, theta: f64, range: f64) -> Option<Obstacle> {
        let (x, y) = self.mount.project(theta, range);
        let corridor_x = self.corridor.to_corridor_frame(x);
        if !self.corridor.contains(corridor_x, y) {
            return None;
        }

        let distance = self.corridor.path_distance(corridor_x, y);
        Some(Obstacle {
            x,
            y,
            distance,
            time_to_hit: time_to_hit(distance, self.velocity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autobrake_types::VehicleGeometry;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn corridor(steering: f64) -> PathCorridor {
        PathCorridor::for_steering(steering, &VehicleGeometry::default())
    }

    fn scanner(steering: f64, velocity: f64) -> ObstacleScanner {
        ObstacleScanner::new(corridor(steering), velocity, SensorMount::default())
    }

    /// A scan over `[-π/2, π/2]` in `π/10` steps with every sample invalid
    /// except the ones supplied.
    fn sparse_scan(samples: &[(usize, f64)]) -> RangeScan {
        let mut ranges = vec![-1.0; 11];
        for &(i, r) in samples {
            ranges[i] = r;
        }
        RangeScan::new(-PI / 2.0, PI / 2.0, PI / 10.0, ranges)
    }

    #[test]
    fn zero_velocity_gives_infinite_time() {
        assert_eq!(time_to_hit(0.4, 0.0), f64::INFINITY);
        assert_eq!(time_to_hit(0.4, 2.0), 0.2);
    }

    #[test]
    fn all_invalid_samples_yield_nothing() {
        let scan = RangeScan::new(-PI / 2.0, PI / 2.0, PI / 10.0, vec![-1.0; 10]);
        assert!(scanner(0.0, 1.0).scan(&scan).unwrap().is_empty());
    }

    #[test]
    fn nan_and_infinite_samples_are_skipped() {
        let scan = sparse_scan(&[(4, f64::NAN), (5, f64::INFINITY), (6, 0.0)]);
        assert!(scanner(0.0, 1.0).scan(&scan).unwrap().is_empty());
    }

    #[test]
    fn sample_dead_ahead_is_in_straight_corridor() {
        // Index 5 sits at θ = 0.
        let scan = sparse_scan(&[(5, 0.4)]);
        let found = scanner(0.0, 1.0).scan(&scan).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].x.abs() < 1e-12);
        assert!((found[0].y - 0.4).abs() < 1e-12);
        assert!((found[0].distance - 0.4).abs() < 1e-12);
        assert!((found[0].time_to_hit - 0.4).abs() < 1e-12);
    }

    #[test]
    fn wide_sample_is_outside_straight_corridor() {
        // θ = π/10 at 1 m puts the point ~0.31 m to the side.
        let scan = sparse_scan(&[(6, 1.0)]);
        assert!(scanner(0.0, 1.0).scan(&scan).unwrap().is_empty());
    }

    #[test]
    fn output_preserves_scan_order() {
        let mut ranges = vec![f64::NAN; 21];
        ranges[9] = 2.0;
        ranges[10] = 1.0;
        ranges[11] = 3.0;
        let scan = RangeScan::new(-0.2, 0.2, 0.02, ranges);
        let found = scanner(0.0, 1.0).scan(&scan).unwrap();
        let ys: Vec<f64> = found.iter().map(|o| o.y.round()).collect();
        assert_eq!(ys, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn curved_corridor_accepts_point_on_centreline() {
        // Just ahead of the vehicle, hard negative steering.
        let scan = sparse_scan(&[(5, 0.2)]);
        let s = scanner(-PI / 7.0, 1.0);
        let found = s.scan(&scan).unwrap();
        assert_eq!(found.len(), 1);

        let r = 0.3 / (PI / 7.0).tan();
        let expected = r * 0.2_f64.atan2(r);
        assert!((found[0].distance - expected).abs() < 1e-9);
        assert!((found[0].time_to_hit - expected).abs() < 1e-9);
    }

    #[test]
    fn curved_corridor_rejects_point_across_the_turn() {
        // A metre off to the outside of the turn.
        let scan = sparse_scan(&[(0, 1.0)]);
        assert!(scanner(-PI / 7.0, 1.0).scan(&scan).unwrap().is_empty());
    }

    /// Scanner whose mount cancels the forward component of a sample at
    /// `theta`, so that `range` lands on the axle line (`y == 0`).
    fn axle_line_scanner(steering: f64, theta: f64, range: f64) -> ObstacleScanner {
        let mount = SensorMount::new(0.0, -(range * theta.cos()));
        ObstacleScanner::new(corridor(steering), 1.0, mount)
    }

    #[test]
    fn samples_on_either_radius_are_outside_curved_corridor() {
        let steering = -PI / 7.0;
        let PathCorridor::Curved {
            turning_radius,
            inner_radius,
            outer_radius,
            ..
        } = corridor(steering)
        else {
            panic!("expected a curved corridor");
        };
        let half_width = 0.125;
        assert_eq!(inner_radius, turning_radius - half_width);
        assert_eq!(outer_radius, turning_radius + half_width);

        // Negative steering flips x, so θ = π/2 moves towards the centre
        // and θ = -π/2 away from it.
        let on_inner = axle_line_scanner(steering, FRAC_PI_2, half_width);
        assert!(on_inner.locate(FRAC_PI_2, half_width).is_none());
        let on_outer = axle_line_scanner(steering, -FRAC_PI_2, half_width);
        assert!(on_outer.locate(-FRAC_PI_2, half_width).is_none());

        let inside_inner = axle_line_scanner(steering, FRAC_PI_2, 0.1);
        assert!(inside_inner.locate(FRAC_PI_2, 0.1).is_some());
        let inside_outer = axle_line_scanner(steering, -FRAC_PI_2, 0.1);
        assert!(inside_outer.locate(-FRAC_PI_2, 0.1).is_some());
    }

    #[test]
    fn reported_point_stays_in_vehicle_frame() {
        let s = scanner(-0.3, 1.0);
        let hit = s.locate(0.05, 0.3).expect("inside corridor");
        let (x, _) = SensorMount::default().project(0.05, 0.3);
        assert_eq!(hit.x, x);
    }

    #[test]
    fn malformed_header_is_an_error() {
        let scan = RangeScan::new(-1.0, 1.0, 0.0, vec![0.4; 5]);
        assert!(matches!(
            scanner(0.0, 1.0).scan(&scan),
            Err(AutobrakeError::InvalidScan(_))
        ));
    }

    #[test]
    fn mount_offset_shifts_membership() {
        // 0.1 m to the side is inside; shifting the sensor 0.05 m further out
        // pushes it past the 0.125 m half width.
        let theta = (0.1_f64).atan2(1.0);
        let range = (1.0_f64 + 0.01).sqrt();
        let centred = ObstacleScanner::new(corridor(0.0), 1.0, SensorMount::default());
        let shifted = ObstacleScanner::new(corridor(0.0), 1.0, SensorMount::new(0.05, 0.0));
        assert!(centred.locate(theta, range).is_some());
        assert!(shifted.locate(theta, range).is_none());
    }
}

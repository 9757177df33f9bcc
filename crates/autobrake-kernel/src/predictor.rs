//! [`CollisionPredictor`] – the per-frame brake check.
//!
//! `predict` is a pure function of the scan, the vehicle configuration held by
//! the predictor, and the [`KinematicState`] passed in by the caller:
//!
//! ```text
//! KinematicState ─► PathCorridor ─┐
//!                                 ├─► ObstacleScanner ─► BrakeDecision ─► BrakeVerdict
//! RangeScan ──────────────────────┘
//! ```
//!
//! Nothing is remembered between calls, so concurrent callers may share one
//! predictor freely.

use autobrake_perception::{ObstacleScanner, PathCorridor, SensorMount};
use autobrake_types::{AutobrakeError, BrakeVerdict, KinematicState, RangeScan, VehicleGeometry};
use tracing::{debug, info};

use crate::decision::BrakeDecision;

/// Stateless obstacle-collision predictor for one vehicle.
///
/// # Example
///
/// ```
/// use autobrake_kernel::CollisionPredictor;
/// use autobrake_types::{KinematicState, RangeScan, VehicleGeometry};
///
/// let predictor = CollisionPredictor::new(VehicleGeometry::default()).unwrap();
///
/// // One return 0.4 m dead ahead.
/// let scan = RangeScan::new(0.0, 0.5, 0.25, vec![0.4, f64::NAN, f64::NAN]);
/// let verdict = predictor.predict(&scan, &KinematicState::new(0.0, 1.0)).unwrap();
/// assert!(verdict.should_brake);
/// ```
pub struct CollisionPredictor {
    geometry: VehicleGeometry,
    mount: SensorMount,
    decision: BrakeDecision,
}

impl CollisionPredictor {
    /// Build a predictor for `geometry` with the sensor at the vehicle origin.
    ///
    /// # Errors
    ///
    /// [`AutobrakeError::InvalidGeometry`] when a dimension or threshold is not
    /// strictly positive.
    pub fn new(geometry: VehicleGeometry) -> Result<Self, AutobrakeError> {
        geometry.validate()?;
        let decision = BrakeDecision::from_geometry(&geometry);
        Ok(Self {
            geometry,
            mount: SensorMount::default(),
            decision,
        })
    }

    /// Use `mount` to place scan samples in the vehicle frame.
    pub fn with_mount(mut self, mount: SensorMount) -> Self {
        self.mount = mount;
        self
    }

    pub fn geometry(&self) -> &VehicleGeometry {
        &self.geometry
    }

    pub fn mount(&self) -> &SensorMount {
        &self.mount
    }

    /// Corridor swept at `steering_angle`.
    pub fn corridor(&self, steering_angle: f64) -> PathCorridor {
        PathCorridor::for_steering(steering_angle, &self.geometry)
    }

    /// Decide whether `scan` calls for an emergency brake in `state`.
    ///
    /// # Errors
    ///
    /// - [`AutobrakeError::InvalidKinematics`] – non-finite input, steering at
    ///   or beyond ±π/2, or a negative velocity.
    /// - [`AutobrakeError::InvalidScan`] – malformed scan header.
    ///
    /// Invalid individual readings are not errors; they are skipped.
    pub fn predict(
        &self,
        scan: &RangeScan,
        state: &KinematicState,
    ) -> Result<BrakeVerdict, AutobrakeError> {
        state.validate()?;

        let corridor = self.corridor(state.steering_angle);
        let scanner = ObstacleScanner::new(corridor, state.velocity, self.mount);
        let obstacles = scanner.scan(scan)?;
        let verdict = self.decision.decide(obstacles);

        if verdict.should_brake {
            info!(
                candidates = verdict.triggering_obstacles.len(),
                nearest = verdict.nearest().map(|o| o.distance),
                steering_angle = state.steering_angle,
                velocity = state.velocity,
                "brake condition detected"
            );
        } else {
            debug!(candidates = verdict.triggering_obstacles.len(), "path clear");
        }
        Ok(verdict)
    }
}

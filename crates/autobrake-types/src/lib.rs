use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use thiserror::Error;
use uuid::Uuid;

/// Number of samples by which `ranges.len()` may differ from the length
/// implied by the angle bounds before a scan is rejected.
pub const SCAN_LENGTH_TOLERANCE: usize = 1;

// ────────────────────────────────────────────────────────────────────────────
// RangeScan
// ────────────────────────────────────────────────────────────────────────────

/// One planar sweep from a range sensor, in the sensor frame.
///
/// Sample `i` lies at angle `angle_min + i * angle_increment`, measured from
/// the vehicle's forward axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeScan {
    /// Angle of the first sample (radians).
    pub angle_min: f64,
    /// Angle of the last sample (radians).
    pub angle_max: f64,
    /// Angular step between consecutive samples (radians, > 0).
    pub angle_increment: f64,
    /// Measured distances (metres), one per angular step.  JSON `null`
    /// (how serde_json writes NaN) reads back as NaN.
    #[serde(deserialize_with = "deserialize_ranges")]
    pub ranges: Vec<f64>,
    /// Smallest distance the sensor reports reliably, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_min: Option<f64>,
    /// Largest distance the sensor reports reliably, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_max: Option<f64>,
}

fn deserialize_ranges<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<Option<f64>> = Deserialize::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|r| r.unwrap_or(f64::NAN)).collect())
}

impl RangeScan {
    /// Build a scan without sensor range limits.
    pub fn new(angle_min: f64, angle_max: f64, angle_increment: f64, ranges: Vec<f64>) -> Self {
        Self {
            angle_min,
            angle_max,
            angle_increment,
            ranges,
            range_min: None,
            range_max: None,
        }
    }

    /// Number of samples implied by the angle bounds.
    ///
    /// Only meaningful once [`RangeScan::validate`] has accepted the bounds.
    /// Saturates at `usize::MAX` for increments too fine to count.
    pub fn expected_len(&self) -> usize {
        let steps = (self.angle_max - self.angle_min) / self.angle_increment;
        // `as` saturates on overflow.
        ((steps + 1e-9).floor() as usize).saturating_add(1)
    }

    /// Check the scan header and return how many samples may be read.
    ///
    /// The returned count is the shorter of `ranges.len()` and
    /// [`RangeScan::expected_len`]; a disagreement larger than
    /// [`SCAN_LENGTH_TOLERANCE`] is rejected.
    pub fn validate(&self) -> Result<usize, AutobrakeError> {
        if !self.angle_increment.is_finite() || self.angle_increment <= 0.0 {
            return Err(AutobrakeError::InvalidScan(format!(
                "angle_increment {} must be finite and > 0",
                self.angle_increment
            )));
        }
        if !self.angle_min.is_finite() || !self.angle_max.is_finite() {
            return Err(AutobrakeError::InvalidScan(format!(
                "angle bounds [{}, {}] must be finite",
                self.angle_min, self.angle_max
            )));
        }
        if self.angle_min >= self.angle_max {
            return Err(AutobrakeError::InvalidScan(format!(
                "angle_min {} must be below angle_max {}",
                self.angle_min, self.angle_max
            )));
        }

        let expected = self.expected_len();
        let supplied = self.ranges.len();
        if supplied.abs_diff(expected) > SCAN_LENGTH_TOLERANCE {
            return Err(AutobrakeError::InvalidScan(format!(
                "{supplied} ranges supplied but angle bounds imply {expected}"
            )));
        }
        Ok(supplied.min(expected))
    }

    /// Angle of sample `index` (radians).
    pub fn angle_at(&self, index: usize) -> f64 {
        self.angle_min + index as f64 * self.angle_increment
    }

    /// `true` when `range` is a usable return.
    ///
    /// NaN, infinities, non-positive values and readings outside the
    /// optional `[range_min, range_max]` window mean "no return".
    pub fn is_valid_range(&self, range: f64) -> bool {
        range.is_finite()
            && range > 0.0
            && self.range_min.is_none_or(|min| range >= min)
            && self.range_max.is_none_or(|max| range <= max)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// VehicleGeometry
// ────────────────────────────────────────────────────────────────────────────

/// Static dimensions and brake thresholds of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleGeometry {
    /// Distance between front and rear axles (metres).
    #[serde(default = "default_wheelbase_length")]
    pub wheelbase_length: f64,
    /// Distance between left and right wheels (metres).
    #[serde(default = "default_track_width")]
    pub track_width: f64,
    /// Obstacles at or closer than this path distance trigger (metres).
    #[serde(default = "default_autobrake_distance")]
    pub autobrake_distance: f64,
    /// Obstacles reached at or sooner than this trigger (seconds).
    #[serde(default = "default_autobrake_time")]
    pub autobrake_time: f64,
    /// Trigger candidates required before a brake is declared.
    #[serde(default = "default_min_corroborating_samples")]
    pub min_corroborating_samples: usize,
}

fn default_wheelbase_length() -> f64 {
    0.3
}
fn default_track_width() -> f64 {
    0.25
}
fn default_autobrake_distance() -> f64 {
    0.5
}
fn default_autobrake_time() -> f64 {
    1.0
}
fn default_min_corroborating_samples() -> usize {
    1
}

impl Default for VehicleGeometry {
    fn default() -> Self {
        Self {
            wheelbase_length: default_wheelbase_length(),
            track_width: default_track_width(),
            autobrake_distance: default_autobrake_distance(),
            autobrake_time: default_autobrake_time(),
            min_corroborating_samples: default_min_corroborating_samples(),
        }
    }
}

impl VehicleGeometry {
    /// Reject non-positive or non-finite dimensions and thresholds.
    pub fn validate(&self) -> Result<(), AutobrakeError> {
        let fields = [
            ("wheelbase_length", self.wheelbase_length),
            ("track_width", self.track_width),
            ("autobrake_distance", self.autobrake_distance),
            ("autobrake_time", self.autobrake_time),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(AutobrakeError::InvalidGeometry(format!(
                    "{name} {value} must be finite and > 0"
                )));
            }
        }
        if self.min_corroborating_samples == 0 {
            return Err(AutobrakeError::InvalidGeometry(
                "min_corroborating_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KinematicState
// ────────────────────────────────────────────────────────────────────────────

/// Most recent commanded steering angle and forward velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// Signed front-wheel steering angle (radians).
    pub steering_angle: f64,
    /// Forward velocity (m/s, ≥ 0).
    pub velocity: f64,
}

impl KinematicState {
    pub fn new(steering_angle: f64, velocity: f64) -> Self {
        Self {
            steering_angle,
            velocity,
        }
    }

    /// Reject non-finite values, steering at or beyond ±π/2, and reversing.
    pub fn validate(&self) -> Result<(), AutobrakeError> {
        if !self.steering_angle.is_finite() || self.steering_angle.abs() >= FRAC_PI_2 {
            return Err(AutobrakeError::InvalidKinematics(format!(
                "steering_angle {} must be finite and within (-π/2, π/2)",
                self.steering_angle
            )));
        }
        if !self.velocity.is_finite() || self.velocity < 0.0 {
            return Err(AutobrakeError::InvalidKinematics(format!(
                "velocity {} must be finite and >= 0",
                self.velocity
            )));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Obstacle / BrakeVerdict
// ────────────────────────────────────────────────────────────────────────────

/// A scan sample that lies inside the swept path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Lateral position in the vehicle frame (metres).
    pub x: f64,
    /// Forward position in the vehicle frame (metres).
    pub y: f64,
    /// Distance along the path to the obstacle (metres).
    pub distance: f64,
    /// Seconds until impact at the current velocity; `+inf` when stopped.
    /// serde_json writes `+inf` as `null`, which reads back as `+inf`.
    #[serde(deserialize_with = "deserialize_time_to_hit")]
    pub time_to_hit: f64,
}

fn deserialize_time_to_hit<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<f64> = Deserialize::deserialize(deserializer)?;
    Ok(raw.unwrap_or(f64::INFINITY))
}

/// Outcome of one prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrakeVerdict {
    pub should_brake: bool,
    /// Every trigger candidate, in scan order.
    pub triggering_obstacles: Vec<Obstacle>,
}

impl BrakeVerdict {
    /// A verdict with no brake and no obstacles.
    pub fn clear() -> Self {
        Self::default()
    }

    /// The triggering obstacle with the smallest path distance.
    pub fn nearest(&self) -> Option<&Obstacle> {
        self.triggering_obstacles
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bus events
// ────────────────────────────────────────────────────────────────────────────

/// Envelope for everything routed over the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g., "autobrake-runtime::node"
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Stamp `payload` with a fresh id and the current time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Data carried by an [`Event`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Scan(RangeScan),
    /// Commanded steering angle (radians).
    SteeringAngle(f64),
    /// Measured forward velocity (m/s).
    Velocity(f64),
    Verdict(BrakeVerdict),
    Fault { component: String, message: String },
}

/// Errors surfaced to callers. Per-sample problems never reach this type;
/// they are absorbed into the verdict.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AutobrakeError {
    #[error("Invalid Scan: {0}")]
    InvalidScan(String),

    #[error("Invalid Vehicle Geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid Kinematic State: {0}")]
    InvalidKinematics(String),

    #[error("Event Bus Error: {0}")]
    Channel(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}

//! Swept-path corridor of an Ackermann vehicle.
//!
//! Below [`ANGLE_EPSILON`] of steering the vehicle is treated as driving
//! straight and sweeps a strip `|x| < track_width / 2`.  Otherwise the rear
//! axle turns about a centre at `(-R, 0)` with
//!
//! ```text
//! R = wheelbase_length / tan(|steering_angle|)
//! ```
//!
//! and the body sweeps the annulus between `R - track_width / 2` and
//! `R + track_width / 2`.  The curved corridor is always expressed for a
//! positive steering angle; samples are brought into that frame by
//! multiplying their lateral coordinate by the `invert` sign (see
//! [`PathCorridor::to_corridor_frame`]).

use std::f64::consts::TAU;

use autobrake_types::VehicleGeometry;

/// Steering magnitude (radians) at or below which the path is straight.
pub const ANGLE_EPSILON: f64 = 0.01;

/// Region swept by the vehicle body for one steering angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCorridor {
    /// Strip of half-width `half_width` extending along the forward axis.
    Straight { half_width: f64 },
    /// Annulus about `(-turning_radius, 0)` in the corridor frame.
    Curved {
        /// Centreline turning radius (metres, > 0).
        turning_radius: f64,
        /// `turning_radius - track_width / 2`.
        inner_radius: f64,
        /// `turning_radius + track_width / 2`.
        outer_radius: f64,
        /// `-1.0` when steering negative, `1.0` otherwise.
        invert: f64,
    },
}

impl PathCorridor {
    /// Build the corridor swept at `steering_angle` by a vehicle with
    /// `geometry`.
    pub fn for_steering(steering_angle: f64, geometry: &VehicleGeometry) -> Self {
        let half_width = geometry.track_width / 2.0;
        if steering_angle.abs() <= ANGLE_EPSILON {
            return Self::Straight { half_width };
        }

        let invert = if steering_angle < 0.0 { -1.0 } else { 1.0 };
        let turning_radius = geometry.wheelbase_length / steering_angle.abs().tan();
        Self::Curved {
            turning_radius,
            inner_radius: turning_radius - half_width,
            outer_radius: turning_radius + half_width,
            invert,
        }
    }

    pub fn is_straight(&self) -> bool {
        matches!(self, Self::Straight { .. })
    }

    /// Map a vehicle-frame lateral coordinate into the corridor frame.
    ///
    /// Straight corridors are symmetric and leave `x` untouched.
    pub fn to_corridor_frame(&self, x: f64) -> f64 {
        match self {
            Self::Straight { .. } => x,
            Self::Curved { invert, .. } => invert * x,
        }
    }

    /// `true` when the corridor-frame point `(x, y)` lies strictly inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match *self {
            Self::Straight { half_width } => x.abs() < half_width,
            Self::Curved {
                turning_radius,
                inner_radius,
                outer_radius,
                ..
            } => {
                let radial = ((x + turning_radius).powi(2) + y.powi(2)).sqrt();
                let lo = inner_radius.min(outer_radius);
                let hi = inner_radius.max(outer_radius);
                lo < radial && radial < hi
            }
        }
    }

    /// Distance along the path to the corridor-frame point `(x, y)`.
    ///
    /// Straight: the forward coordinate.  Curved: the centreline radius times
    /// the angle swept about the turning centre, in `[0, 2π)`.  The curved
    /// figure approximates the arc to the obstacle's angular position, not
    /// the arc to the nearest corridor edge.
    pub fn path_distance(&self, x: f64, y: f64) -> f64 {
        match *self {
            Self::Straight { .. } => y,
            Self::Curved { turning_radius, .. } => {
                let mut angle = y.atan2(turning_radius + x);
                if angle < 0.0 {
                    angle += TAU;
                }
                turning_radius * (angle % TAU)
            }
        }
    }
}

//! Sensor mounting offset.
//!
//! The vehicle frame has `x` pointing laterally and `y` pointing forward, with
//! the origin on the vehicle reference point.  A sample at bearing `θ`
//! (measured from the forward axis) and range `r` projects to
//!
//! ```text
//! x = r · sin θ + lateral_offset
//! y = r · cos θ + forward_offset
//! ```

use serde::{Deserialize, Serialize};

/// Planar translation from the vehicle reference point to the sensor origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorMount {
    /// Lateral offset of the sensor (metres).
    #[serde(default)]
    pub lateral_offset: f64,
    /// Forward offset of the sensor (metres).
    #[serde(default)]
    pub forward_offset: f64,
}

impl SensorMount {
    pub fn new(lateral_offset: f64, forward_offset: f64) -> Self {
        Self {
            lateral_offset,
            forward_offset,
        }
    }

    /// Project a polar sample into the vehicle frame, returning `(x, y)`.
    pub fn project(&self, theta: f64, range: f64) -> (f64, f64) {
        (
            range * theta.sin() + self.lateral_offset,
            range * theta.cos() + self.forward_offset,
        )
    }
}

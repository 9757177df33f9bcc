//! `autobrake-perception` – swept-path geometry.
//!
//! Turns a planar range sweep and the commanded steering angle into the set
//! of scan samples that lie inside the region the vehicle body will sweep.
//!
//! # Modules
//!
//! - [`mount`] – [`SensorMount`][mount::SensorMount]: projects a polar sample
//!   into the vehicle frame, accounting for where the sensor is bolted on.
//! - [`corridor`] – [`PathCorridor`][corridor::PathCorridor]: the straight
//!   strip or curved annulus swept by an Ackermann vehicle at a given
//!   steering angle.
//! - [`scanner`] – [`ObstacleScanner`][scanner::ObstacleScanner]: walks a
//!   [`RangeScan`][autobrake_types::RangeScan] and reports every valid sample
//!   inside the corridor together with its path distance and time to impact.

pub mod corridor;
pub mod mount;
pub mod scanner;

pub use corridor::{ANGLE_EPSILON, PathCorridor};
pub use mount::SensorMount;
pub use scanner::{ObstacleScanner, time_to_hit};

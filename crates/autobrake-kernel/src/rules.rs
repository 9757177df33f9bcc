//! [`TriggerRule`] – per-obstacle brake criteria.
//!
//! An in-corridor [`Obstacle`] becomes a *trigger candidate* as soon as any
//! registered rule fires for it.  Two built-in rules are provided:
//! - [`DistanceRule`] – fires when the path distance is within the brake
//!   distance.
//! - [`TimeToHitRule`] – fires when the obstacle will be reached within the
//!   brake time.

use autobrake_types::Obstacle;

/// A single criterion that can mark an obstacle as a trigger candidate.
///
/// Implement this trait to add custom criteria to a
/// [`BrakeDecision`][crate::decision::BrakeDecision] via
/// [`BrakeDecision::add_rule`][crate::decision::BrakeDecision::add_rule].
pub trait TriggerRule: Send + Sync {
    /// Human-readable name used in log fields.
    fn name(&self) -> &str;

    /// Return `true` when `obstacle` warrants braking under this rule.
    fn fires(&self, obstacle: &Obstacle) -> bool;
}

/// Fires when `obstacle.distance <= max_distance`.
pub struct DistanceRule {
    /// Brake distance in metres (inclusive).
    pub max_distance: f64,
}

impl TriggerRule for DistanceRule {
    fn name(&self) -> &str {
        "distance"
    }

    fn fires(&self, obstacle: &Obstacle) -> bool {
        obstacle.distance <= self.max_distance
    }
}

/// Fires when `obstacle.time_to_hit <= max_time`.
///
/// A stationary vehicle reports an infinite time to hit, so this rule never
/// fires for it.
pub struct TimeToHitRule {
    /// Brake time in seconds (inclusive).
    pub max_time: f64,
}

impl TriggerRule for TimeToHitRule {
    fn name(&self) -> &str {
        "time_to_hit"
    }

    fn fires(&self, obstacle: &Obstacle) -> bool {
        obstacle.time_to_hit <= self.max_time
    }
}

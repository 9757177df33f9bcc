//! [`BrakeDecision`] – reduces in-corridor obstacles to a verdict.
//!
//! Each obstacle is checked against every registered [`TriggerRule`]; those
//! for which any rule fires are trigger candidates.  The verdict brakes when
//! at least `min_corroborating_samples` candidates were found, and always
//! carries the candidates themselves for diagnostics.
//!
//! The decision is stateless: the same obstacles always produce the same
//! verdict.

use autobrake_types::{BrakeVerdict, Obstacle, VehicleGeometry};
use tracing::trace;

use crate::rules::{DistanceRule, TimeToHitRule, TriggerRule};

/// Classifier from obstacles to [`BrakeVerdict`].
///
/// # Example
///
/// ```
/// use autobrake_kernel::decision::BrakeDecision;
/// use autobrake_types::{Obstacle, VehicleGeometry};
///
/// let decision = BrakeDecision::from_geometry(&VehicleGeometry::default());
///
/// let close = Obstacle { x: 0.0, y: 0.4, distance: 0.4, time_to_hit: 4.0 };
/// let far = Obstacle { x: 0.0, y: 3.0, distance: 3.0, time_to_hit: 30.0 };
///
/// let verdict = decision.decide(vec![close, far]);
/// assert!(verdict.should_brake);
/// assert_eq!(verdict.triggering_obstacles, vec![close]);
/// ```
pub struct BrakeDecision {
    rules: Vec<Box<dyn TriggerRule>>,
    min_corroborating_samples: usize,
}

impl BrakeDecision {
    /// Create a decision with no rules.  `min_corroborating_samples` is
    /// raised to 1 if zero.
    pub fn new(min_corroborating_samples: usize) -> Self {
        Self {
            rules: Vec::new(),
            min_corroborating_samples: min_corroborating_samples.max(1),
        }
    }

    /// Distance and time-to-hit rules with the thresholds of `geometry`.
    pub fn from_geometry(geometry: &VehicleGeometry) -> Self {
        let mut decision = Self::new(geometry.min_corroborating_samples);
        decision.add_rule(Box::new(DistanceRule {
            max_distance: geometry.autobrake_distance,
        }));
        decision.add_rule(Box::new(TimeToHitRule {
            max_time: geometry.autobrake_time,
        }));
        decision
    }

    /// Register a new [`TriggerRule`].  Rules are evaluated in insertion order.
    pub fn add_rule(&mut self, rule: Box<dyn TriggerRule>) {
        self.rules.push(rule);
    }

    pub fn min_corroborating_samples(&self) -> usize {
        self.min_corroborating_samples
    }

    /// `true` when any rule fires for `obstacle`.
    pub fn is_trigger_candidate(&self, obstacle: &Obstacle) -> bool {
        match self.rules.iter().find(|rule| rule.fires(obstacle)) {
            Some(rule) => {
                trace!(rule = rule.name(), x = obstacle.x, y = obstacle.y, "trigger candidate");
                true
            }
            None => false,
        }
    }

    /// Keep the trigger candidates, in order, and decide whether to brake.
    pub fn decide(&self, obstacles: impl IntoIterator<Item = Obstacle>) -> BrakeVerdict {
        let triggering_obstacles: Vec<Obstacle> = obstacles
            .into_iter()
            .filter(|o| self.is_trigger_candidate(o))
            .collect();
        BrakeVerdict {
            should_brake: triggering_obstacles.len() >= self.min_corroborating_samples,
            triggering_obstacles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle(distance: f64, time_to_hit: f64) -> Obstacle {
        Obstacle {
            x: 0.0,
            y: distance,
            distance,
            time_to_hit,
        }
    }

    fn geometry(min_samples: usize) -> VehicleGeometry {
        VehicleGeometry {
            min_corroborating_samples: min_samples,
            ..VehicleGeometry::default()
        }
    }

    #[test]
    fn no_obstacles_no_brake() {
        let d = BrakeDecision::from_geometry(&geometry(1));
        let v = d.decide(Vec::new());
        assert!(!v.should_brake);
        assert!(v.triggering_obstacles.is_empty());
    }

    #[test]
    fn either_threshold_triggers() {
        let d = BrakeDecision::from_geometry(&geometry(1));
        // Close but slow.
        assert!(d.is_trigger_candidate(&obstacle(0.4, 40.0)));
        // Far but fast.
        assert!(d.is_trigger_candidate(&obstacle(4.0, 0.9)));
        // Neither.
        assert!(!d.is_trigger_candidate(&obstacle(4.0, 4.0)));
    }

    #[test]
    fn single_candidate_is_not_corroborated_with_two_required() {
        let d = BrakeDecision::from_geometry(&geometry(2));
        let v = d.decide(vec![obstacle(0.3, 0.3), obstacle(3.0, 3.0)]);
        assert!(!v.should_brake);
        assert_eq!(v.triggering_obstacles.len(), 1);
    }

    #[test]
    fn two_candidates_corroborate() {
        let d = BrakeDecision::from_geometry(&geometry(2));
        let v = d.decide(vec![obstacle(0.3, 0.3), obstacle(0.35, 0.35), obstacle(3.0, 3.0)]);
        assert!(v.should_brake);
        assert_eq!(v.triggering_obstacles.len(), 2);
    }

    #[test]
    fn candidates_keep_input_order() {
        let d = BrakeDecision::from_geometry(&geometry(1));
        let v = d.decide(vec![obstacle(0.45, 9.0), obstacle(9.0, 9.0), obstacle(0.1, 9.0)]);
        let distances: Vec<f64> = v.triggering_obstacles.iter().map(|o| o.distance).collect();
        assert_eq!(distances, vec![0.45, 0.1]);
    }

    #[test]
    fn decision_without_rules_never_brakes() {
        let d = BrakeDecision::new(1);
        assert!(!d.decide(vec![obstacle(0.0, 0.0)]).should_brake);
    }

    #[test]
    fn zero_corroboration_is_raised_to_one() {
        assert_eq!(BrakeDecision::new(0).min_corroborating_samples(), 1);
    }

    #[test]
    fn custom_rule_participates() {
        struct AheadRule;
        impl TriggerRule for AheadRule {
            fn name(&self) -> &str {
                "ahead"
            }
            fn fires(&self, obstacle: &Obstacle) -> bool {
                obstacle.x == 0.0
            }
        }

        let mut d = BrakeDecision::new(1);
        d.add_rule(Box::new(AheadRule));
        assert!(d.decide(vec![obstacle(50.0, 50.0)]).should_brake);
    }
}

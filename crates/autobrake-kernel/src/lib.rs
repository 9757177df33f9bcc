//! `autobrake-kernel` – Brake Decision
//!
//! Decides, one sensor frame at a time, whether an obstacle lies in the
//! vehicle's swept path soon enough to warrant an emergency brake.
//!
//! # Modules
//!
//! - [`rules`] – [`TriggerRule`][rules::TriggerRule]: per-obstacle criteria
//!   ([`DistanceRule`][rules::DistanceRule], [`TimeToHitRule`][rules::TimeToHitRule])
//!   that mark an in-corridor obstacle as a trigger candidate.
//! - [`decision`] – [`BrakeDecision`][decision::BrakeDecision]: reduces the
//!   trigger candidates of one frame to a
//!   [`BrakeVerdict`][autobrake_types::BrakeVerdict] using a
//!   minimum-corroborating-samples policy.
//! - [`predictor`] – [`CollisionPredictor`][predictor::CollisionPredictor]:
//!   the stateless facade wiring path geometry, the obstacle scanner and the
//!   decision together.
//! - [`debounce`] – [`BrakeDebouncer`][debounce::BrakeDebouncer]: optional
//!   temporal filter layered on top of a verdict stream; engages and releases
//!   only after a run of agreeing verdicts.

pub mod debounce;
pub mod decision;
pub mod predictor;
pub mod rules;

pub use debounce::BrakeDebouncer;
pub use decision::BrakeDecision;
pub use predictor::CollisionPredictor;
pub use rules::{DistanceRule, TimeToHitRule, TriggerRule};

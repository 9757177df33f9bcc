//! `autobrake-middleware` – Frame Transport
//!
//! Routes scans, kinematic signals and brake verdicts between the sensor
//! drivers, the predictor node and the braking actuator without caring about
//! their meaning.
//!
//! # Modules
//!
//! - [`bus`] – Typed, topic-based publish/subscribe event bus built on Tokio
//!   broadcast channels.  Slow subscribers lose the oldest frames instead of
//!   queueing them.

pub mod bus;

pub use bus::{EventBus, Topic, TopicReceiver};

//! [`AutobrakeNode`] – bus-facing wrapper around the collision predictor.
//!
//! The node is the only place kinematic state lives.  Steering and velocity
//! updates overwrite the last known values; each scan is evaluated exactly
//! once against them and produces one event on [`Topic::BrakeVerdict`], or a
//! [`EventPayload::Fault`] on [`Topic::SystemAlerts`] when the frame is
//! rejected.
//!
//! # Example
//!
//! ```rust
//! use autobrake_middleware::{EventBus, Topic};
//! use autobrake_runtime::{AutobrakeNode, CollisionPredictor};
//! use autobrake_types::{Event, EventPayload, RangeScan, VehicleGeometry};
//!
//! let bus = EventBus::default();
//! let _verdicts = bus.subscribe_to(Topic::BrakeVerdict);
//!
//! let predictor = CollisionPredictor::new(VehicleGeometry::default()).unwrap();
//! let mut node = AutobrakeNode::new(predictor, bus);
//!
//! node.handle_event(&Event::new("demo", EventPayload::Velocity(1.0)));
//! let scan = RangeScan::new(0.0, 0.5, 0.25, vec![0.4, f64::NAN, f64::NAN]);
//! let verdict = node
//!     .handle_event(&Event::new("demo", EventPayload::Scan(scan)))
//!     .unwrap();
//! assert!(verdict.should_brake);
//! ```

use std::future::Future;

use autobrake_kernel::{BrakeDebouncer, CollisionPredictor};
use autobrake_middleware::{EventBus, Topic, TopicReceiver};
use autobrake_types::{AutobrakeError, BrakeVerdict, Event, EventPayload, KinematicState, RangeScan};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Source tag stamped on every event the node publishes.
pub const NODE_SOURCE: &str = "autobrake-runtime::node";

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// The three input subscriptions a running node reads from.
///
/// Subscribe before anything is published: broadcast receivers only see
/// events sent after they were created.
pub struct NodeInputs {
    pub steering: TopicReceiver,
    pub velocity: TopicReceiver,
    pub scan: TopicReceiver,
}

impl NodeInputs {
    pub fn subscribe(bus: &EventBus) -> Self {
        Self {
            steering: bus.subscribe_to(Topic::SteeringAngle),
            velocity: bus.subscribe_to(Topic::Velocity),
            scan: bus.subscribe_to(Topic::Scan),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AutobrakeNode
// ─────────────────────────────────────────────────────────────────────────────

pub struct AutobrakeNode {
    predictor: CollisionPredictor,
    debouncer: Option<BrakeDebouncer>,
    state: KinematicState,
    bus: EventBus,
}

impl AutobrakeNode {
    /// Create a node that publishes raw verdicts.  The vehicle is assumed
    /// stationary and centred until the first updates arrive.
    pub fn new(predictor: CollisionPredictor, bus: EventBus) -> Self {
        Self {
            predictor,
            debouncer: None,
            state: KinematicState::default(),
            bus,
        }
    }

    /// Debounce `should_brake` before publishing.
    pub fn with_debouncer(mut self, debouncer: BrakeDebouncer) -> Self {
        self.debouncer = Some(debouncer);
        self
    }

    /// Last known steering angle and velocity.
    pub fn state(&self) -> KinematicState {
        self.state
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Subscribe to the node's input topics on its own bus.
    pub fn subscribe(&self) -> NodeInputs {
        NodeInputs::subscribe(&self.bus)
    }

    /// Evaluate `scan` against the current kinematic state.
    ///
    /// The debouncer, when present, is advanced only by frames that produced
    /// a verdict.
    pub fn evaluate(&mut self, scan: &RangeScan) -> Result<BrakeVerdict, AutobrakeError> {
        let verdict = self.predictor.predict(scan, &self.state)?;
        Ok(match self.debouncer.as_mut() {
            Some(debouncer) => debouncer.apply(verdict),
            None => verdict,
        })
    }

    /// Apply one bus event.
    ///
    /// Returns the published verdict when `event` is a scan that was
    /// accepted, `None` otherwise.
    pub fn handle_event(&mut self, event: &Event) -> Option<BrakeVerdict> {
        match &event.payload {
            EventPayload::SteeringAngle(angle) => {
                self.state.steering_angle = *angle;
                None
            }
            EventPayload::Velocity(velocity) => {
                self.state.velocity = *velocity;
                None
            }
            EventPayload::Scan(scan) => match self.evaluate(scan) {
                Ok(verdict) => {
                    self.publish(
                        Topic::BrakeVerdict,
                        EventPayload::Verdict(verdict.clone()),
                    );
                    Some(verdict)
                }
                Err(e) => {
                    warn!(error = %e, source = %event.source, "scan rejected");
                    self.publish(
                        Topic::SystemAlerts,
                        EventPayload::Fault {
                            component: NODE_SOURCE.to_string(),
                            message: e.to_string(),
                        },
                    );
                    None
                }
            },
            _ => None,
        }
    }

    /// Process events from `inputs` until `shutdown` resolves or an input
    /// channel is closed.
    ///
    /// Kinematic topics are polled before the scan topic so that updates
    /// published ahead of a scan are applied before it is evaluated.  When
    /// several scans are waiting, only the newest is evaluated; the older
    /// ones are dropped without a verdict.
    pub async fn run<F>(&mut self, mut inputs: NodeInputs, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("autobrake node started");

        loop {
            let (topic, received) = tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("autobrake node shutting down");
                    return;
                }
                r = inputs.steering.recv() => (Topic::SteeringAngle, r),
                r = inputs.velocity.recv() => (Topic::Velocity, r),
                r = inputs.scan.recv() => (Topic::Scan, r),
            };

            match received {
                Ok(event) if topic == Topic::Scan => {
                    let event = self.catch_up(event, &mut inputs);
                    self.handle_event(&event);
                }
                Ok(event) => {
                    self.handle_event(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(?topic, skipped, "node lagging; stale events dropped");
                }
                Err(RecvError::Closed) => {
                    info!(?topic, "input channel closed; autobrake node stopping");
                    return;
                }
            }
        }
    }

    /// Replace `scan` with the newest buffered scan and apply the newest
    /// buffered kinematic updates, so a backlog yields a single verdict.
    fn catch_up(&mut self, scan: Event, inputs: &mut NodeInputs) -> Event {
        for receiver in [&mut inputs.steering, &mut inputs.velocity] {
            if let (Some(update), _) = receiver.skip_to_latest() {
                self.handle_event(&update);
            }
        }

        match inputs.scan.skip_to_latest() {
            (Some(newest), skipped) => {
                debug!(skipped = skipped + 1, "stale scans superseded");
                newest
            }
            (None, 0) => scan,
            (None, lost) => {
                debug!(skipped = lost, "stale scans lost to lag");
                scan
            }
        }
    }

    fn publish(&self, topic: Topic, payload: EventPayload) {
        if let Err(e) = self.bus.publish_to(topic, Event::new(NODE_SOURCE, payload)) {
            debug!(?topic, error = %e, "event not delivered");
        }
    }
}

//! Headless, typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.  When a subscriber falls behind, the channel overwrites the
//! oldest buffered events and the subscriber sees
//! [`broadcast::error::RecvError::Lagged`]: stale scans are dropped, never
//! queued.
//!
//! # Topics
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::Scan`] | Range sweeps at sensor rate |
//! | [`Topic::SteeringAngle`] | Commanded steering angle |
//! | [`Topic::Velocity`] | Measured forward velocity |
//! | [`Topic::BrakeVerdict`] | One verdict per processed scan |
//! | [`Topic::SystemAlerts`] | Rejected frames and other faults |

use autobrake_types::{AutobrakeError, Event};
use tokio::sync::broadcast;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 16;

/// Enumeration of all routing topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Planar range sweeps.
    Scan,
    /// Steering angle updates (radians).
    SteeringAngle,
    /// Velocity updates (m/s).
    Velocity,
    /// Brake verdicts for the actuation layer.
    BrakeVerdict,
    /// Faults: malformed scans, rejected kinematic input.
    SystemAlerts,
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    scan: broadcast::Sender<Event>,
    steering_angle: broadcast::Sender<Event>,
    velocity: broadcast::Sender<Event>,
    brake_verdict: broadcast::Sender<Event>,
    system_alerts: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero, as [`broadcast::channel`] does.
    pub fn new(capacity: usize) -> Self {
        let (scan, _) = broadcast::channel(capacity);
        let (steering_angle, _) = broadcast::channel(capacity);
        let (velocity, _) = broadcast::channel(capacity);
        let (brake_verdict, _) = broadcast::channel(capacity);
        let (system_alerts, _) = broadcast::channel(capacity);
        Self {
            scan,
            steering_angle,
            velocity,
            brake_verdict,
            system_alerts,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event, or
    /// [`AutobrakeError::Channel`] when nobody is subscribed to the topic.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, AutobrakeError> {
        self.topic_sender(topic)
            .send(event)
            .map_err(|_| AutobrakeError::Channel(format!("No subscribers for topic {topic:?}")))
    }

    /// Subscribe to a specific [`Topic`] channel.
    ///
    /// The receiver only sees events published after this call.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    /// Number of live receivers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topic_sender(topic).receiver_count()
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Scan => &self.scan,
            Topic::SteeringAngle => &self.steering_angle,
            Topic::Velocity => &self.velocity,
            Topic::BrakeVerdict => &self.brake_verdict,
            Topic::SystemAlerts => &self.system_alerts,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Topic-based receiver
// ---------------------------------------------------------------------------

/// An async receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(broadcast::error::RecvError::Lagged(n))` – the subscriber fell
    ///   behind and `n` messages were dropped.  The next call resumes at the
    ///   oldest event still buffered.
    /// * `Err(broadcast::error::RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// Take the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Result<Event, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain everything buffered and keep only the newest event.
    ///
    /// Returns that event, if any, and how many older events were discarded
    /// on the way (including ones already lost to lag).
    pub fn skip_to_latest(&mut self) -> (Option<Event>, u64) {
        let mut latest = None;
        let mut skipped = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if latest.replace(event).is_some() {
                        skipped += 1;
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => skipped += n,
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
        (latest, skipped)
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

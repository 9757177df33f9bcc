//! Frame replay – pushes recorded frames through the bus and a live node.
//!
//! Input is JSON Lines, one frame per line:
//!
//! ```json
//! {"steering_angle": 0.1, "velocity": 1.2, "scan": {"angle_min": -1.0, "angle_max": 1.0, "angle_increment": 0.5, "ranges": [2, 2, 0.4, 2, 2]}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.  Frames are sent in
//! lockstep: the next frame is published only once the node has answered
//! the previous one, so no frame is dropped as stale.

use autobrake_middleware::Topic;
use autobrake_runtime::AutobrakeNode;
use autobrake_types::{AutobrakeError, BrakeVerdict, Event, EventPayload, RangeScan};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const REPLAY_SOURCE: &str = "autobrake-cli::replay";

/// One recorded input frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub steering_angle: f64,
    pub velocity: f64,
    pub scan: RangeScan,
}

/// What the node answered for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameOutcome {
    Verdict(BrakeVerdict),
    Fault(String),
}

/// Parse a JSON Lines recording.
pub fn parse_frames(raw: &str) -> Result<Vec<ReplayFrame>, String> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| format!("Frame on line {}: {}", i + 1, e))
        })
        .collect()
}

/// Run `frames` through `node` over its bus and collect one outcome per
/// frame, in order.
pub async fn replay(
    node: AutobrakeNode,
    frames: &[ReplayFrame],
) -> Result<Vec<FrameOutcome>, AutobrakeError> {
    let bus = node.bus().clone();
    let inputs = node.subscribe();
    let mut verdicts = bus.subscribe_to(Topic::BrakeVerdict);
    let mut alerts = bus.subscribe_to(Topic::SystemAlerts);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let worker = tokio::spawn(async move {
        let mut node = node;
        node.run(inputs, async {
            let _ = stop_rx.await;
        })
        .await;
    });

    info!(frames = frames.len(), "replay started");
    let mut outcomes = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        bus.publish_to(
            Topic::SteeringAngle,
            Event::new(REPLAY_SOURCE, EventPayload::SteeringAngle(frame.steering_angle)),
        )?;
        bus.publish_to(
            Topic::Velocity,
            Event::new(REPLAY_SOURCE, EventPayload::Velocity(frame.velocity)),
        )?;
        bus.publish_to(
            Topic::Scan,
            Event::new(REPLAY_SOURCE, EventPayload::Scan(frame.scan.clone())),
        )?;

        let answer = tokio::select! {
            r = verdicts.recv() => r,
            r = alerts.recv() => r,
        }
        .map_err(|e| AutobrakeError::Channel(format!("Node stopped answering: {e}")))?;

        let outcome = match answer.payload {
            EventPayload::Verdict(verdict) => FrameOutcome::Verdict(verdict),
            EventPayload::Fault { message, .. } => FrameOutcome::Fault(message),
            other => {
                return Err(AutobrakeError::Channel(format!(
                    "Unexpected answer to frame {index}: {other:?}"
                )));
            }
        };
        debug!(index, ?outcome, "frame replayed");
        outcomes.push(outcome);
    }

    let _ = stop_tx.send(());
    worker
        .await
        .map_err(|e| AutobrakeError::Channel(format!("Node task failed: {e}")))?;
    info!(frames = outcomes.len(), "replay finished");
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autobrake_kernel::{BrakeDebouncer, CollisionPredictor};
    use autobrake_middleware::EventBus;
    use autobrake_types::VehicleGeometry;

    fn node() -> AutobrakeNode {
        let predictor = CollisionPredictor::new(VehicleGeometry::default()).unwrap();
        AutobrakeNode::new(predictor, EventBus::default())
    }

    fn frame(velocity: f64, ahead: f64) -> ReplayFrame {
        ReplayFrame {
            steering_angle: 0.0,
            velocity,
            scan: RangeScan::new(0.0, 0.5, 0.25, vec![ahead, f64::NAN, f64::NAN]),
        }
    }

    fn brakes(outcome: &FrameOutcome) -> bool {
        matches!(outcome, FrameOutcome::Verdict(v) if v.should_brake)
    }

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        let raw = concat!(
            "# recorded on the test track\n",
            "\n",
            r#"{"steering_angle":0.1,"velocity":1.0,"scan":{"angle_min":0.0,"angle_max":0.5,"angle_increment":0.25,"ranges":[0.4,null,2.0]}}"#,
            "\n",
        );
        let frames = parse_frames(raw).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].steering_angle, 0.1);
        assert!(frames[0].scan.ranges[1].is_nan());
    }

    #[test]
    fn parse_reports_line_number() {
        let raw = "\n{\"steering_angle\":0.0}\n";
        let err = parse_frames(raw).unwrap_err();
        assert!(err.starts_with("Frame on line 2"), "got: {err}");
    }

    #[tokio::test]
    async fn replay_answers_every_frame_in_order() {
        let frames = vec![frame(0.0, 3.0), frame(1.0, 0.4), frame(0.0, 3.0)];
        let outcomes = replay(node(), &frames).await.unwrap();
        let braking: Vec<bool> = outcomes.iter().map(brakes).collect();
        assert_eq!(braking, vec![false, true, false]);
    }

    #[tokio::test]
    async fn replay_uses_each_frames_kinematics() {
        // 0.8 m ahead: only time-to-hit can fire, so velocity decides.
        let frames = vec![frame(0.5, 0.8), frame(1.0, 0.8), frame(0.0, 0.8)];
        let outcomes = replay(node(), &frames).await.unwrap();
        let braking: Vec<bool> = outcomes.iter().map(brakes).collect();
        assert_eq!(braking, vec![false, true, false]);
    }

    #[tokio::test]
    async fn replay_reports_rejected_frames_and_continues() {
        let mut bad = frame(1.0, 0.4);
        bad.scan.angle_increment = 0.0;
        let frames = vec![bad, frame(1.0, 0.4)];

        let outcomes = replay(node(), &frames).await.unwrap();
        assert!(matches!(&outcomes[0], FrameOutcome::Fault(m) if m.starts_with("Invalid Scan")));
        assert!(brakes(&outcomes[1]));
    }

    #[tokio::test]
    async fn replay_applies_debounce() {
        let node = node().with_debouncer(BrakeDebouncer::new(2, 1));
        let frames = vec![frame(1.0, 0.4), frame(1.0, 0.4), frame(1.0, 3.0)];
        let outcomes = replay(node, &frames).await.unwrap();
        let braking: Vec<bool> = outcomes.iter().map(brakes).collect();
        assert_eq!(braking, vec![false, true, false]);
    }
}

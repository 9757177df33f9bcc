//! [`BrakeDebouncer`] – temporal filter over a stream of verdicts.
//!
//! The predictor judges every frame on its own, so a single noisy return can
//! flicker the brake.  The debouncer sits downstream and only changes its
//! output after a run of consecutive verdicts disagreeing with it:
//!
//! - clear → braking after `engage_after` braking verdicts in a row;
//! - braking → clear after `release_after` clear verdicts in a row.
//!
//! With both thresholds at 1 the output follows the input exactly.
//!
//! # Example
//!
//! ```rust
//! use autobrake_kernel::debounce::BrakeDebouncer;
//!
//! let mut debouncer = BrakeDebouncer::new(2, 3);
//!
//! assert!(!debouncer.update(true));
//! assert!(debouncer.update(true)); // second in a row → engage
//!
//! assert!(debouncer.update(false));
//! assert!(debouncer.update(false));
//! assert!(!debouncer.update(false)); // third clear in a row → release
//! ```

use autobrake_types::BrakeVerdict;
use tracing::info;

// ─────────────────────────────────────────────────────────────────────────────
// BrakeDebouncer
// ─────────────────────────────────────────────────────────────────────────────

/// Engage/release hysteresis for brake verdicts.
#[derive(Debug, Clone)]
pub struct BrakeDebouncer {
    /// Consecutive braking verdicts needed to engage.
    engage_after: usize,
    /// Consecutive clear verdicts needed to release.
    release_after: usize,
    braking: bool,
    /// Length of the current run of verdicts that disagree with `braking`.
    streak: usize,
}

impl BrakeDebouncer {
    /// Create a debouncer in the released state.  Thresholds below 1 are
    /// raised to 1.
    pub fn new(engage_after: usize, release_after: usize) -> Self {
        Self {
            engage_after: engage_after.max(1),
            release_after: release_after.max(1),
            braking: false,
            streak: 0,
        }
    }

    /// Feed the raw decision for the latest frame and return the debounced
    /// one.
    pub fn update(&mut self, should_brake: bool) -> bool {
        if should_brake == self.braking {
            self.streak = 0;
            return self.braking;
        }

        self.streak += 1;
        let needed = if should_brake {
            self.engage_after
        } else {
            self.release_after
        };
        if self.streak >= needed {
            self.braking = should_brake;
            self.streak = 0;
            info!(braking = self.braking, "debounced brake state changed");
        }
        self.braking
    }

    /// Debounce `verdict` in place of its raw `should_brake`.  The triggering
    /// obstacles of the frame are kept as they are.
    pub fn apply(&mut self, mut verdict: BrakeVerdict) -> BrakeVerdict {
        verdict.should_brake = self.update(verdict.should_brake);
        verdict
    }

    pub fn is_braking(&self) -> bool {
        self.braking
    }

    /// Return to the released state and forget the current run.
    pub fn reset(&mut self) {
        self.braking = false;
        self.streak = 0;
    }
}

impl Default for BrakeDebouncer {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

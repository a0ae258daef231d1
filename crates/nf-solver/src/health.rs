//! Tracking of repeated degraded or failed major steps.

use tracing::warn;

use crate::report::SolveStatus;

/// Raised while a streak of bad major steps is at or above the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthSignal {
    /// Consecutive steps that were degraded or failed
    PersistentDegradation { steps: usize },
    /// Consecutive failed steps
    PersistentFailure { steps: usize },
}

#[derive(Debug, Clone)]
pub struct HealthMonitor {
    threshold: usize,
    degraded_streak: usize,
    failed_streak: usize,
}

impl HealthMonitor {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            degraded_streak: 0,
            failed_streak: 0,
        }
    }

    pub fn record(&mut self, status: SolveStatus) -> Option<HealthSignal> {
        match status {
            SolveStatus::Converged => {
                self.degraded_streak = 0;
                self.failed_streak = 0;
                return None;
            }
            SolveStatus::ConvergedDegraded => {
                self.degraded_streak += 1;
                self.failed_streak = 0;
            }
            SolveStatus::Failed => {
                self.degraded_streak += 1;
                self.failed_streak += 1;
            }
        }

        if self.failed_streak >= self.threshold {
            if self.failed_streak == self.threshold {
                warn!(steps = self.failed_streak, "network keeps failing to solve");
            }
            Some(HealthSignal::PersistentFailure {
                steps: self.failed_streak,
            })
        } else if self.degraded_streak >= self.threshold {
            if self.degraded_streak == self.threshold {
                warn!(steps = self.degraded_streak, "network keeps converging degraded");
            }
            Some(HealthSignal::PersistentDegradation {
                steps: self.degraded_streak,
            })
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.degraded_streak = 0;
        self.failed_streak = 0;
    }
}

//! Evaluation deadline shared by all modules of one evaluation

use std::time::Duration;
use tokio::time::Instant;

/// A point in time by which every analysis module must finish
///
/// Built on `tokio::time::Instant` so tests can drive it with a paused clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    pub fn after_ms(budget_ms: u64) -> Self {
        Self::after(Duration::from_millis(budget_ms))
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// The instant `reserve` before expiry, never earlier than now
    ///
    /// Bounds an inner lookup so the caller can still hand back a partial
    /// finding before the orchestrator stops waiting.
    pub fn reserving(&self, reserve: Duration) -> Instant {
        let now = Instant::now();
        self.at.checked_sub(reserve).map_or(now, |cutoff| cutoff.max(now))
    }

    /// The full budget the deadline was created with
    pub fn budget_ms(&self) -> u64 {
        u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX)
    }
}

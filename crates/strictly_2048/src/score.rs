//! Current and best score tracking.

use crate::collaborators::BestScoreStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Outcome of a score update, used to decide which notifications to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    /// Score after the update.
    pub current: u64,
    /// New best score, when the update beat the previous best.
    pub new_best: Option<u64>,
}

/// Tracks the running score and persists the best one.
///
/// Store failures are logged and never interrupt play.
pub struct ScoreTracker {
    current: u64,
    best: u64,
    store: Box<dyn BestScoreStore>,
}

impl std::fmt::Debug for ScoreTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreTracker")
            .field("current", &self.current)
            .field("best", &self.best)
            .finish_non_exhaustive()
    }
}

impl ScoreTracker {
    /// Creates a tracker with zero scores backed by `store`.
    pub fn new(store: Box<dyn BestScoreStore>) -> Self {
        Self {
            current: 0,
            best: 0,
            store,
        }
    }

    /// Current score.
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Best score seen so far.
    pub fn best(&self) -> u64 {
        self.best
    }

    /// Reads the best score from the store.
    ///
    /// A failed load keeps the in-memory best.
    #[instrument(skip(self))]
    pub fn load_best(&mut self) -> u64 {
        match self.store.load() {
            Ok(best) => {
                debug!(best, "Loaded best score");
                self.best = self.best.max(best);
            }
            Err(e) => warn!(error = %e, "Failed to load best score"),
        }
        self.best
    }

    /// Adds `value` to the current score, saving a new best when beaten.
    #[instrument(skip(self))]
    pub fn add_score(&mut self, value: u64) -> ScoreChange {
        self.current = self.current.saturating_add(value);
        let new_best = if self.current > self.best {
            self.best = self.current;
            if let Err(e) = self.store.save(self.best) {
                warn!(error = %e, best = self.best, "Failed to save best score");
            }
            Some(self.best)
        } else {
            None
        };
        ScoreChange {
            current: self.current,
            new_best,
        }
    }

    /// Zeroes the current score. The best score is kept.
    pub fn reset(&mut self) {
        self.current = 0;
    }
}

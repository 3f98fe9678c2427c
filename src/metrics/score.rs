use crate::game::MergeNotice;

/// Running score fed by merge notifications.
///
/// Every merge adds the value of the tile it produced; the best score
/// follows the running score up and never comes back down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    score: u64,
    best: u64,
}

impl ScoreBoard {
    /// Start at zero with a previously recorded best
    pub fn new(best: u64) -> Self {
        Self { score: 0, best }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Credit one merge. Returns true when the best score moved.
    pub fn record_merge(&mut self, notice: &MergeNotice) -> bool {
        self.score += u64::from(notice.value);
        if self.score > self.best {
            self.best = self.score;
            return true;
        }
        false
    }

    /// New game; the best score survives
    pub fn reset(&mut self) {
        self.score = 0;
    }
}

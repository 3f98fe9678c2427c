pub mod game_metrics;
pub mod score;
pub mod store;

pub use game_metrics::GameMetrics;
pub use score::ScoreBoard;
pub use store::{BEST_SCORE_KEY, ScoreStore};

use std::time::{Duration, Instant};

/// Per-session bookkeeping shown next to the board
pub struct GameMetrics {
    pub started: Instant,
    pub elapsed: Duration,
    pub moves: u32,
    pub highest_tile: u32,
    pub games_played: u32,
    finished: bool,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            elapsed: Duration::ZERO,
            moves: 0,
            highest_tile: 0,
            games_played: 0,
            finished: false,
        }
    }

    /// Advance the clock; it stops once the game is over
    pub fn update(&mut self) {
        if !self.finished {
            self.elapsed = self.started.elapsed();
        }
    }

    pub fn on_game_start(&mut self) {
        self.started = Instant::now();
        self.elapsed = Duration::ZERO;
        self.moves = 0;
        self.finished = false;
    }

    pub fn on_move(&mut self) {
        self.moves += 1;
    }

    /// Count a finished game once, however many times the board reports it
    pub fn on_game_over(&mut self, max_tile: u32) {
        if self.finished {
            return;
        }
        self.update();
        self.finished = true;
        self.games_played += 1;
        self.highest_tile = self.highest_tile.max(max_tile);
    }

    /// Elapsed play time as `mm:ss`; minutes keep counting past an hour
    pub fn format_time(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_format() {
        let mut metrics = GameMetrics::new();
        for (secs, expected) in [(0, "00:00"), (59, "00:59"), (754, "12:34"), (6000, "100:00")] {
            metrics.elapsed = Duration::from_secs(secs);
            assert_eq!(metrics.format_time(), expected);
        }
    }

    #[test]
    fn test_game_over_counted_once() {
        let mut metrics = GameMetrics::new();

        metrics.on_game_over(64);
        metrics.on_game_over(64);
        assert_eq!(metrics.games_played, 1);
        assert_eq!(metrics.highest_tile, 64);

        metrics.on_game_start();
        metrics.on_game_over(32);
        assert_eq!(metrics.games_played, 2);
        assert_eq!(metrics.highest_tile, 64);
    }

    #[test]
    fn test_new_game_clears_moves_and_clock() {
        let mut metrics = GameMetrics::new();
        metrics.on_move();
        metrics.on_move();
        std::thread::sleep(Duration::from_millis(30));
        metrics.update();
        assert!(metrics.elapsed >= Duration::from_millis(30));
        assert_eq!(metrics.moves, 2);

        metrics.on_game_start();
        assert_eq!(metrics.elapsed, Duration::ZERO);
        assert_eq!(metrics.moves, 0);
    }

    #[test]
    fn test_clock_stops_at_game_over() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_over(8);
        let frozen = metrics.elapsed;

        std::thread::sleep(Duration::from_millis(20));
        metrics.update();
        assert_eq!(metrics.elapsed, frozen);
    }
}

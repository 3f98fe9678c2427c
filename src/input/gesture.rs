use crate::game::Direction;

/// Turns one continuous drag into at most one direction.
///
/// Coordinates are in screen points, y growing downward. A gesture resolves
/// once it has travelled `threshold` along either axis; the dominant axis
/// and its sign pick the direction, ties going to the vertical axis.
#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    threshold: f32,
    start: Option<(f32, f32)>,
    dispatched: bool,
}

impl SwipeRecognizer {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start: None,
            dispatched: false,
        }
    }

    /// A finger (or button) went down
    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
        self.dispatched = false;
    }

    /// The finger moved; returns a direction the first time the threshold is crossed
    pub fn update(&mut self, x: f32, y: f32) -> Option<Direction> {
        let (start_x, start_y) = self.start?;
        if self.dispatched {
            return None;
        }

        let dx = start_x - x;
        let dy = start_y - y;
        if dx.abs().max(dy.abs()) < self.threshold {
            return None;
        }

        self.dispatched = true;
        let direction = if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Direction::Left
            } else {
                Direction::Right
            }
        } else if dy > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        Some(direction)
    }

    /// The finger lifted
    pub fn end(&mut self) {
        self.start = None;
        self.dispatched = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_does_nothing() {
        let mut swipe = SwipeRecognizer::new(50.0);
        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.update(60.0, 100.0), None);
        assert_eq!(swipe.update(100.0, 140.0), None);
    }

    #[test]
    fn test_directions() {
        let cases = [
            ((40.0, 100.0), Direction::Left),
            ((160.0, 100.0), Direction::Right),
            ((100.0, 40.0), Direction::Up),
            ((100.0, 160.0), Direction::Down),
        ];
        for ((x, y), expected) in cases {
            let mut swipe = SwipeRecognizer::new(50.0);
            swipe.begin(100.0, 100.0);
            assert_eq!(swipe.update(x, y), Some(expected));
        }
    }

    #[test]
    fn test_diagonal_tie_goes_vertical() {
        let mut swipe = SwipeRecognizer::new(50.0);
        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.update(40.0, 40.0), Some(Direction::Up));
    }

    #[test]
    fn test_one_direction_per_gesture() {
        let mut swipe = SwipeRecognizer::new(50.0);
        swipe.begin(0.0, 0.0);
        assert_eq!(swipe.update(-60.0, 0.0), Some(Direction::Left));
        assert_eq!(swipe.update(-200.0, 0.0), None);
        assert_eq!(swipe.update(0.0, 300.0), None);

        swipe.end();
        assert_eq!(swipe.update(0.0, 300.0), None);

        swipe.begin(0.0, 0.0);
        assert_eq!(swipe.update(0.0, 80.0), Some(Direction::Down));
    }
}

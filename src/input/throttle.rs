use std::time::{Duration, Instant};

/// Leading-edge throttle: the first call in a window passes, the rest of
/// the window is swallowed
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Whether a call arriving at `now` passes
    pub fn accept(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if now.saturating_duration_since(last) < self.window => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_dispatches_first_only() {
        let mut throttle = Throttle::new(Duration::from_millis(200));
        let start = Instant::now();

        assert!(throttle.accept(start));
        assert!(!throttle.accept(start + Duration::from_millis(10)));
        assert!(!throttle.accept(start + Duration::from_millis(199)));
        assert!(throttle.accept(start + Duration::from_millis(200)));
        assert!(!throttle.accept(start + Duration::from_millis(250)));
    }
}

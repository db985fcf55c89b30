use std::fmt;
use std::time::Duration;

/// Wall-clock time spent running and waiting on child processes.
/// Only ever grows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElapsedChildTime(Duration);

impl ElapsedChildTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, elapsed: Duration) {
        self.0 = self.0.saturating_add(elapsed);
    }

    pub fn total(&self) -> Duration {
        self.0
    }
}

impl fmt::Display for ElapsedChildTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let micros = self.0.as_micros();
        write!(
            f,
            "{} seconds, {} milliseconds, and {} microseconds",
            micros / 1_000_000,
            micros / 1_000 % 1_000,
            micros % 1_000
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let elapsed = ElapsedChildTime::new();
        assert_eq!(elapsed.total(), Duration::ZERO);
        assert_eq!(
            elapsed.to_string(),
            "0 seconds, 0 milliseconds, and 0 microseconds"
        );
    }

    #[test]
    fn splits_into_units() {
        let mut elapsed = ElapsedChildTime::new();
        elapsed.add(Duration::from_micros(2_345_678));
        assert_eq!(
            elapsed.to_string(),
            "2 seconds, 345 milliseconds, and 678 microseconds"
        );
    }

    #[test]
    fn accumulates() {
        let mut elapsed = ElapsedChildTime::new();
        elapsed.add(Duration::from_millis(40));
        let before = elapsed;
        elapsed.add(Duration::from_millis(60));
        assert!(elapsed >= before);
        assert_eq!(elapsed.total(), Duration::from_millis(100));
    }
}

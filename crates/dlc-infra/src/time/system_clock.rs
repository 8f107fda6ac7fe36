use dlc_core::ports::ClockPort;
use tokio::time::Instant;

/// Wall clock from `chrono`, elapsed time from the tokio monotonic clock.
///
/// Elapsed time counts from process start, which is the boot of the agent.
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn elapsed_ms(&self) -> i64 {
        i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    fn network_time_ms(&self) -> Option<i64> {
        // No network time source on this platform; trust the system clock.
        Some(self.now_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_elapsed_follows_tokio_time() {
        tokio::time::pause();
        let clock = SystemClock::new();

        tokio::time::advance(Duration::from_secs(90)).await;

        assert_eq!(clock.elapsed_ms(), 90_000);
    }

    #[test]
    fn test_now_is_after_2020() {
        let clock = SystemClock::new();
        assert!(clock.now_ms() > 1_577_836_800_000);
        assert!(clock.network_time_ms().is_some());
    }
}

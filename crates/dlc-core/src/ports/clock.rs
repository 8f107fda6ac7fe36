/// Time source for scheduling.
///
/// `now_ms` is wall-clock epoch millis and may jump; `elapsed_ms` is
/// monotonic since boot and never jumps.
pub trait ClockPort: Send + Sync {
    fn now_ms(&self) -> i64;

    fn elapsed_ms(&self) -> i64;

    /// Network-synchronised wall time, if a fix is available.
    fn network_time_ms(&self) -> Option<i64>;
}

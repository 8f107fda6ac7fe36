use async_trait::async_trait;

use crate::schedule::AlarmId;

/// One-shot alarms keyed by [`AlarmId`], armed against elapsed time.
///
/// Arming an id that is already armed replaces the previous alarm atomically.
#[async_trait]
pub trait WallClockAlarmPort: Send + Sync {
    /// Fire `id` once the elapsed-time clock reaches `trigger_elapsed_ms`.
    async fn arm_at(&self, trigger_elapsed_ms: i64, id: AlarmId) -> anyhow::Result<()>;

    async fn cancel(&self, id: AlarmId) -> anyhow::Result<()>;

    /// Soonest armed alarm, as `(trigger_elapsed_ms, id)`.
    async fn peek(&self) -> anyhow::Result<Option<(i64, AlarmId)>>;
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dlc_core::ports::{ClockPort, WallClockAlarmPort};
use dlc_core::schedule::AlarmId;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

struct ArmedAlarm {
    trigger_elapsed_ms: i64,
    generation: u64,
    handle: tokio::task::AbortHandle,
}

#[derive(Default)]
struct AlarmTable {
    armed: HashMap<AlarmId, ArmedAlarm>,
    next_generation: u64,
}

/// In-process alarms backed by tokio timers.
///
/// A fired alarm is delivered as its [`AlarmId`] on the channel given to
/// [`TokioWallClockAlarm::new`]. Alarms do not survive a restart; the boot
/// handler re-arms them from the stored intents.
pub struct TokioWallClockAlarm {
    clock: Arc<dyn ClockPort>,
    table: Arc<Mutex<AlarmTable>>,
    fired: mpsc::Sender<AlarmId>,
}

impl TokioWallClockAlarm {
    pub fn new(clock: Arc<dyn ClockPort>, fired: mpsc::Sender<AlarmId>) -> Self {
        Self {
            clock,
            table: Arc::new(Mutex::new(AlarmTable::default())),
            fired,
        }
    }
}

#[async_trait]
impl WallClockAlarmPort for TokioWallClockAlarm {
    async fn arm_at(&self, trigger_elapsed_ms: i64, id: AlarmId) -> anyhow::Result<()> {
        let delay_ms = (trigger_elapsed_ms - self.clock.elapsed_ms()).max(0) as u64;
        let table = Arc::clone(&self.table);
        let fired = self.fired.clone();

        let mut guard = self.table.lock().await;
        if let Some(existing) = guard.armed.remove(&id) {
            existing.handle.abort();
        }
        let generation = guard.next_generation;
        guard.next_generation += 1;

        let handle = tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            {
                let mut guard = table.lock().await;
                match guard.armed.get(&id) {
                    Some(armed) if armed.generation == generation => {
                        guard.armed.remove(&id);
                    }
                    _ => return,
                }
            }
            debug!(alarm = %id, "alarm fired");
            if fired.send(id).await.is_err() {
                warn!(alarm = %id, "alarm receiver dropped");
            }
        });

        guard.armed.insert(
            id,
            ArmedAlarm {
                trigger_elapsed_ms,
                generation,
                handle: handle.abort_handle(),
            },
        );
        debug!(alarm = %id, trigger_elapsed_ms, delay_ms, "alarm armed");
        Ok(())
    }

    async fn cancel(&self, id: AlarmId) -> anyhow::Result<()> {
        let mut guard = self.table.lock().await;
        if let Some(armed) = guard.armed.remove(&id) {
            armed.handle.abort();
            debug!(alarm = %id, "alarm cancelled");
        }
        Ok(())
    }

    async fn peek(&self) -> anyhow::Result<Option<(i64, AlarmId)>> {
        let guard = self.table.lock().await;
        Ok(guard
            .armed
            .iter()
            .map(|(id, armed)| (armed.trigger_elapsed_ms, *id))
            .min_by_key(|(trigger, _)| *trigger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SystemClock;
    use tokio::time::advance;

    fn alarm() -> (TokioWallClockAlarm, mpsc::Receiver<AlarmId>) {
        let (tx, rx) = mpsc::channel(8);
        (TokioWallClockAlarm::new(Arc::new(SystemClock::new()), tx), rx)
    }

    #[tokio::test]
    async fn arm_fires_after_delay() -> anyhow::Result<()> {
        tokio::time::pause();
        let (alarm, mut rx) = alarm();

        alarm.arm_at(5_000, AlarmId::ResumeProvision).await?;
        advance(Duration::from_millis(4_999)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        advance(Duration::from_millis(1)).await;
        assert_eq!(rx.recv().await, Some(AlarmId::ResumeProvision));
        assert_eq!(alarm.peek().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn past_trigger_fires_immediately() -> anyhow::Result<()> {
        tokio::time::pause();
        let (alarm, mut rx) = alarm();
        advance(Duration::from_secs(10)).await;

        alarm.arm_at(1_000, AlarmId::ResetDevice).await?;

        assert_eq!(rx.recv().await, Some(AlarmId::ResetDevice));
        Ok(())
    }

    #[tokio::test]
    async fn cancel_stops_alarm() -> anyhow::Result<()> {
        tokio::time::pause();
        let (alarm, mut rx) = alarm();

        alarm.arm_at(5_000, AlarmId::ResumeProvision).await?;
        alarm.cancel(AlarmId::ResumeProvision).await?;
        advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;

        assert!(rx.try_recv().is_err());
        assert_eq!(alarm.peek().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn rearming_same_id_replaces_previous() -> anyhow::Result<()> {
        tokio::time::pause();
        let (alarm, mut rx) = alarm();

        alarm.arm_at(5_000, AlarmId::NextProvisionFailedStep).await?;
        alarm.arm_at(10_000, AlarmId::NextProvisionFailedStep).await?;
        assert_eq!(
            alarm.peek().await?,
            Some((10_000, AlarmId::NextProvisionFailedStep))
        );

        advance(Duration::from_millis(5_000)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        advance(Duration::from_millis(5_000)).await;
        assert_eq!(rx.recv().await, Some(AlarmId::NextProvisionFailedStep));
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn peek_returns_soonest() -> anyhow::Result<()> {
        tokio::time::pause();
        let (alarm, _rx) = alarm();

        alarm.arm_at(30_000, AlarmId::ResetDevice).await?;
        alarm.arm_at(20_000, AlarmId::ResumeProvision).await?;

        assert_eq!(
            alarm.peek().await?,
            Some((20_000, AlarmId::ResumeProvision))
        );
        Ok(())
    }
}

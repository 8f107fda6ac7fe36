mod alarm;
mod system_clock;

pub use alarm::TokioWallClockAlarm;
pub use system_clock::SystemClock;

mod device_lock_scheduler;

pub use device_lock_scheduler::DeviceLockScheduler;

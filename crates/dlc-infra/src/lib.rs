//! # dlc-infra
//!
//! Adapters for the ports declared in `dlc-core`: JSON parameter files, the
//! durable job queue, tokio-backed alarms, the system clock and the
//! configuration loader.

pub mod config;
pub mod device;
pub mod fs;
pub mod job_queue;
pub mod parameters;
pub mod time;

pub use job_queue::FileJobQueue;
pub use time::{SystemClock, TokioWallClockAlarm};

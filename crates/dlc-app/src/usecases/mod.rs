//! Business logic use cases
//!
//! [CheckInJob] → DeviceCheckInWorker → CheckInProtocolHandler
//!                                           ↓
//!                                 ProvisionOrchestrator ← alarms / operator
//!                                           ↓
//!                                   DeviceLockScheduler → job queue / alarms
//!
//! BootCompletedHandler and TimeChangeObserver re-arm persisted intents.

pub mod check_in;
pub mod lifecycle;
pub mod parameters;
pub mod provision;
pub mod scheduling;

pub use check_in::{CheckInProtocolHandler, DeviceCheckInWorker, RetrievePushToken};
pub use lifecycle::{BootCompletedHandler, TimeChangeObserver};
pub use parameters::{DumpParameters, ResetParameters};
pub use provision::ProvisionOrchestrator;
pub use scheduling::DeviceLockScheduler;

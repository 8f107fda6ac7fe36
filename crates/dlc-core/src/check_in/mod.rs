//! Check-in domain module.
//!
//! Types exchanged with the check-in service and the result of interpreting a
//! single check-in attempt.

mod identity;
mod outcome;
mod report;

pub use identity::{DeviceId, DeviceIdType, DeviceIdentity};
pub use outcome::{CheckInOutcome, CheckInResponse};
pub use report::{CheckInFailureCause, CheckInReport};

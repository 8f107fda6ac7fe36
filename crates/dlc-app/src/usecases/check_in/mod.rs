//! Check-in use cases.
//!
//! [`CheckInProtocolHandler`] runs one attempt and interprets the response;
//! [`DeviceCheckInWorker`] adapts its report to the job queue.

mod handler;
mod push_token;
mod worker;

pub use handler::{CheckInError, CheckInProtocolHandler};
pub use push_token::RetrievePushToken;
pub use worker::DeviceCheckInWorker;

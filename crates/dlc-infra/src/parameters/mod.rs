//! File-backed parameter repositories.
//!
//! Each repository owns one JSON document under the agent data directory.

mod global;
mod setup;
mod user;

pub use global::{FileGlobalParameters, DEFAULT_GLOBAL_PARAMETERS_FILE};
pub use setup::{FileSetupParameters, DEFAULT_SETUP_PARAMETERS_FILE};
pub use user::{FileUserParameters, DEFAULT_USER_PARAMETERS_FILE};

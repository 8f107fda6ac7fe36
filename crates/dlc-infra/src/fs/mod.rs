pub mod app_data_dir;
pub mod json_file;

pub use app_data_dir::{agent_data_dir, agent_log_dir};
pub use json_file::JsonFileStore;

mod file_queue;

pub use file_queue::{FileJobQueue, DEFAULT_JOB_QUEUE_FILE};

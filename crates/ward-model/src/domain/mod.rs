mod job;
pub use job::{JobContext, JobId};

mod process_config;
pub use process_config::ProcessConfig;

pub mod env_keys;

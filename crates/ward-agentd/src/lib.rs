pub mod boot;
pub mod daemon;
pub mod executor;
pub mod jobs;

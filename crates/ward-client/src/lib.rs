mod error;
pub use error::ClientError;

mod config;
pub use config::ClientConfig;

mod supervisor;
pub use supervisor::SupervisorClient;

mod executor;
pub use executor::ExecutorClient;

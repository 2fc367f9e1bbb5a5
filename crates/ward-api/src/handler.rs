use async_trait::async_trait;

use ward_model::{TaskCallerResult, TaskCommand};

use crate::error::ApiError;

/// Command-side behavior behind the HTTP surface.
///
/// This trait abstracts the backend, so the routes can be served by the
/// real supervisor adapter or by a stub in tests.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    /// Execute one control command and produce its result.
    async fn execute(&self, command: TaskCommand) -> Result<TaskCallerResult, ApiError>;

    /// Liveness probe body; anything distinguishable from an error.
    async fn heartbeat(&self) -> Result<String, ApiError> {
        Ok("ok".to_string())
    }

    /// Coarse diagnostic payload for operational tooling.
    async fn mem_info(&self) -> Result<serde_json::Value, ApiError>;
}

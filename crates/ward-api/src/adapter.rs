use std::sync::Arc;

use async_trait::async_trait;

use ward_core::{TaskSupervisor, system};
use ward_model::{CommandKind, ExecutorEndpoint, TaskCallerResult, TaskCommand};

use crate::error::ApiError;
use crate::handler::CommandHandler;

/// Bridges the wire protocol onto a [`TaskSupervisor`].
///
/// Envelope decoding happens here, so the supervisor itself stays typed:
/// malformed payloads are 4xx answers, supervisor failures are 5xx, and
/// logical outcomes travel as `succeed=false` results.
pub struct SupervisorAdapter {
    supervisor: Arc<TaskSupervisor>,
}

impl SupervisorAdapter {
    pub fn new(supervisor: Arc<TaskSupervisor>) -> Self {
        Self { supervisor }
    }

    fn executor_of(command: &TaskCommand) -> Result<&ExecutorEndpoint, ApiError> {
        command.executor_endpoint.as_ref().ok_or_else(|| {
            ApiError::InvalidRequest(format!(
                "{} requires an executorEndpoint",
                command.command.as_str()
            ))
        })
    }
}

#[async_trait]
impl CommandHandler for SupervisorAdapter {
    async fn execute(&self, command: TaskCommand) -> Result<TaskCallerResult, ApiError> {
        let ctx = command.job_context()?;

        match command.command {
            CommandKind::Start => {
                let config = command.process_config()?.ok_or_else(|| {
                    ApiError::InvalidRequest("start requires a processConfig".to_string())
                })?;
                let endpoint = self.supervisor.start_task(&ctx, &config).await?;
                let payload = serde_json::to_string(&endpoint)
                    .map_err(|e| ApiError::Internal(e.to_string()))?;
                Ok(TaskCallerResult::ok_with(payload))
            }
            CommandKind::IsAlive => {
                let executor = Self::executor_of(&command)?;
                let alive = self.supervisor.is_task_alive(&ctx, executor).await;
                Ok(TaskCallerResult::alive(alive))
            }
            CommandKind::Destroy => {
                let executor = Self::executor_of(&command)?;
                Ok(self.supervisor.destroy_task(&ctx, executor).await)
            }
            CommandKind::Stop => {
                let executor = Self::executor_of(&command)?;
                Ok(self.supervisor.stop_task(&ctx, executor).await)
            }
            CommandKind::Finish => {
                let executor = Self::executor_of(&command)?;
                Ok(self.supervisor.finish_task(&ctx, executor).await)
            }
            CommandKind::IsSupervisorAlive => Ok(TaskCallerResult::alive(true)),
        }
    }

    async fn mem_info(&self) -> Result<serde_json::Value, ApiError> {
        serde_json::to_value(system::mem_info()).map_err(|e| ApiError::Internal(e.to_string()))
    }
}

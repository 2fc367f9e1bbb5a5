//! Client-side façade over one logical launcher's supervisor identity.
//!
//! Commands addressed at the proxy's own endpoint are answered by the
//! in-process [`TaskSupervisor`] without touching the network; everything
//! else goes over HTTP. Because an [`ExecutorEndpoint`] carries its own
//! supervisor port, the proxy can be asked about a job through a different
//! supervisor address than the one that started it; either side answers
//! correctly as long as it can reach the executor.

use std::sync::Arc;

use tracing::debug;

use ward_client::{ClientError, SupervisorClient};
use ward_model::{
    CommandKind, ExecutorEndpoint, JobContext, ProcessConfig, SupervisorEndpoint,
    TaskCallerResult, TaskCommand,
};

use crate::{CallerError, TaskSupervisor};

#[derive(Clone)]
pub struct SupervisorProxy {
    local: SupervisorEndpoint,
    supervisor: Arc<TaskSupervisor>,
    client: SupervisorClient,
}

impl SupervisorProxy {
    pub fn new(supervisor: Arc<TaskSupervisor>, client: SupervisorClient) -> Self {
        Self {
            local: supervisor.endpoint().clone(),
            supervisor,
            client,
        }
    }

    pub fn local_endpoint(&self) -> &SupervisorEndpoint {
        &self.local
    }

    fn is_local(&self, endpoint: &SupervisorEndpoint) -> bool {
        *endpoint == self.local
    }

    /// True only when a heartbeat round-trip succeeds (or the endpoint is
    /// this process itself).
    pub async fn is_supervisor_alive(&self, endpoint: &SupervisorEndpoint) -> bool {
        if self.is_local(endpoint) {
            return true;
        }
        match self.client.heartbeat(endpoint).await {
            Ok(_) => true,
            Err(e) => {
                debug!(target: "ward_core::proxy", %endpoint, error = %e, "heartbeat failed");
                false
            }
        }
    }

    /// Ask `endpoint` whether the executor is alive.
    ///
    /// An unreachable supervisor reads as `false`, meaning "unknown", which the
    /// caller must not interpret as "destroyed".
    pub async fn is_task_alive(
        &self,
        endpoint: &SupervisorEndpoint,
        executor: &ExecutorEndpoint,
        ctx: &JobContext,
    ) -> bool {
        if self.is_local(endpoint) {
            return self.supervisor.is_task_alive(ctx, executor).await;
        }
        match self
            .send(endpoint, CommandKind::IsAlive, ctx, executor)
            .await
        {
            Ok(result) => result.succeed && result.payload_bool(),
            Err(e) => {
                debug!(target: "ward_core::proxy", %endpoint, error = %e, "is_alive query failed");
                false
            }
        }
    }

    /// Start the job through `endpoint` and return the executor's address.
    pub async fn start_task(
        &self,
        endpoint: &SupervisorEndpoint,
        ctx: &JobContext,
        config: &ProcessConfig,
    ) -> Result<ExecutorEndpoint, CallerError> {
        if self.is_local(endpoint) {
            return self
                .supervisor
                .start_task(ctx, config)
                .await
                .map_err(|e| CallerError::StartRejected {
                    job_id: ctx.job_id,
                    endpoint: endpoint.clone(),
                    reason: e.to_string(),
                });
        }

        let command = TaskCommand::start(ctx, config)?;
        let body = self
            .client
            .send_command(endpoint, &command)
            .await
            .map_err(|source| start_error(ctx, endpoint, source))?;

        let result = TaskCallerResult::from_json(&body)?;
        if !result.succeed {
            return Err(CallerError::StartRejected {
                job_id: ctx.job_id,
                endpoint: endpoint.clone(),
                reason: result.payload.unwrap_or_else(|| "unspecified".to_string()),
            });
        }
        result
            .executor_endpoint()?
            .ok_or_else(|| CallerError::StartRejected {
                job_id: ctx.job_id,
                endpoint: endpoint.clone(),
                reason: "start response carried no executor endpoint".to_string(),
            })
    }

    /// Destroy through `endpoint`; an unreachable supervisor comes back as
    /// `succeed=false`.
    pub async fn destroy_task(
        &self,
        endpoint: &SupervisorEndpoint,
        executor: &ExecutorEndpoint,
        ctx: &JobContext,
    ) -> TaskCallerResult {
        if self.is_local(endpoint) {
            return self.supervisor.destroy_task(ctx, executor).await;
        }
        self.send_as_result(endpoint, CommandKind::Destroy, ctx, executor)
            .await
    }

    /// Graceful stop through `endpoint`, with the same unreachable semantics
    /// as destroy.
    pub async fn stop_task(
        &self,
        endpoint: &SupervisorEndpoint,
        executor: &ExecutorEndpoint,
        ctx: &JobContext,
    ) -> TaskCallerResult {
        if self.is_local(endpoint) {
            return self.supervisor.stop_task(ctx, executor).await;
        }
        self.send_as_result(endpoint, CommandKind::Stop, ctx, executor)
            .await
    }

    /// Record completion through `endpoint`; an unreachable supervisor comes
    /// back as `succeed=false`.
    pub async fn finish(
        &self,
        endpoint: &SupervisorEndpoint,
        executor: &ExecutorEndpoint,
        ctx: &JobContext,
    ) -> TaskCallerResult {
        if self.is_local(endpoint) {
            return self.supervisor.finish_task(ctx, executor).await;
        }
        self.send_as_result(endpoint, CommandKind::Finish, ctx, executor)
            .await
    }

    async fn send(
        &self,
        endpoint: &SupervisorEndpoint,
        kind: CommandKind,
        ctx: &JobContext,
        executor: &ExecutorEndpoint,
    ) -> Result<TaskCallerResult, CallerError> {
        let command = TaskCommand::addressed(kind, ctx, executor)?;
        let body = self
            .client
            .send_command(endpoint, &command)
            .await
            .map_err(|source| CallerError::Unreachable {
                endpoint: endpoint.clone(),
                source,
            })?;
        Ok(TaskCallerResult::from_json(&body)?)
    }

    async fn send_as_result(
        &self,
        endpoint: &SupervisorEndpoint,
        kind: CommandKind,
        ctx: &JobContext,
        executor: &ExecutorEndpoint,
    ) -> TaskCallerResult {
        match self.send(endpoint, kind, ctx, executor).await {
            Ok(result) => result,
            Err(e) => {
                debug!(
                    target: "ward_core::proxy",
                    %endpoint, command = kind.as_str(), error = %e,
                    "command did not reach the supervisor"
                );
                TaskCallerResult::failed(e.to_string())
            }
        }
    }
}

fn start_error(
    ctx: &JobContext,
    endpoint: &SupervisorEndpoint,
    source: ClientError,
) -> CallerError {
    if source.is_unreachable() {
        CallerError::Unreachable {
            endpoint: endpoint.clone(),
            source,
        }
    } else {
        CallerError::StartRejected {
            job_id: ctx.job_id,
            endpoint: endpoint.clone(),
            reason: source.to_string(),
        }
    }
}

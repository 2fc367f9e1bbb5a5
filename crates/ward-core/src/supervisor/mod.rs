//! The supervisor: owns a registry of executors it spawned and answers
//! control commands about any executor it can reach.
//!
//! Liveness and destruction use two oracles. The registry covers executors
//! this instance spawned; a direct endpoint probe covers everything else,
//! which is what keeps answers correct after a supervisor restart wipes the
//! registry while its children keep running.

use std::collections::HashSet;
use std::sync::RwLock;
use std::time::Duration;

use tracing::{debug, info, warn};

use ward_client::{ClientConfig, ExecutorClient};
use ward_exec::{ExecutorProcess, ExecutorSpec, executor_command, is_port_open, wait_port_closed};
use ward_model::{
    ExecutorEndpoint, JobContext, JobId, ProcessConfig, SupervisorEndpoint, TaskCallerResult,
};

use crate::{PortAllocator, StartSlot, SupervisorError, TaskRecord, TaskRegistry};

/// Tuning for one supervisor instance.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Host advertised in executor endpoints this supervisor creates.
    pub host: String,
    /// How executor processes are launched.
    pub executor: ExecutorSpec,
    /// Timeout for one direct TCP probe.
    pub probe_timeout: Duration,
    /// Bounded wait for an executor port to close after a stop request.
    pub stop_wait_attempts: u32,
    pub stop_wait_backoff: Duration,
}

impl SupervisorConfig {
    pub fn new(executor: ExecutorSpec) -> Self {
        Self {
            host: crate::system::local_host().to_string(),
            executor,
            probe_timeout: Duration::from_secs(1),
            stop_wait_attempts: 50,
            stop_wait_backoff: Duration::from_millis(100),
        }
    }

    pub fn with_host<H: Into<String>>(mut self, host: H) -> Self {
        self.host = host.into();
        self
    }
}

pub struct TaskSupervisor {
    endpoint: SupervisorEndpoint,
    config: SupervisorConfig,
    registry: TaskRegistry,
    ports: PortAllocator,
    executors: ExecutorClient,
    finished: RwLock<HashSet<JobId>>,
}

impl TaskSupervisor {
    pub fn new(endpoint: SupervisorEndpoint, config: SupervisorConfig, ports: PortAllocator) -> Self {
        Self {
            endpoint,
            config,
            registry: TaskRegistry::new(),
            ports,
            executors: ExecutorClient::new(&ClientConfig::default()),
            finished: RwLock::new(HashSet::new()),
        }
    }

    pub fn endpoint(&self) -> &SupervisorEndpoint {
        &self.endpoint
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Spawn the executor for `ctx` and register it.
    ///
    /// Idempotent per job identity: a repeated START while the executor is
    /// alive returns the recorded endpoint without spawning again, and a
    /// concurrent duplicate START is rejected instead of double-spawning.
    pub async fn start_task(
        &self,
        ctx: &JobContext,
        process_config: &ProcessConfig,
    ) -> Result<ExecutorEndpoint, SupervisorError> {
        let job_id = ctx.job_id;

        loop {
            match self.registry.reserve(job_id) {
                StartSlot::Reserved => break,
                StartSlot::InFlight => {
                    return Err(SupervisorError::StartInProgress(job_id));
                }
                StartSlot::Existing(record) => {
                    if record.process.lock().await.is_alive() {
                        debug!(
                            target: "ward_core::supervisor",
                            %job_id, endpoint = %record.endpoint,
                            "start requested for a running job; returning recorded endpoint"
                        );
                        return Ok(record.endpoint);
                    }
                    // Stale record from a dead executor; clear and retry.
                    self.registry.remove_matching(job_id, &record.endpoint);
                }
            }
        }

        let port = match self.ports.allocate() {
            Ok(port) => port,
            Err(e) => {
                self.registry.abort(job_id);
                return Err(e.into());
            }
        };
        let endpoint = ExecutorEndpoint::new(self.config.host.clone(), self.endpoint.port, port);

        let spawned = executor_command(&self.config.executor, ctx, process_config, &endpoint)
            .and_then(ExecutorProcess::spawn);
        let process = match spawned {
            Ok(process) => process,
            Err(e) => {
                self.registry.abort(job_id);
                warn!(target: "ward_core::supervisor", %job_id, error = %e, "executor spawn failed");
                return Err(e.into());
            }
        };

        info!(
            target: "ward_core::supervisor",
            %job_id, pid = ?process.pid(), endpoint = %endpoint,
            "spawned executor"
        );
        self.registry
            .complete(job_id, TaskRecord::new(endpoint.clone(), process));
        Ok(endpoint)
    }

    /// Is the executor for `ctx` alive at `executor`?
    ///
    /// Answers through the registry when this instance owns the matching
    /// record, and through a direct TCP probe otherwise, including for
    /// jobs this supervisor never spawned.
    pub async fn is_task_alive(&self, ctx: &JobContext, executor: &ExecutorEndpoint) -> bool {
        if let Some(record) = self.registry.get(ctx.job_id)
            && record.endpoint == *executor
        {
            return record.process.lock().await.is_alive();
        }
        is_port_open(&executor.host, executor.executor_port, self.config.probe_timeout).await
    }

    /// Tear the executor down. Idempotent: succeeds whether the task is
    /// owned, foreign-but-reachable, or already gone.
    pub async fn destroy_task(
        &self,
        ctx: &JobContext,
        executor: &ExecutorEndpoint,
    ) -> TaskCallerResult {
        let job_id = ctx.job_id;

        if let Some(record) = self.registry.remove_matching(job_id, executor) {
            let _ = record.process.lock().await.terminate().await;
            info!(target: "ward_core::supervisor", %job_id, "destroyed owned executor");
            return TaskCallerResult::ok();
        }

        // Not ours (or a duplicate destroy): fall back to the endpoint oracle.
        if is_port_open(&executor.host, executor.executor_port, self.config.probe_timeout).await {
            // The executor may die mid-response; that is still success.
            if let Err(e) = self.executors.stop(executor).await {
                debug!(target: "ward_core::supervisor", %job_id, error = %e, "stop request did not complete");
            }
            self.await_port_close(executor).await;
            info!(target: "ward_core::supervisor", %job_id, "destroyed foreign executor via endpoint");
        }
        TaskCallerResult::ok()
    }

    /// Graceful stop: ask the executor to exit before reaping the child.
    pub async fn stop_task(
        &self,
        ctx: &JobContext,
        executor: &ExecutorEndpoint,
    ) -> TaskCallerResult {
        let job_id = ctx.job_id;

        if is_port_open(&executor.host, executor.executor_port, self.config.probe_timeout).await {
            if let Err(e) = self.executors.stop(executor).await {
                debug!(target: "ward_core::supervisor", %job_id, error = %e, "graceful stop request failed");
            }
            self.await_port_close(executor).await;
        }
        if let Some(record) = self.registry.remove_matching(job_id, executor) {
            let _ = record.process.lock().await.terminate().await;
        }
        TaskCallerResult::ok()
    }

    /// Record completion bookkeeping for a destroyed task.
    ///
    /// Refused while the executor is still reachable: finish is the step
    /// after destroy, and an implicit kill here would mask caller bugs.
    pub async fn finish_task(
        &self,
        ctx: &JobContext,
        executor: &ExecutorEndpoint,
    ) -> TaskCallerResult {
        let job_id = ctx.job_id;

        if self.is_task_alive(ctx, executor).await {
            return TaskCallerResult::failed("task is still alive; destroy it before finish");
        }

        self.registry.remove_matching(job_id, executor);
        self.finished.write().unwrap().insert(job_id);
        info!(target: "ward_core::supervisor", %job_id, "job finished");
        TaskCallerResult::ok()
    }

    /// Completion bookkeeping recorded by [`TaskSupervisor::finish_task`].
    pub fn is_finished(&self, job_id: JobId) -> bool {
        self.finished.read().unwrap().contains(&job_id)
    }

    async fn await_port_close(&self, executor: &ExecutorEndpoint) {
        let closed = wait_port_closed(
            &executor.host,
            executor.executor_port,
            self.config.stop_wait_attempts,
            self.config.stop_wait_backoff,
        )
        .await;
        if !closed {
            warn!(
                target: "ward_core::supervisor",
                endpoint = %executor,
                "executor port still open after stop request"
            );
        }
    }
}

//! High-level job lifecycle driver.
//!
//! Externally observable states of one job:
//! `NOT_STARTED → STARTING → RUNNING → STOPPING → STOPPED/FINISHED`.
//! Start failures are errors; every post-start operation returns a
//! [`TaskCallerResult`] the caller branches on, and nothing here is ever
//! logged-and-swallowed.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use ward_client::ExecutorClient;
use ward_exec::{is_port_open, wait_port_closed, wait_port_open};
use ward_model::{
    ExecutorEndpoint, JobContext, ProcessConfig, SupervisorEndpoint, TaskCallerResult,
};

use crate::{CallerError, SupervisorProxy};

/// Lifecycle hooks fired by the caller on successful transitions.
///
/// The default implementations do nothing; implement what the surrounding
/// bookkeeping needs.
pub trait JobEventHandler: Send + Sync {
    fn on_started(&self, _ctx: &JobContext, _endpoint: &ExecutorEndpoint) {}
    fn on_destroyed(&self, _ctx: &JobContext) {}
    fn on_finished(&self, _ctx: &JobContext) {}
}

pub struct NoopJobEventHandler;

impl JobEventHandler for NoopJobEventHandler {}

/// Readiness/teardown polling knobs: bounded retries, fixed back-off.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: 60,
            backoff: Duration::from_millis(500),
        }
    }
}

pub struct JobCaller {
    proxy: SupervisorProxy,
    executors: ExecutorClient,
    events: Arc<dyn JobEventHandler>,
    poll: PollConfig,
}

impl JobCaller {
    pub fn new(
        proxy: SupervisorProxy,
        executors: ExecutorClient,
        events: Arc<dyn JobEventHandler>,
    ) -> Self {
        Self {
            proxy,
            executors,
            events,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn proxy(&self) -> &SupervisorProxy {
        &self.proxy
    }

    /// Start the job; on failure the job never left NOT_STARTED.
    pub async fn start_task(
        &self,
        supervisor: &SupervisorEndpoint,
        ctx: &JobContext,
        config: &ProcessConfig,
    ) -> Result<ExecutorEndpoint, CallerError> {
        let endpoint = self.proxy.start_task(supervisor, ctx, config).await?;
        info!(
            target: "ward_core::caller",
            job_id = %ctx.job_id, executor = %endpoint,
            "job started"
        );
        self.events.on_started(ctx, &endpoint);
        Ok(endpoint)
    }

    /// Poll the executor port until it accepts connections.
    ///
    /// Models process startup latency, nothing more. Bounded by the poll
    /// config; wrap in a timeout to cancel earlier.
    pub async fn wait_ready(&self, executor: &ExecutorEndpoint) -> Result<(), CallerError> {
        let ready = wait_port_open(
            &executor.host,
            executor.executor_port,
            self.poll.attempts,
            self.poll.backoff,
        )
        .await;
        if ready {
            Ok(())
        } else {
            Err(CallerError::NotReady(executor.clone()))
        }
    }

    /// Liveness through `supervisor`; unreachable reads as `false`
    /// ("unknown"), never as "destroyed".
    pub async fn is_task_alive(
        &self,
        supervisor: &SupervisorEndpoint,
        executor: &ExecutorEndpoint,
        ctx: &JobContext,
    ) -> bool {
        self.proxy.is_task_alive(supervisor, executor, ctx).await
    }

    pub async fn is_supervisor_alive(&self, supervisor: &SupervisorEndpoint) -> bool {
        self.proxy.is_supervisor_alive(supervisor).await
    }

    /// Destroy the task, falling back to direct termination when the
    /// supervisor cannot be reached. Idempotent: already-gone tasks still
    /// come back `succeed=true`.
    pub async fn destroy_task(
        &self,
        supervisor: &SupervisorEndpoint,
        executor: &ExecutorEndpoint,
        ctx: &JobContext,
    ) -> TaskCallerResult {
        let result = self.proxy.destroy_task(supervisor, executor, ctx).await;
        if result.succeed {
            self.events.on_destroyed(ctx);
            return result;
        }
        debug!(
            target: "ward_core::caller",
            job_id = %ctx.job_id, %supervisor,
            "destroy via supervisor failed; falling back to direct stop"
        );
        self.stop_task_directly(executor, ctx).await
    }

    /// Kill the executor through its own endpoint, bypassing any
    /// supervisor. Succeeds when the executor ends up gone, including when
    /// it already was.
    pub async fn stop_task_directly(
        &self,
        executor: &ExecutorEndpoint,
        ctx: &JobContext,
    ) -> TaskCallerResult {
        if is_port_open(&executor.host, executor.executor_port, Duration::from_secs(1)).await {
            // The process exits right after answering; a dropped response
            // is indistinguishable from that and equally fine.
            if let Err(e) = self.executors.stop(executor).await {
                debug!(
                    target: "ward_core::caller",
                    job_id = %ctx.job_id, error = %e,
                    "direct stop request did not complete"
                );
            }
        }
        let closed = wait_port_closed(
            &executor.host,
            executor.executor_port,
            self.poll.attempts,
            self.poll.backoff,
        )
        .await;
        if closed {
            info!(target: "ward_core::caller", job_id = %ctx.job_id, "executor stopped directly");
            self.events.on_destroyed(ctx);
            TaskCallerResult::ok()
        } else {
            TaskCallerResult::failed("executor still reachable after direct stop")
        }
    }

    /// Record completion at the supervisor. An unreachable supervisor is a
    /// `succeed=false` outcome: the bookkeeping stays pending, it is not
    /// an error to surface.
    pub async fn finish(
        &self,
        supervisor: &SupervisorEndpoint,
        executor: &ExecutorEndpoint,
        ctx: &JobContext,
    ) -> TaskCallerResult {
        let result = self.proxy.finish(supervisor, executor, ctx).await;
        if result.succeed {
            self.events.on_finished(ctx);
        }
        result
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use ward_client::{ClientConfig, SupervisorClient};
    use ward_exec::ExecutorSpec;
    use ward_model::JobId;

    use crate::{PortAllocator, SupervisorConfig, TaskSupervisor};

    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<&'static str>>,
    }

    impl JobEventHandler for RecordingHandler {
        fn on_started(&self, _ctx: &JobContext, _endpoint: &ExecutorEndpoint) {
            self.events.lock().unwrap().push("started");
        }
        fn on_destroyed(&self, _ctx: &JobContext) {
            self.events.lock().unwrap().push("destroyed");
        }
        fn on_finished(&self, _ctx: &JobContext) {
            self.events.lock().unwrap().push("finished");
        }
    }

    fn caller_with_local_supervisor() -> (JobCaller, Arc<RecordingHandler>, SupervisorEndpoint) {
        let mut spec = ExecutorSpec::new("sleep");
        spec.args = vec!["30".to_string()];
        let supervisor = Arc::new(TaskSupervisor::new(
            SupervisorEndpoint::new("127.0.0.1", 18001),
            SupervisorConfig::new(spec).with_host("127.0.0.1"),
            PortAllocator::new(),
        ));
        let local = supervisor.endpoint().clone();

        let handler = Arc::new(RecordingHandler::default());
        let proxy = SupervisorProxy::new(supervisor, SupervisorClient::new(&ClientConfig::default()));
        let caller = JobCaller::new(proxy, ExecutorClient::default(), handler.clone()).with_poll(
            PollConfig {
                attempts: 5,
                backoff: Duration::from_millis(50),
            },
        );
        (caller, handler, local)
    }

    fn ctx(id: i64) -> JobContext {
        JobContext::new("ward.job.Dummy", JobId::from(id))
    }

    fn unreachable_supervisor() -> SupervisorEndpoint {
        // Bind and release so nothing listens there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        SupervisorEndpoint::new("127.0.0.1", port)
    }

    #[tokio::test]
    async fn full_local_lifecycle_fires_events() {
        let (caller, handler, local) = caller_with_local_supervisor();
        let ctx = ctx(1);

        let endpoint = caller
            .start_task(&local, &ctx, &ProcessConfig::default())
            .await
            .unwrap();
        assert!(caller.is_task_alive(&local, &endpoint, &ctx).await);

        let destroyed = caller.destroy_task(&local, &endpoint, &ctx).await;
        assert!(destroyed.succeed);
        assert!(!caller.is_task_alive(&local, &endpoint, &ctx).await);

        let finished = caller.finish(&local, &endpoint, &ctx).await;
        assert!(finished.succeed);

        let events = handler.events.lock().unwrap().clone();
        assert_eq!(events, vec!["started", "destroyed", "finished"]);
    }

    #[tokio::test]
    async fn second_destroy_still_succeeds() {
        let (caller, _, local) = caller_with_local_supervisor();
        let ctx = ctx(1);

        let endpoint = caller
            .start_task(&local, &ctx, &ProcessConfig::default())
            .await
            .unwrap();
        assert!(caller.destroy_task(&local, &endpoint, &ctx).await.succeed);
        assert!(caller.destroy_task(&local, &endpoint, &ctx).await.succeed);
    }

    #[tokio::test]
    async fn finish_against_unreachable_supervisor_is_a_pending_outcome() {
        let (caller, _, local) = caller_with_local_supervisor();
        let ctx = ctx(1);

        let endpoint = caller
            .start_task(&local, &ctx, &ProcessConfig::default())
            .await
            .unwrap();
        caller.destroy_task(&local, &endpoint, &ctx).await;

        let remote = unreachable_supervisor();
        let pending = caller.finish(&remote, &endpoint, &ctx).await;
        assert!(!pending.succeed);
    }

    #[tokio::test]
    async fn is_alive_through_unreachable_supervisor_reads_unknown() {
        let (caller, _, local) = caller_with_local_supervisor();
        let ctx = ctx(1);

        let endpoint = caller
            .start_task(&local, &ctx, &ProcessConfig::default())
            .await
            .unwrap();

        let remote = unreachable_supervisor();
        assert!(!caller.is_task_alive(&remote, &endpoint, &ctx).await);
        assert!(!caller.is_supervisor_alive(&remote).await);
        assert!(caller.is_supervisor_alive(&local).await);

        caller.destroy_task(&local, &endpoint, &ctx).await;
    }

    #[tokio::test]
    async fn stop_directly_on_a_gone_executor_succeeds() {
        let (caller, _, _) = caller_with_local_supervisor();

        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let ghost = ExecutorEndpoint::new("127.0.0.1", 18001, port);

        let result = caller.stop_task_directly(&ghost, &ctx(9)).await;
        assert!(result.succeed);
    }

    #[tokio::test]
    async fn start_through_unreachable_supervisor_is_an_error() {
        let (caller, _, _) = caller_with_local_supervisor();
        let remote = unreachable_supervisor();

        let err = caller
            .start_task(&remote, &ctx(1), &ProcessConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CallerError::Unreachable { .. }));
    }
}

//! End-to-end lifecycle tests: a served supervisor spawning real executor
//! processes (this crate's binary re-entered in executor boot mode), driven
//! by a caller whose own supervisor identity lives on a second, local
//! endpoint.

use std::sync::Arc;
use std::time::Duration;

use ward_api::{SupervisorAdapter, SupervisorApplication};
use ward_client::{ClientConfig, ExecutorClient, SupervisorClient};
use ward_core::{
    CallerError, JobCaller, NoopJobEventHandler, PollConfig, PortAllocator, SupervisorConfig,
    SupervisorProxy, TaskSupervisor,
};
use ward_exec::ExecutorSpec;
use ward_model::{JobContext, JobId, ProcessConfig, SupervisorEndpoint, env_keys};

const DUMMY_JOB_CLASS: &str = "ward.job.Dummy";

fn executor_spec() -> ExecutorSpec {
    ExecutorSpec::new(env!("CARGO_BIN_EXE_ward-agentd"))
}

fn job_context(id: i64) -> JobContext {
    JobContext::new(DUMMY_JOB_CLASS, JobId::from(id))
        .with_property("prop1", "valueProp1")
        .with_parameter("param1", "valueParam1")
}

fn process_config() -> ProcessConfig {
    ProcessConfig::new(256, 1024).with_env(env_keys::LOG_DIR, ".")
}

/// Supervisor served over HTTP, spawning real executor processes.
async fn start_supervisor_app() -> (SupervisorApplication, SupervisorEndpoint, Arc<TaskSupervisor>)
{
    let ports = PortAllocator::new();
    let port = ports.allocate().unwrap();
    let supervisor = Arc::new(TaskSupervisor::new(
        SupervisorEndpoint::new("127.0.0.1", port),
        SupervisorConfig::new(executor_spec()).with_host("127.0.0.1"),
        ports,
    ));

    let app = SupervisorApplication::start(
        port,
        Arc::new(SupervisorAdapter::new(supervisor.clone())),
    )
    .await
    .unwrap();
    (app, SupervisorEndpoint::new("127.0.0.1", port), supervisor)
}

/// Caller bound to its own (serverless) local supervisor identity, like a
/// scheduler host that launches no HTTP surface of its own.
fn local_caller() -> (Arc<JobCaller>, SupervisorEndpoint) {
    let local_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let local_endpoint = SupervisorEndpoint::new("127.0.0.1", local_port);
    let local_supervisor = Arc::new(TaskSupervisor::new(
        local_endpoint.clone(),
        SupervisorConfig::new(executor_spec()).with_host("127.0.0.1"),
        PortAllocator::new(),
    ));

    let proxy = SupervisorProxy::new(
        local_supervisor,
        SupervisorClient::new(&ClientConfig::default()),
    );
    let caller = JobCaller::new(proxy, ExecutorClient::default(), Arc::new(NoopJobEventHandler))
        .with_poll(PollConfig {
            attempts: 100,
            backoff: Duration::from_millis(200),
        });
    (Arc::new(caller), local_endpoint)
}

#[tokio::test]
async fn remote_task_lifecycle() {
    let (app, remote, _supervisor) = start_supervisor_app().await;
    let (caller, local) = local_caller();
    let ctx = job_context(1024);

    let executor = caller
        .start_task(&remote, &ctx, &process_config())
        .await
        .unwrap();
    assert_eq!(executor.supervisor_port, remote.port);
    caller.wait_ready(&executor).await.unwrap();

    // Both the originating supervisor and the local one see the job alive.
    assert!(caller.is_task_alive(&remote, &executor, &ctx).await);
    assert!(caller.is_task_alive(&local, &executor, &ctx).await);
    assert!(caller.is_supervisor_alive(&remote).await);
    assert!(caller.is_supervisor_alive(&local).await);

    // The executor's embedded server answers directly as well.
    let direct = ExecutorClient::default();
    assert_eq!(direct.heartbeat(&executor).await.unwrap(), "ok");

    let destroyed = caller.destroy_task(&remote, &executor, &ctx).await;
    assert!(destroyed.succeed);
    assert!(caller.is_supervisor_alive(&remote).await);

    let finished = caller.finish(&remote, &executor, &ctx).await;
    assert!(finished.succeed);
    assert!(!caller.is_task_alive(&remote, &executor, &ctx).await);

    app.stop();
    app.wait_stop().await;
}

#[tokio::test]
async fn supervisor_down_direct_stop_still_works() {
    let (app, remote, _supervisor) = start_supervisor_app().await;
    let (caller, local) = local_caller();
    let ctx = job_context(2048);

    let executor = caller
        .start_task(&remote, &ctx, &process_config())
        .await
        .unwrap();
    assert_eq!(executor.supervisor_port, remote.port);
    caller.wait_ready(&executor).await.unwrap();

    // Take the supervisor server down; the executor lives on.
    app.stop();
    app.wait_stop().await;
    assert!(!caller.is_supervisor_alive(&remote).await);
    assert!(caller.is_task_alive(&local, &executor, &ctx).await);

    // Direct termination bypasses the dead supervisor.
    let direct = caller.stop_task_directly(&executor, &ctx).await;
    assert!(direct.succeed);

    // Bookkeeping stays pending against the unreachable supervisor.
    let pending = caller.finish(&remote, &executor, &ctx).await;
    assert!(!pending.succeed);

    // The local supervisor confirms the executor is gone, and destroying
    // the already-gone task still succeeds.
    assert!(!caller.is_task_alive(&local, &executor, &ctx).await);
    let destroyed = caller.destroy_task(&local, &executor, &ctx).await;
    assert!(destroyed.succeed);
}

#[tokio::test]
async fn destroy_via_other_supervisor_then_origin_is_idempotent() {
    let (app, remote, _supervisor) = start_supervisor_app().await;
    let (caller, local) = local_caller();
    let ctx = job_context(4096);

    let executor = caller
        .start_task(&remote, &ctx, &process_config())
        .await
        .unwrap();
    caller.wait_ready(&executor).await.unwrap();

    // Kill through the local supervisor, which never spawned this job.
    let destroyed = caller.destroy_task(&local, &executor, &ctx).await;
    assert!(destroyed.succeed);
    assert!(!caller.is_task_alive(&local, &executor, &ctx).await);

    // The originating supervisor's destroy is still a success, and it
    // stays up afterwards.
    let destroyed = caller.destroy_task(&remote, &executor, &ctx).await;
    assert!(destroyed.succeed);
    assert!(caller.is_supervisor_alive(&remote).await);

    let finished = caller.finish(&remote, &executor, &ctx).await;
    assert!(finished.succeed);

    app.stop();
    app.wait_stop().await;
}

#[tokio::test]
async fn concurrent_destroys_both_succeed() {
    let (app, remote, supervisor) = start_supervisor_app().await;
    let (caller, _local) = local_caller();
    let ctx = job_context(8192);

    let executor = caller
        .start_task(&remote, &ctx, &process_config())
        .await
        .unwrap();
    caller.wait_ready(&executor).await.unwrap();

    let a = {
        let caller = caller.clone();
        let remote = remote.clone();
        let executor = executor.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move { caller.destroy_task(&remote, &executor, &ctx).await })
    };
    let b = {
        let caller = caller.clone();
        let remote = remote.clone();
        let executor = executor.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move { caller.destroy_task(&remote, &executor, &ctx).await })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert!(a.succeed);
    assert!(b.succeed);
    assert!(supervisor.registry().is_empty());
    assert!(!caller.is_task_alive(&remote, &executor, &ctx).await);

    app.stop();
    app.wait_stop().await;
}

#[tokio::test]
async fn unknown_job_class_never_becomes_ready() {
    let (app, remote, _supervisor) = start_supervisor_app().await;
    let (caller, _local) = local_caller();
    let ctx = JobContext::new("ward.job.Missing", JobId::from(1));

    // The supervisor carries the class string opaquely, so the spawn
    // itself succeeds; the executor exits before binding its port.
    let executor = caller
        .start_task(&remote, &ctx, &process_config())
        .await
        .unwrap();

    let short_poll = JobCaller::new(
        caller.proxy().clone(),
        ExecutorClient::default(),
        Arc::new(NoopJobEventHandler),
    )
    .with_poll(PollConfig {
        attempts: 10,
        backoff: Duration::from_millis(200),
    });
    let err = short_poll.wait_ready(&executor).await.unwrap_err();
    assert!(matches!(err, CallerError::NotReady(_)));

    let cleanup = caller.destroy_task(&remote, &executor, &ctx).await;
    assert!(cleanup.succeed);

    app.stop();
    app.wait_stop().await;
}

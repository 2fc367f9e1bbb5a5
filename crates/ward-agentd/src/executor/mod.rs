//! Executor boot mode: the spawned child that actually runs a job.
//!
//! Reads the env contract the supervisor set, resolves the job class, binds
//! its assigned port and serves a small embedded API (heartbeat, memInfo,
//! stop) alongside the running job. The process exits when the job ends or
//! a stop is requested, so the port closing is the universal "gone" signal.

use std::time::Duration;

use anyhow::Context;
use axum::{Json, Router, extract::State, routing::get, routing::post};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ward_core::system;
use ward_model::{JobContext, env_keys};

use crate::jobs::JobRegistry;

/// The env contract as read at executor boot.
#[derive(Debug, Clone)]
pub struct ExecutorEnv {
    pub port: u16,
    pub supervisor_port: Option<u16>,
    pub ctx: JobContext,
}

impl ExecutorEnv {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var(env_keys::EXECUTOR_PORT)
            .with_context(|| format!("{} is not set", env_keys::EXECUTOR_PORT))?
            .parse()
            .with_context(|| format!("{} is not a port", env_keys::EXECUTOR_PORT))?;

        let supervisor_port = std::env::var(env_keys::SUPERVISOR_PORT)
            .ok()
            .and_then(|raw| raw.parse().ok());

        let raw_ctx = std::env::var(env_keys::JOB_CONTEXT)
            .with_context(|| format!("{} is not set", env_keys::JOB_CONTEXT))?;
        let ctx = serde_json::from_str(&raw_ctx)
            .with_context(|| format!("{} is not a job context", env_keys::JOB_CONTEXT))?;

        Ok(Self {
            port,
            supervisor_port,
            ctx,
        })
    }
}

/// Run the executor until its job ends or a stop is requested.
pub async fn run(registry: &JobRegistry) -> anyhow::Result<()> {
    let env = ExecutorEnv::from_env()?;

    // Resolve before binding: an unknown job class must exit nonzero while
    // the port is still closed, so the caller's readiness poll times out.
    let job = registry
        .create(&env.ctx.job_class)
        .with_context(|| format!("cannot resolve job class {}", env.ctx.job_class))?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", env.port))
        .await
        .with_context(|| format!("cannot bind executor port {}", env.port))?;

    let shutdown = CancellationToken::new();
    let server_token = shutdown.clone();
    let router = embed_router(shutdown.clone());
    let server = tokio::spawn(async move {
        let serve = axum::serve(listener, router)
            .with_graceful_shutdown(async move { server_token.cancelled().await });
        if let Err(e) = serve.await {
            warn!(target: "ward_agentd::executor", error = %e, "embedded server terminated abnormally");
        }
    });

    info!(
        target: "ward_agentd::executor",
        job_id = %env.ctx.job_id,
        job_class = %env.ctx.job_class,
        port = env.port,
        supervisor_port = ?env.supervisor_port,
        "executor serving"
    );

    let result = job.run(&env.ctx, shutdown.child_token()).await;

    // Job over (finished, failed or stop-cancelled): take the server down
    // with us so the port closes and every liveness oracle converges.
    shutdown.cancel();
    let _ = server.await;

    result.map_err(|e| anyhow::anyhow!("job {} failed: {e}", env.ctx.job_id))
}

fn embed_router(shutdown: CancellationToken) -> Router {
    Router::new()
        .route("/heartbeat", get(heartbeat))
        .route("/memInfo", get(mem_info))
        .route("/executor/stop", post(stop))
        .with_state(shutdown)
}

async fn heartbeat() -> &'static str {
    "ok"
}

async fn mem_info() -> Json<system::MemInfo> {
    Json(system::mem_info())
}

/// POST /executor/stop: answer first, cancel just after, so the response
/// reaches the peer before the process starts tearing down.
async fn stop(State(shutdown): State<CancellationToken>) -> &'static str {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
    });
    "stopping"
}

//! Supervisor boot mode: the long-lived daemon half of the agent.

use std::sync::Arc;

use tracing::info;

use ward_api::{SupervisorAdapter, SupervisorApplication};
use ward_core::{PortAllocator, SupervisorConfig, TaskSupervisor, system};
use ward_exec::ExecutorSpec;
use ward_model::{SupervisorEndpoint, env_keys};

/// Build and serve a supervisor, then wait for ctrl-c.
///
/// The listening port comes from `WARD_SUPERVISOR_PORT` when set and is
/// allocated otherwise; executors are launched by re-entering this binary.
pub async fn run() -> anyhow::Result<()> {
    let ports = PortAllocator::new();
    let port = match std::env::var(env_keys::SUPERVISOR_PORT) {
        Ok(raw) => raw.parse()?,
        Err(_) => ports.allocate()?,
    };

    let executor = ExecutorSpec::current_exe()?;
    let supervisor = Arc::new(TaskSupervisor::new(
        SupervisorEndpoint::new(system::local_host(), port),
        SupervisorConfig::new(executor),
        ports,
    ));

    let app = SupervisorApplication::start(port, Arc::new(SupervisorAdapter::new(supervisor))).await?;
    info!(target: "ward_agentd::daemon", endpoint = %app.endpoint(), "supervisor agent up");

    tokio::signal::ctrl_c().await?;
    info!(target: "ward_agentd::daemon", "shutting down");
    app.stop();
    app.wait_stop().await;
    Ok(())
}

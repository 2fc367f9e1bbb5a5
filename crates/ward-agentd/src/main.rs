use ward_agentd::{boot::BootMode, daemon, executor, jobs::JobRegistry};
use ward_observe::{LoggerConfig, logger_init};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = LoggerConfig::default();
    logger_init(&cfg)?;

    match BootMode::from_env() {
        BootMode::Supervisor => daemon::run().await,
        BootMode::Executor => {
            let registry = JobRegistry::with_builtins();
            executor::run(&registry).await
        }
    }
}

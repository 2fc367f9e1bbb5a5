use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::trace;

use ward_model::{ExecutorEndpoint, JobContext, ProcessConfig, env_keys};

use crate::{ExecError, RlimitConfig, attach_rlimits};

/// How a supervisor launches executor processes.
///
/// The program is usually the agent binary itself, re-entered in executor
/// boot mode; everything task-specific travels through the env contract, so
/// any program honoring [`ward_model::env_keys`] works (tests substitute the
/// binary built by the harness).
#[derive(Debug, Clone)]
pub struct ExecutorSpec {
    pub program: PathBuf,
    /// Fixed arguments prepended before the env contract applies.
    pub args: Vec<String>,
    /// Working directory; `None` inherits the supervisor's.
    pub cwd: Option<PathBuf>,
    /// Hard process limits; empty by default.
    pub rlimits: RlimitConfig,
}

impl ExecutorSpec {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            rlimits: RlimitConfig::default(),
        }
    }

    /// Launch spec re-entering the current executable in executor mode.
    pub fn current_exe() -> Result<Self, ExecError> {
        Ok(Self::new(std::env::current_exe()?))
    }
}

/// Build the executor launch command.
///
/// The child gets, in order: the supervisor's environment, the
/// [`ProcessConfig`] environment (pre-encrypted values forwarded verbatim),
/// then the env contract (boot mode, ports, serialized job context, heap
/// bounds); the contract keys always win.
pub fn executor_command(
    spec: &ExecutorSpec,
    ctx: &JobContext,
    config: &ProcessConfig,
    endpoint: &ExecutorEndpoint,
) -> Result<Command, ExecError> {
    if spec.program.as_os_str().is_empty() {
        return Err(ExecError::MissingProgram);
    }

    let context_json = serde_json::to_string(ctx).map_err(|e| ExecError::Spawn(e.to_string()))?;

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }
    for (k, v) in &config.environments {
        cmd.env(k, v);
    }
    cmd.env(env_keys::BOOT_MODE, env_keys::BOOT_MODE_EXECUTOR);
    cmd.env(env_keys::EXECUTOR_PORT, endpoint.executor_port.to_string());
    cmd.env(
        env_keys::SUPERVISOR_PORT,
        endpoint.supervisor_port.to_string(),
    );
    cmd.env(env_keys::JOB_CONTEXT, context_json);
    cmd.env(env_keys::HEAP_MIN_MB, config.min_heap_mb.to_string());
    cmd.env(env_keys::HEAP_MAX_MB, config.max_heap_mb.to_string());

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::inherit());
    cmd.kill_on_drop(true);

    attach_rlimits(&mut cmd, &spec.rlimits);

    trace!(
        target: "ward_exec::command",
        program = %spec.program.display(),
        job_id = %ctx.job_id,
        executor_port = endpoint.executor_port,
        "built executor command"
    );
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ward_model::JobId;

    fn endpoint() -> ExecutorEndpoint {
        ExecutorEndpoint::new("127.0.0.1", 18001, 19001)
    }

    #[test]
    fn empty_program_is_rejected() {
        let spec = ExecutorSpec::new("");
        let ctx = JobContext::new("ward.job.Dummy", JobId::from(1));
        let err = executor_command(&spec, &ctx, &ProcessConfig::default(), &endpoint());
        assert!(matches!(err, Err(ExecError::MissingProgram)));
    }

    #[test]
    fn contract_env_is_applied() {
        let spec = ExecutorSpec::new("/bin/true");
        let ctx = JobContext::new("ward.job.Dummy", JobId::from(1));
        let config = ProcessConfig::new(128, 512).with_env("CUSTOM", "value");

        let cmd = executor_command(&spec, &ctx, &config, &endpoint()).unwrap();
        let envs: Vec<(String, String)> = cmd
            .as_std()
            .get_envs()
            .filter_map(|(k, v)| {
                Some((
                    k.to_str()?.to_string(),
                    v.and_then(|v| v.to_str()).unwrap_or_default().to_string(),
                ))
            })
            .collect();

        let get = |key: &str| {
            envs.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get(env_keys::BOOT_MODE), Some(env_keys::BOOT_MODE_EXECUTOR));
        assert_eq!(get(env_keys::EXECUTOR_PORT), Some("19001"));
        assert_eq!(get(env_keys::SUPERVISOR_PORT), Some("18001"));
        assert_eq!(get(env_keys::HEAP_MAX_MB), Some("512"));
        assert_eq!(get("CUSTOM"), Some("value"));

        let context_json = get(env_keys::JOB_CONTEXT).unwrap();
        let back: JobContext = serde_json::from_str(context_json).unwrap();
        assert_eq!(back, ctx);
    }
}

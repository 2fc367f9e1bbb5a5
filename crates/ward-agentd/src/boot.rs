use ward_model::env_keys;

/// Which half of the agent this process runs.
///
/// A supervisor re-enters its own binary with
/// `WARD_BOOT_MODE=executor` to launch executors; anything else (including
/// an absent variable) boots a supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootMode {
    Supervisor,
    Executor,
}

impl BootMode {
    pub fn from_env() -> Self {
        Self::parse(std::env::var(env_keys::BOOT_MODE).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(mode) if mode == env_keys::BOOT_MODE_EXECUTOR => BootMode::Executor,
            _ => BootMode::Supervisor,
        }
    }
}

//! Environment contract between a supervisor and the executor it spawns.
//!
//! The supervisor passes everything the executor needs through the child's
//! environment; the executor reads these keys at boot and nothing else.

/// Selects the agent boot mode: [`BOOT_MODE_SUPERVISOR`] or [`BOOT_MODE_EXECUTOR`].
pub const BOOT_MODE: &str = "WARD_BOOT_MODE";

pub const BOOT_MODE_SUPERVISOR: &str = "supervisor";
pub const BOOT_MODE_EXECUTOR: &str = "executor";

/// TCP port the executor must bind and serve on.
pub const EXECUTOR_PORT: &str = "WARD_EXECUTOR_PORT";

/// Port of the supervisor that spawned this executor.
pub const SUPERVISOR_PORT: &str = "WARD_SUPERVISOR_PORT";

/// The serialized [`crate::JobContext`] for the task this executor runs.
pub const JOB_CONTEXT: &str = "WARD_JOB_CONTEXT";

/// Advisory heap bounds from [`crate::ProcessConfig`], in megabytes.
pub const HEAP_MIN_MB: &str = "WARD_HEAP_MIN_MB";
pub const HEAP_MAX_MB: &str = "WARD_HEAP_MAX_MB";

/// Directory the executor writes its logs under.
pub const LOG_DIR: &str = "WARD_LOG_DIR";

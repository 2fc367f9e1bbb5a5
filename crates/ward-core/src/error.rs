use thiserror::Error;

use ward_model::{ExecutorEndpoint, JobId, SupervisorEndpoint};

/// Failures inside a supervisor handling a command.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Port(#[from] crate::PortError),

    #[error("executor launch failed: {0}")]
    Exec(#[from] ward_exec::ExecError),

    #[error("start already in progress for job {0}")]
    StartInProgress(JobId),
}

/// Failures surfaced to the job caller.
///
/// Only unrecoverable start failures and readiness timeouts are errors;
/// everything the caller must branch on comes back as a
/// [`ward_model::TaskCallerResult`].
#[derive(Debug, Error)]
pub enum CallerError {
    #[error("job {job_id} start rejected by supervisor {endpoint}: {reason}")]
    StartRejected {
        job_id: JobId,
        endpoint: SupervisorEndpoint,
        reason: String,
    },

    #[error("supervisor {endpoint} unreachable: {source}")]
    Unreachable {
        endpoint: SupervisorEndpoint,
        #[source]
        source: ward_client::ClientError,
    },

    #[error("executor {0} did not become reachable in time")]
    NotReady(ExecutorEndpoint),

    #[error("protocol error: {0}")]
    Protocol(#[from] ward_model::ProtocolError),
}

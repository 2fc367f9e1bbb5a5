//! Wire envelope for supervisor control operations.
//!
//! The envelope and its payloads are deliberately decoupled: `JobContext` and
//! `ProcessConfig` travel as nested JSON *strings*, so a payload stays
//! parseable on its own and the envelope schema can evolve around it.
//! Deserialization is tolerant (a missing `version` reads as 0 and missing
//! optional fields read as absent), so new commands can roll out without
//! breaking supervisors that have not restarted yet.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ExecutorEndpoint, JobContext, ProcessConfig};

/// Version stamped on commands produced by this build.
pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed command envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("malformed {payload} payload: {source}")]
    Payload {
        payload: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Control operations a supervisor accepts.
///
/// Each kind maps 1:1 to an HTTP path of the form `/task/command/<kind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Start,
    Destroy,
    Finish,
    Stop,
    IsAlive,
    IsSupervisorAlive,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Start => "start",
            CommandKind::Destroy => "destroy",
            CommandKind::Finish => "finish",
            CommandKind::Stop => "stop",
            CommandKind::IsAlive => "is_alive",
            CommandKind::IsSupervisorAlive => "is_supervisor_alive",
        }
    }

    /// HTTP path this command is posted to.
    pub fn command_path(&self) -> String {
        format!("/task/command/{}", self.as_str())
    }

    /// Resolve the path segment of a command route back to a kind.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "start" => Some(CommandKind::Start),
            "destroy" => Some(CommandKind::Destroy),
            "finish" => Some(CommandKind::Finish),
            "stop" => Some(CommandKind::Stop),
            "is_alive" => Some(CommandKind::IsAlive),
            "is_supervisor_alive" => Some(CommandKind::IsSupervisorAlive),
            _ => None,
        }
    }
}

/// The command envelope.
///
/// START carries a [`ProcessConfig`]; every post-start command instead
/// carries the [`ExecutorEndpoint`] identifying the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCommand {
    /// Protocol version; absent on the wire reads as 0.
    #[serde(default)]
    pub version: u32,
    /// Nested JSON encoding of the [`JobContext`].
    pub job_context: String,
    pub command: CommandKind,
    /// Nested JSON encoding of the [`ProcessConfig`]; START only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_config: Option<String>,
    /// Target executor; present on all post-start commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor_endpoint: Option<ExecutorEndpoint>,
}

impl TaskCommand {
    /// Build a START command.
    pub fn start(ctx: &JobContext, config: &ProcessConfig) -> Result<Self, ProtocolError> {
        Ok(Self {
            version: PROTOCOL_VERSION,
            job_context: encode_payload(ctx, "jobContext")?,
            command: CommandKind::Start,
            process_config: Some(encode_payload(config, "processConfig")?),
            executor_endpoint: None,
        })
    }

    /// Build a post-start command addressed at a running executor.
    pub fn addressed(
        command: CommandKind,
        ctx: &JobContext,
        executor: &ExecutorEndpoint,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            version: PROTOCOL_VERSION,
            job_context: encode_payload(ctx, "jobContext")?,
            command,
            process_config: None,
            executor_endpoint: Some(executor.clone()),
        })
    }

    /// Decode the nested [`JobContext`] payload.
    pub fn job_context(&self) -> Result<JobContext, ProtocolError> {
        decode_payload(&self.job_context, "jobContext")
    }

    /// Decode the nested [`ProcessConfig`] payload, if present.
    pub fn process_config(&self) -> Result<Option<ProcessConfig>, ProtocolError> {
        self.process_config
            .as_deref()
            .map(|raw| decode_payload(raw, "processConfig"))
            .transpose()
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Envelope)
    }

    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::Envelope)
    }
}

/// Operational outcome of one control call.
///
/// Not an error type: the caller branches on `succeed`. START's payload is
/// the spawned [`ExecutorEndpoint`], nested as a JSON string like the other
/// opaque payloads; IS_ALIVE's payload is `"true"` or `"false"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCallerResult {
    pub succeed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl TaskCallerResult {
    pub fn ok() -> Self {
        Self {
            succeed: true,
            payload: None,
        }
    }

    pub fn ok_with<P: Into<String>>(payload: P) -> Self {
        Self {
            succeed: true,
            payload: Some(payload.into()),
        }
    }

    pub fn failed<P: Into<String>>(reason: P) -> Self {
        Self {
            succeed: false,
            payload: Some(reason.into()),
        }
    }

    pub fn alive(alive: bool) -> Self {
        Self::ok_with(if alive { "true" } else { "false" })
    }

    /// Interpret the payload of an IS_ALIVE answer.
    pub fn payload_bool(&self) -> bool {
        self.payload.as_deref() == Some("true")
    }

    /// Decode a nested [`ExecutorEndpoint`] payload (START answers).
    pub fn executor_endpoint(&self) -> Result<Option<ExecutorEndpoint>, ProtocolError> {
        self.payload
            .as_deref()
            .map(|raw| decode_payload(raw, "executorEndpoint"))
            .transpose()
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Envelope)
    }

    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::Envelope)
    }
}

fn encode_payload<T: Serialize>(value: &T, name: &'static str) -> Result<String, ProtocolError> {
    serde_json::to_string(value).map_err(|source| ProtocolError::Payload {
        payload: name,
        source,
    })
}

fn decode_payload<T: for<'de> Deserialize<'de>>(
    raw: &str,
    name: &'static str,
) -> Result<T, ProtocolError> {
    serde_json::from_str(raw).map_err(|source| ProtocolError::Payload {
        payload: name,
        source,
    })
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::debug;

use ward_model::{CommandKind, TaskCommand};

use crate::{error::ApiError, handler::CommandHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: CommandHandler,
{
    /// Create new HTTP API with the given handler.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - POST /task/command/{kind} - Execute control command
    /// - GET /heartbeat - Supervisor liveness probe
    /// - GET /memInfo - Coarse resource diagnostics
    pub fn router(self) -> Router {
        Router::new()
            .route("/task/command/{kind}", post(execute_command::<H>))
            .route("/heartbeat", get(heartbeat::<H>))
            .route("/memInfo", get(mem_info::<H>))
            .with_state(self.handler)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /task/command/{kind}
async fn execute_command<H>(
    State(handler): State<Arc<H>>,
    Path(kind): Path<String>,
    body: String,
) -> Result<impl IntoResponse, ApiError>
where
    H: CommandHandler,
{
    let kind = CommandKind::from_path_segment(&kind)
        .ok_or_else(|| ApiError::UnknownCommand(kind.clone()))?;

    let command = TaskCommand::from_json(&body)?;
    if command.command != kind {
        return Err(ApiError::InvalidRequest(format!(
            "envelope says {} but was posted to {}",
            command.command.as_str(),
            kind.as_str()
        )));
    }

    debug!(
        target: "ward_api::http",
        command = kind.as_str(), version = command.version,
        "executing command"
    );
    let result = handler.execute(command).await?;
    Ok(Json(result))
}

/// GET /heartbeat
async fn heartbeat<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: CommandHandler,
{
    handler.heartbeat().await
}

/// GET /memInfo
async fn mem_info<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: CommandHandler,
{
    let info = handler.mem_info().await?;
    Ok(Json(info))
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ward_model::ProtocolError),

    #[error("supervisor error: {0}")]
    Supervisor(#[from] ward_core::SupervisorError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) | ApiError::Protocol(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownCommand(_) => StatusCode::NOT_FOUND,
            ApiError::Supervisor(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

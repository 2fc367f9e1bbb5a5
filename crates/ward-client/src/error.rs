use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: the peer is unreachable, not "command failed".
    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The peer answered with a non-success status: the command was rejected.
    #[error("peer rejected request with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("protocol error: {0}")]
    Protocol(#[from] ward_model::ProtocolError),
}

impl ClientError {
    /// True when the failure means the peer could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

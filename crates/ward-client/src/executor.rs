use tracing::debug;

use ward_model::ExecutorEndpoint;

use crate::{ClientConfig, ClientError};
use crate::supervisor::read_body;

/// Direct client for an executor's embedded server.
///
/// This is the termination path that bypasses the supervisor: any holder of
/// a valid [`ExecutorEndpoint`] can ask the executor itself to stop, which
/// is how tasks are torn down when their supervisor is unreachable.
#[derive(Debug, Clone)]
pub struct ExecutorClient {
    http: reqwest::Client,
}

impl ExecutorClient {
    pub fn new(config: &ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self { http }
    }

    /// Ask the executor process to stop; it exits shortly after answering.
    pub async fn stop(&self, endpoint: &ExecutorEndpoint) -> Result<String, ClientError> {
        let url = format!(
            "http://{}:{}/executor/stop",
            endpoint.host, endpoint.executor_port
        );
        debug!(target: "ward_client::executor", %url, "requesting executor stop");

        let response = self.http.post(&url).send().await?;
        read_body(response).await
    }

    /// Probe the executor's embedded server.
    pub async fn heartbeat(&self, endpoint: &ExecutorEndpoint) -> Result<String, ClientError> {
        let url = format!(
            "http://{}:{}/heartbeat",
            endpoint.host, endpoint.executor_port
        );
        let response = self.http.get(&url).send().await?;
        read_body(response).await
    }
}

impl Default for ExecutorClient {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

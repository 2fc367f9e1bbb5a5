use tracing::{debug, trace};

use ward_model::{SupervisorEndpoint, TaskCommand};

use crate::{ClientConfig, ClientError};

/// Stateless sender of control commands and probes to a supervisor.
///
/// Transport failures (connection refused, timeout) surface as
/// [`ClientError::Transport`] and mean "supervisor unreachable"; a non-2xx
/// answer means the supervisor was reached and rejected the command.
#[derive(Debug, Clone)]
pub struct SupervisorClient {
    http: reqwest::Client,
}

impl SupervisorClient {
    pub fn new(config: &ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self { http }
    }

    /// POST a serialized command to its mapped path; returns the raw body.
    pub async fn send_command(
        &self,
        endpoint: &SupervisorEndpoint,
        command: &TaskCommand,
    ) -> Result<String, ClientError> {
        let url = format!(
            "http://{}:{}{}",
            endpoint.host,
            endpoint.port,
            command.command.command_path()
        );
        debug!(target: "ward_client::supervisor", %url, command = command.command.as_str(), "sending command");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(command.to_json()?)
            .send()
            .await?;

        read_body(response).await
    }

    /// Lightweight probe of the supervisor process itself.
    pub async fn heartbeat(&self, endpoint: &SupervisorEndpoint) -> Result<String, ClientError> {
        self.get(endpoint, "/heartbeat").await
    }

    /// Coarse resource introspection, for operational tooling.
    pub async fn mem_info(&self, endpoint: &SupervisorEndpoint) -> Result<String, ClientError> {
        self.get(endpoint, "/memInfo").await
    }

    async fn get(&self, endpoint: &SupervisorEndpoint, path: &str) -> Result<String, ClientError> {
        let url = format!("http://{}:{}{}", endpoint.host, endpoint.port, path);
        trace!(target: "ward_client::supervisor", %url, "probe");

        let response = self.http.get(&url).send().await?;
        read_body(response).await
    }
}

impl Default for SupervisorClient {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

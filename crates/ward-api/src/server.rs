use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use ward_model::SupervisorEndpoint;

use crate::{handler::CommandHandler, http::HttpApi};

/// One running supervisor HTTP server.
///
/// The listener is bound before `start` returns, so the endpoint is
/// immediately addressable. `stop` begins a graceful shutdown and
/// `wait_stop` blocks until the serve loop has actually exited, after
/// which remote-addressed queries fail while executors this process
/// spawned keep running on their own.
pub struct SupervisorApplication {
    endpoint: SupervisorEndpoint,
    shutdown: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SupervisorApplication {
    /// Bind `port` and serve `handler` in the background.
    pub async fn start<H>(port: u16, handler: Arc<H>) -> std::io::Result<Self>
    where
        H: CommandHandler,
    {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
        let endpoint = SupervisorEndpoint::new(ward_core::system::local_host(), port);

        let router = HttpApi::new(handler).router();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await });
            if let Err(e) = serve.await {
                error!(target: "ward_api::server", error = %e, "supervisor server terminated abnormally");
            }
        });

        info!(target: "ward_api::server", %endpoint, "supervisor listening");
        Ok(Self {
            endpoint,
            shutdown,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn endpoint(&self) -> &SupervisorEndpoint {
        &self.endpoint
    }

    /// Begin graceful shutdown; idempotent.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Block until the serve loop has exited.
    pub async fn wait_stop(&self) {
        let handle = self.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

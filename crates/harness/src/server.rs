//! Target server adapter - serves the static application root and probes
//! for readiness.
//!
//! Socket bind and content readiness are not simultaneous, so the adapter
//! separates `start` (bind + spawn) from `wait_until_ready` (bounded HTTP
//! polling). A run never opens a browser session before the probe succeeds.

use std::path::Path;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::error::{HarnessError, HarnessResult};

/// Interval between readiness probes.
const PROBE_BACKOFF: Duration = Duration::from_millis(100);

/// Per-request timeout for a single probe.
const PROBE_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Handle to the in-process static content server.
pub struct ServerHandle {
    base_url: String,
    port: u16,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Bind a loopback listener (port 0 = ephemeral) and serve `root_dir`.
    pub async fn start(root_dir: &Path, port: u16) -> HarnessResult<Self> {
        if !root_dir.is_dir() {
            return Err(HarnessError::ServerStartup(format!(
                "static root {} is not a directory",
                root_dir.display()
            )));
        }

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| {
                HarnessError::ServerStartup(format!("failed to bind 127.0.0.1:{port}: {e}"))
            })?;
        let port = listener
            .local_addr()
            .map_err(|e| HarnessError::ServerStartup(format!("failed to read bound addr: {e}")))?
            .port();
        let base_url = format!("http://127.0.0.1:{port}");

        let app = Router::new().fallback_service(ServeDir::new(root_dir));
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = serve.await {
                warn!("static server exited with error: {e}");
            }
        });

        info!(root = %root_dir.display(), %base_url, "static server started");

        Ok(Self {
            base_url,
            port,
            shutdown: Some(tx),
            task: Some(task),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Poll with a fixed short backoff until a 2xx response or the deadline.
    pub async fn wait_until_ready(&self, timeout: Duration) -> HarnessResult<()> {
        wait_until_ready(&self.base_url, timeout).await
    }

    /// Signal graceful shutdown and await the serve task. Consuming `self`
    /// makes double-stop unrepresentable.
    pub async fn stop(mut self) -> HarnessResult<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("static server stopped");
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        // Best-effort shutdown if `stop` was never called.
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Readiness probe against any base URL. Connection refusal during startup
/// is expected and stays quiet; the deadline failure carries the attempt
/// count for diagnosis.
pub(crate) async fn wait_until_ready(base_url: &str, timeout: Duration) -> HarnessResult<()> {
    let client = reqwest::Client::builder()
        .timeout(PROBE_REQUEST_TIMEOUT)
        .build()?;

    let start = Instant::now();
    let mut attempts = 0usize;

    while start.elapsed() < timeout {
        attempts += 1;
        match client.get(base_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(%base_url, attempts, "server ready");
                return Ok(());
            }
            Ok(resp) => {
                warn!("readiness probe returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("waiting for server to become ready...");
                }
                if !e.is_connect() {
                    warn!("readiness probe error: {e}");
                }
            }
        }
        sleep(PROBE_BACKOFF).await;
    }

    Err(HarnessError::ServerNotReady {
        attempts,
        waited_ms: start.elapsed().as_millis() as u64,
    })
}

//! Post-setup orchestration: run the scenario groups, release the browser
//! session and static server on every path, and map the outcome to the
//! process exit code.
//!
//! Generic over the driver and a `Release` seam so the
//! run-then-release-both contract holds for any injected step failure, not
//! just the happy path.

use std::time::Duration;

use async_trait::async_trait;

use tracing::{error, info, warn};

use wardsnap_browser::{Session, UiDriver};

use crate::artifact::ArtifactWriter;
use crate::error::HarnessResult;
use crate::runner::ScenarioRunner;
use crate::scenario::ScenarioGroup;
use crate::server::ServerHandle;

/// A resource released exactly once at the end of a run, successful or
/// not. Consuming `self` makes double-release unrepresentable.
#[async_trait]
pub trait Release: Send {
    async fn release(self) -> HarnessResult<()>;
}

#[async_trait]
impl Release for Session {
    async fn release(self) -> HarnessResult<()> {
        self.close().await?;
        Ok(())
    }
}

#[async_trait]
impl Release for ServerHandle {
    async fn release(self) -> HarnessResult<()> {
        self.stop().await
    }
}

/// Run the groups, then release the driver and server unconditionally.
///
/// Exit codes: 0 full success, 1 run failure (first fatal step error or
/// missing artifacts), 2 when the run never produced a report (scenario
/// definition rejected).
pub async fn execute<D, S>(
    mut driver: D,
    server: S,
    writer: &ArtifactWriter,
    base_url: impl Into<String>,
    action_timeout: Duration,
    groups: &[ScenarioGroup],
) -> i32
where
    D: UiDriver + Release,
    S: Release,
{
    let outcome = {
        let mut runner = ScenarioRunner::new(&mut driver, writer, base_url, action_timeout);
        runner.run(groups).await
    };

    // Teardown is decoupled from error handling.
    if let Err(e) = driver.release().await {
        warn!("error closing session: {e}");
    }
    if let Err(e) = server.release().await {
        warn!("error stopping server: {e}");
    }

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            return 2;
        }
    };

    for group in &report.groups {
        info!("{}: {}/{} captured", group.group, group.captured, group.expected);
    }

    if let Some(failure) = &report.failure {
        error!(
            "run failed at {}/{}: {}",
            failure.group, failure.step, failure.message
        );
        return 1;
    }
    if !report.success() {
        error!(
            "run incomplete: {}/{} artifacts captured",
            report.total_captured(),
            report.total_expected()
        );
        return 1;
    }

    info!(
        "all artifacts captured ({} total, {} ms)",
        report.total_captured(),
        report.duration_ms
    );
    0
}

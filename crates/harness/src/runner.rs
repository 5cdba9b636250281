//! Scenario runner - executes groups strictly sequentially against one
//! driver.
//!
//! Fail-fast: the first fatal primitive error aborts its step and the run.
//! The only scoped fallback is the `try_optional` composition, where an
//! `ElementNotFound` from the attempt is an expected, non-fatal outcome.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use wardsnap_browser::{BrowserError, UiDriver};

use crate::artifact::ArtifactWriter;
use crate::error::{HarnessError, HarnessResult};
use crate::report::{GroupSummary, RunFailure, RunReport};
use crate::scenario::{validate_groups, Action, ScenarioGroup, Step};

pub struct ScenarioRunner<'a, D: UiDriver> {
    driver: &'a mut D,
    writer: &'a ArtifactWriter,
    base_url: String,
    action_timeout: Duration,
}

impl<'a, D: UiDriver> ScenarioRunner<'a, D> {
    pub fn new(
        driver: &'a mut D,
        writer: &'a ArtifactWriter,
        base_url: impl Into<String>,
        action_timeout: Duration,
    ) -> Self {
        Self {
            driver,
            writer,
            base_url: base_url.into(),
            action_timeout,
        }
    }

    /// Run all groups in declared order. Scenario-definition errors are an
    /// `Err`; step failures are recorded on the report and terminate the
    /// run early, leaving prior artifacts on disk.
    pub async fn run(&mut self, groups: &[ScenarioGroup]) -> HarnessResult<RunReport> {
        validate_groups(groups)?;

        let start = Instant::now();
        let mut summaries: Vec<GroupSummary> = groups
            .iter()
            .map(|g| GroupSummary {
                group: g.name.clone(),
                captured: 0,
                expected: g.capture_count(),
            })
            .collect();
        let mut failure: Option<RunFailure> = None;

        'groups: for (idx, group) in groups.iter().enumerate() {
            info!(
                group = %group.name,
                viewport = group.viewport.name,
                steps = group.steps.len(),
                "running scenario group"
            );

            if let Err(e) = self.driver.set_viewport(group.viewport).await {
                failure = Some(record_failure(&group.name, "set-viewport", &HarnessError::from(e)));
                break 'groups;
            }

            for step in &group.steps {
                let step_start = Instant::now();
                match self.run_step(group, step).await {
                    Ok(Some(path)) => {
                        summaries[idx].captured += 1;
                        info!(
                            artifact = %path.display(),
                            duration_ms = step_start.elapsed().as_millis() as u64,
                            "captured"
                        );
                    }
                    Ok(None) => {
                        debug!(
                            step = %step.name,
                            duration_ms = step_start.elapsed().as_millis() as u64,
                            "step completed"
                        );
                    }
                    Err(e) => {
                        failure = Some(record_failure(&group.name, &step.name, &e));
                        break 'groups;
                    }
                }
            }
        }

        Ok(RunReport {
            groups: summaries,
            duration_ms: start.elapsed().as_millis() as u64,
            failure,
        })
    }

    async fn run_step(
        &mut self,
        group: &ScenarioGroup,
        step: &Step,
    ) -> HarnessResult<Option<PathBuf>> {
        debug!(group = %group.name, step = %step.name, "running step");
        for action in &step.actions {
            self.run_action(action).await?;
        }
        if step.capture {
            let bytes = self.driver.screenshot().await?;
            let path = self
                .writer
                .write(&group.name, step.ordinal, &step.name, &bytes)?;
            return Ok(Some(path));
        }
        Ok(None)
    }

    async fn run_action(&mut self, action: &Action) -> HarnessResult<()> {
        match action {
            Action::TryOptional {
                attempt,
                fallback,
                timeout_ms,
            } => {
                let budget = Duration::from_millis(*timeout_ms);
                match self.run_atomic(attempt, Some(budget)).await {
                    Ok(()) => Ok(()),
                    Err(HarnessError::Driver(BrowserError::ElementNotFound { selector })) => {
                        debug!(%selector, "optional element absent, running fallback");
                        self.run_atomic(fallback, None).await
                    }
                    Err(e) => Err(e),
                }
            }
            atomic => self.run_atomic(atomic, None).await,
        }
    }

    async fn run_atomic(
        &mut self,
        action: &Action,
        timeout_override: Option<Duration>,
    ) -> HarnessResult<()> {
        match action {
            Action::Navigate { url } => {
                let url = self.absolute_url(url);
                self.driver.navigate(&url).await?;
            }
            Action::Click {
                selector,
                timeout_ms,
            } => {
                let timeout = self.effective_timeout(*timeout_ms, timeout_override);
                self.driver.click(selector, timeout).await?;
            }
            Action::Fill {
                selector,
                value,
                timeout_ms,
            } => {
                let timeout = self.effective_timeout(*timeout_ms, timeout_override);
                self.driver.fill(selector, value, timeout).await?;
            }
            Action::SelectOption {
                selector,
                value,
                timeout_ms,
            } => {
                let timeout = self.effective_timeout(*timeout_ms, timeout_override);
                self.driver.select_option(selector, value, timeout).await?;
            }
            Action::AcceptNextDialog => {
                self.driver.accept_next_dialog().await?;
            }
            Action::EvalPageFn { name, args } => {
                self.driver.eval_page_fn(name, args).await?;
            }
            Action::WaitFor {
                selector,
                timeout_ms,
            } => {
                let timeout = self.effective_timeout(*timeout_ms, timeout_override);
                self.driver.wait_for(selector, timeout).await?;
            }
            Action::WaitStable {
                selector,
                timeout_ms,
            } => {
                let timeout = self.effective_timeout(*timeout_ms, timeout_override);
                self.driver.wait_stable(selector, timeout).await?;
            }
            Action::Settle { ms } => {
                self.driver.settle(*ms).await;
            }
            Action::TryOptional { .. } => {
                // Arms are validated atomic before the run starts.
                return Err(HarnessError::InvalidScenario(
                    "try_optional arm is not atomic".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn effective_timeout(
        &self,
        declared_ms: Option<u64>,
        timeout_override: Option<Duration>,
    ) -> Duration {
        timeout_override
            .or(declared_ms.map(Duration::from_millis))
            .unwrap_or(self.action_timeout)
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if url.starts_with('/') {
            format!("{base}{url}")
        } else {
            format!("{base}/{url}")
        }
    }
}

fn record_failure(group: &str, step: &str, err: &HarnessError) -> RunFailure {
    error!(group, step, "step failed: {err}");
    RunFailure {
        group: group.to_string(),
        step: step.to_string(),
        message: err.to_string(),
    }
}

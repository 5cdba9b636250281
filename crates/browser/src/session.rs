//! Browser session lifecycle and the production `UiDriver` implementation.
//!
//! Exactly one Chromium process, one context, and one page exist per session.
//! The session starts from a fresh user profile, so no cookies or storage
//! carry across runs.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::driver::{UiDriver, Viewport};
use crate::error::{BrowserError, BrowserResult};

/// Polling interval for actionability and stability waits.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Quiet period appended after navigation, as a heuristic for network idle.
const NETWORK_QUIET: Duration = Duration::from_millis(500);

/// Configuration for launching a browser session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run without a visible window.
    pub headless: bool,
    /// Browser executable override. `None` lets chromiumoxide auto-detect.
    pub executable: Option<PathBuf>,
    /// Overall budget for a single navigation.
    pub nav_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            nav_timeout: Duration::from_secs(15),
        }
    }
}

/// One-shot dialog-accept handler, alive until a dialog is accepted or the
/// next mutating primitive completes.
struct DialogArm {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// An open browser session: one Chromium process, one page.
pub struct Session {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    dialog_arm: Option<DialogArm>,
    nav_timeout: Duration,
}

impl Session {
    /// Launch Chromium and open a single blank page.
    pub async fn open(config: SessionConfig) -> BrowserResult<Self> {
        info!(headless = config.headless, "launching browser");

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(Viewport::DESKTOP.width, Viewport::DESKTOP.height);
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = config.executable.clone() {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The handler task pumps CDP messages; it ends when the browser
        // connection closes.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler loop ended");
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(BrowserError::Launch(format!("failed to open page: {e}")));
            }
        };

        info!("browser session open");

        Ok(Self {
            browser,
            page,
            handler_task,
            dialog_arm: None,
            nav_timeout: config.nav_timeout,
        })
    }

    /// Close the session, discarding any armed dialog handler.
    pub async fn close(mut self) -> BrowserResult<()> {
        self.disarm_dialog().await;
        if let Err(e) = self.browser.close().await {
            warn!("error closing browser: {e}");
        }
        self.handler_task.abort();
        info!("browser session closed");
        Ok(())
    }

    async fn probe(&self, selector: &str) -> BrowserResult<ElementProbe> {
        let result = self
            .page
            .evaluate(probe_expression(selector))
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    /// Poll until the element is attached, visible and enabled.
    async fn wait_actionable(&self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        let deadline = Instant::now() + timeout;
        let mut last;
        loop {
            last = self.probe(selector).await?;
            if last.found && last.visible && !last.disabled {
                return Ok(());
            }
            if Instant::now() >= deadline {
                break;
            }
            sleep(POLL_INTERVAL).await;
        }
        if !last.found {
            Err(BrowserError::ElementNotFound {
                selector: selector.to_string(),
            })
        } else {
            let reason = if last.disabled { "disabled" } else { "hidden" };
            Err(BrowserError::ElementNotActionable {
                selector: selector.to_string(),
                reason: reason.to_string(),
            })
        }
    }

    /// Consume the pending dialog arm, if any. Called at the completion of
    /// every mutating primitive; an unconsumed arm is discarded silently.
    async fn disarm_dialog(&mut self) {
        if let Some(arm) = self.dialog_arm.take() {
            arm.cancel.cancel();
            let _ = arm.task.await;
        }
    }
}

#[async_trait]
impl UiDriver for Session {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        debug!(%url, "navigating");
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let deadline = Instant::now() + self.nav_timeout;
        loop {
            let complete = self
                .page
                .evaluate("document.readyState === 'complete'")
                .await
                .ok()
                .and_then(|v| v.into_value::<bool>().ok())
                .unwrap_or(false);
            if complete {
                break;
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    reason: "document never reached readyState 'complete'".to_string(),
                });
            }
            sleep(POLL_INTERVAL).await;
        }

        sleep(NETWORK_QUIET).await;
        self.disarm_dialog().await;
        Ok(())
    }

    async fn click(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        self.wait_actionable(selector, timeout).await?;
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| BrowserError::ElementNotFound {
                    selector: selector.to_string(),
                })?;
        element.click().await?;
        debug!(%selector, "clicked");
        self.disarm_dialog().await;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str, timeout: Duration) -> BrowserResult<()> {
        self.wait_actionable(selector, timeout).await?;
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| BrowserError::ElementNotFound {
                    selector: selector.to_string(),
                })?;
        // Focus, clear, then type with real key events.
        element.click().await?;
        self.page
            .evaluate(format!(
                "document.querySelector({}).value = ''",
                js_string(selector)
            ))
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        element.type_str(value).await?;
        debug!(%selector, chars = value.len(), "filled");
        self.disarm_dialog().await;
        Ok(())
    }

    async fn select_option(
        &mut self,
        selector: &str,
        value: &str,
        timeout: Duration,
    ) -> BrowserResult<()> {
        self.wait_actionable(selector, timeout).await?;
        let applied: Option<bool> = self
            .page
            .evaluate(select_expression(selector, value))
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        // Null means the element vanished after the actionability wait.
        let applied = applied.ok_or_else(|| BrowserError::ElementNotFound {
            selector: selector.to_string(),
        })?;
        if !applied {
            return Err(BrowserError::ElementNotActionable {
                selector: selector.to_string(),
                reason: format!("no option with value '{value}'"),
            });
        }
        debug!(%selector, %value, "selected option");
        self.disarm_dialog().await;
        Ok(())
    }

    async fn accept_next_dialog(&mut self) -> BrowserResult<()> {
        self.disarm_dialog().await;

        let mut dialogs = self
            .page
            .event_listener::<EventJavascriptDialogOpening>()
            .await?;
        let page = self.page.clone();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        // Once a dialog event has been received the accept runs to
        // completion; cancellation can only win while still waiting.
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                event = dialogs.next() => {
                    if event.is_some() {
                        let params = match HandleJavaScriptDialogParams::builder()
                            .accept(true)
                            .build()
                        {
                            Ok(params) => params,
                            Err(e) => {
                                warn!("dialog accept params: {e}");
                                return;
                            }
                        };
                        match page.execute(params).await {
                            Ok(_) => debug!("native dialog accepted"),
                            Err(e) => warn!("failed to accept dialog: {e}"),
                        }
                    }
                }
            }
        });
        self.dialog_arm = Some(DialogArm { cancel, task });
        debug!("armed one-shot dialog accept");
        Ok(())
    }

    async fn eval_page_fn(
        &mut self,
        name: &str,
        args: &[serde_json::Value],
    ) -> BrowserResult<serde_json::Value> {
        let defined: bool = self
            .page
            .evaluate(format!(
                "typeof window[{}] === 'function'",
                js_string(name)
            ))
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        if !defined {
            return Err(BrowserError::PageFunctionMissing {
                name: name.to_string(),
            });
        }

        let result = self
            .page
            .evaluate(call_expression(name, args))
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        let value = result.value().cloned().unwrap_or(serde_json::Value::Null);
        debug!(%name, "invoked page function");
        self.disarm_dialog().await;
        Ok(value)
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let probe = self.probe(selector).await?;
            if probe.found && probe.visible {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_stable(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        let deadline = Instant::now() + timeout;
        let mut previous: Option<(f64, f64, f64, f64)> = None;
        let mut seen = false;
        loop {
            let probe = self.probe(selector).await?;
            if probe.found {
                seen = true;
                let rect = (probe.x, probe.y, probe.width, probe.height);
                if probe.visible && previous == Some(rect) {
                    return Ok(());
                }
                previous = Some(rect);
            } else {
                previous = None;
            }
            if Instant::now() >= deadline {
                break;
            }
            sleep(POLL_INTERVAL).await;
        }
        if !seen {
            Err(BrowserError::ElementNotFound {
                selector: selector.to_string(),
            })
        } else {
            Err(BrowserError::ElementNotActionable {
                selector: selector.to_string(),
                reason: "did not settle".to_string(),
            })
        }
    }

    async fn settle(&mut self, ms: u64) {
        sleep(Duration::from_millis(ms)).await;
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> BrowserResult<()> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(viewport.width as i64)
            .height(viewport.height as i64)
            .device_scale_factor(viewport.device_scale_factor)
            .mobile(viewport.mobile)
            .build()
            .map_err(BrowserError::InvalidParams)?;
        self.page.execute(params).await?;
        debug!(
            viewport = viewport.name,
            width = viewport.width,
            height = viewport.height,
            "viewport set"
        );
        Ok(())
    }

    async fn screenshot(&mut self) -> BrowserResult<Vec<u8>> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| BrowserError::Screenshot(e.to_string()))
    }
}

/// Result of probing an element's actionability and geometry in the page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ElementProbe {
    found: bool,
    visible: bool,
    disabled: bool,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Quote a string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn probe_expression(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({sel});
            if (!el) return {{ found: false }};
            const style = window.getComputedStyle(el);
            const rect = el.getBoundingClientRect();
            return {{
                found: true,
                visible: style.display !== 'none'
                    && style.visibility !== 'hidden'
                    && rect.width > 0 && rect.height > 0,
                disabled: !!el.disabled,
                x: rect.x, y: rect.y, width: rect.width, height: rect.height
            }};
        }})()"#,
        sel = js_string(selector)
    )
}

fn select_expression(selector: &str, value: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({sel});
            if (!el) return null;
            el.value = {val};
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return el.value === {val};
        }})()"#,
        sel = js_string(selector),
        val = js_string(value)
    )
}

fn call_expression(name: &str, args: &[serde_json::Value]) -> String {
    let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    format!("window[{}]({})", js_string(name), rendered.join(", "))
}

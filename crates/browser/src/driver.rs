//! The `UiDriver` trait - the primitive vocabulary the scenario layer runs against.
//!
//! `Session` is the production implementation; tests substitute a scripted fake,
//! which is why the scenario runner never touches CDP types directly.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserResult;

/// A named viewport size class with CDP device emulation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub mobile: bool,
}

impl Viewport {
    pub const DESKTOP: Viewport = Viewport {
        name: "desktop",
        width: 1280,
        height: 800,
        device_scale_factor: 1.0,
        mobile: false,
    };

    pub const TABLET: Viewport = Viewport {
        name: "tablet",
        width: 768,
        height: 1024,
        device_scale_factor: 1.0,
        mobile: false,
    };

    pub const MOBILE: Viewport = Viewport {
        name: "mobile",
        width: 375,
        height: 667,
        device_scale_factor: 2.0,
        mobile: true,
    };
}

/// Atomic UI interaction primitives, each with an explicit settle/wait policy.
///
/// Element-acting primitives (`click`, `fill`, `select_option`) wait for the
/// target to become actionable within `timeout` before acting and fail with
/// `ElementNotFound` / `ElementNotActionable` otherwise. `accept_next_dialog`
/// arms a one-shot handler that is consumed or silently discarded when the
/// next mutating primitive completes; a dialog that never appears is not an
/// error.
#[async_trait]
pub trait UiDriver: Send {
    /// Navigate and wait for the document to finish loading plus a short
    /// network-quiet period.
    async fn navigate(&mut self, url: &str) -> BrowserResult<()>;

    async fn click(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Clear the field, then type `value` with real key events.
    async fn fill(&mut self, selector: &str, value: &str, timeout: Duration) -> BrowserResult<()>;

    /// Set a `<select>` value and dispatch a bubbling `change` event.
    async fn select_option(
        &mut self,
        selector: &str,
        value: &str,
        timeout: Duration,
    ) -> BrowserResult<()>;

    /// Arm a one-shot handler that accepts the next native dialog.
    /// Re-arming replaces any pending arm.
    async fn accept_next_dialog(&mut self) -> BrowserResult<()>;

    /// Invoke a function on the page's `window`, failing with
    /// `PageFunctionMissing` if it is not defined at call time.
    async fn eval_page_fn(
        &mut self,
        name: &str,
        args: &[serde_json::Value],
    ) -> BrowserResult<serde_json::Value>;

    /// Wait until the selector is attached and visible.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Wait until the element is visible and its bounding box stops moving
    /// (two identical consecutive reads). The condition wait used after CSS
    /// transitions instead of a fixed delay.
    async fn wait_stable(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Fixed delay. Last resort for states with no structural wait condition.
    async fn settle(&mut self, ms: u64);

    async fn set_viewport(&mut self, viewport: Viewport) -> BrowserResult<()>;

    /// Capture a full-page PNG.
    async fn screenshot(&mut self) -> BrowserResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_classes_are_distinct() {
        assert_ne!(Viewport::DESKTOP, Viewport::TABLET);
        assert_ne!(Viewport::TABLET, Viewport::MOBILE);
        assert_eq!(Viewport::DESKTOP.name, "desktop");
        assert!(Viewport::MOBILE.mobile);
        assert!(!Viewport::DESKTOP.mobile);
    }

    #[test]
    fn mobile_viewport_uses_retina_scale() {
        assert_eq!(Viewport::MOBILE.device_scale_factor, 2.0);
        assert_eq!(Viewport::MOBILE.width, 375);
        assert_eq!(Viewport::MOBILE.height, 667);
    }
}

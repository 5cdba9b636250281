//! Error types for browser automation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("element not actionable: {selector} ({reason})")]
    ElementNotActionable { selector: String, reason: String },

    #[error("page function not defined: {name}")]
    PageFunctionMissing { name: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("screenshot capture failed: {0}")]
    Screenshot(String),

    #[error("invalid CDP parameters: {0}")]
    InvalidParams(String),

    #[error("CDP error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

pub type BrowserResult<T> = Result<T, BrowserError>;

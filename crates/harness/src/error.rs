//! Error types for the capture harness

use thiserror::Error;

use wardsnap_browser::BrowserError;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("server failed to start: {0}")]
    ServerStartup(String),

    #[error("server not ready after {attempts} attempts ({waited_ms} ms)")]
    ServerNotReady { attempts: usize, waited_ms: u64 },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(transparent)]
    Driver(#[from] BrowserError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

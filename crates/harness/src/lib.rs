//! WardSnap harness
//!
//! Drives a headless browser through the WardView console and persists
//! full-page screenshots at declared checkpoints across viewport sizes.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Orchestrator (CLI)                   │
//! │  start server → readiness probe → open session →         │
//! │  run scenario groups → close session → stop server       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                          │
//! │    groups: desktop → tablet → mobile → features          │
//! │    step = [Action...] (+ optional capture)               │
//! │    failing primitive → fatal, fail-fast                  │
//! │    try_optional     → declared two-branch fallback       │
//! ├──────────────────────────────────────────────────────────┤
//! │  UiDriver (wardsnap-browser)   ArtifactWriter            │
//! │    navigate/click/fill/...       <group>/<NN>-<step>.png │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The browser session and static server are each singly owned by the
//! orchestrator and released unconditionally on completion or failure.

pub mod artifact;
pub mod dom;
pub mod error;
pub mod fixture;
pub mod flows;
pub mod orchestrate;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod server;

pub use artifact::ArtifactWriter;
pub use error::{HarnessError, HarnessResult};
pub use report::{GroupSummary, RunFailure, RunReport};
pub use runner::ScenarioRunner;
pub use scenario::{Action, ScenarioGroup, Step};
pub use server::ServerHandle;

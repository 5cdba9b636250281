//! WardSnap browser layer
//!
//! Owns the headless Chromium session and exposes the interaction
//! primitives the scenario layer composes:
//!
//! - [`Session`]: one browser process, one context, one page; opened once
//!   per run and closed on every exit path.
//! - [`UiDriver`]: the primitive vocabulary (navigate, click, fill,
//!   select-option, dialog arming, page-function invocation, condition
//!   waits, screenshots), implemented by `Session` and by test fakes.
//!
//! Every element-acting primitive carries an implicit bounded wait for the
//! target to become actionable, because the driven UI renders
//! asynchronously.

pub mod driver;
pub mod error;
pub mod session;

pub use driver::{UiDriver, Viewport};
pub use error::{BrowserError, BrowserResult};
pub use session::{Session, SessionConfig};

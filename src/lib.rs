//! # spark-bind
//!
//! One-way data binding for small UIs.
//!
//! An [`Observable`] holds a value and notifies listeners when it changes. A
//! [`TemplateBinder`] renders a template such as `"Count: %count%"` into a
//! [`Surface`], substituting each token with the current value of the bound
//! observable, and re-renders whenever one of them changes.
//!
//! ## Architecture
//!
//! ```text
//! caller ── set ──> Observable ── listeners ──> TemplateBinder ── render ──> Surface
//! ```
//!
//! Everything runs synchronously on the calling thread. A `set` returns only
//! after every dependent render has finished.
//!
//! ## Modules
//!
//! - [`types`] - Listener ids and cleanup functions
//! - [`state`] - Observable value containers
//! - [`template`] - Token substitution
//! - [`surface`] - Render targets (in-memory text, terminal pane)
//! - [`binder`] - Template binder tying the above together

pub mod binder;
pub mod state;
pub mod surface;
pub mod template;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use state::Observable;

pub use template::{substitute, token, tokens, DEFAULT_DELIMITER};

pub use surface::{Surface, SurfaceError, TerminalPane, TextBuffer};

pub use binder::{BinderOptions, TemplateBinder};

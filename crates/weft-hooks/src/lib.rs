//! Keyed async hook registry and sequential contribution pipeline.
//!
//! Extensions register hooks against string keys once at startup; the host
//! then pulls contributions through [`Pipeline::apply`] (collector or reducer
//! combination) or runs ordered events with [`Pipeline::fire`]. Execution is
//! strictly sequential in ascending `(stage, order)` and the finalize stage
//! runs after every default-stage hook across all keys, so finalize hooks can
//! rely on the filesystem state the default phase produced.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use weft_hooks::{ApplyKind, HookRegistry, Pipeline, Stage};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut registry = HookRegistry::new();
//! registry.register("addEntryCode", Stage::Default, |_, _| async {
//!     Ok(Some(json!(["console.log('ready');"])))
//! });
//!
//! let pipeline = Pipeline::new(Arc::new(registry));
//! let code = pipeline
//!     .apply("addEntryCode", ApplyKind::Collector, json!([]), None)
//!     .await
//!     .unwrap();
//! assert_eq!(code, json!(["console.log('ready');"]));
//! # });
//! ```

mod error;
mod hook;
mod pipeline;
mod registry;

pub use error::{BoxError, HookError, Result};
pub use hook::{ApplyKind, Hook, HookFn, HookFuture, Stage};
pub use pipeline::Pipeline;
pub use registry::HookRegistry;

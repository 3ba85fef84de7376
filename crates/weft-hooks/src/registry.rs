//! Hook registry keyed by string identifier.
//!
//! Hooks are registered once at process start and live for the process
//! lifetime. There is no removal operation. Registering after the first
//! generation cycle has started is undefined behavior (not guarded); a
//! well-behaved host registers all hooks before the first cycle.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::error::BoxError;
use crate::hook::{Hook, HookFn, HookFuture, Stage};

/// Registry of hooks grouped by key.
///
/// Ordering is the core contract: hooks for a given key execute in ascending
/// `(stage, order)` order, where `order` is assigned from a registry-global
/// monotone counter. Sorting happens once per lookup rather than on every
/// registration.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Vec<Hook>>,
    next_order: u64,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for `key` at the given stage.
    ///
    /// The hook receives the current accumulator and optional extra
    /// arguments; `Ok(None)` means "no contribution".
    pub fn register<F, Fut>(&mut self, key: impl Into<String>, stage: Stage, f: F)
    where
        F: Fn(Value, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, BoxError>> + Send + 'static,
    {
        let f: HookFn = Arc::new(move |acc, extra| Box::pin(f(acc, extra)) as HookFuture);
        self.register_boxed(key, stage, f);
    }

    /// Register a pre-boxed hook callable.
    pub fn register_boxed(&mut self, key: impl Into<String>, stage: Stage, f: HookFn) {
        let key = key.into();
        let order = self.next_order;
        self.next_order += 1;
        trace!(key = %key, ?stage, order, "registering hook");
        self.hooks.entry(key.clone()).or_default().push(Hook {
            key,
            stage,
            order,
            f,
        });
    }

    /// Hooks registered for `key`, stable-sorted by ascending `(stage, order)`.
    ///
    /// Returns an empty vector for unknown keys.
    pub fn lookup(&self, key: &str) -> Vec<Hook> {
        let mut hooks: Vec<Hook> = self.hooks.get(key).cloned().unwrap_or_default();
        hooks.sort_by_key(|h| (h.stage, h.order));
        hooks
    }

    /// Number of hooks registered for `key`.
    pub fn count(&self, key: &str) -> usize {
        self.hooks.get(key).map_or(0, Vec::len)
    }
}

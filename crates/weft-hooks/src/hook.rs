//! Hook representation: stage, registration order, and the async callable.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::error::BoxError;

/// Execution stage for a hook.
///
/// Stages partition a generation cycle into two phases. Every `Default`-stage
/// hook across *all* keys completes before any `Finalize`-stage hook runs.
/// This is a first-class contract: finalize hooks may read files written by
/// default-stage hooks of the same cycle and always observe their final
/// content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Main generation phase (runs first).
    #[default]
    Default,
    /// Finalization phase. Runs strictly after all default-stage hooks;
    /// used by consumers that aggregate over the written file tree.
    Finalize,
}

/// Future type produced by a hook invocation.
///
/// `Ok(None)` means the hook contributed nothing (the accumulator passes
/// through unchanged).
pub type HookFuture = Pin<Box<dyn Future<Output = Result<Option<Value>, BoxError>> + Send>>;

/// The callable registered for a hook: receives the current accumulator and
/// optional extra arguments, returns an optional contribution.
pub type HookFn = Arc<dyn Fn(Value, Option<Value>) -> HookFuture + Send + Sync>;

/// How contributions for a key are combined by [`Pipeline::apply`].
///
/// The kind is fixed per key at the API surface, by convention of the key's
/// owner, rather than inferred from the seed's shape.
///
/// [`Pipeline::apply`]: crate::Pipeline::apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyKind {
    /// Each hook returns a value concatenated onto a growing sequence.
    Collector,
    /// Each hook receives the prior accumulator and returns the next one.
    Reducer,
}

/// A registered hook.
#[derive(Clone)]
pub struct Hook {
    /// Key grouping hooks that contribute to the same logical slot.
    pub key: String,
    /// Execution stage.
    pub stage: Stage,
    /// Monotonically assigned at registration time; unique registry-wide,
    /// so `(stage, order)` ordering never ties.
    pub order: u64,
    /// The async callable.
    pub f: HookFn,
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("key", &self.key)
            .field("stage", &self.stage)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

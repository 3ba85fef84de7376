//! Error types for hook registration and pipeline execution.

use thiserror::Error;

/// Boxed error type returned by extension-provided hook callables.
///
/// Hooks come from third-party extensions, so the pipeline cannot know their
/// concrete error types. Anything that implements `std::error::Error` works.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, HookError>;

#[derive(Debug, Error)]
pub enum HookError {
    /// A registered hook returned an error. Remaining hooks for the key do
    /// not run.
    #[error("hook for key '{key}' (registration order {order}) failed")]
    HookFailed {
        key: String,
        order: u64,
        #[source]
        source: BoxError,
    },

    /// A collector apply was seeded with a value that is not a sequence.
    #[error("collector seed for key '{key}' is not a sequence")]
    SeedNotSequence { key: String },
}

//! Error types for the generation pipeline.
//!
//! Every variant aborts the current generation cycle; none are caught and
//! silently ignored inside the core. Files already written earlier in an
//! aborted cycle remain on disk (no compensating cleanup); the next
//! successful cycle overwrites whatever it regenerates.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur during a generation cycle
#[derive(Debug, Error, Diagnostic)]
pub enum GenError {
    /// A registered extension hook threw or rejected
    #[error("hook pipeline failed")]
    #[diagnostic(code(weft::gen::hook_failed))]
    Hook(#[from] weft_hooks::HookError),

    /// A required file could not be found
    #[error("required module not found: '{}'", path.display())]
    #[diagnostic(code(weft::gen::resolution_failed))]
    Resolution { path: PathBuf },

    /// Static export extraction could not interpret a module's syntax
    #[error("failed to parse module '{}': {reason}", path.display())]
    #[diagnostic(code(weft::gen::parse_failed))]
    Parse { path: PathBuf, reason: String },

    /// Route or contribution data could not be made into stable text
    #[error("failed to serialize {context}: {reason}")]
    #[diagnostic(code(weft::gen::serialization_failed))]
    Serialization { context: String, reason: String },

    /// A staged file path resolved outside the staging root
    #[error("staged path '{path}' escapes the staging root")]
    #[diagnostic(code(weft::gen::invalid_staging_path))]
    InvalidStagingPath { path: String },

    /// Template rendering failed
    #[error("template rendering failed")]
    #[diagnostic(code(weft::gen::template_failed))]
    Template(#[from] minijinja::Error),

    /// Configuration could not be loaded or extracted
    #[error("failed to load configuration")]
    #[diagnostic(code(weft::gen::config_failed))]
    Config(#[from] Box<figment::Error>),

    /// An I/O operation failed
    #[error("I/O error at '{}'", path.display())]
    #[diagnostic(code(weft::gen::io_failed))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// Create a Parse error
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a Serialization error
    pub fn serialization(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Serialization {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create an Io error carrying the offending path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenError>;

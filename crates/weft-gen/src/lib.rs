//! Generation orchestrator for the Weft staging tree.
//!
//! Extensions contribute fragments of generated source through the hook
//! pipeline in [`weft_hooks`]; each generation cycle assembles those
//! fragments, writes staged modules under a single staging root, and
//! finishes by aggregating a re-export manifest from the written tree.
//!
//! The moving parts, leaves first:
//!
//! - [`Writer`] renders and writes staged files, skipping byte-identical
//!   rewrites so regeneration is idempotent.
//! - [`RouteTableBuilder`] recomputes the convention route table each cycle.
//! - [`Orchestrator::run_cycle`] drives the fixed generation sequence and
//!   fires the `onGenerateFiles` event.
//! - [`ExportAggregator`] runs at the finalize stage and emits the single
//!   `exports.ts` manifest.
//! - [`CycleRunner`] guarantees one cycle at a time, coalescing triggers
//!   that arrive mid-cycle.
//!
//! The library emits `tracing` events; hosts install their own subscriber or
//! use the helpers in [`logging`].

pub mod config;
pub mod context;
pub mod cycle;
pub mod error;
pub mod exports;
pub mod extract;
pub mod generate;
pub mod imports;
pub mod logging;
pub mod routes;
pub mod templates;
pub mod writer;

pub use config::{GenConfig, HistoryMode};
pub use context::GenContext;
pub use cycle::CycleRunner;
pub use error::{GenError, Result};
pub use exports::ExportAggregator;
pub use extract::{ExportParser, OxcExportParser};
pub use generate::{CycleReport, Orchestrator, keys, resolve_app_entry};
pub use imports::{ImportSpec, imports_to_source};
pub use routes::{
    ConventionScanner, RouteScanner, RouteTable, RouteTableBuilder, strip_internal_fields,
};
pub use writer::{FileSource, Placement, StagedFile, Writer, forward_slashes};

// Re-export the hook surface so hosts depend on one crate.
pub use weft_hooks::{ApplyKind, HookRegistry, Pipeline, Stage};

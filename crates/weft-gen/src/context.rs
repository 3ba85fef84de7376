//! Per-cycle generation context.
//!
//! All external paths are injected here at cycle start; nothing in the core
//! reads ambient process state (environment variables, current directory)
//! mid-cycle. The context is an immutable snapshot, created fresh for every
//! cycle and discarded after writing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::GenConfig;
use crate::routes::RouteTable;

/// Immutable snapshot of configuration and paths for one generation cycle.
///
/// The context is serializable so it can ride along as the extra argument of
/// hook invocations (finalize-stage consumers rebuild it from there).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenContext {
    /// Absolute path to the application source directory (holds `app.ts`
    /// and friends)
    pub src_path: PathBuf,
    /// Absolute path to the convention pages directory
    pub pages_path: PathBuf,
    /// Staging root all generated files are written under
    pub staging_path: PathBuf,
    /// Whether application sources live under a nested `src/` directory
    pub has_src_dir: bool,
    /// Default renderer package directory (seed for `modifyRendererPath`)
    pub renderer_dir: PathBuf,
    /// Runtime-plugin support module parsed by the export aggregator
    pub runtime_plugin_module: PathBuf,
    /// First generation cycle: may reuse `initial_routes` instead of
    /// recomputing the route table
    pub first_cycle: bool,
    /// Precomputed route table supplied by an external collaborator,
    /// consumed only when `first_cycle` is set
    pub initial_routes: Option<RouteTable>,
    /// Static configuration values interpolated into generated source
    pub config: GenConfig,
}

impl GenContext {
    /// Name of the pages directory used for component import prefixes:
    /// the configured convention base wins over the scanned pages path.
    pub fn pages_dir_name(&self) -> String {
        let base = self
            .config
            .convention_routes_base
            .as_deref()
            .unwrap_or(&self.pages_path);
        base.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pages".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> GenContext {
        GenContext {
            src_path: "/proj/src".into(),
            pages_path: "/proj/src/pages".into(),
            staging_path: "/proj/.weft".into(),
            has_src_dir: true,
            renderer_dir: "/proj/node_modules/renderer".into(),
            runtime_plugin_module: "/proj/node_modules/weft/client/plugin.js".into(),
            first_cycle: false,
            initial_routes: None,
            config: GenConfig::default(),
        }
    }

    #[test]
    fn pages_dir_name_from_pages_path() {
        assert_eq!(context().pages_dir_name(), "pages");
    }

    #[test]
    fn pages_dir_name_prefers_convention_base() {
        let mut ctx = context();
        ctx.config.convention_routes_base = Some("/proj/src/views".into());
        assert_eq!(ctx.pages_dir_name(), "views");
    }

    #[test]
    fn round_trips_through_json() {
        let ctx = context();
        let value = serde_json::to_value(&ctx).unwrap();
        let back: GenContext = serde_json::from_value(value).unwrap();
        assert_eq!(back.staging_path, ctx.staging_path);
        assert!(!back.first_cycle);
    }
}

//! Generation orchestrator: drives one full generation cycle.
//!
//! A cycle pulls contributions through the hook pipeline, renders and writes
//! the staged modules in a fixed order, then fires the `onGenerateFiles`
//! event so extensions write their own files and the finalize stage (export
//! aggregation) observes the completed tree. Any error aborts the remainder
//! of the cycle; files already written stay on disk.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::{debug, info};
use weft_hooks::{ApplyKind, Pipeline};

use crate::context::GenContext;
use crate::error::{GenError, Result};
use crate::imports::imports_to_source;
use crate::routes::{RouteTableBuilder, route_components, serialize_routes, strip_internal_fields};
use crate::templates;
use crate::writer::{StagedFile, Writer, forward_slashes};

/// Hook keys exposed to extension authors.
pub mod keys {
    /// Reducer: overrides the renderer/runtime base path
    pub const MODIFY_RENDERER_PATH: &str = "modifyRendererPath";
    /// Collector: trailing entry code fragments
    pub const ADD_ENTRY_CODE: &str = "addEntryCode";
    /// Collector: leading entry code fragments
    pub const ADD_ENTRY_CODE_AHEAD: &str = "addEntryCodeAhead";
    /// Collector: polyfill import specifiers
    pub const ADD_POLYFILL_IMPORTS: &str = "addPolyfillImports";
    /// Collector: leading import specifiers
    pub const ADD_ENTRY_IMPORTS_AHEAD: &str = "addEntryImportsAhead";
    /// Collector: entry import specifiers
    pub const ADD_ENTRY_IMPORTS: &str = "addEntryImports";
    /// Collector (truncated to one): runtime plugin module path
    pub const ADD_RUNTIME_PLUGIN: &str = "addRuntimePlugin";
    /// Collector: supported runtime hook method names
    pub const ADD_RUNTIME_PLUGIN_KEY: &str = "addRuntimePluginKey";
    /// Ordered event fired once per cycle after the core modules are staged
    pub const ON_GENERATE_FILES: &str = "onGenerateFiles";
}

/// Built-in runtime hook method names seeding `addRuntimePluginKey`.
const RUNTIME_PLUGIN_KEYS: [&str; 9] = [
    "patchRoutes",
    "rootContainer",
    "innerProvider",
    "i18nProvider",
    "accessProvider",
    "dataflowProvider",
    "outerProvider",
    "render",
    "onRouteChange",
];

/// Default app-entry file names, probed in this fixed order.
const APP_ENTRY_CANDIDATES: [&str; 4] = ["app.ts", "app.tsx", "app.jsx", "app.js"];

/// Placeholder route wrapper, written verbatim.
const EMPTY_ROUTE: &str = "import { Outlet } from 'weft';
export default function EmptyRoute() {
  return <Outlet />;
}
";

/// What one cycle did to the staging tree (orchestrator-written files only;
/// extension writes go through their own [`Writer`] calls).
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Files whose content changed and hit the disk
    pub written: Vec<String>,
    /// Files skipped because their content was already byte-identical
    pub skipped: Vec<String>,
}

impl CycleReport {
    fn record(&mut self, path: &str, wrote: bool) {
        if wrote {
            self.written.push(path.to_string());
        } else {
            self.skipped.push(path.to_string());
        }
    }
}

/// Drives generation cycles against a frozen hook pipeline.
pub struct Orchestrator {
    pipeline: Pipeline,
    routes: RouteTableBuilder,
}

impl Orchestrator {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            routes: RouteTableBuilder::default(),
        }
    }

    /// Substitute the route table builder (tests, alternative conventions).
    pub fn with_route_builder(pipeline: Pipeline, routes: RouteTableBuilder) -> Self {
        Self { pipeline, routes }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run one full generation cycle.
    ///
    /// Steps run in a fixed, order-significant sequence; the final
    /// `onGenerateFiles` event lets extensions contribute files before the
    /// finalize stage aggregates the manifest.
    pub async fn run_cycle(&self, ctx: &GenContext) -> Result<CycleReport> {
        info!(staging = %ctx.staging_path.display(), first_cycle = ctx.first_cycle, "generation cycle start");
        let writer = Writer::new(&ctx.staging_path)?;
        let mut report = CycleReport::default();

        let renderer_path = self.renderer_path(ctx).await?;

        // weft.ts
        let entry = self.entry_file(ctx, &renderer_path).await?;
        report.record(&entry.path, writer.write(&entry)?);

        // core/EmptyRoute.tsx
        let empty = StagedFile::shared("core/EmptyRoute.tsx", EMPTY_ROUTE);
        report.record(&empty.path, writer.write(&empty)?);

        // core/route.tsx
        let route = self.route_file(ctx).await?;
        report.record(&route.path, writer.write(&route)?);

        // core/plugin.ts
        let plugin = self.plugin_file(ctx).await?;
        report.record(&plugin.path, writer.write(&plugin)?);

        // core/history.ts
        let history = StagedFile::templated(
            "core/history.ts",
            templates::HISTORY_TPL,
            json!({ "renderer_path": renderer_path }),
        );
        report.record(&history.path, writer.write(&history)?);

        let ctx_value = serde_json::to_value(ctx)
            .map_err(|e| GenError::serialization("generation context", e.to_string()))?;
        self.pipeline
            .fire(keys::ON_GENERATE_FILES, Some(ctx_value))
            .await?;

        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            "generation cycle complete"
        );
        Ok(report)
    }

    /// Step 1: resolve the renderer base path through the reducer hook,
    /// seeded with the context's default renderer directory.
    async fn renderer_path(&self, ctx: &GenContext) -> Result<String> {
        let resolved = self
            .pipeline
            .apply(
                keys::MODIFY_RENDERER_PATH,
                ApplyKind::Reducer,
                json!(forward_slashes(&ctx.renderer_dir)),
                None,
            )
            .await?;
        resolved
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| GenError::serialization("renderer path", "expected a string"))
    }

    /// Step 2: assemble the entry module from contributed fragments.
    async fn entry_file(&self, ctx: &GenContext, renderer_path: &str) -> Result<StagedFile> {
        let entry_code = self.collect_lines(keys::ADD_ENTRY_CODE).await?.join("\n");
        let entry_code_ahead = self
            .collect_lines(keys::ADD_ENTRY_CODE_AHEAD)
            .await?
            .join("\n");
        let polyfill_imports = self.collect_imports(keys::ADD_POLYFILL_IMPORTS).await?;
        let imports_ahead = self.collect_imports(keys::ADD_ENTRY_IMPORTS_AHEAD).await?;
        let imports = self.collect_imports(keys::ADD_ENTRY_IMPORTS).await?;

        Ok(StagedFile::templated(
            "weft.ts",
            templates::ENTRY_TPL,
            json!({
                "mount_element_id": ctx.config.mount_element_id,
                "base": ctx.config.base,
                "history_type": ctx.config.history.as_str(),
                "renderer_path": renderer_path,
                "entry_code": entry_code,
                "entry_code_ahead": entry_code_ahead,
                "polyfill_imports": polyfill_imports,
                "imports_ahead": imports_ahead,
                "imports": imports,
            }),
        ))
    }

    /// Step 4: obtain, strip, and serialize the route table.
    ///
    /// The first cycle may reuse a table precomputed by an external
    /// collaborator; every later cycle recomputes from the convention scan.
    async fn route_file(&self, ctx: &GenContext) -> Result<StagedFile> {
        let table = match (ctx.first_cycle, &ctx.initial_routes) {
            (true, Some(table)) => table.clone(),
            _ => self.routes.build(ctx).await?,
        };

        let pages = ctx.pages_dir_name();
        let prefix = if ctx.has_src_dir {
            format!("../../../src/{pages}/")
        } else {
            format!("../../{pages}/")
        };

        let stripped = strip_internal_fields(&table);
        debug!(routes = table.len(), %prefix, "route table serialized");
        Ok(StagedFile::templated(
            "core/route.tsx",
            templates::ROUTE_TPL,
            json!({
                "routes": serialize_routes(&stripped)?,
                "route_components": route_components(&table, &prefix),
            }),
        ))
    }

    /// Step 5: resolve the runtime plugin entry and supported hook names.
    async fn plugin_file(&self, ctx: &GenContext) -> Result<StagedFile> {
        let seed: Vec<Value> = resolve_app_entry(&ctx.src_path)
            .map(|path| json!(forward_slashes(&path)))
            .into_iter()
            .collect();

        let merged = self
            .pipeline
            .apply(
                keys::ADD_RUNTIME_PLUGIN,
                ApplyKind::Collector,
                Value::Array(seed),
                None,
            )
            .await?;

        // Only a single runtime plugin module is supported; the merged
        // result is truncated to its first entry.
        let plugins: Vec<Value> = merged
            .as_array()
            .and_then(|entries| entries.first())
            .and_then(Value::as_str)
            .map(|path| json!({ "index": 0, "path": forward_slashes(Path::new(path)) }))
            .into_iter()
            .collect();

        let valid_keys = self
            .pipeline
            .apply(
                keys::ADD_RUNTIME_PLUGIN_KEY,
                ApplyKind::Collector,
                json!(RUNTIME_PLUGIN_KEYS),
                None,
            )
            .await?;

        Ok(StagedFile::templated(
            "core/plugin.ts",
            templates::PLUGIN_TPL,
            json!({
                "plugins": plugins,
                "valid_keys": serde_json::to_string(&valid_keys)
                    .map_err(|e| GenError::serialization("runtime plugin keys", e.to_string()))?,
            }),
        ))
    }

    async fn collect_lines(&self, key: &str) -> Result<Vec<String>> {
        let collected = self
            .pipeline
            .apply(key, ApplyKind::Collector, json!([]), None)
            .await?;
        let Value::Array(items) = collected else {
            unreachable!("collector apply always yields a sequence");
        };
        items
            .into_iter()
            .map(|item| {
                item.as_str().map(str::to_owned).ok_or_else(|| {
                    GenError::serialization(format!("'{key}' contribution"), "expected a string")
                })
            })
            .collect()
    }

    async fn collect_imports(&self, key: &str) -> Result<String> {
        let collected = self
            .pipeline
            .apply(key, ApplyKind::Collector, json!([]), None)
            .await?;
        let Value::Array(items) = collected else {
            unreachable!("collector apply always yields a sequence");
        };
        Ok(imports_to_source(&items)?.join("\n"))
    }
}

/// Probe the default app-entry candidates in fixed order, keeping only the
/// first match.
pub fn resolve_app_entry(src_path: &Path) -> Option<PathBuf> {
    APP_ENTRY_CANDIDATES
        .iter()
        .map(|name| src_path.join(name))
        .find(|candidate| candidate.is_file())
}

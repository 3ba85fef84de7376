//! Export aggregation: the single manifest write of each cycle.
//!
//! Registered on `onGenerateFiles` at the finalize stage, so it runs after
//! every default-stage handler of the same cycle and observes the staged
//! tree those handlers produced, including plugin directories written by
//! other extensions.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use weft_hooks::{HookRegistry, Stage};

use crate::context::GenContext;
use crate::error::{GenError, Result};
use crate::extract::ExportParser;
use crate::generate::keys;
use crate::writer::{StagedFile, Writer, forward_slashes};

/// Naming convention for contributed plugin directories.
const PLUGIN_DIR_PREFIX: &str = "plugin-";

/// Aggregates re-exports from the written staging tree into `exports.ts`.
pub struct ExportAggregator;

impl ExportAggregator {
    /// Register the aggregator as a finalize-stage `onGenerateFiles` hook.
    ///
    /// The generation context rides along as the event's extra argument;
    /// the aggregator never reads ambient process state.
    pub fn install(registry: &mut HookRegistry, parser: Arc<dyn ExportParser>) {
        registry.register(keys::ON_GENERATE_FILES, Stage::Finalize, move |_, extra| {
            let parser = Arc::clone(&parser);
            async move {
                let extra = extra.ok_or("export aggregation requires the generation context")?;
                let ctx: GenContext = serde_json::from_value(extra)?;
                aggregate(&ctx, parser.as_ref()).await?;
                Ok(None)
            }
        });
    }
}

/// Build and write the manifest.
///
/// Processing order is fixed: renderer bundle, runtime-plugin support
/// module, history module, then contributed plugin directories sorted by
/// name. Each block is a comment line identifying the origin followed by one
/// re-export statement.
///
/// # Errors
///
/// Failure to parse the renderer bundle or the support module is fatal for
/// the cycle (required modules), and so is failure to parse a discovered
/// plugin's entry file: a silently dropped export list would silently drop
/// functionality. A plugin entry that parses but exports nothing is simply
/// skipped.
pub async fn aggregate(ctx: &GenContext, parser: &dyn ExportParser) -> Result<()> {
    let writer = Writer::new(&ctx.staging_path)?;
    let mut lines: Vec<String> = Vec::new();

    // Renderer bundle
    let renderer_origin = forward_slashes(&ctx.renderer_dir);
    let bundle = ctx.renderer_dir.join("dist/index.js");
    let names = parser.exports_of(&bundle).await?;
    lines.push(format!("// {renderer_origin}"));
    lines.push(reexport(&names, &renderer_origin));

    // Runtime-plugin support module
    let support_origin = forward_slashes(&ctx.runtime_plugin_module);
    let names = parser.exports_of(&ctx.runtime_plugin_module).await?;
    lines.push(format!("// {support_origin}"));
    lines.push(reexport(&names, &support_origin));

    // History module written earlier this cycle
    lines.push("// ./core/history".into());
    lines.push("export { history, createHistory } from './core/history';".into());

    // Contributed plugin directories
    for (name, entry) in discover_plugin_dirs(&ctx.staging_path)? {
        let names = parser.exports_of(&entry).await?;
        if names.is_empty() {
            debug!(plugin = %name, "plugin entry exports nothing, no manifest block");
            continue;
        }
        let origin = forward_slashes(&ctx.staging_path.join(&name));
        lines.push(format!("// {name}"));
        lines.push(reexport(&names, &origin));
    }

    let manifest = StagedFile::shared("exports.ts", lines.join("\n") + "\n");
    writer.write(&manifest)?;
    Ok(())
}

fn reexport(names: &[String], origin: &str) -> String {
    format!("export {{ {} }} from '{origin}';", names.join(", "))
}

/// Discover contributed plugin directories under the staging root.
///
/// Directories must match the `plugin-` prefix and contain an entry file.
/// The entry lookup checks `index.ts` first and `index.tsx` second; when
/// both exist the `.tsx` match overrides the earlier one. Results are sorted
/// by directory name so the manifest is deterministic regardless of
/// underlying directory-listing order.
fn discover_plugin_dirs(staging: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(staging).map_err(|e| GenError::io(staging, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GenError::io(staging, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(PLUGIN_DIR_PREFIX) || !entry.path().is_dir() {
            continue;
        }

        let mut file = None;
        let ts = entry.path().join("index.ts");
        if ts.is_file() {
            file = Some(ts);
        }
        let tsx = entry.path().join("index.tsx");
        if tsx.is_file() {
            file = Some(tsx);
        }

        if let Some(file) = file {
            found.push((name, file));
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

//! Route table construction and serialization.
//!
//! The route table maps route ids to route descriptors in insertion order;
//! that order is what keeps the generated route module reproducible
//! byte-for-byte across runs with unchanged inputs. Descriptors may carry
//! internal bookkeeping fields under a reserved `__` prefix; those are
//! stripped before anything is serialized into generated source.

use std::path::Path;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::debug;
use walkdir::WalkDir;

use crate::context::GenContext;
use crate::error::{GenError, Result};
use crate::writer::forward_slashes;

/// Reserved prefix for internal route fields; never leaked into output.
pub const INTERNAL_FIELD_PREFIX: &str = "__";

/// Route id → route descriptor, in insertion order.
pub type RouteTable = IndexMap<String, Value>;

/// Scans the file-convention route sources for a cycle.
///
/// Injectable collaborator: the default implementation walks the pages
/// directory, but hosts can substitute their own scan (tests use fixed
/// tables).
#[async_trait]
pub trait RouteScanner: Send + Sync {
    async fn scan(&self, ctx: &GenContext) -> Result<RouteTable>;
}

/// Default scanner: walks the convention pages directory in sorted order.
///
/// `index.tsx` maps to `/`, nested files to nested paths, and `[param]`
/// segments to `:param`. Deterministic given identical inputs: entries are
/// visited in per-directory sorted file-name order.
pub struct ConventionScanner;

#[async_trait]
impl RouteScanner for ConventionScanner {
    async fn scan(&self, ctx: &GenContext) -> Result<RouteTable> {
        let root = ctx
            .config
            .convention_routes_base
            .as_deref()
            .unwrap_or(&ctx.pages_path);

        let mut table = RouteTable::new();
        if !root.exists() {
            debug!(root = %root.display(), "pages directory missing, empty route table");
            return Ok(table);
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| GenError::io(root, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !matches!(ext, "ts" | "tsx" | "js" | "jsx") {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(root)
                .expect("walked entries live under the walk root");
            let id = route_id(rel);
            let node = json!({
                "id": id,
                "path": route_path(&id),
                "file": forward_slashes(rel),
                "parentId": Value::Null,
                "__absFile": forward_slashes(entry.path()),
            });
            table.insert(id, node);
        }

        debug!(routes = table.len(), "convention route scan complete");
        Ok(table)
    }
}

/// Builds the route table for a cycle through the configured scanner.
pub struct RouteTableBuilder {
    scanner: Box<dyn RouteScanner>,
}

impl RouteTableBuilder {
    pub fn new(scanner: Box<dyn RouteScanner>) -> Self {
        Self { scanner }
    }

    /// Recompute the full route table from the current file-convention scan.
    pub async fn build(&self, ctx: &GenContext) -> Result<RouteTable> {
        self.scanner.scan(ctx).await
    }
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self::new(Box::new(ConventionScanner))
    }
}

/// Route id for a path relative to the pages root: extension dropped,
/// forward slashes.
fn route_id(rel: &Path) -> String {
    forward_slashes(&rel.with_extension(""))
}

/// URL path for a route id: trailing `index` collapses, `[param]` segments
/// become `:param`.
fn route_path(id: &str) -> String {
    let mut segments: Vec<&str> = id.split('/').collect();
    if segments.last() == Some(&"index") {
        segments.pop();
    }
    let mapped: Vec<String> = segments
        .iter()
        .map(|seg| {
            if let Some(param) = seg.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                format!(":{param}")
            } else {
                (*seg).to_string()
            }
        })
        .collect();
    format!("/{}", mapped.join("/"))
}

/// Remove internal-prefixed fields from every route descriptor, one level
/// deep per route id. Idempotent: stripping an already-stripped table is a
/// no-op.
pub fn strip_internal_fields(table: &RouteTable) -> RouteTable {
    table
        .iter()
        .map(|(id, node)| {
            let node = match node {
                Value::Object(fields) => Value::Object(
                    fields
                        .iter()
                        .filter(|(key, _)| !key.starts_with(INTERNAL_FIELD_PREFIX))
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect(),
                ),
                other => other.clone(),
            };
            (id.clone(), node)
        })
        .collect()
}

/// Serialize a route table with stable key ordering (insertion order).
pub fn serialize_routes(table: &RouteTable) -> Result<String> {
    serde_json::to_string(table)
        .map_err(|e| GenError::serialization("route table", e.to_string()))
}

/// Per-route component-loading expressions as a single object literal.
///
/// Routes with a `file` field get a lazy import through `prefix`; routes
/// without one fall back to the placeholder route wrapper.
pub fn route_components(table: &RouteTable, prefix: &str) -> String {
    let mut out = String::from("{\n");
    for (id, node) in table {
        let expr = match node.get("file").and_then(Value::as_str) {
            Some(file) if !file.is_empty() => {
                format!("() => import('{prefix}{file}')")
            }
            _ => "() => import('./EmptyRoute')".to_string(),
        };
        out.push_str(&format!("  '{id}': {expr},\n"));
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenConfig;

    fn context(pages: &Path) -> GenContext {
        GenContext {
            src_path: pages.parent().unwrap().to_path_buf(),
            pages_path: pages.to_path_buf(),
            staging_path: pages.parent().unwrap().join(".weft"),
            has_src_dir: false,
            renderer_dir: "/renderer".into(),
            runtime_plugin_module: "/runtime/plugin.js".into(),
            first_cycle: false,
            initial_routes: None,
            config: GenConfig::default(),
        }
    }

    #[test]
    fn route_paths_collapse_index_and_map_params() {
        assert_eq!(route_path("index"), "/");
        assert_eq!(route_path("users/index"), "/users");
        assert_eq!(route_path("users/profile"), "/users/profile");
        assert_eq!(route_path("users/[id]"), "/users/:id");
    }

    #[test]
    fn stripping_internal_fields_is_idempotent() {
        let mut table = RouteTable::new();
        table.insert(
            "index".into(),
            json!({ "id": "index", "path": "/", "__absFile": "/proj/pages/index.tsx" }),
        );

        let stripped = strip_internal_fields(&table);
        assert_eq!(
            stripped["index"],
            json!({ "id": "index", "path": "/" })
        );

        let twice = strip_internal_fields(&stripped);
        assert_eq!(twice, stripped);
    }

    #[test]
    fn serialization_preserves_insertion_order() {
        let mut table = RouteTable::new();
        table.insert("zebra".into(), json!({ "id": "zebra" }));
        table.insert("alpha".into(), json!({ "id": "alpha" }));

        let text = serialize_routes(&table).unwrap();
        assert!(text.find("zebra").unwrap() < text.find("alpha").unwrap());
    }

    #[test]
    fn components_use_prefix_and_placeholder() {
        let mut table = RouteTable::new();
        table.insert("index".into(), json!({ "id": "index", "file": "index.tsx" }));
        table.insert("layout".into(), json!({ "id": "layout" }));

        let out = route_components(&table, "../../pages/");
        assert!(out.contains("'index': () => import('../../pages/index.tsx')"));
        assert!(out.contains("'layout': () => import('./EmptyRoute')"));
    }

    #[tokio::test]
    async fn convention_scan_is_sorted_and_complete() {
        let dir = tempfile::tempdir().unwrap();
        let pages = dir.path().join("pages");
        std::fs::create_dir_all(pages.join("users")).unwrap();
        std::fs::write(pages.join("index.tsx"), "export default () => null;").unwrap();
        std::fs::write(pages.join("about.tsx"), "export default () => null;").unwrap();
        std::fs::write(pages.join("users/[id].tsx"), "export default () => null;").unwrap();
        std::fs::write(pages.join("notes.txt"), "not a route").unwrap();

        let table = ConventionScanner.scan(&context(&pages)).await.unwrap();
        let ids: Vec<&String> = table.keys().collect();
        assert_eq!(ids, ["about", "index", "users/[id]"]);
        assert_eq!(table["users/[id]"]["path"], json!("/users/:id"));
        assert!(
            table["index"]["__absFile"]
                .as_str()
                .unwrap()
                .ends_with("pages/index.tsx")
        );
    }

    #[tokio::test]
    async fn missing_pages_dir_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = ConventionScanner
            .scan(&context(&dir.path().join("pages")))
            .await
            .unwrap();
        assert!(table.is_empty());
    }
}

//! Static export extraction.
//!
//! Discovers a module's exported identifiers by parsing its source, never by
//! executing it. The parser sits behind a trait so hosts and tests can swap
//! it out.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPatternKind, Declaration, ModuleDeclaration, ModuleExportName,
};
use oxc_parser::Parser;
use oxc_span::SourceType;
use tracing::trace;

use crate::error::{GenError, Result};

/// Yields a module's exported-identifier list without executing it.
#[async_trait]
pub trait ExportParser: Send + Sync {
    /// Exported identifiers of the module at `path`, in source order.
    /// A default export is reported as `default`.
    ///
    /// # Errors
    ///
    /// Missing files are resolution failures; syntax the parser cannot
    /// interpret is a parse failure. Both abort the generation cycle.
    async fn exports_of(&self, path: &Path) -> Result<Vec<String>>;
}

/// Default parser built on the OXC toolchain.
pub struct OxcExportParser;

#[async_trait]
impl ExportParser for OxcExportParser {
    async fn exports_of(&self, path: &Path) -> Result<Vec<String>> {
        if !path.is_file() {
            return Err(GenError::Resolution {
                path: path.to_path_buf(),
            });
        }
        let source = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs());

        let names = parse_export_names(&source, source_type)
            .map_err(|reason| GenError::parse(path, reason))?;
        trace!(path = %path.display(), exports = names.len(), "extracted exports");
        Ok(names)
    }
}

/// Parse source text and collect top-level exported identifiers.
fn parse_export_names(
    source: &str,
    source_type: SourceType,
) -> std::result::Result<Vec<String>, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
        let reasons: Vec<String> = parsed.errors.iter().map(|e| format!("{e:?}")).collect();
        return Err(reasons.join(", "));
    }

    let mut names = Vec::new();
    for stmt in parsed.program.body.iter() {
        let Some(module_decl) = stmt.as_module_declaration() else {
            continue;
        };
        match module_decl {
            ModuleDeclaration::ExportDefaultDeclaration(_) => {
                names.push("default".to_string());
            }
            ModuleDeclaration::ExportNamedDeclaration(named) => {
                for spec in &named.specifiers {
                    names.push(export_name(&spec.exported));
                }
                if let Some(decl) = &named.declaration {
                    match decl {
                        Declaration::FunctionDeclaration(func) => {
                            if let Some(id) = &func.id {
                                names.push(id.name.to_string());
                            }
                        }
                        Declaration::ClassDeclaration(class) => {
                            if let Some(id) = &class.id {
                                names.push(id.name.to_string());
                            }
                        }
                        Declaration::VariableDeclaration(var) => {
                            for decl in &var.declarations {
                                if let BindingPatternKind::BindingIdentifier(ident) = &decl.id.kind
                                {
                                    names.push(ident.name.to_string());
                                }
                            }
                        }
                        // Type-only declarations have no runtime binding.
                        _ => {}
                    }
                }
            }
            // `export * from ...` cannot be enumerated without resolving
            // the target module; skipped.
            ModuleDeclaration::ExportAllDeclaration(_) => {}
            _ => {}
        }
    }
    Ok(names)
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exports(name: &str, source: &str) -> Result<Vec<String>> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, source).unwrap();
        OxcExportParser.exports_of(&path).await
    }

    #[tokio::test]
    async fn collects_declaration_exports_in_source_order() {
        let names = exports(
            "mod.ts",
            "export function render() {}\n\
             export const history = 1, basename = '/';\n\
             export class Router {}\n\
             export default render;\n",
        )
        .await
        .unwrap();
        assert_eq!(names, ["render", "history", "basename", "Router", "default"]);
    }

    #[tokio::test]
    async fn collects_specifier_and_reexport_names() {
        let names = exports(
            "mod.ts",
            "const a = 1;\nconst b = 2;\nexport { a, b as renamed };\nexport { c } from './other';\n",
        )
        .await
        .unwrap();
        assert_eq!(names, ["a", "renamed", "c"]);
    }

    #[tokio::test]
    async fn module_without_exports_yields_empty_list() {
        let names = exports("mod.ts", "const internal = 1;\nconsole.log(internal);\n")
            .await
            .unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn tsx_source_parses_by_extension() {
        let names = exports(
            "mod.tsx",
            "export default function Page() { return <div>hi</div>; }\n",
        )
        .await
        .unwrap();
        assert_eq!(names, ["default"]);
    }

    #[tokio::test]
    async fn syntax_error_is_a_parse_failure() {
        let err = exports("mod.ts", "export const = ;").await.unwrap_err();
        assert!(matches!(err, GenError::Parse { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_a_resolution_failure() {
        let err = OxcExportParser
            .exports_of(Path::new("/nonexistent/mod.ts"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenError::Resolution { .. }));
    }
}

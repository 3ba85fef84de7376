//! Staged file writing with path containment and idempotent short-circuits.
//!
//! Every generated file goes through [`Writer::write`]: templated sources are
//! rendered first, the target path is validated to stay inside the staging
//! root, and the write is skipped entirely when the new content is
//! byte-identical to what is already on disk. The skip is what makes
//! regeneration safe to run on every file-change event: a second cycle with
//! unchanged inputs performs zero writes.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tracing::debug;

use crate::error::{GenError, Result};
use crate::templates::TemplateEnv;

/// Where a staged file lands relative to the staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Written directly under the staging root
    Shared,
    /// Written under the extension's own `plugin-<name>/` namespace
    PluginDir(String),
}

/// Source of a staged file's content.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Literal content, written as-is
    Content(String),
    /// Rendered from a registered template with the given context
    Template {
        name: &'static str,
        context: serde_json::Value,
    },
}

/// Descriptor for one generated file. Created fresh per cycle and discarded
/// after writing.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Path relative to the placement root, forward slashes
    pub path: String,
    pub source: FileSource,
    pub placement: Placement,
}

impl StagedFile {
    /// Shorthand for a literal shared-root file.
    pub fn shared(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: FileSource::Content(content.into()),
            placement: Placement::Shared,
        }
    }

    /// Shorthand for a templated shared-root file.
    pub fn templated(
        path: impl Into<String>,
        name: &'static str,
        context: serde_json::Value,
    ) -> Self {
        Self {
            path: path.into(),
            source: FileSource::Template { name, context },
            placement: Placement::Shared,
        }
    }
}

/// Writes staged files under a single staging root.
pub struct Writer {
    staging_root: PathBuf,
    templates: TemplateEnv,
}

impl Writer {
    pub fn new(staging_root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            staging_root: staging_root.into().clean(),
            templates: TemplateEnv::new()?,
        })
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    /// Render (if templated) and write a staged file.
    ///
    /// Returns `true` when bytes hit the disk and `false` when the existing
    /// file already had identical content and the write was skipped.
    ///
    /// # Errors
    ///
    /// Fails when the path escapes the staging root, the template cannot be
    /// rendered, or an I/O operation fails.
    pub fn write(&self, file: &StagedFile) -> Result<bool> {
        let content = match &file.source {
            FileSource::Content(content) => content.clone(),
            FileSource::Template { name, context } => self.templates.render(name, context)?,
        };

        let target = self.resolve(file)?;

        // Idempotent short-circuit: skip only when the new content is
        // byte-identical to what already exists.
        if let Ok(existing) = fs::read(&target) {
            if existing == content.as_bytes() {
                debug!(path = %target.display(), "staged file unchanged, skipping write");
                return Ok(false);
            }
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
        }
        fs::write(&target, &content).map_err(|e| GenError::io(&target, e))?;
        debug!(path = %target.display(), bytes = content.len(), "staged file written");
        Ok(true)
    }

    /// Resolve a staged file to an absolute path, enforcing that the cleaned
    /// result stays under the staging root (no `..` escapes).
    fn resolve(&self, file: &StagedFile) -> Result<PathBuf> {
        if file.path.contains('\0') {
            return Err(GenError::InvalidStagingPath {
                path: file.path.clone(),
            });
        }

        let base = match &file.placement {
            Placement::Shared => self.staging_root.clone(),
            Placement::PluginDir(name) => self.staging_root.join(format!("plugin-{name}")),
        };

        let full = base.join(Path::new(&file.path)).clean();
        if !full.starts_with(&self.staging_root) {
            return Err(GenError::InvalidStagingPath {
                path: file.path.clone(),
            });
        }
        Ok(full)
    }
}

/// Normalize a path into platform-independent textual form (forward
/// slashes), suitable for embedding in generated source that must resolve
/// on any target platform.
pub fn forward_slashes(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text.contains('\\') {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}

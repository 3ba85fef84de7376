//! Generation configuration.
//!
//! Schema validation of the host configuration is out of scope at this
//! boundary; this module only carries the handful of values interpolated
//! into generated modules, loaded from `weft.toml` plus `WEFT_`-prefixed
//! environment overrides.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// History implementation the generated entry module boots with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    #[default]
    Browser,
    Hash,
    Memory,
}

impl HistoryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryMode::Browser => "browser",
            HistoryMode::Hash => "hash",
            HistoryMode::Memory => "memory",
        }
    }
}

/// Static configuration interpolated into generated source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// DOM element id the generated entry mounts into
    pub mount_element_id: String,
    /// Application base path
    pub base: String,
    /// History mode for the generated bootstrap
    pub history: HistoryMode,
    /// Overrides the convention pages directory used for route scanning
    pub convention_routes_base: Option<PathBuf>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            mount_element_id: "root".into(),
            base: "/".into(),
            history: HistoryMode::Browser,
            convention_routes_base: None,
        }
    }
}

impl GenConfig {
    /// Load configuration from `<root>/weft.toml` merged with `WEFT_` env
    /// variables. Missing file means defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let config = Figment::new()
            .merge(Toml::file(root.join("weft.toml")))
            .merge(Env::prefixed("WEFT_"))
            .extract()
            .map_err(Box::new)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GenConfig::default();
        assert_eq!(config.mount_element_id, "root");
        assert_eq!(config.base, "/");
        assert_eq!(config.history, HistoryMode::Browser);
        assert!(config.convention_routes_base.is_none());
    }

    #[test]
    fn load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("weft.toml"),
            "mount_element_id = \"app\"\nbase = \"/admin/\"\nhistory = \"hash\"\n",
        )
        .unwrap();

        let config = GenConfig::load(dir.path()).unwrap();
        assert_eq!(config.mount_element_id, "app");
        assert_eq!(config.base, "/admin/");
        assert_eq!(config.history, HistoryMode::Hash);
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenConfig::load(dir.path()).unwrap();
        assert_eq!(config.base, "/");
    }
}

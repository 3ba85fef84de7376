//! Rendering of contributed import specifiers into source text.
//!
//! Collector hooks contribute imports as JSON values: either a bare string
//! (side-effect import) or an object with `source`, optional default
//! `specifier`, and optional `named` bindings. Rendering is deterministic in
//! contribution order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GenError, Result};

/// One contributed import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Module specifier to import from
    pub source: String,
    /// Default import binding, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifier: Option<String>,
    /// Named bindings, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub named: Vec<String>,
}

impl ImportSpec {
    fn render(&self) -> String {
        let mut bindings = Vec::new();
        if let Some(specifier) = &self.specifier {
            bindings.push(specifier.clone());
        }
        if !self.named.is_empty() {
            bindings.push(format!("{{ {} }}", self.named.join(", ")));
        }

        if bindings.is_empty() {
            format!("import '{}';", self.source)
        } else {
            format!("import {} from '{}';", bindings.join(", "), self.source)
        }
    }
}

/// Render contributed import values into one import statement per line.
///
/// # Errors
///
/// Returns a serialization error for contributions that are neither strings
/// nor import-spec objects.
pub fn imports_to_source(values: &[Value]) -> Result<Vec<String>> {
    values
        .iter()
        .map(|value| match value {
            Value::String(source) => Ok(format!("import '{source}';")),
            Value::Object(_) => {
                let spec: ImportSpec = serde_json::from_value(value.clone())
                    .map_err(|e| GenError::serialization("import contribution", e.to_string()))?;
                Ok(spec.render())
            }
            other => Err(GenError::serialization(
                "import contribution",
                format!("expected string or object, got {other}"),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_bare_and_bound_imports() {
        let lines = imports_to_source(&[
            json!("core-js/stable"),
            json!({ "source": "react", "specifier": "React" }),
            json!({ "source": "weft", "named": ["useModel", "useAccess"] }),
            json!({ "source": "antd", "specifier": "antd", "named": ["Button"] }),
        ])
        .unwrap();

        assert_eq!(
            lines,
            vec![
                "import 'core-js/stable';",
                "import React from 'react';",
                "import { useModel, useAccess } from 'weft';",
                "import antd, { Button } from 'antd';",
            ]
        );
    }

    #[test]
    fn object_without_bindings_is_side_effect_import() {
        let lines = imports_to_source(&[json!({ "source": "./global.css" })]).unwrap();
        assert_eq!(lines, vec!["import './global.css';"]);
    }

    #[test]
    fn rejects_non_import_contributions() {
        assert!(imports_to_source(&[json!(42)]).is_err());
        assert!(imports_to_source(&[json!({ "no_source": true })]).is_err());
    }
}

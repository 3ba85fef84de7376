//! Embedded template environment for generated modules.
//!
//! Templates ship inside the binary; there is no on-disk template directory
//! to resolve at runtime.

use minijinja::Environment;
use serde_json::Value;

use crate::error::Result;

/// Entry module template (`weft.ts`)
pub const ENTRY_TPL: &str = "entry.tpl";
/// Route table module template (`core/route.tsx`)
pub const ROUTE_TPL: &str = "route.tpl";
/// Runtime plugin registration template (`core/plugin.ts`)
pub const PLUGIN_TPL: &str = "plugin.tpl";
/// History bootstrap template (`core/history.ts`)
pub const HISTORY_TPL: &str = "history.tpl";

/// Template environment with all generated-module templates registered.
pub struct TemplateEnv {
    env: Environment<'static>,
}

impl TemplateEnv {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(ENTRY_TPL, include_str!("../templates/entry.tpl"))?;
        env.add_template(ROUTE_TPL, include_str!("../templates/route.tpl"))?;
        env.add_template(PLUGIN_TPL, include_str!("../templates/plugin.tpl"))?;
        env.add_template(HISTORY_TPL, include_str!("../templates/history.tpl"))?;
        Ok(Self { env })
    }

    /// Render a registered template with the given context.
    pub fn render(&self, name: &str, context: &Value) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_history_template() {
        let env = TemplateEnv::new().unwrap();
        let out = env
            .render(HISTORY_TPL, &json!({ "renderer_path": "/renderer" }))
            .unwrap();
        assert!(out.contains("from '/renderer'"));
        assert!(out.contains("export function createHistory"));
        assert!(out.contains("export { history }"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let env = TemplateEnv::new().unwrap();
        assert!(env.render("nope.tpl", &json!({})).is_err());
    }
}

//! Page templates embedded in the binary

use axum::response::Html;
use minijinja::Environment;
use rust_embed::RustEmbed;
use serde::Serialize;

use crate::error::{Error, Result};

#[derive(RustEmbed)]
#[folder = "templates/"]
struct TemplateFiles;

/// Template environment holding every page
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Load all embedded templates
    pub fn load() -> Result<Self> {
        let mut env = Environment::new();

        for name in TemplateFiles::iter() {
            let file = TemplateFiles::get(&name)
                .ok_or_else(|| Error::Other(format!("Missing embedded template {}", name)))?;
            let source = String::from_utf8(file.data.into_owned())
                .map_err(|e| Error::Other(format!("Template {} is not UTF-8: {}", name, e)))?;
            env.add_template_owned(name.to_string(), source)?;
        }

        Ok(Self { env })
    }

    /// Render a page with the given context
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(ctx)?))
    }
}

impl std::fmt::Debug for Pages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.env.templates().map(|(name, _)| name).collect();
        f.debug_struct("Pages").field("templates", &names).finish()
    }
}

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::{DataDocument, Error, Result};

const TEMPLATE_NAME: &str = "document";

/// Reads the template source text from disk.
pub async fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .map_err(|e| Error::TemplateRead {
            path: path.to_path_buf(),
            source: e,
        })
}

/// A template compiled once and executed once.
///
/// Undefined values are errors rather than empty substitutions, and every
/// substituted value is HTML-escaped.
pub struct CompiledTemplate<'source> {
    env: Environment<'source>,
}

impl<'source> CompiledTemplate<'source> {
    pub fn compile(source: &'source str) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_keep_trailing_newline(true);
        env.add_template(TEMPLATE_NAME, source)
            .map_err(Error::TemplateCompile)?;

        Ok(Self { env })
    }

    /// Executes the template against `data`. Consumes the template so a
    /// compiled program is only ever run once.
    pub fn render(self, data: &DataDocument) -> Result<Vec<u8>> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(Error::TemplateExec)?;
        let rendered = template.render(data).map_err(Error::TemplateExec)?;

        debug!("Rendered {} bytes of markup", rendered.len());
        Ok(rendered.into_bytes())
    }
}

use colored::*;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::browser::{BrowserEngine, BrowserSession};
use crate::{read_template, write_atomic, CompiledTemplate, Config, DataDocument, Error, Result};

/// Where a run writes its artifacts, derived from the data file's base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Rendered HTML, left on disk after the run.
    pub document: PathBuf,
    pub pdf: PathBuf,
}

impl OutputPaths {
    /// `<output_dir>/<stem>.html` and `<output_dir>/<stem>.pdf`, where `stem` is
    /// the data file name with its last extension removed.
    pub fn derive(data: &Path, output_dir: &Path) -> Result<Self> {
        let stem = data
            .file_stem()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidDataPath(data.to_path_buf()))?;

        let with_extension = |extension: &str| {
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(extension);
            output_dir.join(name)
        };

        Ok(Self {
            document: with_extension("html"),
            pdf: with_extension("pdf"),
        })
    }
}

/// Runs data → template → HTML file → browser → PDF, stopping at the first
/// failure. Browser resources acquired before a failure are still released.
pub struct Converter<E> {
    config: Config,
    engine: E,
}

impl<E: BrowserEngine> Converter<E> {
    pub fn new(config: Config, engine: E) -> Self {
        Self { config, engine }
    }

    pub async fn run(&self) -> Result<OutputPaths> {
        let config = &self.config;
        let paths = OutputPaths::derive(&config.data, &config.output_dir)?;

        info!(
            "Rendering \"{}\" with \"{}\"",
            config.data.display().to_string().green(),
            config.template.display().to_string().green()
        );

        let data = DataDocument::load(&config.data).await?;
        let source = read_template(&config.template).await?;
        let rendered = CompiledTemplate::compile(&source)?.render(&data)?;

        write_atomic(&paths.document, &rendered).await?;
        info!(
            "Document written: {}",
            paths.document.display().to_string().blue()
        );

        let mut session = BrowserSession::new(&self.engine, config.navigation.clone());
        session
            .print_to_pdf(&paths.document, &paths.pdf, &config.pdf)
            .await?;

        Ok(paths)
    }
}

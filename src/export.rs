use anyhow::anyhow;
use colored::*;
use lopdf::Document;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use crate::browser::{BrowserEngine, NavigatedPage};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub scale: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub print_background: bool,
}

impl PdfOptions {
    pub const MIN_SCALE: f64 = 0.1;
    pub const MAX_SCALE: f64 = 2.0;

    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            scale: 0.9,
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            print_background: false,
        }
    }
}

/// Snapshots a fully loaded page to a PDF at `path`.
///
/// Only callable with a [`NavigatedPage`], which the browser session hands out
/// after navigation has settled.
pub async fn export_pdf<E: BrowserEngine>(
    engine: &E,
    page: &mut NavigatedPage<'_, E::Page>,
    path: &Path,
    options: &PdfOptions,
) -> Result<()> {
    let export_err = |source| Error::Export {
        path: path.to_path_buf(),
        source,
    };

    engine
        .export_pdf(page.page_mut(), path, options)
        .await
        .map_err(export_err)?;

    let data = fs::read(path)
        .await
        .map_err(|e| export_err(anyhow!("Failed to read back PDF: {}", e)))?;
    if data.is_empty() {
        return Err(export_err(anyhow!("engine produced an empty PDF")));
    }

    match Document::load_mem(&data) {
        Ok(document) => info!(
            "PDF created: {} ({} pages)",
            path.display().to_string().blue(),
            document.get_pages().len()
        ),
        Err(e) => warn!("Wrote {} but could not inspect it: {}", path.display(), e),
    }

    Ok(())
}

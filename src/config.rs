use std::path::PathBuf;
use std::time::Duration;

use crate::PdfOptions;

/// Everything one conversion run needs. `Default` matches the CLI defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub data: PathBuf,
    pub template: PathBuf,
    pub output_dir: PathBuf,
    pub pdf: PdfOptions,
    pub navigation: NavigationOptions,
    pub browser: BrowserOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data.yaml"),
            template: PathBuf::from("template.html"),
            output_dir: PathBuf::from("."),
            pdf: PdfOptions::default(),
            navigation: NavigationOptions::default(),
            browser: BrowserOptions::default(),
        }
    }
}

/// How long navigation may take and what counts as "settled".
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationOptions {
    /// Quiet period with no in-flight requests that marks the page as loaded.
    pub quiescence: Duration,
    /// Upper bound for the whole navigation, quiescence included.
    pub timeout: Duration,
}

impl NavigationOptions {
    pub fn new(quiescence: Duration, timeout: Duration) -> Self {
        Self {
            quiescence,
            timeout,
        }
    }
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            quiescence: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Launch settings for the Chromium engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowserOptions {
    /// Explicit browser binary; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    pub no_sandbox: bool,
}

//! Error types for the render-and-export pipeline

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a conversion run.
///
/// Every variant is fatal to the run. Browser-side variants keep the engine's
/// `anyhow::Error` as their source so the full cause chain reaches the
/// diagnostic line.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not read data file {}: {source}", .path.display())]
    DataRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse data file {}: {message}", .path.display())]
    DataParse { path: PathBuf, message: String },

    #[error("data file {} has no usable base name", .0.display())]
    InvalidDataPath(PathBuf),

    #[error("could not read template file {}: {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse template: {0:#}")]
    TemplateCompile(#[source] minijinja::Error),

    #[error("could not execute template: {0:#}")]
    TemplateExec(#[source] minijinja::Error),

    #[error("output directory {} does not exist or is not a directory", .0.display())]
    OutputDirMissing(PathBuf),

    #[error("could not write {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not launch browser: {0:#}")]
    EngineLaunch(#[source] anyhow::Error),

    #[error("could not create browser context: {0:#}")]
    Context(#[source] anyhow::Error),

    #[error("could not create page: {0:#}")]
    Page(#[source] anyhow::Error),

    #[error("could not load {url}: {source:#}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not create PDF {}: {source:#}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not close {resource}: {source:#}")]
    Teardown {
        resource: Resource,
        #[source]
        source: anyhow::Error,
    },
}

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadData,
    CompileTemplate,
    RenderTemplate,
    WriteOutput,
    LaunchBrowser,
    OpenContext,
    OpenPage,
    Navigate,
    ExportPdf,
    Teardown,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LoadData => "loading data",
            Stage::CompileTemplate => "compiling template",
            Stage::RenderTemplate => "rendering template",
            Stage::WriteOutput => "writing output",
            Stage::LaunchBrowser => "launching browser",
            Stage::OpenContext => "opening browser context",
            Stage::OpenPage => "opening page",
            Stage::Navigate => "loading page",
            Stage::ExportPdf => "exporting PDF",
            Stage::Teardown => "closing browser",
        };
        f.write_str(name)
    }
}

/// Browser sub-resource, in acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Process,
    Context,
    Page,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Process => "browser process",
            Resource::Context => "browser context",
            Resource::Page => "page",
        };
        f.write_str(name)
    }
}

impl Error {
    pub fn stage(&self) -> Stage {
        match self {
            Error::DataRead { .. } | Error::DataParse { .. } | Error::InvalidDataPath(_) => {
                Stage::LoadData
            }
            Error::TemplateRead { .. } | Error::TemplateCompile(_) => Stage::CompileTemplate,
            Error::TemplateExec(_) => Stage::RenderTemplate,
            Error::OutputDirMissing(_) | Error::OutputWrite { .. } => Stage::WriteOutput,
            Error::EngineLaunch(_) => Stage::LaunchBrowser,
            Error::Context(_) => Stage::OpenContext,
            Error::Page(_) => Stage::OpenPage,
            Error::Navigation { .. } => Stage::Navigate,
            Error::Export { .. } => Stage::ExportPdf,
            Error::Teardown { .. } => Stage::Teardown,
        }
    }

    /// Whether the failure is caused by the user's input files or flags
    /// rather than by the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::DataRead { .. }
                | Error::DataParse { .. }
                | Error::InvalidDataPath(_)
                | Error::TemplateRead { .. }
                | Error::TemplateCompile(_)
                | Error::TemplateExec(_)
                | Error::OutputDirMissing(_)
        )
    }

    /// Short suggestion shown next to the diagnostic, if there is an obvious fix.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::DataRead { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                Some("check the --data path")
            }
            Error::TemplateRead { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                Some("check the --template path")
            }
            Error::DataParse { .. } => Some("the data file must be a YAML or JSON mapping"),
            Error::TemplateExec(_) => {
                Some("every placeholder in the template must name a key present in the data file")
            }
            Error::OutputDirMissing(_) => Some("create the directory or pass another --output"),
            Error::EngineLaunch(_) => {
                Some("is Chrome or Chromium installed? pass --chrome <path> to point at it")
            }
            Error::Navigation { .. } => Some("raise --timeout if the page loads slow resources"),
            _ => None,
        }
    }
}

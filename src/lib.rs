//! # yaml2pdf
//!
//! A CLI utility that renders a YAML data file into an HTML template and
//! prints the result to PDF with headless Chromium.
//!
//! ## Pipeline
//!
//! 1. Load the data file into a string-keyed mapping
//! 2. Compile the template and render it against the data
//! 3. Write `<output>/<name>.html`
//! 4. Open it in a fresh browser and wait for the network to go quiet
//! 5. Print `<output>/<name>.pdf`
//!
//! The first failure aborts the run. Browser resources opened before it are
//! closed in reverse order.
//!
//! ## Usage
//!
//! ```bash
//! yaml2pdf --data report.yaml --template report.html --output out
//! ```

pub mod browser;
mod config;
mod data;
mod error;
mod export;
mod pipeline;
mod template;
mod writer;

pub use browser::{BrowserEngine, BrowserSession, ChromiumEngine, NavigatedPage, SessionState};
pub use config::{BrowserOptions, Config, NavigationOptions};
pub use data::DataDocument;
pub use error::{Error, Resource, Result, Stage};
pub use export::{export_pdf, PdfOptions};
pub use pipeline::{Converter, OutputPaths};
pub use template::{read_template, CompiledTemplate};
pub use writer::write_atomic;

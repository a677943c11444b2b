//! Browser engine capability interface and the session that drives it.

mod chromium;
mod quiescence;
mod session;

pub use chromium::{ChromiumEngine, ChromiumProcess};
pub use quiescence::{merge_network_events, wait_for_quiescence, NetworkEvent};
pub use session::{BrowserSession, NavigatedPage, SessionState};

use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::PdfOptions;

/// The narrow set of operations the pipeline needs from a rendering engine.
///
/// Handles are nested: a context only lives inside its process and a page only
/// inside its context. [`BrowserSession`] guarantees that every handle it
/// obtained is passed back to the matching `close_*` call in reverse order,
/// so implementations do not need to guard against misordered teardown.
#[allow(async_fn_in_trait)]
pub trait BrowserEngine {
    type Process;
    type Context;
    type Page;

    async fn launch(&self) -> anyhow::Result<Self::Process>;

    /// Opens an isolated browsing context (no shared cookies or cache).
    async fn open_context(&self, process: &mut Self::Process) -> anyhow::Result<Self::Context>;

    async fn open_page(
        &self,
        process: &mut Self::Process,
        context: &Self::Context,
    ) -> anyhow::Result<Self::Page>;

    /// Loads `url` and returns once no request has been in flight for
    /// `quiescence`. The caller bounds the total wait.
    async fn navigate(
        &self,
        page: &mut Self::Page,
        url: &Url,
        quiescence: Duration,
    ) -> anyhow::Result<()>;

    /// Prints the loaded page to a PDF file at `path`.
    async fn export_pdf(
        &self,
        page: &mut Self::Page,
        path: &Path,
        options: &PdfOptions,
    ) -> anyhow::Result<()>;

    async fn close_page(&self, page: Self::Page) -> anyhow::Result<()>;

    async fn close_context(
        &self,
        process: &mut Self::Process,
        context: Self::Context,
    ) -> anyhow::Result<()>;

    async fn close(&self, process: Self::Process) -> anyhow::Result<()>;
}

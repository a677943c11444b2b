use anyhow::anyhow;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

use super::BrowserEngine;
use crate::export::export_pdf;
use crate::{Error, NavigationOptions, PdfOptions, Resource, Result};

/// Lifecycle of a [`BrowserSession`]. Forward transitions happen one at a
/// time; `Closed` is reached from any of them once teardown has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    ProcessLaunched,
    ContextOpen,
    PageOpen,
    Navigated,
    Closed,
}

/// A page whose navigation has settled. Only the session can create one,
/// which is what lets [`export_pdf`] assume a fully loaded page.
pub struct NavigatedPage<'p, P> {
    page: &'p mut P,
}

impl<'p, P> NavigatedPage<'p, P> {
    pub(crate) fn new(page: &'p mut P) -> Self {
        Self { page }
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut *self.page
    }
}

/// One browser process, one isolated context and one page, used for a single
/// load-and-print.
///
/// Each sub-resource is acquired inside the scope of its parent and released
/// when that scope ends, whatever the outcome, so the release order (page,
/// context, process) follows from the call structure. A teardown failure is
/// returned only if nothing failed before it; otherwise it is logged and the
/// earlier error wins. A run that fails after printing leaves no PDF behind.
pub struct BrowserSession<'e, E: BrowserEngine> {
    engine: &'e E,
    navigation: NavigationOptions,
    state: SessionState,
    printed: bool,
}

impl<'e, E: BrowserEngine> BrowserSession<'e, E> {
    pub fn new(engine: &'e E, navigation: NavigationOptions) -> Self {
        Self {
            engine,
            navigation,
            state: SessionState::Uninitialized,
            printed: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Loads `document` in a fresh browser and prints it to `pdf_path`.
    pub async fn print_to_pdf(
        &mut self,
        document: &Path,
        pdf_path: &Path,
        options: &PdfOptions,
    ) -> Result<()> {
        debug_assert_eq!(self.state, SessionState::Uninitialized, "browser session reused");

        let url = file_url(document).await?;
        let engine = self.engine;

        let mut process = engine.launch().await.map_err(Error::EngineLaunch)?;
        self.advance(SessionState::ProcessLaunched);

        let result = self
            .within_process(&mut process, &url, pdf_path, options)
            .await;

        let closed = engine.close(process).await;
        self.advance(SessionState::Closed);

        let result = settle(result, closed, Resource::Process);
        if result.is_err() && self.printed {
            discard(pdf_path).await;
        }
        result
    }

    async fn within_process(
        &mut self,
        process: &mut E::Process,
        url: &Url,
        pdf_path: &Path,
        options: &PdfOptions,
    ) -> Result<()> {
        let engine = self.engine;

        let context = engine.open_context(process).await.map_err(Error::Context)?;
        self.advance(SessionState::ContextOpen);

        let result = self
            .within_context(process, &context, url, pdf_path, options)
            .await;

        let closed = engine.close_context(process, context).await;
        settle(result, closed, Resource::Context)
    }

    async fn within_context(
        &mut self,
        process: &mut E::Process,
        context: &E::Context,
        url: &Url,
        pdf_path: &Path,
        options: &PdfOptions,
    ) -> Result<()> {
        let engine = self.engine;

        let mut page = engine
            .open_page(process, context)
            .await
            .map_err(Error::Page)?;
        self.advance(SessionState::PageOpen);

        let result = self.load_and_print(&mut page, url, pdf_path, options).await;

        let closed = engine.close_page(page).await;
        settle(result, closed, Resource::Page)
    }

    async fn load_and_print(
        &mut self,
        page: &mut E::Page,
        url: &Url,
        pdf_path: &Path,
        options: &PdfOptions,
    ) -> Result<()> {
        let mut navigated = self.navigate(page, url).await?;
        self.printed = true;
        export_pdf(self.engine, &mut navigated, pdf_path, options).await
    }

    async fn navigate<'p>(
        &mut self,
        page: &'p mut E::Page,
        url: &Url,
    ) -> Result<NavigatedPage<'p, E::Page>> {
        info!("Loading \"{}\"", url);

        let NavigationOptions {
            quiescence,
            timeout,
        } = self.navigation;
        let navigation = self.engine.navigate(page, url, quiescence);

        let source = match tokio::time::timeout(timeout, navigation).await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e),
            Err(_) => Some(anyhow!("network did not settle within {:?}", timeout)),
        };
        if let Some(source) = source {
            return Err(Error::Navigation {
                url: url.to_string(),
                source,
            });
        }

        self.advance(SessionState::Navigated);
        Ok(NavigatedPage::new(page))
    }

    fn advance(&mut self, next: SessionState) {
        debug!("Browser session {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Combines the outcome of a scope with the teardown of the resource it held.
fn settle<T>(result: Result<T>, teardown: anyhow::Result<()>, resource: Resource) -> Result<T> {
    let source = match teardown {
        Ok(()) => {
            debug!("Closed {}", resource);
            return result;
        }
        Err(source) => source,
    };

    let teardown = Error::Teardown { resource, source };
    match result {
        Ok(_) => Err(teardown),
        Err(primary) => {
            warn!("{}", teardown);
            Err(primary)
        }
    }
}

async fn discard(pdf_path: &Path) {
    match fs::remove_file(pdf_path).await {
        Ok(()) => debug!("Removed {}", pdf_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", pdf_path.display(), e),
    }
}

async fn file_url(document: &Path) -> Result<Url> {
    let navigation_err = |source| Error::Navigation {
        url: document.display().to_string(),
        source,
    };

    let absolute = fs::canonicalize(document)
        .await
        .map_err(|e| navigation_err(anyhow!("Failed to resolve path: {}", e)))?;

    Url::from_file_path(&absolute)
        .map_err(|_| navigation_err(anyhow!("not a valid file URL: {}", absolute.display())))
}

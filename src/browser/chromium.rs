use anyhow::{anyhow, Result};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::cdp::browser_protocol::target::{CreateBrowserContextParams, CreateTargetParams};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use url::Url;

use super::quiescence::{merge_network_events, wait_for_quiescence, NetworkEvent};
use super::BrowserEngine;
use crate::{write_atomic, BrowserOptions, PdfOptions};

/// Headless Chromium driven over the DevTools protocol.
#[derive(Debug, Clone, Default)]
pub struct ChromiumEngine {
    options: BrowserOptions,
}

/// A running browser and the task pumping its protocol connection.
pub struct ChromiumProcess {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumEngine {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

impl BrowserEngine for ChromiumEngine {
    type Process = ChromiumProcess;
    type Context = BrowserContextId;
    type Page = Page;

    async fn launch(&self) -> Result<ChromiumProcess> {
        let mut builder = BrowserConfig::builder();
        if let Some(executable) = &self.options.executable {
            builder = builder.chrome_executable(executable);
        }
        if self.options.no_sandbox {
            builder = builder.no_sandbox();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("Failed to create browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(err) = h {
                    // Only log if it's not a common websocket deserialization error
                    let err_str = err.to_string();
                    if !err_str.contains("data did not match any variant")
                        && !err_str.contains("untagged enum Message")
                    {
                        error!("Browser handler error: {}", err);
                    } else {
                        debug!("Chrome protocol message ignored: {}", err);
                    }
                }
            }
        });

        Ok(ChromiumProcess { browser, handler })
    }

    async fn open_context(&self, process: &mut ChromiumProcess) -> Result<BrowserContextId> {
        process
            .browser
            .create_browser_context(CreateBrowserContextParams::default())
            .await
            .map_err(|e| anyhow!("Failed to create browser context: {}", e))
    }

    async fn open_page(
        &self,
        process: &mut ChromiumProcess,
        context: &BrowserContextId,
    ) -> Result<Page> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context.clone())
            .build()
            .map_err(|e| anyhow!("Failed to build page parameters: {}", e))?;

        process
            .browser
            .new_page(params)
            .await
            .map_err(|e| anyhow!("Failed to create new page: {}", e))
    }

    async fn navigate(&self, page: &mut Page, url: &Url, quiescence: Duration) -> Result<()> {
        // Subscribe before navigating so requests issued during the initial
        // load are counted.
        let started = page
            .event_listener::<EventRequestWillBeSent>()
            .await?
            .map(|e| NetworkEvent::Started(e.request_id.inner().clone()));
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await?
            .map(|e| NetworkEvent::Finished(e.request_id.inner().clone()));
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await?
            .map(|e| NetworkEvent::Finished(e.request_id.inner().clone()));
        let events = merge_network_events(started, finished, failed);

        page.goto(url.as_str())
            .await
            .map_err(|e| anyhow!("Failed to navigate to {}: {}", url, e))?;

        wait_for_quiescence(events, quiescence).await
    }

    async fn export_pdf(&self, page: &mut Page, path: &Path, options: &PdfOptions) -> Result<()> {
        let params = PrintToPdfParams {
            scale: Some(options.scale),
            margin_top: Some(options.margin_top),
            margin_right: Some(options.margin_right),
            margin_bottom: Some(options.margin_bottom),
            margin_left: Some(options.margin_left),
            print_background: Some(options.print_background),
            ..Default::default()
        };

        let pdf_data = page
            .pdf(params)
            .await
            .map_err(|e| anyhow!("Failed to generate PDF: {}", e))?;

        write_atomic(path, &pdf_data).await?;
        Ok(())
    }

    async fn close_page(&self, page: Page) -> Result<()> {
        page.close()
            .await
            .map_err(|e| anyhow!("Failed to close page: {}", e))
    }

    async fn close_context(
        &self,
        process: &mut ChromiumProcess,
        context: BrowserContextId,
    ) -> Result<()> {
        process
            .browser
            .dispose_browser_context(context)
            .await
            .map_err(|e| anyhow!("Failed to dispose browser context: {}", e))
    }

    async fn close(&self, mut process: ChromiumProcess) -> Result<()> {
        let closed = process.browser.close().await;
        if closed.is_ok() {
            process.browser.wait().await.ok();
        }
        process.handler.abort();

        closed
            .map(|_| ())
            .map_err(|e| anyhow!("Failed to close browser: {}", e))
    }
}

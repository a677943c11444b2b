//! Fake browser engine that records every capability call.

#![allow(dead_code)]

use anyhow::{anyhow, bail};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use yaml2pdf::{BrowserEngine, PdfOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Launch,
    OpenContext,
    OpenPage,
    Navigate,
    ExportPdf,
    ClosePage,
    CloseContext,
    Close,
}

#[derive(Clone, Default)]
pub struct FakeEngine {
    calls: Arc<Mutex<Vec<Call>>>,
    failing: Vec<Call>,
    hang_on_navigate: bool,
    blank_pdf: bool,
}

pub struct FakePage {
    loaded: Option<String>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every listed call fails after being recorded.
    pub fn failing(calls: &[Call]) -> Self {
        Self {
            failing: calls.to_vec(),
            ..Self::default()
        }
    }

    /// Navigation never settles.
    pub fn hanging() -> Self {
        Self {
            hang_on_navigate: true,
            ..Self::default()
        }
    }

    /// Export writes a zero-byte file.
    pub fn blank() -> Self {
        Self {
            blank_pdf: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(&call) {
            bail!("{:?} refused", call);
        }
        Ok(())
    }
}

impl BrowserEngine for FakeEngine {
    type Process = ();
    type Context = ();
    type Page = FakePage;

    async fn launch(&self) -> anyhow::Result<()> {
        self.record(Call::Launch)
    }

    async fn open_context(&self, _process: &mut ()) -> anyhow::Result<()> {
        self.record(Call::OpenContext)
    }

    async fn open_page(&self, _process: &mut (), _context: &()) -> anyhow::Result<FakePage> {
        self.record(Call::OpenPage)?;
        Ok(FakePage { loaded: None })
    }

    async fn navigate(
        &self,
        page: &mut FakePage,
        url: &Url,
        _quiescence: Duration,
    ) -> anyhow::Result<()> {
        self.record(Call::Navigate)?;
        if self.hang_on_navigate {
            std::future::pending::<()>().await;
        }

        let path = url
            .to_file_path()
            .map_err(|_| anyhow!("not a file URL: {}", url))?;
        page.loaded = Some(std::fs::read_to_string(path)?);
        Ok(())
    }

    async fn export_pdf(
        &self,
        page: &mut FakePage,
        path: &Path,
        options: &PdfOptions,
    ) -> anyhow::Result<()> {
        self.record(Call::ExportPdf)?;
        if self.blank_pdf {
            std::fs::write(path, b"")?;
            return Ok(());
        }
        let html = page
            .loaded
            .as_deref()
            .expect("export_pdf called before navigation");
        let pdf = format!("%PDF-1.4\n% scale {}\n{}\n%%EOF\n", options.scale, html);
        std::fs::write(path, pdf)?;
        Ok(())
    }

    async fn close_page(&self, _page: FakePage) -> anyhow::Result<()> {
        self.record(Call::ClosePage)
    }

    async fn close_context(&self, _process: &mut (), _context: ()) -> anyhow::Result<()> {
        self.record(Call::CloseContext)
    }

    async fn close(&self, _process: ()) -> anyhow::Result<()> {
        self.record(Call::Close)
    }
}

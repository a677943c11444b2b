//! Acquisition and teardown ordering of the browser session

mod support;

use std::path::PathBuf;
use std::time::Duration;
use support::{Call, FakeEngine};
use tempfile::TempDir;
use yaml2pdf::{BrowserSession, Error, NavigationOptions, PdfOptions, Resource, SessionState};

const FULL_RUN: [Call; 8] = [
    Call::Launch,
    Call::OpenContext,
    Call::OpenPage,
    Call::Navigate,
    Call::ExportPdf,
    Call::ClosePage,
    Call::CloseContext,
    Call::Close,
];

struct Fixture {
    _dir: TempDir,
    document: PathBuf,
    pdf: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("report.html");
    std::fs::write(&document, "<h1>Report</h1>").unwrap();
    let pdf = dir.path().join("report.pdf");
    Fixture {
        _dir: dir,
        document,
        pdf,
    }
}

fn quick() -> NavigationOptions {
    NavigationOptions::new(Duration::from_millis(10), Duration::from_millis(200))
}

async fn print(engine: &FakeEngine, fx: &Fixture) -> (yaml2pdf::Result<()>, SessionState) {
    let mut session = BrowserSession::new(engine, quick());
    let result = session
        .print_to_pdf(&fx.document, &fx.pdf, &PdfOptions::default())
        .await;
    (result, session.state())
}

#[tokio::test]
async fn successful_print_acquires_then_releases_in_reverse() {
    let fx = fixture();
    let engine = FakeEngine::new();

    let (result, state) = print(&engine, &fx).await;

    result.unwrap();
    assert_eq!(state, SessionState::Closed);
    assert_eq!(engine.calls(), FULL_RUN);
    let pdf = std::fs::read_to_string(&fx.pdf).unwrap();
    assert!(pdf.starts_with("%PDF"));
    assert!(pdf.contains("% scale 0.9"));
}

#[tokio::test]
async fn launch_failure_opens_nothing_else() {
    let fx = fixture();
    let engine = FakeEngine::failing(&[Call::Launch]);

    let (result, state) = print(&engine, &fx).await;

    assert!(matches!(result, Err(Error::EngineLaunch(_))));
    assert_eq!(state, SessionState::Uninitialized);
    assert_eq!(engine.calls(), [Call::Launch]);
}

#[tokio::test]
async fn context_failure_still_closes_process() {
    let fx = fixture();
    let engine = FakeEngine::failing(&[Call::OpenContext]);

    let (result, state) = print(&engine, &fx).await;

    assert!(matches!(result, Err(Error::Context(_))));
    assert_eq!(state, SessionState::Closed);
    assert_eq!(engine.calls(), [Call::Launch, Call::OpenContext, Call::Close]);
}

#[tokio::test]
async fn page_failure_closes_context_then_process() {
    let fx = fixture();
    let engine = FakeEngine::failing(&[Call::OpenPage]);

    let (result, _) = print(&engine, &fx).await;

    assert!(matches!(result, Err(Error::Page(_))));
    assert_eq!(
        engine.calls(),
        [
            Call::Launch,
            Call::OpenContext,
            Call::OpenPage,
            Call::CloseContext,
            Call::Close
        ]
    );
}

#[tokio::test]
async fn navigation_timeout_closes_everything() {
    let fx = fixture();
    let engine = FakeEngine::hanging();

    let (result, state) = print(&engine, &fx).await;

    match result {
        Err(Error::Navigation { source, .. }) => {
            assert!(source.to_string().contains("did not settle"), "{}", source)
        }
        other => panic!("expected navigation error, got {:?}", other),
    }
    assert_eq!(state, SessionState::Closed);
    assert_eq!(
        engine.calls(),
        [
            Call::Launch,
            Call::OpenContext,
            Call::OpenPage,
            Call::Navigate,
            Call::ClosePage,
            Call::CloseContext,
            Call::Close
        ]
    );
    assert!(!fx.pdf.exists());
}

#[tokio::test]
async fn export_failure_leaves_no_pdf() {
    let fx = fixture();
    let engine = FakeEngine::failing(&[Call::ExportPdf]);

    let (result, _) = print(&engine, &fx).await;

    assert!(matches!(result, Err(Error::Export { .. })));
    assert!(!fx.pdf.exists());
    assert_eq!(engine.calls()[5..], [Call::ClosePage, Call::CloseContext, Call::Close]);
}

#[tokio::test]
async fn teardown_failure_does_not_mask_primary_error() {
    let fx = fixture();
    let engine = FakeEngine::failing(&[Call::Navigate, Call::ClosePage, Call::CloseContext]);

    let (result, _) = print(&engine, &fx).await;

    assert!(matches!(result, Err(Error::Navigation { .. })), "{:?}", result);
    assert_eq!(
        engine.calls()[4..],
        [Call::ClosePage, Call::CloseContext, Call::Close]
    );
}

#[tokio::test]
async fn teardown_failure_after_success_is_reported() {
    let fx = fixture();
    let engine = FakeEngine::failing(&[Call::CloseContext]);

    let (result, _) = print(&engine, &fx).await;

    assert!(matches!(
        result,
        Err(Error::Teardown {
            resource: Resource::Context,
            ..
        })
    ));
    assert_eq!(engine.calls(), FULL_RUN);
    assert!(!fx.pdf.exists(), "a failed run left its PDF behind");
}

#[tokio::test]
async fn process_close_failure_after_print_removes_pdf() {
    let fx = fixture();
    let engine = FakeEngine::failing(&[Call::Close]);

    let (result, state) = print(&engine, &fx).await;

    assert!(matches!(
        result,
        Err(Error::Teardown {
            resource: Resource::Process,
            ..
        })
    ));
    assert_eq!(state, SessionState::Closed);
    assert_eq!(engine.calls(), FULL_RUN);
    assert!(!fx.pdf.exists());
}

#[tokio::test]
async fn empty_pdf_is_export_error_and_removed() {
    let fx = fixture();
    let engine = FakeEngine::blank();

    let (result, _) = print(&engine, &fx).await;

    match result {
        Err(Error::Export { path, source }) => {
            assert_eq!(path, fx.pdf);
            assert!(source.to_string().contains("empty PDF"), "{}", source);
        }
        other => panic!("expected export error, got {:?}", other),
    }
    assert_eq!(engine.calls(), FULL_RUN);
    assert!(!fx.pdf.exists());
}

#[tokio::test]
async fn failure_before_print_keeps_existing_pdf() {
    let fx = fixture();
    std::fs::write(&fx.pdf, "%PDF-1.4 previous run").unwrap();
    let engine = FakeEngine::failing(&[Call::Navigate]);

    let (result, _) = print(&engine, &fx).await;

    assert!(matches!(result, Err(Error::Navigation { .. })));
    assert_eq!(std::fs::read_to_string(&fx.pdf).unwrap(), "%PDF-1.4 previous run");
}

use clap::{CommandFactory, Parser};
use colored::*;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use yaml2pdf::{
    BrowserOptions, ChromiumEngine, Config, Converter, Error, NavigationOptions, PdfOptions,
};

#[derive(Parser)]
#[command(name = "yaml2pdf")]
#[command(about = "Generate a PDF from a template and YAML data file")]
#[command(version = "0.1.0")]
struct Args {
    /// YAML (or JSON) data file
    #[arg(long, default_value = "data.yaml")]
    data: PathBuf,

    /// Template file the data is rendered into
    #[arg(long, default_value = "template.html")]
    template: PathBuf,

    /// Output directory for the rendered HTML and the PDF
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// Page scale factor for the PDF
    #[arg(long, default_value = "0.9", value_parser = parse_scale)]
    scale: f64,

    /// Navigation timeout in seconds
    #[arg(short = 't', long = "timeout", default_value = "30.0", value_parser = parse_timeout)]
    timeout: f64,

    /// How long the page must stay free of network activity to count as loaded, in milliseconds
    #[arg(long = "idle-ms", default_value = "500")]
    idle_ms: u64,

    /// Chrome/Chromium executable to use instead of the auto-detected one
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Launch the browser without its sandbox (needed when running as root in containers)
    #[arg(long = "no-sandbox")]
    no_sandbox: bool,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            data: self.data,
            template: self.template,
            output_dir: self.output,
            pdf: PdfOptions::with_scale(self.scale),
            navigation: NavigationOptions::new(
                Duration::from_millis(self.idle_ms),
                Duration::from_secs_f64(self.timeout),
            ),
            browser: BrowserOptions {
                executable: self.chrome,
                no_sandbox: self.no_sandbox,
            },
        }
    }
}

fn parse_timeout(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|_| "Not a number.")?;
    if !value.is_finite() || value < 0.0 {
        return Err("Must be zero or positive number.".to_string());
    }
    Ok(value)
}

fn parse_scale(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|_| "Not a number.")?;
    if !(PdfOptions::MIN_SCALE..=PdfOptions::MAX_SCALE).contains(&value) {
        return Err(format!(
            "Must be between {} and {}.",
            PdfOptions::MIN_SCALE,
            PdfOptions::MAX_SCALE
        ));
    }
    Ok(value)
}

#[tokio::main]
async fn main() {
    // Set up logging with chromiumoxide errors suppressed
    let filter = EnvFilter::from_default_env()
        .add_directive("chromiumoxide::conn=off".parse().unwrap())
        .add_directive("chromiumoxide::handler=off".parse().unwrap())
        .add_directive("yaml2pdf=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // No flags at all: show usage instead of converting the defaults
    if std::env::args_os().len() <= 1 {
        Args::command().print_help().ok();
        return;
    }

    let config = Args::parse().into_config();
    let engine = ChromiumEngine::new(config.browser.clone());
    let converter = Converter::new(config, engine);

    match converter.run().await {
        Ok(paths) => {
            info!(
                "Template executed successfully. Output file: {}",
                paths.pdf.display().to_string().green()
            );
        }
        Err(e) => {
            error!("{}", diagnostic(&e).red());
            process::exit(1);
        }
    }
}

/// The single line reported for a failed run. Input problems carry their fix;
/// environment problems point at the debug log, which has the browser's side.
fn diagnostic(e: &Error) -> String {
    let mut line = format!("{} failed: {}", e.stage(), e);
    match e.hint() {
        Some(hint) => line.push_str(&format!(" ({})", hint)),
        None if !e.is_user_error() => {
            line.push_str(" (rerun with RUST_LOG=yaml2pdf=debug for details)")
        }
        None => {}
    }
    line
}

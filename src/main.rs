//! Prism - Terminal front end for an AI data analytics backend
//!
//! Previews CSV/JSON files with column type labels and talks to the
//! analytics backend for chat, charts and reports.

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use crossterm::event::{self, Event, KeyEventKind};
use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use prism::api::BackendClient;
use prism::app::App;
use prism::commands::{self, response_channel};
use prism::config::{self, Config};
use prism::format::SourceFormat;
use prism::panel::{PanelVariant, RemotePanel};
use prism::upload::{UploadState, UploadSurface};
use prism::tui::Tui;

/// Prism - preview datasets and query the analytics backend
#[derive(FromArgs)]
struct Args {
    /// CSV or JSON file to load at startup
    #[argh(positional)]
    file: Option<String>,

    /// backend base URL (default: $PRISM_BACKEND_URL or http://localhost:8000)
    #[argh(option, short = 'b')]
    backend_url: Option<String>,

    /// dataset identifier known to the backend
    #[argh(option, short = 'd')]
    dataset_id: Option<String>,

    /// panel variant: linked or static (default: linked)
    #[argh(option, default = "PanelVariant::Linked")]
    variant: PanelVariant,

    /// force the parser format (csv or json) instead of using the extension
    #[argh(option)]
    format: Option<String>,

    /// print a summary of FILE and exit
    #[argh(switch, short = 's')]
    summary: bool,

    /// send one question to the backend, print the answer and exit
    #[argh(option)]
    ask: Option<String>,

    /// write logs to this file
    #[argh(option)]
    log_file: Option<PathBuf>,

    /// directory for exported previews (default: current directory)
    #[argh(option)]
    export_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();
    let headless = args.summary || args.ask.is_some();

    init_logging(args.log_file.as_ref(), headless)?;
    config::init(Config::resolve(args.backend_url.clone(), args.export_dir.clone()));

    let format = match args.format.as_deref() {
        Some(name) => match SourceFormat::parse(name) {
            Some(format) => Some(format),
            None => bail!("Unknown format '{}' (expected csv or json)", name),
        },
        None => None,
    };

    if args.summary {
        return run_summary(&args, format);
    }
    if let Some(question) = args.ask.clone() {
        return run_ask(&args, question).await;
    }

    run_tui(&args, format).await
}

/// Logs go to `--log-file` when given, else to stderr in headless mode.
/// The TUI owns the terminal, so without a file it runs unlogged.
fn init_logging(log_file: Option<&PathBuf>, headless: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// Headless `--summary`: load FILE and print its metadata and preview.
fn run_summary(args: &Args, format: Option<SourceFormat>) -> Result<()> {
    let Some(path) = args.file.as_deref() else {
        bail!("--summary needs a FILE");
    };

    let mut upload = UploadSurface::default();
    upload.select_file(path, format);

    if upload.state() == UploadState::Error {
        bail!("{}", upload.error());
    }
    let Some(meta) = upload.meta() else {
        bail!("{}: nothing parsed", path);
    };

    println!("File:     {}", upload.file_name());
    println!("Rows:     {}", meta.rows_count);
    println!("Columns:  {}", meta.cols_count);
    println!("Quality:  {}", meta.quality);
    println!();

    let preview = upload.preview();
    for (name, ty) in preview.header.iter().zip(&meta.types) {
        println!("  {:<24} {}", name, ty);
    }
    println!();

    println!("{}", preview.header.join(" | "));
    for idx in 0..preview.rows.len().min(10) {
        let row: Vec<&str> = (0..preview.width()).map(|col| preview.cell(idx, col)).collect();
        println!("{}", row.join(" | "));
    }
    Ok(())
}

/// Headless `--ask`: one chat round trip with the usual guards and fallbacks.
async fn run_ask(args: &Args, question: String) -> Result<()> {
    let mut panel = RemotePanel::new(args.variant, args.dataset_id.clone());
    panel.chat.question = question;

    if let Some(request) = panel.send_question() {
        let client = BackendClient::new(&config::get().backend_url)?;
        let response = commands::execute(&client, request).await;
        panel.apply(response);
    }

    println!("{}", panel.chat.answer.as_deref().unwrap_or_default());
    Ok(())
}

async fn run_tui(args: &Args, format: Option<SourceFormat>) -> Result<()> {
    let client = Arc::new(BackendClient::new(&config::get().backend_url)?);
    let (tx, mut rx) = response_channel();

    let panel = RemotePanel::new(args.variant, args.dataset_id.clone());
    let mut app = App::new(UploadSurface::default(), panel)
        .with_export_dir(config::get().export_dir.clone())
        .with_format_override(format);

    if let Some(path) = args.file.as_deref() {
        app.open_file(path);
    }

    let mut tui = Tui::new()?;

    loop {
        while let Ok(response) = rx.try_recv() {
            app.apply_response(response);
        }

        tui.draw(&mut app)?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(request) = app.handle_key(key) {
                        commands::dispatch(Arc::clone(&client), request, tx.clone());
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    Ok(())
}

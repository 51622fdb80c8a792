//! gongwen-preview CLI - classify and paginate an official document
//!
//! The main interface is through WASM bindings; this binary prints the
//! classified blocks and page slices of a text file.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use gongwen_preview::document::sanitize_text;
use gongwen_preview::import::import_text_file;
use gongwen_preview::{Document, DocumentConfig, PageSlice, Previewer, Result};

#[derive(Parser)]
#[command(name = "gongwen-preview")]
#[command(version)]
#[command(about = "Classify and paginate a Chinese official document", long_about = None)]
struct Cli {
    /// Input text file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Normalize half-width punctuation before classifying
    #[arg(long)]
    sanitize: bool,

    /// JSON configuration patch applied over the defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print blocks and pages as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    document: &'a Document,
    pages: &'a [PageSlice],
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut text = import_text_file(&cli.input)?;
    if cli.sanitize {
        let report = sanitize_text(&text);
        log::info!("sanitized {} characters", report.count);
        text = report.text;
    }

    let config = match &cli.config {
        Some(path) => DocumentConfig::from_json(&fs::read_to_string(path)?)?,
        None => DocumentConfig::default(),
    };

    let mut previewer = Previewer::with_text(&text, config);
    previewer.update_layout();

    if cli.json {
        let report = Report {
            document: previewer.document(),
            pages: previewer.pages(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for block in previewer.document().blocks() {
        println!("{:>4}  {:<10}  {}", block.source_line, block.kind.name(), block.text);
    }
    println!();
    println!("{} page(s)", previewer.page_count());
    for (idx, page) in previewer.pages().iter().enumerate() {
        println!(
            "  page {:>3}: offset {:>8.1}  height {:>6.1}",
            idx + 1,
            page.offset,
            page.height
        );
    }

    Ok(())
}

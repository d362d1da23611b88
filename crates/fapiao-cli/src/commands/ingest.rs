//! Ingest command - run one batch of invoice files through the pipeline.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::debug;

use fapiao_core::admission::{admit, FileCandidate};
use fapiao_core::batch::{BatchOrchestrator, BatchProgress, FileStatus};
use fapiao_core::extract::GeminiClient;
use fapiao_core::store::JsonStore;

use super::{load_config, store_path};

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Record store file
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Extraction model override
    #[arg(short, long)]
    model: Option<String>,
}

pub async fn run(args: IngestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model) = &args.model {
        config.gemini.model = model.clone();
    }

    // Expand glob patterns; plain paths pass through unchanged.
    let mut paths: Vec<PathBuf> = Vec::new();
    for input in &args.inputs {
        let mut matched: Vec<PathBuf> = glob(input)?.filter_map(|r| r.ok()).collect();
        if matched.is_empty() {
            matched.push(PathBuf::from(input));
        }
        paths.append(&mut matched);
    }

    let mut candidates = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("invoice")
            .to_string();
        candidates.push(FileCandidate {
            mime_type: mime_from_path(path).to_string(),
            content: fs::read(path)?,
            name,
        });
    }

    let admission = admit(candidates);

    if !admission.rejections.is_empty() {
        println!(
            "{} {} file(s) rejected at admission:",
            style("✗").red(),
            admission.rejections.len()
        );
        println!("{}", admission.rejection_summary());
    }

    if admission.admitted.is_empty() {
        anyhow::bail!("no files admitted for processing");
    }

    println!(
        "{} Processing {} file(s)",
        style("ℹ").blue(),
        admission.admitted.len()
    );

    let client = GeminiClient::new(config.gemini.clone())?;
    let store = JsonStore::open(store_path(&config, args.store.as_ref()))?;
    let orchestrator = BatchOrchestrator::new(Arc::new(client), Arc::new(store));

    // Set up one progress bar per file
    let multi_progress = MultiProgress::new();
    let bar_style = ProgressStyle::default_bar()
        .template("{msg:24} [{bar:30.cyan/blue}] {pos}/100")
        .unwrap()
        .progress_chars("=>-");
    let mut bars: HashMap<String, ProgressBar> = HashMap::new();
    for file in &admission.admitted {
        let bar = multi_progress.add(ProgressBar::new(100));
        bar.set_style(bar_style.clone());
        bar.set_message(file.name.clone());
        bars.insert(file.name.clone(), bar);
    }

    let progress = BatchProgress::new(&admission.admitted);
    let batch = {
        let orchestrator = orchestrator.clone();
        let progress = progress.clone();
        tokio::spawn(async move { orchestrator.run_batch(admission.admitted, progress).await })
    };

    // Poll snapshots until the batch joins; reads tolerate staleness.
    while !batch.is_finished() {
        render(&progress, &bars);
        tokio::time::sleep(Duration::from_millis(120)).await;
    }
    let outcome = batch.await?;
    render(&progress, &bars);
    for bar in bars.values() {
        bar.finish();
    }

    debug!(elapsed = ?start.elapsed(), "batch finished");

    println!();
    println!(
        "{} Processed {} file(s) in {:?}",
        style("✓").green(),
        outcome.total(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(outcome.succeeded).green(),
        style(outcome.failed).red()
    );

    if outcome.has_failures() {
        println!();
        println!("{}", style(outcome.summary()).yellow());
        let snapshot = progress.snapshot();
        let mut failed: Vec<_> = snapshot
            .iter()
            .filter(|(_, s)| s.status == FileStatus::Error)
            .collect();
        failed.sort_by(|a, b| a.0.cmp(b.0));
        for (name, state) in failed {
            println!(
                "  - {}: {}",
                name,
                state.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn render(progress: &BatchProgress, bars: &HashMap<String, ProgressBar>) {
    for (name, state) in progress.snapshot() {
        if let Some(bar) = bars.get(&name) {
            bar.set_position(state.progress as u64);
            match state.status {
                FileStatus::Error => bar.set_message(format!("{name} ✗")),
                FileStatus::Success => bar.set_message(format!("{name} ✓")),
                _ => {}
            }
        }
    }
}

fn mime_from_path(path: &PathBuf) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        // Admission rejects anything it cannot classify.
        _ => "application/octet-stream",
    }
}

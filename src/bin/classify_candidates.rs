// src/bin/classify_candidates.rs - Screens scraped listings against the store before insert
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use dedupe_lib::models::core::RecordDraft;
use dedupe_lib::models::stats_models::IngestionStats;
use dedupe_lib::repository::{InMemoryRepository, PgRecordRepository, RecordRepository};
use dedupe_lib::utils::db_connect::connect;
use dedupe_lib::utils::dedup_config::DedupConfig;
use dedupe_lib::utils::env::load_env;
use dedupe_lib::utils::get_memory_usage;
use dedupe_lib::utils::progress_bars::progress_config::{phase_progress_bar, ProgressConfig};
use dedupe_lib::DedupService;

#[derive(Parser)]
#[command(author, version, about = "Insert scraped listings that are not already stored", long_about = None)]
struct Args {
    /// JSON array of candidate listings
    #[arg(long)]
    input: PathBuf,

    /// Classify only, insert nothing
    #[arg(long)]
    dry_run: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Compare against a JSON export instead of the database
    #[arg(long)]
    from_json: Option<PathBuf>,
}

fn read_candidates(path: &PathBuf) -> Result<Vec<RecordDraft>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates from {}", path.display()))?;
    let drafts: Vec<RecordDraft> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse candidates in {}", path.display()))?;
    Ok(drafts)
}

async fn run_ingest<R: RecordRepository>(
    repository: R,
    config: &DedupConfig,
    progress_config: &ProgressConfig,
    candidates: Vec<RecordDraft>,
    dry_run: bool,
) -> Result<IngestionStats> {
    let multi_progress = progress_config.create_multi_progress();
    let main_pb = phase_progress_bar(multi_progress.as_ref(), 1);
    if let Some(pb) = &main_pb {
        pb.set_message(format!("Classifying {} candidates...", candidates.len()));
    }

    let mut service = DedupService::new(repository, config);
    let stats = service
        .ingest(candidates, dry_run)
        .await
        .context("Ingestion run failed")?;

    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.finish_with_message(format!(
            "{} new, {} duplicates",
            stats.accepted_new, stats.rejected_duplicates
        ));
    }
    Ok(stats)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();

    let args = Args::parse();
    let config = DedupConfig::from_env();
    config.log_config();
    let progress_config = ProgressConfig::from_env();

    let candidates = read_candidates(&args.input)?;
    info!("Loaded {} candidates from {}", candidates.len(), args.input.display());

    let stats = match &args.from_json {
        Some(path) => {
            warn!("Offline mode: inserts are not written back to {}", path.display());
            let repository = InMemoryRepository::from_json_file(path)?;
            run_ingest(repository, &config, &progress_config, candidates, args.dry_run).await?
        }
        None => {
            let pool = connect(&config, "springs_classify_candidates")
                .await
                .context("Failed to connect to database")?;
            let repository = PgRecordRepository::new(pool, &config)
                .context("Failed to set up listing repository")?;
            run_ingest(repository, &config, &progress_config, candidates, args.dry_run).await?
        }
    };

    info!("Ingestion run {} summary:", stats.run_id);
    info!("  Candidates: {}", stats.candidates);
    info!("  Accepted as new: {}", stats.accepted_new);
    info!("  Rejected as duplicates: {}", stats.rejected_duplicates);
    for rejection in &stats.rejections {
        info!(
            "    '{}' ({}) matches {}",
            rejection.draft.name, rejection.draft.state, rejection.existing_id
        );
    }
    if stats.dry_run {
        info!("  Dry run: nothing inserted");
    } else {
        info!("  Inserted: {}", stats.inserted);
    }
    if progress_config.should_show_memory() {
        info!("Memory usage: {} MB", get_memory_usage().await);
    }

    if let Some(path) = &args.report {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &stats)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

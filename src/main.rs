use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use dedupe_lib::models::stats_models::CleanupStats;
use dedupe_lib::repository::{InMemoryRepository, PgRecordRepository, RecordRepository};
use dedupe_lib::utils::db_connect::{connect, get_pool_status};
use dedupe_lib::utils::dedup_config::DedupConfig;
use dedupe_lib::utils::env::load_env;
use dedupe_lib::utils::get_memory_usage;
use dedupe_lib::utils::progress_bars::progress_config::{phase_progress_bar, ProgressConfig};
use dedupe_lib::DedupService;

#[derive(Parser)]
#[command(author, version, about = "Find and merge duplicate spring listings", long_about = None)]
struct CleanupArgs {
    /// Report duplicate groups without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Read listings from a JSON export instead of the database; deletions
    /// only affect the in-memory copy
    #[arg(long)]
    from_json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    info!("Starting springs duplicate cleanup run");
    load_env();

    let args = CleanupArgs::parse();
    let config = DedupConfig::from_env();
    config.log_config();
    let progress_config = ProgressConfig::from_env();

    let stats = match &args.from_json {
        Some(path) => {
            warn!("Offline mode: changes are not written back to {}", path.display());
            let repository = InMemoryRepository::from_json_file(path)?;
            run_cleanup(repository, &config, &progress_config, args.dry_run).await?
        }
        None => {
            let pool = connect(&config, "springs_dedupe")
                .await
                .context("Failed to connect to database")?;
            info!("Successfully connected to the database");
            let repository = PgRecordRepository::new(pool.clone(), &config)
                .context("Failed to set up listing repository")?;
            let stats = run_cleanup(repository, &config, &progress_config, args.dry_run).await?;
            let (connections, idle) = get_pool_status(&pool);
            info!("DB pool at exit: {} connections, {} idle", connections, idle);
            stats
        }
    };

    print_summary(&stats);
    if progress_config.should_show_detailed() {
        print_groups(&stats);
    }
    if progress_config.should_show_memory() {
        info!("Memory usage: {} MB", get_memory_usage().await);
    }

    if let Some(path) = &args.report {
        write_report(path, &stats)?;
    }
    Ok(())
}

async fn run_cleanup<R: RecordRepository>(
    repository: R,
    config: &DedupConfig,
    progress_config: &ProgressConfig,
    dry_run: bool,
) -> Result<CleanupStats> {
    let multi_progress = progress_config.create_multi_progress();
    let main_pb = phase_progress_bar(multi_progress.as_ref(), 1);
    if let Some(pb) = &main_pb {
        pb.set_message(if dry_run { "Resolving duplicates (dry run)..." } else { "Resolving and merging duplicates..." });
    }

    let mut service = DedupService::new(repository, config);
    let stats = service
        .cleanup(dry_run)
        .await
        .context("Cleanup run failed")?;

    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.finish_with_message(format!(
            "{} groups, {} deleted",
            stats.groups_found, stats.records_deleted
        ));
    }
    Ok(stats)
}

fn print_summary(stats: &CleanupStats) {
    info!("Cleanup run {} summary:", stats.run_id);
    info!("  Records scanned: {}", stats.total_records);
    info!("  Duplicate groups found: {}", stats.groups_found);
    if stats.wide_groups > 0 {
        warn!(
            "  Groups joined by name across a wide spread: {} (see warnings above)",
            stats.wide_groups
        );
    }
    info!("  Records slated for deletion: {}", stats.records_slated_for_deletion);
    info!("  Records deleted: {}", stats.records_deleted);
    info!("  Groups skipped: {}", stats.groups_skipped);
    for skipped in &stats.skipped {
        warn!("  Skipped group kept by {}: {}", skipped.keep, skipped.reason);
    }
    info!(
        "  Timings: resolution {:.2}s, merge {:.2}s",
        stats.resolution_time, stats.merge_time
    );
}

fn print_groups(stats: &CleanupStats) {
    for group in &stats.groups {
        let keep_name = group
            .keep_record()
            .map(|r| r.details.name.as_str())
            .unwrap_or("?");
        let spread = group
            .max_spread_meters
            .map(|m| format!("{:.0} m", m))
            .unwrap_or_else(|| "n/a".to_string());
        info!(
            "  Group of {} (spread {}): keep {} '{}', delete [{}]",
            group.members.len(),
            spread,
            group.keep,
            keep_name,
            group.delete.join(", ")
        );
    }
}

fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}

//! Index command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use encore_core::{
    AggregatorConfig, CacheStatus, CuratedIndexCache, CuratedIndexResult, CuratedIndexService,
    CuratedIndexer, SmugMugClient,
};
use tracing::info;

use crate::utils::{emit, format_age, format_timestamp};

/// Options for the index command.
pub struct IndexOptions {
    pub refresh: bool,
    pub json: bool,
    pub strict: bool,
    pub quiet: bool,
    pub cache_dir: PathBuf,
    pub ttl_ms: u64,
    pub concurrency: usize,
    pub page_size: usize,
}

/// Execute the index command.
pub async fn execute(album_id: String, options: IndexOptions) -> Result<()> {
    let album_id = album_id.trim();
    if album_id.is_empty() {
        bail!("Album id must not be empty");
    }

    let source = SmugMugClient::from_env().context("Failed to configure SmugMug client")?;

    let config = AggregatorConfig {
        page_size: options.page_size.max(1),
        concurrency: options.concurrency.max(1),
        ttl: Duration::from_millis(options.ttl_ms),
        ..AggregatorConfig::default()
    };
    let cache = Arc::new(CuratedIndexCache::new(options.cache_dir.clone(), config.ttl));
    let service = CuratedIndexService::new(CuratedIndexer::new(Arc::new(source), config), cache);

    info!(album_id, refresh = options.refresh, "Computing curated index");
    let (result, status) = service
        .curated_index(album_id, options.refresh)
        .await
        .with_context(|| format!("Could not index album {album_id}"))?;

    if options.json {
        let mut value = serde_json::to_value(&result).context("Failed to serialize result")?;
        value["cache"] = serde_json::to_value(status).context("Failed to serialize result")?;
        let rendered =
            serde_json::to_string_pretty(&value).context("Failed to serialize result")?;
        emit([rendered])?;
    } else if !options.quiet {
        print_report(&result, &status);
    }

    if options.strict && !result.missing_keywords.is_empty() {
        bail!(
            "{} curated keyword(s) missing from album {}",
            result.missing_keywords.len(),
            result.album_id
        );
    }
    Ok(())
}

fn print_report(result: &CuratedIndexResult, status: &CacheStatus) {
    let complete = result.missing_keywords.is_empty();

    println!();
    if complete {
        println!("{}", "╔════════════════════════════════════════╗".green());
        println!(
            "{}",
            "║         ALL KEYWORDS VERIFIED          ║".green().bold()
        );
        println!("{}", "╚════════════════════════════════════════╝".green());
    } else {
        println!("{}", "╔════════════════════════════════════════╗".yellow());
        println!(
            "{}",
            "║         CURATED KEYWORDS MISSING       ║".yellow().bold()
        );
        println!("{}", "╚════════════════════════════════════════╝".yellow());
    }
    println!();
    println!("   {} {}", "Album:".dimmed(), result.album_id);
    println!(
        "   {} {}",
        "Computed:".dimmed(),
        format_timestamp(result.computed_at)
    );
    println!(
        "   {} {} (age {})",
        "Served from:".dimmed(),
        status.layer,
        format_age(status.age_sec)
    );
    println!(
        "   {} {} scanned, {} failed",
        "Images:".dimmed(),
        result.summary.images_scanned,
        result.summary.images_failed
    );
    println!();

    for record in &result.keywords {
        if record.verified {
            println!(
                "   {} {} {}",
                "✓".green(),
                record.keyword,
                format!("({} images)", record.image_count).dimmed()
            );
        } else {
            println!("   {} {}", "✗".red(), record.keyword.red());
        }
    }
    if result.keywords.is_empty() {
        println!("   {}", "No curated keywords on this album".dimmed());
    }
}

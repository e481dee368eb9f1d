//! Example showing the aggregator's tracing output over the mock source.
//!
//! Run with: cargo run -p encore-core --example index_tracing

use std::sync::Arc;
use std::time::Duration;

use encore_core::{
    AggregatorConfig, CuratedIndexCache, CuratedIndexService, CuratedIndexer, MockPhotoSource,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::new("encore_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== Curated Index Tracing Demo ===\n");

    let mut source = MockPhotoSource::new()
        .with_album("demo", &["Soundcheck", "Encore", "Backstage"])
        .with_detail_delay(Duration::from_millis(20));
    for i in 0..12 {
        let keywords: &[&str] = match i % 4 {
            0 => &["Soundcheck"],
            1 => &["Backstage", "Crowd"],
            _ => &["Crowd"],
        };
        source = source.with_image("demo", &format!("img{i}"), keywords);
    }
    let source = source.with_failing_image("img5");

    let config = AggregatorConfig {
        page_size: 5,
        ..AggregatorConfig::default()
    };
    println!("Config: {:?}\n", config);

    let cache_dir = std::env::temp_dir().join("encore-index-tracing");
    let cache = Arc::new(CuratedIndexCache::new(cache_dir, config.ttl));
    let service =
        CuratedIndexService::new(CuratedIndexer::new(Arc::new(source), config), cache);

    match service.curated_index("demo", true).await {
        Ok((index, status)) => {
            println!("\n✅ Computed ({})", status.layer);
            println!("   Verified: {:?}", index.verified_keywords);
            println!("   Missing:  {:?}", index.missing_keywords);
            println!(
                "   Images:   {} scanned, {} failed",
                index.summary.images_scanned, index.summary.images_failed
            );
        }
        Err(e) => {
            println!("\n❌ Failed: {}", e);
        }
    }
}

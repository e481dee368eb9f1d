//! Encore CLI - curated keyword verification for SmugMug albums.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use encore_core::aggregator::{DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE};
use encore_core::resolver::DEFAULT_FOLDER_ROOT;
use encore_core::Region;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  65  Curated keywords missing (with --strict)
  69  Photo API unavailable or returned an error
  74  Cannot write output
  78  Configuration error (e.g. SMUGMUG_API_KEY not set)";

#[derive(Parser)]
#[command(name = "encore")]
#[command(author, version, about = "Curated keyword verification for SmugMug albums", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Only print errors (and JSON when requested)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify an album's curated keywords against its images
    Index {
        /// SmugMug album key
        #[arg(value_name = "ALBUM_ID")]
        album_id: String,

        /// Ignore cached results and recompute
        #[arg(long)]
        refresh: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Exit with code 65 when any curated keyword is missing
        #[arg(long)]
        strict: bool,

        /// Directory holding cached results
        #[arg(long, env = "CACHE_DIR", default_value = "cache/curated-index")]
        cache_dir: PathBuf,

        /// Result time-to-live in milliseconds
        #[arg(long, env = "CURATED_INDEX_TTL_MS", default_value_t = 21_600_000)]
        ttl_ms: u64,

        /// Image detail requests in flight at once
        #[arg(long, env = "DETAIL_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Images requested per listing page
        #[arg(long, env = "IMAGE_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Find a band's SmugMug folder from its slug
    Resolve {
        /// Band slug, e.g. the-band-of-gold
        #[arg(value_name = "SLUG")]
        slug: String,

        /// Folder name from the band sheet, tried first
        #[arg(long)]
        folder: Option<String>,

        /// Region folder: Local, Regional, National or International
        #[arg(long, default_value = "Local")]
        region: Region,

        /// Folder holding the per-region band folders
        #[arg(long, env = "SMUGMUG_FOLDER_ROOT", default_value = DEFAULT_FOLDER_ROOT)]
        root: String,

        /// Only list the folder names that would be tried
        #[arg(long)]
        dry_run: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = exit.message {
            eprintln!("Error: {message}");
        }
        std::process::exit(exit.code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Index {
            album_id,
            refresh,
            json,
            strict,
            cache_dir,
            ttl_ms,
            concurrency,
            page_size,
        } => {
            let options = commands::index::IndexOptions {
                refresh,
                json,
                strict,
                quiet: cli.quiet,
                cache_dir,
                ttl_ms,
                concurrency,
                page_size,
            };
            commands::index::execute(album_id, options).await
        }
        Commands::Resolve {
            slug,
            folder,
            region,
            root,
            dry_run,
            json,
        } => {
            let options = commands::resolve::ResolveOptions {
                folder,
                region,
                root,
                dry_run,
                json,
                quiet: cli.quiet,
            };
            commands::resolve::execute(slug, options).await
        }
    }
}

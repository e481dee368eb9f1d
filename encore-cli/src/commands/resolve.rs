//! Resolve command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use encore_core::{folder_candidates, resolve_folder, Region, SmugMugClient};
use serde_json::Value;

use crate::utils::emit;

/// Options for the resolve command.
pub struct ResolveOptions {
    pub folder: Option<String>,
    pub region: Region,
    pub root: String,
    pub dry_run: bool,
    pub json: bool,
    pub quiet: bool,
}

/// Execute the resolve command.
pub async fn execute(slug: String, options: ResolveOptions) -> Result<()> {
    let folder = options
        .folder
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());

    if options.dry_run {
        let candidates = folder_candidates(&slug, folder);
        if options.json {
            emit([serde_json::json!({ "candidates": candidates }).to_string()])?;
        } else {
            emit(
                candidates
                    .iter()
                    .map(|c| format!("{}/{}/{}", options.root, options.region, c)),
            )?;
        }
        return Ok(());
    }

    let source = SmugMugClient::from_env().context("Failed to configure SmugMug client")?;
    let resolution = resolve_folder(&source, &options.root, &slug, folder, options.region).await;

    if options.json {
        let rendered =
            serde_json::to_string_pretty(&resolution).context("Failed to serialize result")?;
        emit([rendered])?;
        return Ok(());
    }
    if options.quiet {
        return Ok(());
    }

    match (&resolution.used_candidate, &resolution.folder_path) {
        (Some(candidate), Some(path)) => {
            println!(
                "{} {} ({})",
                "Found:".green().bold(),
                candidate,
                path.dimmed()
            );
            let albums = resolution
                .albums
                .pointer("/Response/Album")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for album in albums {
                let name = album.get("Name").and_then(Value::as_str).unwrap_or("?");
                let key = album.get("AlbumKey").and_then(Value::as_str).unwrap_or("");
                println!("   {} {}", key.dimmed(), name);
            }
        }
        _ => {
            println!(
                "{} {}",
                "Not found:".yellow().bold(),
                resolution.info.as_deref().unwrap_or_default()
            );
        }
    }
    Ok(())
}

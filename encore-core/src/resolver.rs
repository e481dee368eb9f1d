//! Band-folder resolution.
//!
//! Band names arrive as URL slugs (`the-band-of-gold`) and, sometimes, with
//! the folder name typed into the band sheet. Neither reliably matches the
//! folder name on SmugMug, so several spellings are tried in order under the
//! region folder until one answers with an album list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::upstream::PhotoSource;

/// Default folder holding the per-region band folders.
pub const DEFAULT_FOLDER_ROOT: &str = "user/vmpix/Music/Archives/Bands";

/// Words kept lower-case by smart title casing, except in first position.
const SMALL_WORDS: &[&str] = &[
    "of", "the", "and", "a", "an", "to", "for", "at", "by", "with", "in",
];

/// Region folder a band is filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Region {
    #[default]
    Local,
    Regional,
    National,
    International,
}

impl Region {
    /// Parse a region name; anything unrecognized maps to [`Region::Local`].
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn folder_name(&self) -> &'static str {
        match self {
            Self::Local => "Local",
            Self::Regional => "Regional",
            Self::National => "National",
            Self::International => "International",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Local" => Ok(Self::Local),
            "Regional" => Ok(Self::Regional),
            "National" => Ok(Self::National),
            "International" => Ok(Self::International),
            other => Err(format!("unknown region: {other}")),
        }
    }
}

/// Outcome of a folder resolution.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FolderResolution {
    pub slug: String,
    pub region: Region,
    /// Folder names tried, in order.
    pub candidates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_candidate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    /// Upstream response of the matching folder, or an empty album list.
    pub albums: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl FolderResolution {
    /// Number of albums in the resolved listing.
    pub fn album_count(&self) -> usize {
        self.albums
            .pointer("/Response/Album")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    pub fn is_resolved(&self) -> bool {
        self.used_candidate.is_some()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn dashed(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Folder-name spellings to try for a band, in priority order.
///
/// 1. the sheet folder verbatim, then with whitespace runs dashed;
/// 2. from the slug: smart title case, title case, raw lower, smart title
///    dashed, no spaces.
pub fn folder_candidates(slug: &str, folder_from_sheet: Option<&str>) -> Vec<String> {
    let mut raw = Vec::new();

    if let Some(folder) = folder_from_sheet.filter(|f| !f.is_empty()) {
        raw.push(folder.to_string());
        raw.push(dashed(folder));
    }

    let raw_lower = slug.replace('-', " ");
    let words: Vec<&str> = raw_lower.split(' ').filter(|w| !w.is_empty()).collect();

    let title_smart = words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let lower = w.to_lowercase();
            if i != 0 && SMALL_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let title_all = words
        .iter()
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ");

    let no_spaces: String = raw_lower.split_whitespace().collect();
    let dashed_smart = dashed(&title_smart);

    raw.extend([title_smart, title_all, raw_lower, dashed_smart, no_spaces]);

    let mut candidates: Vec<String> = Vec::with_capacity(raw.len());
    for candidate in raw {
        if !candidate.trim().is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Try each candidate under `{root}/{region}` until one lists albums.
#[instrument(level = "info", skip(source), fields(source = source.source_name()))]
pub async fn resolve_folder(
    source: &dyn PhotoSource,
    root: &str,
    slug: &str,
    folder_from_sheet: Option<&str>,
    region: Region,
) -> FolderResolution {
    let candidates = folder_candidates(slug, folder_from_sheet);
    let parent = format!("{}/{region}", root.trim_matches('/'));

    for candidate in &candidates {
        let folder_path = format!("{parent}/{candidate}");
        debug!(folder_path = %folder_path, "Trying folder candidate");

        match source.fetch_folder_albums(&parent, candidate).await {
            Ok(body) if body.pointer("/Response/Album").is_some_and(Value::is_array) => {
                info!(candidate = %candidate, "Band folder resolved");
                return FolderResolution {
                    slug: slug.to_string(),
                    region,
                    candidates: candidates.clone(),
                    used_candidate: Some(candidate.clone()),
                    folder_path: Some(folder_path),
                    albums: body,
                    info: None,
                };
            }
            Ok(_) => debug!(candidate = %candidate, "Folder has no album list"),
            Err(e) => debug!(candidate = %candidate, error = %e, "Folder candidate failed"),
        }
    }

    let message = format!(
        "No albums found for slug={slug} (tried: {})",
        candidates.join(" | ")
    );
    info!("{message}");

    FolderResolution {
        slug: slug.to_string(),
        region,
        candidates,
        used_candidate: None,
        folder_path: None,
        albums: json!({"Response": {"Album": []}}),
        info: Some(message),
    }
}

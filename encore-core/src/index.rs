//! Curated-index result types.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::keywords::normalize_keyword;

/// Verification status of one curated keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct KeywordVerificationRecord {
    /// Curated keyword, display casing preserved.
    #[cfg_attr(feature = "openapi", schema(example = "Soundcheck"))]
    pub keyword: String,
    /// Whether at least one image carries the keyword.
    pub verified: bool,
    /// Number of images carrying the keyword.
    #[cfg_attr(feature = "openapi", schema(example = 2))]
    pub image_count: u64,
}

/// Summary counts for one computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    /// Distinct curated keywords after normalization.
    pub curated_keyword_count: usize,
    /// Images listed by pagination, including those whose detail failed.
    pub images_scanned: usize,
    /// Images skipped because their detail fetch failed.
    pub images_failed: usize,
    /// Distinct normalized keywords observed across all images.
    pub distinct_keywords: usize,
}

/// Curated-keyword index for one album.
///
/// Produced fresh by the aggregator and never mutated afterwards; a later
/// computation supersedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CuratedIndexResult {
    /// Album identifier (SmugMug album key).
    #[cfg_attr(feature = "openapi", schema(example = "hTxK9q"))]
    pub album_id: String,
    /// Computation time, Unix milliseconds.
    pub computed_at: i64,
    /// Time-to-live configured when the result was produced.
    pub ttl_ms: u64,
    pub summary: IndexSummary,
    /// One record per curated keyword, in curated order.
    pub keywords: Vec<KeywordVerificationRecord>,
    pub verified_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    /// Normalized keyword → number of images carrying it.
    pub frequency: BTreeMap<String, u64>,
}

/// Inputs gathered by the aggregator for one album.
#[derive(Debug, Clone, Default)]
pub struct IndexInputs {
    pub curated: Vec<String>,
    pub frequency: BTreeMap<String, u64>,
    pub images_scanned: usize,
    pub images_failed: usize,
}

impl CuratedIndexResult {
    /// Cross-reference curated keywords against the observed frequency table.
    ///
    /// Curated keywords are deduplicated by normalized form; the first
    /// display form is kept. Keywords that normalize to nothing are dropped.
    pub fn verify(album_id: &str, inputs: IndexInputs, ttl_ms: u64, computed_at: i64) -> Self {
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();
        let mut verified_keywords = Vec::new();
        let mut missing_keywords = Vec::new();

        for keyword in &inputs.curated {
            let normalized = normalize_keyword(keyword);
            if normalized.is_empty() || !seen.insert(normalized.clone()) {
                continue;
            }

            let image_count = inputs.frequency.get(&normalized).copied().unwrap_or(0);
            let verified = image_count > 0;
            let display = keyword.trim().to_string();

            if verified {
                verified_keywords.push(display.clone());
            } else {
                missing_keywords.push(display.clone());
            }
            keywords.push(KeywordVerificationRecord {
                keyword: display,
                verified,
                image_count,
            });
        }

        Self {
            album_id: album_id.to_string(),
            computed_at,
            ttl_ms,
            summary: IndexSummary {
                curated_keyword_count: keywords.len(),
                images_scanned: inputs.images_scanned,
                images_failed: inputs.images_failed,
                distinct_keywords: inputs.frequency.len(),
            },
            keywords,
            verified_keywords,
            missing_keywords,
            frequency: inputs.frequency,
        }
    }

    /// Age of the result at `now_ms`, clamped at zero.
    pub fn age_ms(&self, now_ms: i64) -> u64 {
        now_ms.saturating_sub(self.computed_at).max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(curated: &[&str], freq: &[(&str, u64)]) -> IndexInputs {
        IndexInputs {
            curated: curated.iter().map(|s| s.to_string()).collect(),
            frequency: freq.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            images_scanned: 7,
            images_failed: 0,
        }
    }

    #[test]
    fn test_verify_partitions_curated_keywords() {
        let result = CuratedIndexResult::verify(
            "alb",
            inputs(&["Soundcheck", "Encore"], &[("soundcheck", 2), ("crowd", 5)]),
            1000,
            42,
        );

        assert_eq!(result.verified_keywords, vec!["Soundcheck"]);
        assert_eq!(result.missing_keywords, vec!["Encore"]);
        assert_eq!(result.keywords[0].image_count, 2);
        assert!(!result.keywords[1].verified);
        assert_eq!(result.summary.curated_keyword_count, 2);
        assert_eq!(result.summary.distinct_keywords, 2);
    }

    #[test]
    fn test_verify_never_adds_keywords() {
        let result = CuratedIndexResult::verify(
            "alb",
            inputs(&["Encore"], &[("drums", 3), ("bass", 1)]),
            1000,
            0,
        );
        let listed: Vec<_> = result.keywords.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(listed, vec!["Encore"]);
    }

    #[test]
    fn test_verify_dedupes_by_normalized_form() {
        let result = CuratedIndexResult::verify(
            "alb",
            inputs(&[" Stage  Left", "stage left", "", "   "], &[("stage left", 1)]),
            1000,
            0,
        );
        assert_eq!(result.keywords.len(), 1);
        assert_eq!(result.verified_keywords, vec!["Stage  Left"]);
    }

    #[test]
    fn test_age_is_clamped() {
        let result = CuratedIndexResult::verify("a", IndexInputs::default(), 10, 1_000);
        assert_eq!(result.age_ms(1_500), 500);
        assert_eq!(result.age_ms(500), 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = CuratedIndexResult::verify("a", inputs(&["X"], &[("x", 1)]), 10, 1);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["verifiedKeywords"].is_array());
        assert!(json["missingKeywords"].is_array());
        assert_eq!(json["summary"]["imagesScanned"], 7);
        assert_eq!(json["keywords"][0]["imageCount"], 1);
        assert_eq!(json["computedAt"], 1);
    }
}

use thiserror::Error;

/// Maximum number of characters of an upstream body kept in errors and logs.
pub const BODY_SNIPPET_CHARS: usize = 300;

#[derive(Error, Debug)]
pub enum EncoreError {
    #[error("Upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    #[error("Aggregation failed for album {album_id}: {reason}")]
    AggregationFailure { album_id: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EncoreError {
    /// Build an upstream error, truncating the body to a short snippet.
    pub fn upstream(status: u16, body: &str) -> Self {
        Self::Upstream {
            status,
            body: snippet(body),
        }
    }

    /// Whether the failure came from talking to the photo API.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::Network(_) | Self::InvalidResponse(_)
        )
    }
}

impl From<reqwest::Error> for EncoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

/// Truncate a response body on a character boundary.
pub fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, EncoreError>;

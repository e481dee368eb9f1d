//! Keyword extraction from SmugMug JSON payloads.
//!
//! SmugMug exposes keywords in several shapes depending on the endpoint and
//! the `_expand` options used:
//!
//! - `KeywordArray: [{"Name": "Encore"}, ...]` (objects)
//! - `KeywordArray: ["Encore", ...]` (plain strings)
//! - `Keywords: "Encore; Soundcheck"` (a single delimited string)
//!
//! Extraction keeps display casing. Matching uses [`normalize_keyword`].

use serde_json::Value;

/// Keyword payload shapes understood by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordShape {
    /// Array of keyword objects, names taken from `Name` (or `value`).
    ObjectArray(Vec<String>),
    /// Array of plain strings.
    StringArray(Vec<String>),
    /// Comma- or semicolon-separated string.
    Delimited(String),
    /// No keywords present.
    Absent,
}

impl KeywordShape {
    /// Detect the keyword shape carried by an album or image entity.
    ///
    /// A non-empty structured array wins over a delimited string.
    pub fn detect(entity: &Value) -> Self {
        for field in ["KeywordArray", "Keywords"] {
            if let Some(items) = entity.get(field).and_then(Value::as_array) {
                if let Some(shape) = Self::from_array(items) {
                    return shape;
                }
            }
        }

        match entity.get("Keywords").and_then(Value::as_str) {
            Some(s) if !s.trim().is_empty() => Self::Delimited(s.to_string()),
            _ => Self::Absent,
        }
    }

    fn from_array(items: &[Value]) -> Option<Self> {
        let has_objects = items.iter().any(Value::is_object);
        let names: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj
                    .get("Name")
                    .and_then(Value::as_str)
                    .or_else(|| obj.get("value").and_then(Value::as_str)),
                _ => None,
            })
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if names.is_empty() {
            None
        } else if has_objects {
            Some(Self::ObjectArray(names))
        } else {
            Some(Self::StringArray(names))
        }
    }

    /// Flatten into trimmed, non-empty keywords in original case.
    pub fn into_keywords(self) -> Vec<String> {
        match self {
            Self::ObjectArray(names) | Self::StringArray(names) => names,
            Self::Delimited(s) => split_delimited(&s),
            Self::Absent => Vec::new(),
        }
    }
}

/// Split a `,`/`;` delimited keyword string.
pub fn split_delimited(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Normalize a keyword for matching: trim, collapse whitespace, lower-case.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extract curated keywords from an album metadata response.
///
/// Looks at `Response.Album` first and falls back to `Response` itself.
pub fn extract_album_keywords(json: &Value) -> Vec<String> {
    let response = json.get("Response").unwrap_or(json);
    if let Some(album) = response.get("Album").filter(|a| a.is_object()) {
        let keywords = KeywordShape::detect(album).into_keywords();
        if !keywords.is_empty() {
            return keywords;
        }
    }
    KeywordShape::detect(response).into_keywords()
}

/// Extract keywords from an image detail response.
///
/// The image entity is nested as `Response.AlbumImage` or `Response.Image`;
/// a top-level `Response.KeywordArray` is used when the entity has none.
pub fn extract_image_keywords(json: &Value) -> Vec<String> {
    let response = json.get("Response").unwrap_or(json);

    let entity = response
        .get("AlbumImage")
        .filter(|v| v.is_object())
        .or_else(|| response.get("Image").filter(|v| v.is_object()));

    if let Some(entity) = entity {
        let keywords = KeywordShape::detect(entity).into_keywords();
        if !keywords.is_empty() {
            return keywords;
        }
    }

    response
        .get("KeywordArray")
        .and_then(Value::as_array)
        .and_then(|items| KeywordShape::from_array(items))
        .map(KeywordShape::into_keywords)
        .unwrap_or_default()
}

//! Image listing parsing for paginated `album!images` responses.

use serde_json::Value;

/// Collections that may carry the images of a page, in lookup order.
const IMAGE_COLLECTIONS: &[&str] = &["AlbumImage", "Images", "Image"];

/// Return the image entries of one page, tolerating array and single-object forms.
pub fn page_images(page: &Value) -> Vec<&Value> {
    let response = page.get("Response").unwrap_or(page);

    for field in IMAGE_COLLECTIONS {
        if let Some(node) = response.get(*field) {
            return as_entries(node);
        }
    }

    response
        .get("Album")
        .and_then(|album| album.get("Image"))
        .map(as_entries)
        .unwrap_or_default()
}

fn as_entries(node: &Value) -> Vec<&Value> {
    match node {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Number of entries on a page, used for the short-page termination rule.
pub fn page_len(page: &Value) -> usize {
    page_images(page).len()
}

/// Image keys listed on a page. Entries without a key are skipped.
pub fn extract_image_keys(page: &Value) -> Vec<String> {
    page_images(page)
        .into_iter()
        .filter_map(image_key)
        .collect()
}

fn image_key(entry: &Value) -> Option<String> {
    entry
        .get("ImageKey")
        .and_then(Value::as_str)
        .or_else(|| {
            entry
                .get("Image")
                .and_then(|img| img.get("ImageKey"))
                .and_then(Value::as_str)
        })
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
}

/// Album entity embedded in an images page, if the upstream expanded it.
pub fn page_album(page: &Value) -> Option<&Value> {
    page.get("Response")
        .unwrap_or(page)
        .get("Album")
        .filter(|album| album.is_object())
}

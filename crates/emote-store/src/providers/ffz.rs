//! FrankerFaceZ payload normalization.
//!
//! Room and global responses share one shape: named sets, each carrying
//! its emoticons. The global catalog arrives as several per-set
//! payloads, so global entries go through the additive merge.

use std::collections::HashMap;

use serde::Deserialize;

use super::collect_records;
use crate::{CatalogError, GenericEmote};

/// FFZ room or global response envelope.
#[derive(Debug, Deserialize)]
pub struct FfzResponse {
    pub sets: HashMap<String, FfzSet>,
}

#[derive(Debug, Deserialize)]
pub struct FfzSet {
    #[serde(default)]
    pub emoticons: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FfzEmote {
    id: u64,
    name: String,
    urls: HashMap<String, String>,
}

/// Parse a raw FFZ payload into a keyword-keyed emote table.
pub fn parse_payload(bytes: &[u8]) -> Result<HashMap<String, GenericEmote>, CatalogError> {
    let response: FfzResponse = serde_json::from_slice(bytes)?;
    Ok(normalize(response))
}

/// Normalize an already-deserialized FFZ response.
pub fn normalize(response: FfzResponse) -> HashMap<String, GenericEmote> {
    let mut emotes = HashMap::new();
    for set in response.sets.into_values() {
        emotes.extend(collect_records(set.emoticons, "ffz", normalize_emote));
    }
    emotes
}

fn normalize_emote(record: serde_json::Value) -> Result<GenericEmote, CatalogError> {
    let emote: FfzEmote = serde_json::from_value(record)?;
    // Prefer the largest resolution FFZ serves; the scale factor tells
    // the renderer how far to shrink it.
    let (render_scale, url) = if let Some(url) = emote.urls.get("4") {
        (1, url)
    } else if let Some(url) = emote.urls.get("2") {
        (2, url)
    } else if let Some(url) = emote.urls.get("1") {
        (4, url)
    } else {
        return Err(CatalogError::MissingField { field: "urls" });
    };
    Ok(GenericEmote {
        keyword: emote.name,
        id: emote.id.to_string(),
        // FFZ serves protocol-relative URLs.
        image_url: format!("https:{url}"),
        is_animated: false,
        render_scale,
    })
}

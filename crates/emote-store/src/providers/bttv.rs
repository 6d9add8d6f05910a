//! BetterTTV payload normalization.

use std::collections::HashMap;

use serde::Deserialize;

use super::collect_records;
use crate::{CatalogError, GenericEmote};

const BTTV_EMOTE_BASE: &str = "https://cdn.betterttv.net/emote/";
const BTTV_EMOTE_SIZE: &str = "3x";

/// BTTV channel or global response envelope.
#[derive(Debug, Deserialize)]
pub struct BttvResponse {
    #[serde(default)]
    pub emotes: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct BttvEmote {
    id: String,
    code: String,
    #[serde(rename = "imageType")]
    image_type: String,
}

/// Parse a raw BTTV payload into a keyword-keyed emote table.
pub fn parse_payload(bytes: &[u8]) -> Result<HashMap<String, GenericEmote>, CatalogError> {
    let response: BttvResponse = serde_json::from_slice(bytes)?;
    Ok(normalize(response))
}

/// Normalize an already-deserialized BTTV response.
pub fn normalize(response: BttvResponse) -> HashMap<String, GenericEmote> {
    collect_records(response.emotes, "bttv", normalize_emote)
}

fn normalize_emote(record: serde_json::Value) -> Result<GenericEmote, CatalogError> {
    let emote: BttvEmote = serde_json::from_value(record)?;
    Ok(GenericEmote {
        keyword: emote.code,
        image_url: format!("{BTTV_EMOTE_BASE}{}/{BTTV_EMOTE_SIZE}", emote.id),
        is_animated: emote.image_type == "gif",
        render_scale: 1,
        id: emote.id,
    })
}

//! Adapters that normalize provider wire payloads into [`GenericEmote`]s.
//!
//! Each adapter receives already-fetched payload bytes (or the
//! deserialized payload struct) and produces a keyword-keyed table
//! ready for the catalog store. A single malformed record is logged and
//! skipped; it never aborts the refresh.
//!
//! [`GenericEmote`]: crate::GenericEmote

pub mod bttv;
pub mod ffz;

use std::collections::HashMap;

use crate::{CatalogError, GenericEmote};

/// Convert raw JSON records one at a time, skipping malformed ones.
fn collect_records<F>(
    records: Vec<serde_json::Value>,
    provider: &'static str,
    normalize: F,
) -> HashMap<String, GenericEmote>
where
    F: Fn(serde_json::Value) -> Result<GenericEmote, CatalogError>,
{
    let mut emotes = HashMap::with_capacity(records.len());
    for record in records {
        match normalize(record) {
            Ok(emote) => {
                emotes.insert(emote.keyword.clone(), emote);
            }
            Err(e) => {
                tracing::warn!(provider, error = %e, "Skipping malformed emote record");
            }
        }
    }
    emotes
}

//! Message scanning: first-party inline markup plus third-party keywords.
//!
//! Two independent passes whose results are concatenated. Offsets are
//! counted in characters, matching the first-party wire convention of
//! inclusive 0-based `"start-end"` ranges.

use crate::catalog::CatalogStore;
use crate::{CatalogError, ChatEmote};

const TWITCH_EMOTE_BASE: &str = "https://static-cdn.jtvnw.net/emoticons/v1/";
const TWITCH_EMOTE_SIZE: &str = "3.0";

/// Parse first-party inline emote markup.
///
/// Grammar: a digit-run identifier, `:`, one or more comma-separated
/// `start-end` digit pairs, groups separated by `;`. Span substrings
/// are passed through verbatim, not reparsed. Bytes that do not fit the
/// grammar are skipped, so one malformed group never drops the rest.
/// Duplicate ids are not de-duplicated.
pub fn parse_inline_emotes(markup: &str) -> Vec<ChatEmote> {
    let bytes = markup.as_bytes();
    let mut emotes = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let id_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b':' {
            continue;
        }
        let id = &markup[id_start..i];
        i += 1;

        let mut spans = Vec::new();
        while let Some(end) = scan_span(bytes, i) {
            spans.push(markup[i..end].to_string());
            i = end;
            if i < bytes.len() && bytes[i] == b',' {
                i += 1;
            } else {
                break;
            }
        }
        if spans.is_empty() {
            continue;
        }
        emotes.push(ChatEmote {
            spans,
            image_url: format!("{TWITCH_EMOTE_BASE}{id}/{TWITCH_EMOTE_SIZE}"),
            id: id.to_string(),
            keyword: String::new(),
            render_scale: 1,
            is_animated: false,
        });
    }
    emotes
}

/// Scan one `digit-digit` pair starting at `i`; returns the exclusive
/// end index of the pair.
fn scan_span(bytes: &[u8], mut i: usize) -> Option<usize> {
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == start || i >= bytes.len() || bytes[i] != b'-' {
        return None;
    }
    i += 1;
    let end_digits = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == end_digits {
        return None;
    }
    Some(i)
}

/// Locate third-party emotes by exact keyword match on space-split
/// tokens.
///
/// The message is split on single spaces; each token's start offset
/// accumulates token length plus one for the consumed space. A token
/// matches when its trimmed text equals the keyword (case-sensitive,
/// whole token only). All occurrences of one keyword collect into one
/// [`ChatEmote`]; keywords with no occurrence are dropped.
pub fn find_third_party_emotes(
    message: &str,
    channel: &str,
    store: &CatalogStore,
) -> Result<Vec<ChatEmote>, CatalogError> {
    if message.is_empty() {
        return Ok(Vec::new());
    }
    let view = store.merged_channel_view(channel)?;
    let mut emotes = Vec::new();
    for (keyword, emote) in &view {
        let mut offset = 0;
        let mut spans = Vec::new();
        for token in message.split(' ') {
            let len = token.chars().count();
            if !token.is_empty() && token.trim() == keyword {
                spans.push(format!("{offset}-{}", offset + len - 1));
            }
            offset += len + 1;
        }
        if spans.is_empty() {
            continue;
        }
        emotes.push(ChatEmote {
            spans,
            image_url: emote.image_url.clone(),
            id: emote.id.clone(),
            keyword: keyword.clone(),
            render_scale: emote.render_scale,
            is_animated: emote.is_animated,
        });
    }
    Ok(emotes)
}

/// Resolve every emote occurrence in a message: inline-markup results
/// first, then third-party keyword matches in merged-view order.
pub fn resolve_message(
    message: &str,
    inline_markup: &str,
    channel: &str,
    store: &CatalogStore,
) -> Result<Vec<ChatEmote>, CatalogError> {
    let mut emotes = parse_inline_emotes(inline_markup);
    emotes.extend(find_third_party_emotes(message, channel, store)?);
    Ok(emotes)
}

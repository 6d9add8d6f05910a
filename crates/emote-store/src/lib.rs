//! Chat emote catalog and message resolution.
//!
//! Maintains per-channel and global emote tables for third-party
//! providers, resolves which substrings of a chat message render as
//! emote images, and keeps channel/global badge catalogs.
//!
//! Network fetching and image decoding live elsewhere; this crate
//! consumes already-fetched payload bytes (or deserialized payload
//! structs) and produces located emote occurrences.

pub mod badges;
pub mod catalog;
pub mod providers;
pub mod resolver;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized third-party emote record.
///
/// Built once by a provider adapter and immutable afterwards; a channel
/// refresh replaces records rather than mutating them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericEmote {
    /// Literal text a user types to render this emote.
    pub keyword: String,
    /// Provider-assigned identifier.
    pub id: String,
    /// Resolved URL for the preferred image size.
    pub image_url: String,
    pub is_animated: bool,
    /// Display scale factor; 1 means the URL serves the largest size.
    pub render_scale: u32,
}

/// A located emote occurrence within one message.
///
/// Constructed fresh per resolution call and handed straight to the
/// rendering layer; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEmote {
    /// Inclusive `"start-end"` character-offset ranges, 0-based.
    pub spans: Vec<String>,
    pub image_url: String,
    pub id: String,
    pub keyword: String,
    pub render_scale: u32,
    pub is_animated: bool,
}

/// Third-party emote sources feeding the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmoteProvider {
    Ffz,
    Bttv,
}

impl EmoteProvider {
    /// Default precedence for the merged channel view, weakest first.
    ///
    /// Within the same scope (channel or global) a later provider
    /// overwrites an earlier one on keyword collision; channel-scoped
    /// tables always beat global ones regardless of provider.
    pub const PRECEDENCE: [EmoteProvider; 2] = [EmoteProvider::Ffz, EmoteProvider::Bttv];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ffz => "ffz",
            Self::Bttv => "bttv",
        }
    }
}

impl fmt::Display for EmoteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unified error type for the emote-store crate.
///
/// Lookup misses are not errors; they surface as `Option`/empty
/// collections.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload record missing field: {field}")]
    MissingField { field: &'static str },

    #[error("catalog lock poisoned")]
    LockPoisoned,
}

//! Channel and global badge catalogs.
//!
//! Simpler than the emote catalog: channel tables are replaced
//! wholesale, the global table is merged additively, and the two are
//! queried through separate entry points instead of a merged view.
//! All lookups fail softly.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;

/// Image URLs for one badge version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BadgeImage {
    #[serde(rename = "image_url_1x")]
    pub image_url_low: String,
    #[serde(rename = "image_url_2x", default)]
    pub image_url_medium: String,
    #[serde(rename = "image_url_4x")]
    pub image_url_high: String,
}

/// Versions of one badge set, keyed by version name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BadgeVersions {
    pub versions: HashMap<String, BadgeImage>,
}

/// A badge payload: set name to versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BadgeSets {
    #[serde(rename = "badge_sets")]
    pub sets: HashMap<String, BadgeVersions>,
}

/// Channel-scoped and global badge tables.
pub struct BadgeStore {
    channels: DashMap<String, Arc<BadgeSets>>,
    global: DashMap<String, BadgeVersions>,
}

impl BadgeStore {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            global: DashMap::new(),
        }
    }

    /// Wholesale replace of a channel's badge sets.
    pub fn set_channel_badges(&self, channel: &str, sets: BadgeSets) {
        let count = sets.sets.len();
        self.channels.insert(channel.to_string(), Arc::new(sets));
        tracing::debug!(channel, count, "Replaced channel badges");
    }

    /// Additive merge into the global table.
    ///
    /// An overlapping set name replaces only that set's versions;
    /// unrelated sets are untouched.
    pub fn merge_global_badges(&self, sets: BadgeSets) {
        let count = sets.sets.len();
        for (set, versions) in sets.sets {
            self.global.insert(set, versions);
        }
        tracing::debug!(count, total = self.global.len(), "Merged global badges");
    }

    /// High-resolution badge URL from a channel's table, if present.
    pub fn badge_url(&self, channel: &str, set: &str, version: &str) -> Option<String> {
        self.channels
            .get(channel)?
            .sets
            .get(set)?
            .versions
            .get(version)
            .map(|image| image.image_url_high.clone())
    }

    /// High-resolution badge URL from the global table, if present.
    pub fn global_badge_url(&self, set: &str, version: &str) -> Option<String> {
        self.global
            .get(set)?
            .versions
            .get(version)
            .map(|image| image.image_url_high.clone())
    }
}

impl Default for BadgeStore {
    fn default() -> Self {
        Self::new()
    }
}

//! Per-provider emote tables and the merged channel view.
//!
//! Channel tables are replaced wholesale on refresh; global tables grow
//! additively. Readers always observe a table either entirely before or
//! entirely after a refresh because publication is a single `Arc` swap
//! of a map built off-lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use crate::{CatalogError, EmoteProvider, GenericEmote};

/// One provider's keyword table, published as an immutable snapshot.
pub type EmoteTable = Arc<HashMap<String, GenericEmote>>;

#[derive(Default)]
struct ProviderTables {
    channels: DashMap<String, EmoteTable>,
    global: RwLock<EmoteTable>,
}

/// Emote catalog for all providers, channel-scoped and global.
///
/// Owned by the chat-session context and shared by reference; safe for
/// concurrent refresh writers and message-resolution readers.
/// Cross-channel refreshes do not contend with each other.
pub struct CatalogStore {
    providers: HashMap<EmoteProvider, ProviderTables>,
    precedence: Vec<EmoteProvider>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::with_precedence(EmoteProvider::PRECEDENCE.to_vec())
    }

    /// Build a store with an explicit provider precedence, weakest first.
    pub fn with_precedence(precedence: Vec<EmoteProvider>) -> Self {
        let providers = [EmoteProvider::Ffz, EmoteProvider::Bttv]
            .into_iter()
            .map(|provider| (provider, ProviderTables::default()))
            .collect();
        Self {
            providers,
            precedence,
        }
    }

    fn tables(&self, provider: EmoteProvider) -> &ProviderTables {
        // Every variant is seeded in the constructor.
        &self.providers[&provider]
    }

    /// Atomically replace the whole table for `(provider, channel)`.
    ///
    /// A reader holding the previous snapshot keeps it; new lookups see
    /// only the new table. Partial tables are never observable.
    pub fn replace_channel_table(
        &self,
        provider: EmoteProvider,
        channel: &str,
        table: HashMap<String, GenericEmote>,
    ) {
        let count = table.len();
        self.tables(provider)
            .channels
            .insert(channel.to_string(), Arc::new(table));
        tracing::info!(provider = %provider, channel, count, "Replaced channel emote table");
    }

    /// Additively merge entries into the provider's global table.
    ///
    /// Prior entries survive; colliding keywords are overwritten. Some
    /// providers deliver their global catalog as several per-set
    /// payloads, which is why this is a merge and not a replace.
    pub fn merge_global_table(
        &self,
        provider: EmoteProvider,
        entries: HashMap<String, GenericEmote>,
    ) -> Result<(), CatalogError> {
        let added = entries.len();
        let mut global = self
            .tables(provider)
            .global
            .write()
            .map_err(|_| CatalogError::LockPoisoned)?;
        let mut merged = HashMap::clone(&global);
        merged.extend(entries);
        let total = merged.len();
        *global = Arc::new(merged);
        drop(global);
        tracing::debug!(provider = %provider, added, total, "Merged global emote table");
        Ok(())
    }

    /// Current channel table snapshot, if the channel has been loaded.
    pub fn channel_table(&self, provider: EmoteProvider, channel: &str) -> Option<EmoteTable> {
        self.tables(provider)
            .channels
            .get(channel)
            .map(|table| Arc::clone(table.value()))
    }

    /// Current global table snapshot for one provider.
    pub fn global_table(&self, provider: EmoteProvider) -> Result<EmoteTable, CatalogError> {
        let global = self
            .tables(provider)
            .global
            .read()
            .map_err(|_| CatalogError::LockPoisoned)?;
        Ok(Arc::clone(&global))
    }

    /// Union of all tables applicable to `channel`, ready for scanning.
    ///
    /// Layered weakest-first: global tables in precedence order, then
    /// channel tables in precedence order, later layers overwriting
    /// earlier ones on keyword collision. The `BTreeMap` gives the
    /// resolver a deterministic iteration order.
    pub fn merged_channel_view(
        &self,
        channel: &str,
    ) -> Result<BTreeMap<String, GenericEmote>, CatalogError> {
        let mut view = BTreeMap::new();
        for provider in &self.precedence {
            let global = self.global_table(*provider)?;
            for (keyword, emote) in global.iter() {
                view.insert(keyword.clone(), emote.clone());
            }
        }
        for provider in &self.precedence {
            if let Some(table) = self.channel_table(*provider, channel) {
                for (keyword, emote) in table.iter() {
                    view.insert(keyword.clone(), emote.clone());
                }
            }
        }
        Ok(view)
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

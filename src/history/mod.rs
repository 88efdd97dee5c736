//! Generation history
//!
//! An append-only log of completed generations, newest first, persisted as
//! one JSON array in a named storage slot. The in-memory log is the source
//! of truth for the running process; every mutation rewrites the slot.

pub mod render;

pub use render::{render_export, render_export_in};

use crate::error::Result;
use crate::storage::SlotStorage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use ulid::Generator;

/// One completed generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// ULID; sorts by creation time
    pub id: String,
    pub template_title: String,
    /// Prompt text as typed, without context augmentation
    pub prompt: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Whether `needle` (already lowercased) occurs in any searchable field
    fn matches(&self, needle: &str) -> bool {
        [&self.template_title, &self.prompt, &self.result]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Explicit yes/no decision required before clearing history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

impl Confirmation {
    /// Interpret a typed answer; only an explicit "s"/"sim"/"y"/"yes" confirms
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "s" | "sim" | "y" | "yes" => Confirmation::Yes,
            _ => Confirmation::No,
        }
    }
}

/// Write-through history log over a storage slot
pub struct HistoryStore {
    storage: Arc<dyn SlotStorage>,
    slot: String,
    entries: Vec<HistoryEntry>,
    ids: Generator,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("slot", &self.slot)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl HistoryStore {
    /// Open the store and load whatever the slot currently holds
    pub fn open(storage: Arc<dyn SlotStorage>, slot: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            slot: slot.into(),
            entries: Vec::new(),
            ids: Generator::new(),
        };
        store.load();
        store
    }

    /// Reload the log from storage
    ///
    /// Unreadable or malformed data yields an empty log; the failure is
    /// logged and never propagated.
    pub fn load(&mut self) -> &[HistoryEntry] {
        self.entries = match self.read_persisted() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("History could not be loaded, starting empty: {:#}", e);
                Vec::new()
            }
        };
        info!("Loaded {} history entries", self.entries.len());
        &self.entries
    }

    fn read_persisted(&self) -> Result<Vec<HistoryEntry>> {
        match self.storage.read_slot(&self.slot)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    /// All entries, newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend an entry and rewrite the persisted log
    pub fn append(&mut self, entry: HistoryEntry) {
        debug!("Appending history entry {}", entry.id);
        self.entries.insert(0, entry);
        self.persist();
    }

    /// Build an entry stamped now and append it
    pub fn record(&mut self, template_title: &str, prompt: &str, result: &str) -> HistoryEntry {
        let entry = HistoryEntry {
            id: self.next_id(),
            template_title: template_title.to_string(),
            prompt: prompt.to_string(),
            result: result.to_string(),
            timestamp: Utc::now(),
        };
        self.append(entry.clone());
        entry
    }

    fn next_id(&mut self) -> String {
        // The monotonic generator only fails when the random part overflows
        // within one millisecond.
        self.ids
            .generate()
            .unwrap_or_else(|_| ulid::Ulid::new())
            .to_string()
    }

    /// Empty the log in memory and in storage
    ///
    /// Returns `true` only when the confirmation was `Yes`.
    pub fn clear(&mut self, confirmation: Confirmation) -> bool {
        if confirmation != Confirmation::Yes {
            debug!("History clear declined");
            return false;
        }

        self.entries.clear();
        if let Err(e) = self.storage.delete_slot(&self.slot) {
            warn!("History cleared in memory only: {:#}", e);
        }
        info!("History cleared");
        true
    }

    /// Case-insensitive substring search over title, prompt and result
    ///
    /// An empty query returns the whole log. Order is preserved.
    pub fn search(&self, query: &str) -> Vec<HistoryEntry> {
        if query.is_empty() {
            return self.entries.clone();
        }

        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.matches(&needle))
            .cloned()
            .collect()
    }

    /// Render entries as a plain-text export
    pub fn export(&self, entries: &[HistoryEntry]) -> String {
        render_export(entries)
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.storage.write_slot(&self.slot, &json));

        if let Err(e) = result {
            warn!("History not durable this session: {:#}", e);
        }
    }
}

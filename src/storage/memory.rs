//! In-process slot storage
//!
//! Used when the SQLite file cannot be opened: history keeps working for the
//! running session but is not durable.

use crate::error::Result;
use crate::storage::SlotStorage;
use std::collections::HashMap;
use std::sync::RwLock;

/// Slot storage held in memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with one slot already written
    pub fn with_slot(name: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        if let Ok(mut slots) = storage.slots.write() {
            slots.insert(name.into(), value.into());
        }
        storage
    }
}

impl SlotStorage for MemoryStorage {
    fn read_slot(&self, name: &str) -> Result<Option<String>> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(name).cloned())
    }

    fn write_slot(&self, name: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete_slot(&self, name: &str) -> Result<()> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.read_slot("h").unwrap().is_none());

        storage.write_slot("h", "v1").unwrap();
        storage.write_slot("h", "v2").unwrap();
        assert_eq!(storage.read_slot("h").unwrap().as_deref(), Some("v2"));

        storage.delete_slot("h").unwrap();
        assert!(storage.read_slot("h").unwrap().is_none());
    }

    #[test]
    fn test_with_slot_prepopulates() {
        let storage = MemoryStorage::with_slot("h", "[]");
        assert_eq!(storage.read_slot("h").unwrap().as_deref(), Some("[]"));
    }
}

//! History persistence across simulated restarts, backed by SQLite

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use educador_ia::history::{Confirmation, HistoryEntry, HistoryStore};
use educador_ia::storage::{SlotStorage, SqliteStorage};

const SLOT: &str = "educador_ia_history";

#[test]
fn test_entries_survive_restart() {
    let (storage, dir) = common::create_temp_storage();

    let mut store = HistoryStore::open(storage, SLOT);
    let first = store.record("Quiz Rápido", "Quiz sobre frações", "1) Quanto é 1/2 + 1/4?");
    let second = store.record("Rubricas", "Rubrica de leitura", "| Critério | Nível |");
    drop(store);

    let reopened = SqliteStorage::new_with_path(dir.path().join("history.db")).unwrap();
    let store = HistoryStore::open(Arc::new(reopened), SLOT);

    assert_eq!(store.entries(), &[second, first]);
}

#[test]
fn test_appended_entry_round_trips_all_fields() {
    let (storage, dir) = common::create_temp_storage();
    let entry = HistoryEntry {
        id: "01HZY3J6S5W9K0V8ZC6T2Y4Q7M".to_string(),
        template_title: "Planos de Aula Personalizados".to_string(),
        prompt: "Plano de 50 minutos".to_string(),
        result: "## Objetivos\n- EF03CI01".to_string(),
        timestamp: Utc.timestamp_millis_opt(1_717_171_717_123).unwrap(),
    };

    let mut store = HistoryStore::open(storage.clone(), SLOT);
    store.append(entry.clone());

    let raw = storage.read_slot(SLOT).unwrap().expect("slot written");
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["templateTitle"], "Planos de Aula Personalizados");
    assert_eq!(json[0]["timestamp"], "2024-05-31T16:08:37.123Z");

    let reopened = SqliteStorage::new_with_path(dir.path().join("history.db")).unwrap();
    let reloaded = HistoryStore::open(Arc::new(reopened), SLOT);
    assert_eq!(reloaded.entries(), &[entry]);
}

#[test]
fn test_clear_then_restart_is_empty() {
    let (storage, dir) = common::create_temp_storage();

    let mut store = HistoryStore::open(storage, SLOT);
    store.record("A", "p", "r");
    store.record("B", "p", "r");
    assert!(store.clear(Confirmation::Yes));
    drop(store);

    let reopened = SqliteStorage::new_with_path(dir.path().join("history.db")).unwrap();
    assert!(HistoryStore::open(Arc::new(reopened), SLOT).is_empty());
}

#[test]
fn test_declined_clear_keeps_persisted_entries() {
    let (storage, _dir) = common::create_temp_storage();

    let mut store = HistoryStore::open(storage.clone(), SLOT);
    store.record("A", "p", "r");
    assert!(!store.clear(Confirmation::from_answer("n")));

    assert_eq!(HistoryStore::open(storage, SLOT).len(), 1);
}

#[test]
fn test_corrupted_slot_loads_empty_and_recovers() {
    let (storage, _dir) = common::create_temp_storage();
    storage.write_slot(SLOT, "[{\"id\": 1").unwrap();

    let mut store = HistoryStore::open(storage.clone(), SLOT);
    assert!(store.is_empty());

    store.record("A", "p", "r");
    assert_eq!(HistoryStore::open(storage, SLOT).len(), 1);
}

#[test]
fn test_load_reflects_external_changes() {
    let (storage, _dir) = common::create_temp_storage();
    let mut store = HistoryStore::open(storage.clone(), SLOT);
    store.record("A", "p", "r");

    storage.delete_slot(SLOT).unwrap();
    assert!(store.load().is_empty());
}

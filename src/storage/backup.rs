//! Whole-workspace backup and restore.
//!
//! The backup payload is a single JSON object mapping logical keys to their
//! stored values, covering every app-owned key family except the login flag.
//! The same payload feeds the optional external sync target.

use anyhow::{bail, Result};
use serde_json::{Map, Value};

use super::{keys, KvStore};

const BACKUP_KEY_PREFIXES: &[&str] = &[
    keys::REPORT_PREFIX,
    keys::LEGACY_REPORT_PREFIX,
    "machines:",
    "engineers:",
    "spareparts:",
];

const BACKUP_EXACT_KEYS: &[&str] = &[
    keys::SECTIONS,
    keys::SETTINGS,
    keys::LEARNED_SUGGESTIONS,
    keys::LAST_ACTIVE_SECTION,
    keys::UNGROUPED_MACHINES,
    keys::UNGROUPED_ENGINEERS,
    keys::UNGROUPED_SPARE_PARTS,
];

fn is_app_key(key: &str) -> bool {
    BACKUP_EXACT_KEYS.contains(&key)
        || BACKUP_KEY_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// Collects every app-owned record into one JSON object.
pub fn gather_all(store: &KvStore) -> Result<Value> {
    let mut object = Map::new();
    for (key, value) in store.scan("")? {
        if is_app_key(&key) {
            object.insert(key, value);
        }
    }
    Ok(Value::Object(object))
}

/// Replaces the app-owned records with the contents of a backup payload.
/// Existing app keys are removed first so stale records do not survive a
/// restore from an older snapshot. Returns the number of records written.
pub fn restore(store: &KvStore, payload: &Value) -> Result<usize> {
    let object = match payload.as_object() {
        Some(object) => object,
        None => bail!("Backup payload must be a JSON object"),
    };
    for (key, _) in store.scan("")? {
        if is_app_key(&key) {
            store.remove(&key)?;
        }
    }
    let mut written = 0;
    for (key, value) in object {
        if !is_app_key(key) {
            continue;
        }
        store.set(key, value)?;
        written += 1;
    }
    Ok(written)
}

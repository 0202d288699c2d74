//! Namespaced key-value persistence for the MaintLog workspace.
//!
//! Records live in a flat directory of JSON envelope files. File names are
//! derived from the SHA-256 of the logical key, so keys may contain section
//! names with arbitrary characters without escaping concerns. The envelope
//! keeps the original key alongside the value, which lets `scan` recover
//! logical keys for prefix queries (range export, analytics, backup).

pub mod backup;
pub mod sync;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::journal::{EventType, Journal};

const RECORDS_SUBDIR: &str = "records";

/// Returns the root directory where MaintLog stores data.
///
/// Order of precedence:
/// 1. `MAINTLOG_HOME` environment variable.
/// 2. OS-specific data directory via `directories::BaseDirs`.
pub fn workspace_root() -> Result<PathBuf> {
    if let Ok(path) = env::var("MAINTLOG_HOME") {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().context("Unable to determine OS data directory")?;
    Ok(base_dirs.data_dir().join("MaintLog"))
}

/// Logical keys for every persisted record family.
pub mod keys {
    use chrono::NaiveDate;

    pub const SECTIONS: &str = "sections";
    pub const SETTINGS: &str = "settings";
    pub const LEARNED_SUGGESTIONS: &str = "suggestions_learned";
    pub const LAST_ACTIVE_SECTION: &str = "last_active_section";
    pub const LOGIN_FLAG: &str = "login_flag";

    pub const REPORT_PREFIX: &str = "report:";
    pub const LEGACY_REPORT_PREFIX: &str = "report_legacy:";

    // Pre-section keys holding ungrouped reference data, read once during
    // default-section migration and never written again.
    pub const UNGROUPED_MACHINES: &str = "machines";
    pub const UNGROUPED_ENGINEERS: &str = "engineers";
    pub const UNGROUPED_SPARE_PARTS: &str = "spareparts";

    pub fn report(date: NaiveDate, section: &str) -> String {
        format!("{REPORT_PREFIX}{}:{section}", date.format("%Y-%m-%d"))
    }

    pub fn legacy_report(date: NaiveDate) -> String {
        format!("{LEGACY_REPORT_PREFIX}{}", date.format("%Y-%m-%d"))
    }

    pub fn machines(section: &str) -> String {
        format!("machines:{section}")
    }

    pub fn engineers(section: &str) -> String {
        format!("engineers:{section}")
    }

    pub fn spare_parts(section: &str) -> String {
        format!("spareparts:{section}")
    }
}

#[derive(Serialize, Deserialize)]
struct KvRecord {
    key: String,
    value: Value,
}

/// Directory-backed key-value store shared by every component.
#[derive(Debug, Clone)]
pub struct KvStore {
    dir: PathBuf,
    journal: Journal,
}

impl KvStore {
    pub fn open(workspace_root: &Path, journal: Journal) -> Result<Self> {
        let dir = workspace_root.join(RECORDS_SUBDIR);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create records directory {}", dir.display()))?;
        Ok(Self { dir, journal })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        let name: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        self.dir.join(format!("{name}.json"))
    }

    /// Reads and deserializes the value stored under `key`.
    ///
    /// Corrupt or unparseable records are journaled and treated as absent so
    /// callers can fall through to their next resolution step.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read record {}", path.display()))?;
        let record: KvRecord = match serde_json::from_str(&data) {
            Ok(record) => record,
            Err(err) => {
                self.journal.note(
                    EventType::MalformedRecordSkipped,
                    serde_json::json!({ "key": key, "error": err.to_string() }),
                );
                return Ok(None);
            }
        };
        match serde_json::from_value(record.value) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                self.journal.note(
                    EventType::MalformedRecordSkipped,
                    serde_json::json!({ "key": key, "error": err.to_string() }),
                );
                Ok(None)
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let record = KvRecord {
            key: key.to_string(),
            value: serde_json::to_value(value)?,
        };
        let path = self.record_path(key);
        let data = serde_json::to_string_pretty(&record)?;
        fs::write(&path, data)
            .with_context(|| format!("Failed to write record {}", path.display()))?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.record_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove record {}", path.display()))?;
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.record_path(key).exists()
    }

    /// Returns all `(key, value)` pairs whose key starts with `prefix`.
    /// Malformed envelopes are journaled and skipped.
    pub fn scan(&self, prefix: &str) -> Result<Vec<(String, Value)>> {
        let mut records = Vec::new();
        if !self.dir.exists() {
            return Ok(records);
        }
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let data = fs::read_to_string(entry.path())
                .with_context(|| format!("Failed to read record {:?}", entry.path()))?;
            let record: KvRecord = match serde_json::from_str(&data) {
                Ok(record) => record,
                Err(err) => {
                    self.journal.note(
                        EventType::MalformedRecordSkipped,
                        serde_json::json!({
                            "path": entry.path().display().to_string(),
                            "error": err.to_string(),
                        }),
                    );
                    continue;
                }
            };
            if record.key.starts_with(prefix) {
                records.push((record.key, record.value));
            }
        }
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

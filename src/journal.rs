//! Append-only JSONL journal of application events.
//!
//! Every state transition worth auditing (migrations, section changes, tool
//! execution, skipped records) is appended here so support questions like
//! "what happened to my Tuesday report" can be answered from disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const JOURNAL_FILE: &str = "events.jsonl";

/// Type of journal events that can be logged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ReportCleared,
    LegacyReportMigrated,
    ReferenceDataMigrated,
    SectionCreated,
    SectionRenamed,
    SectionDeleted,
    SectionSelected,
    ToolExecuted,
    ToolFailed,
    AssistantTurnStarted,
    AssistantTurnFinished,
    MalformedRecordSkipped,
    SyncFailed,
}

/// General-purpose application event stored as JSONL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEvent {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub details: serde_json::Value,
}

/// Wraps the journal file for a workspace.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn at(workspace_root: &Path) -> Self {
        Self {
            path: workspace_root.join(JOURNAL_FILE),
        }
    }

    pub fn append(&self, event_type: EventType, details: serde_json::Value) -> Result<()> {
        let event = JournalEvent {
            event_id: Uuid::new_v4(),
            event_type,
            timestamp: Utc::now(),
            details,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(serde_json::to_string(&event)?.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    /// Best-effort append used on paths that must not fail because of the
    /// journal itself (e.g. while reporting a corrupt record).
    pub fn note(&self, event_type: EventType, details: serde_json::Value) {
        let _ = self.append(event_type, details);
    }

    pub fn load_events(&self) -> Result<Vec<JournalEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        let mut events = Vec::new();
        for line in data.lines().filter(|l| !l.trim().is_empty()) {
            let event: JournalEvent = serde_json::from_str(line)?;
            events.push(event);
        }
        Ok(events)
    }

    pub fn load_events_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<JournalEvent>> {
        Ok(self
            .load_events()?
            .into_iter()
            .filter(|event| event.timestamp >= cutoff)
            .collect())
    }
}

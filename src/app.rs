//! The application-state container.
//!
//! Owns the key-value store, the section manager, the settings, and the
//! undo/redo history around the currently displayed report, with explicit
//! read/write ownership instead of ambient globals. The repository is the
//! sole writer of persisted report records; the history controller is the
//! sole owner of the in-memory current report.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::chat::{bridge, AssistantTurn, RawToolCall, ToolResult};
use crate::journal::{EventType, Journal};
use crate::reports::{Report, ReportHistory, ReportRepository};
use crate::sections::SectionManager;
use crate::settings::AppSettings;
use crate::storage::sync::{SyncError, SyncTarget};
use crate::storage::{backup, keys, workspace_root, KvStore};
use crate::suggestions::LearnedSuggestions;

/// How often the host should poll [`App::flush_if_dirty`]. Bounds data loss
/// on crash to one interval without writing on every keystroke.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);

/// Interval clock for the autosave poll. `poll` returns true once per
/// elapsed interval; the flush itself always reads the latest in-memory
/// snapshot at fire time.
#[derive(Debug)]
pub struct AutosaveTimer {
    interval: Duration,
    last: Instant,
}

impl AutosaveTimer {
    pub fn new() -> Self {
        Self::with_interval(AUTOSAVE_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    pub fn poll(&mut self) -> bool {
        if self.last.elapsed() >= self.interval {
            self.last = Instant::now();
            true
        } else {
            false
        }
    }
}

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self::new()
    }
}

// Placeholder credentials; the login gate is not an authentication boundary.
const LOGIN_PAIRS: &[(&str, &str)] = &[("user", "pass"), ("admin", "admin")];

pub struct App {
    store: KvStore,
    journal: Journal,
    repo: ReportRepository,
    pub settings: AppSettings,
    sections: SectionManager,
    suggestions: LearnedSuggestions,
    history: ReportHistory,
    dirty: bool,
    turn_in_flight: Option<Uuid>,
    sync_target: Option<Box<dyn SyncTarget>>,
}

impl App {
    /// Opens the workspace at the default location (`MAINTLOG_HOME` override,
    /// else the OS data directory).
    pub fn open() -> Result<Self> {
        Self::open_at(workspace_root()?)
    }

    pub fn open_at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let journal = Journal::at(&root);
        let store = KvStore::open(&root, journal.clone())?;
        let settings = AppSettings::load(&store)?;
        let sections = SectionManager::open(store.clone(), journal.clone())?;
        let repo = ReportRepository::new(store.clone(), journal.clone());
        let suggestions = LearnedSuggestions::load(&store)?;
        let today = Local::now().date_naive();
        let report = repo.load(today, sections.active())?;
        Ok(Self {
            store,
            journal,
            repo,
            settings,
            sections,
            suggestions,
            history: ReportHistory::new(report),
            dirty: false,
            turn_in_flight: None,
            sync_target: None,
        })
    }

    pub fn report(&self) -> &Report {
        self.history.current()
    }

    pub fn current_date(&self) -> NaiveDate {
        self.history.current().date
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn sections(&self) -> &SectionManager {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut SectionManager {
        &mut self.sections
    }

    pub fn repository(&self) -> &ReportRepository {
        &self.repo
    }

    pub(crate) fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn save_settings(&self) -> Result<()> {
        self.settings.save(&self.store)
    }

    // ---- report mutation and history -------------------------------------

    /// Installs a mutated report as the current state. Every top-level
    /// mutation (manual cell edit, assistant tool action, bulk clear) goes
    /// through here so undo/redo stays coherent across all of them.
    pub fn update_report(&mut self, next: Report) {
        self.history.commit(next);
        self.dirty = true;
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        if changed {
            self.dirty = true;
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        if changed {
            self.dirty = true;
        }
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replaces the current report with a fresh empty one (undoable) and
    /// removes its persisted record.
    pub fn clear_report(&mut self) -> Result<()> {
        let date = self.current_date();
        let section = self.history.current().section.clone();
        self.repo.remove(date, &section)?;
        self.update_report(Report::empty(date, &section));
        self.journal.note(
            EventType::ReportCleared,
            serde_json::json!({ "date": date, "section": section }),
        );
        Ok(())
    }

    // ---- selection -------------------------------------------------------

    pub fn select_date(&mut self, date: NaiveDate) -> Result<()> {
        let section = self.sections.active().to_string();
        self.load_selection(date, &section)
    }

    pub fn select_section(&mut self, name: &str) -> Result<()> {
        self.sections.switch_section(name)?;
        let date = self.current_date();
        self.load_selection(date, name)
    }

    /// Saves any dirty state under its own key, loads the new selection, and
    /// resets history. Dirtiness is cleared synchronously after population:
    /// an autosave firing right after a switch must find nothing to write, or
    /// it would persist the previous report under the new selection.
    fn load_selection(&mut self, date: NaiveDate, section: &str) -> Result<()> {
        if self.dirty {
            self.repo.save(self.history.current())?;
            self.dirty = false;
        }
        let report = self.repo.load(date, section)?;
        self.history.reset(report);
        self.dirty = false;
        Ok(())
    }

    // ---- persistence -----------------------------------------------------

    /// Persists the current report when dirty; no-op otherwise. Returns
    /// whether a write happened. A connected sync target receives the backup
    /// payload afterwards; sync failures are journaled without failing the
    /// local flush.
    pub fn flush_if_dirty(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.repo.save(self.history.current())?;
        self.dirty = false;
        let _ = self.push_sync();
        Ok(true)
    }

    // ---- external sync ---------------------------------------------------

    pub fn connect_sync_target(&mut self, target: Box<dyn SyncTarget>) -> Result<String> {
        let name = target.name().to_string();
        self.sync_target = Some(target);
        self.push_sync()?;
        Ok(format!("Connected: {name}"))
    }

    pub fn disconnect_sync_target(&mut self) {
        self.sync_target = None;
    }

    pub fn sync_connected(&self) -> bool {
        self.sync_target.is_some()
    }

    fn push_sync(&mut self) -> Result<()> {
        let Some(target) = self.sync_target.as_mut() else {
            return Ok(());
        };
        let payload = serde_json::to_string_pretty(&backup::gather_all(&self.store)?)?;
        match target.write(&payload) {
            Ok(()) => {
                self.settings.last_sync_time = Some(Utc::now());
                self.settings.save(&self.store)?;
                Ok(())
            }
            Err(SyncError::PermissionLost) => {
                let name = target.name().to_string();
                // Drop the dead handle so the app stops retrying it.
                self.sync_target = None;
                self.journal.note(
                    EventType::SyncFailed,
                    serde_json::json!({ "target": name, "reason": "permission_lost" }),
                );
                bail!("Sync permission was lost. Re-connect the sync file.")
            }
            Err(SyncError::Failed(message)) => {
                self.journal.note(
                    EventType::SyncFailed,
                    serde_json::json!({ "reason": message }),
                );
                bail!("Sync failed: {message}")
            }
        }
    }

    // ---- backup / restore ------------------------------------------------

    pub fn backup_payload(&self) -> Result<serde_json::Value> {
        backup::gather_all(&self.store)
    }

    /// Restores a backup payload and reloads every component from the
    /// restored records.
    pub fn restore_backup(&mut self, payload: &serde_json::Value) -> Result<usize> {
        let written = backup::restore(&self.store, payload)?;
        self.settings = AppSettings::load(&self.store)?;
        self.sections = SectionManager::open(self.store.clone(), self.journal.clone())?;
        self.suggestions = LearnedSuggestions::load(&self.store)?;
        let date = self.current_date();
        let report = self.repo.load(date, self.sections.active())?;
        self.history.reset(report);
        self.dirty = false;
        Ok(written)
    }

    // ---- suggestions -----------------------------------------------------

    pub fn learn_suggestion(&mut self, text: &str) -> Result<bool> {
        if !self.settings.enable_suggestions {
            return Ok(false);
        }
        self.suggestions.learn(&self.store, text)
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.suggestions.merged_with_report(self.history.current())
    }

    // ---- login (placeholder, no hardening) -------------------------------

    pub fn login(&mut self, user: &str, pass: &str) -> Result<bool> {
        let ok = LOGIN_PAIRS.iter().any(|(u, p)| *u == user && *p == pass);
        if ok {
            self.store.set(keys::LOGIN_FLAG, &true)?;
        }
        Ok(ok)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(keys::LOGIN_FLAG)
    }

    pub fn is_logged_in(&self) -> bool {
        self.store
            .get::<bool>(keys::LOGIN_FLAG)
            .ok()
            .flatten()
            .unwrap_or(false)
    }

    // ---- assistant turns -------------------------------------------------

    /// Starts an assistant turn, capturing the target date and section.
    /// Rejected while another turn is outstanding: agent turns are
    /// serialized, and there is no mid-flight cancellation.
    pub fn begin_assistant_turn(&mut self) -> Result<AssistantTurn> {
        if self.turn_in_flight.is_some() {
            bail!("An assistant request is already in progress. Wait for it to finish.");
        }
        let turn = AssistantTurn {
            turn_id: Uuid::new_v4(),
            date: self.current_date(),
            section: self.history.current().section.clone(),
        };
        self.turn_in_flight = Some(turn.turn_id);
        self.journal.note(
            EventType::AssistantTurnStarted,
            serde_json::json!({
                "turn_id": turn.turn_id,
                "date": turn.date,
                "section": turn.section,
            }),
        );
        Ok(turn)
    }

    /// Executes the turn's tool calls and releases the in-flight slot.
    pub fn finish_assistant_turn(
        &mut self,
        turn: &AssistantTurn,
        calls: &[RawToolCall],
    ) -> Result<Vec<ToolResult>> {
        match self.turn_in_flight {
            Some(id) if id == turn.turn_id => {}
            _ => bail!("Assistant turn is not in flight"),
        }
        let results = bridge::execute_tool_calls(self, turn, calls);
        self.turn_in_flight = None;
        self.journal.note(
            EventType::AssistantTurnFinished,
            serde_json::json!({ "turn_id": turn.turn_id, "tool_count": calls.len() }),
        );
        Ok(results)
    }

    /// Releases the in-flight slot after a failed external call.
    pub fn abandon_assistant_turn(&mut self, turn: &AssistantTurn) {
        if self.turn_in_flight == Some(turn.turn_id) {
            self.turn_in_flight = None;
        }
    }

    pub fn assistant_busy(&self) -> bool {
        self.turn_in_flight.is_some()
    }

    /// The report a turn should mutate: the in-memory current report while
    /// the turn's captured target is still displayed, otherwise the persisted
    /// record for the captured target. Results are never reattributed to
    /// whatever the user navigated to afterwards.
    pub(crate) fn turn_report(&self, turn: &AssistantTurn) -> Result<Report> {
        if self.displaying(turn) {
            Ok(self.history.current().clone())
        } else {
            self.repo.load(turn.date, &turn.section)
        }
    }

    /// Counterpart of [`Self::turn_report`]: commit through undo history when
    /// the target is displayed, write through the repository when it is not.
    pub(crate) fn commit_turn_report(&mut self, turn: &AssistantTurn, report: Report) -> Result<()> {
        if self.displaying(turn) {
            self.update_report(report);
            Ok(())
        } else {
            self.repo.save(&report)
        }
    }

    fn displaying(&self, turn: &AssistantTurn) -> bool {
        let current = self.history.current();
        current.date == turn.date && current.section == turn.section
    }
}

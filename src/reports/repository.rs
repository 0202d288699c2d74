//! Load/save/migrate logic for persisted reports.
//!
//! The repository is the sole writer of persisted report records. It resolves
//! purely; resetting undo history and the dirty flag after a load is the
//! application container's responsibility.

use anyhow::Result;
use chrono::NaiveDate;

use crate::journal::{EventType, Journal};
use crate::storage::{keys, KvStore};

use super::Report;

#[derive(Debug, Clone)]
pub struct ReportRepository {
    store: KvStore,
    journal: Journal,
}

impl ReportRepository {
    pub fn new(store: KvStore, journal: Journal) -> Self {
        Self { store, journal }
    }

    /// Resolves the report for `(date, section)`.
    ///
    /// Resolution order:
    /// 1. the section-specific record for this exact date and section;
    /// 2. a legacy single-key record for this date, accepted only when its
    ///    embedded section matches, in which case it is copied forward into
    ///    the section-specific slot (read-time migration, at most once);
    /// 3. a freshly constructed empty report.
    pub fn load(&self, date: NaiveDate, section: &str) -> Result<Report> {
        let key = keys::report(date, section);
        if let Some(report) = self.store.get::<Report>(&key)? {
            return Ok(report);
        }

        if let Some(legacy) = self.store.get::<Report>(&keys::legacy_report(date))? {
            if legacy.section == section {
                self.store.set(&key, &legacy)?;
                self.journal.note(
                    EventType::LegacyReportMigrated,
                    serde_json::json!({ "date": date, "section": section }),
                );
                return Ok(legacy);
            }
        }

        Ok(Report::empty(date, section))
    }

    /// Persists the report under its **own** date and section, never the
    /// currently viewed selection. Assistant-driven multi-date writes depend
    /// on this.
    pub fn save(&self, report: &Report) -> Result<()> {
        let key = keys::report(report.date, &report.section);
        self.store.set(&key, report)
    }

    /// Removes the persisted record for `(date, section)` (explicit clear).
    pub fn remove(&self, date: NaiveDate, section: &str) -> Result<()> {
        self.store.remove(&keys::report(date, section))
    }

    pub fn exists(&self, date: NaiveDate, section: &str) -> bool {
        self.store.contains(&keys::report(date, section))
    }

    /// All persisted reports belonging to `section`, in key order.
    /// Malformed records are skipped by the store.
    pub fn scan_section(&self, section: &str) -> Result<Vec<Report>> {
        let suffix = format!(":{section}");
        let mut reports = Vec::new();
        for (key, value) in self.store.scan(keys::REPORT_PREFIX)? {
            if !key.ends_with(&suffix) {
                continue;
            }
            if let Ok(report) = serde_json::from_value::<Report>(value) {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Persisted reports for every listed section across an inclusive date
    /// range, ordered by date then section.
    pub fn scan_range(
        &self,
        sections: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Report>> {
        let mut reports = Vec::new();
        let mut date = start;
        while date <= end {
            for section in sections {
                let key = keys::report(date, section);
                if let Some(report) = self.store.get::<Report>(&key)? {
                    reports.push(report);
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        Ok(reports)
    }
}

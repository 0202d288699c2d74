//! Autocomplete suggestions for work descriptions: a fixed default list plus
//! learned entries persisted globally across sections.

use anyhow::Result;

use crate::export::strip_markup;
use crate::reports::Report;
use crate::storage::{keys, KvStore};

pub const DEFAULT_SUGGESTIONS: &[&str] = &[
    "Inspection",
    "Cleaning",
    "Lubrication",
    "Tightening",
    "Adjustment",
    "Testing",
    "Calibration",
    "Replacement",
    "Repair",
    "Overhaul",
    "Installation",
    "Dismantling",
    "Assembly",
    "Monitoring",
    "Bearing Replacement",
    "Sensor Alignment",
    "Motor Inspection",
    "Belt Tensioning",
    "Filter Cleaning",
    "Oil Level Check",
    "Chain Adjustment",
    "Gearbox Check",
    "Electrical Fault Finding",
    "Fuse Replacement",
    "Contactor Replacement",
    "Emergency Stop Reset",
    "Guard Repair",
    "Leakage Fix",
    "Software Parameter Change",
    "Jam Removal",
];

const MIN_LEARN_LENGTH: usize = 3;

#[derive(Debug, Default)]
pub struct LearnedSuggestions {
    entries: Vec<String>,
}

impl LearnedSuggestions {
    pub fn load(store: &KvStore) -> Result<Self> {
        Ok(Self {
            entries: store.get(keys::LEARNED_SUGGESTIONS)?.unwrap_or_default(),
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Records a completed description for future autocomplete. Entries that
    /// are too short or already known (case-insensitively, against defaults
    /// and learned entries alike) are ignored. Returns whether the list grew.
    pub fn learn(&mut self, store: &KvStore, text: &str) -> Result<bool> {
        let clean = strip_markup(text);
        let clean = clean.trim();
        if clean.len() < MIN_LEARN_LENGTH {
            return Ok(false);
        }
        let lower = clean.to_lowercase();
        let known_default = DEFAULT_SUGGESTIONS
            .iter()
            .any(|s| s.to_lowercase() == lower);
        let known_learned = self.entries.iter().any(|s| s.to_lowercase() == lower);
        if known_default || known_learned {
            return Ok(false);
        }
        self.entries.push(clean.to_string());
        self.entries.sort();
        store.set(keys::LEARNED_SUGGESTIONS, &self.entries)?;
        Ok(true)
    }

    /// Full suggestion list: defaults, learned entries, and the current
    /// report's stripped descriptions, deduplicated and sorted.
    pub fn merged_with_report(&self, report: &Report) -> Vec<String> {
        let mut all: Vec<String> = DEFAULT_SUGGESTIONS
            .iter()
            .map(|s| s.to_string())
            .chain(self.entries.iter().cloned())
            .collect();
        for shift in report.shifts.iter() {
            for entry in &shift.entries {
                let clean = strip_markup(&entry.description);
                let clean = clean.trim();
                if !clean.is_empty() {
                    all.push(clean.to_string());
                }
            }
        }
        all.sort();
        all.dedup();
        all
    }
}

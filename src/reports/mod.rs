//! Report aggregate: one dated, sectioned logbook page with three shifts.
//!
//! Persisted records keep the camelCase field names of the historical wire
//! format so pre-existing reports deserialize unchanged.

pub mod analytics;
pub mod history;
pub mod repository;

pub use history::{ReportHistory, HISTORY_CAP};
pub use repository::ReportRepository;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of blank rows a freshly created shift starts with.
pub const INITIAL_ROWS: usize = 5;

/// Fixed shift identifiers, in display order.
pub const SHIFT_IDS: [ShiftId; 3] = [ShiftId::Night, ShiftId::Morning, ShiftId::Evening];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftId {
    Night,
    Morning,
    Evening,
}

impl ShiftId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftId::Night => "night",
            ShiftId::Morning => "morning",
            ShiftId::Evening => "evening",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ShiftId::Night => "Night shift report",
            ShiftId::Morning => "Morning shift report",
            ShiftId::Evening => "Evening shift report",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "night" => Some(ShiftId::Night),
            "morning" => Some(ShiftId::Morning),
            "evening" => Some(ShiftId::Evening),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShiftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A start/end pair captured for an intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub start: String,
    pub end: String,
}

/// A spare part consumed by one entry. `part_id` is a lookup-only reference:
/// the catalog row may be renamed or deleted later without affecting this
/// record, because name and part number are captured at time of use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedPart {
    pub part_id: String,
    pub name: String,
    pub part_number: String,
    pub quantity: String,
}

/// Display projections derived from a used-parts list: one line per part for
/// the parts column, and the quantities in the same order.
pub fn spare_parts_projection(parts: &[UsedPart]) -> (String, String) {
    let parts_column = parts
        .iter()
        .map(|p| format!("{} ({})", p.name, p.part_number))
        .collect::<Vec<_>>()
        .join("\n");
    let quantity_column = parts
        .iter()
        .map(|p| p.quantity.clone())
        .collect::<Vec<_>>()
        .join("\n");
    (parts_column, quantity_column)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: Uuid,
    #[serde(default)]
    pub machine: String,
    #[serde(default)]
    pub line: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub total_time: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub spare_parts: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_entries: Option<Vec<TimeEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_parts: Option<Vec<UsedPart>>,
}

impl LogEntry {
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            machine: String::new(),
            line: String::new(),
            description: String::new(),
            total_time: String::new(),
            quantity: String::new(),
            spare_parts: String::new(),
            notes: String::new(),
            time_entries: None,
            used_parts: None,
        }
    }

    /// The emptiness predicate shared by print filtering, the manual add-row
    /// path, and assistant-driven inserts: a row is empty when machine,
    /// description, and notes are all blank.
    pub fn is_empty(&self) -> bool {
        self.machine.trim().is_empty()
            && self.description.trim().is_empty()
            && self.notes.trim().is_empty()
    }

    /// Replaces the structured used-parts list and regenerates the
    /// `spare_parts`/`quantity` projections from it. The projections are
    /// never edited independently once a used-parts list exists.
    pub fn set_used_parts(&mut self, parts: Vec<UsedPart>) {
        if parts.is_empty() {
            self.used_parts = None;
            self.spare_parts.clear();
            self.quantity.clear();
        } else {
            let (spare_parts, quantity) = spare_parts_projection(&parts);
            self.spare_parts = spare_parts;
            self.quantity = quantity;
            self.used_parts = Some(parts);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub title: String,
    #[serde(default)]
    pub engineers: String,
    #[serde(default)]
    pub entries: Vec<LogEntry>,
}

impl Shift {
    pub fn empty(id: ShiftId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            engineers: String::new(),
            entries: (0..INITIAL_ROWS).map(|_| LogEntry::blank()).collect(),
        }
    }

    /// Index of the first empty row, if any.
    pub fn first_empty_row(&self) -> Option<usize> {
        self.entries.iter().position(LogEntry::is_empty)
    }

    pub fn non_empty_entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSet {
    pub night: Shift,
    pub morning: Shift,
    pub evening: Shift,
}

impl ShiftSet {
    pub fn get(&self, id: ShiftId) -> &Shift {
        match id {
            ShiftId::Night => &self.night,
            ShiftId::Morning => &self.morning,
            ShiftId::Evening => &self.evening,
        }
    }

    pub fn get_mut(&mut self, id: ShiftId) -> &mut Shift {
        match id {
            ShiftId::Night => &mut self.night,
            ShiftId::Morning => &mut self.morning,
            ShiftId::Evening => &mut self.evening,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shift> {
        [&self.night, &self.morning, &self.evening].into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Shift> {
        [&mut self.night, &mut self.morning, &mut self.evening].into_iter()
    }
}

/// One day's report for one section. All three shifts are always present,
/// even when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub section: String,
    pub date: NaiveDate,
    pub shifts: ShiftSet,
}

impl Report {
    pub fn empty(date: NaiveDate, section: &str) -> Self {
        Self {
            section: section.to_string(),
            date,
            shifts: ShiftSet {
                night: Shift::empty(ShiftId::Night),
                morning: Shift::empty(ShiftId::Morning),
                evening: Shift::empty(ShiftId::Evening),
            },
        }
    }

    pub fn shift(&self, id: ShiftId) -> &Shift {
        self.shifts.get(id)
    }

    pub fn shift_mut(&mut self, id: ShiftId) -> &mut Shift {
        self.shifts.get_mut(id)
    }

    /// Looks up an entry by id across all three shifts.
    pub fn find_entry(&self, id: Uuid) -> Option<&LogEntry> {
        self.shifts
            .iter()
            .flat_map(|shift| shift.entries.iter())
            .find(|entry| entry.id == id)
    }
}

//! Scans of persisted reports for a section: intervention counts, downtime,
//! and per-machine history.

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;

use crate::export::{duration_minutes, strip_markup};

use super::ReportRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DowntimePoint {
    pub date: NaiveDate,
    pub minutes: u32,
}

#[derive(Debug, Clone)]
pub struct SectionAnalytics {
    pub top_machines: Vec<MachineCount>,
    pub downtime: Vec<DowntimePoint>,
    pub total_interventions: usize,
}

const TOP_MACHINES: usize = 5;
const DOWNTIME_DAYS: usize = 7;

/// Aggregates every persisted report for `section`. An entry counts as an
/// intervention when both machine and description are filled in.
pub fn section_analytics(repo: &ReportRepository, section: &str) -> Result<SectionAnalytics> {
    let mut machine_counts: HashMap<String, usize> = HashMap::new();
    let mut downtime_by_date: HashMap<NaiveDate, u32> = HashMap::new();
    let mut total_interventions = 0;

    for report in repo.scan_section(section)? {
        for shift in report.shifts.iter() {
            for entry in &shift.entries {
                if entry.machine.trim().is_empty() || entry.description.trim().is_empty() {
                    continue;
                }
                total_interventions += 1;
                *machine_counts.entry(entry.machine.clone()).or_default() += 1;
                let minutes = duration_minutes(&entry.total_time);
                if minutes > 0 {
                    *downtime_by_date.entry(report.date).or_default() += minutes;
                }
            }
        }
    }

    let mut top_machines: Vec<MachineCount> = machine_counts
        .into_iter()
        .map(|(name, count)| MachineCount { name, count })
        .collect();
    top_machines.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    top_machines.truncate(TOP_MACHINES);

    let mut downtime: Vec<DowntimePoint> = downtime_by_date
        .into_iter()
        .map(|(date, minutes)| DowntimePoint { date, minutes })
        .collect();
    downtime.sort_by(|a, b| b.date.cmp(&a.date));
    downtime.truncate(DOWNTIME_DAYS);
    downtime.reverse();

    Ok(SectionAnalytics {
        top_machines,
        downtime,
        total_interventions,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineHistoryItem {
    pub date: NaiveDate,
    pub shift: String,
    pub description: String,
    pub total_time: String,
    pub spare_parts: String,
    pub engineers: String,
}

/// Every recorded intervention on `machine` within `section`, most recent
/// first.
pub fn machine_history(
    repo: &ReportRepository,
    section: &str,
    machine: &str,
) -> Result<Vec<MachineHistoryItem>> {
    let mut items = Vec::new();
    for report in repo.scan_section(section)? {
        for shift in report.shifts.iter() {
            for entry in &shift.entries {
                if entry.machine != machine {
                    continue;
                }
                if entry.description.trim().is_empty() && entry.total_time.trim().is_empty() {
                    continue;
                }
                items.push(MachineHistoryItem {
                    date: report.date,
                    shift: shift.title.clone(),
                    description: strip_markup(&entry.description),
                    total_time: entry.total_time.clone(),
                    spare_parts: entry.spare_parts.clone(),
                    engineers: shift.engineers.clone(),
                });
            }
        }
    }
    items.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(items)
}

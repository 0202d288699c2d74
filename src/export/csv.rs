//! CSV flattening of reports: the current report for a quick export, or a
//! date-range scan of persisted records for analysis tooling.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

use crate::reports::{Report, ReportRepository};

use super::{duration_minutes, strip_markup};

/// Flattens one report's non-empty entries. Times are kept as entered;
/// multi-line part columns are collapsed with `; `.
pub fn report_csv(report: &Report) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Date",
        "Section",
        "Shift",
        "Machine",
        "Line",
        "Description",
        "Total Time",
        "Spare Parts",
        "Qty",
        "Notes",
    ])?;
    let date = report.date.format("%Y-%m-%d").to_string();
    for shift in report.shifts.iter() {
        for entry in &shift.entries {
            if entry.machine.trim().is_empty() && entry.description.trim().is_empty() {
                continue;
            }
            writer.write_record([
                date.clone(),
                report.section.clone(),
                shift.title.clone(),
                entry.machine.clone(),
                entry.line.clone(),
                strip_markup(&entry.description),
                entry.total_time.clone(),
                entry.spare_parts.replace('\n', "; "),
                entry.quantity.replace('\n', "; "),
                strip_markup(&entry.notes),
            ])?;
        }
    }
    finish(writer)
}

/// Flattens every persisted report for the given sections across an inclusive
/// date range. Durations are collapsed to integer minutes and shift names are
/// standardized, so downstream analysis needs no further normalization.
pub fn range_csv(
    repo: &ReportRepository,
    sections: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Date",
        "Section",
        "Shift",
        "Engineer_Team",
        "Machine",
        "Line",
        "Description",
        "Total_Minutes",
        "Spare_Parts",
        "Spare_Parts_Qty",
        "Notes",
    ])?;
    for report in repo.scan_range(sections, start, end)? {
        let date = report.date.format("%Y-%m-%d").to_string();
        for shift in report.shifts.iter() {
            for entry in &shift.entries {
                if entry.machine.trim().is_empty() && entry.description.trim().is_empty() {
                    continue;
                }
                writer.write_record([
                    date.clone(),
                    report.section.clone(),
                    shift.id.as_str().to_string(),
                    shift.engineers.clone(),
                    entry.machine.clone(),
                    entry.line.clone(),
                    strip_markup(&entry.description),
                    duration_minutes(&entry.total_time).to_string(),
                    entry.spare_parts.replace('\n', " | "),
                    entry.quantity.replace('\n', " | "),
                    strip_markup(&entry.notes),
                ])?;
            }
        }
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("Failed to finalize CSV output: {}", err.into_error()))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

use maintlog::export::csv::{range_csv, report_csv};
use maintlog::reports::analytics::{machine_history, section_analytics};
use maintlog::{ShiftId, DEFAULT_SECTION};

use super::support::{date, with_entry};
use super::IntegrationHarness;

#[test]
fn report_csv_flattens_non_empty_entries_and_strips_markup() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    app.select_date(date("2024-03-01")).unwrap();

    let mut report = app.report().clone();
    {
        let entry = &mut report.shift_mut(ShiftId::Morning).entries[0];
        entry.machine = "CFA".to_string();
        entry.description = "<b>Carton</b> jam cleared".to_string();
        entry.total_time = "45m".to_string();
    }
    app.update_report(report);

    let csv = report_csv(app.report()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    // Header plus exactly one data row; empty rows are filtered out.
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("Carton jam cleared"));
    assert!(!lines[1].contains("<b>"));
    assert!(lines[1].contains("Morning shift report"));
}

#[test]
fn range_csv_scans_persisted_records_and_collapses_durations() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    app.select_date(date("2024-03-01")).unwrap();
    let mut report = app.report().clone();
    {
        let entry = &mut report.shift_mut(ShiftId::Night).entries[0];
        entry.machine = "TP".to_string();
        entry.description = "splice fault".to_string();
        entry.total_time = "1h 30m".to_string();
    }
    app.update_report(report);
    app.flush_if_dirty().unwrap();

    app.select_date(date("2024-03-03")).unwrap();
    let mut next = with_entry(app.report(), ShiftId::Evening, 0, "ACB", "valve swap");
    next.shift_mut(ShiftId::Evening).entries[0].total_time = "20+25".to_string();
    app.update_report(next);
    app.flush_if_dirty().unwrap();

    let sections = vec![DEFAULT_SECTION.to_string()];
    let csv = range_csv(
        app.repository(),
        &sections,
        date("2024-03-01"),
        date("2024-03-04"),
    )
    .unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("splice fault"));
    assert!(lines[1].contains("90"));
    assert!(lines[2].contains("valve swap"));
    assert!(lines[2].contains("45"));
    // Shift names are standardized identifiers in the range export.
    assert!(lines[1].contains("night"));
}

#[test]
fn analytics_counts_interventions_and_ranks_machines() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    for (day, machine) in [
        ("2024-03-01", "CFA"),
        ("2024-03-02", "CFA"),
        ("2024-03-03", "TP"),
    ] {
        app.select_date(date(day)).unwrap();
        let mut next = with_entry(app.report(), ShiftId::Morning, 0, machine, "work done");
        next.shift_mut(ShiftId::Morning).entries[0].total_time = "30m".to_string();
        app.update_report(next);
        app.flush_if_dirty().unwrap();
    }

    let analytics = section_analytics(app.repository(), DEFAULT_SECTION).unwrap();
    assert_eq!(analytics.total_interventions, 3);
    assert_eq!(analytics.top_machines[0].name, "CFA");
    assert_eq!(analytics.top_machines[0].count, 2);
    assert_eq!(analytics.downtime.len(), 3);
    assert_eq!(analytics.downtime[0].date, date("2024-03-01"));
}

#[test]
fn machine_history_lists_most_recent_first() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    for day in ["2024-03-01", "2024-03-05"] {
        app.select_date(date(day)).unwrap();
        let next = with_entry(app.report(), ShiftId::Night, 0, "CFA", "serviced");
        app.update_report(next);
        app.flush_if_dirty().unwrap();
    }

    let history = machine_history(app.repository(), DEFAULT_SECTION, "CFA").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date, date("2024-03-05"));
    assert_eq!(history[1].date, date("2024-03-01"));
}

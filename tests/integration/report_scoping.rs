use maintlog::storage::keys;
use maintlog::{Report, ShiftId, DEFAULT_SECTION};

use super::support::{date, with_entry};
use super::IntegrationHarness;

#[test]
fn reports_do_not_leak_across_dates() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    let d1 = date("2024-03-01");
    let d2 = date("2024-03-02");

    app.select_date(d1).unwrap();
    let next = with_entry(app.report(), ShiftId::Morning, 0, "CFA", "carton jam");
    app.update_report(next);

    // Switching saves the dirty report and loads a fresh one for d2.
    app.select_date(d2).unwrap();
    assert_eq!(app.current_date(), d2);
    assert!(app
        .report()
        .shifts
        .iter()
        .all(|shift| shift.entries.iter().all(|e| e.is_empty())));

    app.select_date(d1).unwrap();
    assert_eq!(
        app.report().shift(ShiftId::Morning).entries[0].description,
        "carton jam"
    );
}

#[test]
fn legacy_record_is_migrated_once_when_section_matches() {
    let harness = IntegrationHarness::new();
    let store = harness.store();
    let d = date("2023-11-20");

    let mut legacy = Report::empty(d, DEFAULT_SECTION);
    legacy.shift_mut(ShiftId::Night).entries[0].machine = "Palletizer".to_string();
    legacy.shift_mut(ShiftId::Night).entries[0].description = "gripper fault".to_string();
    store.set(&keys::legacy_report(d), &legacy).unwrap();

    let mut app = harness.app();
    app.select_date(d).unwrap();
    assert_eq!(
        app.report().shift(ShiftId::Night).entries[0].machine,
        "Palletizer"
    );
    // Copied forward into the section-specific slot.
    assert!(store.contains(&keys::report(d, DEFAULT_SECTION)));
}

#[test]
fn legacy_record_for_another_section_is_ignored() {
    let harness = IntegrationHarness::new();
    let store = harness.store();
    let d = date("2023-11-21");

    let mut legacy = Report::empty(d, "Packing Hall");
    legacy.shift_mut(ShiftId::Morning).entries[0].machine = "Shrink".to_string();
    legacy.shift_mut(ShiftId::Morning).entries[0].description = "film change".to_string();
    store.set(&keys::legacy_report(d), &legacy).unwrap();

    let mut app = harness.app();
    app.select_date(d).unwrap();
    assert!(app.report().shift(ShiftId::Morning).entries[0].is_empty());
    assert!(!store.contains(&keys::report(d, DEFAULT_SECTION)));
}

#[test]
fn malformed_record_is_treated_as_absent() {
    let harness = IntegrationHarness::new();
    let store = harness.store();
    let d = date("2024-01-15");

    // Not a report shape at all.
    store.set(&keys::report(d, DEFAULT_SECTION), &42u32).unwrap();

    let mut app = harness.app();
    app.select_date(d).unwrap();
    assert!(app
        .report()
        .shifts
        .iter()
        .all(|shift| shift.entries.iter().all(|e| e.is_empty())));
}

#[test]
fn flush_after_switch_never_writes_old_data_under_new_date() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    let d1 = date("2024-03-01");
    let d2 = date("2024-03-02");

    app.select_date(d1).unwrap();
    let next = with_entry(app.report(), ShiftId::Evening, 0, "Straw", "applicator stuck");
    app.update_report(next);
    assert!(app.is_dirty());

    // The user switches before the autosave interval fires.
    app.select_date(d2).unwrap();
    assert!(!app.is_dirty());
    assert!(!app.flush_if_dirty().unwrap());

    // d2 was never persisted with d1's content; d1 was saved at switch time.
    let store = harness.store();
    assert!(!store.contains(&keys::report(d2, DEFAULT_SECTION)));
    let saved = app.repository().load(d1, DEFAULT_SECTION).unwrap();
    assert_eq!(
        saved.shift(ShiftId::Evening).entries[0].description,
        "applicator stuck"
    );
}

#[test]
fn flush_persists_dirty_state_and_clears_flag() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    let d = date("2024-04-10");
    app.select_date(d).unwrap();

    let next = with_entry(app.report(), ShiftId::Morning, 1, "Buffer", "belt replaced");
    app.update_report(next);
    assert!(app.flush_if_dirty().unwrap());
    assert!(!app.is_dirty());
    assert!(!app.flush_if_dirty().unwrap());

    let saved = app.repository().load(d, DEFAULT_SECTION).unwrap();
    assert_eq!(
        saved.shift(ShiftId::Morning).entries[1].description,
        "belt replaced"
    );
}

#[test]
fn clear_report_removes_persisted_record_and_is_undoable() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    let d = date("2024-04-11");
    app.select_date(d).unwrap();

    let next = with_entry(app.report(), ShiftId::Night, 0, "CFA", "splice fault");
    app.update_report(next);
    app.flush_if_dirty().unwrap();
    assert!(app.repository().exists(d, DEFAULT_SECTION));

    app.clear_report().unwrap();
    assert!(!app.repository().exists(d, DEFAULT_SECTION));
    assert!(app.report().shift(ShiftId::Night).entries[0].is_empty());

    assert!(app.undo());
    assert_eq!(
        app.report().shift(ShiftId::Night).entries[0].description,
        "splice fault"
    );
}

use maintlog::storage::keys;
use maintlog::{SparePart, DEFAULT_SECTION};

use super::IntegrationHarness;

#[test]
fn rename_migrates_reference_data_and_deletes_old_keys() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    app.sections_mut().add_section("Line A").unwrap();
    app.select_section("Line A").unwrap();
    for machine in ["Capper", "Labeller", "Washer"] {
        app.sections_mut().add_machine(machine).unwrap();
    }
    app.sections_mut().add_spare_part("Bearing", "X1").unwrap();
    app.sections_mut().add_spare_part("Seal kit", "S9").unwrap();

    app.sections_mut().rename_section("Line A", "Line B").unwrap();
    assert_eq!(app.sections().active(), "Line B");
    assert!(app.sections().sections().contains(&"Line B".to_string()));
    assert!(!app.sections().sections().contains(&"Line A".to_string()));

    let store = harness.store();
    assert!(!store.contains(&keys::machines("Line A")));
    assert!(!store.contains(&keys::spare_parts("Line A")));
    assert!(!store.contains(&keys::engineers("Line A")));

    let machines: Vec<String> = store.get(&keys::machines("Line B")).unwrap().unwrap();
    assert!(machines.contains(&"Capper".to_string()));
    assert!(machines.contains(&"Labeller".to_string()));
    assert!(machines.contains(&"Washer".to_string()));
    let parts: Vec<SparePart> = store.get(&keys::spare_parts("Line B")).unwrap().unwrap();
    assert_eq!(parts.len(), 2);
}

#[test]
fn rename_rejects_existing_name_and_protected_default() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    app.sections_mut().add_section("Line A").unwrap();
    app.sections_mut().add_section("Line B").unwrap();

    assert!(app
        .sections_mut()
        .rename_section("Line A", "Line B")
        .is_err());
    assert!(app
        .sections_mut()
        .rename_section(DEFAULT_SECTION, "Something")
        .is_err());
}

#[test]
fn delete_rejects_default_and_falls_back_when_active() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    assert!(app.sections_mut().delete_section(DEFAULT_SECTION).is_err());

    app.sections_mut().add_section("Line A").unwrap();
    app.select_section("Line A").unwrap();
    app.sections_mut().add_machine("Capper").unwrap();

    app.sections_mut().delete_section("Line A").unwrap();
    assert_eq!(app.sections().active(), DEFAULT_SECTION);
    assert!(!app.sections().sections().contains(&"Line A".to_string()));
    let store = harness.store();
    assert!(!store.contains(&keys::machines("Line A")));
}

#[test]
fn duplicate_spare_part_name_is_rejected_case_insensitively() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    app.sections_mut().add_spare_part("Bearing", "X1").unwrap();

    let err = app.sections_mut().add_spare_part("BEARING", "X2");
    assert!(err.is_err());
    assert_eq!(app.sections().parts().len(), 1);

    let err = app.sections_mut().add_spare_part("Shaft", "x1");
    assert!(err.is_err());
    assert_eq!(app.sections().parts().len(), 1);
}

#[test]
fn machine_and_engineer_duplicates_are_silently_ignored() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    assert!(app.sections_mut().add_machine("Capper").unwrap());
    assert!(!app.sections_mut().add_machine("Capper").unwrap());
    let occurrences = app
        .sections()
        .machines()
        .iter()
        .filter(|m| *m == "Capper")
        .count();
    assert_eq!(occurrences, 1);

    assert!(app.sections_mut().add_engineer("Dana Reyes").unwrap());
    assert!(!app.sections_mut().add_engineer("Dana Reyes").unwrap());
    let occurrences = app
        .sections()
        .engineers()
        .iter()
        .filter(|n| *n == "Dana Reyes")
        .count();
    assert_eq!(occurrences, 1);
}

#[test]
fn ungrouped_reference_data_migrates_into_default_section_once() {
    let harness = IntegrationHarness::new();
    let store = harness.store();
    store
        .set(keys::UNGROUPED_MACHINES, &vec!["Old Rig".to_string()])
        .unwrap();
    store
        .set(keys::UNGROUPED_ENGINEERS, &vec!["Sam Kim".to_string()])
        .unwrap();

    let app = harness.app();
    assert!(app.sections().machines().contains(&"Old Rig".to_string()));
    assert!(app.sections().engineers().contains(&"Sam Kim".to_string()));
    assert!(store.contains(&keys::machines(DEFAULT_SECTION)));
}

#[test]
fn ungrouped_migration_never_overwrites_scoped_data() {
    let harness = IntegrationHarness::new();
    let store = harness.store();
    store
        .set(
            &keys::machines(DEFAULT_SECTION),
            &vec!["Scoped Rig".to_string()],
        )
        .unwrap();
    store
        .set(keys::UNGROUPED_MACHINES, &vec!["Old Rig".to_string()])
        .unwrap();

    let app = harness.app();
    assert_eq!(app.sections().machines(), ["Scoped Rig".to_string()]);
}

#[test]
fn new_section_falls_back_to_default_reference_data() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    app.sections_mut().add_section("Fresh").unwrap();
    app.select_section("Fresh").unwrap();

    assert!(app.sections().machines().contains(&"CFA".to_string()));
    assert!(app.sections().engineers().is_empty());
    assert!(app.sections().parts().is_empty());
}

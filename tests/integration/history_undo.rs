use maintlog::reports::HISTORY_CAP;
use maintlog::ShiftId;

use super::support::with_entry;
use super::IntegrationHarness;

#[test]
fn undo_n_times_returns_initial_state_and_redo_restores_final() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    let initial = app.report().clone();

    for i in 0..5 {
        let next = with_entry(
            app.report(),
            ShiftId::Morning,
            0,
            "CFA",
            &format!("step {i}"),
        );
        app.update_report(next);
    }
    let final_state = app.report().clone();

    for _ in 0..5 {
        assert!(app.undo());
    }
    assert_eq!(*app.report(), initial);

    for _ in 0..5 {
        assert!(app.redo());
    }
    assert_eq!(*app.report(), final_state);
}

#[test]
fn undo_and_redo_are_noops_on_empty_stacks() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    assert!(!app.undo());
    assert!(!app.redo());
    assert!(!app.can_undo());
    assert!(!app.can_redo());
}

#[test]
fn new_commit_after_undo_clears_redo() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    let first = with_entry(app.report(), ShiftId::Night, 0, "TP", "first");
    app.update_report(first);
    let second = with_entry(app.report(), ShiftId::Night, 0, "TP", "second");
    app.update_report(second);

    assert!(app.undo());
    assert!(app.can_redo());

    let branched = with_entry(app.report(), ShiftId::Night, 0, "TP", "branched");
    app.update_report(branched);
    assert!(!app.can_redo());
    assert!(!app.redo());
    assert_eq!(
        app.report().shift(ShiftId::Night).entries[0].description,
        "branched"
    );
}

#[test]
fn history_is_capped_and_evicts_oldest_first() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    for i in 1..=60 {
        let next = with_entry(
            app.report(),
            ShiftId::Evening,
            0,
            "ACB",
            &format!("commit {i}"),
        );
        app.update_report(next);
    }

    let mut undone = 0;
    while app.undo() {
        undone += 1;
    }
    assert_eq!(undone, HISTORY_CAP);
    // With commits 1..=60 and a 50-deep stack, the deepest reachable
    // snapshot is the state after commit 10, not the initial report.
    assert_eq!(
        app.report().shift(ShiftId::Evening).entries[0].description,
        "commit 10"
    );
}

#[test]
fn loading_a_different_selection_resets_both_stacks() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    app.select_date(super::support::date("2024-03-01")).unwrap();

    let next = with_entry(app.report(), ShiftId::Morning, 0, "CFA", "jam");
    app.update_report(next);
    assert!(app.can_undo());

    app.select_date(super::support::date("2024-03-02")).unwrap();
    assert!(!app.can_undo());
    assert!(!app.can_redo());
}

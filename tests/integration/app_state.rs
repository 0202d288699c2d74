use maintlog::storage::keys;
use maintlog::storage::sync::{SyncError, SyncTarget};
use maintlog::{AppSettings, ShiftId};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

use super::support::{date, with_entry};
use super::IntegrationHarness;

#[test]
fn settings_saved_by_older_versions_gain_defaults() {
    let harness = IntegrationHarness::new();
    let store = harness.store();

    // A partial settings object, as an older build would have written it.
    store
        .set(keys::SETTINGS, &json!({ "theme": "green", "compactMode": true }))
        .unwrap();

    let settings = AppSettings::load(&store).unwrap();
    assert_eq!(settings.theme, "green");
    assert!(settings.compact_mode);
    assert_eq!(settings.report_title, "Daily Maintenance Activity Report");
    assert!(settings.enable_suggestions);
}

#[test]
fn login_flag_round_trip() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    assert!(!app.is_logged_in());
    assert!(!app.login("user", "wrong").unwrap());
    assert!(!app.is_logged_in());
    assert!(app.login("user", "pass").unwrap());
    assert!(app.is_logged_in());
    app.logout().unwrap();
    assert!(!app.is_logged_in());
}

#[test]
fn suggestions_learn_and_deduplicate() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    assert!(app.learn_suggestion("Vacuum pump rebuild").unwrap());
    assert!(!app.learn_suggestion("vacuum pump rebuild").unwrap());
    assert!(!app.learn_suggestion("Inspection").unwrap());
    assert!(!app.learn_suggestion("ab").unwrap());

    let suggestions = app.suggestions();
    assert!(suggestions.contains(&"Vacuum pump rebuild".to_string()));
    assert_eq!(
        suggestions
            .iter()
            .filter(|s| s.eq_ignore_ascii_case("inspection"))
            .count(),
        1
    );
}

#[test]
fn suggestions_are_disabled_by_settings() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    app.settings.enable_suggestions = false;
    assert!(!app.learn_suggestion("Chain greasing").unwrap());
    assert!(!app.suggestions().contains(&"Chain greasing".to_string()));
}

#[test]
fn backup_and_restore_round_trip() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    let d = date("2024-03-01");
    app.select_date(d).unwrap();

    app.sections_mut().add_spare_part("Bearing", "X1").unwrap();
    let next = with_entry(app.report(), ShiftId::Morning, 0, "CFA", "logged work");
    app.update_report(next);
    app.flush_if_dirty().unwrap();

    let payload = app.backup_payload().unwrap();

    // Wipe the report and catalog, then restore.
    app.clear_report().unwrap();
    let part_id = app.sections().parts()[0].id;
    app.sections_mut().remove_spare_part(part_id).unwrap();
    app.flush_if_dirty().unwrap();

    let written = app.restore_backup(&payload).unwrap();
    assert!(written > 0);
    assert_eq!(app.sections().parts().len(), 1);
    assert_eq!(
        app.report().shift(ShiftId::Morning).entries[0].description,
        "logged work"
    );
}

struct FlakySyncTarget {
    fail_with_permission_loss: bool,
    writes: Rc<Cell<usize>>,
}

impl SyncTarget for FlakySyncTarget {
    fn name(&self) -> &str {
        "sync-test.json"
    }

    fn write(&mut self, _payload: &str) -> Result<(), SyncError> {
        if self.fail_with_permission_loss {
            return Err(SyncError::PermissionLost);
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[test]
fn flush_pushes_backup_to_connected_sync_target() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();
    let writes = Rc::new(Cell::new(0));

    app.connect_sync_target(Box::new(FlakySyncTarget {
        fail_with_permission_loss: false,
        writes: Rc::clone(&writes),
    }))
    .unwrap();
    assert_eq!(writes.get(), 1);
    assert!(app.settings.last_sync_time.is_some());

    let next = with_entry(app.report(), ShiftId::Night, 0, "TP", "work");
    app.update_report(next);
    app.flush_if_dirty().unwrap();
    assert_eq!(writes.get(), 2);
}

#[test]
fn permission_loss_clears_the_sync_handle() {
    let harness = IntegrationHarness::new();
    let mut app = harness.app();

    let err = app
        .connect_sync_target(Box::new(FlakySyncTarget {
            fail_with_permission_loss: true,
            writes: Rc::new(Cell::new(0)),
        }))
        .unwrap_err();
    assert!(err.to_string().contains("Re-connect"));
    assert!(!app.sync_connected());

    // Local flushes keep working without the dead handle.
    let next = with_entry(app.report(), ShiftId::Night, 0, "TP", "still saves");
    app.update_report(next);
    assert!(app.flush_if_dirty().unwrap());
}

use std::path::Path;

use maintlog::journal::Journal;
use maintlog::{App, KvStore};
use tempfile::TempDir;

pub struct IntegrationHarness {
    workspace: TempDir,
}

impl IntegrationHarness {
    pub fn new() -> Self {
        let workspace = TempDir::new().expect("failed to create temp workspace");
        Self { workspace }
    }

    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    pub fn app(&self) -> App {
        App::open_at(self.workspace_path()).expect("failed to open app")
    }

    /// Direct store handle over the same workspace, for seeding and
    /// inspecting records behind the application's back.
    pub fn store(&self) -> KvStore {
        let journal = Journal::at(self.workspace_path());
        KvStore::open(self.workspace_path(), journal).expect("failed to open store")
    }
}

mod app_state;
mod export_csv;
mod history_undo;
mod report_scoping;
mod section_database;

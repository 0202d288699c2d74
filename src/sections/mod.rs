//! Section management: the sections list, the active-section pointer, and the
//! per-section reference bundle (machines, engineer roster, spare-parts
//! catalog).
//!
//! Renaming a section migrates all three scoped key families to the new name
//! and deletes the old keys; deleting a section removes them. The default
//! section is protected and receives a one-time migration of any ungrouped
//! reference data left behind by earlier installs.

pub mod catalog;

pub use catalog::SparePart;

use anyhow::{bail, Result};
use serde_json::Value;

use crate::journal::{EventType, Journal};
use crate::storage::{keys, KvStore};

/// The protected section every install starts with.
pub const DEFAULT_SECTION: &str = "Filling and Downstream";

/// Machine list a section falls back to before one is saved for it.
pub const DEFAULT_MACHINES: &[&str] = &[
    "CFA",
    "TP",
    "Buffer",
    "ACB",
    "Palletizer",
    "Straw",
    "Shrink",
];

#[derive(Debug)]
pub struct SectionManager {
    store: KvStore,
    journal: Journal,
    sections: Vec<String>,
    active: String,
    machines: Vec<String>,
    engineers: Vec<String>,
    parts: Vec<SparePart>,
}

impl SectionManager {
    pub fn open(store: KvStore, journal: Journal) -> Result<Self> {
        let sections: Vec<String> = store
            .get(keys::SECTIONS)?
            .unwrap_or_else(|| vec![DEFAULT_SECTION.to_string()]);
        let active = store
            .get::<String>(keys::LAST_ACTIVE_SECTION)?
            .filter(|name| sections.contains(name))
            .unwrap_or_else(|| DEFAULT_SECTION.to_string());
        let mut manager = Self {
            store,
            journal,
            sections,
            active: active.clone(),
            machines: Vec::new(),
            engineers: Vec::new(),
            parts: Vec::new(),
        };
        manager.load_reference_data(&active)?;
        Ok(manager)
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn machines(&self) -> &[String] {
        &self.machines
    }

    pub fn engineers(&self) -> &[String] {
        &self.engineers
    }

    pub fn parts(&self) -> &[SparePart] {
        &self.parts
    }

    /// Makes `name` the active section and loads its reference data, falling
    /// back to fixed defaults where no scoped record exists yet.
    pub fn switch_section(&mut self, name: &str) -> Result<()> {
        if !self.sections.iter().any(|s| s == name) {
            bail!("Unknown section '{name}'");
        }
        self.active = name.to_string();
        self.store.set(keys::LAST_ACTIVE_SECTION, &self.active)?;
        self.load_reference_data(name)?;
        self.journal.note(
            EventType::SectionSelected,
            serde_json::json!({ "section": name }),
        );
        Ok(())
    }

    fn load_reference_data(&mut self, section: &str) -> Result<()> {
        if section == DEFAULT_SECTION {
            self.migrate_ungrouped_data(section)?;
        }
        self.machines = self
            .store
            .get(&keys::machines(section))?
            .unwrap_or_else(|| DEFAULT_MACHINES.iter().map(|m| m.to_string()).collect());
        self.engineers = self.store.get(&keys::engineers(section))?.unwrap_or_default();
        self.parts = self
            .store
            .get(&keys::spare_parts(section))?
            .unwrap_or_default();
        Ok(())
    }

    /// One-time copy of pre-section reference data into the default section's
    /// scoped keys. First write wins: a scoped record that already exists is
    /// never overwritten, so the copy is idempotent.
    fn migrate_ungrouped_data(&self, section: &str) -> Result<()> {
        let moves = [
            (keys::UNGROUPED_MACHINES, keys::machines(section)),
            (keys::UNGROUPED_ENGINEERS, keys::engineers(section)),
            (keys::UNGROUPED_SPARE_PARTS, keys::spare_parts(section)),
        ];
        let mut migrated = false;
        for (old_key, new_key) in moves {
            if self.store.contains(&new_key) {
                continue;
            }
            if let Some(value) = self.store.get::<Value>(old_key)? {
                self.store.set(&new_key, &value)?;
                migrated = true;
            }
        }
        if migrated {
            self.journal.note(
                EventType::ReferenceDataMigrated,
                serde_json::json!({ "section": section }),
            );
        }
        Ok(())
    }

    /// Adds a section. Duplicates (exact match) are silently ignored;
    /// returns whether the list changed.
    pub fn add_section(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() || self.sections.iter().any(|s| s == name) {
            return Ok(false);
        }
        self.sections.push(name.to_string());
        self.store.set(keys::SECTIONS, &self.sections)?;
        self.journal.note(
            EventType::SectionCreated,
            serde_json::json!({ "section": name }),
        );
        Ok(true)
    }

    /// Renames a section, migrating all three scoped reference-data keys to
    /// the new name and deleting the old keys. The protected default section
    /// cannot be renamed, and the new name must be unused.
    pub fn rename_section(&mut self, old: &str, new: &str) -> Result<()> {
        let new = new.trim();
        if old == DEFAULT_SECTION {
            bail!("Cannot rename the default section");
        }
        if new.is_empty() {
            bail!("Section name is required");
        }
        if self.sections.iter().any(|s| s == new) {
            bail!("Section name '{new}' already exists");
        }
        if !self.sections.iter().any(|s| s == old) {
            bail!("Unknown section '{old}'");
        }

        for section in self.sections.iter_mut() {
            if *section == old {
                *section = new.to_string();
            }
        }
        self.store.set(keys::SECTIONS, &self.sections)?;

        // Migrate-then-delete so no orphaned duplicate keys remain.
        let moves = [
            (keys::machines(old), keys::machines(new)),
            (keys::engineers(old), keys::engineers(new)),
            (keys::spare_parts(old), keys::spare_parts(new)),
        ];
        for (old_key, new_key) in moves {
            if let Some(value) = self.store.get::<Value>(&old_key)? {
                self.store.set(&new_key, &value)?;
                self.store.remove(&old_key)?;
            }
        }

        if self.active == old {
            self.active = new.to_string();
            self.store.set(keys::LAST_ACTIVE_SECTION, &self.active)?;
        }
        self.journal.note(
            EventType::SectionRenamed,
            serde_json::json!({ "from": old, "to": new }),
        );
        Ok(())
    }

    /// Deletes a section and all three of its scoped reference-data keys.
    /// Falls back to the protected default if the deleted section was active.
    pub fn delete_section(&mut self, name: &str) -> Result<()> {
        if name == DEFAULT_SECTION {
            bail!("Cannot delete the default section");
        }
        if !self.sections.iter().any(|s| s == name) {
            bail!("Unknown section '{name}'");
        }
        self.sections.retain(|s| s != name);
        self.store.set(keys::SECTIONS, &self.sections)?;
        self.store.remove(&keys::machines(name))?;
        self.store.remove(&keys::engineers(name))?;
        self.store.remove(&keys::spare_parts(name))?;
        self.journal.note(
            EventType::SectionDeleted,
            serde_json::json!({ "section": name }),
        );
        if self.active == name {
            self.switch_section(DEFAULT_SECTION)?;
        }
        Ok(())
    }

    /// Adds a machine to the active section. Duplicates (case-sensitive) are
    /// silently ignored; returns whether the list changed.
    pub fn add_machine(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() || self.machines.iter().any(|m| m == name) {
            return Ok(false);
        }
        self.machines.push(name.to_string());
        self.store
            .set(&keys::machines(&self.active), &self.machines)?;
        Ok(true)
    }

    pub fn remove_machine(&mut self, name: &str) -> Result<()> {
        self.machines.retain(|m| m != name);
        self.store
            .set(&keys::machines(&self.active), &self.machines)?;
        Ok(())
    }

    /// Adds an engineer to the active section's roster. Duplicates
    /// (case-sensitive) are silently ignored.
    pub fn add_engineer(&mut self, name: &str) -> Result<bool> {
        let active = self.active.clone();
        let added = self.add_engineers_for(&active, &[name.to_string()])?;
        Ok(!added.is_empty())
    }

    pub fn remove_engineer(&mut self, name: &str) -> Result<()> {
        self.engineers.retain(|n| n != name);
        self.store
            .set(&keys::engineers(&self.active), &self.engineers)?;
        Ok(())
    }

    /// Inserts any not-yet-present names into `section`'s roster and returns
    /// the names actually added. Keeps the in-memory roster in sync when the
    /// target is the active section.
    pub fn add_engineers_for(&mut self, section: &str, names: &[String]) -> Result<Vec<String>> {
        let mut roster: Vec<String> = if section == self.active {
            self.engineers.clone()
        } else {
            self.store.get(&keys::engineers(section))?.unwrap_or_default()
        };
        let mut added = Vec::new();
        for name in names {
            let name = name.trim();
            if name.is_empty() || roster.iter().any(|n| n == name) {
                continue;
            }
            roster.push(name.to_string());
            added.push(name.to_string());
        }
        if !added.is_empty() {
            self.store.set(&keys::engineers(section), &roster)?;
            if section == self.active {
                self.engineers = roster;
            }
        }
        Ok(added)
    }

    /// Adds a spare part to the active section's catalog, rejecting
    /// case-insensitive name/part-number conflicts.
    pub fn add_spare_part(&mut self, name: &str, part_number: &str) -> Result<SparePart> {
        let active = self.active.clone();
        self.add_spare_part_for(&active, name, part_number)
    }

    /// Same as [`Self::add_spare_part`] against an arbitrary section.
    pub fn add_spare_part_for(
        &mut self,
        section: &str,
        name: &str,
        part_number: &str,
    ) -> Result<SparePart> {
        let mut parts: Vec<SparePart> = if section == self.active {
            self.parts.clone()
        } else {
            self.store
                .get(&keys::spare_parts(section))?
                .unwrap_or_default()
        };
        let part = catalog::insert_part(&mut parts, name, part_number)?;
        self.store.set(&keys::spare_parts(section), &parts)?;
        if section == self.active {
            self.parts = parts;
        }
        Ok(part)
    }

    pub fn update_spare_part(
        &mut self,
        id: uuid::Uuid,
        name: &str,
        part_number: &str,
    ) -> Result<()> {
        let mut parts = self.parts.clone();
        catalog::update_part(&mut parts, id, name, part_number)?;
        self.store.set(&keys::spare_parts(&self.active), &parts)?;
        self.parts = parts;
        Ok(())
    }

    pub fn remove_spare_part(&mut self, id: uuid::Uuid) -> Result<()> {
        self.parts.retain(|p| p.id != id);
        self.store
            .set(&keys::spare_parts(&self.active), &self.parts)?;
        Ok(())
    }

    /// The spare-parts catalog scoped to `section`, without changing the
    /// active selection.
    pub fn parts_for(&self, section: &str) -> Result<Vec<SparePart>> {
        if section == self.active {
            return Ok(self.parts.clone());
        }
        Ok(self
            .store
            .get(&keys::spare_parts(section))?
            .unwrap_or_default())
    }
}

//! Spare-parts catalog records and conflict checks.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entity scoped to one section. Name and part number are unique
/// within the section, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePart {
    pub id: Uuid,
    pub name: String,
    pub part_number: String,
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Case-insensitive lookup by part name.
pub fn find_by_name<'a>(catalog: &'a [SparePart], name: &str) -> Option<&'a SparePart> {
    catalog.iter().find(|p| eq_ignore_case(&p.name, name))
}

/// Inserts a new part, rejecting case-insensitive name or part-number
/// collisions with an explicit conflict. The catalog is unchanged on error.
pub fn insert_part(catalog: &mut Vec<SparePart>, name: &str, part_number: &str) -> Result<SparePart> {
    let name = name.trim();
    let part_number = part_number.trim();
    if name.is_empty() || part_number.is_empty() {
        bail!("Spare part name and part number are required");
    }
    if catalog.iter().any(|p| eq_ignore_case(&p.name, name)) {
        bail!("A spare part named '{name}' already exists in this section");
    }
    if catalog.iter().any(|p| eq_ignore_case(&p.part_number, part_number)) {
        bail!("A spare part with number '{part_number}' already exists in this section");
    }
    let part = SparePart {
        id: Uuid::new_v4(),
        name: name.to_string(),
        part_number: part_number.to_string(),
    };
    catalog.push(part.clone());
    Ok(part)
}

/// Updates an existing part in place, enforcing the same uniqueness rules
/// against every other row.
pub fn update_part(
    catalog: &mut [SparePart],
    id: Uuid,
    name: &str,
    part_number: &str,
) -> Result<()> {
    let name = name.trim();
    let part_number = part_number.trim();
    if name.is_empty() || part_number.is_empty() {
        bail!("Spare part name and part number are required");
    }
    if !catalog.iter().any(|p| p.id == id) {
        bail!("Spare part not found");
    }
    if catalog
        .iter()
        .any(|p| p.id != id && eq_ignore_case(&p.name, name))
    {
        bail!("A spare part named '{name}' already exists in this section");
    }
    if catalog
        .iter()
        .any(|p| p.id != id && eq_ignore_case(&p.part_number, part_number))
    {
        bail!("A spare part with number '{part_number}' already exists in this section");
    }
    for part in catalog.iter_mut() {
        if part.id == id {
            part.name = name.to_string();
            part.part_number = part_number.to_string();
        }
    }
    Ok(())
}

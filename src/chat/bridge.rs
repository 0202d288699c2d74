//! Executes validated tool calls against application state.
//!
//! Calls run sequentially in the order the agent returned them, each
//! observing the effects of the calls before it. Work aimed at the turn's
//! captured (date, section) goes through the undo history with one commit per
//! logical batch; work aimed at any other date is loaded, mutated, and saved
//! through the repository directly, since undo history only ever covers the
//! displayed report.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::app::App;
use crate::journal::EventType;
use crate::reports::{LogEntry, Report, UsedPart};
use crate::sections::catalog;
use crate::sections::SparePart;

use super::tools::{EngineerCommand, EntryDraft, EntryEdit, RawToolCall, ToolCall, UsedPartDraft};
use super::AssistantTurn;

/// Outcome of one tool call, returned to the agent verbatim.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub tool: String,
    pub message: String,
    pub ok: bool,
}

pub fn execute_tool_calls(
    app: &mut App,
    turn: &AssistantTurn,
    calls: &[RawToolCall],
) -> Vec<ToolResult> {
    let mut results = Vec::with_capacity(calls.len());
    for call in calls {
        let outcome = match ToolCall::parse(call) {
            Ok(tool) => execute_one(app, turn, tool),
            Err(message) => Err(anyhow!(message)),
        };
        match outcome {
            Ok(message) => {
                app.journal().note(
                    EventType::ToolExecuted,
                    serde_json::json!({ "tool": call.name, "result": message }),
                );
                results.push(ToolResult {
                    tool: call.name.clone(),
                    message,
                    ok: true,
                });
            }
            Err(err) => {
                app.journal().note(
                    EventType::ToolFailed,
                    serde_json::json!({ "tool": call.name, "error": err.to_string() }),
                );
                results.push(ToolResult {
                    tool: call.name.clone(),
                    message: err.to_string(),
                    ok: false,
                });
            }
        }
    }
    results
}

fn execute_one(app: &mut App, turn: &AssistantTurn, tool: ToolCall) -> Result<String> {
    match tool {
        ToolCall::AddLogEntries { entries } => exec_add_log_entries(app, turn, entries),
        ToolCall::EditLogEntries { edits } => exec_edit_log_entries(app, turn, edits),
        ToolCall::DeleteLogEntries { ids } => exec_delete_log_entries(app, turn, ids),
        ToolCall::AddSparePart { name, part_number } => {
            let part = app
                .sections_mut()
                .add_spare_part_for(&turn.section, &name, &part_number)?;
            Ok(format!("Spare part added: {}", part.name))
        }
        ToolCall::ManageEngineers(command) => exec_manage_engineers(app, turn, command),
        ToolCall::ChangeDate { date } => {
            app.select_date(date)?;
            Ok(format!("Date changed to {}.", date.format("%Y-%m-%d")))
        }
        ToolCall::AnalyzeReport => {
            Ok("Report data is available in the system context.".to_string())
        }
    }
}

fn exec_add_log_entries(
    app: &mut App,
    turn: &AssistantTurn,
    entries: Vec<EntryDraft>,
) -> Result<String> {
    if entries.is_empty() {
        return Ok("No entries provided.".to_string());
    }
    let catalog = app.sections().parts_for(&turn.section)?;
    let total = entries.len();

    let mut by_date: BTreeMap<NaiveDate, Vec<EntryDraft>> = BTreeMap::new();
    for draft in entries {
        by_date
            .entry(draft.date.unwrap_or(turn.date))
            .or_default()
            .push(draft);
    }
    let date_count = by_date.len();

    for (date, drafts) in by_date {
        if date == turn.date {
            // One commit for the whole batch keeps the undo stack at one
            // step per assistant action.
            let mut report = app.turn_report(turn)?;
            for draft in drafts {
                insert_entry(&mut report, draft, &catalog);
            }
            app.commit_turn_report(turn, report)?;
        } else {
            let mut report = app.repository().load(date, &turn.section)?;
            for draft in drafts {
                insert_entry(&mut report, draft, &catalog);
            }
            app.repository().save(&report)?;
        }
    }

    Ok(format!("Added {total} entries across {date_count} dates."))
}

/// Fills the first empty row of the target shift, or appends when every row
/// is in use. Reusing blank rows keeps agent-driven inserts from growing a
/// sparsely filled report without bound.
fn insert_entry(report: &mut Report, draft: EntryDraft, catalog: &[SparePart]) {
    let used = resolve_used_parts(&draft.used_parts, catalog, true);
    let shift = report.shift_mut(draft.shift);
    let index = match shift.first_empty_row() {
        Some(index) => index,
        None => {
            shift.entries.push(LogEntry::blank());
            shift.entries.len() - 1
        }
    };
    let entry = &mut shift.entries[index];
    entry.machine = draft.machine;
    entry.line = draft.line;
    entry.description = draft.description;
    entry.total_time = draft.total_time;
    entry.notes = draft.notes;
    entry.set_used_parts(used);
}

fn exec_edit_log_entries(
    app: &mut App,
    turn: &AssistantTurn,
    edits: Vec<EntryEdit>,
) -> Result<String> {
    if edits.is_empty() {
        return Ok("No edits provided.".to_string());
    }
    let catalog = app.sections().parts_for(&turn.section)?;
    let mut report = app.turn_report(turn)?;
    let mut by_id: HashMap<String, EntryEdit> =
        edits.into_iter().map(|e| (e.id.clone(), e)).collect();

    let mut updated = 0;
    for shift in report.shifts.iter_mut() {
        for entry in shift.entries.iter_mut() {
            if let Some(edit) = by_id.remove(&entry.id.to_string()) {
                apply_edit(entry, edit, &catalog);
                updated += 1;
            }
        }
    }

    if updated > 0 {
        app.commit_turn_report(turn, report)?;
        Ok(format!("Updated {updated} entries."))
    } else {
        Ok("No matching entries found to edit.".to_string())
    }
}

fn apply_edit(entry: &mut LogEntry, edit: EntryEdit, catalog: &[SparePart]) {
    if let Some(machine) = edit.machine {
        entry.machine = machine;
    }
    if let Some(line) = edit.line {
        entry.line = line;
    }
    if let Some(description) = edit.description {
        entry.description = description;
    }
    if let Some(total_time) = edit.total_time {
        entry.total_time = total_time;
    }
    if let Some(notes) = edit.notes {
        entry.notes = notes;
    }
    if let Some(drafts) = edit.used_parts {
        // Full replacement, never a merge.
        let used = resolve_used_parts(&drafts, catalog, false);
        entry.set_used_parts(used);
    }
}

fn exec_delete_log_entries(
    app: &mut App,
    turn: &AssistantTurn,
    ids: Vec<String>,
) -> Result<String> {
    let ids: HashSet<String> = ids.into_iter().collect();
    let mut report = app.turn_report(turn)?;
    let mut deleted = 0;
    for shift in report.shifts.iter_mut() {
        let before = shift.entries.len();
        shift
            .entries
            .retain(|entry| !ids.contains(&entry.id.to_string()));
        deleted += before - shift.entries.len();
    }
    if deleted > 0 {
        app.commit_turn_report(turn, report)?;
    }
    Ok(format!("Deleted {deleted} entries."))
}

fn exec_manage_engineers(
    app: &mut App,
    turn: &AssistantTurn,
    command: EngineerCommand,
) -> Result<String> {
    match command {
        EngineerCommand::AddToDatabase { names } => {
            let added = app
                .sections_mut()
                .add_engineers_for(&turn.section, &names)?;
            if added.is_empty() {
                Ok("Engineers already exist in database.".to_string())
            } else {
                Ok(format!("Added engineers to database: {}", added.join(", ")))
            }
        }
        EngineerCommand::AssignToShift { shift, names } => {
            let joined = names.join(", ");
            let mut report = app.turn_report(turn)?;
            // Replaces the shift's roster string outright; it does not merge.
            report.shift_mut(shift).engineers = joined.clone();
            app.commit_turn_report(turn, report)?;
            Ok(format!("Assigned {joined} to {shift} shift."))
        }
    }
}

/// Maps part names to catalog rows (case-insensitively). A match takes the
/// catalog's part number and id (and its canonical name on the insert path),
/// while an unknown name is kept as free text with the part number marked
/// unknown and a synthetic id, so the entry's used-parts list stays
/// well-formed either way.
fn resolve_used_parts(
    drafts: &[UsedPartDraft],
    catalog: &[SparePart],
    canonicalize_names: bool,
) -> Vec<UsedPart> {
    drafts
        .iter()
        .map(|draft| {
            let quantity = if draft.quantity.trim().is_empty() {
                "1".to_string()
            } else {
                draft.quantity.trim().to_string()
            };
            match catalog::find_by_name(catalog, &draft.name) {
                Some(part) => UsedPart {
                    part_id: part.id.to_string(),
                    name: if canonicalize_names {
                        part.name.clone()
                    } else {
                        draft.name.clone()
                    },
                    part_number: part.part_number.clone(),
                    quantity,
                },
                None => UsedPart {
                    part_id: Uuid::new_v4().to_string(),
                    name: draft.name.clone(),
                    part_number: "N/A".to_string(),
                    quantity,
                },
            }
        })
        .collect()
}

//! Tool invocations issued by the conversational assistant.
//!
//! Calls arrive as loosely typed `(name, args)` pairs and are validated here
//! into one strongly typed variant per tool before anything touches report
//! state. Argument problems come back as descriptive failure strings for the
//! agent to read; they never abort the turn.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::reports::ShiftId;

/// A tool invocation exactly as returned by the external agent.
#[derive(Debug, Clone, Deserialize)]
pub struct RawToolCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

impl RawToolCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// A spare part referenced by name in a tool call. Matched against the
/// section catalog during execution.
#[derive(Debug, Clone, Deserialize)]
pub struct UsedPartDraft {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

/// One validated entry from `add_log_entries`.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub shift: ShiftId,
    /// Target date; defaults to the turn's captured date when absent.
    pub date: Option<NaiveDate>,
    pub machine: String,
    pub line: String,
    pub description: String,
    pub total_time: String,
    pub notes: String,
    pub used_parts: Vec<UsedPartDraft>,
}

/// One validated sparse edit from `edit_log_entries`. Entry ids are kept as
/// strings and matched textually, so an id the agent garbled simply matches
/// nothing instead of failing the whole call.
#[derive(Debug, Clone)]
pub struct EntryEdit {
    pub id: String,
    pub machine: Option<String>,
    pub line: Option<String>,
    pub description: Option<String>,
    pub total_time: Option<String>,
    pub notes: Option<String>,
    pub used_parts: Option<Vec<UsedPartDraft>>,
}

#[derive(Debug, Clone)]
pub enum EngineerCommand {
    AddToDatabase { names: Vec<String> },
    AssignToShift { shift: ShiftId, names: Vec<String> },
}

/// Validated tool surface, one variant per tool the agent may invoke.
#[derive(Debug, Clone)]
pub enum ToolCall {
    AddLogEntries { entries: Vec<EntryDraft> },
    EditLogEntries { edits: Vec<EntryEdit> },
    DeleteLogEntries { ids: Vec<String> },
    AddSparePart { name: String, part_number: String },
    ManageEngineers(EngineerCommand),
    ChangeDate { date: NaiveDate },
    AnalyzeReport,
}

#[derive(Deserialize)]
struct AddLogEntriesArgs {
    entries: Vec<EntryDraftWire>,
}

#[derive(Deserialize)]
struct EntryDraftWire {
    shift: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    machine: String,
    #[serde(default)]
    line: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "totalTime")]
    total_time: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    used_parts: Vec<UsedPartDraft>,
}

#[derive(Deserialize)]
struct EditLogEntriesArgs {
    edits: Vec<EntryEditWire>,
}

#[derive(Deserialize)]
struct EntryEditWire {
    id: Option<String>,
    #[serde(default)]
    machine: Option<String>,
    #[serde(default)]
    line: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "totalTime")]
    total_time: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    used_parts: Option<Vec<UsedPartDraft>>,
}

#[derive(Deserialize)]
struct DeleteLogEntriesArgs {
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct AddSparePartArgs {
    name: String,
    #[serde(alias = "partNumber")]
    part_number: String,
}

// A `date` argument is accepted from the wire but ignored: engineer
// management always applies to the turn's captured report.
#[derive(Deserialize)]
struct ManageEngineersArgs {
    action: String,
    #[serde(default)]
    names: Vec<String>,
    #[serde(default)]
    shift: Option<String>,
}

#[derive(Deserialize)]
struct ChangeDateArgs {
    date: String,
}

impl ToolCall {
    /// Validates a raw call into a typed one. The error string is written for
    /// the agent: it names the tool and the offending argument.
    pub fn parse(call: &RawToolCall) -> Result<ToolCall, String> {
        match call.name.as_str() {
            "add_log_entries" => {
                let args: AddLogEntriesArgs = decode(call)?;
                let mut entries = Vec::with_capacity(args.entries.len());
                for wire in args.entries {
                    entries.push(parse_entry_draft(wire)?);
                }
                Ok(ToolCall::AddLogEntries { entries })
            }
            "edit_log_entries" => {
                let args: EditLogEntriesArgs = decode(call)?;
                let mut edits = Vec::with_capacity(args.edits.len());
                for wire in args.edits {
                    edits.push(parse_entry_edit(wire)?);
                }
                Ok(ToolCall::EditLogEntries { edits })
            }
            "delete_log_entries" => {
                let args: DeleteLogEntriesArgs = decode(call)?;
                Ok(ToolCall::DeleteLogEntries { ids: args.ids })
            }
            "add_spare_part" => {
                let args: AddSparePartArgs = decode(call)?;
                if args.name.trim().is_empty() || args.part_number.trim().is_empty() {
                    return Err("add_spare_part: name and part number are required".to_string());
                }
                Ok(ToolCall::AddSparePart {
                    name: args.name,
                    part_number: args.part_number,
                })
            }
            "manage_engineers" => {
                let args: ManageEngineersArgs = decode(call)?;
                if args.names.is_empty() {
                    return Err("manage_engineers: names is required".to_string());
                }
                match args.action.as_str() {
                    "add_to_database" => Ok(ToolCall::ManageEngineers(
                        EngineerCommand::AddToDatabase { names: args.names },
                    )),
                    "assign_to_shift" => {
                        let shift = match args.shift.as_deref() {
                            Some(raw) => parse_shift(raw)?,
                            None => {
                                return Err(
                                    "manage_engineers: assign_to_shift requires a shift"
                                        .to_string(),
                                )
                            }
                        };
                        Ok(ToolCall::ManageEngineers(EngineerCommand::AssignToShift {
                            shift,
                            names: args.names,
                        }))
                    }
                    other => Err(format!(
                        "manage_engineers: unrecognized action '{other}': expected add_to_database or assign_to_shift"
                    )),
                }
            }
            "change_date" => {
                let args: ChangeDateArgs = decode(call)?;
                let date = parse_date(&args.date)
                    .map_err(|message| format!("change_date: {message}"))?;
                Ok(ToolCall::ChangeDate { date })
            }
            "analyze_report" => Ok(ToolCall::AnalyzeReport),
            other => Err(format!("Tool '{other}' is not recognized.")),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(call: &RawToolCall) -> Result<T, String> {
    serde_json::from_value(call.args.clone())
        .map_err(|err| format!("{}: invalid arguments: {err}", call.name))
}

fn parse_entry_draft(wire: EntryDraftWire) -> Result<EntryDraft, String> {
    let shift = match wire.shift.as_deref() {
        Some(raw) => parse_shift(raw)?,
        None => {
            return Err("add_log_entries: each entry requires a shift".to_string());
        }
    };
    let date = match wire.date.as_deref() {
        Some(raw) => Some(parse_date(raw).map_err(|message| format!("add_log_entries: {message}"))?),
        None => None,
    };
    Ok(EntryDraft {
        shift,
        date,
        machine: wire.machine,
        line: wire.line,
        description: wire.description,
        total_time: wire.total_time,
        notes: wire.notes,
        used_parts: wire.used_parts,
    })
}

fn parse_entry_edit(wire: EntryEditWire) -> Result<EntryEdit, String> {
    let id = match wire.id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Err("edit_log_entries: each edit requires an entry id".to_string()),
    };
    Ok(EntryEdit {
        id,
        machine: wire.machine,
        line: wire.line,
        description: wire.description,
        total_time: wire.total_time,
        notes: wire.notes,
        used_parts: wire.used_parts,
    })
}

fn parse_shift(raw: &str) -> Result<ShiftId, String> {
    ShiftId::parse(raw).ok_or_else(|| {
        format!("unrecognized shift '{raw}': expected night, morning, or evening")
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{raw}': expected YYYY-MM-DD"))
}

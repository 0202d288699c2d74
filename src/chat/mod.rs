//! Conversational assistant integration.
//!
//! The external model is a black-box collaborator behind [`AssistantClient`]:
//! it receives a context summary, the conversation so far, and the latest
//! user message, and replies with free text plus zero or more tool calls.
//! Everything that mutates state funnels through the bridge so assistant
//! edits follow the exact same validation and undo paths as manual ones.

pub mod bridge;
pub mod tools;

pub use bridge::{execute_tool_calls, ToolResult};
pub use tools::{RawToolCall, ToolCall};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::App;
use crate::reports::Report;
use crate::sections::SparePart;
use crate::settings::AppSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Binary payload attached to a user message (e.g. a photo of a nameplate).
#[derive(Debug, Clone)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Everything the external model needs for one completion.
#[derive(Debug, Clone)]
pub struct AssistantRequest {
    pub system_context: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub attachments: Vec<Attachment>,
}

/// The model's answer: free text plus the tool calls it wants executed, in
/// the order it wants them executed.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub text: String,
    pub tool_calls: Vec<RawToolCall>,
}

/// Host-implemented transport to the external model.
pub trait AssistantClient {
    fn complete(&mut self, request: &AssistantRequest) -> Result<AssistantReply>;
}

/// A single in-flight assistant exchange. The target date and section are
/// captured when the turn starts; results always land there, even if the user
/// navigates elsewhere before the reply arrives.
#[derive(Debug, Clone)]
pub struct AssistantTurn {
    pub turn_id: Uuid,
    pub date: NaiveDate,
    pub section: String,
}

/// Summarizes the report and reference data for the model: non-empty entries
/// per shift, plus the catalogs it may reference by name.
pub fn build_system_context(
    report: &Report,
    machines: &[String],
    engineers: &[String],
    parts: &[SparePart],
) -> String {
    let mut shifts = serde_json::Map::new();
    for shift in report.shifts.iter() {
        let entries: Vec<serde_json::Value> = shift
            .entries
            .iter()
            .filter(|e| !e.machine.trim().is_empty() || !e.description.trim().is_empty())
            .map(|e| {
                serde_json::json!({
                    "id": e.id,
                    "machine": e.machine,
                    "desc": e.description,
                    "time": e.total_time,
                    "parts": e.spare_parts,
                })
            })
            .collect();
        shifts.insert(shift.id.as_str().to_string(), serde_json::Value::Array(entries));
    }
    let catalog: Vec<String> = parts
        .iter()
        .map(|p| format!("{} ({})", p.name, p.part_number))
        .collect();
    serde_json::json!({
        "date": report.date,
        "section": report.section,
        "shifts": shifts,
        "machines": machines,
        "engineers": engineers,
        "spare_parts": catalog,
    })
    .to_string()
}

#[derive(Debug, Clone)]
pub struct AssistantTurnOutcome {
    pub text: String,
    pub tool_results: Vec<ToolResult>,
}

/// Runs one full assistant exchange: serialize the turn, call the model,
/// execute its tool calls, and release the turn. When the model returns no
/// prose, the tool results stand in for it.
pub fn run_assistant_turn(
    app: &mut App,
    client: &mut dyn AssistantClient,
    history: &[ChatMessage],
    message: &str,
    attachments: Vec<Attachment>,
) -> Result<AssistantTurnOutcome> {
    let turn = app.begin_assistant_turn()?;
    let request = AssistantRequest {
        system_context: build_system_context(
            app.report(),
            app.sections().machines(),
            app.sections().engineers(),
            app.sections().parts(),
        ),
        history: history.to_vec(),
        message: message.to_string(),
        attachments,
    };
    let reply = match client.complete(&request) {
        Ok(reply) => reply,
        Err(err) => {
            app.abandon_assistant_turn(&turn);
            bail!(describe_external_failure(&err, &app.settings));
        }
    };
    let tool_results = app.finish_assistant_turn(&turn, &reply.tool_calls)?;
    let text = if reply.text.trim().is_empty() && !tool_results.is_empty() {
        tool_results
            .iter()
            .map(|r| r.message.clone())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        reply.text
    };
    Ok(AssistantTurnOutcome { text, tool_results })
}

/// User-facing description of an external-call failure. Quota exhaustion gets
/// a concrete suggestion instead of the raw error.
pub fn describe_external_failure(err: &anyhow::Error, settings: &AppSettings) -> String {
    let raw = err.to_string();
    let lower = raw.to_lowercase();
    if lower.contains("quota") || lower.contains("resource_exhausted") || lower.contains("429") {
        format!(
            "The model '{}' has run out of quota. Switch to a lighter model in the AI settings and try again.",
            settings.ai_model
        )
    } else {
        format!("Assistant request failed: {raw}")
    }
}

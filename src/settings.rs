//! Process-wide application settings.
//!
//! Persisted as a whole under the `settings` key and merged with defaults on
//! load: every field carries a serde default, so saves written by older
//! versions gain newly introduced fields without corruption.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{keys, KvStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
    Xl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    Iso,
    Uk,
    Us,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "default_font_size")]
    pub font_size: FontSize,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub compact_mode: bool,
    #[serde(default = "default_true")]
    pub confirm_delete_row: bool,
    #[serde(default)]
    pub enable_spell_check: bool,
    #[serde(default = "default_true")]
    pub show_line_column: bool,
    #[serde(default = "default_true")]
    pub show_time_column: bool,
    #[serde(default = "default_true")]
    pub enable_suggestions: bool,
    #[serde(default)]
    pub custom_logo: Option<String>,
    #[serde(default = "default_date_format")]
    pub date_format: DateFormat,
    #[serde(default = "default_report_title")]
    pub report_title: String,
    #[serde(default)]
    pub hide_empty_rows_print: bool,
    #[serde(default = "default_true")]
    pub auto_capitalize: bool,
    // Older saves used the provider-specific key name.
    #[serde(default, alias = "geminiApiKey")]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
    #[serde(default = "default_ai_temperature")]
    pub ai_temperature: f32,
    #[serde(default)]
    pub last_sync_time: Option<DateTime<Utc>>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            font_family: default_font_family(),
            theme: default_theme(),
            compact_mode: false,
            confirm_delete_row: true,
            enable_spell_check: false,
            show_line_column: true,
            show_time_column: true,
            enable_suggestions: true,
            custom_logo: None,
            date_format: default_date_format(),
            report_title: default_report_title(),
            hide_empty_rows_print: false,
            auto_capitalize: true,
            api_key: None,
            ai_model: default_ai_model(),
            ai_temperature: default_ai_temperature(),
            last_sync_time: None,
        }
    }
}

impl AppSettings {
    pub fn load(store: &KvStore) -> Result<Self> {
        Ok(store.get(keys::SETTINGS)?.unwrap_or_default())
    }

    pub fn save(&self, store: &KvStore) -> Result<()> {
        store.set(keys::SETTINGS, self)
    }

    /// Formats a date for display according to the configured format.
    pub fn format_date(&self, date: NaiveDate) -> String {
        match self.date_format {
            DateFormat::Iso => date.format("%Y-%m-%d").to_string(),
            DateFormat::Uk => format!("{:02}/{:02}/{}", date.day(), date.month(), date.year()),
            DateFormat::Us => format!("{:02}/{:02}/{}", date.month(), date.day(), date.year()),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_font_size() -> FontSize {
    FontSize::Medium
}

fn default_font_family() -> String {
    "Inter".to_string()
}

fn default_theme() -> String {
    "blue".to_string()
}

fn default_date_format() -> DateFormat {
    DateFormat::Iso
}

fn default_report_title() -> String {
    "Daily Maintenance Activity Report".to_string()
}

fn default_ai_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_ai_temperature() -> f32 {
    0.7
}

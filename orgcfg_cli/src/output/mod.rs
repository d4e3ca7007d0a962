use crate::cli::OutputFormat;
use crate::commands::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use orgcfg_core::state::Toggles;
use orgcfg_core::{FieldDisplay, FieldId, FieldKind, Integration, SaveOutcome, SecretState};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    pub path: String,
    pub label: &'static str,
    pub kind: &'static str,
    pub secret: bool,
    pub integration: Option<Integration>,
}

impl FieldInfo {
    pub fn of(field: FieldId) -> Self {
        Self {
            path: field.path(),
            label: field.label(),
            kind: match field.kind() {
                FieldKind::Text => "text",
                FieldKind::Flag => "flag",
            },
            secret: field.is_secret(),
            integration: Integration::governing(field),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    Settings {
        organisation: String,
        backend: String,
        toggles: Toggles,
        fields: Vec<FieldDisplay>,
    },
    Fields(Vec<FieldInfo>),
    Payload {
        dry_run: bool,
        payload: Value,
    },
    Saved(SaveOutcome),
    ClientSettings(Value),
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text => format_text_output(data)?,
        OutputFormat::Pretty => format_pretty_output(data)?,
    }
    Ok(())
}

fn display_value(d: &FieldDisplay) -> String {
    match d.state {
        SecretState::Masked => "(stored, hidden)".to_string(),
        SecretState::Absent => String::new(),
        SecretState::Real => d.value.clone(),
    }
}

fn format_text_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::Settings { fields, .. } => {
            for d in fields {
                println!("{}={}", d.field.path(), display_value(d));
            }
        }
        OutputData::Fields(fields) => {
            for f in fields {
                println!("{}\t{}\t{}", f.path, f.kind, if f.secret { "secret" } else { "" });
            }
        }
        OutputData::Payload { payload, .. } => {
            println!("{}", serde_json::to_string_pretty(payload)?);
        }
        OutputData::Saved(outcome) => match outcome {
            SaveOutcome::NothingToSave => println!("nothing to save"),
            SaveOutcome::Saved { fields, saved_at } => {
                let names: Vec<String> = fields.iter().map(|f| f.path()).collect();
                println!("saved {} at {}", names.join(","), saved_at.to_rfc3339());
            }
        },
        OutputData::ClientSettings(value) => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

fn format_pretty_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::Settings {
            organisation,
            backend,
            toggles,
            fields,
        } => {
            println!();
            println!("{} {}", "Organisation:".bold().cyan(), organisation.bold());
            println!("{} {}", "Backend:".dimmed(), backend.dimmed());
            println!();
            println!(
                "  email {}   sms {}   s3 {}",
                on_off(toggles.email),
                on_off(toggles.sms),
                on_off(toggles.s3)
            );
            println!();
            println!("{}", settings_table(fields));
            println!();
        }
        OutputData::Fields(fields) => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Field", "Label", "Kind", "Secret", "Integration"]);
            for f in fields {
                table.add_row(vec![
                    Cell::new(&f.path),
                    Cell::new(f.label),
                    Cell::new(f.kind),
                    Cell::new(if f.secret { "yes" } else { "" }),
                    Cell::new(f.integration.map(|i| i.to_string()).unwrap_or_default()),
                ]);
            }
            println!("{table}");
        }
        OutputData::Payload { dry_run, payload } => {
            let title = if *dry_run {
                "Update payload (dry run)"
            } else {
                "Update payload"
            };
            println!("{}", title.bold().cyan());
            if payload.as_object().map(|m| m.is_empty()).unwrap_or(true) {
                println!("  {}", "nothing to send".dimmed());
            } else {
                println!("{}", serde_json::to_string_pretty(payload)?);
            }
        }
        OutputData::Saved(outcome) => match outcome {
            SaveOutcome::NothingToSave => {
                println!("{} No changes to save.", "Note:".yellow().bold());
            }
            SaveOutcome::Saved { fields, saved_at } => {
                println!(
                    "{} Saved {} field(s) at {}",
                    "Success!".green().bold(),
                    fields.len(),
                    saved_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
                for f in fields {
                    println!("  {} {}", "•".dimmed(), f.path().cyan());
                }
            }
        },
        OutputData::ClientSettings(value) => {
            println!("{}", "Client Settings".bold().cyan());
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

fn on_off(enabled: bool) -> String {
    if enabled {
        "on".green().bold().to_string()
    } else {
        "off".dimmed().to_string()
    }
}

pub fn settings_table(fields: &[FieldDisplay]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Field", "Value", "Status"]);
    for d in fields {
        let status = match (d.state, d.touched) {
            (_, true) => "edited",
            (SecretState::Masked, false) => "masked",
            (SecretState::Absent, false) => "empty",
            (SecretState::Real, false) => "",
        };
        table.add_row(vec![
            Cell::new(d.field.path()),
            Cell::new(display_value(d)),
            Cell::new(status),
        ]);
    }
    table
}

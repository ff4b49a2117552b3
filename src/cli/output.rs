//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use chrono::Utc;
use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{AttributeProfile, KeysetConfig, ValidationResult};
use crate::planner::{
    DiffResult, DiffType, GuardReason, KeyExtractor, ListResponse, PlanDecision, RecordHasher,
    UNRESOLVED_KEY,
};
use crate::value::ListValue;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Record row for table display.
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
}

/// Diff row for table display.
#[derive(Tabled)]
struct DiffRow {
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Fields")]
    fields: String,
}

/// Profile row for table display.
#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Identity")]
    identity: String,
    #[tabled(rename = "Essential fields")]
    essential: usize,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the modifier's response and decision, with the keyed diff
    /// if given.
    #[must_use]
    pub fn format_plan(
        &self,
        profile: &AttributeProfile,
        decision: PlanDecision,
        resp: &ListResponse,
        diff: Option<&DiffResult>,
    ) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "created_at": Utc::now().to_rfc3339(),
                    "decision": decision,
                    "plan_value": resp.plan_value.to_json(),
                    "diagnostics": resp.diagnostics,
                    "diff": diff,
                });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = Self::format_decision(decision);

                for diagnostic in &resp.diagnostics {
                    let _ = writeln!(output, "   {diagnostic}");
                }

                output.push_str(&Self::format_records_text(profile, &resp.plan_value));

                if let Some(diff) = diff {
                    output.push_str(&Self::format_diff_text(diff));
                }
                output
            }
        }
    }

    /// Formats a keyed diff report.
    #[must_use]
    pub fn format_diff(&self, diff: &DiffResult) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(diff).unwrap_or_default(),
            OutputFormat::Text => Self::format_diff_text(diff),
        }
    }

    /// Formats a collection, as JSON or as a table of keys.
    #[must_use]
    pub fn format_collection(&self, profile: &AttributeProfile, value: &ListValue) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&value.to_json()).unwrap_or_default(),
            OutputFormat::Text => Self::format_records_text(profile, value),
        }
    }

    /// Formats the available attribute profiles.
    #[must_use]
    pub fn format_profiles(&self, config: &KeysetConfig) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(config).unwrap_or_default(),
            OutputFormat::Text => {
                let default = config.default_profile.as_deref();
                let rows: Vec<ProfileRow> = config
                    .profiles
                    .iter()
                    .map(|(name, profile)| ProfileRow {
                        name: if Some(name.as_str()) == default {
                            format!("{name} (default)")
                        } else {
                            name.clone()
                        },
                        identity: profile.identity_field.clone(),
                        essential: profile.essential_fields.len(),
                    })
                    .collect();

                let mut output = Table::new(rows).to_string();
                output.push('\n');
                output
            }
        }
    }

    /// Formats a configuration validation result.
    #[must_use]
    pub fn format_validation(&self, result: &ValidationResult, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "valid": result.is_valid(),
                    "errors": result.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "warnings": result.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
                });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = if result.is_valid() {
                    format!("{} Configuration is valid.\n", "✓".green())
                } else {
                    let mut output = format!("{} Configuration is invalid:\n", "✗".red());
                    for error in &result.errors {
                        let _ = writeln!(output, "   - {error}");
                    }
                    output
                };

                if show_warnings && result.warning_count() > 0 {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }
                output
            }
        }
    }

    /// Formats the terminal decision as a headline.
    fn format_decision(decision: PlanDecision) -> String {
        match decision {
            PlanDecision::Suppressed => format!(
                "{} Reorder only - prior order kept, no changes.\n",
                "✓".green()
            ),
            PlanDecision::Resorted => {
                format!("{} Planned list sorted by key.\n", "~".yellow())
            }
            PlanDecision::Passthrough(reason) => format!(
                "{} Desired list passed through: {}.\n",
                "-".dimmed(),
                Self::format_guard_reason(reason)
            ),
        }
    }

    /// Describes why a plan was passed through.
    const fn format_guard_reason(reason: GuardReason) -> &'static str {
        match reason {
            GuardReason::DesiredUnresolved => "desired list is null or unknown",
            GuardReason::NoPrior => "no prior state",
            GuardReason::DesiredEmpty => "desired list is empty",
            GuardReason::IncompleteKeys => "some keys are missing, unknown or duplicated",
            GuardReason::ElementTypeMismatch => "records do not match the list element type",
        }
    }

    /// Formats the records of a list as a table.
    fn format_records_text(profile: &AttributeProfile, value: &ListValue) -> String {
        let Some(collection) = value.as_known() else {
            let state = if value.is_unknown() { "unknown" } else { "null" };
            return format!("   List is {state}.\n");
        };

        let extractor = KeyExtractor::new(&profile.identity_field);
        let hasher = RecordHasher::new();
        let rows: Vec<RecordRow> = collection
            .records()
            .iter()
            .enumerate()
            .map(|(i, record)| RecordRow {
                index: i + 1,
                key: extractor.extract(record).unwrap_or(UNRESOLVED_KEY).to_string(),
                fingerprint: hasher.short_hash(
                    &hasher.hash_record(record, profile.essential_fields.as_slice()),
                ),
            })
            .collect();

        let mut output = Table::new(rows).to_string();
        output.push('\n');
        output
    }

    /// Formats a diff as text.
    fn format_diff_text(diff: &DiffResult) -> String {
        if !diff.has_changes() {
            return format!("\n{} No changes by key.\n", "✓".green());
        }

        let rows: Vec<DiffRow> = diff
            .actionable_diffs()
            .into_iter()
            .map(|d| DiffRow {
                change: Self::format_diff_type(d.diff_type),
                key: d.key.clone(),
                fields: Self::truncate(
                    &d.details
                        .iter()
                        .map(|detail| {
                            format!(
                                "{}: {} -> {}",
                                detail.field,
                                detail.old_value.as_deref().unwrap_or("null"),
                                detail.new_value.as_deref().unwrap_or("null")
                            )
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                    60,
                ),
            })
            .collect();

        let mut output = String::from("\n");
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        let _ = write!(
            output,
            "\nKeys: {} to create, {} to update, {} to delete, {} unchanged\n",
            diff.creates.to_string().green(),
            diff.updates.to_string().yellow(),
            diff.deletes.to_string().red(),
            diff.unchanged
        );
        output
    }

    /// Formats a diff type with color.
    fn format_diff_type(diff_type: DiffType) -> String {
        match diff_type {
            DiffType::Create => "+create".green().to_string(),
            DiffType::Update => "~update".yellow().to_string(),
            DiffType::Delete => "-delete".red().to_string(),
            DiffType::NoChange => "unchanged".dimmed().to_string(),
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{head}...")
        }
    }
}

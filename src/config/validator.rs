//! Configuration validation for attribute profiles.
//!
//! Ensures every profile names a usable identity attribute and a clean
//! essential field set before any plan is reconciled with it.

use crate::error::{ConfigError, KeysetError, Result};
use std::collections::HashSet;
use tracing::debug;

use super::spec::{AttributeProfile, KeysetConfig};

/// Validator for reconciliation configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any were found.
    pub fn validate(&self, config: &KeysetConfig) -> Result<ValidationResult> {
        let result = self.check(config);

        if let Some(first_error) = result.errors.first() {
            Err(KeysetError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        } else {
            debug!("Configuration validation passed");
            Ok(result)
        }
    }

    /// Collects every error and warning without failing.
    #[must_use]
    pub fn check(&self, config: &KeysetConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        if config.profiles.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("profiles"),
                message: String::from("At least one attribute profile must be defined"),
            });
        }

        if let Some(default) = &config.default_profile {
            if !config.profiles.contains_key(default) {
                result.errors.push(ValidationError {
                    field: String::from("default_profile"),
                    message: format!("Default profile '{default}' is not defined"),
                });
            }
        }

        for (name, profile) in &config.profiles {
            let prefix = format!("profiles.{name}");

            if !is_valid_attribute_name(name) {
                result.errors.push(ValidationError {
                    field: prefix.clone(),
                    message: format!(
                        "Profile name '{name}' is invalid. Must be lowercase alphanumeric with underscores."
                    ),
                });
            }

            Self::validate_profile(profile, &prefix, &mut result);
        }

        result
    }

    /// Validates a single attribute profile.
    fn validate_profile(profile: &AttributeProfile, prefix: &str, result: &mut ValidationResult) {
        if profile.identity_field.is_empty() {
            result.errors.push(ValidationError {
                field: format!("{prefix}.identity_field"),
                message: String::from("Identity field cannot be empty"),
            });
        } else if !is_valid_attribute_name(&profile.identity_field) {
            result.errors.push(ValidationError {
                field: format!("{prefix}.identity_field"),
                message: format!(
                    "Identity field '{}' is not a valid attribute name",
                    profile.identity_field
                ),
            });
        }

        if profile.essential_fields.is_empty() {
            result.errors.push(ValidationError {
                field: format!("{prefix}.essential_fields"),
                message: String::from("At least one essential field must be listed"),
            });
            return;
        }

        let mut seen = HashSet::new();
        for (i, field) in profile.essential_fields.iter().enumerate() {
            if !is_valid_attribute_name(field) {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.essential_fields[{i}]"),
                    message: format!("'{field}' is not a valid attribute name"),
                });
            }

            if !seen.insert(field.as_str()) {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.essential_fields[{i}]"),
                    message: format!("Duplicate essential field: {field}"),
                });
            }
        }

        if !profile.is_essential(&profile.identity_field) {
            result.warnings.push(format!(
                "{prefix}: identity field '{}' is not listed as essential",
                profile.identity_field
            ));
        }
    }
}

/// Attribute names are lowercase snake_case identifiers starting with a letter.
fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();

    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_lowercase() {
        return false;
    }

    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

//! Configuration module for the keyset reconciliation system.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `keyset.yaml`
//! - Built-in attribute profiles
//! - Validation of identity and essential field sets

mod spec;
mod parser;
mod validator;

pub use spec::{
    AttributeProfile, KeysetConfig, MANAGED_NODEGROUPS_PROFILE, NODE_GROUPS_PROFILE,
    NODEGROUP_ESSENTIAL_FIELDS,
};
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, PROFILE_ENV_VAR, find_config_file};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};

//! Configuration specification types for the reconciliation engine.
//!
//! This module defines the structs that map to the `keyset.yaml` file: a set
//! of named attribute profiles, each describing how one keyed list attribute
//! is identified and compared.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConfigError, KeysetError, Result};

/// Name of the profile used for managed node group lists.
pub const MANAGED_NODEGROUPS_PROFILE: &str = "managed_nodegroups";

/// Name of the profile used for self-managed node group lists.
pub const NODE_GROUPS_PROFILE: &str = "node_groups";

/// Essential fields of a node group definition.
///
/// Excludes attributes the remote system computes or defaults.
pub const NODEGROUP_ESSENTIAL_FIELDS: &[&str] = &[
    "name",
    "ami_family",
    "instance_type",
    "desired_capacity",
    "min_size",
    "max_size",
    "volume_size",
    "volume_type",
    "labels",
    "tags",
    "taints",
    "ssh",
    "iam",
    "subnets",
    "availability_zones",
];

/// The root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeysetConfig {
    /// Profile used when none is requested explicitly.
    #[serde(default)]
    pub default_profile: Option<String>,
    /// Attribute profiles by name.
    pub profiles: BTreeMap<String, AttributeProfile>,
}

/// How one keyed list attribute is reconciled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeProfile {
    /// Attribute holding each record's identity.
    #[serde(default = "default_identity_field")]
    pub identity_field: String,
    /// Attributes whose change is a real plan difference.
    pub essential_fields: Vec<String>,
}

fn default_identity_field() -> String {
    String::from("name")
}

impl AttributeProfile {
    /// Creates a profile.
    #[must_use]
    pub fn new<I, S>(identity_field: impl Into<String>, essential_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identity_field: identity_field.into(),
            essential_fields: essential_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The node group profile keyed by `name`.
    #[must_use]
    pub fn nodegroups() -> Self {
        Self::new("name", NODEGROUP_ESSENTIAL_FIELDS.iter().copied())
    }

    /// Returns true if the field takes part in equality.
    #[must_use]
    pub fn is_essential(&self, field: &str) -> bool {
        self.essential_fields.iter().any(|f| f == field)
    }
}

impl KeysetConfig {
    /// The configuration used when no file is present.
    #[must_use]
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            String::from(MANAGED_NODEGROUPS_PROFILE),
            AttributeProfile::nodegroups(),
        );
        profiles.insert(String::from(NODE_GROUPS_PROFILE), AttributeProfile::nodegroups());

        Self {
            default_profile: Some(String::from(MANAGED_NODEGROUPS_PROFILE)),
            profiles,
        }
    }

    /// Resolves a profile by name, falling back to the default profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile does not exist, or if no name is
    /// given and no default is configured.
    pub fn profile(&self, name: Option<&str>) -> Result<&AttributeProfile> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or_else(|| {
                KeysetError::Config(ConfigError::validation(
                    "No profile requested and no default_profile configured",
                    "default_profile",
                ))
            })?;

        self.profiles.get(name).ok_or_else(|| {
            KeysetError::Config(ConfigError::UnknownProfile {
                name: name.to_string(),
            })
        })
    }

    /// Iterates profile names in order.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

impl Default for KeysetConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let config = KeysetConfig::builtin();
        let profile = config.profile(None).unwrap();

        assert_eq!(profile.identity_field, "name");
        assert!(profile.is_essential("instance_type"));
        assert!(!profile.is_essential("version"));
        assert_eq!(config.profile_names().count(), 2);
    }

    #[test]
    fn test_unknown_profile() {
        let config = KeysetConfig::builtin();
        let err = config.profile(Some("worker_pools")).unwrap_err();
        assert!(matches!(
            err,
            KeysetError::Config(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn test_missing_default() {
        let config = KeysetConfig {
            default_profile: None,
            profiles: BTreeMap::new(),
        };
        assert!(config.profile(None).is_err());
    }
}

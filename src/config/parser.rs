//! Configuration parser for loading attribute profiles.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{ConfigError, KeysetError, Result};
use std::path::Path;
use tracing::{debug, info};

use super::spec::KeysetConfig;

/// Environment variable overriding the default profile.
pub const PROFILE_ENV_VAR: &str = "KEYSET_PROFILE";

/// Configuration parser for loading reconciliation configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<std::path::PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<KeysetConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(KeysetError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            KeysetError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<KeysetConfig> {
        debug!("Parsing YAML configuration");

        let config: KeysetConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            KeysetError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!("Parsed {} attribute profiles", config.profiles.len());
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// `KEYSET_PROFILE` replaces the configured default profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<KeysetConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Resolves the configuration to use: an explicit file, a discovered
    /// file, or the built-in profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit or discovered file cannot be loaded.
    pub fn resolve(&self, explicit: Option<&Path>) -> Result<KeysetConfig> {
        if let Some(path) = explicit {
            return self.load_with_env(path);
        }

        let start = self
            .base_path
            .clone()
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        let start = start.canonicalize().unwrap_or(start);

        match find_config_file(&start) {
            Ok(path) => self.load_with_env(path),
            Err(KeysetError::Config(ConfigError::FileNotFound { .. })) => {
                debug!("No configuration file found, using built-in profiles");
                let mut config = KeysetConfig::builtin();
                Self::apply_env_overrides(&mut config);
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(config: &mut KeysetConfig) {
        if let Ok(profile) = std::env::var(PROFILE_ENV_VAR) {
            debug!("Overriding default_profile from environment");
            config.default_profile = Some(profile);
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| std::path::PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                KeysetError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["keyset.yaml", "keyset.yml", ".keyset.yaml"];

/// Finds the configuration file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(KeysetError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r"
profiles:
  worker_pools:
    essential_fields: [name, machine_type]
";
        let parser = ConfigParser::new();
        let config = parser.parse_yaml(yaml, None).unwrap();

        let profile = &config.profiles["worker_pools"];
        assert_eq!(profile.identity_field, "name");
        assert_eq!(profile.essential_fields, vec!["name", "machine_type"]);
        assert!(config.default_profile.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
default_profile: managed_nodegroups
profiles:
  managed_nodegroups:
    identity_field: name
    essential_fields:
      - name
      - instance_type
      - desired_capacity
  addons:
    identity_field: addon_name
    essential_fields: [addon_name, version]
";
        let parser = ConfigParser::new();
        let config = parser.parse_yaml(yaml, None).unwrap();

        assert_eq!(config.profiles.len(), 2);
        assert_eq!(config.profile(None).unwrap().essential_fields.len(), 3);
        assert_eq!(
            config.profile(Some("addons")).unwrap().identity_field,
            "addon_name"
        );
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let parser = ConfigParser::new();
        let err = parser.parse_yaml("profiles: [", None).unwrap_err();
        assert!(matches!(
            err,
            KeysetError::Config(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigParser::new()
            .load_file(dir.path().join("keyset.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            KeysetError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_find_config_file_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("envs").join("prod");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            dir.path().join("keyset.yml"),
            "profiles:\n  pools:\n    essential_fields: [name]\n",
        )
        .unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join("keyset.yml"));

        let config = ConfigParser::new().load_file(&found).unwrap();
        assert!(config.profiles.contains_key("pools"));
    }

    #[test]
    fn test_resolve_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(
            &path,
            "default_profile: pools\nprofiles:\n  pools:\n    essential_fields: [name, size]\n",
        )
        .unwrap();

        let config = ConfigParser::new().resolve(Some(&path)).unwrap();
        assert_eq!(config.profile(None).unwrap().essential_fields, vec!["name", "size"]);
    }

    #[test]
    fn test_resolve_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigParser::new()
            .resolve(Some(&dir.path().join("absent.yaml")))
            .unwrap_err();
        assert!(err.is_config());
    }
}

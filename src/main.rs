//! Keyset CLI entrypoint.
//!
//! This is the main entrypoint for the keyset command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use keyset_reconcile::cli::{Cli, Commands, OutputFormatter};
use keyset_reconcile::config::{AttributeProfile, ConfigParser, ConfigValidator, KeysetConfig};
use keyset_reconcile::error::Result;
use keyset_reconcile::planner::{
    DiffEngine, KeyExtractor, KeyedListSortModifier, ListPlanModifier, ListRequest, ListResponse,
    canonical_order,
};
use keyset_reconcile::value::{Collection, ListValue};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Dispatches the parsed command.
fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Plan {
            prior,
            desired,
            profile,
            detailed,
        } => cmd_plan(config_path, &prior, &desired, profile.as_deref(), detailed, &formatter),
        Commands::Diff {
            prior,
            desired,
            profile,
        } => cmd_diff(config_path, &prior, &desired, profile.as_deref(), &formatter),
        Commands::Sort { input, profile } => {
            cmd_sort(config_path, &input, profile.as_deref(), &formatter)
        }
        Commands::Validate { warnings } => cmd_validate(config_path, warnings, &formatter),
        Commands::Profiles => cmd_profiles(config_path, &formatter),
    }
}

/// Compute the planned list.
fn cmd_plan(
    config_path: Option<&Path>,
    prior_path: &Path,
    desired_path: &Path,
    profile_name: Option<&str>,
    detailed: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let profile = load_profile(config_path, profile_name)?;
    let req = ListRequest::new(read_collection(desired_path)?, read_prior(prior_path)?);

    let modifier = KeyedListSortModifier::new(profile);
    info!("Planning with: {}", modifier.description());

    let mut resp = ListResponse::for_request(&req);
    let decision = modifier.modify(&req, &mut resp);

    for diagnostic in &resp.diagnostics {
        warn!("{diagnostic}");
    }

    let diff = detailed.then(|| {
        DiffEngine::new(modifier.profile()).compute_diff(&req.state_value, &resp.plan_value)
    });

    emit(&formatter.format_plan(modifier.profile(), decision, &resp, diff.as_ref()))
}

/// Show the keyed diff.
fn cmd_diff(
    config_path: Option<&Path>,
    prior_path: &Path,
    desired_path: &Path,
    profile_name: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let profile = load_profile(config_path, profile_name)?;
    let req = ListRequest::new(read_collection(desired_path)?, read_prior(prior_path)?);

    let mut resp = ListResponse::for_request(&req);
    KeyedListSortModifier::new(profile.clone()).plan_modify_list(&req, &mut resp);

    let diff = DiffEngine::new(&profile).compute_diff(&req.state_value, &resp.plan_value);
    info!(
        creates = diff.creates,
        updates = diff.updates,
        deletes = diff.deletes,
        "Keyed diff computed"
    );

    emit(&formatter.format_diff(&diff))
}

/// Print a collection in canonical order.
fn cmd_sort(
    config_path: Option<&Path>,
    input_path: &Path,
    profile_name: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let profile = load_profile(config_path, profile_name)?;
    let value = read_collection(input_path)?;

    let sorted = match value.as_known() {
        Some(collection) => {
            let extractor = KeyExtractor::new(&profile.identity_field);
            let records = canonical_order(&extractor, collection.records());
            ListValue::Known(Collection::new(collection.element_type().clone(), records)?)
        }
        None => value,
    };

    emit(&formatter.format_collection(&profile, &sorted))
}

/// Validate configuration.
fn cmd_validate(
    config_path: Option<&Path>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = read_config(config_path)?;
    info!("Validating {} profile(s)", config.profiles.len());

    let validator = ConfigValidator::new();
    let result = validator.check(&config);
    emit(&formatter.format_validation(&result, show_warnings))?;

    // Surface the first error as the exit status.
    validator.validate(&config).map(|_| ())
}

/// List the available profiles.
fn cmd_profiles(config_path: Option<&Path>, formatter: &OutputFormatter) -> Result<()> {
    let config = load_config(config_path)?;
    emit(&formatter.format_profiles(&config))
}

/// Loads and validates the configuration.
fn load_config(config_path: Option<&Path>) -> Result<KeysetConfig> {
    let config = read_config(config_path)?;

    // Validate
    let validator = ConfigValidator::new();
    let result = validator.validate(&config)?;
    for warning in &result.warnings {
        warn!("{warning}");
    }

    Ok(config)
}

/// Reads the configuration from an explicit path, a discovered file, or the
/// built-in profiles.
fn read_config(config_path: Option<&Path>) -> Result<KeysetConfig> {
    let base = config_path
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let parser = ConfigParser::new().with_base_path(base);
    parser.load_dotenv()?;
    parser.resolve(config_path)
}

/// Resolves the requested attribute profile.
fn load_profile(config_path: Option<&Path>, name: Option<&str>) -> Result<AttributeProfile> {
    let config = load_config(config_path)?;
    let profile = config.profile(name)?.clone();
    debug!(identity = %profile.identity_field, "Using attribute profile");
    Ok(profile)
}

/// Reads a collection document from a JSON file.
fn read_collection(path: &Path) -> Result<ListValue> {
    let content = std::fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    Ok(ListValue::from_json(&json)?)
}

/// Reads the prior collection; a missing file means there is no prior.
fn read_prior(path: &Path) -> Result<ListValue> {
    if path.exists() {
        read_collection(path)
    } else {
        info!("No prior state at {}, treating as first creation", path.display());
        Ok(ListValue::Null)
    }
}

/// Writes command output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyset_reconcile::cli::OutputFormat;
    use keyset_reconcile::error::{ConfigError, KeysetError};

    const PRIOR: &str = r#"[
        {"name": "ng-1", "instance_type": "t3.large"},
        {"name": "ng-2", "instance_type": "t3.large"}
    ]"#;

    const DESIRED: &str = r#"[
        {"name": "ng-2", "instance_type": "m5.4xlarge"},
        {"name": "ng-1", "instance_type": "t3.large"}
    ]"#;

    fn workspace(config: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("keyset.yaml"), config).unwrap();
        std::fs::write(dir.path().join("prior.json"), PRIOR).unwrap();
        std::fs::write(dir.path().join("desired.json"), DESIRED).unwrap();
        dir
    }

    #[test]
    fn test_plan_rejects_profile_without_essential_fields() {
        let dir = workspace("default_profile: pools\nprofiles:\n  pools:\n    essential_fields: []\n");
        let formatter = OutputFormatter::new(OutputFormat::Json);

        let err = cmd_plan(
            Some(&dir.path().join("keyset.yaml")),
            &dir.path().join("prior.json"),
            &dir.path().join("desired.json"),
            None,
            false,
            &formatter,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            KeysetError::Config(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_load_profile_validates_config() {
        let dir = workspace("default_profile: missing\nprofiles:\n  pools:\n    essential_fields: [name]\n");
        let path = dir.path().join("keyset.yaml");

        assert!(load_profile(Some(&path), Some("pools")).is_err());
        assert!(read_config(Some(&path)).is_ok());
    }

    #[test]
    fn test_load_profile_accepts_valid_config() {
        let dir = workspace(
            "default_profile: pools\nprofiles:\n  pools:\n    essential_fields: [name, instance_type]\n",
        );

        let profile = load_profile(Some(&dir.path().join("keyset.yaml")), None).unwrap();
        assert_eq!(profile.essential_fields, vec!["name", "instance_type"]);
    }

    #[test]
    fn test_missing_prior_is_null() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_prior(&dir.path().join("absent.json")).unwrap(), ListValue::Null);
    }
}

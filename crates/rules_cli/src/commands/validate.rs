use anyhow::{Context, Result, anyhow};
use rules_core::{
    LookupGateway, MissingFieldPolicy, NoLookup, RawInput, ValidationOptions, raw_input_from_json,
};
use rules_parser::parse_file;
use rules_validator::{InMemoryGateway, ValidationSession};
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::output;

/// Session switches taken from the command line.
pub struct Flags {
    pub fail_fast: bool,
    pub allow_optional: bool,
}

pub fn execute(
    rules_path: &str,
    spec_name: &str,
    input_path: &str,
    records_path: Option<&str>,
    flags: Flags,
    format: &str,
) -> Result<()> {
    info!("Validating payload against spec '{}'", spec_name);

    let rule_set = parse_file(Path::new(rules_path))
        .with_context(|| format!("Failed to parse rule set file: {}", rules_path))?;
    let named = rule_set.get(spec_name).ok_or_else(|| {
        anyhow!(
            "Spec '{}' not found in {}. Available specs: {}",
            spec_name,
            rules_path,
            rule_set
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;

    let input = read_input(input_path)?;

    let gateway: Box<dyn LookupGateway> = match records_path {
        Some(path) => Box::new(load_records(path)?),
        None => Box::new(NoLookup),
    };

    let policy = if flags.allow_optional {
        MissingFieldPolicy::AllowOptional
    } else {
        MissingFieldPolicy::Reject
    };
    let options = ValidationOptions::new()
        .with_mode(named.mode)
        .with_fail_fast(flags.fail_fast)
        .with_missing_fields(policy);

    info!("Mode: {}", output::mode_name(named.mode));
    info!("Fail fast: {}", flags.fail_fast);

    let result = match ValidationSession::new(gateway.as_ref())
        .with_options(options)
        .validate(&named.spec, &input)
    {
        Err(err) if !err.is_user_error() => {
            return Err(err)
                .with_context(|| format!("Spec '{}' could not be evaluated", spec_name));
        }
        result => result,
    };

    output::print_validation_report(spec_name, &result, format);

    if result.is_err() {
        std::process::exit(1);
    }

    Ok(())
}

fn read_input(input_path: &str) -> Result<RawInput> {
    let content = if input_path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read payload from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read payload file: {}", input_path))?
    };

    let json: serde_json::Value =
        serde_json::from_str(&content).context("Payload is not valid JSON")?;
    raw_input_from_json(json).ok_or_else(|| anyhow!("Payload must be a JSON object"))
}

fn load_records(path: &str) -> Result<InMemoryGateway> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path))?;
    let json: serde_json::Value =
        serde_json::from_str(&content).context("Records file is not valid JSON")?;
    InMemoryGateway::from_json(json)
        .with_context(|| format!("Invalid records file: {}", path))
}

use colored::*;
use rules_core::{EvaluationMode, RuleSet};
use rules_validator::{ValidatedData, ValidationError};
use serde_json::json;

pub fn mode_name(mode: EvaluationMode) -> &'static str {
    match mode {
        EvaluationMode::Chain => "chain",
        EvaluationMode::StrictAuth => "strict_auth",
    }
}

pub fn print_rule_set_json(rule_set: &RuleSet) {
    let specs: Vec<_> = rule_set
        .iter()
        .map(|named| {
            json!({
                "name": named.name,
                "mode": mode_name(named.mode),
                "description": named.description,
                "fields": named.spec.iter().map(|field| json!({
                    "name": field.name,
                    "rules": field.chain(),
                    "required": field.is_required(),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    let output = json!({
        "valid": true,
        "specs": specs,
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

pub fn print_validation_report(
    spec: &str,
    result: &Result<ValidatedData, ValidationError>,
    format: &str,
) {
    match format {
        "json" => print_json_report(spec, result),
        _ => print_text_report(spec, result),
    }
}

/// Field to message pairs of a user-facing failure.
fn failures(err: &ValidationError) -> Vec<(String, String)> {
    match err {
        ValidationError::Rules(errors) => errors
            .iter()
            .map(|(field, message)| (field.to_string(), message.to_string()))
            .collect(),
        ValidationError::MissingField(field) => vec![(field.clone(), err.to_string())],
        other => vec![(String::new(), other.to_string())],
    }
}

fn print_text_report(spec: &str, result: &Result<ValidatedData, ValidationError>) {
    println!("\n{}", "═".repeat(60));
    println!("{}", format!("  VALIDATION REPORT: {}", spec).bold());
    println!("{}", "═".repeat(60));

    match result {
        Ok(data) => {
            println!(
                "\n{} {}",
                "✓".green().bold(),
                "Validation PASSED".green().bold()
            );

            println!("\n{}", "Validated fields:".bold());
            for (field, value) in data.iter() {
                let shown = if value.is_empty() {
                    "(empty)".dimmed().to_string()
                } else {
                    value.to_json().to_string()
                };
                println!("  {:<20} {}", field, shown);
            }
        }
        Err(err) => {
            println!(
                "\n{} {}",
                "✗".red().bold(),
                "Validation FAILED".red().bold()
            );

            let failures = failures(err);
            println!("\n{}", "Errors:".red().bold());
            for (i, (field, message)) in failures.iter().enumerate() {
                if field.is_empty() {
                    println!("  {}. {}", i + 1, message.red());
                } else {
                    println!("  {}. {}: {}", i + 1, field.bold(), message.red());
                }
            }

            println!("\n{}", "Summary:".bold());
            println!("  Total errors:   {}", failures.len());
        }
    }

    println!("{}", "═".repeat(60));
}

fn print_json_report(spec: &str, result: &Result<ValidatedData, ValidationError>) {
    let output = match result {
        Ok(data) => json!({
            "spec": spec,
            "passed": true,
            "data": data.to_json(),
            "errors": {},
        }),
        Err(err) => {
            let errors: serde_json::Map<String, serde_json::Value> = failures(err)
                .into_iter()
                .map(|(field, message)| (field, serde_json::Value::String(message)))
                .collect();
            json!({
                "spec": spec,
                "passed": false,
                "data": null,
                "errors": errors,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

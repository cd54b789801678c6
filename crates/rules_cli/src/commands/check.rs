use anyhow::{Context, Result};
use rules_parser::parse_file;
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(rules_path: &str, format: &str) -> Result<()> {
    info!("Checking rule set: {}", rules_path);

    // Every chain is parsed while loading, so a loaded set is a valid one
    let path = Path::new(rules_path);
    let rule_set = parse_file(path)
        .with_context(|| format!("Failed to parse rule set file: {}", rules_path))?;

    if format == "json" {
        output::print_rule_set_json(&rule_set);
        return Ok(());
    }

    output::print_info(&format!(
        "Rule set loaded: {} ({} specs)",
        rules_path,
        rule_set.len()
    ));
    output::print_success("All rule chains are valid");

    for named in rule_set.iter() {
        println!("\nSpec: {}", named.name);
        println!("  Mode:        {}", output::mode_name(named.mode));
        println!(
            "  Description: {}",
            named.description.as_deref().unwrap_or("N/A")
        );
        println!("  Fields:      {}", named.spec.len());
        for field in &named.spec {
            let marker = if field.is_required() { "*" } else { " " };
            println!("    {} {:<20} {}", marker, field.name, field.chain());
        }
    }

    Ok(())
}

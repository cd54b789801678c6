mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rulecheck")]
#[command(version, about = "Field rules engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every rule chain in a rule set file is valid
    Check {
        /// Path to the rule set file (YAML or TOML)
        rules: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate a JSON payload against one spec of a rule set
    Validate {
        /// Path to the rule set file (YAML or TOML)
        rules: String,

        /// Name of the spec to validate against
        #[arg(short, long)]
        spec: String,

        /// Path to the JSON payload, `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// JSON file with the tables used by `exists` rules
        #[arg(short, long)]
        records: Option<String>,

        /// Stop at the first failing field
        #[arg(long)]
        fail_fast: bool,

        /// Accept missing fields whose rules do not include `required`
        #[arg(long)]
        allow_optional: bool,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Check { rules, format } => commands::check::execute(&rules, &format),

        Commands::Validate {
            rules,
            spec,
            input,
            records,
            fail_fast,
            allow_optional,
            format,
        } => commands::validate::execute(
            &rules,
            &spec,
            &input,
            records.as_deref(),
            commands::validate::Flags {
                fail_fast,
                allow_optional,
            },
            &format,
        ),
    }
}

//! schemajson: validate, normalize and fingerprint canonical JSON schema documents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schemajson_convert::{ExtensionFailurePolicy, SchemaConverter};

mod commands;
mod config;
mod logging;

use config::Config;

#[derive(Parser)]
#[command(name = "schemajson")]
#[command(about = "Schema ↔ canonical JSON interchange tool", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum field nesting depth (overrides config)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Fail when a registered extension cannot be deserialized
    #[arg(long, global = true)]
    strict_extensions: bool,

    /// Register an extension name as an opaque pass-through type (repeatable)
    #[arg(long = "extension", global = true, value_name = "NAME")]
    extensions: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a document converts to a schema
    Validate {
        /// Input file; stdin when omitted or `-`
        input: Option<PathBuf>,
    },

    /// Re-emit a document in canonical form
    Normalize {
        input: Option<PathBuf>,

        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// SHA-256 of the canonical form
    Fingerprint { input: Option<PathBuf> },

    /// Print the schema as an indented field tree
    Inspect { input: Option<PathBuf> },
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(depth) = self.max_depth {
            config.conversion.max_depth = depth;
        }
        if self.strict_extensions {
            config.conversion.extension_failure = ExtensionFailurePolicy::Strict;
        }
        for name in &self.extensions {
            if !config.extensions.contains(name) {
                config.extensions.push(name.clone());
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env(),
    };
    cli.apply(&mut config);

    logging::init(&config.logging);
    tracing::debug!(?config, "configuration resolved");

    let registry = config.registry()?;
    let converter = SchemaConverter::with_config(&registry, config.conversion);

    let output = match &cli.command {
        Commands::Validate { input } => {
            commands::validate(&converter, &commands::read_document(input.as_deref())?)?
        }
        Commands::Normalize { input, compact } => {
            commands::normalize(&converter, &commands::read_document(input.as_deref())?, *compact)?
        }
        Commands::Fingerprint { input } => {
            commands::fingerprint(&converter, &commands::read_document(input.as_deref())?)?
        }
        Commands::Inspect { input } => commands::inspect(&converter, &commands::read_document(input.as_deref())?)?,
    };

    // inspect output already ends with a newline
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "schemajson",
            "--max-depth",
            "3",
            "--strict-extensions",
            "--extension",
            "uuid",
            "validate",
            "schema.json",
        ]);
        let mut config = Config {
            extensions: vec!["uuid".to_string(), "geo".to_string()],
            ..Config::default()
        };
        cli.apply(&mut config);

        assert_eq!(config.conversion.max_depth, 3);
        assert_eq!(config.conversion.extension_failure, ExtensionFailurePolicy::Strict);
        assert_eq!(config.extensions, ["uuid", "geo"]);
        assert!(matches!(cli.command, Commands::Validate { input: Some(ref p) } if p == &PathBuf::from("schema.json")));
    }
}

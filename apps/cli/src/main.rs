use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use lattice_models::{ModelConfig, PathTracker, Resource, Visitable, Visitor};
use lattice_validator::{Validator, ValidatorConfig};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lattice",
    about = "Check, walk and format SpecimenDefinition and TestScript resources",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// Log more (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a resource and print an OperationOutcome. Exits with 1 on errors.
    Check {
        /// Path to a resource JSON file (or "-" for stdin).
        input: PathBuf,
        /// Validator configuration (YAML). Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON output.
        #[arg(long, action = ArgAction::SetTrue)]
        pretty: bool,
    },

    /// Print the location of every element, with primitive values.
    Walk {
        /// Path to a resource JSON file (or "-" for stdin).
        input: PathBuf,
        /// Skip per-element validation while parsing.
        #[arg(long, action = ArgAction::SetTrue)]
        no_validation: bool,
    },

    /// Parse, rebuild and print a resource in canonical form.
    Fmt {
        /// Path to a resource JSON file (or "-" for stdin).
        input: PathBuf,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON output.
        #[arg(long, action = ArgAction::SetTrue)]
        pretty: bool,
        /// Skip per-element validation while parsing and rebuilding.
        #[arg(long, action = ArgAction::SetTrue)]
        no_validation: bool,
    },

    /// Print CLI version.
    Version,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Check {
            input,
            config,
            output,
            pretty,
        } => {
            return run_check(&input, config.as_deref(), output.as_deref(), pretty);
        }
        Commands::Walk {
            input,
            no_validation,
        } => {
            install_model_config(no_validation);
            run_walk(&input)?;
        }
        Commands::Fmt {
            input,
            output,
            pretty,
            no_validation,
        } => {
            install_model_config(no_validation);
            run_fmt(&input, output.as_deref(), pretty)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn install_model_config(no_validation: bool) {
    ModelConfig {
        validation: !no_validation,
        ..ModelConfig::default()
    }
    .install();
}

fn run_check(
    input: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    pretty: bool,
) -> Result<ExitCode> {
    let config = match config_path {
        Some(path) => {
            let yaml = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
            ValidatorConfig::from_yaml(&yaml)
                .with_context(|| format!("Invalid validator config in '{}'", path.display()))?
        }
        None => ValidatorConfig::default(),
    };
    config.model.install();

    let validator = Validator::from_config(&config).context("Failed to compile validator config")?;
    let value = read_json(input)?;
    let outcome = validator.validate_json(&value);

    tracing::info!(
        errors = outcome.error_count(),
        warnings = outcome.warning_count(),
        "check finished"
    );
    write_json_output(&outcome.to_operation_outcome(), output, pretty)?;

    Ok(if outcome.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_walk(input: &Path) -> Result<()> {
    let resource = parse_resource(input)?;
    let mut printer = PathPrinter::default();
    resource.accept(resource.resource_type(), None, &mut printer);
    for line in printer.lines {
        println!("{line}");
    }
    Ok(())
}

fn run_fmt(input: &Path, output: Option<&Path>, pretty: bool) -> Result<()> {
    let resource = parse_resource(input)?;
    let rebuilt: Resource = match resource {
        Resource::SpecimenDefinition(r) => r.to_builder().build()?.into(),
        Resource::TestScript(r) => r.to_builder().build()?.into(),
    };
    let value = rebuilt
        .to_value()
        .context("Failed to serialize rebuilt resource")?;
    write_json_output(&value, output, pretty)
}

fn parse_resource(input: &Path) -> Result<Resource> {
    let value = read_json(input)?;
    Resource::from_value(value).with_context(|| format!("Invalid resource in {}", describe(input)))
}

fn read_json(path: &Path) -> Result<Value> {
    if path.to_string_lossy() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read JSON resource from stdin")?;
        return serde_json::from_str(&buf).context("stdin resource is not valid JSON");
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read resource file '{}'", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Resource file is not valid JSON: {}", path.display()))
}

fn describe(path: &Path) -> String {
    if path.to_string_lossy() == "-" {
        "stdin".to_string()
    } else {
        format!("'{}'", path.display())
    }
}

fn write_json_output(value: &Value, output: Option<&Path>, pretty: bool) -> Result<()> {
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    if let Some(output_path) = output {
        fs::write(output_path, content)
            .with_context(|| format!("Failed to write to {:?}", output_path))?;
        eprintln!("Wrote output to {:?}", output_path);
    } else {
        println!("{content}");
    }

    Ok(())
}

/// One line per element: `path (Type)` for composites, `path = value` for
/// primitives.
#[derive(Default)]
struct PathPrinter {
    path: PathTracker,
    lines: Vec<String>,
}

impl Visitor for PathPrinter {
    fn visit_start(&mut self, name: &str, index: Option<usize>, element: &dyn Visitable) {
        self.path.push(name, index);
        let line = match element.as_primitive() {
            Some(value) => format!("{} = {}", self.path.path(), value),
            None => format!("{} ({})", self.path.path(), element.type_name()),
        };
        self.lines.push(line);
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _element: &dyn Visitable) {
        self.path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_models::prelude::*;

    #[test]
    fn test_path_printer() {
        let script = TestScript::builder()
            .url("http://example.org/ts")
            .name("Printer")
            .status(PublicationStatus::Active)
            .build()
            .unwrap();
        let mut printer = PathPrinter::default();
        script.accept("TestScript", None, &mut printer);

        assert_eq!(
            printer.lines,
            vec![
                "TestScript (TestScript)",
                "TestScript.url = \"http://example.org/ts\"",
                "TestScript.name = \"Printer\"",
                "TestScript.status = active",
            ]
        );
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["lattice", "-v", "check", "-", "--pretty"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Commands::Check { pretty: true, .. }));
    }
}

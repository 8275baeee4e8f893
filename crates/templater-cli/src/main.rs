//! Templater CLI
//!
//! Command-line interface for annotating model configuration files and run
//! commands with named parameters.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use templater_core::Config;

mod args;
mod commands;
mod output;
mod prompt;

use args::{parse_interval, AnnotationArgs, DocumentArgs};
use output::{Output, OutputFormat};
use templater_core::Interval;

#[derive(Parser)]
#[command(name = "templater")]
#[command(about = "Mark up model configs and run commands as parameter templates")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a document with its parameters marked
    Show {
        #[command(flatten)]
        document: DocumentArgs,
    },
    /// List annotated documents
    #[command(alias = "ls")]
    List {
        /// Only list directives
        #[arg(long, conflicts_with = "configs")]
        directives: bool,
        /// Only list config files
        #[arg(long)]
        configs: bool,
    },
    /// Mark a span as a parameter
    Add {
        #[command(flatten)]
        document: DocumentArgs,
        /// Character range, e.g. 6..9
        #[arg(value_parser = parse_interval)]
        range: Interval,
        #[command(flatten)]
        annotation: AnnotationArgs,
    },
    /// Change the annotation of a parameter
    Edit {
        #[command(flatten)]
        document: DocumentArgs,
        /// Character range of the parameter
        #[arg(value_parser = parse_interval)]
        range: Interval,
        #[command(flatten)]
        annotation: AnnotationArgs,
    },
    /// Move a parameter to a different span
    #[command(alias = "mv")]
    Move {
        #[command(flatten)]
        document: DocumentArgs,
        /// Current character range of the parameter
        #[arg(value_parser = parse_interval)]
        from: Interval,
        /// New character range
        #[arg(value_parser = parse_interval)]
        to: Interval,
        #[command(flatten)]
        annotation: AnnotationArgs,
    },
    /// Delete a parameter
    #[command(alias = "rm")]
    Delete {
        #[command(flatten)]
        document: DocumentArgs,
        /// Character range of the parameter
        #[arg(value_parser = parse_interval)]
        range: Interval,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the document with parameters replaced by placeholders
    Render {
        #[command(flatten)]
        document: DocumentArgs,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_level, debounce_ms)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let result = run(cli.command, &config, config_path, &output);
    if let Some(hint) = result.as_ref().err().and_then(commands::storage_hint) {
        output.hint(&hint);
    }
    result
}

fn run(
    command: Commands,
    config: &Config,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Commands::Show { document } => commands::document::show(config, &document, output),
        Commands::List {
            directives,
            configs,
        } => commands::document::list(config, directives, configs, output),
        Commands::Add {
            document,
            range,
            annotation,
        } => commands::annotate::add(config, &document, range, annotation, output),
        Commands::Edit {
            document,
            range,
            annotation,
        } => commands::annotate::edit(config, &document, range, annotation, output),
        Commands::Move {
            document,
            from,
            to,
            annotation,
        } => commands::annotate::move_parameter(config, &document, from, to, annotation, output),
        Commands::Delete {
            document,
            range,
            yes,
        } => commands::annotate::delete(config, &document, range, yes, output),
        Commands::Render { document } => commands::document::render(config, &document, output),
        Commands::Config { command } => handle_config_command(command, config_path, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize stderr logging
///
/// The configured log level wins over RUST_LOG; with neither set only
/// warnings are shown.
fn init_logging(config: &Config) {
    let env_filter = match config.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
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
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "templater",
            "add",
            "--file",
            "config.yaml",
            "6..9",
            "--name",
            "rate",
            "--type",
            "float",
            "--min",
            "-1",
        ])
        .unwrap();

        match cli.command {
            Commands::Add {
                document,
                range,
                annotation,
            } => {
                assert_eq!(document.file, Some(PathBuf::from("config.yaml")));
                assert_eq!(range, Interval::new(6, 9));
                assert_eq!(annotation.name.as_deref(), Some("rate"));
                assert_eq!(annotation.min, Some(-1.0));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_name_and_display_name_conflict() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["templater", "add", "--file", "config.yaml", "6..9"];
            argv.extend_from_slice(extra);
            Cli::try_parse_from(argv)
        };

        assert!(parse(&["--name", "rate", "--display-name", "Growth Rate"]).is_err());
        match parse(&["--display-name", "Growth Rate"]).unwrap().command {
            Commands::Add { annotation, .. } => {
                assert_eq!(annotation.display_name.as_deref(), Some("Growth Rate"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_file_and_directive_conflict() {
        let result = Cli::try_parse_from([
            "templater",
            "show",
            "--file",
            "config.yaml",
            "--directive",
            "run.sh",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_document_required() {
        assert!(Cli::try_parse_from(["templater", "render"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "templater",
            "list",
            "--json",
            "--config",
            "/tmp/templater.toml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/templater.toml")));
    }
}

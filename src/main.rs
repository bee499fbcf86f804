// SPDX-License-Identifier: MIT

//! Daylog: Local AI Daily Notes & Report Generator
//!
//! Turns brief daily notes and images into polished Markdown and PDF
//! reports using a local language model, with deterministic fallbacks
//! when no model is available.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use daylog::config::AppConfig;
use daylog::gateway::Gateway;
use daylog::pipeline;
use daylog::report::ReportGenerator;
use daylog::runtime::RuntimeClient;
use daylog::web;
use daylog::{DaylogError, Result};

/// Daylog CLI - Local AI Daily Notes & Report Generator
#[derive(Parser, Debug)]
#[command(name = "daylog")]
#[command(version = "1.0.0")]
#[command(about = "Local AI-powered daily notes and report generator", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web UI (default)
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a report from notes without the web UI
    Generate {
        /// Notes text (inline)
        #[arg(long, conflicts_with = "notes_file")]
        notes: Option<String>,

        /// Read notes from a file
        #[arg(long)]
        notes_file: Option<PathBuf>,

        /// Image to include (repeatable)
        #[arg(short, long)]
        image: Vec<PathBuf>,

        /// Report name (default: daily-log-<date>)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show model runtime and artifact status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if !cli.quiet {
        info!("Daylog v1.0.0 - Local AI Daily Notes & Report Generator");
    }

    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Serve { port }) => run_serve(config, port).await,
        Some(Commands::Generate { notes, notes_file, image, name }) => {
            run_generate(config, notes, notes_file, image, name).await
        }
        Some(Commands::Status) => run_status(config).await,
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config).await,
        None => run_serve(config, None).await,
    }
}

/// Start the web UI
async fn run_serve(mut config: AppConfig, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.web.port = port;
    }

    let gateway = Gateway::initialize(&config).await;
    if !gateway.is_model_loaded() {
        warn!("Running in fallback mode; generated text will use templates");
    }

    let reporter = ReportGenerator::new(
        Path::new(&config.reports_dir),
        Path::new(&config.fonts_dir),
    )?;

    web::start_server(config, gateway, reporter).await
}

/// Run the pipeline once from the command line
async fn run_generate(
    config: AppConfig,
    notes: Option<String>,
    notes_file: Option<PathBuf>,
    images: Vec<PathBuf>,
    name: Option<String>,
) -> Result<()> {
    let notes = match (notes, notes_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)?,
        (None, None) => {
            return Err(DaylogError::Input(
                "Provide notes with --notes or --notes-file".to_string(),
            ))
        }
    };

    let name = name.unwrap_or_else(|| {
        format!("daily-log-{}", chrono::Local::now().format("%Y-%m-%d"))
    });

    let gateway = Gateway::initialize(&config).await;
    let reporter = ReportGenerator::new(
        Path::new(&config.reports_dir),
        Path::new(&config.fonts_dir),
    )?;

    let paths = pipeline::run(&gateway, &reporter, &notes, &images, &name).await?;

    println!("Markdown report: {}", paths.markdown.display());
    match paths.pdf {
        Some(pdf) => println!("PDF report: {}", pdf.display()),
        None => println!("PDF report: skipped (no font family available)"),
    }

    Ok(())
}

/// Show runtime, artifact, and emitter status
async fn run_status(config: AppConfig) -> Result<()> {
    println!("Daylog v1.0.0 Status");
    println!("====================");

    // Check the model runtime
    match RuntimeClient::new(&config.runtime.url, config.runtime.timeout_secs) {
        Ok(client) => match client.health_check().await {
            Ok(()) => {
                println!("Runtime: Running at {}", client.base_url());
                match client.list_models().await {
                    Ok(models) if models.is_empty() => println!("  No models served"),
                    Ok(models) => {
                        println!("  Served models:");
                        for m in models {
                            println!("    {}", m);
                        }
                    }
                    Err(e) => println!("  Error listing models: {}", e),
                }
            }
            Err(e) => println!("Runtime: Error - {}", e),
        },
        Err(e) => println!("Runtime: Error - {}", e),
    }

    // Check for a local artifact
    match daylog::model::find_artifact(
        Path::new(&config.models_dir),
        config.model_name_hint.as_deref(),
    ) {
        Some(path) => println!("\nModel artifact: {}", path.display()),
        None => println!("\nModel artifact: none found in {}", config.models_dir),
    }

    // Check PDF support
    let reporter = ReportGenerator::new(
        Path::new(&config.reports_dir),
        Path::new(&config.fonts_dir),
    )?;
    let pdf = if reporter.pdf_supported() {
        "available"
    } else {
        "unavailable (no font family)"
    };
    println!("PDF output: {}", pdf);

    println!("\nConfiguration:");
    println!("  Models dir: {}", config.models_dir);
    println!("  Reports dir: {}", config.reports_dir);
    println!("  Fonts dir: {}", config.fonts_dir);
    println!("  Web UI: {}:{}", config.web.host, config.web.port);

    Ok(())
}

/// Run config commands
async fn run_config_command(
    config: AppConfig,
    action: ConfigCommands,
    config_path: &Path,
) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            println!("Configuration at {:?} is valid", config_path);
            println!("  Models dir: {}", config.models_dir);
            println!("  Reports dir: {}", config.reports_dir);
            println!("  Runtime: {}", config.runtime.url);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["daylog"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_generate_command() {
        let cli = Cli::try_parse_from([
            "daylog", "generate", "--notes", "Fixed the bug", "--image", "/tmp/a.png",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Generate { notes, image, .. }) => {
                assert_eq!(notes.as_deref(), Some("Fixed the bug"));
                assert_eq!(image, vec![PathBuf::from("/tmp/a.png")]);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_rejects_conflicting_notes_sources() {
        let result = Cli::try_parse_from([
            "daylog", "generate", "--notes", "x", "--notes-file", "/tmp/notes.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_serve_port_override() {
        let cli = Cli::try_parse_from(["daylog", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Some(Commands::Serve { port }) => assert_eq!(port, Some(9000)),
            _ => panic!("Expected Serve command"),
        }
    }
}

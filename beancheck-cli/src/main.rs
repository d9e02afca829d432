//! # beancheck
//!
//! Generate JUnit contract tests (toString, equals, hashCode) for
//! Lombok-style data classes described in manifests.
//!
//! ## Usage
//!
//! ```bash
//! # Generate suites from manifests below the current directory
//! beancheck generate
//!
//! # Write suites to a specific source root
//! beancheck generate --output ./src/test/java
//!
//! # Watch mode for development
//! beancheck generate --watch
//!
//! # Dry run to preview changes
//! beancheck generate --dry-run
//!
//! # Initialize configuration
//! beancheck init
//!
//! # Check that generated suites are up-to-date
//! beancheck validate
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beancheck_cli::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::{CliError, SchemaError},
    generator::TestGenerator,
    watcher::FileWatcher,
    writer::{FileWriter, WriteResult},
};

#[derive(Parser)]
#[command(name = "beancheck")]
#[command(author, version, about = "Generate contract tests for Lombok-style data classes", long_about = None)]
struct Cli {
    /// Log engine decisions (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate test suites from type manifests
    Generate {
        /// Input directory containing manifests
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Root directory for generated test sources
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Watch for manifest changes and regenerate
        #[arg(short, long)]
        watch: bool,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only read manifests whose path matches this glob
        #[arg(long)]
        filter: Option<String>,

        /// Instant date/time samples are offset from ("now" or RFC 3339)
        #[arg(long)]
        anchor: Option<String>,

        /// Suffix of generated suite class names
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Initialize a new beancheck configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate that generated suites are up-to-date
    Validate {
        /// Input directory containing manifests
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Root directory of generated test sources
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Install the log subscriber; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            input,
            output,
            watch,
            dry_run,
            config,
            filter,
            anchor,
            suffix,
        } => {
            let args = CliArgs {
                output,
                suite_suffix: suffix,
                anchor,
                filter,
            };
            cmd_generate(&input, &args, watch, dry_run, config.as_deref())
        }

        Commands::Init { output, force } => cmd_init(output, force),

        Commands::Validate {
            input,
            output,
            config,
        } => cmd_validate(&input, output, config.as_deref()),
    }
}

fn load_config(config_path: Option<&Path>, args: &CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::load(config_path)?;
    Ok(ConfigManager::merge_cli_args(config, args))
}

/// Generate command implementation.
fn cmd_generate(
    input: &Path,
    args: &CliArgs,
    watch: bool,
    dry_run: bool,
    config_path: Option<&Path>,
) -> Result<(), CliError> {
    let config = load_config(config_path, args)?;

    if watch {
        run_watch_mode(input, args, config, dry_run, config_path)
    } else {
        run_generate(input, config, dry_run)
    }
}

/// Run one generation pass.
fn run_generate(input: &Path, config: Config, dry_run: bool) -> Result<(), CliError> {
    println!("{}", "Scanning for manifests...".cyan());

    let generator = TestGenerator::new(config);
    let loaded = generator.load(input)?;

    if loaded.manifests == 0 {
        println!("{}", "No manifests found.".yellow());
        return Ok(());
    }
    println!(
        "  Found {} manifest(s)",
        loaded.manifests.to_string().green()
    );

    if !loaded.errors.is_empty() {
        println!(
            "{} {} manifest error(s):",
            "Warning:".yellow(),
            loaded.errors.len()
        );
        for error in &loaded.errors {
            println!("  {}", format_schema_error(error));
        }
    }

    if loaded.catalog.is_empty() {
        println!("{}", "No target types found.".yellow());
        return Ok(());
    }
    println!(
        "  Found {} target type(s)",
        loaded.catalog.len().to_string().green()
    );

    println!("{}", "Generating test suites...".cyan());
    let report = generator.generate(&loaded.catalog, dry_run)?;

    for result in &report.results {
        match result {
            WriteResult::Written { path, bytes } => {
                println!(
                    "{} Written {} bytes to {}",
                    "✓".green(),
                    bytes,
                    path.display()
                );
            }
            WriteResult::Unchanged { path } => {
                println!("{} Up to date: {}", "✓".green(), path.display());
            }
            WriteResult::DryRun { content, path } => {
                println!(
                    "{} Would write to {}:",
                    "[dry-run]".yellow(),
                    path.display()
                );
                println!("{}", "─".repeat(60).dimmed());
                println!("{}", content);
                println!("{}", "─".repeat(60).dimmed());
            }
        }
    }

    println!(
        "  Generated {} suite(s), {} test(s), {} helper(s)",
        report.summary.suites.to_string().green(),
        report.summary.tests,
        report.summary.helpers
    );

    Ok(())
}

/// Run in watch mode.
fn run_watch_mode(
    input: &Path,
    args: &CliArgs,
    config: Config,
    dry_run: bool,
    config_path: Option<&Path>,
) -> Result<(), CliError> {
    println!("{}", "Starting watch mode...".cyan());
    println!("  Watching: {}", input.display());
    println!("  Press Ctrl+C to stop\n");

    if let Err(e) = run_generate(input, config, dry_run) {
        print_error(&e);
    }

    let mut watcher = FileWatcher::new(input);
    if let Some(path) = config_path {
        watcher = watcher.with_file(path);
    }
    let (_debouncer, rx) = watcher.watch()?;

    println!("\n{}", "Watching for changes...".cyan());

    while let Ok(event) = rx.recv() {
        if event.is_error() {
            println!(
                "{} {}",
                "Watch error:".red(),
                event.error_message().unwrap_or("Unknown error")
            );
            continue;
        }

        if let Some(path) = event.path() {
            println!("\n{} {}", "File changed:".cyan(), path.display());
        }

        // The config may be the file that changed.
        let outcome =
            load_config(config_path, args).and_then(|config| run_generate(input, config, dry_run));
        if let Err(e) = outcome {
            println!("{} {}", "Generation error:".red(), e);
        }

        println!("\n{}", "Watching for changes...".cyan());
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "Configuration file already exists".to_string(),
        ));
    }

    FileWriter::new(false).write(&output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Validate command implementation.
fn cmd_validate(
    input: &Path,
    output: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<(), CliError> {
    println!("{}", "Validating test suites...".cyan());

    let config = load_config(
        config_path,
        &CliArgs {
            output,
            ..Default::default()
        },
    )?;

    let generator = TestGenerator::new(config);
    let loaded = generator.load(input)?;
    if let Some(error) = SchemaError::collect(loaded.errors) {
        return Err(error.into());
    }

    let report = generator.validate(&loaded.catalog)?;

    if report.is_up_to_date() {
        println!(
            "{} {} suite(s) are up-to-date",
            "✓".green(),
            report.current.len()
        );
        return Ok(());
    }

    for path in &report.missing {
        println!("  {} missing: {}", "✗".red(), path.display());
    }
    for path in &report.stale {
        println!("  {} out of date: {}", "✗".red(), path.display());
    }
    println!("  Run 'beancheck generate' to update");

    Err(CliError::Validation(format!(
        "{} suite(s) missing, {} out of date",
        report.missing.len(),
        report.stale.len()
    )))
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}

/// Format a manifest error for display.
fn format_schema_error(error: &SchemaError) -> String {
    match error {
        SchemaError::Syntax { file, message } | SchemaError::Declaration { file, message } => {
            format!("{}: {}", file.display(), message)
        }
        SchemaError::Unreadable { file, source } => format!("{}: {}", file.display(), source),
        SchemaError::Catalog(e) => e.to_string(),
        SchemaError::Multiple(errors) => errors
            .iter()
            .map(format_schema_error)
            .collect::<Vec<_>>()
            .join("\n  "),
    }
}

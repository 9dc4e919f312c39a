//! Command-line interface for the phpuml utility
//!
//! Provides a CLI to turn PHP source files into nomnoml class diagrams.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::colorizer::colorize_output;
use phpuml::core::logging::init_logging;
use phpuml::plugins::Orchestrator;
use phpuml::{DiagramError, GrammarEngine};

/// phpuml - Convert PHP classes and interfaces to nomnoml diagrams
#[derive(Parser)]
#[command(name = "phpuml")]
#[command(about = "Turn PHP class and interface files into nomnoml class diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level; overrides PHPUML_LOG_LEVEL and RUST_LOG
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Set log format; overrides PHPUML_LOG_FORMAT
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert PHP files to a nomnoml diagram
    Convert {
        /// Input PHP file, repeatable (use - or nothing for stdin)
        #[arg(short, long)]
        input: Vec<PathBuf>,

        /// Output file for the diagram (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a JSON object `{"uml": ...}` instead of plain text
        #[arg(long)]
        json: bool,

        /// When to use colors in output
        #[arg(
            long,
            value_enum,
            default_value_t = ColorChoice::Auto
        )]
        color: ColorChoice,
    },

    /// Check that PHP files parse
    Validate {
        /// Input PHP files
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,
    },

    /// Print the extracted class model as JSON
    Inspect {
        /// Input PHP files
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,
    },
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// A source read from disk or stdin
pub struct SourceFile {
    pub label: String,
    pub content: String,
}

/// Main CLI application
pub struct PhpUmlApp {
    orchestrator: Orchestrator,
}

impl PhpUmlApp {
    pub fn new() -> Self {
        Self {
            orchestrator: Orchestrator::new(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        let level = cli.log_level.map(|l| l.as_str());
        let format = cli.log_format.map(|f| f.as_str());
        if let Err(e) = init_logging(level, format) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("phpuml v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Convert {
                input,
                output,
                json,
                color,
            } => self.convert_command(input, output, json, color, cli.verbose),
            Commands::Validate { input } => self.validate_command(input, cli.verbose),
            Commands::Inspect { input } => self.inspect_command(input, cli.verbose),
        }
    }

    /// Handle the convert command
    fn convert_command(
        &self,
        input: Vec<PathBuf>,
        output: Option<PathBuf>,
        json: bool,
        color: ColorChoice,
        verbose: bool,
    ) -> Result<()> {
        let sources = self.read_inputs(&input)?;

        if verbose {
            let bytes: usize = sources.iter().map(|s| s.content.len()).sum();
            eprintln!("Read {} bytes from {} source(s)", bytes, sources.len());
        }

        let diagram = self.convert_sources(&sources, json)?;

        let final_output = if !json && self.should_colorize(&output, color) {
            colorize_output(&diagram)
        } else {
            diagram
        };
        self.write_output(output, &final_output)
    }

    /// Render sources to nomnoml text, or to the JSON response shape
    pub fn convert_sources(&self, sources: &[SourceFile], json: bool) -> Result<String> {
        let contents: Vec<&str> = sources.iter().map(|s| s.content.as_str()).collect();

        match self.orchestrator.run_with_report(&contents) {
            Ok(report) => {
                for failure in &report.failures {
                    let label = sources
                        .get(failure.index)
                        .map(|s| s.label.as_str())
                        .unwrap_or("<unknown>");
                    warn!(file = label, error = %failure.error, "Skipped file");
                    eprintln!("Warning: skipped {}: {}", label, failure.error);
                }
                debug!(entities = report.entity_count, "Converted sources");

                if json {
                    Ok(serde_json::json!({ "uml": report.uml }).to_string())
                } else {
                    Ok(report.uml)
                }
            }
            Err(e @ DiagramError::InputEmpty) if json => {
                Ok(serde_json::json!({ "error": e.to_string() }).to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Determine if we should colorize the output based on color choice and output destination
    fn should_colorize(&self, output: &Option<PathBuf>, color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                match output {
                    None => crossterm::tty::IsTty::is_tty(&std::io::stdout()),
                    Some(p) if is_stdio(p) => crossterm::tty::IsTty::is_tty(&std::io::stdout()),
                    Some(_) => false,
                }
            }
        }
    }

    /// Handle the validate command
    fn validate_command(&self, input: Vec<PathBuf>, verbose: bool) -> Result<()> {
        let sources = self.read_inputs(&input)?;
        let failed = self.validate_sources(&sources, verbose);

        if failed == 0 {
            Ok(())
        } else {
            Err(anyhow!(
                "{} of {} file(s) failed to parse",
                failed,
                sources.len()
            ))
        }
    }

    /// Print a verdict per source; returns the number of failures
    pub fn validate_sources(&self, sources: &[SourceFile], verbose: bool) -> usize {
        let engine = self.orchestrator.engine();
        let mut failed = 0;

        for source in sources {
            if verbose {
                eprintln!("Checking {} ({} bytes)", source.label, source.content.len());
            }
            match engine.parse(&source.content) {
                Ok(_) => println!("✓ {}", source.label),
                Err(e) => {
                    println!("✗ {}: {}", source.label, e);
                    failed += 1;
                }
            }
        }

        failed
    }

    /// Handle the inspect command
    fn inspect_command(&self, input: Vec<PathBuf>, verbose: bool) -> Result<()> {
        let sources = self.read_inputs(&input)?;
        let model = self.inspect_sources(&sources)?;

        if verbose {
            eprintln!("Extracted model from {} source(s)", sources.len());
        }

        self.write_output(None, &model)
    }

    /// The extracted registry as pretty JSON
    pub fn inspect_sources(&self, sources: &[SourceFile]) -> Result<String> {
        let contents: Vec<&str> = sources.iter().map(|s| s.content.as_str()).collect();
        let (registry, failures) = self.orchestrator.extract(&contents)?;

        for failure in &failures {
            if let Some(source) = sources.get(failure.index) {
                eprintln!("Warning: skipped {}: {}", source.label, failure.error);
            }
        }

        Ok(serde_json::to_string_pretty(&registry)?)
    }

    /// Read every input; no input means stdin
    pub fn read_inputs(&self, inputs: &[PathBuf]) -> Result<Vec<SourceFile>> {
        if inputs.is_empty() {
            return Ok(vec![self.read_input(Path::new("-"))?]);
        }
        inputs.iter().map(|path| self.read_input(path)).collect()
    }

    /// Read input from file or stdin
    ///
    /// Bytes that are not UTF-8 (legacy Latin-1 files) are replaced rather
    /// than failing the whole batch.
    pub fn read_input(&self, path: &Path) -> Result<SourceFile> {
        if is_stdio(path) {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(DiagramError::from)?;
            return Ok(SourceFile {
                label: "<stdin>".to_string(),
                content: decode(bytes, "<stdin>"),
            });
        }

        let bytes = fs::read(path)
            .map_err(DiagramError::from)
            .with_context(|| format!("Failed to read input file '{}'", path.display()))?;
        let label = path.display().to_string();
        Ok(SourceFile {
            content: decode(bytes, &label),
            label,
        })
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if !is_stdio(&path) => {
                fs::write(&path, content)
                    .map_err(DiagramError::from)
                    .with_context(|| {
                        format!("Failed to write output file '{}'", path.display())
                    })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for PhpUmlApp {
    fn default() -> Self {
        Self::new()
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn decode(bytes: Vec<u8>, label: &str) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(file = label, "Input is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

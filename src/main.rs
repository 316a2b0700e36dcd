//! Binary entry point for the paketti CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Build the package library of a solution
//! paketti build Demo.sln
//!
//! # Also write the stripped solution and show what is left of each project
//! paketti build Demo.sln --output Demo.stripped.sln --show-tree
//!
//! # Group extension methods by the non-runtime types they use
//! paketti extensions Demo.sln
//!
//! # Only check that the solution compiles
//! paketti check Demo.sln
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use paketti::cli::{load_config, run_build, run_check, run_extensions};
use paketti::config::CompilerMode;
use paketti::error::{OutputErrorCode, PakettiError};
use paketti::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Extract interwoven declarations into merge-deduplicated packages.
///
/// All output is JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "paketti", version, about = "Extract interwoven declarations into packages")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (default: paketti.toml next to the solution).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Compiler oracle override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CompilerArg {
    /// Built-in structural check.
    Structural,
    /// External command from the configuration.
    Command,
}

impl From<CompilerArg> for CompilerMode {
    fn from(arg: CompilerArg) -> Self {
        match arg {
            CompilerArg::Structural => CompilerMode::Structural,
            CompilerArg::Command => CompilerMode::Command,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Build the package library of a solution.
    ///
    /// The solution file is never modified.
    Build {
        /// Solution snapshot (`.sln`).
        solution: PathBuf,
        /// Write the stripped solution to this file.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print every stripped project to stderr.
        #[arg(long)]
        show_tree: bool,
        /// Override the configured compiler oracle.
        #[arg(long, value_enum)]
        compiler: Option<CompilerArg>,
    },
    /// Group extension methods by the non-runtime types they use.
    Extensions {
        /// Solution snapshot (`.sln`).
        solution: PathBuf,
    },
    /// Check that every project compiles before any rewrite.
    Check {
        /// Solution snapshot (`.sln`).
        solution: PathBuf,
        /// Override the configured compiler oracle.
        #[arg(long, value_enum)]
        compiler: Option<CompilerArg>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), PakettiError> {
    let global = cli.global;
    match cli.command {
        Command::Build {
            solution,
            output,
            show_tree,
            compiler,
        } => {
            let mut config = load_config(global.config.as_deref(), &solution)?;
            if let Some(mode) = compiler {
                config.compiler.mode = mode.into();
            }
            let response = run_build(&solution, &config, output.as_deref(), show_tree)?;
            emit(&response)
        }
        Command::Extensions { solution } => {
            let config = load_config(global.config.as_deref(), &solution)?;
            emit(&run_extensions(&solution, &config)?)
        }
        Command::Check { solution, compiler } => {
            let mut config = load_config(global.config.as_deref(), &solution)?;
            if let Some(mode) = compiler {
                config.compiler.mode = mode.into();
            }
            emit(&run_check(&solution, &config)?)
        }
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), PakettiError> {
    emit_response(response, &mut io::stdout()).map_err(|e| PakettiError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

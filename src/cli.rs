//! Command-line interface for atomize.
//!
//! This module handles:
//! - Argument parsing (clap derive)
//! - Configuration loading for the target project
//! - Dispatch to the [`Orchestrator`] and exit status

use crate::classification::ComponentId;
use crate::config::ProjectConfig;
use crate::orchestrator::{Operation, OperationReport, Orchestrator};
use crate::output::OutputFormatter;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Organize UI components into atoms, molecules and organisms.
#[derive(Debug, Parser)]
#[command(name = "atomize", version)]
pub struct Cli {
    /// Project root (the folder holding package.json)
    #[arg(short, long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Configuration file to use instead of the usual lookup
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create the category folders, index files and package scripts
    Init,
    /// Scaffold a component into ui/ and organize it
    Add {
        id: String,
        /// Record packages in package.json without running the installer
        #[arg(long)]
        no_install: bool,
    },
    /// Move components from ui/ into their category folders
    Organize { id: Option<String> },
    /// Delete a component and its imports, or scrub package scripts
    Remove { id: Option<String> },
    /// Move components back into ui/
    Uninstall { id: Option<String> },
    /// Show which category each known component belongs to
    Mapping {
        #[arg(long)]
        json: bool,
    },
    /// Print what the tool sees in the project
    Debug,
}

impl Command {
    /// Listing commands always print, even with `--quiet`.
    fn is_listing(&self) -> bool {
        matches!(self, Command::Mapping { .. } | Command::Debug)
    }
}

fn parse_id(raw: &str) -> Result<ComponentId, String> {
    ComponentId::parse(raw).map_err(|e| e.to_string())
}

fn parse_optional_id(raw: Option<&str>) -> Result<Option<ComponentId>, String> {
    raw.map(parse_id).transpose()
}

/// Runs `command` against an already built orchestrator.
///
/// # Errors
///
/// Returns an error only when a component id is malformed; operation
/// failures are reported inside the returned [`OperationReport`].
pub fn execute(orchestrator: &Orchestrator, command: &Command) -> Result<OperationReport, String> {
    let report = match command {
        Command::Init => orchestrator.init(),
        Command::Add { id, no_install } => orchestrator.install(&parse_id(id)?, !no_install),
        Command::Organize { id } => {
            orchestrator.organize(parse_optional_id(id.as_deref())?.as_ref())
        }
        Command::Remove { id } => orchestrator.remove(parse_optional_id(id.as_deref())?.as_ref()),
        Command::Uninstall { id } => {
            orchestrator.uninstall(parse_optional_id(id.as_deref())?.as_ref())
        }
        Command::Mapping { json } => orchestrator.mapping(*json),
        Command::Debug => orchestrator.debug(),
    };
    Ok(report)
}

/// Runs the CLI application for parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use atomize::cli::{Cli, run_cli};
/// use clap::Parser;
///
/// let cli = Cli::parse_from(["atomize", "--project", "my-app", "organize"]);
/// match run_cli(&cli) {
///     Ok(()) => println!("Operation completed successfully"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<(), String> {
    let project_root = cli
        .project
        .canonicalize()
        .map_err(|e| format!("Cannot open project {}: {}", cli.project.display(), e))?;
    let config = ProjectConfig::load(&project_root, cli.config.as_deref())
        .map_err(|e| e.to_string())?;

    let echo = !cli.quiet || cli.command.is_listing();
    let orchestrator = Orchestrator::from_config(&project_root, &config)
        .map_err(|e| e.to_string())?
        .with_echo(echo);

    let report = execute(&orchestrator, &cli.command)?;

    let mutating = !matches!(report.operation, Operation::Mapping | Operation::Debug);
    if mutating && !cli.quiet {
        OutputFormatter::header(&format!("{} finished: {}", report.operation, report.stats));
    }

    if report.success {
        return Ok(());
    }
    let errors: Vec<&str> = report.transcript.errors().collect();
    let mut message = format!("{} finished with {} error(s)", report.operation, errors.len());
    // Error lines were not echoed, so carry them in the returned message.
    if !echo {
        for error in errors {
            message.push_str("\n  ");
            message.push_str(error);
        }
    }
    Err(message)
}

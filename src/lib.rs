//! atomize - keeps generated UI components organized by atomic design
//!
//! This library moves component files from a flat `ui/` pool into `atoms/`,
//! `molecules/` and `organisms/` folders, maintains the barrel index files
//! that re-export them, and rewrites import paths across a source tree so
//! consumers keep resolving after every move. The inverse operations
//! (single-component removal and collapsing back into the pool) are
//! supported too.

pub mod classification;
pub mod cli;
pub mod config;
pub mod external;
pub mod index;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod relocator;
pub mod rewriter;

pub use classification::{Category, ClassificationTable, ComponentId, InvalidComponentId};
pub use config::{ConfigError, ProjectConfig, ProjectLayout, ScanFilter};
pub use external::{PackageInstaller, Scaffolder};
pub use orchestrator::{Operation, OperationReport, OperationStats, Orchestrator};
pub use output::Transcript;

pub use cli::{Cli, Command, run_cli};

//! External collaborators: the component scaffolder and the package installer.
//!
//! Both are traits so the orchestrator can run against fakes. The command
//! implementations run configured argv templates synchronously in the
//! project root.

use crate::classification::ComponentId;
use crate::config::ToolsSection;
use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Placeholder replaced by the component id in the scaffold template.
pub const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Error)]
pub enum ExternalToolError {
    #[error("no {0} command configured")]
    EmptyCommand(&'static str),
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{command}' exited with {}{}", describe_exit(.code), stderr_suffix(.stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

pub type ExternalResult<T> = Result<T, ExternalToolError>;

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Materializes a component's source file in the pool.
pub trait Scaffolder {
    fn scaffold(&self, id: &ComponentId, project_root: &Path) -> ExternalResult<()>;
}

/// Installs and removes packages listed in the manifest.
pub trait PackageInstaller {
    fn install(&self, project_root: &Path) -> ExternalResult<()>;
    fn uninstall(&self, packages: &[String], project_root: &Path) -> ExternalResult<()>;
}

/// Runs the configured scaffold command, e.g. `npx shadcn@latest add {id}`.
#[derive(Debug, Clone)]
pub struct CommandScaffolder {
    template: Vec<String>,
}

impl CommandScaffolder {
    pub fn new(template: Vec<String>) -> Self {
        Self { template }
    }

    /// The argv for `id`, with every placeholder substituted.
    pub fn command_for(&self, id: &ComponentId) -> Vec<String> {
        self.template
            .iter()
            .map(|arg| arg.replace(ID_PLACEHOLDER, id.as_str()))
            .collect()
    }
}

impl Scaffolder for CommandScaffolder {
    fn scaffold(&self, id: &ComponentId, project_root: &Path) -> ExternalResult<()> {
        run(&self.command_for(id), project_root, "scaffold")
    }
}

/// Runs the configured package manager.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    install: Vec<String>,
    uninstall: Vec<String>,
}

impl CommandInstaller {
    pub fn new(install: Vec<String>, uninstall: Vec<String>) -> Self {
        Self { install, uninstall }
    }
}

impl PackageInstaller for CommandInstaller {
    fn install(&self, project_root: &Path) -> ExternalResult<()> {
        run(&self.install, project_root, "install")
    }

    fn uninstall(&self, packages: &[String], project_root: &Path) -> ExternalResult<()> {
        let mut argv = self.uninstall.clone();
        argv.extend(packages.iter().cloned());
        run(&argv, project_root, "uninstall")
    }
}

/// Builds both command collaborators from the `[tools]` section.
pub fn from_tools(tools: &ToolsSection) -> (CommandScaffolder, CommandInstaller) {
    (
        CommandScaffolder::new(tools.scaffold.clone()),
        CommandInstaller::new(tools.install.clone(), tools.uninstall.clone()),
    )
}

fn run(argv: &[String], cwd: &Path, purpose: &'static str) -> ExternalResult<()> {
    let Some((program, args)) = argv.split_first() else {
        return Err(ExternalToolError::EmptyCommand(purpose));
    };
    debug!(command = %argv.join(" "), cwd = %cwd.display(), "running external tool");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| ExternalToolError::Spawn {
            program: program.clone(),
            source,
        })?;

    if output.status.success() {
        return Ok(());
    }
    Err(ExternalToolError::Failed {
        command: argv.join(" "),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

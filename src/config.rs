//! Project configuration and filesystem layout.
//!
//! Configuration is read from TOML and compiled into a [`ProjectLayout`]
//! (where the pool, category folders and index files live) and a
//! [`ScanFilter`] (which files the import rewriter visits).
//!
//! # Configuration File Format
//!
//! ```toml
//! [project]
//! components_dir = "src/components"
//! import_prefix = "@/components"
//! component_extension = "tsx"
//! index_file = "index.ts"
//!
//! [scan]
//! roots = ["src", "app", "pages", "lib", "utils", "hooks", "."]
//! extensions = ["ts", "tsx", "js", "jsx"]
//! skip_dirs = ["node_modules", ".next", ".git", "dist", "build"]
//! exclude = ["**/*.d.ts"]
//! rewrite_components_dir = false
//!
//! [tools]
//! scaffold = ["npx", "shadcn@latest", "add", "{id}"]
//! install = ["npm", "install"]
//! uninstall = ["npm", "uninstall"]
//! ```

use crate::classification::{Category, ComponentId, POOL_DIR};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-project configuration file.
pub const CONFIG_FILE_NAME: &str = ".atomizerc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(#[from] toml::de::Error),
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("IO error reading configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub tools: ToolsSection,
}

/// Where components live and how they are imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    /// Components folder relative to the project root.
    pub components_dir: PathBuf,
    /// Import path that resolves to the components folder.
    pub import_prefix: String,
    /// Extension of component module files, without the dot.
    pub component_extension: String,
    /// File name of every barrel.
    pub index_file: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            components_dir: PathBuf::from("src").join("components"),
            import_prefix: "@/components".to_string(),
            component_extension: "tsx".to_string(),
            index_file: "index.ts".to_string(),
        }
    }
}

/// Which files the import rewriter visits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Search roots relative to the project root. Missing ones are ignored.
    pub roots: Vec<PathBuf>,
    /// Source file extensions, without the dot.
    pub extensions: Vec<String>,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
    /// Glob patterns (project-relative) of files to leave alone.
    pub exclude: Vec<String>,
    /// Whether the pool-to-category pass also rewrites files inside the
    /// components folder.
    pub rewrite_components_dir: bool,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            roots: ["src", "app", "pages", "lib", "utils", "hooks", "."]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            extensions: ["ts", "tsx", "js", "jsx"]
                .into_iter()
                .map(String::from)
                .collect(),
            skip_dirs: ["node_modules", ".next", ".git", "dist", "build"]
                .into_iter()
                .map(String::from)
                .collect(),
            exclude: Vec::new(),
            rewrite_components_dir: false,
        }
    }
}

/// External command lines. `{id}` in the scaffold template is replaced by
/// the component id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub scaffold: Vec<String>,
    pub install: Vec<String>,
    pub uninstall: Vec<String>,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            scaffold: vec![
                "npx".to_string(),
                "shadcn@latest".to_string(),
                "add".to_string(),
                "{id}".to_string(),
            ],
            install: vec!["npm".to_string(), "install".to_string()],
            uninstall: vec!["npm".to_string(), "uninstall".to_string()],
        }
    }
}

impl ProjectConfig {
    /// Load configuration, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.atomizerc.toml` in the project root
    /// 3. Look for `~/.config/atomize/config.toml`
    /// 4. Fall back to the default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a file is found (or explicitly named) but cannot be
    /// read or parsed.
    pub fn load(project_root: &Path, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = project_root.join(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("atomize")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Resolve paths against `project_root` and validate patterns.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid glob patterns or unusable values.
    pub fn compile(&self, project_root: &Path) -> Result<(ProjectLayout, ScanFilter), ConfigError> {
        let layout = ProjectLayout::new(project_root, &self.project)?;
        let filter = ScanFilter::new(&self.scan)?;
        Ok((layout, filter))
    }
}

/// Absolute locations of everything the engine touches.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    project_root: PathBuf,
    components_dir: PathBuf,
    components_dir_name: String,
    import_prefix: String,
    extension: String,
    index_file: String,
}

impl ProjectLayout {
    fn new(project_root: &Path, section: &ProjectSection) -> Result<Self, ConfigError> {
        let components_dir_name = section
            .components_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "project.components_dir",
                reason: "must name a folder".to_string(),
            })?;

        let import_prefix = section.import_prefix.trim_end_matches('/').to_string();
        if import_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "project.import_prefix",
                reason: "must not be empty".to_string(),
            });
        }

        let extension = section.component_extension.trim_start_matches('.').to_string();
        if extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "project.component_extension",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            project_root: project_root.components().collect(),
            components_dir: project_root.join(&section.components_dir).components().collect(),
            components_dir_name,
            import_prefix,
            extension,
            index_file: section.index_file.clone(),
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn components_dir(&self) -> &Path {
        &self.components_dir
    }

    /// Last segment of the components folder, as it appears in relative imports.
    pub fn components_dir_name(&self) -> &str {
        &self.components_dir_name
    }

    pub fn import_prefix(&self) -> &str {
        &self.import_prefix
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn index_file_name(&self) -> &str {
        &self.index_file
    }

    pub fn pool_dir(&self) -> PathBuf {
        self.components_dir.join(POOL_DIR)
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.components_dir.join(category.dir_name())
    }

    pub fn category_index(&self, category: Category) -> PathBuf {
        self.category_dir(category).join(&self.index_file)
    }

    pub fn root_index(&self) -> PathBuf {
        self.components_dir.join(&self.index_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join("package.json")
    }

    pub fn pool_file(&self, id: &ComponentId) -> PathBuf {
        self.pool_dir().join(id.file_name(&self.extension))
    }

    pub fn category_file(&self, category: Category, id: &ComponentId) -> PathBuf {
        self.category_dir(category).join(id.file_name(&self.extension))
    }

    /// Path relative to the project root, for log lines.
    pub fn display_relative<'a>(&self, path: &'a Path) -> std::path::Display<'a> {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .display()
    }
}

/// Compiled scan rules for the import rewriter.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    roots: Vec<PathBuf>,
    extensions: HashSet<String>,
    skip_dirs: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    rewrite_components_dir: bool,
}

impl ScanFilter {
    fn new(section: &ScanSection) -> Result<Self, ConfigError> {
        let exclude_patterns = section
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            roots: section.roots.clone(),
            extensions: section
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            skip_dirs: section.skip_dirs.iter().cloned().collect(),
            exclude_patterns,
            rewrite_components_dir: section.rewrite_components_dir,
        })
    }

    /// Search roots relative to the project root.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn rewrite_components_dir(&self) -> bool {
        self.rewrite_components_dir
    }

    /// Whether a directory name is on the skip list.
    pub fn skips_dir(&self, name: &str) -> bool {
        self.skip_dirs.contains(name)
    }

    /// Whether a file should be scanned. `relative` is project-relative.
    pub fn accepts_file(&self, relative: &Path) -> bool {
        let has_extension = relative
            .extension()
            .map(|ext| self.extensions.contains(&ext.to_string_lossy().to_lowercase()))
            .unwrap_or(false);
        if !has_extension {
            return false;
        }
        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative))
    }
}

//! Reading and updating the project's `package.json`.
//!
//! The document is kept as a [`serde_json::Value`] so keys this tool does
//! not know about survive a load/save cycle untouched, in their original
//! order.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scripts registered by `init`.
pub const MANAGED_SCRIPTS: [(&str, &str); 2] = [
    ("install-component", "atomize add"),
    ("organize", "atomize organize"),
];

/// Scripts removed by the script scrub, including legacy names.
pub const SCRUBBED_SCRIPTS: [&str; 6] = [
    "install-component",
    "organize",
    "add-component",
    "atomic-init",
    "atomic-add",
    "atomic-organize",
];

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("package.json not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed package.json: {0}")]
    Malformed(String),
}

pub type ManifestResult<T> = Result<T, ManifestError>;

/// An in-memory `package.json`.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: Map<String, Value>,
}

impl Manifest {
    /// Loads and parses the manifest at `path`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the file is missing, `Malformed` when it is not a JSON
    /// object or a known section has the wrong shape.
    pub fn load(path: &Path) -> ManifestResult<Self> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> ManifestResult<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::Malformed(format!("JSON parse error: {}", e)))?;

        let Value::Object(document) = value else {
            return Err(ManifestError::Malformed(
                "top level must be an object".to_string(),
            ));
        };

        for section in ["scripts", "dependencies", "devDependencies"] {
            if document.get(section).is_some_and(|entry| !entry.is_object()) {
                return Err(ManifestError::Malformed(format!(
                    "'{}' must be an object",
                    section
                )));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.document.get(name).and_then(Value::as_object)
    }

    /// Known sections are checked to be objects on load, so this only
    /// returns `None` for a name that was never validated.
    fn section_mut(&mut self, name: &str) -> Option<&mut Map<String, Value>> {
        self.document
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
    }

    /// Whether `package` is listed in `dependencies` or `devDependencies`.
    pub fn has_dependency(&self, package: &str) -> bool {
        ["dependencies", "devDependencies"]
            .iter()
            .any(|section| self.section(section).is_some_and(|deps| deps.contains_key(package)))
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.section("scripts")
            .and_then(|scripts| scripts.get(name))
            .and_then(Value::as_str)
    }

    /// Adds each script that is not already defined. Returns the names added.
    pub fn add_scripts(&mut self, scripts: &[(&str, &str)]) -> Vec<String> {
        let Some(section) = self.section_mut("scripts") else {
            return Vec::new();
        };
        let mut added = Vec::new();
        for (name, command) in scripts {
            if !section.contains_key(*name) {
                section.insert(name.to_string(), Value::String(command.to_string()));
                added.push(name.to_string());
            }
        }
        added
    }

    /// Removes each listed script that is present. Returns the names removed.
    pub fn remove_scripts(&mut self, names: &[&str]) -> Vec<String> {
        let Some(Value::Object(section)) = self.document.get_mut("scripts") else {
            return Vec::new();
        };
        names
            .iter()
            .filter(|name| section.shift_remove(**name).is_some())
            .map(|name| name.to_string())
            .collect()
    }

    /// Adds each package to `dependencies` at `version` unless it is already
    /// a dependency or dev dependency. Returns the packages added.
    pub fn merge_dependencies(&mut self, packages: &[&str], version: &str) -> Vec<String> {
        let missing: Vec<String> = packages
            .iter()
            .filter(|package| !self.has_dependency(package))
            .map(|package| package.to_string())
            .collect();
        if missing.is_empty() {
            return missing;
        }
        let Some(dependencies) = self.section_mut("dependencies") else {
            return Vec::new();
        };
        for package in &missing {
            dependencies.insert(package.clone(), Value::String(version.to_string()));
        }
        missing
    }

    /// Writes the manifest back as 2-space indented JSON with a trailing newline.
    pub fn save(&self) -> ManifestResult<()> {
        let mut json = serde_json::to_string_pretty(&self.document)
            .map_err(|e| ManifestError::Malformed(format!("JSON serialization failed: {}", e)))?;
        json.push('\n');
        fs::write(&self.path, json).map_err(|source| ManifestError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

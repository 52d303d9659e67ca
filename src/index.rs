//! Barrel (index file) maintenance.
//!
//! Each category folder holds an index file re-exporting its components, and
//! the components folder holds a root aggregator re-exporting each category.
//! The text helpers at the bottom are pure so they can be tested against
//! literal input and output.

use crate::classification::{Category, ClassificationTable, ComponentId};
use crate::config::ProjectLayout;
use crate::output::Transcript;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

const ROOT_INDEX_HEADER: &str = "// Main components export";

static CATEGORY_REEXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*export\s*\*\s*from\s*["']\./(?:atoms|molecules|organisms)["'];?[ \t]*(?:\r?\n)?"#)
        .expect("valid category re-export regex")
});

/// Result of appending an export declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Added,
    AlreadyPresent,
    Failed,
}

/// Reads, creates and updates index files.
pub struct IndexMaintainer<'a> {
    layout: &'a ProjectLayout,
    table: &'a ClassificationTable,
}

impl<'a> IndexMaintainer<'a> {
    pub fn new(layout: &'a ProjectLayout, table: &'a ClassificationTable) -> Self {
        Self { layout, table }
    }

    /// Creates the category index with its header comment when missing.
    ///
    /// Returns `Ok(true)` when the file was created. An existing index is
    /// never truncated.
    pub fn ensure_index(&self, category: Category) -> io::Result<bool> {
        let index_path = self.layout.category_index(category);
        if index_path.exists() {
            return Ok(false);
        }
        fs::create_dir_all(self.layout.category_dir(category))?;
        fs::write(&index_path, format!("{}\n\n", category.index_header()))?;
        Ok(true)
    }

    /// Creates the root aggregator when missing. Returns `Ok(true)` if created.
    pub fn ensure_root_index(&self) -> io::Result<bool> {
        let index_path = self.layout.root_index();
        if index_path.exists() {
            return Ok(false);
        }
        fs::create_dir_all(self.layout.components_dir())?;
        fs::write(&index_path, root_index_content())?;
        Ok(true)
    }

    /// Appends the export declaration for `id` to the category index.
    ///
    /// Multi-export components get a grouped named export, everything else
    /// a wildcard re-export. Nothing is written if the index already
    /// references the module. Write failures are logged, not returned.
    pub fn add_export(
        &self,
        category: Category,
        id: &ComponentId,
        transcript: &mut Transcript,
    ) -> ExportOutcome {
        let index_name = format!("{}/{}", category, self.layout.index_file_name());

        if let Err(e) = self.ensure_index(category) {
            transcript.error(format!("Could not create {}: {}", index_name, e));
            return ExportOutcome::Failed;
        }

        let index_path = self.layout.category_index(category);
        let content = match fs::read_to_string(&index_path) {
            Ok(content) => content,
            Err(e) => {
                transcript.error(format!("Could not read {}: {}", index_name, e));
                return ExportOutcome::Failed;
            }
        };

        if references_module(&content, id) {
            transcript.info(format!("Export for {} already exists in {}", id, index_name));
            return ExportOutcome::AlreadyPresent;
        }

        let symbols = self.table.multi_export_symbols(id);
        let mut declaration = export_declaration(id, symbols);
        if !content.is_empty() && !content.ends_with('\n') {
            declaration.insert(0, '\n');
        }

        match append(&index_path, &declaration) {
            Ok(()) => {
                if symbols.is_some() {
                    transcript.success(format!(
                        "Updated {} with grouped exports for {}",
                        index_name, id
                    ));
                } else {
                    transcript.success(format!("Updated {} exports for {}", index_name, id));
                }
                ExportOutcome::Added
            }
            Err(e) => {
                transcript.error(format!("Could not update {}: {}", index_name, e));
                ExportOutcome::Failed
            }
        }
    }

    /// Removes declarations for `id` from one index file.
    ///
    /// Returns `Ok(false)` when the file is missing or had nothing to remove.
    pub fn remove_export(&self, index_path: &Path, id: &ComponentId) -> io::Result<bool> {
        if !index_path.exists() {
            return Ok(false);
        }
        let content = fs::read_to_string(index_path)?;
        let updated = remove_export_declarations(&content, id);
        if updated == content {
            return Ok(false);
        }
        fs::write(index_path, updated)?;
        debug!(index = %index_path.display(), component = %id, "removed export");
        Ok(true)
    }

    /// Removes `id` from every category index, plus the root aggregator when
    /// `include_root` is set. Returns how many files changed.
    pub fn remove_export_everywhere(
        &self,
        id: &ComponentId,
        include_root: bool,
        transcript: &mut Transcript,
    ) -> usize {
        let mut targets: Vec<_> = Category::ALL
            .into_iter()
            .map(|category| {
                (
                    format!("{}/{}", category, self.layout.index_file_name()),
                    self.layout.category_index(category),
                )
            })
            .collect();
        if include_root {
            targets.push((
                self.layout.index_file_name().to_string(),
                self.layout.root_index(),
            ));
        }

        let mut changed = 0;
        for (name, path) in targets {
            match self.remove_export(&path, id) {
                Ok(true) => {
                    transcript.success(format!("Removed {} export from {}", id, name));
                    changed += 1;
                }
                Ok(false) => {}
                Err(e) => transcript.warning(format!("Could not update {}: {}", name, e)),
            }
        }
        changed
    }

    /// Drops the category re-exports from the root aggregator, deleting the
    /// file when only comments are left.
    pub fn strip_root_category_exports(&self, transcript: &mut Transcript) {
        let index_path = self.layout.root_index();
        if !index_path.exists() {
            return;
        }

        let result = fs::read_to_string(&index_path).and_then(|content| {
            let updated = CATEGORY_REEXPORT.replace_all(&content, "").to_string();
            if is_effectively_empty(&updated) {
                fs::remove_file(&index_path)?;
                Ok(Some(true))
            } else if updated != content {
                fs::write(&index_path, updated)?;
                Ok(Some(false))
            } else {
                Ok(None)
            }
        });

        let name = self.layout.index_file_name();
        match result {
            Ok(Some(true)) => transcript.success(format!("Removed root {}", name)),
            Ok(Some(false)) => {
                transcript.success(format!("Removed category re-exports from root {}", name))
            }
            Ok(None) => {}
            Err(e) => transcript.warning(format!("Could not update root {}: {}", name, e)),
        }
    }
}

fn append(path: &Path, text: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(text.as_bytes())
}

/// Content written to a new root aggregator.
pub fn root_index_content() -> String {
    let mut content = format!("{}\n", ROOT_INDEX_HEADER);
    for category in Category::ALL {
        content.push_str(&format!("export * from './{}';\n", category));
    }
    content
}

/// Builds the declaration appended for `id`, ending in a newline.
///
/// ```
/// use atomize::classification::ComponentId;
/// use atomize::index::export_declaration;
///
/// let id = ComponentId::parse("button").unwrap();
/// assert_eq!(export_declaration(&id, None), "export * from './button';\n");
/// ```
pub fn export_declaration(id: &ComponentId, symbols: Option<&[&str]>) -> String {
    match symbols {
        Some(symbols) => format!(
            "export {{\n  {},\n}} from \"./{}\";\n",
            symbols.join(",\n  "),
            id
        ),
        None => format!("export * from './{}';\n", id),
    }
}

/// Whether the index text already references `./<id>` as a module path.
pub fn references_module(content: &str, id: &ComponentId) -> bool {
    let pattern = format!(r#"from\s*["']\./{}["']"#, regex::escape(id.as_str()));
    Regex::new(&pattern)
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

/// Removes grouped and wildcard declarations whose source path ends in `/<id>`.
///
/// The trailing quote anchors the match, so removing `toggle` leaves
/// `./toggle-group` alone.
pub fn remove_export_declarations(content: &str, id: &ComponentId) -> String {
    let escaped = regex::escape(id.as_str());
    let grouped = format!(
        r#"export\s*(?:type\s*)?\{{[^}}]*\}}\s*from\s*["'][^"']*/{}["'];?[ \t]*(?:\r?\n)?"#,
        escaped
    );
    let wildcard = format!(
        r#"export\s*\*(?:\s*as\s+\w+)?\s*from\s*["'][^"']*/{}["'];?[ \t]*(?:\r?\n)?"#,
        escaped
    );

    let mut updated = content.to_string();
    for pattern in [grouped, wildcard] {
        if let Ok(re) = Regex::new(&pattern) {
            updated = re.replace_all(&updated, "").to_string();
        }
    }
    updated
}

fn is_effectively_empty(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("//"))
}

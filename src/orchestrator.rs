//! Sequencing of the user-facing operations.
//!
//! Each operation re-reads the filesystem, runs its stages in order and
//! turns every stage failure into a transcript line instead of returning
//! early, so a re-run picks up wherever an interrupted one stopped.

use crate::classification::{
    Category, ClassificationTable, ComponentId, DEFAULT_CATEGORY, POOL_DIR,
};
use crate::config::{ConfigError, ProjectConfig, ProjectLayout, ScanFilter};
use crate::external::{self, PackageInstaller, Scaffolder};
use crate::index::{ExportOutcome, IndexMaintainer};
use crate::manifest::{MANAGED_SCRIPTS, Manifest, ManifestError, SCRUBBED_SCRIPTS};
use crate::output::Transcript;
use crate::relocator::{FileRelocator, Location, PoolCleanup, RestoreOutcome};
use crate::rewriter::{ImportRewriter, RewriteMode, RewriteReport};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Version recorded for packages merged into the manifest.
pub const DEPENDENCY_VERSION: &str = "latest";

/// Pool locations other projects commonly use, checked by `debug`.
const ALTERNATIVE_POOLS: [&str; 3] = ["components/ui", "app/components/ui", "lib/components/ui"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Init,
    Add,
    Organize,
    Remove,
    Uninstall,
    Mapping,
    Debug,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Init => "init",
            Operation::Add => "add",
            Operation::Organize => "organize",
            Operation::Remove => "remove",
            Operation::Uninstall => "uninstall",
            Operation::Mapping => "mapping",
            Operation::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Counters gathered while an operation runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    pub moved: usize,
    pub restored: usize,
    pub removed: usize,
    pub exports_added: usize,
    pub exports_removed: usize,
    pub files_scanned: usize,
    pub files_updated: usize,
    pub files_failed: usize,
    pub packages_added: usize,
    pub packages_removed: usize,
}

impl OperationStats {
    fn absorb(&mut self, report: &RewriteReport) {
        self.files_scanned += report.files_scanned;
        self.files_updated += report.files_updated.len();
        self.files_failed += report.failures.len();
    }
}

impl fmt::Display for OperationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = [
            (self.moved, "moved"),
            (self.restored, "restored"),
            (self.removed, "removed"),
            (self.exports_added, "exports added"),
            (self.exports_removed, "exports removed"),
            (self.files_updated, "files updated"),
            (self.files_failed, "files failed"),
            (self.packages_added, "packages added"),
            (self.packages_removed, "packages removed"),
        ];
        let parts: Vec<String> = counts
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, label)| format!("{} {}", count, label))
            .collect();
        if parts.is_empty() {
            write!(f, "{} files scanned, nothing changed", self.files_scanned)
        } else {
            write!(f, "{} ({} files scanned)", parts.join(", "), self.files_scanned)
        }
    }
}

/// Outcome of one operation.
#[derive(Debug, Clone)]
pub struct OperationReport {
    pub operation: Operation,
    pub started_at: DateTime<Local>,
    /// False when any error line was recorded.
    pub success: bool,
    pub stats: OperationStats,
    pub transcript: Transcript,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub category: Category,
    pub description: &'static str,
    pub components: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiExportListing {
    pub component: &'static str,
    pub symbols: Vec<&'static str>,
}

/// The classification table in listing form, as printed by `mapping`.
#[derive(Debug, Clone, Serialize)]
pub struct MappingListing {
    pub categories: Vec<CategoryListing>,
    pub default_category: Category,
    pub multi_export: Vec<MultiExportListing>,
}

/// Runs operations against one project.
pub struct Orchestrator {
    layout: ProjectLayout,
    filter: ScanFilter,
    table: &'static ClassificationTable,
    scaffolder: Box<dyn Scaffolder>,
    installer: Box<dyn PackageInstaller>,
    echo: bool,
}

impl Orchestrator {
    pub fn new(
        layout: ProjectLayout,
        filter: ScanFilter,
        scaffolder: Box<dyn Scaffolder>,
        installer: Box<dyn PackageInstaller>,
    ) -> Self {
        Self {
            layout,
            filter,
            table: ClassificationTable::global(),
            scaffolder,
            installer,
            echo: false,
        }
    }

    /// Builds an orchestrator whose collaborators run the configured commands.
    pub fn from_config(project_root: &Path, config: &ProjectConfig) -> Result<Self, ConfigError> {
        let (layout, filter) = config.compile(project_root)?;
        let (scaffolder, installer) = external::from_tools(&config.tools);
        Ok(Self::new(
            layout,
            filter,
            Box::new(scaffolder),
            Box::new(installer),
        ))
    }

    /// Print transcript lines as they are recorded.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    fn relocator(&self) -> FileRelocator<'_> {
        FileRelocator::new(&self.layout)
    }

    fn indexes(&self) -> IndexMaintainer<'_> {
        IndexMaintainer::new(&self.layout, self.table)
    }

    fn rewriter(&self) -> ImportRewriter<'_> {
        ImportRewriter::new(&self.layout, &self.filter, self.table)
    }

    fn file_label(&self, location: impl fmt::Display, id: &ComponentId) -> String {
        format!("{}/{}", location, id.file_name(self.layout.extension()))
    }

    fn run(
        &self,
        operation: Operation,
        body: impl FnOnce(&mut Transcript, &mut OperationStats),
    ) -> OperationReport {
        let started_at = Local::now();
        let mut transcript = if self.echo {
            Transcript::echoing()
        } else {
            Transcript::new()
        };
        let mut stats = OperationStats::default();
        info!(%operation, root = %self.layout.project_root().display(), "operation started");

        body(&mut transcript, &mut stats);

        let success = !transcript.has_errors();
        let elapsed = Local::now().signed_duration_since(started_at);
        info!(
            %operation,
            success,
            elapsed_ms = elapsed.num_milliseconds(),
            "operation finished"
        );
        OperationReport {
            operation,
            started_at,
            success,
            stats,
            transcript,
        }
    }

    /// Creates the category folders, their indexes, the pool and the root
    /// index, then registers the package scripts.
    pub fn init(&self) -> OperationReport {
        self.run(Operation::Init, |transcript, _| {
            transcript.header("Setting up atomic design structure");
            self.ensure_structure(transcript, true);
            self.register_scripts(transcript);
            transcript.plain("Next steps:");
            transcript.plain("  atomize add <component>    scaffold and organize a component");
            transcript.plain(format!(
                "  atomize organize           organize everything waiting in {}/",
                POOL_DIR
            ));
        })
    }

    /// Scaffolds `id` into the pool, records its packages and organizes it.
    pub fn install(&self, id: &ComponentId, run_installer: bool) -> OperationReport {
        self.run(Operation::Add, |transcript, stats| {
            transcript.header(format!("Installing {}", id));
            self.ensure_structure(transcript, true);

            if let Some(category) = self.relocator().find_classified(id) {
                transcript.warning(format!(
                    "{} is already organized in {}/; the new copy will replace it",
                    id, category
                ));
            }

            let pool_label = self.file_label(POOL_DIR, id);
            match self.scaffolder.scaffold(id, self.layout.project_root()) {
                Ok(()) if self.layout.pool_file(id).is_file() => {
                    transcript.success(format!("Scaffolded {}", pool_label));
                }
                Ok(()) => transcript.warning(format!(
                    "Scaffolder finished but {} was not created",
                    pool_label
                )),
                Err(e) => {
                    transcript.error(format!("Could not scaffold {}: {}", id, e));
                    transcript.plain("Check the [tools] scaffold command in your configuration");
                }
            }

            self.merge_requirements(id, run_installer, transcript, stats);
            self.organize_pending(Some(id), transcript, stats);
        })
    }

    /// Moves pool components into their categories and points imports at
    /// the new locations. `None` organizes everything in the pool.
    pub fn organize(&self, id: Option<&ComponentId>) -> OperationReport {
        self.run(Operation::Organize, |transcript, stats| {
            self.organize_pending(id, transcript, stats);
        })
    }

    /// Deletes a component everywhere, or with `None` scrubs the managed
    /// package scripts.
    pub fn remove(&self, id: Option<&ComponentId>) -> OperationReport {
        self.run(Operation::Remove, |transcript, stats| match id {
            Some(id) => self.remove_component(id, transcript, stats),
            None => {
                transcript.header("Removing atomize scripts");
                self.scrub_scripts(transcript);
            }
        })
    }

    /// Returns a component to the pool, or with `None` collapses the whole
    /// classification back into the pool.
    pub fn uninstall(&self, id: Option<&ComponentId>) -> OperationReport {
        self.run(Operation::Uninstall, |transcript, stats| match id {
            Some(id) => self.uninstall_component(id, transcript, stats),
            None => self.uninstall_all(transcript, stats),
        })
    }

    /// The classification table in listing form.
    pub fn mapping_listing(&self) -> MappingListing {
        MappingListing {
            categories: Category::ALL
                .into_iter()
                .map(|category| CategoryListing {
                    category,
                    description: category.description(),
                    components: self.table.components_in(category),
                })
                .collect(),
            default_category: DEFAULT_CATEGORY,
            multi_export: self
                .table
                .multi_export_entries()
                .map(|(component, symbols)| MultiExportListing {
                    component,
                    symbols: symbols.to_vec(),
                })
                .collect(),
        }
    }

    /// Lists the classification table, as text or pretty JSON.
    pub fn mapping(&self, json: bool) -> OperationReport {
        self.run(Operation::Mapping, |transcript, _| {
            let listing = self.mapping_listing();
            if json {
                match serde_json::to_string_pretty(&listing) {
                    Ok(text) => transcript.plain(text),
                    Err(e) => transcript.error(format!("Could not serialize mapping: {}", e)),
                }
                return;
            }

            transcript.header("Atomic design component mapping");
            for entry in &listing.categories {
                transcript.header(entry.description);
                for component in &entry.components {
                    transcript.plain(format!("  • {}", component));
                }
            }
            transcript.info(format!(
                "Default: unknown components → {}/",
                listing.default_category
            ));
            transcript.header("Multi-export components");
            for entry in &listing.multi_export {
                transcript.plain(format!(
                    "  • {} → {} exports",
                    entry.component,
                    entry.symbols.len()
                ));
            }
        })
    }

    /// Dumps what the tool sees on disk.
    pub fn debug(&self) -> OperationReport {
        self.run(Operation::Debug, |transcript, _| {
            let root = self.layout.project_root();
            let components = self.layout.components_dir();
            transcript.header("Debug information");
            transcript.plain(format!("Working directory: {}", root.display()));
            transcript.plain(format!("Components path: {}", components.display()));
            transcript.plain(format!("Components path exists: {}", components.exists()));

            match Manifest::load(&self.layout.manifest_path()) {
                Ok(manifest) => {
                    let kind = if manifest.has_dependency("react") {
                        "React"
                    } else {
                        "Non-React"
                    };
                    transcript.plain(format!("Project type: {}", kind));
                    let radix = if manifest.has_dependency("@radix-ui/react-dialog") {
                        "yes"
                    } else {
                        "no"
                    };
                    transcript.plain(format!("Radix UI present: {}", radix));
                }
                Err(ManifestError::NotFound(_)) => transcript.plain("package.json: not found"),
                Err(e) => transcript.warning(format!("Could not read package.json: {}", e)),
            }

            let pool = self.layout.pool_dir();
            transcript.plain(format!("Pool folder: {}", pool.display()));
            if pool.is_dir() {
                let names = list_dir(&pool).unwrap_or_default();
                transcript.plain(format!("Pool contents: {}", names.join(", ")));
                let pending = self.relocator().pool_components().unwrap_or_default();
                transcript.plain(format!("Component files: {}", pending.len()));
                for id in &pending {
                    transcript.plain(format!("  • {}", id.file_name(self.layout.extension())));
                }
            } else {
                transcript.warning("Pool folder not found");
                transcript.plain("Checking alternative paths:");
                let suffix = format!(".{}", self.layout.extension());
                for alternative in ALTERNATIVE_POOLS {
                    let path = root.join(alternative);
                    if path.is_dir() {
                        let found: Vec<String> = list_dir(&path)
                            .unwrap_or_default()
                            .into_iter()
                            .filter(|name| name.ends_with(&suffix))
                            .collect();
                        transcript.plain(format!("  {}: found", alternative));
                        transcript.plain(format!("    Components: {}", found.join(", ")));
                    } else {
                        transcript.plain(format!("  {}: missing", alternative));
                    }
                }
            }

            for category in Category::ALL {
                let dir = self.layout.category_dir(category);
                match list_dir(&dir) {
                    Ok(names) => {
                        transcript.plain(format!("{}/ contents: {}", category, names.join(", ")))
                    }
                    Err(_) => transcript.plain(format!("{}/ folder: not found", category)),
                }
            }

            let roots: Vec<String> = self
                .rewriter()
                .search_roots()
                .iter()
                .map(|path| path.display().to_string())
                .collect();
            transcript.plain(format!("Import search roots: {}", roots.join(", ")));
        })
    }

    fn ensure_structure(&self, transcript: &mut Transcript, create_pool: bool) {
        let indexes = self.indexes();
        let index_name = self.layout.index_file_name();
        for category in Category::ALL {
            match indexes.ensure_index(category) {
                Ok(true) => transcript.success(format!("Created {}/{}", category, index_name)),
                Ok(false) => debug!(%category, "index already present"),
                Err(e) => transcript.error(format!("Could not create {}/{}: {}", category, index_name, e)),
            }
        }

        let pool = self.layout.pool_dir();
        if create_pool && !pool.exists() {
            match fs::create_dir_all(&pool) {
                Ok(()) => transcript.success(format!("Created {}/ folder", POOL_DIR)),
                Err(e) => transcript.error(format!("Could not create {}/: {}", POOL_DIR, e)),
            }
        }

        match indexes.ensure_root_index() {
            Ok(true) => transcript.success(format!("Created main {}", index_name)),
            Ok(false) => {}
            Err(e) => transcript.error(format!("Could not create main {}: {}", index_name, e)),
        }
    }

    fn register_scripts(&self, transcript: &mut Transcript) {
        let manual_hint = |transcript: &mut Transcript| {
            transcript.plain("Add these scripts to package.json manually:");
            for (name, command) in MANAGED_SCRIPTS {
                transcript.plain(format!("  \"{}\": \"{}\"", name, command));
            }
        };

        match Manifest::load(&self.layout.manifest_path()) {
            Ok(mut manifest) => {
                let added = manifest.add_scripts(&MANAGED_SCRIPTS);
                if added.is_empty() {
                    transcript.info("package.json scripts already present");
                    return;
                }
                match manifest.save() {
                    Ok(()) => transcript.success(format!(
                        "Added scripts to package.json: {}",
                        added.join(", ")
                    )),
                    Err(e) => {
                        transcript.error(format!("Could not update package.json scripts: {}", e));
                        manual_hint(transcript);
                    }
                }
            }
            Err(ManifestError::NotFound(_)) => {
                transcript.warning("No package.json found");
                manual_hint(transcript);
            }
            Err(e) => {
                transcript.error(format!("Could not update package.json scripts: {}", e));
                manual_hint(transcript);
            }
        }
    }

    fn merge_requirements(
        &self,
        id: &ComponentId,
        run_installer: bool,
        transcript: &mut Transcript,
        stats: &mut OperationStats,
    ) {
        let required = self.table.package_requirements(id);
        if required.is_empty() {
            transcript.info(format!("No extra packages needed for {}", id));
            return;
        }

        let mut manifest = match Manifest::load(&self.layout.manifest_path()) {
            Ok(manifest) => manifest,
            Err(ManifestError::NotFound(_)) => {
                transcript.warning(format!(
                    "No package.json found; {} needs {}",
                    id,
                    required.join(", ")
                ));
                return;
            }
            Err(e) => {
                transcript.error(format!("Could not record packages for {}: {}", id, e));
                return;
            }
        };

        let added = manifest.merge_dependencies(required, DEPENDENCY_VERSION);
        if added.is_empty() {
            transcript.info(format!("Packages already present: {}", required.join(", ")));
            return;
        }
        if let Err(e) = manifest.save() {
            transcript.error(format!("Could not record packages for {}: {}", id, e));
            return;
        }
        stats.packages_added += added.len();
        transcript.success(format!("Added to package.json: {}", added.join(", ")));

        if !run_installer {
            transcript.info("Skipped package install; run your package manager to fetch them");
            return;
        }
        match self.installer.install(self.layout.project_root()) {
            Ok(()) => transcript.success("Installed packages"),
            Err(e) => {
                transcript.error(format!("Package install failed: {}", e));
                transcript.plain("Run your package manager's install command manually");
            }
        }
    }

    fn organize_pending(
        &self,
        scope: Option<&ComponentId>,
        transcript: &mut Transcript,
        stats: &mut OperationStats,
    ) {
        match scope {
            Some(id) => transcript.header(format!("Organizing {}", id)),
            None => transcript.header("Organizing components"),
        }
        self.ensure_structure(transcript, false);

        let relocator = self.relocator();
        for name in relocator.unrecognized_pool_files() {
            transcript.warning(format!(
                "Skipping {}/{}: not a valid component id",
                POOL_DIR, name
            ));
        }

        let pending = match relocator.pool_components() {
            Ok(ids) => ids,
            Err(e) => {
                transcript.error(format!("Could not read {}/: {}", POOL_DIR, e));
                Vec::new()
            }
        };
        let targets: Vec<&ComponentId> = pending
            .iter()
            .filter(|candidate| scope.is_none_or(|wanted| wanted == *candidate))
            .collect();

        if targets.is_empty() {
            match scope {
                Some(id) => match relocator.find_classified(id) {
                    Some(category) => {
                        transcript.info(format!("{} is already organized in {}/", id, category))
                    }
                    None => transcript.warning(format!("No {} found", self.file_label(POOL_DIR, id))),
                },
                None => transcript.info(format!("No components waiting in {}/", POOL_DIR)),
            }
        }

        let indexes = self.indexes();
        for id in targets {
            let category = self.table.category_of(id);
            if !self.table.is_known(id) {
                transcript.info(format!(
                    "{} is not in the classification table; using {}/",
                    id, category
                ));
            }
            match relocator.move_to_category(id, category) {
                Ok(relocation) => {
                    if relocation.replaced_existing {
                        transcript.warning(format!(
                            "Replaced existing {}",
                            self.file_label(category, id)
                        ));
                    }
                    transcript.success(format!("Moved {} → {}/", id, category));
                    stats.moved += 1;
                    if indexes.add_export(category, id, transcript) == ExportOutcome::Added {
                        stats.exports_added += 1;
                    }
                }
                Err(e) => transcript.error(format!("Could not move {}: {}", id, e)),
            }
        }

        match relocator.cleanup_pool() {
            Ok(PoolCleanup::Removed) => {
                transcript.success(format!("Removed empty {}/ folder", POOL_DIR))
            }
            Ok(PoolCleanup::KeptNonComponents(names)) => transcript.info(format!(
                "Kept {}/: it holds other files ({})",
                POOL_DIR,
                names.join(", ")
            )),
            Ok(PoolCleanup::KeptComponents(names)) => {
                let message = format!("{}/ still holds {}", POOL_DIR, names.join(", "));
                if scope.is_none() {
                    transcript.warning(message);
                } else {
                    transcript.info(message);
                }
            }
            Ok(PoolCleanup::AlreadyAbsent) => {}
            Err(e) => transcript.warning(format!("Could not clean up {}/: {}", POOL_DIR, e)),
        }

        let classified: BTreeSet<ComponentId> = relocator
            .classified_components()
            .into_iter()
            .map(|(id, _)| id)
            .filter(|id| scope.is_none_or(|wanted| wanted == id))
            .collect();
        transcript.header("Updating imports");
        let report = self
            .rewriter()
            .run(&RewriteMode::Classify { scope: classified }, transcript);
        stats.absorb(&report);
    }

    fn remove_component(
        &self,
        id: &ComponentId,
        transcript: &mut Transcript,
        stats: &mut OperationStats,
    ) {
        transcript.header(format!("Removing {}", id));
        let relocator = self.relocator();
        let locations = relocator.locate(id);
        if locations.is_empty() {
            transcript.error(format!(
                "{} not found in {}/ or any category folder",
                id.file_name(self.layout.extension()),
                POOL_DIR
            ));
            return;
        }

        for location in &locations {
            let result = match location {
                Location::Pool => relocator.delete_from_pool(id),
                Location::Classified(category) => relocator.delete_classified(id, *category),
            };
            match result {
                Ok(()) => {
                    transcript.success(format!("Deleted {}", self.file_label(location, id)));
                    stats.removed += 1;
                }
                Err(e) => transcript.error(e.to_string()),
            }
        }

        stats.exports_removed += self.indexes().remove_export_everywhere(id, true, transcript);

        transcript.header("Removing imports");
        let report = self
            .rewriter()
            .run(&RewriteMode::Remove { id: id.clone() }, transcript);
        stats.absorb(&report);

        self.uninstall_requirements(id, transcript, stats);
    }

    fn uninstall_requirements(
        &self,
        id: &ComponentId,
        transcript: &mut Transcript,
        stats: &mut OperationStats,
    ) {
        let required = self.table.package_requirements(id);
        if required.is_empty() {
            transcript.info(format!("No packages to uninstall for {}", id));
            return;
        }

        let relocator = self.relocator();
        let mut remaining: Vec<ComponentId> = relocator
            .classified_components()
            .into_iter()
            .map(|(other, _)| other)
            .collect();
        remaining.extend(relocator.pool_components().unwrap_or_default());
        remaining.retain(|other| other != id);

        let mut to_remove = Vec::new();
        for package in required {
            let user = remaining
                .iter()
                .find(|other| self.table.package_requirements(other).contains(package));
            match user {
                Some(other) => {
                    transcript.info(format!("Keeping {}: still used by {}", package, other))
                }
                None => to_remove.push(package.to_string()),
            }
        }
        if to_remove.is_empty() {
            return;
        }

        match self.installer.uninstall(&to_remove, self.layout.project_root()) {
            Ok(()) => {
                stats.packages_removed += to_remove.len();
                transcript.success(format!("Uninstalled {}", to_remove.join(", ")));
            }
            Err(e) => {
                transcript.warning(format!(
                    "Could not uninstall {}: {}",
                    to_remove.join(", "),
                    e
                ));
                transcript.plain(format!("Uninstall them manually: {}", to_remove.join(" ")));
            }
        }
    }

    /// Copies `id` back to the pool and deletes the classified file when
    /// that is safe. Returns whether the classified file is gone.
    fn restore(
        &self,
        id: &ComponentId,
        category: Category,
        transcript: &mut Transcript,
        stats: &mut OperationStats,
    ) -> bool {
        let relocator = self.relocator();
        match relocator.move_to_pool(id, category) {
            Ok(RestoreOutcome::Copied) => {
                transcript.success(format!("Restored {} → {}/", id, POOL_DIR))
            }
            Ok(RestoreOutcome::AlreadyIdentical) => transcript.info(format!(
                "{} already holds an identical copy",
                self.file_label(POOL_DIR, id)
            )),
            Ok(RestoreOutcome::SkippedConflict) => {
                transcript.warning(format!(
                    "{} already exists with different content; leaving {} in place",
                    self.file_label(POOL_DIR, id),
                    self.file_label(category, id)
                ));
                return false;
            }
            Err(e) => {
                transcript.error(format!("Could not restore {}: {}", id, e));
                return false;
            }
        }

        match relocator.delete_classified(id, category) {
            Ok(()) => {
                stats.restored += 1;
                true
            }
            Err(e) => {
                transcript.error(e.to_string());
                false
            }
        }
    }

    fn uninstall_component(
        &self,
        id: &ComponentId,
        transcript: &mut Transcript,
        stats: &mut OperationStats,
    ) {
        transcript.header(format!("Uninstalling {}", id));
        let categories: Vec<Category> = self
            .relocator()
            .locate(id)
            .into_iter()
            .filter_map(|location| match location {
                Location::Classified(category) => Some(category),
                Location::Pool => None,
            })
            .collect();

        if categories.is_empty() {
            if self.layout.pool_file(id).is_file() {
                transcript.info(format!("{} is already in {}/", id, POOL_DIR));
            } else {
                transcript.error(format!("{} not found in any category folder", id));
                return;
            }
        }

        let indexes = self.indexes();
        let mut restored_any = categories.is_empty();
        for category in categories {
            if !self.restore(id, category, transcript, stats) {
                continue;
            }
            restored_any = true;
            let index_path = self.layout.category_index(category);
            match indexes.remove_export(&index_path, id) {
                Ok(true) => {
                    stats.exports_removed += 1;
                    transcript.success(format!(
                        "Removed {} export from {}/{}",
                        id,
                        category,
                        self.layout.index_file_name()
                    ));
                }
                Ok(false) => {}
                Err(e) => transcript.warning(format!(
                    "Could not update {}/{}: {}",
                    category,
                    self.layout.index_file_name(),
                    e
                )),
            }
        }

        if !restored_any {
            transcript.warning(format!("Imports of {} were left unchanged", id));
            return;
        }

        transcript.header("Updating imports");
        let scope = BTreeSet::from([id.clone()]);
        let report = self.rewriter().run(
            &RewriteMode::Declassify { scope: Some(scope) },
            transcript,
        );
        stats.absorb(&report);
    }

    fn uninstall_all(&self, transcript: &mut Transcript, stats: &mut OperationStats) {
        transcript.header("Uninstalling atomic structure");
        let relocator = self.relocator();
        let indexes = self.indexes();

        let classified = relocator.classified_components();
        if classified.is_empty() {
            transcript.info("No classified components found");
        }
        for (id, category) in &classified {
            if self.restore(id, *category, transcript, stats)
                && matches!(
                    indexes.remove_export(&self.layout.category_index(*category), id),
                    Ok(true)
                )
            {
                stats.exports_removed += 1;
            }
        }

        let mut all_removed = true;
        for category in Category::ALL {
            let existed = self.layout.category_dir(category).exists();
            match relocator.remove_category_dir(category) {
                Ok(leftovers) if leftovers.is_empty() => {
                    if existed {
                        transcript.success(format!("Removed {}/", category));
                    }
                }
                Ok(leftovers) => {
                    all_removed = false;
                    transcript.warning(format!(
                        "Kept {}/: it still holds {}",
                        category,
                        leftovers.join(", ")
                    ));
                }
                Err(e) => {
                    all_removed = false;
                    transcript.error(e.to_string());
                }
            }
        }

        if all_removed {
            indexes.strip_root_category_exports(transcript);
        } else {
            transcript.info(format!(
                "Kept category re-exports in the main {}",
                self.layout.index_file_name()
            ));
        }

        transcript.header("Updating imports");
        let report = self
            .rewriter()
            .run(&RewriteMode::Declassify { scope: None }, transcript);
        stats.absorb(&report);

        transcript.header("Cleaning package.json");
        self.scrub_scripts(transcript);
    }

    fn scrub_scripts(&self, transcript: &mut Transcript) {
        let mut manifest = match Manifest::load(&self.layout.manifest_path()) {
            Ok(manifest) => manifest,
            Err(ManifestError::NotFound(_)) => {
                transcript.info("No package.json found; no scripts to remove");
                return;
            }
            Err(e) => {
                transcript.error(format!("Could not clean package.json scripts: {}", e));
                return;
            }
        };

        let removed = manifest.remove_scripts(&SCRUBBED_SCRIPTS);
        if removed.is_empty() {
            transcript.info("No atomize scripts found in package.json");
            return;
        }
        match manifest.save() {
            Ok(()) => {
                transcript.success(format!(
                    "Removed {} script(s) from package.json: {}",
                    removed.len(),
                    removed.join(", ")
                ));
                transcript.info("Dependencies were left untouched");
            }
            Err(e) => transcript.error(format!("Could not clean package.json scripts: {}", e)),
        }
    }
}

fn list_dir(path: &Path) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

/// Component file relocation between the pool and category folders.
///
/// Moving forward (pool → category) is a rename that creates the category
/// folder on demand. Moving back (category → pool) is a copy that never
/// overwrites; deleting the classified original is a separate step the
/// caller issues once the copy is verified.
use crate::classification::{Category, ComponentId};
use crate::config::ProjectLayout;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Where a component file currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Pool,
    Classified(Category),
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Pool => f.write_str(crate::classification::POOL_DIR),
            Location::Classified(category) => write!(f, "{}", category),
        }
    }
}

/// A completed forward move.
#[derive(Debug, Clone)]
pub struct Relocation {
    pub id: ComponentId,
    pub category: Category,
    pub new_path: PathBuf,
    /// True when a file already sat at `new_path` and was replaced.
    pub replaced_existing: bool,
}

/// Result of copying a classified file back into the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The pool copy was written.
    Copied,
    /// The pool already held a byte-identical file.
    AlreadyIdentical,
    /// The pool held a different file with the same name; nothing was written.
    SkippedConflict,
}

impl RestoreOutcome {
    /// Whether the classified original may now be deleted.
    pub fn safe_to_delete_source(&self) -> bool {
        !matches!(self, RestoreOutcome::SkippedConflict)
    }
}

/// What happened to the pool folder during cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolCleanup {
    AlreadyAbsent,
    Removed,
    /// Kept because it holds files that are not components.
    KeptNonComponents(Vec<String>),
    /// Kept because component files are still waiting to be organized.
    KeptComponents(Vec<String>),
}

/// Errors that can occur while relocating component files.
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to delete {}: {source}", path.display())]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for relocation operations.
pub type RelocateResult<T> = Result<T, RelocateError>;

/// Moves component files between the pool and category folders.
pub struct FileRelocator<'a> {
    layout: &'a ProjectLayout,
}

impl<'a> FileRelocator<'a> {
    pub fn new(layout: &'a ProjectLayout) -> Self {
        Self { layout }
    }

    /// Moves `id` from the pool into `category`, creating the folder if needed.
    ///
    /// An existing file at the destination is replaced; the returned
    /// [`Relocation`] says so, and the caller logs it.
    ///
    /// # Errors
    ///
    /// `SourceNotFound` when the pool file is missing, otherwise the I/O
    /// failure that stopped the move.
    pub fn move_to_category(
        &self,
        id: &ComponentId,
        category: Category,
    ) -> RelocateResult<Relocation> {
        let source = self.layout.pool_file(id);
        if !source.exists() {
            return Err(RelocateError::SourceNotFound(source));
        }

        let category_path = self.layout.category_dir(category);
        ensure_dir(&category_path)?;

        let destination = self.layout.category_file(category, id);
        let replaced_existing = destination.exists();

        fs::rename(&source, &destination).map_err(|e| RelocateError::MoveFailed {
            from: source.clone(),
            to: destination.clone(),
            source: e,
        })?;
        debug!(from = %source.display(), to = %destination.display(), "moved component");

        Ok(Relocation {
            id: id.clone(),
            category,
            new_path: destination,
            replaced_existing,
        })
    }

    /// Copies `id` from `category` back into the pool without overwriting.
    ///
    /// The classified file is left in place; call [`Self::delete_classified`]
    /// once [`RestoreOutcome::safe_to_delete_source`] holds.
    pub fn move_to_pool(&self, id: &ComponentId, category: Category) -> RelocateResult<RestoreOutcome> {
        let source = self.layout.category_file(category, id);
        if !source.exists() {
            return Err(RelocateError::SourceNotFound(source));
        }

        let pool = self.layout.pool_dir();
        ensure_dir(&pool)?;

        let destination = self.layout.pool_file(id);
        if destination.exists() {
            return if same_content(&source, &destination) {
                Ok(RestoreOutcome::AlreadyIdentical)
            } else {
                Ok(RestoreOutcome::SkippedConflict)
            };
        }

        fs::copy(&source, &destination).map_err(|e| RelocateError::CopyFailed {
            from: source.clone(),
            to: destination.clone(),
            source: e,
        })?;
        debug!(from = %source.display(), to = %destination.display(), "copied component to pool");
        Ok(RestoreOutcome::Copied)
    }

    /// Deletes the classified copy of `id`.
    pub fn delete_classified(&self, id: &ComponentId, category: Category) -> RelocateResult<()> {
        delete_file(&self.layout.category_file(category, id))
    }

    /// Deletes the pool copy of `id`.
    pub fn delete_from_pool(&self, id: &ComponentId) -> RelocateResult<()> {
        delete_file(&self.layout.pool_file(id))
    }

    /// Every location currently holding a file for `id`, categories first.
    pub fn locate(&self, id: &ComponentId) -> Vec<Location> {
        let mut found: Vec<Location> = Category::ALL
            .into_iter()
            .filter(|category| self.layout.category_file(*category, id).is_file())
            .map(Location::Classified)
            .collect();
        if self.layout.pool_file(id).is_file() {
            found.push(Location::Pool);
        }
        found
    }

    /// The category folder holding `id`, if any.
    pub fn find_classified(&self, id: &ComponentId) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| self.layout.category_file(*category, id).is_file())
    }

    /// Component ids waiting in the pool, sorted.
    pub fn pool_components(&self) -> RelocateResult<Vec<ComponentId>> {
        self.components_in(&self.layout.pool_dir())
    }

    /// Component ids in a category folder, sorted.
    pub fn category_components(&self, category: Category) -> RelocateResult<Vec<ComponentId>> {
        self.components_in(&self.layout.category_dir(category))
    }

    /// Every classified component with its category.
    pub fn classified_components(&self) -> Vec<(ComponentId, Category)> {
        Category::ALL
            .into_iter()
            .flat_map(|category| {
                self.category_components(category)
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |id| (id, category))
            })
            .collect()
    }

    /// File names in the pool that end with the component extension but
    /// are not valid ids.
    pub fn unrecognized_pool_files(&self) -> Vec<String> {
        self.file_names(&self.layout.pool_dir())
            .unwrap_or_default()
            .into_iter()
            .filter(|name| {
                name.ends_with(&format!(".{}", self.layout.extension()))
                    && ComponentId::from_file_name(name, self.layout.extension()).is_none()
            })
            .collect()
    }

    /// Removes the pool folder once no component files remain in it.
    pub fn cleanup_pool(&self) -> RelocateResult<PoolCleanup> {
        let pool = self.layout.pool_dir();
        if !pool.exists() {
            return Ok(PoolCleanup::AlreadyAbsent);
        }

        let remaining = self.file_names(&pool)?;
        if remaining.is_empty() {
            fs::remove_dir(&pool).map_err(|e| RelocateError::DeleteFailed {
                path: pool.clone(),
                source: e,
            })?;
            return Ok(PoolCleanup::Removed);
        }

        let suffix = format!(".{}", self.layout.extension());
        let components: Vec<String> = remaining
            .iter()
            .filter(|name| name.ends_with(&suffix))
            .cloned()
            .collect();
        if components.is_empty() {
            Ok(PoolCleanup::KeptNonComponents(remaining))
        } else {
            Ok(PoolCleanup::KeptComponents(components))
        }
    }

    /// Deletes a category folder if it holds nothing but its index file.
    ///
    /// Returns the names of files that kept the folder alive.
    pub fn remove_category_dir(&self, category: Category) -> RelocateResult<Vec<String>> {
        let dir = self.layout.category_dir(category);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let leftovers: Vec<String> = self
            .file_names(&dir)?
            .into_iter()
            .filter(|name| name != self.layout.index_file_name())
            .collect();
        if !leftovers.is_empty() {
            return Ok(leftovers);
        }

        fs::remove_dir_all(&dir).map_err(|e| RelocateError::DeleteFailed {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Vec::new())
    }

    fn components_in(&self, dir: &Path) -> RelocateResult<Vec<ComponentId>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids: Vec<ComponentId> = self
            .file_names(dir)?
            .iter()
            .filter_map(|name| ComponentId::from_file_name(name, self.layout.extension()))
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn file_names(&self, dir: &Path) -> RelocateResult<Vec<String>> {
        let entries = fs::read_dir(dir).map_err(|e| RelocateError::ReadDirFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        Ok(names)
    }
}

fn ensure_dir(path: &Path) -> RelocateResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| RelocateError::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

fn delete_file(path: &Path) -> RelocateResult<()> {
    if !path.exists() {
        return Err(RelocateError::SourceNotFound(path.to_path_buf()));
    }
    fs::remove_file(path).map_err(|e| RelocateError::DeleteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

fn same_content(a: &Path, b: &Path) -> bool {
    match (fs::read(a), fs::read(b)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use tempfile::TempDir;

    fn id(raw: &str) -> ComponentId {
        ComponentId::parse(raw).unwrap()
    }

    fn setup() -> (TempDir, ProjectLayout) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let layout = ProjectConfig::default().compile(temp_dir.path()).unwrap().0;
        fs::create_dir_all(layout.pool_dir()).expect("Failed to create pool");
        (temp_dir, layout)
    }

    #[test]
    fn test_move_to_category_creates_directory() {
        let (_temp_dir, layout) = setup();
        fs::write(layout.pool_file(&id("button")), "button").unwrap();

        let relocator = FileRelocator::new(&layout);
        let relocation = relocator
            .move_to_category(&id("button"), Category::Atoms)
            .expect("Failed to move file");

        assert!(layout.category_dir(Category::Atoms).is_dir());
        assert!(!layout.pool_file(&id("button")).exists());
        assert!(relocation.new_path.exists());
        assert!(!relocation.replaced_existing);
    }

    #[test]
    fn test_move_to_category_missing_source() {
        let (_temp_dir, layout) = setup();
        let relocator = FileRelocator::new(&layout);
        let result = relocator.move_to_category(&id("button"), Category::Atoms);
        assert!(matches!(result, Err(RelocateError::SourceNotFound(_))));
    }

    #[test]
    fn test_move_to_category_replaces_existing() {
        let (_temp_dir, layout) = setup();
        fs::create_dir_all(layout.category_dir(Category::Atoms)).unwrap();
        fs::write(layout.category_file(Category::Atoms, &id("button")), "old").unwrap();
        fs::write(layout.pool_file(&id("button")), "new").unwrap();

        let relocation = FileRelocator::new(&layout)
            .move_to_category(&id("button"), Category::Atoms)
            .unwrap();

        assert!(relocation.replaced_existing);
        let content = fs::read_to_string(layout.category_file(Category::Atoms, &id("button"))).unwrap();
        assert_eq!(content, "new");
    }

    #[test]
    fn test_move_to_pool_copies_and_keeps_source() {
        let (_temp_dir, layout) = setup();
        fs::remove_dir(layout.pool_dir()).unwrap();
        fs::create_dir_all(layout.category_dir(Category::Organisms)).unwrap();
        fs::write(layout.category_file(Category::Organisms, &id("card")), "card").unwrap();

        let relocator = FileRelocator::new(&layout);
        let outcome = relocator.move_to_pool(&id("card"), Category::Organisms).unwrap();

        assert_eq!(outcome, RestoreOutcome::Copied);
        assert!(layout.pool_file(&id("card")).exists());
        assert!(layout.category_file(Category::Organisms, &id("card")).exists());
    }

    #[test]
    fn test_move_to_pool_never_overwrites() {
        let (_temp_dir, layout) = setup();
        fs::create_dir_all(layout.category_dir(Category::Organisms)).unwrap();
        fs::write(layout.category_file(Category::Organisms, &id("card")), "classified").unwrap();
        fs::write(layout.pool_file(&id("card")), "user edits").unwrap();

        let relocator = FileRelocator::new(&layout);
        let outcome = relocator.move_to_pool(&id("card"), Category::Organisms).unwrap();

        assert_eq!(outcome, RestoreOutcome::SkippedConflict);
        assert!(!outcome.safe_to_delete_source());
        assert_eq!(fs::read_to_string(layout.pool_file(&id("card"))).unwrap(), "user edits");
    }

    #[test]
    fn test_move_to_pool_identical_is_safe() {
        let (_temp_dir, layout) = setup();
        fs::create_dir_all(layout.category_dir(Category::Atoms)).unwrap();
        fs::write(layout.category_file(Category::Atoms, &id("badge")), "same").unwrap();
        fs::write(layout.pool_file(&id("badge")), "same").unwrap();

        let outcome = FileRelocator::new(&layout)
            .move_to_pool(&id("badge"), Category::Atoms)
            .unwrap();
        assert_eq!(outcome, RestoreOutcome::AlreadyIdentical);
        assert!(outcome.safe_to_delete_source());
    }

    #[test]
    fn test_cleanup_pool_variants() {
        let (_temp_dir, layout) = setup();
        let relocator = FileRelocator::new(&layout);

        fs::write(layout.pool_dir().join("button.tsx"), "").unwrap();
        assert_eq!(
            relocator.cleanup_pool().unwrap(),
            PoolCleanup::KeptComponents(vec!["button.tsx".to_string()])
        );

        fs::remove_file(layout.pool_dir().join("button.tsx")).unwrap();
        fs::write(layout.pool_dir().join("use-toast.ts"), "").unwrap();
        assert_eq!(
            relocator.cleanup_pool().unwrap(),
            PoolCleanup::KeptNonComponents(vec!["use-toast.ts".to_string()])
        );

        fs::remove_file(layout.pool_dir().join("use-toast.ts")).unwrap();
        assert_eq!(relocator.cleanup_pool().unwrap(), PoolCleanup::Removed);
        assert!(!layout.pool_dir().exists());
        assert_eq!(relocator.cleanup_pool().unwrap(), PoolCleanup::AlreadyAbsent);
    }

    #[test]
    fn test_locate_and_listing() {
        let (_temp_dir, layout) = setup();
        fs::create_dir_all(layout.category_dir(Category::Atoms)).unwrap();
        fs::write(layout.category_file(Category::Atoms, &id("button")), "").unwrap();
        fs::write(layout.category_index(Category::Atoms), "").unwrap();
        fs::write(layout.pool_file(&id("button")), "").unwrap();
        fs::write(layout.pool_file(&id("card")), "").unwrap();
        fs::write(layout.pool_dir().join("Weird.tsx"), "").unwrap();

        let relocator = FileRelocator::new(&layout);
        assert_eq!(
            relocator.locate(&id("button")),
            vec![Location::Classified(Category::Atoms), Location::Pool]
        );
        assert_eq!(relocator.find_classified(&id("card")), None);
        assert_eq!(relocator.pool_components().unwrap(), vec![id("button"), id("card")]);
        assert_eq!(relocator.category_components(Category::Atoms).unwrap(), vec![id("button")]);
        assert_eq!(relocator.unrecognized_pool_files(), vec!["Weird.tsx".to_string()]);
    }

    #[test]
    fn test_remove_category_dir_keeps_leftovers() {
        let (_temp_dir, layout) = setup();
        let relocator = FileRelocator::new(&layout);
        fs::create_dir_all(layout.category_dir(Category::Molecules)).unwrap();
        fs::write(layout.category_index(Category::Molecules), "").unwrap();
        fs::write(layout.category_file(Category::Molecules, &id("tabs")), "").unwrap();

        let leftovers = relocator.remove_category_dir(Category::Molecules).unwrap();
        assert_eq!(leftovers, vec!["tabs.tsx".to_string()]);
        assert!(layout.category_dir(Category::Molecules).exists());

        relocator.delete_classified(&id("tabs"), Category::Molecules).unwrap();
        assert!(relocator.remove_category_dir(Category::Molecules).unwrap().is_empty());
        assert!(!layout.category_dir(Category::Molecules).exists());
    }
}

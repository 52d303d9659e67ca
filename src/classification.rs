/// Component classification for atomic-design folders.
///
/// This module maps component identifiers to one of the three atomic-design
/// categories (atoms, molecules, organisms), records which components expose
/// several named symbols instead of a single wildcard-reachable module, and
/// lists the npm packages each component pulls in.
///
/// # Examples
///
/// ```
/// use atomize::classification::{Category, ClassificationTable, ComponentId};
///
/// let table = ClassificationTable::global();
/// let button = ComponentId::parse("button").unwrap();
/// assert_eq!(table.category_of(&button), Category::Atoms);
///
/// let unknown = ComponentId::parse("fancy-widget").unwrap();
/// assert_eq!(table.category_of(&unknown), Category::Molecules);
/// ```
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Folder name of the flat, unclassified pool the scaffolder writes into.
pub const POOL_DIR: &str = "ui";

/// Category used for identifiers missing from the table.
pub const DEFAULT_CATEGORY: Category = Category::Molecules;

/// One of the three atomic-design buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Basic building blocks (buttons, inputs, labels).
    Atoms,
    /// Combinations of atoms (dialogs, dropdowns, form fields).
    Molecules,
    /// Complex structures (cards, tables, navigation).
    Organisms,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 3] = [Category::Atoms, Category::Molecules, Category::Organisms];

    /// Returns the folder name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomize::classification::Category;
    ///
    /// assert_eq!(Category::Atoms.dir_name(), "atoms");
    /// assert_eq!(Category::Organisms.dir_name(), "organisms");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Atoms => "atoms",
            Category::Molecules => "molecules",
            Category::Organisms => "organisms",
        }
    }

    /// Header comment written at the top of a freshly created index file.
    pub fn index_header(&self) -> &'static str {
        match self {
            Category::Atoms => "// Atoms - Basic UI building blocks (buttons, inputs, labels, etc.)",
            Category::Molecules => {
                "// Molecules - Combined atomic components (form fields, dialogs, dropdowns, etc.)"
            }
            Category::Organisms => {
                "// Organisms - Complex UI structures (cards, tables, navigation, etc.)"
            }
        }
    }

    /// Human-readable heading used by the mapping listing.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Atoms => "ATOMS (Basic Elements)",
            Category::Molecules => "MOLECULES (Combined Components)",
            Category::Organisms => "ORGANISMS (Complex Structures)",
        }
    }

    /// Parses a folder name back into a category.
    pub fn from_dir_name(name: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.dir_name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Returned when a string is not a lowercase, hyphenated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid component id '{0}': expected lowercase words joined by hyphens")]
pub struct InvalidComponentId(pub String);

/// A lowercase, hyphenated component identifier such as `dropdown-menu`.
///
/// Used both as the file stem on disk and as the key into the classification
/// table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Validates and wraps an identifier.
    ///
    /// ```
    /// use atomize::classification::ComponentId;
    ///
    /// assert!(ComponentId::parse("radio-group").is_ok());
    /// assert!(ComponentId::parse("RadioGroup").is_err());
    /// assert!(ComponentId::parse("radio--group").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, InvalidComponentId> {
        let valid = !raw.is_empty()
            && raw.split('-').all(|word| {
                !word.is_empty()
                    && word
                        .bytes()
                        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            });
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidComponentId(raw.to_string()))
        }
    }

    /// Derives an id from a component file name, provided the extension matches.
    pub fn from_file_name(file_name: &str, extension: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
        Self::parse(stem).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// PascalCase symbol conventionally exported by the component.
    ///
    /// ```
    /// use atomize::classification::ComponentId;
    ///
    /// let id = ComponentId::parse("dropdown-menu").unwrap();
    /// assert_eq!(id.pascal_name(), "DropdownMenu");
    /// ```
    pub fn pascal_name(&self) -> String {
        self.0
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect()
    }

    /// File name on disk for the given extension.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0, extension)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static lookup from component id to category, multi-export symbols and
/// package requirements.
#[derive(Debug, Clone)]
pub struct ClassificationTable {
    categories: BTreeMap<&'static str, Category>,
    multi_exports: BTreeMap<&'static str, Vec<&'static str>>,
    packages: BTreeMap<&'static str, Vec<&'static str>>,
}

static GLOBAL_TABLE: Lazy<ClassificationTable> = Lazy::new(ClassificationTable::new);

impl ClassificationTable {
    /// Creates a table with the standard mappings.
    pub fn new() -> Self {
        let mut table = Self {
            categories: BTreeMap::new(),
            multi_exports: BTreeMap::new(),
            packages: BTreeMap::new(),
        };
        table.populate_standard_mappings();
        table
    }

    /// The process-wide table, built once on first use.
    pub fn global() -> &'static ClassificationTable {
        &GLOBAL_TABLE
    }

    fn populate_standard_mappings(&mut self) {
        for id in [
            "button",
            "input",
            "label",
            "badge",
            "switch",
            "checkbox",
            "radio-group",
            "textarea",
            "progress",
            "skeleton",
            "separator",
            "avatar",
            "slider",
            "toggle",
        ] {
            self.categories.insert(id, Category::Atoms);
        }

        for id in [
            "dialog",
            "drawer",
            "calendar",
            "tabs",
            "select",
            "popover",
            "dropdown-menu",
            "context-menu",
            "menubar",
            "tooltip",
            "hover-card",
            "alert-dialog",
            "accordion",
            "collapsible",
            "toggle-group",
            "date-picker",
            "form",
            "alert",
            "toast",
            "sonner",
            "resizable",
            "command",
        ] {
            self.categories.insert(id, Category::Molecules);
        }

        for id in [
            "card",
            "table",
            "data-table",
            "sheet",
            "navigation-menu",
            "pagination",
            "breadcrumb",
            "sidebar",
            "carousel",
            "chart",
        ] {
            self.categories.insert(id, Category::Organisms);
        }

        self.multi_exports.insert(
            "dialog",
            vec![
                "Dialog",
                "DialogClose",
                "DialogContent",
                "DialogDescription",
                "DialogFooter",
                "DialogHeader",
                "DialogOverlay",
                "DialogPortal",
                "DialogTitle",
                "DialogTrigger",
            ],
        );
        self.multi_exports.insert(
            "drawer",
            vec![
                "Drawer",
                "DrawerPortal",
                "DrawerOverlay",
                "DrawerTrigger",
                "DrawerClose",
                "DrawerContent",
                "DrawerHeader",
                "DrawerFooter",
                "DrawerTitle",
                "DrawerDescription",
            ],
        );

        let radix = [
            ("dialog", "@radix-ui/react-dialog"),
            ("select", "@radix-ui/react-select"),
            ("tooltip", "@radix-ui/react-tooltip"),
            ("popover", "@radix-ui/react-popover"),
            ("dropdown-menu", "@radix-ui/react-dropdown-menu"),
            ("context-menu", "@radix-ui/react-context-menu"),
            ("menubar", "@radix-ui/react-menubar"),
            ("toast", "@radix-ui/react-toast"),
            ("tabs", "@radix-ui/react-tabs"),
            ("accordion", "@radix-ui/react-accordion"),
            ("alert-dialog", "@radix-ui/react-alert-dialog"),
            ("hover-card", "@radix-ui/react-hover-card"),
            ("navigation-menu", "@radix-ui/react-navigation-menu"),
            ("progress", "@radix-ui/react-progress"),
            ("radio-group", "@radix-ui/react-radio-group"),
            ("slider", "@radix-ui/react-slider"),
            ("switch", "@radix-ui/react-switch"),
            ("checkbox", "@radix-ui/react-checkbox"),
            ("separator", "@radix-ui/react-separator"),
            ("collapsible", "@radix-ui/react-collapsible"),
            ("toggle", "@radix-ui/react-toggle"),
            ("toggle-group", "@radix-ui/react-toggle-group"),
            ("avatar", "@radix-ui/react-avatar"),
        ];
        for (id, package) in radix {
            self.packages.insert(id, vec![package]);
        }
        self.packages.insert("drawer", vec!["vaul"]);
        self.packages.insert("calendar", vec!["react-day-picker", "date-fns"]);
        self.packages.insert("date-picker", vec!["react-day-picker", "date-fns"]);
        self.packages.insert("carousel", vec!["embla-carousel-react"]);
        self.packages.insert("chart", vec!["recharts"]);
        self.packages.insert("sonner", vec!["sonner"]);
        self.packages
            .insert("form", vec!["react-hook-form", "@hookform/resolvers", "zod"]);
    }

    /// Returns the category for `id`, or [`DEFAULT_CATEGORY`] when unmapped.
    pub fn category_of(&self, id: &ComponentId) -> Category {
        self.categories
            .get(id.as_str())
            .copied()
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Returns whether `id` has an explicit entry in the table.
    pub fn is_known(&self, id: &ComponentId) -> bool {
        self.categories.contains_key(id.as_str())
    }

    /// Named symbols for components that export more than one thing.
    pub fn multi_export_symbols(&self, id: &ComponentId) -> Option<&[&'static str]> {
        self.multi_exports.get(id.as_str()).map(Vec::as_slice)
    }

    /// npm packages the component depends on. Empty when none are recorded.
    pub fn package_requirements(&self, id: &ComponentId) -> &[&'static str] {
        self.packages
            .get(id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All mapped ids for a category, sorted.
    pub fn components_in(&self, category: Category) -> Vec<&'static str> {
        self.categories
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Multi-export components with their symbol lists, sorted by id.
    pub fn multi_export_entries(&self) -> impl Iterator<Item = (&'static str, &[&'static str])> {
        self.multi_exports
            .iter()
            .map(|(id, symbols)| (*id, symbols.as_slice()))
    }

    /// Finds the component that owns an exported symbol.
    ///
    /// Registered multi-export symbols map straight to their component.
    /// Otherwise the owner is the candidate whose PascalCase name is the
    /// longest prefix of `symbol` ending on a word boundary, so `CardHeader`
    /// belongs to `card` and `ToggleGroupItem` to `toggle-group`, not `toggle`.
    /// `extra` lets callers add an id that is not in the table.
    pub fn symbol_owner(&self, symbol: &str, extra: Option<&ComponentId>) -> Option<ComponentId> {
        for (id, symbols) in &self.multi_exports {
            if symbols.contains(&symbol) {
                return ComponentId::parse(id).ok();
            }
        }

        let candidates = self
            .categories
            .keys()
            .filter_map(|id| ComponentId::parse(id).ok())
            .chain(extra.cloned());

        let mut best: Option<(usize, ComponentId)> = None;
        for candidate in candidates {
            let pascal = candidate.pascal_name();
            let Some(rest) = symbol.strip_prefix(pascal.as_str()) else {
                continue;
            };
            let on_boundary = rest
                .chars()
                .next()
                .is_none_or(|c| c.is_ascii_uppercase());
            if on_boundary && best.as_ref().is_none_or(|(len, _)| pascal.len() > *len) {
                best = Some((pascal.len(), candidate));
            }
        }
        best.map(|(_, id)| id)
    }
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ComponentId {
        ComponentId::parse(raw).unwrap()
    }

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Atoms.dir_name(), "atoms");
        assert_eq!(Category::Molecules.dir_name(), "molecules");
        assert_eq!(Category::Organisms.dir_name(), "organisms");
        assert_eq!(Category::from_dir_name("molecules"), Some(Category::Molecules));
        assert_eq!(Category::from_dir_name("ui"), None);
    }

    #[test]
    fn test_category_of_known_components() {
        let table = ClassificationTable::default();
        assert_eq!(table.category_of(&id("button")), Category::Atoms);
        assert_eq!(table.category_of(&id("dialog")), Category::Molecules);
        assert_eq!(table.category_of(&id("dropdown-menu")), Category::Molecules);
        assert_eq!(table.category_of(&id("card")), Category::Organisms);
        assert_eq!(table.category_of(&id("data-table")), Category::Organisms);
    }

    #[test]
    fn test_category_of_unknown_defaults_to_molecules() {
        let table = ClassificationTable::default();
        assert_eq!(table.category_of(&id("fancy-widget")), DEFAULT_CATEGORY);
        assert!(!table.is_known(&id("fancy-widget")));
    }

    #[test]
    fn test_category_of_is_deterministic() {
        let table = ClassificationTable::global();
        for category in Category::ALL {
            for raw in table.components_in(category) {
                let component = id(raw);
                assert_eq!(table.category_of(&component), category);
                assert_eq!(table.category_of(&component), category);
            }
        }
    }

    #[test]
    fn test_table_sizes() {
        let table = ClassificationTable::default();
        assert_eq!(table.components_in(Category::Atoms).len(), 14);
        assert_eq!(table.components_in(Category::Molecules).len(), 22);
        assert_eq!(table.components_in(Category::Organisms).len(), 10);
    }

    #[test]
    fn test_multi_export_symbols() {
        let table = ClassificationTable::default();
        let dialog = table.multi_export_symbols(&id("dialog")).unwrap();
        assert_eq!(dialog.len(), 10);
        assert_eq!(dialog[0], "Dialog");
        assert_eq!(table.multi_export_symbols(&id("drawer")).unwrap().len(), 10);
        assert!(table.multi_export_symbols(&id("button")).is_none());
    }

    #[test]
    fn test_package_requirements() {
        let table = ClassificationTable::default();
        assert_eq!(
            table.package_requirements(&id("form")),
            &["react-hook-form", "@hookform/resolvers", "zod"]
        );
        assert!(table.package_requirements(&id("button")).is_empty());
    }

    #[test]
    fn test_component_id_validation() {
        assert!(ComponentId::parse("button").is_ok());
        assert!(ComponentId::parse("navigation-menu").is_ok());
        assert!(ComponentId::parse("h1").is_ok());
        assert!(ComponentId::parse("").is_err());
        assert!(ComponentId::parse("Button").is_err());
        assert!(ComponentId::parse("-button").is_err());
        assert!(ComponentId::parse("button-").is_err());
        assert!(ComponentId::parse("my_button").is_err());
        assert!(ComponentId::parse("../button").is_err());
    }

    #[test]
    fn test_component_id_from_file_name() {
        assert_eq!(ComponentId::from_file_name("button.tsx", "tsx"), Some(id("button")));
        assert_eq!(ComponentId::from_file_name("index.ts", "tsx"), None);
        assert_eq!(ComponentId::from_file_name("Button.tsx", "tsx"), None);
        assert_eq!(ComponentId::from_file_name("buttontsx", "tsx"), None);
    }

    #[test]
    fn test_symbol_owner_prefers_longest_prefix() {
        let table = ClassificationTable::default();
        assert_eq!(table.symbol_owner("Card", None), Some(id("card")));
        assert_eq!(table.symbol_owner("CardHeader", None), Some(id("card")));
        assert_eq!(table.symbol_owner("Toggle", None), Some(id("toggle")));
        assert_eq!(table.symbol_owner("ToggleGroupItem", None), Some(id("toggle-group")));
        assert_eq!(table.symbol_owner("AlertDialogTitle", None), Some(id("alert-dialog")));
        assert_eq!(table.symbol_owner("AlertTitle", None), Some(id("alert")));
        assert_eq!(table.symbol_owner("Cardinal", None), None);
    }

    #[test]
    fn test_symbol_owner_with_extra_candidate() {
        let table = ClassificationTable::default();
        let extra = id("fancy-widget");
        assert_eq!(table.symbol_owner("FancyWidgetBody", Some(&extra)), Some(extra.clone()));
        assert_eq!(table.symbol_owner("FancyWidgetBody", None), None);
    }
}

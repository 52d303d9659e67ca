//! Tree-wide import path rewriting.
//!
//! A [`RuleSet`] is an ordered list of pure text rules built for one
//! [`RewriteMode`]. [`ImportRewriter`] walks the configured search roots,
//! applies the rule set once per file and writes back only files whose text
//! changed.
//!
//! Recognized path shapes, where `<segment>` is `ui` or a category name:
//!
//! - `<prefix>/<segment>/<id>` (root alias, e.g. `@/components/ui/button`)
//! - `(../)+[components/]<segment>/<id>` (ancestor-relative)
//! - `./<segment>/<id>` (same level)

use crate::classification::{ClassificationTable, ComponentId, POOL_DIR};
use crate::config::{ProjectLayout, ScanFilter};
use crate::output::Transcript;
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Marks removed markup so lines left blank can be dropped afterwards.
const REMOVED: char = '\u{1A}';

const CATEGORY_ALTERNATION: &str = "atoms|molecules|organisms";

/// Which way imports are being moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteMode {
    /// Pool paths → `<prefix>/<category>/<id>` for the ids in scope.
    Classify { scope: BTreeSet<ComponentId> },
    /// Category paths → `<prefix>/ui/<id>`. `None` rewrites every id and
    /// also maps bare category folders to the pool folder.
    Declassify { scope: Option<BTreeSet<ComponentId>> },
    /// Drop imports and markup usages of a deleted component.
    Remove { id: ComponentId },
}

impl RewriteMode {
    fn label(&self) -> &'static str {
        match self {
            RewriteMode::Classify { .. } => "ui",
            RewriteMode::Declassify { .. } => "atomic",
            RewriteMode::Remove { .. } => "component",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathTarget {
    Category,
    Pool,
    PoolFolder,
}

/// One path-retargeting rule.
#[derive(Debug, Clone)]
pub struct PathRule {
    name: &'static str,
    pattern: Regex,
    target: PathTarget,
}

/// Rules that delete references to a removed component.
#[derive(Debug, Clone)]
pub struct RemovalRules {
    id: ComponentId,
    module_imports: Regex,
    barrel_imports: Regex,
}

/// The ordered rules for one rewrite mode.
#[derive(Debug, Clone)]
pub struct RuleSet<'a> {
    table: &'a ClassificationTable,
    prefix: String,
    scope: Option<BTreeSet<ComponentId>>,
    path_rules: Vec<PathRule>,
    removal: Option<RemovalRules>,
}

impl<'a> RuleSet<'a> {
    /// Builds the rules for `mode`. `prefix` is the import alias of the
    /// components folder and `components_dir` its folder name.
    pub fn new(
        mode: &RewriteMode,
        prefix: &str,
        components_dir: &str,
        table: &'a ClassificationTable,
    ) -> Result<Self, regex::Error> {
        let head = r#"\b(?P<kw>from|import)(?P<ws>\s*)(?P<q>["'])"#;
        let alias = regex::escape(prefix);
        let comps = regex::escape(components_dir);
        let id = r#"(?P<id>[^"'/\s]+)"#;

        let mut path_rules = Vec::new();
        let mut removal = None;
        let scope = match mode {
            RewriteMode::Classify { scope } => {
                let pool = regex::escape(POOL_DIR);
                path_rules.push(PathRule {
                    name: "alias-pool",
                    pattern: Regex::new(&format!(r#"{head}{alias}/{pool}/{id}["']"#))?,
                    target: PathTarget::Category,
                });
                path_rules.push(PathRule {
                    name: "ancestor-pool",
                    pattern: Regex::new(&format!(
                        r#"{head}(?:\.\./)+(?:{comps}/)?{pool}/{id}["']"#
                    ))?,
                    target: PathTarget::Category,
                });
                path_rules.push(PathRule {
                    name: "sibling-pool",
                    pattern: Regex::new(&format!(r#"{head}\./{pool}/{id}["']"#))?,
                    target: PathTarget::Category,
                });
                Some(scope.clone())
            }
            RewriteMode::Declassify { scope } => {
                let cats = CATEGORY_ALTERNATION;
                path_rules.push(PathRule {
                    name: "alias-category",
                    pattern: Regex::new(&format!(r#"{head}{alias}/(?:{cats})/{id}["']"#))?,
                    target: PathTarget::Pool,
                });
                if scope.is_none() {
                    path_rules.push(PathRule {
                        name: "alias-category-folder",
                        pattern: Regex::new(&format!(r#"{head}{alias}/(?:{cats})["']"#))?,
                        target: PathTarget::PoolFolder,
                    });
                }
                path_rules.push(PathRule {
                    name: "ancestor-category",
                    pattern: Regex::new(&format!(
                        r#"{head}(?:\.\./)+(?:{comps}/)?(?:{cats})/{id}["']"#
                    ))?,
                    target: PathTarget::Pool,
                });
                path_rules.push(PathRule {
                    name: "sibling-category",
                    pattern: Regex::new(&format!(r#"{head}\./(?:{cats})/{id}["']"#))?,
                    target: PathTarget::Pool,
                });
                scope.clone()
            }
            RewriteMode::Remove { id } => {
                removal = Some(RemovalRules::new(id, &alias, &comps)?);
                None
            }
        };

        Ok(Self {
            table,
            prefix: prefix.to_string(),
            scope,
            path_rules,
            removal,
        })
    }

    /// Names of the rules in application order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.path_rules.iter().map(|rule| rule.name).collect();
        if self.removal.is_some() {
            names.extend(["module-imports", "barrel-imports", "markup"]);
        }
        names
    }

    /// Applies every rule in order.
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.path_rules {
            let updated = rule
                .pattern
                .replace_all(&current, |caps: &Captures| {
                    self.retarget(rule.target, caps)
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if updated != current {
                debug!(rule = rule.name, "rule matched");
                current = updated;
            }
        }

        if let Some(removal) = &self.removal {
            current = removal.apply(&current, self.table);
        }
        current
    }

    fn in_scope(&self, id: &ComponentId) -> bool {
        self.scope.as_ref().is_none_or(|scope| scope.contains(id))
    }

    fn retarget(&self, target: PathTarget, caps: &Captures) -> Option<String> {
        let quote = &caps["q"];
        let head = format!("{}{}{}", &caps["kw"], &caps["ws"], quote);

        let path = match target {
            PathTarget::PoolFolder => format!("{}/{}", self.prefix, POOL_DIR),
            PathTarget::Category | PathTarget::Pool => {
                let id = ComponentId::parse(&caps["id"]).ok()?;
                if !self.in_scope(&id) {
                    return None;
                }
                let segment = match target {
                    PathTarget::Category => self.table.category_of(&id).dir_name(),
                    _ => POOL_DIR,
                };
                format!("{}/{}/{}", self.prefix, segment, id)
            }
        };
        Some(format!("{}{}{}", head, path, quote))
    }
}

impl RemovalRules {
    fn new(id: &ComponentId, alias: &str, comps: &str) -> Result<Self, regex::Error> {
        let segments = format!("{}|{}", regex::escape(POOL_DIR), CATEGORY_ALTERNATION);
        let escaped = regex::escape(id.as_str());

        let module_path = format!(
            r#"(?:{alias}/|(?:\.\./)+(?:{comps}/)?|\./)(?:{segments})/{escaped}"#
        );
        let module_imports = Regex::new(&format!(
            r#"(?m)^[ \t]*import\s*(?P<clause>[^;"'`]*?)\s*(?:from\s*)?["']{module_path}["'][ \t]*;?[ \t]*(?:\r?\n)?"#
        ))?;

        let barrel_path = format!(
            r#"(?:{alias}(?:/(?:{segments}))?|(?:\.\./)+(?:{comps}(?:/(?:{segments}))?|(?:{segments}))|\./(?:{segments}))"#
        );
        let barrel_imports = Regex::new(&format!(
            r#"(?m)^(?P<head>[ \t]*import\s+(?:type\s+)?(?:[A-Za-z_$][\w$]*\s*,\s*)?)\{{(?P<items>[^}}]*)\}}(?P<tail>\s*from\s*["']{barrel_path}["'][ \t]*;?[ \t]*(?:\r?\n)?)"#
        ))?;

        Ok(Self {
            id: id.clone(),
            module_imports,
            barrel_imports,
        })
    }

    fn owns(&self, symbol: &str, table: &ClassificationTable) -> bool {
        table.symbol_owner(symbol, Some(&self.id)).as_ref() == Some(&self.id)
    }

    /// Drops imports of the component and then the markup using them.
    pub fn apply(&self, text: &str, table: &ClassificationTable) -> String {
        let mut bindings: Vec<String> = Vec::new();

        let without_modules = self
            .module_imports
            .replace_all(text, |caps: &Captures| {
                bindings.extend(clause_bindings(&caps["clause"]));
                String::new()
            })
            .into_owned();

        let without_barrels = self
            .barrel_imports
            .replace_all(&without_modules, |caps: &Captures| {
                let items = &caps["items"];
                let mut kept: Vec<&str> = Vec::new();
                let mut removed = 0;
                for entry in items.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                    let (imported, local) = parse_specifier(entry);
                    if self.owns(imported, table) {
                        bindings.push(local.to_string());
                        removed += 1;
                    } else {
                        kept.push(entry);
                    }
                }

                if removed == 0 {
                    return caps[0].to_string();
                }

                let head = &caps["head"];
                let tail = &caps["tail"];
                if kept.is_empty() {
                    let trimmed = head.trim_end();
                    return match trimmed.strip_suffix(',') {
                        Some(default_import) => format!("{}{}", default_import.trim_end(), tail),
                        None => String::new(),
                    };
                }
                format!("{}{}{}", head, format_named_list(items, &kept), tail)
            })
            .into_owned();

        strip_markup(&without_barrels, &bindings)
    }
}

/// Local names bound by an import clause such as `Card, { CardHeader as H }`
/// or `* as Parts`.
pub fn clause_bindings(clause: &str) -> Vec<String> {
    let clause = clause.trim();
    let clause = clause.strip_prefix("type ").map(str::trim).unwrap_or(clause);

    let (outside, inside) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            format!("{}{}", &clause[..open], &clause[close + 1..]),
            Some(&clause[open + 1..close]),
        ),
        _ => (clause.to_string(), None),
    };

    let mut bindings = Vec::new();
    for part in outside.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.strip_prefix('*') {
            Some(namespace) => {
                if let Some(name) = namespace.trim().strip_prefix("as") {
                    bindings.push(name.trim().to_string());
                }
            }
            None => bindings.push(part.to_string()),
        }
    }
    if let Some(inner) = inside {
        for entry in inner.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            bindings.push(parse_specifier(entry).1.to_string());
        }
    }
    bindings
}

/// Splits `type Foo as Bar` into (`Foo`, `Bar`).
fn parse_specifier(entry: &str) -> (&str, &str) {
    let entry = entry.strip_prefix("type ").map(str::trim).unwrap_or(entry);
    match entry.split_once(" as ") {
        Some((imported, local)) => (imported.trim(), local.trim()),
        None => (entry, entry),
    }
}

fn format_named_list(original: &str, kept: &[&str]) -> String {
    if !original.contains('\n') {
        return format!("{{ {} }}", kept.join(", "));
    }
    let indent: String = original
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).collect())
        .unwrap_or_else(|| "  ".to_string());
    let closing_indent: String = original
        .rsplit('\n')
        .next()
        .unwrap_or("")
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();

    let mut list = String::from("{\n");
    for entry in kept {
        list.push_str(&format!("{}{},\n", indent, entry));
    }
    list.push_str(&closing_indent);
    list.push('}');
    list
}

/// Removes `<Name ... />` and `<Name ...>...</Name>` for every binding.
///
/// Attribute values may hold braces, quotes and arrows (`onClick={() => go()}`).
/// Nested elements of the same name are balanced. An opening tag without a
/// matching close is left alone. Lines left holding only whitespace after a
/// removal are dropped.
pub fn strip_markup(text: &str, bindings: &[String]) -> String {
    let mut seen = HashSet::new();
    let mut current = text.to_string();
    let mut touched = false;

    for name in bindings
        .iter()
        .filter(|name| !name.is_empty() && seen.insert(name.as_str()))
    {
        let (updated, removed) = remove_elements(&current, name);
        if removed > 0 {
            touched = true;
            current = updated;
        }
    }

    if !touched {
        return current;
    }

    let mut cleaned = String::with_capacity(current.len());
    for line in current.split_inclusive('\n') {
        let only_removed = line.contains(REMOVED)
            && line.chars().all(|c| c == REMOVED || c.is_whitespace());
        if !only_removed {
            cleaned.push_str(&line.replace(REMOVED, ""));
        }
    }
    cleaned
}

fn remove_elements(text: &str, name: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut removed = 0;
    let mut cursor = 0;
    let mut search = 0;

    while let Some(offset) = text[search..].find('<') {
        let start = search + offset;
        let tag = tag_name(text, start + 1);
        if tag.split('.').next() != Some(name) {
            search = start + 1;
            continue;
        }
        let Some(open) = scan_tag_end(text, start + 1 + tag.len()) else {
            search = start + 1;
            continue;
        };
        let end = if open.self_closing {
            Some(open.end)
        } else {
            find_closing(text, open.end, tag)
        };
        match end {
            Some(end) => {
                out.push_str(&text[cursor..start]);
                out.push(REMOVED);
                cursor = end;
                search = end;
                removed += 1;
            }
            None => {
                debug!(tag = %tag, "no closing tag; element left in place");
                search = open.end;
            }
        }
    }

    out.push_str(&text[cursor..]);
    (out, removed)
}

/// The JSX element name starting at `from`, member chains included.
fn tag_name(text: &str, from: usize) -> &str {
    let rest = &text[from..];
    let len = rest
        .bytes()
        .position(|b| !(b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'.')))
        .unwrap_or(rest.len());
    &rest[..len]
}

struct TagEnd {
    end: usize,
    self_closing: bool,
}

/// Finds the `>` closing an opening tag, skipping braces and quoted text.
fn scan_tag_end(text: &str, from: usize) -> Option<TagEnd> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut last = 0u8;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => {
                    return Some(TagEnd {
                        end: i + 1,
                        self_closing: last == b'/',
                    });
                }
                b'<' if depth == 0 => return None,
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            last = b;
        }
        i += 1;
    }
    None
}

/// End of the `</tag>` balancing an element whose opening tag ends at `from`.
fn find_closing(text: &str, from: usize, tag: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut search = from;

    while let Some(offset) = text[search..].find('<') {
        let lt = search + offset;
        if text[lt + 1..].starts_with('/') {
            let name_start = lt + 2;
            if tag_name(text, name_start) == tag {
                let after = &text[name_start + tag.len()..];
                let trimmed = after.trim_start();
                if trimmed.starts_with('>') {
                    depth -= 1;
                    let end = name_start + tag.len() + (after.len() - trimmed.len()) + 1;
                    if depth == 0 {
                        return Some(end);
                    }
                    search = end;
                    continue;
                }
            }
        } else if tag_name(text, lt + 1) == tag {
            if let Some(open) = scan_tag_end(text, lt + 1 + tag.len()) {
                if !open.self_closing {
                    depth += 1;
                }
                search = open.end;
                continue;
            }
        }
        search = lt + 1;
    }
    None
}

/// Counts from one tree-wide pass.
#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    pub roots: Vec<PathBuf>,
    pub files_scanned: usize,
    pub files_updated: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

/// Walks the search roots and rewrites import paths in place.
pub struct ImportRewriter<'a> {
    layout: &'a ProjectLayout,
    filter: &'a ScanFilter,
    table: &'a ClassificationTable,
}

impl<'a> ImportRewriter<'a> {
    pub fn new(
        layout: &'a ProjectLayout,
        filter: &'a ScanFilter,
        table: &'a ClassificationTable,
    ) -> Self {
        Self {
            layout,
            filter,
            table,
        }
    }

    /// Builds the rule set for `mode` using the project's alias.
    pub fn rules(&self, mode: &RewriteMode) -> Result<RuleSet<'a>, regex::Error> {
        RuleSet::new(
            mode,
            self.layout.import_prefix(),
            self.layout.components_dir_name(),
            self.table,
        )
    }

    /// Configured roots that exist on disk.
    pub fn search_roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        for root in self.filter.roots() {
            let path: PathBuf = self.layout.project_root().join(root).components().collect();
            if path.is_dir() && !roots.contains(&path) {
                roots.push(path);
            }
        }
        roots
    }

    /// Every source file under the search roots, deduplicated and sorted.
    ///
    /// The components folder is left out of the pool-to-category pass
    /// unless the configuration asks for it.
    pub fn collect_files(&self, mode: &RewriteMode) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
        let skip_components =
            matches!(mode, RewriteMode::Classify { .. }) && !self.filter.rewrite_components_dir();
        let components_dir = self.layout.components_dir();

        let mut files = BTreeSet::new();
        let mut errors = Vec::new();
        for root in self.search_roots() {
            let walker = WalkDir::new(&root).into_iter().filter_entry(|entry| {
                if !entry.file_type().is_dir() || entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if self.filter.skips_dir(&name) {
                    return false;
                }
                !(skip_components && entry.path() == components_dir)
            });

            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        let relative = entry
                            .path()
                            .strip_prefix(self.layout.project_root())
                            .unwrap_or(entry.path());
                        if self.filter.accepts_file(relative) {
                            files.insert(entry.into_path());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                        debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                        errors.push((path, e.to_string()));
                    }
                }
            }
        }
        (files.into_iter().collect(), errors)
    }

    /// Rewrites one file. Returns `Ok(true)` when it was changed.
    pub fn rewrite_file(&self, path: &Path, rules: &RuleSet<'_>) -> std::io::Result<bool> {
        let content = fs::read_to_string(path)?;
        let updated = rules.apply(&content);
        if updated == content {
            return Ok(false);
        }
        fs::write(path, updated)?;
        Ok(true)
    }

    /// Runs a full pass for `mode`, logging progress to the transcript.
    pub fn run(&self, mode: &RewriteMode, transcript: &mut Transcript) -> RewriteReport {
        let mut report = RewriteReport::default();

        if matches!(mode, RewriteMode::Classify { scope } if scope.is_empty()) {
            transcript.info("No classified components to update imports for");
            return report;
        }

        let rules = match self.rules(mode) {
            Ok(rules) => rules,
            Err(e) => {
                transcript.error(format!("Could not build rewrite rules: {}", e));
                return report;
            }
        };

        report.roots = self.search_roots();
        if report.roots.is_empty() {
            transcript.info("No common folders found");
            return report;
        }
        let searched: Vec<String> = report
            .roots
            .iter()
            .map(|root| {
                let shown = self.layout.display_relative(root).to_string();
                if shown.is_empty() { ".".to_string() } else { shown }
            })
            .collect();
        transcript.info(format!("Searching in: {}", searched.join(", ")));

        let (files, walk_errors) = self.collect_files(mode);
        for (path, reason) in walk_errors {
            transcript.warning(format!(
                "Skipped {}: {}",
                self.layout.display_relative(&path),
                reason
            ));
            report.failures.push((path, reason));
        }
        transcript.info(format!("Scanning {} files for imports...", files.len()));

        let progress = transcript.progress_bar(files.len() as u64);
        for path in files {
            progress.inc(1);
            match self.rewrite_file(&path, &rules) {
                Ok(changed) => {
                    report.files_scanned += 1;
                    if changed {
                        transcript.success(format!(
                            "Updated imports in {}",
                            self.layout.display_relative(&path)
                        ));
                        report.files_updated.push(path);
                    }
                }
                Err(e) => {
                    transcript.error(format!("Error updating {}: {}", path.display(), e));
                    report.failures.push((path, e.to_string()));
                }
            }
        }
        progress.finish_and_clear();

        transcript.info(format!("Scanned {} files", report.files_scanned));
        if report.files_updated.is_empty() {
            transcript.info(format!("No {} imports found to update", mode.label()));
            if matches!(mode, RewriteMode::Classify { .. }) {
                transcript.plain(format!(
                    "Tip: imports should look like: import {{ Button }} from \"{}/{}/button\"",
                    self.layout.import_prefix(),
                    POOL_DIR
                ));
            }
        } else {
            transcript.success(format!("Updated {} file(s)", report.files_updated.len()));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ComponentId {
        ComponentId::parse(raw).unwrap()
    }

    fn scope(ids: &[&str]) -> BTreeSet<ComponentId> {
        ids.iter().map(|raw| id(raw)).collect()
    }

    fn classify<'a>(table: &'a ClassificationTable, ids: &[&str]) -> RuleSet<'a> {
        RuleSet::new(
            &RewriteMode::Classify { scope: scope(ids) },
            "@/components",
            "components",
            table,
        )
        .unwrap()
    }

    fn declassify<'a>(table: &'a ClassificationTable, ids: Option<&[&str]>) -> RuleSet<'a> {
        RuleSet::new(
            &RewriteMode::Declassify {
                scope: ids.map(scope),
            },
            "@/components",
            "components",
            table,
        )
        .unwrap()
    }

    fn remove<'a>(table: &'a ClassificationTable, raw: &str) -> RuleSet<'a> {
        RuleSet::new(&RewriteMode::Remove { id: id(raw) }, "@/components", "components", table)
            .unwrap()
    }

    #[test]
    fn test_classify_alias_path() {
        let table = ClassificationTable::default();
        let rules = classify(&table, &["card"]);
        assert_eq!(
            rules.apply(r#"import { Card } from "@/components/ui/card";"#),
            r#"import { Card } from "@/components/organisms/card";"#
        );
    }

    #[test]
    fn test_classify_normalizes_relative_shapes() {
        let table = ClassificationTable::default();
        let rules = classify(&table, &["button", "dialog"]);

        assert_eq!(
            rules.apply("import { Button } from '../../components/ui/button';"),
            "import { Button } from '@/components/atoms/button';"
        );
        assert_eq!(
            rules.apply("import { Button } from '../ui/button';"),
            "import { Button } from '@/components/atoms/button';"
        );
        assert_eq!(
            rules.apply(r#"export { Dialog } from "./ui/dialog";"#),
            r#"export { Dialog } from "@/components/molecules/dialog";"#
        );
    }

    #[test]
    fn test_classify_side_effect_import() {
        let table = ClassificationTable::default();
        let rules = classify(&table, &["sonner"]);
        assert_eq!(
            rules.apply(r#"import "@/components/ui/sonner";"#),
            r#"import "@/components/molecules/sonner";"#
        );
    }

    #[test]
    fn test_classify_respects_scope() {
        let table = ClassificationTable::default();
        let rules = classify(&table, &["button"]);
        let text = "import { Card } from \"@/components/ui/card\";\nimport { Button } from \"@/components/ui/button\";\n";
        assert_eq!(
            rules.apply(text),
            "import { Card } from \"@/components/ui/card\";\nimport { Button } from \"@/components/atoms/button\";\n"
        );
    }

    #[test]
    fn test_classify_unknown_id_uses_default_category() {
        let table = ClassificationTable::default();
        let rules = classify(&table, &["fancy-widget"]);
        assert_eq!(
            rules.apply(r#"from "@/components/ui/fancy-widget""#),
            r#"from "@/components/molecules/fancy-widget""#
        );
    }

    #[test]
    fn test_classify_is_idempotent() {
        let table = ClassificationTable::default();
        let rules = classify(&table, &["button", "card"]);
        let text = "import { Button } from \"../ui/button\";\nimport { Card } from \"@/components/ui/card\";\n";
        let once = rules.apply(text);
        assert_eq!(rules.apply(&once), once);
    }

    #[test]
    fn test_classify_ignores_other_modules() {
        let table = ClassificationTable::default();
        let rules = classify(&table, &["button"]);
        let text = "import { cn } from \"@/lib/utils\";\nimport x from \"some-ui/button\";\n";
        assert_eq!(rules.apply(text), text);
    }

    #[test]
    fn test_declassify_all_shapes() {
        let table = ClassificationTable::default();
        let rules = declassify(&table, None);

        assert_eq!(
            rules.apply(r#"import { Button } from "@/components/atoms/button";"#),
            r#"import { Button } from "@/components/ui/button";"#
        );
        assert_eq!(
            rules.apply("import { Card } from '../components/organisms/card';"),
            "import { Card } from '@/components/ui/card';"
        );
        assert_eq!(
            rules.apply(r#"import { Tabs } from "./molecules/tabs";"#),
            r#"import { Tabs } from "@/components/ui/tabs";"#
        );
        assert_eq!(
            rules.apply(r#"import { Button, Input } from "@/components/atoms";"#),
            r#"import { Button, Input } from "@/components/ui";"#
        );
    }

    #[test]
    fn test_declassify_scoped_leaves_folders_and_other_ids() {
        let table = ClassificationTable::default();
        let rules = declassify(&table, Some(&["button"]));
        let text = "import { Button } from \"@/components/atoms/button\";\nimport { Input } from \"@/components/atoms/input\";\nimport { Label } from \"@/components/atoms\";\n";
        assert_eq!(
            rules.apply(text),
            "import { Button } from \"@/components/ui/button\";\nimport { Input } from \"@/components/atoms/input\";\nimport { Label } from \"@/components/atoms\";\n"
        );
    }

    #[test]
    fn test_classify_then_declassify_round_trip() {
        let table = ClassificationTable::default();
        let text = "import { Card } from \"@/components/ui/card\";\nimport { Dialog } from '@/components/ui/dialog';\n";
        let forward = classify(&table, &["card", "dialog"]).apply(text);
        assert_ne!(forward, text);
        assert_eq!(declassify(&table, Some(&["card", "dialog"])).apply(&forward), text);
    }

    #[test]
    fn test_custom_prefix() {
        let table = ClassificationTable::default();
        let rules = RuleSet::new(
            &RewriteMode::Classify { scope: scope(&["button"]) },
            "~/components",
            "components",
            &table,
        )
        .unwrap();
        assert_eq!(
            rules.apply(r#"from "~/components/ui/button""#),
            r#"from "~/components/atoms/button""#
        );
        assert_eq!(rules.apply(r#"from "@/components/ui/button""#), r#"from "@/components/ui/button""#);
    }

    #[test]
    fn test_rule_names() {
        let table = ClassificationTable::default();
        assert_eq!(
            classify(&table, &[]).rule_names(),
            vec!["alias-pool", "ancestor-pool", "sibling-pool"]
        );
        assert_eq!(declassify(&table, Some(&["button"])).rule_names().len(), 3);
        assert_eq!(declassify(&table, None).rule_names().len(), 4);
        assert_eq!(
            remove(&table, "card").rule_names(),
            vec!["module-imports", "barrel-imports", "markup"]
        );
    }

    #[test]
    fn test_remove_drops_module_imports_of_every_style() {
        let table = ClassificationTable::default();
        let rules = remove(&table, "card");
        let text = concat!(
            "import { Button } from \"@/components/atoms/button\";\n",
            "import { Card, CardHeader } from \"@/components/organisms/card\";\n",
            "import CardDefault from '../ui/card';\n",
            "import * as CardParts from \"./organisms/card\";\n",
            "import type { CardProps } from \"@/components/ui/card\";\n",
            "import \"@/components/organisms/card\";\n",
            "import { CardList } from \"@/components/organisms/card-list\";\n",
        );
        assert_eq!(
            rules.apply(text),
            concat!(
                "import { Button } from \"@/components/atoms/button\";\n",
                "import { CardList } from \"@/components/organisms/card-list\";\n",
            )
        );
    }

    #[test]
    fn test_remove_shrinks_barrel_named_list() {
        let table = ClassificationTable::default();
        let rules = remove(&table, "card");
        assert_eq!(
            rules.apply("import { Button, Card, CardContent } from \"@/components\";\n"),
            "import { Button } from \"@/components\";\n"
        );
        assert_eq!(
            rules.apply("import { Card } from '@/components/organisms';\nconst x = 1;\n"),
            "const x = 1;\n"
        );
    }

    #[test]
    fn test_remove_shrinks_multiline_list() {
        let table = ClassificationTable::default();
        let rules = remove(&table, "dialog");
        let text = "import {\n  Button,\n  Dialog,\n  DialogTrigger,\n  AlertDialog,\n} from \"@/components\";\n";
        assert_eq!(
            rules.apply(text),
            "import {\n  Button,\n  AlertDialog,\n} from \"@/components\";\n"
        );
    }

    #[test]
    fn test_remove_keeps_default_import_when_list_empties() {
        let table = ClassificationTable::default();
        let rules = remove(&table, "card");
        assert_eq!(
            rules.apply("import Components, { Card } from \"@/components\";\n"),
            "import Components from \"@/components\";\n"
        );
    }

    #[test]
    fn test_remove_strips_markup_usages() {
        let table = ClassificationTable::default();
        let rules = remove(&table, "card");
        let text = concat!(
            "import { Card, CardHeader } from \"@/components/organisms/card\";\n",
            "import { Button } from \"@/components/atoms/button\";\n",
            "\n",
            "export function Page() {\n",
            "  return (\n",
            "    <main>\n",
            "      <Card className=\"p-4\">\n",
            "        <CardHeader>Title</CardHeader>\n",
            "      </Card>\n",
            "      <Card />\n",
            "      <Button>Go</Button> <CardHeader title=\"x\" />\n",
            "    </main>\n",
            "  );\n",
            "}\n",
        );
        assert_eq!(
            rules.apply(text),
            concat!(
                "import { Button } from \"@/components/atoms/button\";\n",
                "\n",
                "export function Page() {\n",
                "  return (\n",
                "    <main>\n",
                "      <Button>Go</Button> \n",
                "    </main>\n",
                "  );\n",
                "}\n",
            )
        );
    }

    #[test]
    fn test_remove_does_not_touch_similar_components() {
        let table = ClassificationTable::default();
        let rules = remove(&table, "toggle");
        let text = "import { Toggle, ToggleGroup } from \"@/components\";\nconst a = <ToggleGroup />;\n";
        assert_eq!(
            rules.apply(text),
            "import { ToggleGroup } from \"@/components\";\nconst a = <ToggleGroup />;\n"
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let table = ClassificationTable::default();
        let rules = remove(&table, "card");
        let text = "import { Card } from \"@/components/organisms/card\";\nconst a = <Card />;\n";
        let once = rules.apply(text);
        assert_eq!(once, "const a = ;\n");
        assert_eq!(rules.apply(&once), once);
    }

    #[test]
    fn test_clause_bindings() {
        assert_eq!(clause_bindings("Card"), vec!["Card"]);
        assert_eq!(clause_bindings("* as Parts"), vec!["Parts"]);
        assert_eq!(
            clause_bindings("Card, { CardHeader as Header, type CardProps }"),
            vec!["Card", "Header", "CardProps"]
        );
        assert_eq!(clause_bindings("type { CardProps }"), vec!["CardProps"]);
        assert!(clause_bindings("").is_empty());
    }

    #[test]
    fn test_remove_handles_arrow_function_props() {
        let table = ClassificationTable::default();
        let rules = remove(&table, "card");
        let text = concat!(
            "import { Card } from \"@/components/organisms/card\";\n",
            "import { Button } from \"@/components/atoms/button\";\n",
            "const page = (\n",
            "  <main>\n",
            "    <Card onClick={() => go()} />\n",
            "    <Button>Keep me</Button>\n",
            "    <Card title={a > b ? \"x\" : \"y\"}>body</Card>\n",
            "  </main>\n",
            ");\n",
        );
        assert_eq!(
            rules.apply(text),
            concat!(
                "import { Button } from \"@/components/atoms/button\";\n",
                "const page = (\n",
                "  <main>\n",
                "    <Button>Keep me</Button>\n",
                "  </main>\n",
                ");\n",
            )
        );
    }

    #[test]
    fn test_remove_inline_self_closing_with_arrow_prop() {
        let table = ClassificationTable::default();
        let rules = remove(&table, "card");
        let text = "import { Card } from \"@/components/organisms/card\";\nconst a = <Card onClick={() => go()} />;\n";
        assert_eq!(rules.apply(text), "const a = ;\n");
    }

    #[test]
    fn test_strip_markup_balances_nested_tags() {
        let text = "<div>\n  <Card><Card />x<Card>inner</Card></Card>\n  <p>after</p>\n</div>\n";
        assert_eq!(
            strip_markup(text, &["Card".to_string()]),
            "<div>\n  <p>after</p>\n</div>\n"
        );
    }

    #[test]
    fn test_strip_markup_leaves_unclosed_element() {
        let text = "<Card>\n<Button>Keep</Button>\n";
        assert_eq!(strip_markup(text, &["Card".to_string()]), text);
    }

    #[test]
    fn test_strip_markup_quoted_angle_brackets() {
        let text = "<Card label=\"a > b\" note='/>' />\n<span />\n";
        assert_eq!(strip_markup(text, &["Card".to_string()]), "<span />\n");
    }

    #[test]
    fn test_strip_markup_namespace_tags() {
        let text = "<div>\n  <Parts.Card>hi</Parts.Card>\n</div>\n";
        assert_eq!(strip_markup(text, &["Parts".to_string()]), "<div>\n</div>\n");
    }
}

//! Read-only symbol queries over a set of parsed TypeScript modules.
//!
//! [`DeclarationQuery`] is the capability the generator depends on;
//! [`SourceProject`] implements it on top of [`crate::parse`] with a parse
//! cache that lives exactly as long as the project value (one run).

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::parse::{parse_module, ClassDecl, ExportEntry, ImportedName, InterfaceDecl, ModuleSummary};

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE LOADING
// ═══════════════════════════════════════════════════════════════════════════════

pub trait SourceLoader {
    /// File contents, or `None` when the path is not a readable file.
    fn load(&self, path: &Path) -> Option<String>;

    fn is_file(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> Option<String> {
        fs::read_to_string(path).ok()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Sources held in memory, keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), source.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Option<String> {
        self.files.get(&normalize(path)).cloned()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }
}

/// Lexically folds `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// QUERY CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity of a class declaration: its module plus its declared name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId {
    pub module: PathBuf,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Interface,
    Other,
}

/// An exported name resolved through any alias chain to its declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDeclaration {
    pub exported_name: String,
    /// Module that holds the declaration itself.
    pub module: PathBuf,
    /// Name the declaration carries in that module.
    pub local_name: String,
    pub kind: DeclarationKind,
}

pub trait DeclarationQuery {
    /// Exported declarations of `module` in source order (star exports expand
    /// in place). `None` when the module is absent or failed to parse.
    fn exported_declarations(&mut self, module: &Path) -> Option<Vec<ExportedDeclaration>>;

    /// Class declared in `module` under `name`.
    fn class(&mut self, module: &Path, name: &str) -> Option<ClassDecl>;

    /// The class `class` extends, if it can be resolved to a class declaration.
    fn base_class(&mut self, class: &ClassId) -> Option<ClassId>;

    /// Interface declared in `module` under `name`.
    fn interface(&mut self, module: &Path, name: &str) -> Option<InterfaceDecl>;

    fn has_default_export(&mut self, module: &Path) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE PROJECT
// ═══════════════════════════════════════════════════════════════════════════════

/// Candidate suffixes for a relative module specifier, in resolution order.
const MODULE_CANDIDATES: &[&str] = &["", ".ts", ".tsx", ".d.ts", "/index.ts", "/index.tsx"];

pub struct SourceProject<L: SourceLoader> {
    loader: L,
    modules: HashMap<PathBuf, Option<Rc<ModuleSummary>>>,
}

impl SourceProject<FsLoader> {
    pub fn from_fs() -> Self {
        Self::new(FsLoader)
    }
}

impl SourceProject<MemoryLoader> {
    pub fn in_memory(loader: MemoryLoader) -> Self {
        Self::new(loader)
    }
}

impl<L: SourceLoader> SourceProject<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            modules: HashMap::new(),
        }
    }

    /// Parsed summary of `path`, cached including misses.
    pub fn summary(&mut self, path: &Path) -> Option<Rc<ModuleSummary>> {
        let key = normalize(path);
        if let Some(cached) = self.modules.get(&key) {
            return cached.clone();
        }

        let summary = self.loader.load(&key).and_then(|source| {
            match parse_module(&key, &source) {
                Ok(summary) => Some(Rc::new(summary)),
                Err(failure) => {
                    warn!(
                        path = %key.display(),
                        errors = ?failure.messages,
                        "failed to parse module; treating it as absent"
                    );
                    None
                }
            }
        });
        self.modules.insert(key, summary.clone());
        summary
    }

    /// Resolves a relative specifier against the importing module.
    pub fn resolve_module(&self, from: &Path, specifier: &str) -> Option<PathBuf> {
        if !specifier.starts_with('.') {
            return None;
        }
        let base = normalize(&from.parent()?.join(specifier));
        let base = base.to_string_lossy();
        MODULE_CANDIDATES
            .iter()
            .map(|suffix| PathBuf::from(format!("{}{}", base, suffix)))
            .find(|candidate| self.loader.is_file(candidate))
    }

    /// Follows `name` as exported from `module` down to its declaration.
    fn resolve_export(
        &mut self,
        module: &Path,
        name: &str,
        visited: &mut HashSet<(PathBuf, String)>,
    ) -> Option<(PathBuf, String, DeclarationKind)> {
        let module = normalize(module);
        if !visited.insert((module.clone(), name.to_string())) {
            debug!(module = %module.display(), name, "export cycle");
            return None;
        }
        let summary = self.summary(&module)?;

        for entry in &summary.exports {
            match entry {
                ExportEntry::Local { exported, local } if exported == name => {
                    return self.resolve_local(&module, &summary, local, visited);
                }
                ExportEntry::Reexport {
                    exported,
                    imported,
                    source,
                } if exported == name => {
                    let target = self.resolve_module(&module, source)?;
                    return self.resolve_export(&target, imported, visited);
                }
                _ => {}
            }
        }

        if name == "default" {
            return None;
        }
        for entry in &summary.exports {
            if let ExportEntry::Star { source } = entry {
                if let Some(target) = self.resolve_module(&module, source) {
                    if let Some(found) = self.resolve_export(&target, name, visited) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Resolves a name bound at module scope: a declaration or an import.
    fn resolve_local(
        &mut self,
        module: &Path,
        summary: &ModuleSummary,
        local: &str,
        visited: &mut HashSet<(PathBuf, String)>,
    ) -> Option<(PathBuf, String, DeclarationKind)> {
        if summary.class(local).is_some() {
            return Some((module.to_path_buf(), local.to_string(), DeclarationKind::Class));
        }
        if summary.interface(local).is_some() {
            return Some((
                module.to_path_buf(),
                local.to_string(),
                DeclarationKind::Interface,
            ));
        }
        if let Some(import) = summary.import(local) {
            let target = self.resolve_module(module, &import.source)?;
            return match &import.imported {
                ImportedName::Default => self.resolve_export(&target, "default", visited),
                ImportedName::Named(name) => self.resolve_export(&target, name, visited),
                ImportedName::Namespace => {
                    Some((target, local.to_string(), DeclarationKind::Other))
                }
            };
        }
        Some((module.to_path_buf(), local.to_string(), DeclarationKind::Other))
    }

    fn collect_exports(
        &mut self,
        module: &Path,
        seen_modules: &mut HashSet<PathBuf>,
        out: &mut Vec<ExportedDeclaration>,
    ) -> Option<()> {
        let module = normalize(module);
        if !seen_modules.insert(module.clone()) {
            return Some(());
        }
        let summary = self.summary(&module)?;

        for entry in &summary.exports {
            match entry {
                ExportEntry::Local { exported, .. } | ExportEntry::Reexport { exported, .. } => {
                    if out.iter().any(|d| &d.exported_name == exported) {
                        continue;
                    }
                    let resolved = self.resolve_export(&module, exported, &mut HashSet::new());
                    match resolved {
                        Some((decl_module, local_name, kind)) => out.push(ExportedDeclaration {
                            exported_name: exported.clone(),
                            module: decl_module,
                            local_name,
                            kind,
                        }),
                        None => debug!(
                            module = %module.display(),
                            name = %exported,
                            "export does not resolve to a local declaration"
                        ),
                    }
                }
                ExportEntry::Star { source } => {
                    let Some(target) = self.resolve_module(&module, source) else {
                        continue;
                    };
                    let mut star = Vec::new();
                    if self.collect_exports(&target, seen_modules, &mut star).is_some() {
                        for decl in star {
                            if decl.exported_name != "default"
                                && !out.iter().any(|d| d.exported_name == decl.exported_name)
                            {
                                out.push(decl);
                            }
                        }
                    }
                }
            }
        }
        Some(())
    }
}

impl<L: SourceLoader> DeclarationQuery for SourceProject<L> {
    fn exported_declarations(&mut self, module: &Path) -> Option<Vec<ExportedDeclaration>> {
        let mut out = Vec::new();
        self.collect_exports(module, &mut HashSet::new(), &mut out)?;
        Some(out)
    }

    fn class(&mut self, module: &Path, name: &str) -> Option<ClassDecl> {
        self.summary(module)?.class(name).cloned()
    }

    fn base_class(&mut self, class: &ClassId) -> Option<ClassId> {
        let summary = self.summary(&class.module)?;
        let super_name = summary.class(&class.name)?.super_class.clone()?;
        match self.resolve_local(&class.module, &summary, &super_name, &mut HashSet::new())? {
            (module, name, DeclarationKind::Class) => Some(ClassId { module, name }),
            _ => None,
        }
    }

    fn interface(&mut self, module: &Path, name: &str) -> Option<InterfaceDecl> {
        self.summary(module)?.interface(name).cloned()
    }

    fn has_default_export(&mut self, module: &Path) -> bool {
        self.summary(module)
            .map(|summary| summary.has_default_export())
            .unwrap_or(false)
    }
}

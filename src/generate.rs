//! The generation run: one full rebuild of every screen module and the
//! aggregate index.
//!
//! ```text
//! Idle → IndexLoaded → ScreensEnumerated
//!      → { Resolving → Extracting → Routing → Emitting }*   (per screen)
//!      → Aggregated → Formatted → Done
//!                   ↘ Failed      (counted errors at the Aggregated boundary)
//! ```
//!
//! Per-screen gaps skip that screen and never stop the loop. Only unmapped
//! utility methods are counted; they fail the run after every file is written.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::aggregate::IndexAggregator;
use crate::config::GeneratorConfig;
use crate::contract::extract_contract_methods;
use crate::docs_index::DeclarationIndex;
use crate::emit::{emit_screen_module, GeneratedModule, ScreenBinding};
use crate::error::{Diagnostics, GeneratorError, SkipReason};
use crate::format::PostGenerationFormatter;
use crate::inheritance::InheritancePropertyResolver;
use crate::naming::safe_method_name;
use crate::project::{normalize, ClassId, DeclarationQuery};
use crate::screens::{collect_screen_symbols, ScreenDescriptor};
use crate::type_deps::collect_type_dependencies;
use crate::utility::{mark_utility_methods, route_methods, UtilityMap};

// ═══════════════════════════════════════════════════════════════════════════════
// RUN STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    IndexLoaded,
    ScreensEnumerated,
    Resolving,
    Extracting,
    Routing,
    Emitting,
    Aggregated,
    Formatted,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMode {
    /// Write every generated file, then run the formatter.
    #[default]
    Write,
    /// Compare generated content with the files on disk; write nothing.
    Check,
}

/// What one emitted screen module exposes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenReport {
    pub screen_name: String,
    pub kebab_name: String,
    pub output: PathBuf,
    /// Instance properties collected along the class chain.
    pub instance_properties: Vec<String>,
    pub context_accessors: usize,
    /// Exported wrapper names, after reserved-name renaming.
    pub submit_functions: Vec<String>,
    /// Hooks re-exported from shared utility modules.
    pub utility_exports: Vec<String>,
    /// Utility-tagged methods dropped for lack of a map entry.
    pub unmapped: Vec<String>,
    pub used_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedScreen {
    pub screen_name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub mode: RunMode,
    pub phase: Phase,
    pub screens: Vec<ScreenReport>,
    pub skipped: Vec<SkippedScreen>,
    pub diagnostics: Diagnostics,
    /// Files written, in emission order. Empty in check mode.
    pub written: Vec<PathBuf>,
    /// Check mode: generated files whose on-disk content differs or is missing.
    pub stale: Vec<PathBuf>,
    /// Files in the output directory that this run did not generate.
    pub orphans: Vec<PathBuf>,
    /// SHA-256 over every generated path and content, in emission order.
    pub output_digest: String,
    pub formatter_failed: bool,
}

impl GenerationReport {
    fn new(mode: RunMode) -> Self {
        Self {
            mode,
            phase: Phase::Idle,
            screens: Vec::new(),
            skipped: Vec::new(),
            diagnostics: Diagnostics::new(),
            written: Vec::new(),
            stale: Vec::new(),
            orphans: Vec::new(),
            output_digest: String::new(),
            formatter_failed: false,
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
    }

    /// `1` on counted errors or stale output; formatter failures never count.
    pub fn exit_status(&self) -> u8 {
        if self.diagnostics.has_errors() || !self.stale.is_empty() {
            1
        } else {
            0
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_status() == 0
    }

    pub fn screen(&self, name: &str) -> Option<&ScreenReport> {
        self.screens.iter().find(|s| s.screen_name == name)
    }

    /// Pretty-printed JSON, camelCase keys, for `--report-json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DRIVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs one full generation. `formatter` is invoked once, in write mode,
/// only when no errors were counted.
pub fn generate<Q: DeclarationQuery>(
    config: &GeneratorConfig,
    query: &mut Q,
    formatter: Option<&dyn PostGenerationFormatter>,
    mode: RunMode,
) -> Result<GenerationReport, GeneratorError> {
    let settings = &config.emit;
    let mut report = GenerationReport::new(mode);

    let index = DeclarationIndex::load(&config.docs_index(), settings.documented_interface_kind)?;
    let utility_map = UtilityMap::load(&config.utility_map())?;
    debug!(
        documented = index.len(),
        constrained = index.is_constrained(),
        utilities = utility_map.len(),
        "inputs loaded"
    );
    report.enter(Phase::IndexLoaded);

    let symbols = collect_screen_symbols(query, &config.entry_module())?;
    debug!(count = symbols.len(), "screen symbols collected");
    report.enter(Phase::ScreensEnumerated);

    let mut resolver = InheritancePropertyResolver::new();
    let mut aggregator = IndexAggregator::new();
    let mut outputs: Vec<(PathBuf, String)> = Vec::new();

    for screen_name in &symbols {
        let mut descriptor = ScreenDescriptor::new(screen_name.as_str());
        match process_screen(
            config,
            query,
            &index,
            &utility_map,
            &mut resolver,
            &mut descriptor,
            &mut report,
        ) {
            Ok((screen_report, module)) => {
                info!(
                    screen = %screen_name,
                    context_accessors = screen_report.context_accessors,
                    submit_functions = screen_report.submit_functions.len(),
                    utility_exports = screen_report.utility_exports.len(),
                    "{}: exports context hooks, {} submit function(s), {} utility hook(s)",
                    screen_name,
                    screen_report.submit_functions.len(),
                    screen_report.utility_exports.len()
                );
                aggregator.add_screen(settings, &descriptor);
                outputs.push((screen_report.output.clone(), module.render()));
                report.screens.push(screen_report);
            }
            Err(reason) => {
                debug!(screen = %screen_name, %reason, "screen skipped");
                report.skipped.push(SkippedScreen {
                    screen_name: screen_name.clone(),
                    reason,
                });
            }
        }
    }

    outputs.push((config.index_file(), aggregator.render(settings)));
    report.output_digest = output_digest(config, &outputs);

    match mode {
        RunMode::Write => {
            fs::create_dir_all(config.output_dir()).map_err(|source| GeneratorError::Write {
                path: config.output_dir(),
                source,
            })?;
            for (path, content) in &outputs {
                write_output(path, content)?;
                report.written.push(path.clone());
            }
        }
        RunMode::Check => {
            for (path, content) in &outputs {
                if !matches_on_disk(path, content) {
                    warn!(path = %config.display_path(path).display(), "generated output is stale");
                    report.stale.push(path.clone());
                }
            }
        }
    }
    report.orphans = find_orphans(config, &outputs);
    for orphan in &report.orphans {
        warn!(
            path = %config.display_path(orphan).display(),
            "output directory holds a module no screen generated"
        );
    }
    report.enter(Phase::Aggregated);

    if report.diagnostics.has_errors() {
        error!(
            screens = report.screens.len(),
            skipped = report.skipped.len(),
            errors = report.diagnostics.error_count(),
            digest = %report.output_digest,
            "Generated {} screen module(s) with {} error(s). Please review the logs above.",
            report.screens.len(),
            report.diagnostics.error_count()
        );
        report.enter(Phase::Failed);
        return Ok(report);
    }

    if mode == RunMode::Write {
        if let Some(formatter) = formatter {
            info!("Running \"{}\" to format generated files", formatter.describe());
            match formatter.format(&config.package_root) {
                Ok(()) => info!("Code formatting applied via `{}`", formatter.describe()),
                Err(err) => {
                    error!(
                        "Failed to apply code formatting: {}. Please run `{}` manually.",
                        err,
                        formatter.describe()
                    );
                    report.formatter_failed = true;
                }
            }
        }
    }
    report.enter(Phase::Formatted);

    info!(
        screens = report.screens.len(),
        skipped = report.skipped.len(),
        errors = report.diagnostics.error_count(),
        digest = %report.output_digest,
        "Generated {} screen module(s)",
        report.screens.len()
    );
    report.enter(Phase::Done);
    Ok(report)
}

/// Resolve, extract, route and emit one screen.
fn process_screen<Q: DeclarationQuery>(
    config: &GeneratorConfig,
    query: &mut Q,
    index: &DeclarationIndex,
    utility_map: &UtilityMap,
    resolver: &mut InheritancePropertyResolver,
    descriptor: &mut ScreenDescriptor,
    report: &mut GenerationReport,
) -> Result<(ScreenReport, GeneratedModule), SkipReason> {
    let settings = &config.emit;
    let screen_name = descriptor.screen_name.clone();
    let screen_module = normalize(&config.screen_module(&descriptor.kebab_name));

    report.enter(Phase::Resolving);
    if query.exported_declarations(&screen_module).is_none() {
        return Err(SkipReason::MissingScreenModule);
    }
    let class = query
        .class(&screen_module, &screen_name)
        .ok_or(SkipReason::MissingScreenClass)?;
    descriptor.has_default_export = query.has_default_export(&screen_module);

    let class_id = ClassId {
        module: screen_module,
        name: screen_name.clone(),
    };
    let properties = resolver.instance_properties(query, &class_id);
    debug!(screen = %screen_name, properties = ?properties, "instance properties resolved");

    report.enter(Phase::Extracting);
    let mut methods = extract_contract_methods(
        query,
        &config.contract_file(&descriptor.kebab_name),
        &screen_name,
        index,
    )?;

    report.enter(Phase::Routing);
    mark_utility_methods(&mut methods, &class, &settings.utility_tag);
    let routed = route_methods(&screen_name, methods, utility_map, &mut report.diagnostics);
    let used_types = collect_type_dependencies(&descriptor.members_interface(), &routed.direct);

    report.enter(Phase::Emitting);
    let module = emit_screen_module(
        settings,
        &ScreenBinding {
            descriptor,
            direct: &routed.direct,
            utility: &routed.utility,
            used_types: &used_types,
        },
    );

    let utility_exports: IndexSet<String> = routed
        .utility
        .iter()
        .map(|u| u.entry.exported_name.clone())
        .collect();
    let screen_report = ScreenReport {
        screen_name,
        kebab_name: descriptor.kebab_name.clone(),
        output: config.output_file(&descriptor.kebab_name),
        instance_properties: properties.into_iter().collect(),
        context_accessors: settings.context_models.len(),
        submit_functions: routed
            .direct
            .iter()
            .map(|m| safe_method_name(&m.name, &settings.reserved_keywords, &settings.reserved_suffix))
            .collect(),
        utility_exports: utility_exports.into_iter().collect(),
        unmapped: routed.unmapped,
        used_types: used_types.iter().map(str::to_string).collect(),
    };
    Ok((screen_report, module))
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn output_digest(config: &GeneratorConfig, outputs: &[(PathBuf, String)]) -> String {
    let mut hasher = Sha256::new();
    for (path, content) in outputs {
        hasher.update(config.display_path(path).to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(content.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

fn write_output(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| GeneratorError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| GeneratorError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn matches_on_disk(path: &Path, content: &str) -> bool {
    match fs::read_to_string(path) {
        Ok(existing) => content_hash(&existing) == content_hash(content),
        Err(_) => false,
    }
}

/// Generated-extension files directly under the output directory that this
/// run did not produce. Reported only; never deleted.
fn find_orphans(config: &GeneratorConfig, outputs: &[(PathBuf, String)]) -> Vec<PathBuf> {
    let generated: HashSet<PathBuf> = outputs.iter().map(|(path, _)| normalize(path)).collect();
    let extension = config.emit.output_extension.as_str();

    let mut orphans: Vec<PathBuf> = WalkDir::new(config.output_dir())
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .filter(|path| !generated.contains(&normalize(path)))
        .collect();
    orphans.sort();
    orphans
}

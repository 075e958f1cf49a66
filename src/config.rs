//! Run configuration.
//!
//! The directory layout under the two roots is fixed; only the roots
//! themselves are chosen by the caller.

use std::path::{Path, PathBuf};

/// Documentation-index node kind for interface declarations.
pub const DOCUMENTED_INTERFACE_KIND: u64 = 256;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root of the core SDK checkout (holds `src/`, `interfaces/`, `docs/`).
    pub core_sdk_root: PathBuf,
    /// Root of the binding package being generated.
    pub package_root: PathBuf,
    pub emit: EmitSettings,
}

impl GeneratorConfig {
    pub fn new(core_sdk_root: impl Into<PathBuf>, package_root: impl Into<PathBuf>) -> Self {
        Self {
            core_sdk_root: core_sdk_root.into(),
            package_root: package_root.into(),
            emit: EmitSettings::default(),
        }
    }

    /// Aggregate module re-exporting every screen class.
    pub fn entry_module(&self) -> PathBuf {
        self.core_sdk_root.join("src/screens/index.ts")
    }

    /// Module declaring the concrete screen class.
    pub fn screen_module(&self, kebab: &str) -> PathBuf {
        self.core_sdk_root
            .join("src/screens")
            .join(kebab)
            .join("index.ts")
    }

    /// Public-contract declarations for one screen.
    pub fn contract_file(&self, kebab: &str) -> PathBuf {
        self.core_sdk_root
            .join("interfaces/screens")
            .join(format!("{}.ts", kebab))
    }

    pub fn docs_index(&self) -> PathBuf {
        self.core_sdk_root.join("docs/index.json")
    }

    pub fn utility_map(&self) -> PathBuf {
        self.package_root.join("scripts/generate-sdk/utility-map.json")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.package_root.join("src/screens")
    }

    pub fn output_file(&self, kebab: &str) -> PathBuf {
        self.output_dir()
            .join(format!("{}.{}", kebab, self.emit.output_extension))
    }

    pub fn index_file(&self) -> PathBuf {
        self.package_root.join("src/index.ts")
    }

    /// Path relative to the package root, for log lines.
    pub fn display_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.package_root).unwrap_or(path)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new("../auth0-acul-js", ".")
    }
}

/// Names and module specifiers baked into every emitted module.
#[derive(Debug, Clone)]
pub struct EmitSettings {
    pub framework_module: String,
    /// Package specifier of the core SDK; screen subpaths are `<core_package>/<kebab>`.
    pub core_package: String,
    /// Module providing `ContextHooks`, `errorManager` and the common hooks.
    pub hooks_module: String,
    pub instance_store_module: String,
    /// The hooks module as seen from the aggregate index.
    pub index_hooks_module: String,
    pub telemetry_module: String,
    /// Prefix for screen modules as seen from the aggregate index.
    pub screens_import_prefix: String,
    pub output_extension: String,
    pub context_models: Vec<String>,
    pub reserved_keywords: Vec<String>,
    pub reserved_suffix: String,
    /// JSDoc tag marking a method as a shared utility.
    pub utility_tag: String,
    pub documented_interface_kind: u64,
}

impl Default for EmitSettings {
    fn default() -> Self {
        Self {
            framework_module: "react".to_string(),
            core_package: "@auth0/auth0-acul-js".to_string(),
            hooks_module: "../hooks".to_string(),
            instance_store_module: "../state/instance-store".to_string(),
            index_hooks_module: "./hooks".to_string(),
            telemetry_module: "./telemetry".to_string(),
            screens_import_prefix: "./screens".to_string(),
            output_extension: "tsx".to_string(),
            context_models: [
                "user",
                "tenant",
                "branding",
                "client",
                "organization",
                "prompt",
                "screen",
                "transaction",
                "untrustedData",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            reserved_keywords: ["continue", "break", "case", "catch", "const"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reserved_suffix: "Method".to_string(),
            utility_tag: "utilityFeature".to_string(),
            documented_interface_kind: DOCUMENTED_INTERFACE_KIND,
        }
    }
}

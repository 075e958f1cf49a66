use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// FATAL ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Conditions that stop a run before or while writing output.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("core SDK entry module {} is missing or failed to parse", .0.display())]
    MissingEntryModule(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("documentation index {} is not valid JSON: {source}", path.display())]
    DocsIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("utility map {} not found", .0.display())]
    MissingUtilityMap(PathBuf),

    #[error("utility map {} is not valid JSON: {source}", path.display())]
    UtilityMapSyntax {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("utility map {} has invalid entries: {}", path.display(), problems.join("; "))]
    InvalidUtilityMap {
        path: PathBuf,
        problems: Vec<String>,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// PER-SCREEN RECOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a screen symbol produced no module. Expected absence, never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    MissingScreenModule,
    MissingScreenClass,
    MissingContractFile,
    MissingContractInterface,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingScreenModule => "screen module not found",
            SkipReason::MissingScreenClass => "screen class not declared in its module",
            SkipReason::MissingContractFile => "contract file not found",
            SkipReason::MissingContractInterface => "contract interface not declared",
        };
        f.write_str(text)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COUNTED ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// A utility-tagged method with no entry in the utility map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedUtility {
    pub screen: String,
    pub method: String,
}

impl fmt::Display for UnmappedUtility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.screen, self.method)
    }
}

/// Errors counted toward the exit code, scoped to one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    unmapped: Vec<UnmappedUtility>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_unmapped(&mut self, screen: &str, method: &str) {
        self.unmapped.push(UnmappedUtility {
            screen: screen.to_string(),
            method: method.to_string(),
        });
    }

    pub fn error_count(&self) -> usize {
        self.unmapped.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.unmapped.is_empty()
    }

    pub fn unmapped(&self) -> &[UnmappedUtility] {
        &self.unmapped
    }
}

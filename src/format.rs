//! The post-generation formatting pass, run once over the package.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatterError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Status { command: String, status: String },
}

/// Rewrites the generated tree in place. Failures are reported to the caller,
/// which logs them without affecting the run's outcome.
pub trait PostGenerationFormatter {
    fn format(&self, package_root: &Path) -> Result<(), FormatterError>;

    /// Short human-readable form of the command, for log lines.
    fn describe(&self) -> String;
}

/// Runs an npm script (default `lint:fix`) in the package root, inheriting
/// stdio so the tool's own output reaches the terminal.
#[derive(Debug, Clone)]
pub struct NpmScriptFormatter {
    pub program: String,
    pub script: String,
}

impl NpmScriptFormatter {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            program: "npm".to_string(),
            script: script.into(),
        }
    }
}

impl Default for NpmScriptFormatter {
    fn default() -> Self {
        Self::new("lint:fix")
    }
}

impl PostGenerationFormatter for NpmScriptFormatter {
    fn format(&self, package_root: &Path) -> Result<(), FormatterError> {
        let status = Command::new(&self.program)
            .arg("run")
            .arg(&self.script)
            .current_dir(package_root)
            .status()
            .map_err(|source| FormatterError::Spawn {
                command: self.describe(),
                source,
            })?;

        if !status.success() {
            return Err(FormatterError::Status {
                command: self.describe(),
                status: status.to_string(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} run {}", self.program, self.script)
    }
}

//! Declaration index built from the documentation pipeline's JSON tree.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::GeneratorError;

/// Names of documented interface declarations.
///
/// An index built from an absent file places no constraints: every name is
/// permitted. A loaded index permits only the names it contains.
#[derive(Debug, Clone, Default)]
pub struct DeclarationIndex {
    names: HashSet<String>,
    constrained: bool,
}

impl DeclarationIndex {
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            constrained: true,
        }
    }

    /// Reads the index at `path`. A missing file is not an error.
    pub fn load(path: &Path, interface_kind: u64) -> Result<Self, GeneratorError> {
        if !path.is_file() {
            debug!(path = %path.display(), "no documentation index; all interfaces permitted");
            return Ok(Self::unconstrained());
        }
        let raw = fs::read_to_string(path).map_err(|source| GeneratorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tree: Value = serde_json::from_str(&raw).map_err(|source| GeneratorError::DocsIndex {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_tree(&tree, interface_kind))
    }

    /// Collects the `name` of every node whose `kind` equals `interface_kind`.
    pub fn from_tree(tree: &Value, interface_kind: u64) -> Self {
        fn walk(node: &Value, kind: u64, names: &mut HashSet<String>) {
            if node.get("kind").and_then(Value::as_u64) == Some(kind) {
                if let Some(name) = node.get("name").and_then(Value::as_str) {
                    names.insert(name.to_string());
                }
            }
            if let Some(children) = node.get("children").and_then(Value::as_array) {
                for child in children {
                    walk(child, kind, names);
                }
            }
        }

        let mut names = HashSet::new();
        walk(tree, interface_kind, &mut names);
        Self {
            names,
            constrained: true,
        }
    }

    pub fn permits(&self, name: &str) -> bool {
        !self.constrained || self.names.contains(name)
    }

    pub fn is_constrained(&self) -> bool {
        self.constrained
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

//! Utility routing: methods whose implementation lives in a shared module.
//!
//! The utility map is a JSON object keyed by method name:
//!
//! ```json
//! { "resendCode": { "name": "useResend", "path": "../hooks/utility/resend-manager", "types": ["UseResendOptions"] } }
//! ```
//!
//! It is validated as a whole before any screen is processed; every malformed
//! entry is reported together.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::error;

use crate::contract::ExportedMethodDescriptor;
use crate::error::{Diagnostics, GeneratorError};
use crate::naming::is_identifier;
use crate::parse::ClassDecl;

// ═══════════════════════════════════════════════════════════════════════════════
// MAP SCHEMA
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityMapEntry {
    /// Binding exported by the shared module.
    pub exported_name: String,
    pub module_path: String,
    pub associated_types: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UtilityMap {
    entries: IndexMap<String, UtilityMapEntry>,
}

impl UtilityMap {
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        if !path.is_file() {
            return Err(GeneratorError::MissingUtilityMap(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|source| GeneratorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value =
            serde_json::from_str(&raw).map_err(|source| GeneratorError::UtilityMapSyntax {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_value(&value).map_err(|problems| GeneratorError::InvalidUtilityMap {
            path: path.to_path_buf(),
            problems,
        })
    }

    /// Validates every entry; on failure returns one message per problem.
    pub fn from_value(value: &Value) -> Result<Self, Vec<String>> {
        let Some(object) = value.as_object() else {
            return Err(vec!["top level must be an object keyed by method name".to_string()]);
        };

        let mut entries = IndexMap::new();
        let mut problems = Vec::new();
        for (method, raw) in object {
            match validate_entry(method, raw) {
                Ok(entry) => {
                    entries.insert(method.clone(), entry);
                }
                Err(mut entry_problems) => problems.append(&mut entry_problems),
            }
        }

        if problems.is_empty() {
            Ok(Self { entries })
        } else {
            Err(problems)
        }
    }

    pub fn get(&self, method: &str) -> Option<&UtilityMapEntry> {
        self.entries.get(method)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_entry(method: &str, raw: &Value) -> Result<UtilityMapEntry, Vec<String>> {
    let Some(fields) = raw.as_object() else {
        return Err(vec![format!("'{}': entry must be an object", method)]);
    };
    let mut problems = Vec::new();

    let exported_name = match fields.get("name").and_then(Value::as_str) {
        Some(name) if is_identifier(name) => name.to_string(),
        Some(name) => {
            problems.push(format!("'{}': name '{}' is not an identifier", method, name));
            String::new()
        }
        None => {
            problems.push(format!("'{}': missing string field 'name'", method));
            String::new()
        }
    };

    let module_path = match fields.get("path").and_then(Value::as_str) {
        Some(path) if !path.trim().is_empty() => path.to_string(),
        _ => {
            problems.push(format!("'{}': missing or empty string field 'path'", method));
            String::new()
        }
    };

    let mut associated_types = Vec::new();
    match fields.get("types") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items {
                match item.as_str() {
                    Some(t) if is_identifier(t) => associated_types.push(t.to_string()),
                    _ => problems.push(format!(
                        "'{}': 'types' entries must be identifier strings, found {}",
                        method, item
                    )),
                }
            }
        }
        Some(other) => problems.push(format!(
            "'{}': 'types' must be an array of strings, found {}",
            method, other
        )),
    }

    if problems.is_empty() {
        Ok(UtilityMapEntry {
            exported_name,
            module_path,
            associated_types,
        })
    } else {
        Err(problems)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TAGGING & ROUTING
// ═══════════════════════════════════════════════════════════════════════════════

/// Marks each descriptor whose concrete method carries the `tag` JSDoc tag.
pub fn mark_utility_methods(methods: &mut [ExportedMethodDescriptor], class: &ClassDecl, tag: &str) {
    for method in methods.iter_mut() {
        method.is_utility = class
            .methods
            .iter()
            .any(|m| m.name == method.name && m.has_tag(tag));
    }
}

#[derive(Debug, Clone)]
pub struct RoutedUtility<'m> {
    pub method: ExportedMethodDescriptor,
    pub entry: &'m UtilityMapEntry,
}

#[derive(Debug, Clone, Default)]
pub struct RoutedMethods<'m> {
    /// Wrapped locally, in contract order.
    pub direct: Vec<ExportedMethodDescriptor>,
    /// Re-exported from their mapped module, in contract order.
    pub utility: Vec<RoutedUtility<'m>>,
    /// Utility-tagged methods dropped for lack of a map entry.
    pub unmapped: Vec<String>,
}

/// Partitions `methods`. Each unmapped utility method is logged and counted
/// once in `diagnostics`, then dropped.
pub fn route_methods<'m>(
    screen_name: &str,
    methods: Vec<ExportedMethodDescriptor>,
    map: &'m UtilityMap,
    diagnostics: &mut Diagnostics,
) -> RoutedMethods<'m> {
    let mut routed = RoutedMethods::default();
    for method in methods {
        if !method.is_utility {
            routed.direct.push(method);
            continue;
        }
        match map.get(&method.name) {
            Some(entry) => routed.utility.push(RoutedUtility { method, entry }),
            None => {
                error!(
                    "No utility map entry found for method '{}' in screen '{}'. Skipping export.",
                    method.name, screen_name
                );
                diagnostics.record_unmapped(screen_name, &method.name);
                routed.unmapped.push(method.name);
            }
        }
    }
    routed
}

//! Type identifiers referenced by direct methods' parameters.
//!
//! Declared type text is scanned for identifier references rather than
//! resolved against the type graph, so two same-named types from different
//! contract files are indistinguishable. Every identifier is imported from the screen's own
//! core-package subpath.

use std::collections::HashSet;

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

use crate::contract::ExportedMethodDescriptor;

lazy_static! {
    static ref STRING_LITERAL_RE: Regex =
        Regex::new(r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|`(?:[^`\\]|\\.)*`"#).unwrap();

    /// An identifier, optionally qualified (`Ns.Type`).
    static ref TYPE_REFERENCE_RE: Regex =
        Regex::new(r"[A-Za-z_$][\w$]*(?:\s*\.\s*[A-Za-z_$][\w$]*)*").unwrap();

    /// Never importable: primitives and keyword types.
    pub static ref PRIMITIVES: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("any");
        s.insert("string");
        s.insert("number");
        s.insert("boolean");
        s.insert("undefined");
        s.insert("void");
        s.insert("null");
        s.insert("unknown");
        s.insert("never");
        s.insert("object");
        s.insert("bigint");
        s.insert("symbol");
        s.insert("true");
        s.insert("false");
        s
    };

    /// Global lib types that are in scope without an import.
    pub static ref BUILTIN_TYPES: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("Promise");
        s.insert("Array");
        s.insert("ReadonlyArray");
        s.insert("Record");
        s.insert("Partial");
        s.insert("Required");
        s.insert("Readonly");
        s.insert("Pick");
        s.insert("Omit");
        s.insert("Exclude");
        s.insert("Extract");
        s.insert("NonNullable");
        s.insert("ReturnType");
        s.insert("Parameters");
        s.insert("Awaited");
        s.insert("Map");
        s.insert("Set");
        s.insert("Date");
        s.insert("RegExp");
        s.insert("Function");
        s
    };
}

/// Type-level keywords that read like identifiers.
const TYPE_KEYWORDS: &[&str] = &[
    "keyof", "typeof", "readonly", "unique", "infer", "extends", "is", "asserts", "new", "in",
    "as", "this", "abstract",
];

/// Deduplicated, insertion-ordered type identifiers for one module's
/// type-import line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedTypeSet {
    names: IndexSet<String>,
}

impl UsedTypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` unless it is a primitive or already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if PRIMITIVES.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Importable identifiers referenced anywhere in one declared type, in
/// order of appearance.
///
/// `LoginOptions | undefined` -> `LoginOptions`;
/// `(result: ResendResult) => void` -> `ResendResult`;
/// `LoginOptions['username']` -> `LoginOptions`;
/// `{ code: Code }` -> `Code`. Member and parameter names are not types, and
/// a qualified name contributes its head (`React.ReactNode` -> `React`).
pub fn type_tokens(type_text: &str) -> Vec<String> {
    let text = STRING_LITERAL_RE.replace_all(type_text, " ");
    let text = text.as_ref();

    TYPE_REFERENCE_RE
        .find_iter(text)
        .filter(|m| {
            !text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit())
        })
        .filter(|m| !is_member_name(text, m.start(), m.end()))
        .filter_map(|m| m.as_str().split('.').next().map(str::trim))
        .filter(|head| {
            !PRIMITIVES.contains(head)
                && !BUILTIN_TYPES.contains(head)
                && !TYPE_KEYWORDS.contains(head)
        })
        .map(str::to_string)
        .collect()
}

/// `name` in `(name: T)`, `(name?: T)`, `{ name: T }` or `(...name: T[])`.
fn is_member_name(text: &str, start: usize, end: usize) -> bool {
    let after = text[end..].trim_start();
    let after = after.strip_prefix('?').unwrap_or(after).trim_start();
    if !after.starts_with(':') {
        return false;
    }
    let before = text[..start].trim_end();
    before.is_empty()
        || before.ends_with(['(', ',', '{', ';'])
        || before.ends_with("...")
        || before.ends_with("readonly")
}

/// The base contract interface first, then every type referenced by the
/// direct methods' parameters.
pub fn collect_type_dependencies(
    base_interface: &str,
    direct: &[ExportedMethodDescriptor],
) -> UsedTypeSet {
    let mut used = UsedTypeSet::new();
    used.insert(base_interface);
    for method in direct.iter().filter(|m| !m.is_utility) {
        for param in &method.params {
            for token in type_tokens(&param.type_text) {
                used.insert(&token);
            }
        }
    }
    used
}

//! Parse Module
//!
//! Lowers one TypeScript source file into an owned [`ModuleSummary`]: the
//! imports, exports, classes and interfaces the generator queries. The oxc
//! arena is dropped before returning, so nothing downstream carries its
//! lifetime.

use lazy_static::lazy_static;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPattern, Class, ClassElement, Declaration, ExportDefaultDeclarationKind, Expression,
    FormalParameters, ImportDeclarationSpecifier, MethodDefinitionKind, ModuleExportName,
    PropertyKey, Statement, TSInterfaceDeclaration, TSMethodSignatureKind, TSSignature,
};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use regex::Regex;
use std::path::Path;

lazy_static! {
    /// Block tags inside a JSDoc comment (`* @utilityFeature`).
    static ref JSDOC_TAG_RE: Regex = Regex::new(r"(?m)^[\s*]*@([A-Za-z][\w-]*)").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// SUMMARY TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct ModuleSummary {
    pub imports: Vec<ImportBinding>,
    /// Export entries in source order.
    pub exports: Vec<ExportEntry>,
    pub classes: Vec<ClassDecl>,
    pub interfaces: Vec<InterfaceDecl>,
}

impl ModuleSummary {
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDecl> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn import(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.iter().find(|i| i.local == local)
    }

    pub fn has_default_export(&self) -> bool {
        self.exports.iter().any(|entry| match entry {
            ExportEntry::Local { exported, .. } | ExportEntry::Reexport { exported, .. } => {
                exported == "default"
            }
            ExportEntry::Star { .. } => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    Default,
    Named(String),
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub imported: ImportedName,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEntry {
    /// `export class X`, `export { x as y }`, `export default X`.
    Local { exported: String, local: String },
    /// `export { x as y } from './m'`; `imported` is `default` for default re-exports.
    Reexport {
        exported: String,
        imported: String,
        source: String,
    },
    /// `export * from './m'`.
    Star { source: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    /// `extends` target when it is a plain identifier.
    pub super_class: Option<String>,
    /// Non-static property declarations, in source order.
    pub instance_properties: Vec<String>,
    pub methods: Vec<ClassMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMethod {
    pub name: String,
    /// Tag names from the JSDoc block directly above the method, without `@`.
    pub doc_tags: Vec<String>,
}

impl ClassMethod {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.doc_tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub methods: Vec<MethodSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<ParamDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub name: String,
    /// Declared type exactly as written, or the inferred fallback.
    pub type_text: String,
    pub is_optional: bool,
    pub is_rest: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════════

/// Parser diagnostics for a file that could not be summarized.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub messages: Vec<String>,
}

fn source_type_for(path: &Path) -> SourceType {
    SourceType::from_path(path).unwrap_or_else(|_| {
        SourceType::default()
            .with_module(true)
            .with_typescript(true)
    })
}

pub fn parse_module(path: &Path, source: &str) -> Result<ModuleSummary, ParseFailure> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type_for(path)).parse();

    if !ret.errors.is_empty() {
        return Err(ParseFailure {
            messages: ret.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    let mut lowering = ModuleLowering {
        source,
        summary: ModuleSummary::default(),
    };
    lowering.visit_program(&ret.program);
    Ok(lowering.summary)
}

struct ModuleLowering<'s> {
    source: &'s str,
    summary: ModuleSummary,
}

impl<'a, 's> Visit<'a> for ModuleLowering<'s> {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        match stmt {
            Statement::ImportDeclaration(import_decl) => {
                let source = import_decl.source.value.to_string();
                if let Some(specifiers) = &import_decl.specifiers {
                    for specifier in specifiers {
                        let (local, imported) = match specifier {
                            ImportDeclarationSpecifier::ImportSpecifier(s) => (
                                s.local.name.to_string(),
                                ImportedName::Named(module_export_name(&s.imported)),
                            ),
                            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                                (s.local.name.to_string(), ImportedName::Default)
                            }
                            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                                (s.local.name.to_string(), ImportedName::Namespace)
                            }
                        };
                        self.summary.imports.push(ImportBinding {
                            local,
                            imported,
                            source: source.clone(),
                        });
                    }
                }
            }
            Statement::ExportNamedDeclaration(export_decl) => {
                if let Some(declaration) = &export_decl.declaration {
                    for name in self.lower_declaration(declaration) {
                        self.summary.exports.push(ExportEntry::Local {
                            exported: name.clone(),
                            local: name,
                        });
                    }
                }
                let source = export_decl.source.as_ref().map(|s| s.value.to_string());
                for specifier in &export_decl.specifiers {
                    let local = module_export_name(&specifier.local);
                    let exported = module_export_name(&specifier.exported);
                    let entry = match &source {
                        Some(source) => ExportEntry::Reexport {
                            exported,
                            imported: local,
                            source: source.clone(),
                        },
                        None => ExportEntry::Local { exported, local },
                    };
                    self.summary.exports.push(entry);
                }
            }
            Statement::ExportDefaultDeclaration(export_decl) => match &export_decl.declaration {
                ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                    if let Some(name) = self.lower_class(class) {
                        self.push_default(name);
                    }
                }
                ExportDefaultDeclarationKind::TSInterfaceDeclaration(iface) => {
                    let name = self.lower_interface(iface);
                    self.push_default(name);
                }
                ExportDefaultDeclarationKind::Identifier(ident) => {
                    self.push_default(ident.name.to_string());
                }
                _ => {}
            },
            Statement::ExportAllDeclaration(export_all) => {
                // `export * as ns from` is a namespace object, never a class.
                if export_all.exported.is_none() {
                    self.summary.exports.push(ExportEntry::Star {
                        source: export_all.source.value.to_string(),
                    });
                }
            }
            Statement::ClassDeclaration(class) => {
                self.lower_class(class);
            }
            Statement::TSInterfaceDeclaration(iface) => {
                self.lower_interface(iface);
            }
            _ => {}
        }
    }
}

impl<'s> ModuleLowering<'s> {
    fn push_default(&mut self, local: String) {
        self.summary.exports.push(ExportEntry::Local {
            exported: "default".to_string(),
            local,
        });
    }

    /// Records a declaration and returns the names it binds.
    fn lower_declaration(&mut self, declaration: &Declaration<'_>) -> Vec<String> {
        match declaration {
            Declaration::ClassDeclaration(class) => self.lower_class(class).into_iter().collect(),
            Declaration::TSInterfaceDeclaration(iface) => vec![self.lower_interface(iface)],
            Declaration::FunctionDeclaration(func) => func
                .id
                .as_ref()
                .map(|id| id.name.to_string())
                .into_iter()
                .collect(),
            Declaration::TSTypeAliasDeclaration(alias) => vec![alias.id.name.to_string()],
            Declaration::TSEnumDeclaration(decl) => vec![decl.id.name.to_string()],
            Declaration::VariableDeclaration(var_decl) => var_decl
                .declarations
                .iter()
                .filter_map(|d| match &d.id {
                    BindingPattern::BindingIdentifier(id) => Some(id.name.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn lower_class(&mut self, class: &Class<'_>) -> Option<String> {
        let name = class.id.as_ref()?.name.to_string();

        let super_class = match &class.super_class {
            Some(Expression::Identifier(ident)) => Some(ident.name.to_string()),
            _ => None,
        };

        let mut instance_properties = Vec::new();
        let mut methods = Vec::new();
        for element in &class.body.body {
            match element {
                ClassElement::PropertyDefinition(prop) if !prop.r#static => {
                    if let Some(prop_name) = property_key_name(&prop.key) {
                        instance_properties.push(prop_name);
                    }
                }
                ClassElement::MethodDefinition(method)
                    if method.kind == MethodDefinitionKind::Method =>
                {
                    if let Some(method_name) = property_key_name(&method.key) {
                        methods.push(ClassMethod {
                            name: method_name,
                            doc_tags: jsdoc_tags_before(self.source, method.span.start),
                        });
                    }
                }
                _ => {}
            }
        }

        self.summary.classes.push(ClassDecl {
            name: name.clone(),
            super_class,
            instance_properties,
            methods,
        });
        Some(name)
    }

    fn lower_interface(&mut self, iface: &TSInterfaceDeclaration<'_>) -> String {
        let name = iface.id.name.to_string();
        let mut methods = Vec::new();

        for signature in &iface.body.body {
            if let TSSignature::TSMethodSignature(method) = signature {
                if method.kind != TSMethodSignatureKind::Method {
                    continue;
                }
                if let Some(method_name) = property_key_name(&method.key) {
                    methods.push(MethodSignature {
                        name: method_name,
                        params: self.lower_params(&method.params),
                    });
                }
            }
        }

        self.summary.interfaces.push(InterfaceDecl {
            name: name.clone(),
            methods,
        });
        name
    }

    fn lower_params(&self, params: &FormalParameters<'_>) -> Vec<ParamDescriptor> {
        let mut lowered: Vec<ParamDescriptor> = params
            .items
            .iter()
            .map(|param| split_parameter(span_text(self.source, param.span)))
            .collect();
        if let Some(rest) = &params.rest {
            lowered.push(split_parameter(span_text(self.source, rest.span())));
        }
        lowered
    }
}

fn module_export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

fn property_key_name(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        PropertyKey::StringLiteral(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn span_text(source: &str, span: Span) -> &str {
    &source[span.start as usize..span.end as usize]
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSDOC
// ═══════════════════════════════════════════════════════════════════════════════

/// Tags of the `/** */` block separated from `offset` only by whitespace.
pub fn jsdoc_tags_before(source: &str, offset: u32) -> Vec<String> {
    let preceding = source[..offset as usize].trim_end();
    if !preceding.ends_with("*/") {
        return Vec::new();
    }
    let Some(start) = preceding.rfind("/**") else {
        return Vec::new();
    };
    let block = &preceding[start..];
    // `/**/` is an empty block comment, not documentation.
    if block.len() < 5 {
        return Vec::new();
    }
    let body = &block[3..block.len() - 2];
    if body.contains("*/") {
        return Vec::new();
    }
    JSDOC_TAG_RE
        .captures_iter(body)
        .map(|cap| cap[1].to_string())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Splits parameter source text (`name?: Type = init`) into its parts.
///
/// Only nesting depth zero is considered, so `{ a: string }` and
/// `(x: number) => void` stay intact as names or types.
pub fn split_parameter(text: &str) -> ParamDescriptor {
    let text = text.trim();
    let (is_rest, text) = match text.strip_prefix("...") {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };

    let name_end = find_top_level(text, |c, _| matches!(c, '?' | ':' | '=')).unwrap_or(text.len());
    let name = text[..name_end].trim().to_string();
    let mut remainder = &text[name_end..];

    let mut is_optional = false;
    if let Some(after) = remainder.strip_prefix('?') {
        is_optional = true;
        remainder = after;
    }

    let mut declared = None;
    if let Some(after) = remainder.strip_prefix(':') {
        let type_end = find_top_level(after, |c, next| c == '=' && next != Some('>'))
            .unwrap_or(after.len());
        declared = Some(after[..type_end].trim().to_string());
        remainder = &after[type_end..];
    }

    let initializer = remainder
        .strip_prefix('=')
        .map(|init| init.trim())
        .filter(|init| !init.is_empty());
    if initializer.is_some() {
        is_optional = true;
    }

    let type_text = declared
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| infer_type(initializer, is_rest));

    ParamDescriptor {
        name,
        type_text,
        is_optional,
        is_rest,
    }
}

fn infer_type(initializer: Option<&str>, is_rest: bool) -> String {
    let inferred = match initializer {
        Some(init) if init.starts_with(['\'', '"', '`']) => "string",
        Some("true") | Some("false") => "boolean",
        Some(init) if init.parse::<f64>().is_ok() => "number",
        _ => "any",
    };
    if is_rest {
        format!("{}[]", inferred)
    } else {
        inferred.to_string()
    }
}

/// Byte offset of the first depth-zero char accepted by `pred`, outside of
/// string literals. `pred` also sees the following char.
fn find_top_level(text: &str, pred: impl Fn(char, Option<char>) -> bool) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let next = chars.peek().map(|(_, n)| *n);
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '=' if next == Some('>') => {
                if depth == 0 && pred(c, next) {
                    return Some(idx);
                }
                chars.next();
            }
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            _ if depth == 0 && pred(c, next) => return Some(idx),
            _ => {}
        }
    }
    None
}

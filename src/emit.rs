//! Emission of one screen's binding module.
//!
//! Section order is fixed: runtime imports, screen class import, type import
//! (inserted once the used-type set is final), singleton registration, error
//! wrapper, context accessors, submit functions, utility re-exports, common
//! hooks, instance accessor.

use crate::config::EmitSettings;
use crate::contract::ExportedMethodDescriptor;
use crate::naming::{safe_method_name, to_pascal};
use crate::screens::ScreenDescriptor;
use crate::type_deps::UsedTypeSet;
use crate::utility::RoutedUtility;

/// Line index of the type-import line: after the framework import, the
/// screen class import and the `ContextHooks` import.
pub const TYPE_IMPORT_OFFSET: usize = 3;

/// Exports shared by every screen module, re-exported from the hooks module.
const COMMON_HOOK_EXPORTS: &str = "useCurrentScreen, useErrors, useAuth0Themes, type UseErrorOptions, type UseErrorsResult, type ErrorsResult, type ErrorType";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedModule {
    lines: Vec<String>,
}

impl GeneratedModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// A blank separator line followed by a `//` comment.
    pub fn section(&mut self, comment: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("// {}", comment));
    }

    pub fn insert(&mut self, index: usize, line: impl Into<String>) {
        let index = index.min(self.lines.len());
        self.lines.insert(index, line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Newline-joined source with a trailing newline.
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Everything resolved for one screen, ready to serialize.
#[derive(Debug, Clone)]
pub struct ScreenBinding<'a, 'm> {
    pub descriptor: &'a ScreenDescriptor,
    pub direct: &'a [ExportedMethodDescriptor],
    pub utility: &'a [RoutedUtility<'m>],
    pub used_types: &'a UsedTypeSet,
}

pub fn emit_screen_module(settings: &EmitSettings, binding: &ScreenBinding<'_, '_>) -> GeneratedModule {
    let screen = &binding.descriptor.screen_name;
    let kebab = &binding.descriptor.kebab_name;
    let base_interface = binding.descriptor.members_interface();
    let screen_specifier = format!("{}/{}", settings.core_package, kebab);
    let has_direct = !binding.direct.is_empty();

    let mut module = GeneratedModule::new();

    module.push(format!("import {{ useMemo }} from '{}';", settings.framework_module));
    if binding.descriptor.has_default_export {
        module.push(format!("import {} from '{}';", screen, screen_specifier));
    } else {
        module.push(format!("import {{ {} }} from '{}';", screen, screen_specifier));
    }
    module.push(format!("import {{ ContextHooks }} from '{}';", settings.hooks_module));
    if has_direct {
        module.push(format!("import {{ errorManager }} from '{}';", settings.hooks_module));
    }
    module.push(format!(
        "import {{ registerScreen }} from '{}';",
        settings.instance_store_module
    ));

    module.section(&format!("Register the singleton instance of {}", screen));
    module.push(format!(
        "const instance = registerScreen<{}>({})!;",
        base_interface, screen
    ));

    if has_direct {
        module.section("Error wrapper");
        module.push("const { withError } = errorManager;");
    }

    module.section("Context hooks");
    module.push(format!(
        "const factory = new ContextHooks<{}>(instance);",
        base_interface
    ));
    module.push("export const {");
    let last = settings.context_models.len().saturating_sub(1);
    for (i, model) in settings.context_models.iter().enumerate() {
        let separator = if i == last { "" } else { "," };
        module.push(format!("  use{}{}", to_pascal(model), separator));
    }
    module.push("} = factory;");

    if has_direct {
        module.section("Submit functions");
        for method in binding.direct {
            module.push(emit_wrapper(settings, method));
        }
    }

    if !binding.utility.is_empty() {
        module.section("Utility hooks");
        let mut emitted: Vec<String> = Vec::new();
        for routed in binding.utility {
            let line = format!(
                "export {{ {} }} from '{}';",
                routed.entry.exported_name, routed.entry.module_path
            );
            // Two methods mapped to the same hook share one re-export.
            if !emitted.contains(&line) {
                module.push(line.clone());
                emitted.push(line);
            }
        }
    }

    module.section("Common hooks");
    module.push(format!(
        "export {{ {} }} from '{}';",
        COMMON_HOOK_EXPORTS, settings.hooks_module
    ));

    module.section(&format!(
        "Main instance hook. Returns singleton instance of {}",
        screen
    ));
    module.push(format!(
        "export const {} = (): {} => useMemo(() => instance, []);",
        binding.descriptor.instance_hook(),
        base_interface
    ));

    let type_names: Vec<&str> = binding.used_types.iter().collect();
    if !type_names.is_empty() {
        module.insert(
            TYPE_IMPORT_OFFSET,
            format!(
                "import type {{ {} }} from '{}';",
                type_names.join(", "),
                screen_specifier
            ),
        );
    }

    module
}

/// `export const login = (options: LoginOptions) => withError(instance.login(options));`
fn emit_wrapper(settings: &EmitSettings, method: &ExportedMethodDescriptor) -> String {
    let binding_name = safe_method_name(
        &method.name,
        &settings.reserved_keywords,
        &settings.reserved_suffix,
    );
    let params: Vec<String> = method
        .params
        .iter()
        .map(|p| {
            format!(
                "{}{}{}: {}",
                if p.is_rest { "..." } else { "" },
                p.name,
                if p.is_optional && !p.is_rest { "?" } else { "" },
                p.type_text
            )
        })
        .collect();
    let args: Vec<String> = method
        .params
        .iter()
        .map(|p| format!("{}{}", if p.is_rest { "..." } else { "" }, p.name))
        .collect();

    format!(
        "export const {} = ({}) => withError(instance.{}({}));",
        binding_name,
        params.join(", "),
        method.name,
        args.join(", ")
    )
}

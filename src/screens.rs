//! Screen discovery: the class exports of the core SDK's screens entry module.

use std::path::Path;

use tracing::debug;

use crate::error::GeneratorError;
use crate::naming::to_kebab_case;
use crate::project::{DeclarationKind, DeclarationQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenDescriptor {
    pub screen_name: String,
    pub kebab_name: String,
    pub has_default_export: bool,
}

impl ScreenDescriptor {
    pub fn new(screen_name: impl Into<String>) -> Self {
        let screen_name = screen_name.into();
        let kebab_name = to_kebab_case(&screen_name);
        Self {
            screen_name,
            kebab_name,
            has_default_export: false,
        }
    }

    /// `<Screen>Members`, the contract interface name.
    pub fn members_interface(&self) -> String {
        format!("{}Members", self.screen_name)
    }

    /// `use<Screen>`, the exported instance accessor.
    pub fn instance_hook(&self) -> String {
        format!("use{}", self.screen_name)
    }
}

/// Exported names of `entry` that resolve to class declarations, in
/// declaration order.
pub fn collect_screen_symbols<Q: DeclarationQuery>(
    query: &mut Q,
    entry: &Path,
) -> Result<Vec<String>, GeneratorError> {
    let exports = query
        .exported_declarations(entry)
        .ok_or_else(|| GeneratorError::MissingEntryModule(entry.to_path_buf()))?;

    let screens: Vec<String> = exports
        .into_iter()
        .filter_map(|decl| match decl.kind {
            DeclarationKind::Class => Some(decl.exported_name),
            _ => {
                debug!(name = %decl.exported_name, "skipping non-class export");
                None
            }
        })
        .collect();

    Ok(screens)
}

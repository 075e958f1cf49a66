//! Method signatures from a screen's `<Screen>Members` contract interface.

use std::path::Path;

use tracing::debug;

use crate::docs_index::DeclarationIndex;
use crate::error::SkipReason;
use crate::parse::ParamDescriptor;
use crate::project::{DeclarationKind, DeclarationQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedMethodDescriptor {
    pub name: String,
    pub params: Vec<ParamDescriptor>,
    /// Set by the utility tagging pass, never by extraction.
    pub is_utility: bool,
}

/// Reads the methods of `<screen_name>Members` from `contract_file`.
///
/// A missing file or interface skips the screen. An interface the index does
/// not document yields no methods; the screen is still emitted.
pub fn extract_contract_methods<Q: DeclarationQuery>(
    query: &mut Q,
    contract_file: &Path,
    screen_name: &str,
    index: &DeclarationIndex,
) -> Result<Vec<ExportedMethodDescriptor>, SkipReason> {
    let members = format!("{}Members", screen_name);
    let exports = query
        .exported_declarations(contract_file)
        .ok_or(SkipReason::MissingContractFile)?;

    let decl = exports
        .into_iter()
        .find(|d| d.exported_name == members && d.kind == DeclarationKind::Interface)
        .ok_or(SkipReason::MissingContractInterface)?;

    if !index.permits(&members) {
        debug!(interface = %members, "contract interface is not documented; no methods exported");
        return Ok(Vec::new());
    }

    let iface = query
        .interface(&decl.module, &decl.local_name)
        .ok_or(SkipReason::MissingContractInterface)?;

    let mut methods: Vec<ExportedMethodDescriptor> = Vec::with_capacity(iface.methods.len());
    for signature in iface.methods {
        // Overloads share one wrapper; the first signature wins.
        if methods.iter().any(|m| m.name == signature.name) {
            continue;
        }
        methods.push(ExportedMethodDescriptor {
            name: signature.name,
            params: signature.params,
            is_utility: false,
        });
    }
    Ok(methods)
}

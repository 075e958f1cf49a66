//! The package's root entry module: one export per screen, in discovery order.

use crate::config::EmitSettings;
use crate::screens::ScreenDescriptor;

#[derive(Debug, Clone, Default)]
pub struct IndexAggregator {
    exports: Vec<String>,
}

impl IndexAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_screen(&mut self, settings: &EmitSettings, screen: &ScreenDescriptor) {
        self.exports.push(format!(
            "export {{ {} }} from '{}/{}';",
            screen.instance_hook(),
            settings.screens_import_prefix,
            screen.kebab_name
        ));
    }

    pub fn screen_count(&self) -> usize {
        self.exports.len()
    }

    /// Telemetry import first, screen exports, then the shared hooks.
    pub fn render(&self, settings: &EmitSettings) -> String {
        let mut lines = Vec::with_capacity(self.exports.len() + 5);
        lines.push("// Initialize telemetry FIRST, before any Core SDK imports".to_string());
        lines.push(format!("import '{}';", settings.telemetry_module));
        lines.push(String::new());
        lines.extend(self.exports.iter().cloned());
        lines.push(format!(
            "export {{ useCurrentScreen, useErrors, useAuth0Themes }} from '{}';",
            settings.index_hooks_module
        ));
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

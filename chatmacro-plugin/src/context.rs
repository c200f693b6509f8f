//! Invocation context

use chatmacro_core::{MacroTable, TemplateError};

/// Read-only view of the render state handed to a plugin
pub struct PluginContext<'a> {
    plugin: &'a str,
    macros: &'a MacroTable,
}

impl<'a> PluginContext<'a> {
    pub fn new(plugin: &'a str, macros: &'a MacroTable) -> Self {
        Self { plugin, macros }
    }

    /// Name the plugin was invoked under
    pub fn plugin_name(&self) -> &str {
        self.plugin
    }

    pub fn macros(&self) -> &MacroTable {
        self.macros
    }

    /// Expand `%NAME:KEY%` references in `text` against the current table
    pub fn substitute(&self, text: &str) -> Result<String, TemplateError> {
        self.macros.substitute(text)
    }
}

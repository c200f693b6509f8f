//! chatmacro Standard Library
//!
//! General-purpose plugins every chat bot template can use. Service-specific
//! plugins (stream info, score lookups) are registered by the bot itself.

pub mod plugins;
mod helpers;

pub use helpers::ArgError;

use chatmacro_plugin::PluginRegistry;

/// Load standard library into registry
pub fn load_standard_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        .with_plugin(plugins::Echo)
        .with_plugin(plugins::Upper)
        .with_plugin(plugins::Lower)
        .with_plugin(plugins::Split)
        .with_plugin(plugins::Counter::new())
}

/// Create registry with standard library
pub fn standard_registry() -> PluginRegistry {
    load_standard_library(PluginRegistry::new())
}

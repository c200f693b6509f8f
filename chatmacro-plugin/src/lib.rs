//! chatmacro Plugin System
//!
//! Provides the contract between templates and the code behind them:
//! - `Plugin`: named async callable behind `$(NAME=value|scope)`
//! - `PluginResult`: literal text, or bindings that feed the macro's scope
//! - `PluginRegistry`: name-keyed plugin lookup with help and suggestions

mod traits;
mod registry;
mod context;

pub use traits::{Plugin, PluginMeta, PluginResult, ArgMeta, FnPlugin};
pub use registry::PluginRegistry;
pub use context::PluginContext;

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        Plugin, PluginMeta, PluginResult, ArgMeta, FnPlugin,
        PluginRegistry, PluginContext,
    };
    pub use async_trait::async_trait;
    pub use chatmacro_core::prelude::*;
}

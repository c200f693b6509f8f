//! Structured template errors
//!
//! Every error aborts the render it occurred in. Callers log them with the
//! plugin/macro identity and show a fallback message instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error type returned by failing plugins
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNTERMINATED_MACRO: &str = "UNTERMINATED_MACRO";
    pub const EMPTY_MACRO_NAME: &str = "EMPTY_MACRO_NAME";
    pub const NESTING_TOO_DEEP: &str = "NESTING_TOO_DEEP";
    pub const UNKNOWN_PLUGIN: &str = "UNKNOWN_PLUGIN";
    pub const UNKNOWN_MACRO: &str = "UNKNOWN_MACRO";
    pub const UNKNOWN_MACRO_KEY: &str = "UNKNOWN_MACRO_KEY";
    pub const MISSING_SCOPE: &str = "MISSING_SCOPE";
    pub const PLUGIN_ERROR: &str = "PLUGIN_ERROR";
}

/// Errors raised while parsing or evaluating a template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// End of input reached while a macro, value or scope was still open
    #[error("unterminated macro `{name}` opened at byte {offset}")]
    UnterminatedMacro { name: String, offset: usize },

    #[error("macro at byte {offset} has no name")]
    EmptyMacroName { offset: usize },

    #[error("macro at byte {offset} is nested more than {limit} scopes deep")]
    NestingTooDeep { offset: usize, limit: usize },

    #[error("unknown plugin `{name}`")]
    UnknownPlugin {
        name: String,
        /// Registered names resembling `name`, best match first
        similar: Vec<String>,
    },

    #[error("unknown macro `{name}`")]
    UnknownMacro { name: String },

    #[error("unknown macro key `{name}:{key}`")]
    UnknownMacroKey { name: String, key: String },

    /// The plugin returned bindings but the macro had no `|` scope to evaluate
    #[error("plugin `{plugin}` returned bindings but the macro has no scope")]
    MissingScope { plugin: String },

    #[error("plugin `{plugin}` failed: {source}")]
    PluginExecution {
        plugin: String,
        #[source]
        source: BoxError,
    },
}

impl TemplateError {
    /// Machine-readable code, one of [`codes`]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnterminatedMacro { .. } => codes::UNTERMINATED_MACRO,
            Self::EmptyMacroName { .. } => codes::EMPTY_MACRO_NAME,
            Self::NestingTooDeep { .. } => codes::NESTING_TOO_DEEP,
            Self::UnknownPlugin { .. } => codes::UNKNOWN_PLUGIN,
            Self::UnknownMacro { .. } => codes::UNKNOWN_MACRO,
            Self::UnknownMacroKey { .. } => codes::UNKNOWN_MACRO_KEY,
            Self::MissingScope { .. } => codes::MISSING_SCOPE,
            Self::PluginExecution { .. } => codes::PLUGIN_ERROR,
        }
    }

    /// Hint for the template author
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::UnterminatedMacro { .. } => {
                Some("Close the macro with `)` or escape the `$(` as `\\$(`".to_string())
            }
            Self::EmptyMacroName { .. } => Some("Write the plugin name right after `$(`".to_string()),
            Self::NestingTooDeep { limit, .. } => {
                Some(format!("Keep `$(...|...)` scopes within {} levels", limit))
            }
            Self::UnknownPlugin { similar, .. } if !similar.is_empty() => {
                let names: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
                Some(format!("Similar: {}", names.join(", ")))
            }
            Self::UnknownPlugin { .. } => None,
            Self::UnknownMacro { name } => {
                Some(format!("Run a `$({}...|...)` plugin before referencing it", name))
            }
            Self::UnknownMacroKey { name, .. } => {
                Some(format!("Check which keys `{}` provides", name))
            }
            Self::MissingScope { plugin } => {
                Some(format!("Use `$({}=...|...)` and reference its keys in the scope", plugin))
            }
            Self::PluginExecution { .. } => None,
        }
    }

    /// Serializable view of this error
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code().to_string(),
            message: self.to_string(),
            suggestion: self.suggestion(),
        }
    }

    pub fn plugin_failed(plugin: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::PluginExecution {
            plugin: plugin.into(),
            source: source.into(),
        }
    }
}

/// Structured error for logs and front ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorReport {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

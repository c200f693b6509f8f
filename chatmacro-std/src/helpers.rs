//! Helper functions for plugin arguments

use thiserror::Error;

/// Argument problems reported by standard plugins
#[derive(Debug, Error)]
pub enum ArgError {
    #[error("{plugin} needs an argument, e.g. $({plugin}=...)")]
    Missing { plugin: &'static str },

    #[error("{plugin}: {reason}")]
    Invalid { plugin: &'static str, reason: String },
}

/// Extract the raw argument, returning an error if it was not given
pub fn require_arg<'a>(arg: Option<&'a str>, plugin: &'static str) -> Result<&'a str, ArgError> {
    arg.ok_or(ArgError::Missing { plugin })
}

/// Argument with surrounding whitespace removed; empty counts as missing
pub fn require_trimmed<'a>(arg: Option<&'a str>, plugin: &'static str) -> Result<&'a str, ArgError> {
    match require_arg(arg, plugin)?.trim() {
        "" => Err(ArgError::Missing { plugin }),
        s => Ok(s),
    }
}

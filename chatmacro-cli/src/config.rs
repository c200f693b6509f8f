//! Environment configuration

use chatmacro::MacroTable;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FALLBACK: &str = "Something went wrong while running that command.";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Reply sent in place of a failed render
    pub fallback: String,
    pub timeout: Duration,
    /// JSON file holding the base macro table
    pub macros_file: Option<PathBuf>,
}

impl Config {
    /// Read `CHATMACRO_FALLBACK`, `CHATMACRO_TIMEOUT_MS` and `CHATMACRO_MACROS_FILE`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let timeout_ms = match get("CHATMACRO_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid CHATMACRO_TIMEOUT_MS, using default");
                DEFAULT_TIMEOUT_MS
            }),
            None => DEFAULT_TIMEOUT_MS,
        };

        Self {
            fallback: get("CHATMACRO_FALLBACK").unwrap_or_else(|| DEFAULT_FALLBACK.to_string()),
            timeout: Duration::from_millis(timeout_ms),
            macros_file: get("CHATMACRO_MACROS_FILE").map(PathBuf::from),
        }
    }

    /// Base macro table from `macros_file`, empty when unset
    pub fn load_macros(&self) -> Result<MacroTable, String> {
        let Some(path) = &self.macros_file else {
            return Ok(MacroTable::new());
        };
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid macro table in '{}': {}", path.display(), e))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

//! Macro table: `name -> key -> value` lookups for `%NAME:KEY%` references

use crate::TemplateError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// `%NAME:KEY%`, where neither part may contain `:` or `%`
fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%([^%:]+):([^%:]+)%").expect("valid macro reference regex"))
}

/// Two-level string table read by `%NAME:KEY%` substitution and written by
/// plugins that return bindings.
///
/// Each render should own its table; plugin bindings are installed in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroTable {
    entries: HashMap<String, HashMap<String, String>>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a single `name:key` entry
    pub fn with(mut self, name: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, key, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(name.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn get(&self, name: &str, key: &str) -> Option<&str> {
        self.entries.get(name)?.get(key).map(|v| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `name:key`, distinguishing a missing name from a missing key
    pub fn lookup(&self, name: &str, key: &str) -> Result<&str, TemplateError> {
        let keys = self.entries.get(name).ok_or_else(|| TemplateError::UnknownMacro {
            name: name.to_string(),
        })?;
        keys.get(key)
            .map(|v| v.as_str())
            .ok_or_else(|| TemplateError::UnknownMacroKey {
                name: name.to_string(),
                key: key.to_string(),
            })
    }

    /// Merge bindings into `name`'s sub-map, overwriting keys that already exist
    pub fn install<I, K, V>(&mut self, name: &str, bindings: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let keys = self.entries.entry(name.to_string()).or_default();
        for (key, value) in bindings {
            keys.insert(key.into(), value.into());
        }
    }

    /// Lay `other` over this table; entries in `other` win key by key
    pub fn merge(&mut self, other: MacroTable) {
        for (name, keys) in other.entries {
            self.install(&name, keys);
        }
    }

    /// Replace every `%NAME:KEY%` in `text` with its value.
    ///
    /// Single pass, left to right, non-overlapping. Substituted values are not
    /// scanned again and `%` cannot be escaped.
    pub fn substitute(&self, text: &str) -> Result<String, TemplateError> {
        if !text.contains('%') {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in reference_regex().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&text[last..whole.start()]);
            out.push_str(self.lookup(&caps[1], &caps[2])?);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl FromIterator<(String, String, String)> for MacroTable {
    fn from_iter<T: IntoIterator<Item = (String, String, String)>>(iter: T) -> Self {
        let mut table = MacroTable::new();
        for (name, key, value) in iter {
            table.insert(name, key, value);
        }
        table
    }
}

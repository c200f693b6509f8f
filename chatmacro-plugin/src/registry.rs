//! Plugin Registry

use crate::{Plugin, PluginMeta};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Central plugin registry.
///
/// Names are matched exactly: the plugin name doubles as the macro table key
/// for the bindings it returns, so `GAME` and `game` are different plugins.
#[derive(Clone)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    pub fn with_plugin<P: Plugin + 'static>(mut self, p: P) -> Self {
        self.register(p);
        self
    }

    /// Add a plugin, replacing any plugin already registered under its name
    pub fn register<P: Plugin + 'static>(&mut self, p: P) {
        let name = p.meta().name.to_string();
        if self.plugins.insert(name.clone(), Arc::new(p)).is_some() {
            tracing::warn!(plugin = %name, "plugin replaced an existing registration");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Find plugin names similar to the given name (for error suggestions)
    pub fn find_similar(&self, name: &str) -> Vec<String> {
        let query = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self
            .plugins
            .keys()
            .filter_map(|candidate| {
                let score = Self::similarity_score(&query, &candidate.to_lowercase());
                if score > 0 {
                    Some((candidate.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Higher score first, name breaks ties so suggestions are stable
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    /// Calculate similarity score between two lowercased names
    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();

        // Require most of the query's letters to be present before suggesting
        if score == 0 && common * 2 < query_chars.len().max(1) + 1 {
            return 0;
        }
        score += common * 2;

        // Penalize length difference
        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }

    pub fn help(&self, name: &str) -> Option<PluginMeta> {
        self.plugins.get(name).map(|p| p.meta())
    }

    /// Metadata for every plugin, optionally filtered by category, sorted by name
    pub fn list_plugins(&self, category: Option<&str>) -> Vec<PluginMeta> {
        let mut metas: Vec<PluginMeta> = self
            .plugins
            .values()
            .map(|p| p.meta())
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect();
        metas.sort_by(|a, b| a.name.cmp(b.name));
        metas
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

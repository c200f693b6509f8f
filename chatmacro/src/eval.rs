//! Template evaluator
//!
//! Walks a parse tree depth-first, strictly left to right. Plugins are awaited
//! one at a time so bindings installed by one macro are visible to every node
//! evaluated after it.

use crate::ast::ParseNode;
use chatmacro_core::{MacroTable, TemplateError};
use chatmacro_plugin::{PluginContext, PluginRegistry, PluginResult};
use std::future::Future;
use std::pin::Pin;

type EvalFuture<'a> = Pin<Box<dyn Future<Output = Result<String, TemplateError>> + Send + 'a>>;

/// Tree evaluator bound to a plugin registry
pub struct Evaluator<'r> {
    registry: &'r PluginRegistry,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r PluginRegistry) -> Self {
        Self { registry }
    }

    /// Render `node`, reading and extending `macros`
    pub async fn eval(&self, node: &ParseNode, macros: &mut MacroTable) -> Result<String, TemplateError> {
        self.eval_node(node, macros).await
    }

    fn eval_node<'a>(&'a self, node: &'a ParseNode, macros: &'a mut MacroTable) -> EvalFuture<'a> {
        Box::pin(async move {
            match node {
                ParseNode::Text(content) => macros.substitute(content),

                ParseNode::Children(items) => {
                    let mut out = String::new();
                    for item in items {
                        out.push_str(&self.eval_node(item, macros).await?);
                    }
                    Ok(out)
                }

                ParseNode::Macro { name, value, scope } => {
                    self.eval_macro(name, value.as_deref(), scope.as_deref(), macros).await
                }
            }
        })
    }

    async fn eval_macro(
        &self,
        name: &str,
        value: Option<&str>,
        scope: Option<&ParseNode>,
        macros: &mut MacroTable,
    ) -> Result<String, TemplateError> {
        let plugin = self.registry.get(name).ok_or_else(|| TemplateError::UnknownPlugin {
            name: name.to_string(),
            similar: self.registry.find_similar(name),
        })?;

        tracing::debug!(plugin = name, arg = ?value, "invoking plugin");
        let result = {
            let ctx = PluginContext::new(name, macros);
            plugin.invoke(value, &ctx).await
        };

        match result {
            Ok(PluginResult::Text(text)) => Ok(text),
            Ok(PluginResult::Bindings(bindings)) => {
                let scope = scope.ok_or_else(|| TemplateError::MissingScope {
                    plugin: name.to_string(),
                })?;
                tracing::debug!(plugin = name, keys = bindings.len(), "installing bindings");
                macros.install(name, bindings);
                self.eval_node(scope, macros).await
            }
            Err(source) => {
                tracing::debug!(plugin = name, error = %source, "plugin failed");
                Err(TemplateError::PluginExecution {
                    plugin: name.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::build_tree;
    use chatmacro_plugin::FnPlugin;

    fn registry() -> PluginRegistry {
        PluginRegistry::new()
            .with_plugin(FnPlugin::new("GAME", |arg: Option<&str>| {
                Ok(PluginResult::bindings([("GEO", format!("game of {}", arg.unwrap_or("?")))]))
            }))
            .with_plugin(FnPlugin::new("SAY", |arg: Option<&str>| {
                Ok(PluginResult::text(arg.unwrap_or_default()))
            }))
            .with_plugin(FnPlugin::new("BROKEN", |_| Err("upstream timed out".into())))
    }

    async fn eval(template: &str, macros: &mut MacroTable) -> Result<String, TemplateError> {
        let reg = registry();
        let tree = build_tree(template)?;
        Evaluator::new(&reg).eval(&tree, macros).await
    }

    #[tokio::test]
    async fn test_text_plugin_ignores_scope() {
        let out = eval("$(SAY=hi|ignored)", &mut MacroTable::new()).await.unwrap();
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn test_value_is_not_substituted() {
        let mut macros = MacroTable::new().with("U", "N", "geo");
        let out = eval("$(SAY=%U:N%)", &mut macros).await.unwrap();
        assert_eq!(out, "%U:N%");
    }

    #[tokio::test]
    async fn test_plugin_text_is_not_substituted() {
        let mut macros = MacroTable::new().with("U", "N", "geo");
        let out = eval(r"$(SAY=\%U:N\%) %U:N%", &mut macros).await.unwrap();
        assert_eq!(out, "%U:N% geo");
    }

    #[tokio::test]
    async fn test_bindings_visible_to_later_siblings() {
        let mut macros = MacroTable::new();
        let out = eval("$(GAME=a|) then %GAME:GEO%", &mut macros).await.unwrap();
        assert_eq!(out, " then game of a");
        assert_eq!(macros.get("GAME", "GEO"), Some("game of a"));
    }

    #[tokio::test]
    async fn test_nested_same_plugin() {
        let mut macros = MacroTable::new();
        let out = eval("$(GAME=a|%GAME:GEO% and $(GAME=b|%GAME:GEO%))", &mut macros)
            .await
            .unwrap();
        assert_eq!(out, "game of a and game of b");
    }

    #[tokio::test]
    async fn test_missing_scope() {
        let err = eval("$(GAME=a)", &mut MacroTable::new()).await.unwrap_err();
        assert!(matches!(err, TemplateError::MissingScope { ref plugin } if plugin == "GAME"));
    }

    #[tokio::test]
    async fn test_plugin_failure_is_wrapped() {
        let err = eval("x $(BROKEN)", &mut MacroTable::new()).await.unwrap_err();
        match err {
            TemplateError::PluginExecution { plugin, source } => {
                assert_eq!(plugin, "BROKEN");
                assert_eq!(source.to_string(), "upstream timed out");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_plugin_lists_similar() {
        let err = eval("$(GAM=x)", &mut MacroTable::new()).await.unwrap_err();
        match err {
            TemplateError::UnknownPlugin { name, similar } => {
                assert_eq!(name, "GAM");
                assert_eq!(similar.first().map(|s| s.as_str()), Some("GAME"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_macro_in_scope() {
        let err = eval("$(GAME=a|%GAME:NOPE%)", &mut MacroTable::new()).await.unwrap_err();
        assert!(matches!(err, TemplateError::UnknownMacroKey { .. }));
    }
}

//! chatmacro - chat reply templates
//!
//! Templates mix plain text, `%NAME:KEY%` references into a macro table and
//! `$(PLUGIN=value|scope)` plugin invocations:
//!
//! ```text
//! @%USER:NAME% is playing $(TWITCH_GAME=%USER:NAME%|%TWITCH_GAME:GAME%)
//! ```
//!
//! Rendering is two-phase: [`build_tree`] parses the whole template, then the
//! [`Evaluator`] walks the tree, invoking plugins in order.

mod parser;
mod ast;
mod eval;
mod render;

pub use ast::ParseNode;
pub use eval::Evaluator;
pub use parser::{build_tree, MAX_NESTING};
pub use render::Renderer;

pub use chatmacro_core::{codes, BoxError, ErrorReport, MacroTable, TemplateError};
pub use chatmacro_plugin::{
    ArgMeta, FnPlugin, Plugin, PluginContext, PluginMeta, PluginRegistry, PluginResult,
};

/// Everything needed to write plugins and render templates
pub mod prelude {
    pub use chatmacro_plugin::prelude::*;
    pub use crate::{build_tree, render_template, Engine, ParseNode};
}

use std::sync::Arc;

/// Parse `input` and evaluate it against `plugins` and `macros`.
///
/// Nothing is returned unless the whole template renders; bindings installed
/// by plugins before a failure stay in `macros`.
pub async fn render_template(
    input: &str,
    plugins: &PluginRegistry,
    macros: &mut MacroTable,
) -> Result<String, TemplateError> {
    let tree = build_tree(input)?;
    tracing::trace!(plugins = ?tree.plugin_names(), "template parsed");
    Evaluator::new(plugins).eval(&tree, macros).await
}

/// Main chatmacro engine
///
/// Holds the plugin registry and a base macro table. Every render works on its
/// own copy of the base table, so concurrent renders never see each other's
/// bindings.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<PluginRegistry>,
    macros: MacroTable,
}

impl Engine {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            macros: MacroTable::new(),
        }
    }

    pub fn with_standard_library() -> Self {
        Self::new(chatmacro_std::standard_registry())
    }

    /// Base table copied into every render
    pub fn with_macros(mut self, macros: MacroTable) -> Self {
        self.macros = macros;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub async fn render(&self, template: &str) -> Result<String, TemplateError> {
        let mut macros = self.macros.clone();
        render_template(template, &self.registry, &mut macros).await
    }

    /// Render with per-call entries laid over the base table
    pub async fn render_with(&self, template: &str, overrides: MacroTable) -> Result<String, TemplateError> {
        let mut macros = self.macros.clone();
        macros.merge(overrides);
        render_template(template, &self.registry, &mut macros).await
    }

    pub fn help(&self, name: &str) -> Option<PluginMeta> {
        self.registry.help(name)
    }

    pub fn list_plugins(&self, category: Option<&str>) -> Vec<PluginMeta> {
        self.registry.list_plugins(category)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_standard_library()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twitch_game_text() -> PluginRegistry {
        PluginRegistry::new().with_plugin(FnPlugin::new("TWITCH_GAME", |arg: Option<&str>| {
            match arg {
                Some("geo") => Ok(PluginResult::text("osu!")),
                other => Err(format!("no channel {:?}", other).into()),
            }
        }))
    }

    fn twitch_game_bindings() -> PluginRegistry {
        PluginRegistry::new().with_plugin(FnPlugin::new("TWITCH_GAME", |arg: Option<&str>| {
            let game = if arg == Some("geo") { "osu!" } else { "tetris" };
            Ok(PluginResult::bindings([("GEO", game)]))
        }))
    }

    async fn render(input: &str, plugins: &PluginRegistry, macros: &mut MacroTable) -> Result<String, TemplateError> {
        render_template(input, plugins, macros).await
    }

    #[tokio::test]
    async fn test_plain_text_identity() {
        let empty = PluginRegistry::new();
        for text in ["", "hello world", "  spaced  ", "a (b) | c = d", "ünïcödé ✓"] {
            let out = render(text, &empty, &mut MacroTable::new()).await.unwrap();
            assert_eq!(out, text);
        }
    }

    #[tokio::test]
    async fn test_escaping() {
        let empty = PluginRegistry::new();
        assert_eq!(render("\\$(x)", &empty, &mut MacroTable::new()).await.unwrap(), "$(x)");
        assert_eq!(render("\\%a\\%", &empty, &mut MacroTable::new()).await.unwrap(), "%a%");
    }

    #[tokio::test]
    async fn test_macro_substitution() {
        let mut macros = MacroTable::new().with("TWITCH", "NAME", "geo");
        let out = render("Hello %TWITCH:NAME%", &PluginRegistry::new(), &mut macros).await.unwrap();
        assert_eq!(out, "Hello geo");
    }

    #[tokio::test]
    async fn test_plugin_returning_text() {
        let out = render("played $(TWITCH_GAME=geo)", &twitch_game_text(), &mut MacroTable::new())
            .await
            .unwrap();
        assert_eq!(out, "played osu!");
    }

    #[tokio::test]
    async fn test_plugin_returning_bindings() {
        let out = render(
            "played $(TWITCH_GAME=geo|%TWITCH_GAME:GEO%)",
            &twitch_game_bindings(),
            &mut MacroTable::new(),
        )
        .await
        .unwrap();
        assert_eq!(out, "played osu!");
    }

    #[tokio::test]
    async fn test_nested_invocations_resolve_independently() {
        let out = render(
            "$(TWITCH_GAME=geo|%TWITCH_GAME:GEO% vs $(TWITCH_GAME=bob|%TWITCH_GAME:GEO%))",
            &twitch_game_bindings(),
            &mut MacroTable::new(),
        )
        .await
        .unwrap();
        assert_eq!(out, "osu! vs tetris");
    }

    #[tokio::test]
    async fn test_unterminated_macro() {
        assert!(matches!(build_tree("$(abc"), Err(TemplateError::UnterminatedMacro { .. })));
        let err = render("$(abc", &PluginRegistry::new(), &mut MacroTable::new()).await.unwrap_err();
        assert_eq!(err.code(), codes::UNTERMINATED_MACRO);
    }

    #[tokio::test]
    async fn test_unknown_plugin() {
        let err = render("$(NOPE)", &PluginRegistry::new(), &mut MacroTable::new()).await.unwrap_err();
        assert!(matches!(err, TemplateError::UnknownPlugin { ref name, .. } if name == "NOPE"));
    }

    #[tokio::test]
    async fn test_plugin_error_aborts_render() {
        let err = render("a $(TWITCH_GAME=bob) b", &twitch_game_text(), &mut MacroTable::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::PLUGIN_ERROR);
        assert!(err.to_string().contains("TWITCH_GAME"));
    }

    #[tokio::test]
    async fn test_determinism_with_independent_tables() {
        let plugins = twitch_game_bindings();
        let seed = MacroTable::new().with("USER", "NAME", "geo");
        let template = "%USER:NAME%: $(TWITCH_GAME=geo|%TWITCH_GAME:GEO%)";

        let mut first = seed.clone();
        let mut second = seed.clone();
        let a = render(template, &plugins, &mut first).await.unwrap();
        let b = render(template, &plugins, &mut second).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_engine_isolates_renders() {
        let engine = Engine::new(twitch_game_bindings())
            .with_macros(MacroTable::new().with("USER", "NAME", "geo"));

        let out = engine.render("$(TWITCH_GAME=geo|%USER:NAME% plays %TWITCH_GAME:GEO%)").await.unwrap();
        assert_eq!(out, "geo plays osu!");

        // Bindings from the previous render are gone
        let err = engine.render("%TWITCH_GAME:GEO%").await.unwrap_err();
        assert!(matches!(err, TemplateError::UnknownMacro { .. }));
    }

    #[tokio::test]
    async fn test_engine_render_with_overrides() {
        let engine = Engine::new(PluginRegistry::new())
            .with_macros(MacroTable::new().with("USER", "NAME", "geo").with("BOT", "NAME", "quill"));
        let out = engine
            .render_with("%BOT:NAME% greets %USER:NAME%", MacroTable::new().with("USER", "NAME", "ann"))
            .await
            .unwrap();
        assert_eq!(out, "quill greets ann");
    }

    #[tokio::test]
    async fn test_engine_concurrent_renders() {
        let engine = Engine::new(twitch_game_bindings());
        let tasks: Vec<_> = ["geo", "bob", "geo", "amy"]
            .into_iter()
            .map(|channel| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    let template = format!("$(TWITCH_GAME={}|%TWITCH_GAME:GEO%)", channel);
                    engine.render(&template).await
                })
            })
            .collect();

        let mut outputs = Vec::new();
        for task in tasks {
            outputs.push(task.await.unwrap().unwrap());
        }
        assert_eq!(outputs, vec!["osu!", "tetris", "osu!", "tetris"]);
    }

    #[tokio::test]
    async fn test_standard_library_engine() {
        let engine = Engine::with_standard_library();
        let out = engine.render("$(UPPER=gg) $(SPLIT=a b|%SPLIT:2%)").await.unwrap();
        assert_eq!(out, "GG b");
        assert!(engine.help("UPPER").is_some());
    }

    #[tokio::test]
    async fn test_split_examples_render_as_documented() {
        let engine = Engine::with_standard_library();
        let meta = engine.help("SPLIT").unwrap();
        for example in meta.examples {
            let (template, expected) = example.split_once(" → ").unwrap();
            assert_eq!(engine.render(template).await.unwrap(), expected, "{}", example);
        }
    }
}

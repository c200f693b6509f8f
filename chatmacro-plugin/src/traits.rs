//! Plugin traits

use crate::PluginContext;
use async_trait::async_trait;
use chatmacro_core::BoxError;
use serde::Serialize;

/// Metadata about a plugin argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl ArgMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: false, default: None }
    }

    pub const fn optional(name: &'static str, typ: &'static str, description: &'static str, default: &'static str) -> Self {
        Self { name, typ, description, optional: true, default: Some(default) }
    }
}

/// Metadata for a plugin
#[derive(Debug, Clone, Serialize)]
pub struct PluginMeta {
    /// Name used in `$(NAME...)` and as the macro table key for its bindings
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub args: &'static [ArgMeta],
    /// Keys installed when the plugin returns bindings
    pub provides: &'static [&'static str],
    pub examples: &'static [&'static str],
    pub category: &'static str,
}

impl PluginMeta {
    /// Minimal metadata for ad-hoc plugins
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            description: "",
            usage: "",
            args: &[],
            provides: &[],
            examples: &[],
            category: "custom",
        }
    }
}

/// What a plugin produced for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginResult {
    /// Rendered directly as the macro's output
    Text(String),
    /// Installed under the plugin's name, then the macro's scope is rendered
    Bindings(Vec<(String, String)>),
}

impl PluginResult {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn bindings<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Bindings(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bindings(_) => "bindings",
        }
    }
}

/// Named callable invoked by `$(NAME[=value][|scope])`.
///
/// `arg` is the raw value text exactly as written in the template; it is never
/// substituted by the engine. Plugins that want `%NAME:KEY%` expansion in
/// their argument call [`PluginContext::substitute`] themselves.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn meta(&self) -> PluginMeta;
    async fn invoke(&self, arg: Option<&str>, ctx: &PluginContext<'_>) -> Result<PluginResult, BoxError>;
}

/// Plugin backed by a synchronous closure
pub struct FnPlugin<F> {
    meta: PluginMeta,
    f: F,
}

impl<F> FnPlugin<F> {
    pub fn new(name: &'static str, f: F) -> Self
    where
        F: Fn(Option<&str>) -> Result<PluginResult, BoxError> + Send + Sync,
    {
        Self { meta: PluginMeta::named(name), f }
    }

    pub fn with_meta(mut self, meta: PluginMeta) -> Self {
        self.meta = meta;
        self
    }
}

#[async_trait]
impl<F> Plugin for FnPlugin<F>
where
    F: Fn(Option<&str>) -> Result<PluginResult, BoxError> + Send + Sync,
{
    fn meta(&self) -> PluginMeta {
        self.meta.clone()
    }

    async fn invoke(&self, arg: Option<&str>, _ctx: &PluginContext<'_>) -> Result<PluginResult, BoxError> {
        (self.f)(arg)
    }
}

//! Text plugins: ECHO, UPPER, LOWER

use chatmacro_plugin::prelude::*;
use crate::helpers::require_arg;

// ============ Echo ============

pub struct Echo;

static ECHO_ARGS: [ArgMeta; 1] = [ArgMeta::optional("text", "Text", "Text to output verbatim", "")];
static ECHO_EXAMPLES: [&str; 2] = ["$(ECHO=hello) → hello", "$(ECHO) → (empty)"];

#[async_trait]
impl Plugin for Echo {
    fn meta(&self) -> PluginMeta {
        PluginMeta {
            name: "ECHO",
            description: "Output the raw argument unchanged",
            usage: "$(ECHO=text)",
            args: &ECHO_ARGS,
            provides: &[],
            examples: &ECHO_EXAMPLES,
            category: "text",
        }
    }

    async fn invoke(&self, arg: Option<&str>, _ctx: &PluginContext<'_>) -> Result<PluginResult, BoxError> {
        Ok(PluginResult::text(arg.unwrap_or_default()))
    }
}

// ============ Upper ============

pub struct Upper;

static UPPER_ARGS: [ArgMeta; 1] = [ArgMeta::required("text", "Text", "Text to convert; %NAME:KEY% references are expanded")];
static UPPER_EXAMPLES: [&str; 2] = ["$(UPPER=gg) → GG", "$(UPPER=%USER:NAME%) → GEO"];

#[async_trait]
impl Plugin for Upper {
    fn meta(&self) -> PluginMeta {
        PluginMeta {
            name: "UPPER",
            description: "Convert text to uppercase",
            usage: "$(UPPER=text)",
            args: &UPPER_ARGS,
            provides: &[],
            examples: &UPPER_EXAMPLES,
            category: "text",
        }
    }

    async fn invoke(&self, arg: Option<&str>, ctx: &PluginContext<'_>) -> Result<PluginResult, BoxError> {
        let text = ctx.substitute(require_arg(arg, "UPPER")?)?;
        Ok(PluginResult::text(text.to_uppercase()))
    }
}

// ============ Lower ============

pub struct Lower;

static LOWER_ARGS: [ArgMeta; 1] = [ArgMeta::required("text", "Text", "Text to convert; %NAME:KEY% references are expanded")];
static LOWER_EXAMPLES: [&str; 1] = ["$(LOWER=GG) → gg"];

#[async_trait]
impl Plugin for Lower {
    fn meta(&self) -> PluginMeta {
        PluginMeta {
            name: "LOWER",
            description: "Convert text to lowercase",
            usage: "$(LOWER=text)",
            args: &LOWER_ARGS,
            provides: &[],
            examples: &LOWER_EXAMPLES,
            category: "text",
        }
    }

    async fn invoke(&self, arg: Option<&str>, ctx: &PluginContext<'_>) -> Result<PluginResult, BoxError> {
        let text = ctx.substitute(require_arg(arg, "LOWER")?)?;
        Ok(PluginResult::text(text.to_lowercase()))
    }
}

//! SPLIT: break a chat command's argument into numbered words

use chatmacro_plugin::prelude::*;

pub struct Split;

static SPLIT_ARGS: [ArgMeta; 1] = [ArgMeta::optional("text", "Text", "Words separated by whitespace", "")];
static SPLIT_PROVIDES: [&str; 5] = ["1..N", "COUNT", "ALL", "FIRST", "REST"];
static SPLIT_EXAMPLES: [&str; 2] = [
    "$(SPLIT=!title chill vibes|%SPLIT:1% sets %SPLIT:REST%) → !title sets chill vibes",
    "$(SPLIT=a b c|%SPLIT:COUNT%) → 3",
];

#[async_trait]
impl Plugin for Split {
    fn meta(&self) -> PluginMeta {
        PluginMeta {
            name: "SPLIT",
            description: "Split the argument on whitespace and bind each word by position",
            usage: "$(SPLIT=text|...%SPLIT:1%...)",
            args: &SPLIT_ARGS,
            provides: &SPLIT_PROVIDES,
            examples: &SPLIT_EXAMPLES,
            category: "args",
        }
    }

    async fn invoke(&self, arg: Option<&str>, _ctx: &PluginContext<'_>) -> Result<PluginResult, BoxError> {
        let all = arg.unwrap_or_default().trim();
        let words: Vec<&str> = all.split_whitespace().collect();

        let rest = match all.split_once(char::is_whitespace) {
            Some((_, rest)) => rest.trim_start(),
            None => "",
        };

        let mut bindings: Vec<(String, String)> = words
            .iter()
            .enumerate()
            .map(|(i, w)| ((i + 1).to_string(), w.to_string()))
            .collect();
        bindings.push(("COUNT".to_string(), words.len().to_string()));
        bindings.push(("ALL".to_string(), all.to_string()));
        bindings.push(("FIRST".to_string(), words.first().copied().unwrap_or_default().to_string()));
        bindings.push(("REST".to_string(), rest.to_string()));
        Ok(PluginResult::Bindings(bindings))
    }
}

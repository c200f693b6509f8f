//! COUNTER: named counters that live as long as the registry

use chatmacro_plugin::prelude::*;
use crate::helpers::{require_trimmed, ArgError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Increments a named counter on every invocation
#[derive(Default)]
pub struct Counter {
    counts: Mutex<HashMap<String, u64>>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value without incrementing
    pub fn peek(&self, name: &str) -> u64 {
        self.counts
            .lock()
            .map(|counts| counts.get(name).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn increment(&self, name: &str) -> Result<u64, ArgError> {
        let mut counts = self.counts.lock().map_err(|_| ArgError::Invalid {
            plugin: "COUNTER",
            reason: "counter state is poisoned".to_string(),
        })?;
        let count = counts.entry(name.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}

static COUNTER_ARGS: [ArgMeta; 1] = [ArgMeta::required("name", "Text", "Counter name, a single word")];
static COUNTER_PROVIDES: [&str; 2] = ["NAME", "COUNT"];
static COUNTER_EXAMPLES: [&str; 1] = ["$(COUNTER=deaths|Deaths: %COUNTER:COUNT%) → Deaths: 3"];

#[async_trait]
impl Plugin for Counter {
    fn meta(&self) -> PluginMeta {
        PluginMeta {
            name: "COUNTER",
            description: "Increment a named counter and bind its new value",
            usage: "$(COUNTER=name|...%COUNTER:COUNT%...)",
            args: &COUNTER_ARGS,
            provides: &COUNTER_PROVIDES,
            examples: &COUNTER_EXAMPLES,
            category: "state",
        }
    }

    async fn invoke(&self, arg: Option<&str>, _ctx: &PluginContext<'_>) -> Result<PluginResult, BoxError> {
        let name = require_trimmed(arg, "COUNTER")?;
        if name.contains(char::is_whitespace) {
            return Err(ArgError::Invalid {
                plugin: "COUNTER",
                reason: format!("counter name `{}` must be a single word", name),
            }
            .into());
        }

        let count = self.increment(name)?;
        tracing::debug!(counter = name, count, "counter incremented");
        Ok(PluginResult::bindings([("NAME", name.to_string()), ("COUNT", count.to_string())]))
    }
}

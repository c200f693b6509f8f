//! Template parse tree

use serde::{Deserialize, Serialize};

/// One node of a parsed template. Trees are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseNode {
    /// Literal text, escapes already resolved
    Text(String),
    /// Rendered as the concatenation of its items; never empty
    Children(Vec<ParseNode>),
    /// `$(name[=value][|scope])`
    Macro {
        name: String,
        /// Raw argument text, handed to the plugin unparsed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<Box<ParseNode>>,
    },
}

impl ParseNode {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn invoke(name: impl Into<String>) -> Self {
        Self::Macro {
            name: name.into(),
            value: None,
            scope: None,
        }
    }

    /// Builder for macro nodes: attach a raw value
    pub fn with_value(self, value: impl Into<String>) -> Self {
        match self {
            Self::Macro { name, scope, .. } => Self::Macro {
                name,
                value: Some(value.into()),
                scope,
            },
            other => other,
        }
    }

    /// Builder for macro nodes: attach a scope tree
    pub fn with_scope(self, scope: ParseNode) -> Self {
        match self {
            Self::Macro { name, value, .. } => Self::Macro {
                name,
                value,
                scope: Some(Box::new(scope)),
            },
            other => other,
        }
    }

    /// Names of every plugin this tree invokes, in evaluation order
    pub fn plugin_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_plugin_names(&mut names);
        names
    }

    fn collect_plugin_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Text(_) => {}
            Self::Children(items) => {
                for item in items {
                    item.collect_plugin_names(names);
                }
            }
            Self::Macro { name, scope, .. } => {
                names.push(name);
                if let Some(scope) = scope {
                    scope.collect_plugin_names(names);
                }
            }
        }
    }
}

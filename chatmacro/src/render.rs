//! Template source renderer
//!
//! Writes a parse tree back out as template text, escaping just enough that
//! `build_tree` yields the same tree again. Used for logging normalized
//! templates and by the CLI `parse` method.

use crate::ast::ParseNode;
use std::fmt;

/// Where a piece of text is written decides which characters need a `\`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    TopLevel,
    InScope,
}

/// Renders parse trees as template source
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, node: &ParseNode) -> String {
        let mut out = String::new();
        self.render_node(node, Position::TopLevel, &mut out);
        out
    }

    fn render_node(&self, node: &ParseNode, position: Position, out: &mut String) {
        match node {
            ParseNode::Text(content) => {
                for c in content.chars() {
                    let escape = match c {
                        '\\' | '$' => true,
                        ')' => position == Position::InScope,
                        _ => false,
                    };
                    if escape {
                        out.push('\\');
                    }
                    out.push(c);
                }
            }
            ParseNode::Children(items) => {
                for item in items {
                    self.render_node(item, position, out);
                }
            }
            ParseNode::Macro { name, value, scope } => {
                out.push_str("$(");
                escape_into(name, &['\\', '$', ')', '=', '|'], out);
                if let Some(value) = value {
                    out.push('=');
                    escape_into(value, &['\\', '$', ')', '|'], out);
                }
                if let Some(scope) = scope {
                    out.push('|');
                    self.render_node(scope, Position::InScope, out);
                }
                out.push(')');
            }
        }
    }
}

fn escape_into(s: &str, special: &[char], out: &mut String) {
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Renderer::new().render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::build_tree;

    fn reparses(template: &str) {
        let tree = build_tree(template).unwrap();
        let rendered = tree.to_string();
        assert_eq!(build_tree(&rendered).unwrap(), tree, "rendered as {:?}", rendered);
    }

    #[test]
    fn test_render_simple() {
        let tree = build_tree("played $(TWITCH_GAME=geo|%TWITCH_GAME:GEO%)").unwrap();
        assert_eq!(tree.to_string(), "played $(TWITCH_GAME=geo|%TWITCH_GAME:GEO%)");
    }

    #[test]
    fn test_render_escapes_text() {
        let tree = build_tree(r"\$(x) costs \\ 5").unwrap();
        assert_eq!(tree.to_string(), r"\$(x) costs \\ 5");
    }

    #[test]
    fn test_rendered_templates_reparse() {
        reparses("plain text (with parens)");
        reparses(r"$(A=a\)b\|c)");
        reparses(r"$(A|(hi\)) tail");
        reparses("$(A=1|x $(B=2|%B:K% $(C)) y) and $(D|)");
        reparses(r"\$(not a macro\) $(E=\$)");
        // A `$(` inside a nested value must not count towards the outer depth
        let tree = ParseNode::invoke("A").with_scope(ParseNode::invoke("B").with_value("$("));
        assert_eq!(build_tree(&tree.to_string()).unwrap(), tree);
    }
}

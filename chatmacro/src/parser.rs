//! Template tree builder
//!
//! A character-level state machine. `\c` escapes any character, `$(` opens a
//! macro, and inside a macro `=` starts the raw value and `|` starts the scope.
//! Scope text is collected verbatim and parsed recursively once the macro
//! closes; a single depth counter tracks `$(` / `)` nesting inside it.

use crate::ast::ParseNode;
use chatmacro_core::TemplateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Name,
    Value,
    Scope,
}

/// Macro currently being collected
#[derive(Debug, Default)]
struct OpenMacro {
    name: String,
    value: Option<String>,
    scope: Option<String>,
    /// Byte offset of the `$(`
    offset: usize,
    /// Byte offset of the first scope character
    scope_offset: usize,
}

/// Deepest allowed macro nesting; top-level macros are level 1
pub const MAX_NESTING: usize = 32;

/// Parse a template into a tree
pub fn build_tree(input: &str) -> Result<ParseNode, TemplateError> {
    parse_at(input, 0, 1)
}

/// `base` is the offset of `input` inside the outermost template, so errors
/// from nested scopes point into the original string. `level` is the nesting
/// level of macros opened directly in `input`.
fn parse_at(input: &str, base: usize, level: usize) -> Result<ParseNode, TemplateError> {
    let mut builder = TreeBuilder::new(base, level);
    let mut chars = input.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match builder.state {
            State::Text => match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => builder.text.push(escaped),
                    None => builder.text.push('\\'),
                },
                '$' if matches!(chars.peek(), Some((_, '('))) => {
                    chars.next();
                    builder.open(base + pos)?;
                }
                _ => builder.text.push(c),
            },

            State::Name => match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        builder.current.name.push(escaped);
                    }
                }
                ')' => builder.close()?,
                '=' => {
                    builder.current.value = Some(String::new());
                    builder.state = State::Value;
                }
                '|' => builder.start_scope(base + pos + 1),
                _ => builder.current.name.push(c),
            },

            // `$(` has no meaning here; the value is raw text
            State::Value => match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        builder.current.value.get_or_insert_with(String::new).push(escaped);
                    }
                }
                ')' => builder.close()?,
                '|' => builder.start_scope(base + pos + 1),
                _ => builder.current.value.get_or_insert_with(String::new).push(c),
            },

            // Escapes stay verbatim so the recursive parse resolves them
            State::Scope => {
                let scope = builder.current.scope.get_or_insert_with(String::new);
                match c {
                    '\\' => {
                        scope.push('\\');
                        if let Some((_, escaped)) = chars.next() {
                            scope.push(escaped);
                        }
                    }
                    '$' if matches!(chars.peek(), Some((_, '('))) => {
                        chars.next();
                        scope.push_str("$(");
                        builder.depth += 1;
                    }
                    ')' => {
                        builder.depth -= 1;
                        if builder.depth == 0 {
                            builder.close()?;
                        } else {
                            scope.push(')');
                        }
                    }
                    _ => scope.push(c),
                }
            }
        }
    }

    builder.finish()
}

struct TreeBuilder {
    state: State,
    /// Number of `$(` currently open, counting the macro being collected
    depth: usize,
    text: String,
    current: OpenMacro,
    nodes: Vec<ParseNode>,
    base: usize,
    level: usize,
}

impl TreeBuilder {
    fn new(base: usize, level: usize) -> Self {
        Self {
            state: State::Text,
            depth: 0,
            text: String::new(),
            current: OpenMacro::default(),
            nodes: Vec::new(),
            base,
            level,
        }
    }

    fn open(&mut self, offset: usize) -> Result<(), TemplateError> {
        if self.level > MAX_NESTING {
            return Err(TemplateError::NestingTooDeep { offset, limit: MAX_NESTING });
        }
        self.current = OpenMacro {
            offset,
            ..OpenMacro::default()
        };
        self.depth = 1;
        self.state = State::Name;
        Ok(())
    }

    fn start_scope(&mut self, scope_offset: usize) {
        self.current.scope = Some(String::new());
        self.current.scope_offset = scope_offset;
        self.state = State::Scope;
    }

    /// The macro's closing `)` was reached at its own depth
    fn close(&mut self) -> Result<(), TemplateError> {
        let open = std::mem::take(&mut self.current);
        self.depth = 0;
        self.state = State::Text;

        if open.name.is_empty() {
            return Err(TemplateError::EmptyMacroName { offset: open.offset });
        }

        let scope = match open.scope {
            Some(source) => Some(Box::new(parse_at(&source, open.scope_offset, self.level + 1)?)),
            None => None,
        };

        if !self.text.is_empty() {
            self.nodes.push(ParseNode::Text(std::mem::take(&mut self.text)));
        }
        tracing::trace!(name = %open.name, offset = open.offset, "macro closed");
        self.nodes.push(ParseNode::Macro {
            name: open.name,
            value: open.value,
            scope,
        });
        Ok(())
    }

    fn finish(mut self) -> Result<ParseNode, TemplateError> {
        if self.state != State::Text {
            return Err(TemplateError::UnterminatedMacro {
                name: self.current.name,
                offset: self.current.offset,
            });
        }

        // Whitespace-only text after the last macro is dropped
        if !self.text.is_empty() && (self.nodes.is_empty() || !self.text.trim().is_empty()) {
            self.nodes.push(ParseNode::Text(self.text));
        }

        tracing::trace!(base = self.base, nodes = self.nodes.len(), "template parsed");
        Ok(match self.nodes.len() {
            0 => ParseNode::Text(String::new()),
            1 => self.nodes.remove(0),
            _ => ParseNode::Children(self.nodes),
        })
    }
}

//! Value and selector tokenizer.
//!
//! Splits a text span into [`ValueNode`]s: plain literals, variable
//! references and nested `name(...)` / `#{...}` expressions. Nesting is
//! tracked with an explicit frame stack; a frame's node is appended to the
//! enclosing body when its closer is seen (or at end of input).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{Expression, Location, ValueNode};


/// How separators between tokens are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Whitespace only separates tokens; rendering re-inserts single spaces.
    Value,
    /// Adjacency matters (`&:hover`, `margin-#{$side}`); a space is kept on the next token.
    Selector,
}

/// A variable reference found while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarToken<'a> {
    /// Whole token as written, e.g. `ns.$size,`.
    pub text: &'a str,
    /// `$` plus the identifier.
    pub name: &'a str,
    pub namespace: Option<&'a str>,
    /// Character columns on the source line.
    pub start: usize,
    pub end: usize,
}

static VARIABLE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[.\w-]*\$").unwrap());
static NAMESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w-]+$").unwrap());

/// Tokenize `text`, which starts at character column `offset` of its line.
///
/// `on_var` is called for every variable reference and supplies its declaration.
pub fn tokenize<F>(text: &str, offset: usize, mode: Mode, on_var: &mut F) -> Vec<ValueNode>
where
    F: FnMut(&VarToken<'_>) -> Option<Location>,
{
    let mut tokenizer = Tokenizer {
        offset,
        mode,
        root: Vec::new(),
        frames: Vec::new(),
        token: String::new(),
        token_start: 0,
        pending_space: false,
    };
    tokenizer.run(text, on_var);
    tokenizer.root
}

/// Tokenize without resolving; every reference is left unresolved.
pub fn tokenize_detached(text: &str, mode: Mode) -> Vec<ValueNode> {
    tokenize(text, 0, mode, &mut |_: &VarToken<'_>| None)
}

struct Tokenizer {
    offset: usize,
    mode: Mode,
    root: Vec<ValueNode>,
    frames: Vec<Expression>,
    token: String,
    token_start: usize,
    pending_space: bool,
}

impl Tokenizer {
    fn run<F>(&mut self, text: &str, on_var: &mut F)
    where
        F: FnMut(&VarToken<'_>) -> Option<Location>,
    {
        let chars: Vec<char> = text.chars().collect();
        let mut quote: Option<char> = None;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if let Some(q) = quote {
                self.push_char(i, c);
                if c == q {
                    quote = None;
                }
                i += 1;
                continue;
            }
            match c {
                '"' | '\'' => {
                    self.push_char(i, c);
                    quote = Some(c);
                }
                '/' if chars.get(i + 1) == Some(&'/') && !self.in_url() => {
                    self.flush(on_var);
                    let rest: String = chars[i..].iter().collect();
                    let comment = rest.trim_end();
                    let value = match self.mode {
                        Mode::Selector => format!(" {}", comment),
                        Mode::Value => comment.to_string(),
                    };
                    // open frames close before the comment so no closer lands after it
                    self.close_all();
                    self.root.push(ValueNode::literal(value));
                    return;
                }
                '#' if chars.get(i + 1) == Some(&'{') => {
                    self.flush(on_var);
                    if self.mode == Mode::Selector && self.pending_space {
                        self.target().push(ValueNode::literal(" "));
                    }
                    self.pending_space = false;
                    self.frames.push(Expression::Interpolated { body: Vec::new() });
                    i += 1;
                }
                '(' => {
                    let mut name = std::mem::take(&mut self.token);
                    if self.mode == Mode::Selector && self.pending_space {
                        name.insert(0, ' ');
                    }
                    self.pending_space = false;
                    self.frames.push(Expression::Func { name, body: Vec::new() });
                }
                ')' if matches!(self.frames.last(), Some(Expression::Func { .. })) => {
                    self.flush(on_var);
                    self.close_frame();
                }
                '}' if matches!(self.frames.last(), Some(Expression::Interpolated { .. })) => {
                    self.flush(on_var);
                    self.close_frame();
                }
                ' ' | '\t' => {
                    self.flush(on_var);
                    self.pending_space = true;
                }
                _ => self.push_char(i, c),
            }
            i += 1;
        }
        self.flush(on_var);
        self.close_all();
    }

    fn push_char(&mut self, i: usize, c: char) {
        if self.token.is_empty() {
            self.token_start = i;
        }
        self.token.push(c);
    }

    /// `//` is part of the address inside `url(...)`.
    fn in_url(&self) -> bool {
        self.frames.iter().any(|frame| match frame {
            Expression::Func { name, .. } => name.trim().eq_ignore_ascii_case("url"),
            _ => false,
        })
    }

    fn target(&mut self) -> &mut Vec<ValueNode> {
        match self.frames.last_mut() {
            Some(frame) => frame.body_mut(),
            None => &mut self.root,
        }
    }

    fn close_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.target().push(ValueNode::Expression(frame));
        }
    }

    fn close_all(&mut self) {
        while !self.frames.is_empty() {
            self.close_frame();
        }
    }

    fn flush<F>(&mut self, on_var: &mut F)
    where
        F: FnMut(&VarToken<'_>) -> Option<Location>,
    {
        if self.token.is_empty() {
            return;
        }
        let token = std::mem::take(&mut self.token);
        let spaced = self.mode == Mode::Selector && self.pending_space;
        self.pending_space = false;

        let node = match self.variable(&token) {
            Some(var) => {
                let reference = on_var(&var);
                if spaced {
                    self.target().push(ValueNode::literal(" "));
                }
                ValueNode::variable_ref(token.clone(), reference)
            }
            None if spaced => ValueNode::literal(format!(" {}", token)),
            None => ValueNode::literal(token),
        };
        self.target().push(node);
    }

    fn variable<'t>(&self, token: &'t str) -> Option<VarToken<'t>> {
        if !VARIABLE_TOKEN.is_match(token) {
            return None;
        }
        let dollar = token.find('$')?;
        let prefix = &token[..dollar];
        let name_len = token[dollar + 1..]
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(token.len() - dollar - 1);
        if name_len == 0 {
            return None;
        }
        let name = &token[dollar..dollar + 1 + name_len];
        // `$name:` inside an argument list names a keyword argument
        if prefix.is_empty() && token[dollar + 1 + name_len..].starts_with(':') {
            return None;
        }
        let namespace = prefix.strip_suffix('.').filter(|ns| NAMESPACE.is_match(ns));

        let start = self.offset + self.token_start;
        let name_start = start + prefix.chars().count();
        let end = name_start + name.chars().count();
        Some(VarToken {
            text: token,
            name,
            namespace,
            start: if namespace.is_some() { start } else { name_start },
            end,
        })
    }
}

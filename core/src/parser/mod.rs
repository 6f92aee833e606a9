//! Line-by-line parser for one document.
//!
//! Each line is classified, placed in the scope tree by its indentation and
//! tokenized; variable references are resolved as they are met, loading
//! imported files through the [`FileCache`] on the way.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::ast::*;
use crate::cache::{FileCache, LoadOutcome};
use crate::classify::{LineKind, classify_line, is_forward};
use crate::diagnostics::{Diagnostic, Range};
use crate::expr::{self, Mode, VarToken};
use crate::resolve::{
    Attach, Binding, ImportBinding, ImportKind, ImportTarget, Placement, Resolver, Scope, ScopeFrame,
    default_namespace, distance, level, resolve_target,
};
use crate::settings::FileSettings;

mod params;

pub use params::{head_params, node_params};

#[cfg(test)]
mod parser_test;

static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^[\t ]*@import[\t ]+['"]?([^'"]*?)['"]?[\t ]*$"#).unwrap());

static USE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[\t ]*@use[\t ]+['"]?([^'"]*?)['"]?(?:[\t ]+as[\t ]+([\w*-]+))?(?:[\t ]+(with[\t ]*\(.*\)))?[\t ]*$"#,
    )
    .unwrap()
});

static DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*(.*?):(.*)$").unwrap());

static MIXIN_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*(@mixin|=)[\t ]*([-\w]*)[\t ]*(?:\((.*)\))?").unwrap());

static EXTEND_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*@extend").unwrap());

static INCLUDE_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*(@include|\+)").unwrap());

/// Scans lines into a [`SassFile`], resolving against `cache`.
pub(crate) struct Parser<'c> {
    cache: &'c mut FileCache,
    uri: String,
    settings: FileSettings,
    nodes: Vec<Node>,
    diagnostics: Vec<Diagnostic>,
    scope: Scope,
    /// `@use` is still allowed at this point of the file.
    use_allowed: bool,
    /// Depth of the body whose last node is an unterminated block comment.
    block_comment: Option<usize>,
}

/// One source line with its measurements.
struct Line<'t> {
    index: usize,
    text: &'t str,
    /// Leading whitespace in characters.
    indent: usize,
    distance: usize,
    level: usize,
}

impl Line<'_> {
    fn range(&self) -> Range {
        Range::on_line(self.index, self.indent, self.text.chars().count())
    }

    fn content(&self) -> &str {
        self.text.trim_start_matches([' ', '\t'])
    }
}

impl<'c> Parser<'c> {
    pub(crate) fn new(cache: &'c mut FileCache, uri: &str, settings: FileSettings) -> Self {
        Self {
            cache,
            uri: uri.to_string(),
            settings,
            nodes: Vec::new(),
            diagnostics: Vec::new(),
            scope: Scope::default(),
            use_allowed: true,
            block_comment: None,
        }
    }

    /// Continue after `nodes`, restoring the scope they leave open.
    pub(crate) fn resume(
        cache: &'c mut FileCache,
        uri: &str,
        settings: FileSettings,
        nodes: Vec<Node>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let scope = Scope::restore(&nodes, &node_params);
        let use_allowed = nodes.iter().all(keeps_use_window);
        let block_comment = scope_body_ref(&nodes, &scope.frames)
            .and_then(|body| body.last())
            .filter(|node| is_unterminated_comment(node))
            .map(|_| scope.depth());
        Self {
            cache,
            uri: uri.to_string(),
            settings,
            nodes,
            diagnostics,
            scope,
            use_allowed,
            block_comment,
        }
    }

    /// Parse `text`, whose first line is `first_line` of the document.
    pub(crate) fn parse(mut self, text: &str, first_line: usize, max_lines: Option<usize>) -> SassFile {
        debug!(uri = %self.uri, first_line, "parsing");
        for (offset, raw) in text.split('\n').take(max_lines.unwrap_or(usize::MAX)).enumerate() {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            self.parse_line(first_line + offset, raw);
        }
        SassFile {
            body: self.nodes,
            diagnostics: self.diagnostics,
            settings: self.settings,
        }
    }

    fn parse_line(&mut self, index: usize, text: &str) {
        let kind = classify_line(text, self.block_comment.is_some());
        trace!(line = index, ?kind, "classified");

        let tab_size = self.settings.effective_tab_size();
        let distance = distance(text, tab_size);
        let line = Line {
            index,
            text,
            indent: text.len() - text.trim_start_matches([' ', '\t']).len(),
            distance,
            level: level(distance, tab_size),
        };

        let keeps_window = match kind {
            LineKind::EmptyLine
            | LineKind::Comment
            | LineKind::BlockComment { .. }
            | LineKind::Use
            | LineKind::Variable => true,
            LineKind::Literal => is_forward(text),
            _ => false,
        };
        if !keeps_window {
            self.use_allowed = false;
        }

        match kind {
            LineKind::BlockComment { closes } => self.block_comment_line(&line, closes),
            LineKind::EmptyLine => {
                let depth = self.scope.depth();
                self.push_at(depth, Node::EmptyLine(EmptyLineNode { line: index }));
            }
            LineKind::Selector | LineKind::FontFace | LineKind::Mixin => self.open_scope(&line, kind),
            LineKind::Property => self.property(&line),
            LineKind::Variable => self.variable(&line),
            LineKind::Use => self.use_rule(&line),
            LineKind::Import => self.import(&line),
            LineKind::Extend => {
                let level = self.place(&line, Attach::Leaf, true);
                let value = EXTEND_HEAD.replace(text, "").trim().to_string();
                self.push_at(level, Node::Extend(ExtendNode { line: index, level, value }));
            }
            LineKind::Include => self.include(&line),
            LineKind::Comment => {
                let level = self.place(&line, Attach::Nested, false);
                let value = text.trim().to_string();
                self.push_at(level, Node::Comment(CommentNode { line: index, level, value }));
            }
            LineKind::Literal => {
                let level = self.place(&line, Attach::Nested, false);
                self.push_at(level, Node::Literal(LiteralNode { line: index, value: text.to_string() }));
            }
        }
    }

    /// Pick the level for `line`, report over-indentation and close deeper scopes.
    fn place(&mut self, line: &Line<'_>, attach: Attach, report: bool) -> usize {
        let Placement { level, over_indented } =
            self.scope.place(line.distance, line.level, self.settings.effective_tab_size(), attach);
        if over_indented && report {
            self.diagnostics.push(Diagnostic::invalid_indentation(
                line.range(),
                self.scope.depth(),
                self.settings.tab_size,
                self.settings.insert_spaces,
            ));
        }
        self.scope.limit_scope(level);
        level
    }

    /// Append `node` to the body at `depth`, returning its index there.
    fn push_at(&mut self, depth: usize, node: Node) -> usize {
        let depth = depth.min(self.scope.depth());
        match scope_body(&mut self.nodes, &self.scope.frames[..depth]) {
            Some(body) => {
                body.push(node);
                body.len() - 1
            }
            None => {
                warn!(uri = %self.uri, line = node.line(), "scope chain out of sync, attaching at top level");
                self.scope.limit_scope(0);
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn block_comment_line(&mut self, line: &Line<'_>, closes: bool) {
        match self.block_comment {
            Some(depth) => {
                let rest = line.content().trim_end();
                let value = if rest.is_empty() { String::new() } else { format!(" {}", rest) };
                let frames = &self.scope.frames[..depth.min(self.scope.depth())];
                if let Some(Node::BlockComment(comment)) =
                    scope_body(&mut self.nodes, frames).and_then(|body| body.last_mut())
                {
                    comment.body.push(BlockCommentLine { line: line.index, value });
                }
                if closes {
                    self.block_comment = None;
                }
            }
            None => {
                let level = self.place(line, Attach::Nested, false);
                let node = Node::BlockComment(BlockCommentNode {
                    line: line.index,
                    level,
                    body: vec![BlockCommentLine {
                        line: line.index,
                        value: line.text.trim().to_string(),
                    }],
                });
                self.push_at(level, node);
                if !closes {
                    self.block_comment = Some(level);
                }
            }
        }
    }

    fn open_scope(&mut self, line: &Line<'_>, kind: LineKind) {
        let level = self.place(line, Attach::Nested, true);
        let (node, params) = match kind {
            LineKind::FontFace => (
                Node::FontFace(FontFaceNode {
                    line: line.index,
                    level,
                    body: Vec::new(),
                }),
                Vec::new(),
            ),
            LineKind::Mixin => {
                let mixin = self.mixin(line, level);
                let params = mixin.args.iter().map(|a| a.name.clone()).collect();
                (Node::Mixin(mixin), params)
            }
            _ => {
                let head = line.content();
                let params = head_params(head);
                let value = self.tokenize(head, line.indent, Mode::Selector, line.index, &params);
                (
                    Node::Selector(SelectorNode {
                        line: line.index,
                        level,
                        value,
                        body: Vec::new(),
                    }),
                    params,
                )
            }
        };
        let index = self.push_at(level, node);
        self.scope.open(ScopeFrame {
            index,
            line: line.index,
            params,
        });
    }

    fn mixin(&mut self, line: &Line<'_>, level: usize) -> MixinNode {
        let mut node = MixinNode {
            line: line.index,
            level,
            mixin_type: MixinType::At,
            name: String::new(),
            args: Vec::new(),
            body: Vec::new(),
        };
        let Some(caps) = MIXIN_HEAD.captures(line.text) else {
            return node;
        };
        if caps.get(1).map(|m| m.as_str()) == Some("=") {
            node.mixin_type = MixinType::Equals;
        }
        node.name = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();

        let Some(raw_args) = caps.get(3) else {
            return node;
        };
        let args_start = line.text[..raw_args.start()].chars().count();
        let mut declared: Vec<String> = Vec::new();
        for (arg, offset) in split_top_level(raw_args.as_str(), ',') {
            let (name, default) = match split_once_top_level(arg, ':') {
                Some((name, value)) => {
                    let value_offset = args_start + offset + name.chars().count() + 1;
                    let value = self.tokenize(value, value_offset, Mode::Value, line.index, &declared);
                    (name.trim(), Some(value))
                }
                None => (arg.trim(), None),
            };
            if name.is_empty() {
                continue;
            }
            declared.push(name.to_string());
            node.args.push(MixinArg {
                name: name.to_string(),
                default,
            });
        }
        node
    }

    fn property(&mut self, line: &Line<'_>) {
        let level = self.place(line, Attach::Leaf, true);
        let Some(caps) = DECLARATION.captures(line.text) else {
            return;
        };
        let (raw_name, raw_value) = (&caps[1], &caps[2]);
        let name = self.tokenize(raw_name, line.indent, Mode::Selector, line.index, &[]);
        let value_offset = line.indent + raw_name.chars().count() + 1;
        let value = self.tokenize(raw_value, value_offset, Mode::Value, line.index, &[]);
        self.push_at(
            level,
            Node::Property(PropertyNode {
                line: line.index,
                level,
                name,
                value,
            }),
        );
    }

    fn variable(&mut self, line: &Line<'_>) {
        let level = self.place(line, Attach::Nested, true);
        let Some(caps) = DECLARATION.captures(line.text) else {
            return;
        };
        let (raw_name, raw_value) = (&caps[1], &caps[2]);
        let value_offset = line.indent + raw_name.chars().count() + 1;
        let value = self.tokenize(raw_value, value_offset, Mode::Value, line.index, &[]);
        let name = raw_name.trim().to_string();
        self.scope.declare_variable(
            level,
            Binding {
                name: name.clone(),
                line: line.index,
            },
        );
        self.push_at(
            level,
            Node::Variable(VariableNode {
                line: line.index,
                level,
                name,
                value,
            }),
        );
    }

    fn include(&mut self, line: &Line<'_>) {
        let level = self.place(line, Attach::Leaf, true);
        let Some(head) = INCLUDE_HEAD.find(line.text) else {
            return;
        };
        let include_type = if head.as_str().trim_start().starts_with('+') {
            IncludeType::Plus
        } else {
            IncludeType::At
        };
        let rest = &line.text[head.end()..];
        let offset = line.text[..head.end()].chars().count();
        let value = self.tokenize(rest, offset, Mode::Value, line.index, &[]);
        self.push_at(
            level,
            Node::Include(IncludeNode {
                line: line.index,
                level,
                include_type,
                value,
            }),
        );
    }

    fn import(&mut self, line: &Line<'_>) {
        let Some(path) = IMPORT_LINE.captures(line.text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()) else {
            let level = self.place(line, Attach::Nested, false);
            self.push_at(level, Node::Literal(LiteralNode { line: line.index, value: line.text.to_string() }));
            return;
        };
        let level = self.place(line, Attach::Nested, true);
        let target = resolve_target(&self.uri, &path, self.cache.loader());
        self.push_at(
            level,
            Node::Import(ImportNode {
                line: line.index,
                level,
                path: path.clone(),
                uri: target.uri().to_string(),
            }),
        );
        if let ImportTarget::File(uri) = target {
            self.scope.declare_import(
                level,
                ImportBinding {
                    uri: uri.clone(),
                    kind: ImportKind::Import,
                },
            );
            self.load(line, &uri, &path);
        }
    }

    fn use_rule(&mut self, line: &Line<'_>) {
        if !self.use_allowed {
            self.diagnostics.push(Diagnostic::use_not_top_level(line.range()));
            let level = self.place(line, Attach::Nested, false);
            let value = format!("// {}", line.content().trim_end());
            self.push_at(level, Node::Comment(CommentNode { line: line.index, level, value }));
            return;
        }
        let Some(caps) = USE_LINE.captures(line.text) else {
            self.push_at(0, Node::Literal(LiteralNode { line: line.index, value: line.text.to_string() }));
            return;
        };
        let path = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
        let namespace = match caps.get(2).map(|m| m.as_str()) {
            Some("*") => None,
            Some(alias) => Some(alias.to_string()),
            None => Some(default_namespace(&path)),
        };
        let with = caps.get(3).map(|m| m.as_str().to_string());
        let target = resolve_target(&self.uri, &path, self.cache.loader());

        self.scope.limit_scope(0);
        self.scope.declare_import(
            0,
            ImportBinding {
                uri: target.uri().to_string(),
                kind: ImportKind::Use {
                    namespace: namespace.clone(),
                },
            },
        );
        self.push_at(
            0,
            Node::Use(UseNode {
                line: line.index,
                path: path.clone(),
                uri: target.uri().to_string(),
                namespace,
                with,
            }),
        );
        if let ImportTarget::File(uri) = target {
            self.load(line, &uri, &path);
        }
    }

    /// Make sure an imported file is parsed, reporting when it cannot be.
    fn load(&mut self, line: &Line<'_>, uri: &str, path: &str) {
        match self.cache.load(uri, &self.settings) {
            LoadOutcome::Loaded => {}
            LoadOutcome::Cycle => self.diagnostics.push(Diagnostic::import_cycle(line.range(), path)),
            LoadOutcome::NotFound => self.diagnostics.push(Diagnostic::import_not_found(line.range(), path)),
        }
    }

    /// Tokenize a span of the current line, resolving every reference in it.
    ///
    /// `own_params` are names bound by the line itself; they resolve to it.
    fn tokenize(&mut self, text: &str, offset: usize, mode: Mode, line: usize, own_params: &[String]) -> Vec<ValueNode> {
        let Parser {
            cache,
            uri,
            scope,
            diagnostics,
            ..
        } = self;
        let uri = uri.as_str();
        let resolver = Resolver::new(uri, &*scope, &**cache);
        expr::tokenize(text, offset, mode, &mut |var: &VarToken<'_>| {
            if var.namespace.is_none() && own_params.iter().any(|p| p == var.name) {
                return Some(Location::new(uri, line));
            }
            let found = resolver.resolve(var.name, var.namespace);
            if found.is_none() && !resolver.is_external_namespace(var.namespace) {
                diagnostics.push(Diagnostic::variable_not_found(
                    Range::on_line(line, var.start, var.end),
                    var.name,
                ));
            }
            found
        })
    }
}

/// Body reached by following `frames` from the top level.
fn scope_body<'n>(nodes: &'n mut Vec<Node>, frames: &[ScopeFrame]) -> Option<&'n mut Vec<Node>> {
    let mut body = nodes;
    for frame in frames {
        body = body.get_mut(frame.index)?.children_mut()?;
    }
    Some(body)
}

fn scope_body_ref<'n>(nodes: &'n [Node], frames: &[ScopeFrame]) -> Option<&'n [Node]> {
    let mut body = nodes;
    for frame in frames {
        body = body.get(frame.index)?.children()?;
    }
    Some(body)
}

/// Top-level nodes that may precede `@use`.
fn keeps_use_window(node: &Node) -> bool {
    match node {
        Node::EmptyLine(_) | Node::Comment(_) | Node::BlockComment(_) | Node::Use(_) | Node::Variable(_) => true,
        Node::Literal(l) => is_forward(&l.value),
        _ => false,
    }
}

fn is_unterminated_comment(node: &Node) -> bool {
    let Node::BlockComment(comment) = node else {
        return false;
    };
    match comment.body.as_slice() {
        [] => false,
        [first] => !first.value.get(2..).is_some_and(|rest| rest.contains("*/")),
        [.., last] => !last.value.contains("*/"),
    }
}

/// Split on `sep` outside quotes and brackets, with each part's character offset.
fn split_top_level(text: &str, sep: char) -> Vec<(&str, usize)> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start_byte = 0;
    let mut start_char = 0;
    for (chars, (byte, c)) in text.char_indices().enumerate() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push((&text[start_byte..byte], start_char));
                start_byte = byte + c.len_utf8();
                start_char = chars + 1;
            }
            _ => {}
        }
    }
    parts.push((&text[start_byte..], start_char));
    parts
}

fn split_once_top_level(text: &str, sep: char) -> Option<(&str, &str)> {
    let parts = split_top_level(text, sep);
    if parts.len() < 2 {
        return None;
    }
    let (name, _) = parts[0];
    Some((name, &text[name.len() + sep.len_utf8()..]))
}

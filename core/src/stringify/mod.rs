//! Canonical text for a parsed tree.
//!
//! Every node is re-emitted at its level with the configured indentation;
//! runs of empty lines collapse into one. The renumbered tree is returned
//! along with the text so the cache can keep serving it.

use crate::ast::*;
use crate::resolve::default_namespace;
use crate::settings::FileSettings;


/// Output text and the tree whose lines match it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stringified {
    pub text: String,
    pub nodes: Vec<Node>,
}

pub struct Stringifier {
    settings: FileSettings,
    next_line: usize,
    last_was_empty: bool,
    out: String,
}

impl Stringifier {
    pub fn new(settings: FileSettings) -> Self {
        Self {
            settings,
            next_line: 0,
            last_was_empty: false,
            out: String::new(),
        }
    }

    pub fn stringify(mut self, nodes: &[Node]) -> Stringified {
        let nodes = self.body(nodes);
        Stringified { text: self.out, nodes }
    }

    fn body(&mut self, nodes: &[Node]) -> Vec<Node> {
        let mut kept = Vec::with_capacity(nodes.len());
        for node in nodes {
            if matches!(node, Node::EmptyLine(_)) && self.last_was_empty {
                continue;
            }
            kept.push(self.node(node));
        }
        kept
    }

    /// Emit `text` at `level`, returning the new line number.
    fn emit(&mut self, level: usize, text: &str) -> usize {
        self.out.push_str(&self.settings.indent(level));
        self.out.push_str(text);
        self.out.push('\n');
        self.last_was_empty = false;
        self.next_line += 1;
        self.next_line - 1
    }

    fn node(&mut self, node: &Node) -> Node {
        match node {
            Node::Selector(selector) => {
                let line = self.emit(selector.level, &render_selector(&selector.value));
                Node::Selector(SelectorNode {
                    line,
                    level: selector.level,
                    value: selector.value.clone(),
                    body: self.body(&selector.body),
                })
            }
            Node::FontFace(font_face) => {
                let line = self.emit(font_face.level, "@font-face");
                Node::FontFace(FontFaceNode {
                    line,
                    level: font_face.level,
                    body: self.body(&font_face.body),
                })
            }
            Node::Mixin(mixin) => {
                let line = self.emit(mixin.level, &render_mixin_head(mixin));
                Node::Mixin(MixinNode {
                    line,
                    level: mixin.level,
                    mixin_type: mixin.mixin_type,
                    name: mixin.name.clone(),
                    args: mixin.args.clone(),
                    body: self.body(&mixin.body),
                })
            }
            Node::Property(property) => {
                let text = format!("{}:{}", render_selector(&property.name), render_values(&property.value));
                let line = self.emit(property.level, &text);
                Node::Property(PropertyNode { line, ..property.clone() })
            }
            Node::Variable(variable) => {
                let text = format!("{}:{}", variable.name, render_values(&variable.value));
                let line = self.emit(variable.level, &text);
                Node::Variable(VariableNode { line, ..variable.clone() })
            }
            Node::Import(import) => {
                let line = self.emit(import.level, &format!("@import '{}'", import.path));
                Node::Import(ImportNode { line, ..import.clone() })
            }
            Node::Use(using) => {
                let line = self.emit(0, &render_use(using));
                Node::Use(UseNode { line, ..using.clone() })
            }
            Node::Extend(extend) => {
                let line = self.emit(extend.level, &format!("@extend {}", extend.value));
                Node::Extend(ExtendNode { line, ..extend.clone() })
            }
            Node::Include(include) => {
                let values = render_values(&include.value);
                let text = match include.include_type {
                    IncludeType::At => format!("@include {}", strip_space(&values)),
                    IncludeType::Plus => format!("+{}", strip_space(&values)),
                };
                let line = self.emit(include.level, &text);
                Node::Include(IncludeNode { line, ..include.clone() })
            }
            Node::Comment(comment) => {
                let line = self.emit(comment.level, &comment.value);
                Node::Comment(CommentNode { line, ..comment.clone() })
            }
            Node::BlockComment(comment) => {
                let body: Vec<BlockCommentLine> = comment
                    .body
                    .iter()
                    .map(|l| BlockCommentLine {
                        line: self.emit(comment.level, &l.value),
                        value: l.value.clone(),
                    })
                    .collect();
                Node::BlockComment(BlockCommentNode {
                    line: body.first().map_or(self.next_line, |l| l.line),
                    level: comment.level,
                    body,
                })
            }
            Node::EmptyLine(_) => {
                self.out.push('\n');
                self.last_was_empty = true;
                self.next_line += 1;
                Node::EmptyLine(EmptyLineNode { line: self.next_line - 1 })
            }
            Node::Literal(literal) => {
                let line = self.emit(0, &literal.value);
                Node::Literal(LiteralNode { line, ..literal.clone() })
            }
        }
    }
}

/// Values as they appear after a `:`, each preceded by one space.
pub fn render_values(values: &[ValueNode]) -> String {
    let mut out = String::new();
    for value in values {
        match value {
            ValueNode::Literal { value } => {
                out.push(' ');
                out.push_str(value);
            }
            ValueNode::VariableRef(var) => {
                out.push(' ');
                out.push_str(&var.value);
            }
            ValueNode::Expression(Expression::Func { name, body }) => {
                out.push_str(&format!(" {}({})", name, strip_space(&render_values(body))));
            }
            ValueNode::Expression(Expression::Interpolated { body }) => {
                out.push_str(&format!(" #{{{}}}", strip_space(&render_values(body))));
            }
        }
    }
    out
}

/// Values concatenated as written; spacing lives in the literals.
pub fn render_selector(values: &[ValueNode]) -> String {
    let mut out = String::new();
    for value in values {
        match value {
            ValueNode::Literal { value } => out.push_str(value),
            ValueNode::VariableRef(var) => out.push_str(&var.value),
            ValueNode::Expression(Expression::Func { name, body }) => {
                out.push_str(&format!("{}({})", name, render_selector(body)));
            }
            ValueNode::Expression(Expression::Interpolated { body }) => {
                out.push_str(&format!("#{{{}}}", render_selector(body)));
            }
        }
    }
    out
}

/// Mixin declaration line without indentation.
pub fn render_mixin_head(mixin: &MixinNode) -> String {
    let mut head = match mixin.mixin_type {
        MixinType::At => format!("@mixin {}", mixin.name),
        MixinType::Equals => format!("={}", mixin.name),
    };
    if !mixin.args.is_empty() {
        let args: Vec<String> = mixin
            .args
            .iter()
            .map(|arg| match &arg.default {
                Some(default) => format!("{}:{}", arg.name, render_values(default)),
                None => arg.name.clone(),
            })
            .collect();
        head.push_str(&format!("({})", args.join(", ")));
    }
    head
}

fn render_use(using: &UseNode) -> String {
    let mut text = format!("@use '{}'", using.path);
    match &using.namespace {
        None => text.push_str(" as *"),
        Some(ns) if *ns != default_namespace(&using.path) => text.push_str(&format!(" as {}", ns)),
        Some(_) => {}
    }
    if let Some(with) = &using.with {
        text.push(' ');
        text.push_str(with);
    }
    text
}

fn strip_space(text: &str) -> &str {
    text.strip_prefix(' ').unwrap_or(text)
}

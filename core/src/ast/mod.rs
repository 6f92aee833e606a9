//! Node model for a parsed Sass (indented syntax) document.
//!
//! `Node` is one source line (block comments span several); `ValueNode` is
//! one token of a value, selector or argument list. Scope-opening nodes
//! (`Selector`, `Mixin`, `FontFace`) own their children in `body`.

use serde::{Deserialize, Serialize};

mod find;

pub use find::{find_node, find_variable, slice_nodes, walk};


/// Where a variable reference was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub uri: String,
    pub line: usize,
}

impl Location {
    pub fn new(uri: impl Into<String>, line: usize) -> Self {
        Self { uri: uri.into(), line }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRef {
    /// Raw text, namespace included (`ns.$name`).
    pub value: String,
    #[serde(rename = "ref")]
    pub reference: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expressionType", rename_all = "camelCase")]
pub enum Expression {
    Func {
        #[serde(rename = "funcName")]
        name: String,
        body: Vec<ValueNode>,
    },
    Interpolated {
        body: Vec<ValueNode>,
    },
}

impl Expression {
    pub fn body(&self) -> &[ValueNode] {
        match self {
            Expression::Func { body, .. } | Expression::Interpolated { body } => body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Vec<ValueNode> {
        match self {
            Expression::Func { body, .. } | Expression::Interpolated { body } => body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueNode {
    #[serde(rename = "literalValue")]
    Literal { value: String },
    VariableRef(VariableRef),
    Expression(Expression),
}

impl ValueNode {
    pub fn literal(value: impl Into<String>) -> Self {
        ValueNode::Literal { value: value.into() }
    }

    pub fn variable_ref(value: impl Into<String>, reference: Option<Location>) -> Self {
        ValueNode::VariableRef(VariableRef {
            value: value.into(),
            reference,
        })
    }

    pub fn func(name: impl Into<String>, body: Vec<ValueNode>) -> Self {
        ValueNode::Expression(Expression::Func {
            name: name.into(),
            body,
        })
    }

    pub fn interpolated(body: Vec<ValueNode>) -> Self {
        ValueNode::Expression(Expression::Interpolated { body })
    }

    /// Every variable reference in `values`, depth first.
    pub fn collect_refs(values: &[ValueNode]) -> Vec<&VariableRef> {
        let mut out = Vec::new();
        fn visit<'a>(values: &'a [ValueNode], out: &mut Vec<&'a VariableRef>) {
            for v in values {
                match v {
                    ValueNode::VariableRef(r) => out.push(r),
                    ValueNode::Expression(e) => visit(e.body(), out),
                    ValueNode::Literal { .. } => {}
                }
            }
        }
        visit(values, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorNode {
    pub line: usize,
    pub level: usize,
    pub value: Vec<ValueNode>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MixinType {
    #[serde(rename = "@mixin")]
    At,
    #[serde(rename = "=")]
    Equals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixinArg {
    /// Parameter name including the `$`.
    pub name: String,
    pub default: Option<Vec<ValueNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixinNode {
    pub line: usize,
    pub level: usize,
    pub mixin_type: MixinType,
    pub name: String,
    pub args: Vec<MixinArg>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFaceNode {
    pub line: usize,
    pub level: usize,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyNode {
    pub line: usize,
    pub level: usize,
    pub name: Vec<ValueNode>,
    pub value: Vec<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableNode {
    pub line: usize,
    pub level: usize,
    /// Declared name including the `$`.
    pub name: String,
    pub value: Vec<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportNode {
    pub line: usize,
    pub level: usize,
    /// Path as written in the source.
    pub path: String,
    /// Resolved target.
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseNode {
    pub line: usize,
    pub path: String,
    pub uri: String,
    /// `None` for `as *`.
    pub namespace: Option<String>,
    /// Raw `with (...)` clause.
    pub with: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendNode {
    pub line: usize,
    pub level: usize,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeType {
    #[serde(rename = "@include")]
    At,
    #[serde(rename = "+")]
    Plus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeNode {
    pub line: usize,
    pub level: usize,
    pub include_type: IncludeType,
    pub value: Vec<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub line: usize,
    pub level: usize,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCommentLine {
    pub line: usize,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCommentNode {
    pub line: usize,
    pub level: usize,
    pub body: Vec<BlockCommentLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyLineNode {
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralNode {
    pub line: usize,
    /// The whole source line, indentation included.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Selector(SelectorNode),
    Mixin(MixinNode),
    FontFace(FontFaceNode),
    Property(PropertyNode),
    Variable(VariableNode),
    Import(ImportNode),
    Use(UseNode),
    Extend(ExtendNode),
    Include(IncludeNode),
    Comment(CommentNode),
    BlockComment(BlockCommentNode),
    EmptyLine(EmptyLineNode),
    Literal(LiteralNode),
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Node::Selector(n) => n.line,
            Node::Mixin(n) => n.line,
            Node::FontFace(n) => n.line,
            Node::Property(n) => n.line,
            Node::Variable(n) => n.line,
            Node::Import(n) => n.line,
            Node::Use(n) => n.line,
            Node::Extend(n) => n.line,
            Node::Include(n) => n.line,
            Node::Comment(n) => n.line,
            Node::BlockComment(n) => n.line,
            Node::EmptyLine(n) => n.line,
            Node::Literal(n) => n.line,
        }
    }

    /// Nesting depth; `None` for kinds that always render at column zero.
    pub fn level(&self) -> Option<usize> {
        match self {
            Node::Selector(n) => Some(n.level),
            Node::Mixin(n) => Some(n.level),
            Node::FontFace(n) => Some(n.level),
            Node::Property(n) => Some(n.level),
            Node::Variable(n) => Some(n.level),
            Node::Import(n) => Some(n.level),
            Node::Extend(n) => Some(n.level),
            Node::Include(n) => Some(n.level),
            Node::Comment(n) => Some(n.level),
            Node::BlockComment(n) => Some(n.level),
            Node::Use(_) | Node::EmptyLine(_) | Node::Literal(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Selector(n) => Some(&n.body),
            Node::Mixin(n) => Some(&n.body),
            Node::FontFace(n) => Some(&n.body),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Selector(n) => Some(&mut n.body),
            Node::Mixin(n) => Some(&mut n.body),
            Node::FontFace(n) => Some(&mut n.body),
            _ => None,
        }
    }

    pub fn is_scope_opener(&self) -> bool {
        matches!(self, Node::Selector(_) | Node::Mixin(_) | Node::FontFace(_))
    }

    /// Last line covered by this node, descendants and block comment lines included.
    pub fn last_line(&self) -> usize {
        match self {
            Node::BlockComment(n) => n.body.last().map(|l| l.line).unwrap_or(n.line),
            _ => self
                .children()
                .and_then(|body| body.last())
                .map(|last| last.last_line())
                .unwrap_or_else(|| self.line()),
        }
    }

    /// Variable references held directly by this node.
    pub fn variable_refs(&self) -> Vec<&VariableRef> {
        match self {
            Node::Selector(n) => ValueNode::collect_refs(&n.value),
            Node::Property(n) => {
                let mut refs = ValueNode::collect_refs(&n.name);
                refs.extend(ValueNode::collect_refs(&n.value));
                refs
            }
            Node::Variable(n) => ValueNode::collect_refs(&n.value),
            Node::Include(n) => ValueNode::collect_refs(&n.value),
            Node::Mixin(n) => n
                .args
                .iter()
                .filter_map(|a| a.default.as_deref())
                .flat_map(ValueNode::collect_refs)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// One parsed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SassFile {
    pub body: Vec<Node>,
    pub diagnostics: Vec<crate::diagnostics::Diagnostic>,
    pub settings: crate::settings::FileSettings,
}

impl SassFile {
    /// Pretty JSON dump of the tree and its diagnostics.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

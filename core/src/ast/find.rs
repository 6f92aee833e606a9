use super::{Node, VariableNode};

/// Innermost node on `line`, or the scope whose subtree spans it.
pub fn find_node(nodes: &[Node], line: usize) -> Option<&Node> {
    for node in nodes {
        if node.line() == line {
            return Some(node);
        }
        if node.line() < line && line <= node.last_line() {
            return match node.children() {
                Some(body) => find_node(body, line).or(Some(node)),
                None => Some(node),
            };
        }
    }
    None
}

/// First top-level variable declaration named `name` (`$` included).
pub fn find_variable<'n>(nodes: &'n [Node], name: &str) -> Option<&'n VariableNode> {
    nodes.iter().find_map(|node| match node {
        Node::Variable(v) if v.name == name => Some(v),
        _ => None,
    })
}

/// Copy of `nodes` holding only lines up to and including `last_line`.
///
/// Scope bodies are pruned recursively, block comments lose their later lines.
pub fn slice_nodes(nodes: &[Node], last_line: usize) -> Vec<Node> {
    let mut out = Vec::new();
    for node in nodes {
        if node.line() > last_line {
            break;
        }
        let mut kept = match node {
            Node::BlockComment(c) => {
                let mut c = c.clone();
                c.body.retain(|l| l.line <= last_line);
                Node::BlockComment(c)
            }
            Node::Selector(s) => Node::Selector(super::SelectorNode {
                body: Vec::new(),
                ..s.clone()
            }),
            Node::Mixin(m) => Node::Mixin(super::MixinNode {
                body: Vec::new(),
                ..m.clone()
            }),
            Node::FontFace(f) => Node::FontFace(super::FontFaceNode {
                body: Vec::new(),
                ..f.clone()
            }),
            other => other.clone(),
        };
        if let (Some(src), Some(dst)) = (node.children(), kept.children_mut()) {
            *dst = slice_nodes(src, last_line);
        }
        out.push(kept);
    }
    out
}

/// Depth-first pre-order visit of every node.
pub fn walk<'n>(nodes: &'n [Node], visit: &mut dyn FnMut(&'n Node)) {
    for node in nodes {
        visit(node);
        if let Some(body) = node.children() {
            walk(body, visit);
        }
    }
}

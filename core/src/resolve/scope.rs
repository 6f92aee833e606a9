//! Indentation measurement and the parse-time scope stack.

use super::path::is_external;
use crate::ast::{Node, VariableNode};

/// Width of the leading whitespace, a tab counting as `tab_size` columns.
pub fn distance(line: &str, tab_size: usize) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { tab_size } else { 1 })
        .sum()
}

/// `distance / tab_size`, rounded half up.
pub fn level(distance: usize, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    (2 * distance + tab_size) / (2 * tab_size)
}

/// An open scope-opening node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFrame {
    /// Position of the node in its parent's body.
    pub index: usize,
    pub line: usize,
    /// Names bound by the head itself: mixin arguments, loop and function parameters.
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    Import,
    /// `None` for `as *`.
    Use { namespace: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub uri: String,
    pub kind: ImportKind,
}

impl ImportBinding {
    /// Bound to a module that is never loaded; built-in and CSS targets keep their path as URI.
    pub fn is_external(&self) -> bool {
        is_external(&self.uri)
    }
}

/// How a node picks its nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    /// Properties, `@extend` and `@include`: always inside some open scope.
    Leaf,
    /// Everything else: top level when barely indented.
    Nested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub level: usize,
    /// Indented deeper than the open scopes allow.
    pub over_indented: bool,
}

/// Live scope state while scanning one document.
///
/// `variables[L]` and `imports[L]` hold what was declared at level `L`;
/// closing a scope truncates them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub frames: Vec<ScopeFrame>,
    pub variables: Vec<Vec<Binding>>,
    pub imports: Vec<Vec<ImportBinding>>,
}

impl Scope {
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn min_level(&self, level: usize) -> usize {
        level.min(self.depth())
    }

    pub fn prop_level(&self, level: usize) -> usize {
        level.max(1).min(self.depth())
    }

    pub fn place(&self, distance: usize, raw_level: usize, tab_size: usize, attach: Attach) -> Placement {
        let depth = self.depth();
        let over_indented = depth > 0 && raw_level > depth;
        match attach {
            Attach::Leaf => Placement {
                level: self.prop_level(raw_level),
                over_indented,
            },
            Attach::Nested if distance < tab_size || depth == 0 => Placement {
                level: 0,
                over_indented: false,
            },
            Attach::Nested => Placement {
                level: self.min_level(raw_level),
                over_indented,
            },
        }
    }

    /// Close every scope deeper than `level`, dropping its bindings.
    pub fn limit_scope(&mut self, level: usize) {
        self.frames.truncate(level);
        self.variables.truncate(level + 1);
        self.imports.truncate(level + 1);
    }

    pub fn open(&mut self, frame: ScopeFrame) {
        self.frames.push(frame);
    }

    pub fn declare_variable(&mut self, level: usize, binding: Binding) {
        if self.variables.len() <= level {
            self.variables.resize_with(level + 1, Vec::new);
        }
        self.variables[level].push(binding);
    }

    pub fn declare_import(&mut self, level: usize, binding: ImportBinding) {
        if self.imports.len() <= level {
            self.imports.resize_with(level + 1, Vec::new);
        }
        self.imports[level].push(binding);
    }

    /// Rebuild the scope left open after `nodes`, as if they had just been scanned.
    ///
    /// The open chain is the last node of each body while it opens a scope.
    /// `params` recovers the names a head binds.
    pub fn restore(nodes: &[Node], params: &dyn Fn(&Node) -> Vec<String>) -> Scope {
        let mut scope = Scope::default();
        let mut body = nodes;
        let mut level = 0;
        loop {
            for node in body {
                match node {
                    Node::Variable(VariableNode { name, line, .. }) => {
                        scope.declare_variable(level, Binding { name: name.clone(), line: *line })
                    }
                    Node::Import(import) if !is_external(&import.path) => scope.declare_import(
                        level,
                        ImportBinding {
                            uri: import.uri.clone(),
                            kind: ImportKind::Import,
                        },
                    ),
                    Node::Use(using) => scope.declare_import(
                        0,
                        ImportBinding {
                            uri: using.uri.clone(),
                            kind: ImportKind::Use {
                                namespace: using.namespace.clone(),
                            },
                        },
                    ),
                    _ => {}
                }
            }
            let Some(last) = body.last() else { break };
            let Some(children) = last.children() else { break };
            scope.open(ScopeFrame {
                index: body.len() - 1,
                line: last.line(),
                params: params(last),
            });
            body = children;
            level += 1;
        }
        scope
    }
}

use sassline_core::ast::Node;
use sassline_core::stringify::{render_mixin_head, render_selector, render_values};
use tower_lsp::lsp_types::{DocumentSymbol, Position, Range, SymbolKind};

/// Outline of `nodes`: selectors, mixins, font faces and variables, nested as in the source.
///
/// `line_width` gives the UTF-16 width of a source line.
pub(crate) fn document_symbols(nodes: &[Node], line_width: &dyn Fn(usize) -> u32) -> Vec<DocumentSymbol> {
    nodes.iter().filter_map(|node| symbol(node, line_width)).collect()
}

fn symbol(node: &Node, line_width: &dyn Fn(usize) -> u32) -> Option<DocumentSymbol> {
    let (name, detail, kind) = match node {
        Node::Selector(s) => (render_selector(&s.value), None, SymbolKind::CLASS),
        Node::Mixin(m) => (m.name.clone(), Some(render_mixin_head(m)), SymbolKind::FUNCTION),
        Node::FontFace(_) => ("@font-face".to_string(), None, SymbolKind::MODULE),
        Node::Variable(v) => (
            v.name.clone(),
            Some(render_values(&v.value).trim_start().to_string()),
            SymbolKind::VARIABLE,
        ),
        _ => return None,
    };

    let last = node.last_line();
    let range = Range::new(
        Position::new(node.line() as u32, 0),
        Position::new(last as u32, line_width(last)),
    );
    let selection_range = Range::new(
        Position::new(node.line() as u32, 0),
        Position::new(node.line() as u32, line_width(node.line())),
    );
    let children = node
        .children()
        .map(|body| document_symbols(body, line_width))
        .filter(|kids| !kids.is_empty());

    #[allow(deprecated)]
    Some(DocumentSymbol {
        name,
        detail,
        kind,
        tags: None,
        deprecated: None,
        range,
        selection_range,
        children,
    })
}

use once_cell::sync::Lazy;
use regex::Regex;
use sassline_core::ast::{Location, Node};
use sassline_core::stringify::{render_mixin_head, render_selector, render_values};
use sassline_core::FileCache;

static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:[\w-]+\.)?\$[\w-]+").unwrap());

/// A variable reference under the cursor; columns are in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReferenceAt {
    pub(crate) name: String,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// The `$name` or `ns.$name` token touching character `character` of `line`.
pub(crate) fn reference_at(line: &str, character: usize) -> Option<ReferenceAt> {
    let byte = line.char_indices().nth(character).map_or(line.len(), |(b, _)| b);
    let m = REFERENCE
        .find_iter(line)
        .find(|m| m.start() <= byte && byte <= m.end())?;
    let start = line[..m.start()].chars().count();
    Some(ReferenceAt {
        name: m.as_str().to_string(),
        start,
        end: start + m.as_str().chars().count(),
    })
}

/// Where the reference `name` on `line` of `key` was declared.
///
/// Stored tokens keep surrounding punctuation (`$a,`), so they are matched by
/// the reference they contain.
pub(crate) fn resolve_reference<'c>(cache: &'c FileCache, key: &str, line: usize, name: &str) -> Option<&'c Location> {
    let node = cache.find_node(key, line)?;
    if node.line() != line {
        return None;
    }
    node.variable_refs()
        .into_iter()
        .find(|r| REFERENCE.find(&r.value).is_some_and(|m| m.as_str() == name))?
        .reference
        .as_ref()
}

/// One-line rendering of the declaration at `location`.
pub(crate) fn declaration_text(cache: &FileCache, location: &Location) -> Option<String> {
    let text = match cache.find_node(&location.uri, location.line)? {
        Node::Variable(v) => format!("{}:{}", v.name, render_values(&v.value)),
        Node::Mixin(m) => render_mixin_head(m),
        Node::Selector(s) => render_selector(&s.value),
        _ => return None,
    };
    Some(text)
}

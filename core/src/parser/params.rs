//! Names bound by a scope-opening line itself.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Node;
use crate::stringify::render_selector;

static EACH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@each[\t ]+(.+?)[\t ]+in([\t ]|$)").unwrap());
static FOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@for[\t ]+(\$[\w-]+)").unwrap());
static FUNCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@function[\t ]+[\w-]+[\t ]*\((.*)\)").unwrap());

/// Loop variables and function parameters declared by a directive head.
///
/// `head` has its indentation stripped.
pub fn head_params(head: &str) -> Vec<String> {
    if let Some(caps) = EACH.captures(head) {
        return names(caps[1].split(','));
    }
    if let Some(caps) = FOR.captures(head) {
        return vec![caps[1].to_string()];
    }
    if let Some(caps) = FUNCTION.captures(head) {
        return names(caps[1].split(',').map(|arg| arg.split(':').next().unwrap_or(arg)));
    }
    Vec::new()
}

/// Params of an already parsed scope opener.
pub fn node_params(node: &Node) -> Vec<String> {
    match node {
        Node::Mixin(mixin) => mixin.args.iter().map(|a| a.name.clone()).collect(),
        Node::Selector(selector) => head_params(&render_selector(&selector.value)),
        _ => Vec::new(),
    }
}

fn names<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|p| p.starts_with('$') && p.len() > 1)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_and_function_heads() {
        assert_eq!(head_params("@each $key, $value in $map"), vec!["$key", "$value"]);
        assert_eq!(head_params("@each $name in a, b"), vec!["$name"]);
        assert_eq!(head_params("@for $i from 1 through 3"), vec!["$i"]);
        assert_eq!(head_params("@function double($n, $by: 2)"), vec!["$n", "$by"]);
        assert!(head_params("@media screen").is_empty());
        assert!(head_params(".a").is_empty());
    }
}

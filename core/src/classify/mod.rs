//! Line classification for the indented syntax.
//!
//! Every source line maps to exactly one [`LineKind`]. The checks run in a
//! fixed order and the first match wins; interpolated properties
//! (`#{$name}: value`) look like interpolated selectors and are ruled out
//! before the selector test.

use once_cell::sync::Lazy;
use regex::Regex;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Part of a block comment; `closes` is set on the line holding `*/`.
    BlockComment { closes: bool },
    EmptyLine,
    Selector,
    FontFace,
    Property,
    Variable,
    Use,
    Import,
    Mixin,
    Extend,
    Include,
    Comment,
    Literal,
}

impl LineKind {
    pub fn opens_scope(&self) -> bool {
        matches!(self, LineKind::Selector | LineKind::FontFace | LineKind::Mixin)
    }
}

static SELECTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\t ]*(&|\.([\w-]|#\{)|%|\[|\*|>|~|::?[A-Za-z-]|#[\w-]|#\{)").unwrap());

static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[\t ]*(a|abbr|address|article|aside|audio|b|blockquote|body|button|canvas|caption|code|col|dd|details|dialog|div|dl|dt|em|fieldset|figcaption|figure|footer|form|h[1-6]|header|hr|html|i|iframe|img|input|label|legend|li|main|nav|ol|optgroup|option|p|picture|pre|progress|section|select|small|span|strong|sub|summary|sup|svg|table|tbody|td|textarea|tfoot|th|thead|tr|u|ul|video)([.#\[:,>~+\t ]|$)",
    )
    .unwrap()
});

/// `name:` followed by a value; a letter right after the colon means a pseudo class.
static PROPERTY_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*[\w-]+[\t ]*:([\t ]|$|[^A-Za-z:])").unwrap());

static PROPERTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*[\w-]+[\t ]*:([^:]|$)").unwrap());

static INTERPOLATED_PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\t ]*[\w-]*#\{[^}]*\}[\w#{}$-]*[\t ]*:([\t ]|$|[^A-Za-z:])").unwrap());

/// Directives that nest a block; parsed as selectors.
static AT_RULE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[\t ]*@(media|supports|at-root|keyframes|-webkit-keyframes|page|container|layer|if|else|each|for|while|function|document)([\t ]|$)",
    )
    .unwrap()
});

/// `from`, `to` and percentage steps inside `@keyframes`.
static KEYFRAME_STEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\t ]*(from|to|\d+(\.\d+)?%)([\t ]*,[\t ]*(from|to|\d+(\.\d+)?%))*[\t ]*(//.*)?$").unwrap()
});

static FONT_FACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*@font-face([\t ]|$)").unwrap());
static VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*\$[\w-]+[\t ]*:").unwrap());
static USE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*@use([\t ]|$)").unwrap());
static IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*@import([\t ]|$)").unwrap());
static MIXIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*(=|@mixin([\t ]|$))").unwrap());
static EXTEND: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*@extend([\t ]|$)").unwrap());
static INCLUDE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*(@include([\t ]|$)|\+[\w-])").unwrap());
static FORWARD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*@forward([\t ]|$)").unwrap());

pub fn is_empty_or_whitespace(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

pub fn is_block_comment_start(line: &str) -> bool {
    line.trim_start_matches([' ', '\t']).starts_with("/*")
}

pub fn is_single_line_comment(line: &str) -> bool {
    line.trim_start_matches([' ', '\t']).starts_with("//")
}

pub fn is_interpolated_property(line: &str) -> bool {
    INTERPOLATED_PROPERTY.is_match(line)
}

pub fn is_selector(line: &str) -> bool {
    SELECTOR.is_match(line)
        || AT_RULE_BLOCK.is_match(line)
        || KEYFRAME_STEP.is_match(line)
        || (HTML_TAG.is_match(line) && !PROPERTY_LIKE.is_match(line))
}

pub fn is_forward(line: &str) -> bool {
    FORWARD.is_match(line)
}

/// Classify one line. `in_block_comment` is true while a `/*` is still open.
pub fn classify_line(line: &str, in_block_comment: bool) -> LineKind {
    if in_block_comment {
        return LineKind::BlockComment {
            closes: line.contains("*/"),
        };
    }
    if is_empty_or_whitespace(line) {
        return LineKind::EmptyLine;
    }
    if is_block_comment_start(line) {
        let opened = line.trim_start_matches([' ', '\t']);
        return LineKind::BlockComment {
            closes: opened[2..].contains("*/"),
        };
    }

    let interpolated_property = is_interpolated_property(line);
    if !interpolated_property {
        if FONT_FACE.is_match(line) {
            return LineKind::FontFace;
        }
        if is_selector(line) {
            return LineKind::Selector;
        }
    }
    if interpolated_property || PROPERTY.is_match(line) {
        return LineKind::Property;
    }
    if VARIABLE.is_match(line) {
        return LineKind::Variable;
    }
    if USE.is_match(line) {
        return LineKind::Use;
    }
    if IMPORT.is_match(line) {
        return LineKind::Import;
    }
    if MIXIN.is_match(line) {
        return LineKind::Mixin;
    }
    if EXTEND.is_match(line) {
        return LineKind::Extend;
    }
    if INCLUDE.is_match(line) {
        return LineKind::Include;
    }
    if is_single_line_comment(line) {
        return LineKind::Comment;
    }
    LineKind::Literal
}

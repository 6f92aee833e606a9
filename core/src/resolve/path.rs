//! Target resolution for `@import` and `@use`.

use std::path::{Component, Path, PathBuf};

use crate::cache::SourceLoader;

/// What an import path points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// A stylesheet on disk (or in the loader).
    File(String),
    /// `sass:math` and friends.
    Builtin(String),
    /// Plain CSS imports, left to the browser.
    Css(String),
}

impl ImportTarget {
    pub fn uri(&self) -> &str {
        match self {
            ImportTarget::File(uri) | ImportTarget::Builtin(uri) | ImportTarget::Css(uri) => uri,
        }
    }
}

/// Resolve `path` as written in `document_uri`.
///
/// For stylesheets the first candidate the loader knows wins; when none
/// exists the plain `<path>.sass` candidate is returned.
pub fn resolve_target(document_uri: &str, path: &str, loader: &dyn SourceLoader) -> ImportTarget {
    if is_builtin_module(path) {
        return ImportTarget::Builtin(path.to_string());
    }
    if is_css_import(path) {
        return ImportTarget::Css(path.to_string());
    }
    let candidates = candidates(document_uri, path);
    let uri = candidates
        .iter()
        .find(|c| loader.exists(c))
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| path.to_string());
    ImportTarget::File(uri)
}

pub fn is_builtin_module(path: &str) -> bool {
    path.starts_with("sass:")
}

/// Targets that are never loaded: built-in modules and plain CSS.
pub fn is_external(path: &str) -> bool {
    is_builtin_module(path) || is_css_import(path)
}

pub fn is_css_import(path: &str) -> bool {
    path.ends_with(".css")
        || path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("//")
        || path.starts_with("url(")
}

/// Files `path` may refer to, in lookup order.
pub fn candidates(document_uri: &str, path: &str) -> Vec<String> {
    let base = Path::new(document_uri).parent().unwrap_or_else(|| Path::new(""));
    let joined = normalize_path(base.join(path));
    let file_name = joined.file_name().map(|n| n.to_string_lossy().into_owned());
    let partial = |name: &str| joined.with_file_name(format!("_{}", name));

    let mut out = Vec::new();
    match file_name {
        Some(name) if name.ends_with(".sass") => {
            out.push(joined.clone());
            if !name.starts_with('_') {
                out.push(partial(&name));
            }
        }
        Some(name) => {
            out.push(joined.with_file_name(format!("{}.sass", name)));
            if !name.starts_with('_') {
                out.push(partial(&format!("{}.sass", name)));
            }
            out.push(joined.join("_index.sass"));
            out.push(joined.join("index.sass"));
        }
        None => out.push(joined.join("_index.sass")),
    }
    out.into_iter().map(|p| p.to_string_lossy().into_owned()).collect()
}

/// Namespace a `@use` gets without an `as` clause: the last path segment
/// without extension or leading underscore.
pub fn default_namespace(path: &str) -> String {
    let segment = path.rsplit(['/', ':']).next().unwrap_or(path);
    let segment = segment.strip_suffix(".sass").or_else(|| segment.strip_suffix(".scss")).unwrap_or(segment);
    segment.strip_prefix('_').unwrap_or(segment).to_string()
}

/// Lexically drop `.` and fold `..` without touching the file system.
pub fn normalize_path(path: PathBuf) -> PathBuf {
    let mut normalized = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => continue,
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

//! Parsed files keyed by URI.
//!
//! Open documents are handed in with their text; files reached through
//! `@import`/`@use` are read through the [`SourceLoader`] and parsed on
//! first use. An entry is marked loading while its own parse runs, which is
//! how import cycles are detected.

use anyhow::{Result, bail};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::ast::{self, Node, SassFile, VariableNode};
use crate::parser::Parser;
use crate::settings::FileSettings;
use crate::stringify::Stringifier;

mod loader;

pub use loader::{FsLoader, MemoryLoader, SourceLoader};

#[cfg(test)]
mod cache_test;

/// A full document as the editor or the file system has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub uri: String,
    pub text: String,
}

impl Document {
    pub fn new(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            text: text.into(),
        }
    }
}

/// An edited tail of a document.
///
/// `text` holds the document from `start_line` on; at most
/// `end_line - start_line` of its lines are parsed. Nodes of
/// `previous_nodes` before `start_line` are kept as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialDocument {
    pub uri: String,
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
    pub previous_nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    /// Parse in progress; seeing it again means an import cycle.
    Loading,
    Loaded(SassFile),
    /// The loader could not provide the file.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Cycle,
    NotFound,
}

pub struct FileCache {
    entries: FxHashMap<String, CacheEntry>,
    loader: Box<dyn SourceLoader>,
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new(FsLoader)
    }
}

impl FileCache {
    pub fn new(loader: impl SourceLoader + 'static) -> Self {
        Self {
            entries: FxHashMap::default(),
            loader: Box::new(loader),
        }
    }

    pub fn loader(&self) -> &dyn SourceLoader {
        self.loader.as_ref()
    }

    /// Parse `document` from scratch and store the result.
    pub fn parse(&mut self, document: &Document, settings: &FileSettings) {
        self.entries.insert(document.uri.clone(), CacheEntry::Loading);
        let file = Parser::new(self, &document.uri, *settings).parse(&document.text, 0, None);
        debug!(uri = %document.uri, diagnostics = file.diagnostics.len(), "parsed");
        self.entries.insert(document.uri.clone(), CacheEntry::Loaded(file));
    }

    /// Reparse the tail of a document, keeping what comes before `start_line`.
    pub fn parse_partial(&mut self, document: PartialDocument, settings: &FileSettings) {
        let PartialDocument {
            uri,
            start_line,
            end_line,
            text,
            previous_nodes,
        } = document;
        let diagnostics = match self.entries.get(&uri) {
            Some(CacheEntry::Loaded(file)) => file
                .diagnostics
                .iter()
                .filter(|d| d.range.start.line < start_line)
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        let kept = match start_line.checked_sub(1) {
            Some(last) => ast::slice_nodes(&previous_nodes, last),
            None => Vec::new(),
        };

        self.entries.insert(uri.clone(), CacheEntry::Loading);
        let file = Parser::resume(self, &uri, *settings, kept, diagnostics).parse(
            &text,
            start_line,
            Some(end_line.saturating_sub(start_line)),
        );
        debug!(%uri, start_line, end_line, "reparsed tail");
        self.entries.insert(uri, CacheEntry::Loaded(file));
    }

    /// Whether `uri` is parsed, loading it if needed.
    pub fn look_up_file(&mut self, uri: &str, settings: &FileSettings) -> bool {
        self.load(uri, settings) == LoadOutcome::Loaded
    }

    pub(crate) fn load(&mut self, uri: &str, settings: &FileSettings) -> LoadOutcome {
        match self.entries.get(uri) {
            Some(CacheEntry::Loaded(_)) => return LoadOutcome::Loaded,
            Some(CacheEntry::NotFound) => return LoadOutcome::NotFound,
            Some(CacheEntry::Loading) => {
                warn!(uri, "import cycle");
                return LoadOutcome::Cycle;
            }
            None => {}
        }
        match self.loader.read(uri) {
            Ok(text) => {
                debug!(uri, "loading dependency");
                self.parse(&Document::new(uri, text), settings);
                LoadOutcome::Loaded
            }
            Err(err) => {
                debug!(uri, error = %err, "stylesheet unavailable");
                self.entries.insert(uri.to_string(), CacheEntry::NotFound);
                LoadOutcome::NotFound
            }
        }
    }

    /// Canonical text of `uri`; the cached tree is replaced by the
    /// renumbered one and diagnostics the rewrite fixes are dropped.
    pub fn stringify_file(&mut self, uri: &str, settings: &FileSettings) -> Result<String> {
        if !self.look_up_file(uri, settings) {
            bail!("Stylesheet not available: {}", uri);
        }
        let Some(CacheEntry::Loaded(file)) = self.entries.get_mut(uri) else {
            bail!("Stylesheet not available: {}", uri);
        };
        let out = Stringifier::new(*settings).stringify(&file.body);
        file.body = out.nodes;
        file.settings = *settings;
        file.diagnostics.retain(|d| !d.is_resolved_by_stringify);

        let mut text = out.text;
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }

    pub fn file(&self, uri: &str) -> Option<&SassFile> {
        match self.entries.get(uri) {
            Some(CacheEntry::Loaded(file)) => Some(file),
            _ => None,
        }
    }

    pub fn entry(&self, uri: &str) -> Option<&CacheEntry> {
        self.entries.get(uri)
    }

    /// Innermost node covering `line` of `uri`.
    pub fn find_node(&self, uri: &str, line: usize) -> Option<&Node> {
        ast::find_node(&self.file(uri)?.body, line)
    }

    /// Top-level declaration of `name` in `uri`.
    pub fn find_variable(&self, uri: &str, name: &str) -> Option<&VariableNode> {
        ast::find_variable(&self.file(uri)?.body, name)
    }

    pub fn evict(&mut self, uri: &str) -> Option<CacheEntry> {
        self.entries.remove(uri)
    }

    /// Forget files that could not be read so they are tried again.
    pub fn forget_missing(&mut self) {
        self.entries.retain(|_, entry| !matches!(entry, CacheEntry::NotFound));
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

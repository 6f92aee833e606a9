use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use ropey::Rope;
use sassline_core::FileCache;
use tower_lsp::lsp_types::Url;
use tower_lsp::Client;

use super::config::ServerConfig;

/// An open document as the editor sees it.
#[derive(Debug, Default)]
pub(crate) struct OpenDocument {
    pub(crate) content: Rope,
    pub(crate) version: i32,
    pub(crate) debounce_seq: u64,
    /// First line edited since the cached tree was built; `None` when it is current.
    pub(crate) dirty_from: Option<usize>,
    /// Hash of the text the cached tree was built from.
    pub(crate) parsed_hash: Option<u64>,
}

impl OpenDocument {
    pub(crate) fn new(text: &str, version: i32) -> Self {
        Self {
            content: Rope::from_str(text),
            version,
            debounce_seq: 0,
            dirty_from: Some(0),
            parsed_hash: None,
        }
    }

    /// Record an edit starting at `line`.
    pub(crate) fn mark_dirty(&mut self, line: usize) {
        self.dirty_from = Some(self.dirty_from.map_or(line, |from| from.min(line)));
    }
}

/// Server state shared across handlers.
pub(crate) struct SasslineServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, OpenDocument>>,
    /// Parsed trees of open documents and everything they import.
    pub(crate) cache: Arc<Mutex<FileCache>>,
    pub(crate) config: Mutex<ServerConfig>,
}

impl SasslineServer {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            cache: Arc::new(Mutex::new(FileCache::default())),
            config: Mutex::new(ServerConfig::default()),
        }
    }
}

use anyhow::{Context, Result, anyhow};
use rustc_hash::FxHashMap;

/// Source text provider for files that are imported but not open.
pub trait SourceLoader: Send + Sync {
    fn read(&self, uri: &str) -> Result<String>;
    fn exists(&self, uri: &str) -> bool;
}

/// Reads from the local file system; URIs are plain paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn read(&self, uri: &str) -> Result<String> {
        std::fs::read_to_string(uri).with_context(|| format!("Failed to read stylesheet: {}", uri))
    }

    fn exists(&self, uri: &str) -> bool {
        std::path::Path::new(uri).is_file()
    }
}

/// In-memory file table.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, text: impl Into<String>) {
        self.files.insert(uri.into(), text.into());
    }

    pub fn with_file(mut self, uri: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(uri, text);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn read(&self, uri: &str) -> Result<String> {
        self.files.get(uri).cloned().ok_or_else(|| anyhow!("No such stylesheet: {}", uri))
    }

    fn exists(&self, uri: &str) -> bool {
        self.files.contains_key(uri)
    }
}

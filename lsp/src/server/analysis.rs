use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use ropey::Rope;
use sassline_core::diagnostics::{Diagnostic as SassDiagnostic, Severity};
use sassline_core::{Document, FileCache, FileSettings, PartialDocument};
use tokio::task;
use tokio::time::{sleep, Duration};
use tower_lsp::lsp_types::*;
use tracing::{debug, warn};

use super::state::{OpenDocument, SasslineServer};
use super::text::char_to_utf16_col;
use super::utils::{compute_content_hash, uri_to_key};

impl SasslineServer {
    /// Reparse `uri` after `delay_ms` unless another edit arrives first, then publish its diagnostics.
    pub(crate) async fn schedule_diagnostics(&self, uri: Url, delay_ms: u64) {
        let Some(seq) = self.documents.get(&uri).map(|doc| doc.debounce_seq) else {
            return;
        };
        let documents = self.documents.clone();
        let cache = self.cache.clone();
        let client = self.client.clone();
        let config = self.config();

        tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            if documents.get(&uri).map(|doc| doc.debounce_seq) != Some(seq) {
                return;
            }

            let target = uri.clone();
            let computed = task::spawn_blocking(move || {
                refresh_document(
                    &documents,
                    &cache,
                    &target,
                    &config.settings,
                    config.max_number_of_problems,
                )
            })
            .await;

            match computed {
                Ok(Some((diagnostics, version))) => {
                    client.publish_diagnostics(uri, diagnostics, Some(version)).await;
                }
                Ok(None) => {}
                Err(err) => warn!(%uri, error = %err, "diagnostics task failed"),
            }
        });
    }
}

/// Bring the cached tree of `uri` up to date and convert its diagnostics.
///
/// Snapshot and parse happen under the cache lock, so trees are always built
/// in edit order.
fn refresh_document(
    documents: &DashMap<Url, OpenDocument>,
    cache: &Mutex<FileCache>,
    uri: &Url,
    settings: &FileSettings,
    limit: usize,
) -> Option<(Vec<Diagnostic>, i32)> {
    let key = uri_to_key(uri);
    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);

    let (content, version, start) = {
        let mut doc = documents.get_mut(uri)?;
        let hash = compute_content_hash(&doc.content.to_string());
        let dirty_from = doc.dirty_from.take();
        let current = doc.parsed_hash == Some(hash)
            && cache.file(&key).map(|file| file.settings) == Some(*settings);
        doc.parsed_hash = Some(hash);
        let start = if current { None } else { Some(dirty_from.unwrap_or(0)) };
        (doc.content.clone(), doc.version, start)
    };

    match start {
        Some(start) => reparse(&mut cache, &key, &content, start, settings),
        None => debug!(%uri, "content unchanged, reusing tree"),
    }

    let file = cache.file(&key)?;
    Some((to_lsp_diagnostics(&file.diagnostics, &content, limit), version))
}

/// Reparse `key` from `start_line`; falls back to a full parse when there is
/// no usable previous tree.
pub(crate) fn reparse(cache: &mut FileCache, key: &str, content: &Rope, start_line: usize, settings: &FileSettings) {
    let previous = match cache.file(key) {
        Some(file) if start_line > 0 && file.settings == *settings => Some(file.body.clone()),
        _ => None,
    };
    let Some(previous_nodes) = previous else {
        cache.parse(&Document::new(key, content.to_string()), settings);
        return;
    };

    let end_line = content.len_lines();
    let start_line = start_line.min(end_line.saturating_sub(1));
    let text = content.slice(content.line_to_char(start_line)..).to_string();
    cache.parse_partial(
        PartialDocument {
            uri: key.to_string(),
            start_line,
            end_line,
            text,
            previous_nodes,
        },
        settings,
    );
}

/// At most `limit` diagnostics, with character columns mapped to UTF-16.
pub(crate) fn to_lsp_diagnostics(diagnostics: &[SassDiagnostic], content: &Rope, limit: usize) -> Vec<Diagnostic> {
    diagnostics
        .iter()
        .take(limit)
        .map(|d| {
            let position = |p: sassline_core::diagnostics::Position| {
                Position::new(p.line as u32, char_to_utf16_col(content, p.line, p.character))
            };
            Diagnostic {
                range: Range::new(position(d.range.start), position(d.range.end)),
                severity: Some(match d.severity {
                    Severity::Error => DiagnosticSeverity::ERROR,
                    Severity::Warning => DiagnosticSeverity::WARNING,
                    Severity::Information => DiagnosticSeverity::INFORMATION,
                    Severity::Hint => DiagnosticSeverity::HINT,
                }),
                code: Some(NumberOrString::String(d.code.as_str().to_string())),
                source: Some(d.source.clone()),
                message: d.message.clone(),
                ..Default::default()
            }
        })
        .collect()
}

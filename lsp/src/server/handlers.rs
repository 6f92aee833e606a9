use std::sync::PoisonError;

use tokio::task;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::{debug, info, warn};

use super::{
    formatting::{format_document, full_document_edit, settings_from_options},
    navigation::{declaration_text, reference_at, resolve_reference, ReferenceAt},
    state::{OpenDocument, SasslineServer},
    symbols::document_symbols,
    text::{apply_incremental_change_rope, char_to_utf16_col, first_changed_line, line_text, position_to_char_idx},
    utils::{key_to_uri, uri_to_key},
    CHANGE_DEBOUNCE_MS, OPEN_DEBOUNCE_MS,
};

#[tower_lsp::async_trait]
impl LanguageServer for SasslineServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("sassline language server initializing with params: {:?}", params.root_uri);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "sassline".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("sassline language server initialized");
        let _ = self
            .client
            .log_message(MessageType::INFO, "sassline language server started")
            .await;
        self.load_config().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("sassline language server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        self.load_config().await;
        let open: Vec<Url> = self.documents.iter().map(|entry| entry.key().clone()).collect();
        for uri in open {
            if let Some(mut doc) = self.documents.get_mut(&uri) {
                doc.mark_dirty(0);
                doc.debounce_seq = doc.debounce_seq.wrapping_add(1);
            }
            self.schedule_diagnostics(uri, OPEN_DEBOUNCE_MS).await;
        }
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.insert(
            uri.clone(),
            OpenDocument::new(&params.text_document.text, params.text_document.version),
        );
        // Files created since the last lookup may now satisfy imports.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).forget_missing();
        self.schedule_diagnostics(uri, OPEN_DEBOUNCE_MS).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        {
            let mut entry = self.documents.entry(uri.clone()).or_default();
            entry.version = params.text_document.version;
            for change in &params.content_changes {
                let line = first_changed_line(change);
                apply_incremental_change_rope(&mut entry.content, change);
                entry.mark_dirty(line);
            }
            entry.debounce_seq = entry.debounce_seq.wrapping_add(1);
        }
        self.schedule_diagnostics(uri, CHANGE_DEBOUNCE_MS).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        // The disk copy may differ from the editor buffer; reload it on the next import.
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .evict(&uri_to_key(&uri));
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some((line, reference)) = self.reference_under_cursor(uri, position) else {
            return Ok(None);
        };

        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(location) = resolve_reference(&cache, &uri_to_key(uri), line, &reference.name) else {
            return Ok(None);
        };
        let Some(declaration) = declaration_text(&cache, location) else {
            return Ok(None);
        };

        let range = self.documents.get(uri).map(|doc| {
            Range::new(
                Position::new(line as u32, char_to_utf16_col(&doc.content, line, reference.start)),
                Position::new(line as u32, char_to_utf16_col(&doc.content, line, reference.end)),
            )
        });
        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: format!("```sass\n{}\n```\n{}:{}", declaration, location.uri, location.line + 1),
            }),
            range,
        }))
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some((line, reference)) = self.reference_under_cursor(uri, position) else {
            return Ok(None);
        };

        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(location) = resolve_reference(&cache, &uri_to_key(uri), line, &reference.name) else {
            debug!(name = %reference.name, "no declaration to jump to");
            return Ok(None);
        };
        let Some(target) = key_to_uri(&location.uri) else {
            return Ok(None);
        };
        let start = Position::new(location.line as u32, 0);
        Ok(Some(GotoDefinitionResponse::Scalar(Location {
            uri: target,
            range: Range::new(start, start),
        })))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;
        let Some(content) = self.documents.get(uri).map(|doc| doc.content.clone()) else {
            return Ok(None);
        };
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(file) = cache.file(&uri_to_key(uri)) else {
            return Ok(None);
        };
        let line_width = |line: usize| -> u32 {
            line_text(&content, line)
                .map(|s| s.chars().map(char::len_utf16).sum::<usize>() as u32)
                .unwrap_or(0)
        };
        Ok(Some(DocumentSymbolResponse::Nested(document_symbols(&file.body, &line_width))))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        let Some(content) = self.documents.get(&uri).map(|doc| doc.content.clone()) else {
            return Ok(None);
        };
        let settings = settings_from_options(&params.options);
        let cache = self.cache.clone();
        let key = uri_to_key(&uri);

        let formatted = task::spawn_blocking(move || {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            format_document(&mut cache, &key, &content, &settings).map(|text| full_document_edit(&content, text))
        })
        .await
        .map_err(|err| {
            warn!(%uri, error = %err, "formatting task failed");
            Error::internal_error()
        })?;

        match formatted {
            Ok(edit) => Ok(Some(edit.into_iter().collect())),
            Err(err) => {
                warn!(%uri, error = %err, "formatting failed");
                Err(Error::internal_error())
            }
        }
    }
}

impl SasslineServer {
    /// Line of `position` and the variable reference it touches.
    fn reference_under_cursor(&self, uri: &Url, position: Position) -> Option<(usize, ReferenceAt)> {
        let doc = self.documents.get(uri)?;
        let line = position.line as usize;
        let text = line_text(&doc.content, line)?;
        let character = position_to_char_idx(&doc.content, position) - doc.content.line_to_char(line);
        Some((line, reference_at(&text, character)?))
    }
}

use anyhow::Result;
use ropey::Rope;
use sassline_core::{Document, FileCache, FileSettings};
use tower_lsp::lsp_types::{FormattingOptions, Position, Range, TextEdit};

use super::text::end_position;

pub(crate) fn settings_from_options(options: &FormattingOptions) -> FileSettings {
    FileSettings::new(options.tab_size as usize, options.insert_spaces)
}

/// Canonical text of `content`.
///
/// The cached tree of `key` is rebuilt with `settings` first, since indentation
/// levels depend on the tab size.
pub(crate) fn format_document(cache: &mut FileCache, key: &str, content: &Rope, settings: &FileSettings) -> Result<String> {
    cache.parse(&Document::new(key, content.to_string()), settings);
    cache.stringify_file(key, settings)
}

/// One edit replacing the whole document, or `None` when nothing changes.
pub(crate) fn full_document_edit(original: &Rope, formatted: String) -> Option<TextEdit> {
    if original.to_string() == formatted {
        return None;
    }
    Some(TextEdit {
        range: Range::new(Position::new(0, 0), end_position(original)),
        new_text: formatted,
    })
}

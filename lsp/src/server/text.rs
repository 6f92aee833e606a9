use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

// Convert LSP UTF-16 position to Rope char index (scalar values), clamped to the end of the line.
pub(crate) fn position_to_char_idx(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start_char = text.line_to_char(line_idx);
    let line_slice = text.line(line_idx);
    let target_utf16 = pos.character as usize;

    if let Some(s) = line_slice.as_str() {
        if s.is_ascii() {
            let clamped = target_utf16.min(s.len());
            return line_start_char + clamped;
        }
    }

    let mut seen_utf16 = 0usize;
    let mut chars_in_line = 0usize;
    for ch in line_slice.chars() {
        let u16_len = ch.len_utf16();
        if seen_utf16 + u16_len > target_utf16 {
            break;
        }
        seen_utf16 += u16_len;
        chars_in_line += 1;
        if seen_utf16 == target_utf16 {
            break;
        }
    }
    line_start_char + chars_in_line
}

// Apply incremental LSP changes to a rope buffer.
pub(crate) fn apply_incremental_change_rope(text: &mut Rope, change: &TextDocumentContentChangeEvent) {
    if let Some(range) = &change.range {
        let start_char = position_to_char_idx(text, range.start);
        let end_char = position_to_char_idx(text, range.end);
        let (s, e) = if start_char <= end_char {
            (start_char, end_char)
        } else {
            (end_char, start_char)
        };
        if s != e {
            text.remove(s..e);
        }
        if !change.text.is_empty() {
            text.insert(s, &change.text);
        }
    } else {
        *text = Rope::from_str(&change.text);
    }
}

/// First line a change touches; whole-text replacements start at zero.
pub(crate) fn first_changed_line(change: &TextDocumentContentChangeEvent) -> usize {
    change
        .range
        .map(|range| range.start.line.min(range.end.line) as usize)
        .unwrap_or(0)
}

/// Text of `line` without its line break.
pub(crate) fn line_text(text: &Rope, line: usize) -> Option<String> {
    if line >= text.len_lines() {
        return None;
    }
    let mut s = text.line(line).to_string();
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
    Some(s)
}

/// UTF-16 column of character `character` on `line`.
pub(crate) fn char_to_utf16_col(text: &Rope, line: usize, character: usize) -> u32 {
    let Some(s) = line_text(text, line) else {
        return character as u32;
    };
    let width: usize = s.chars().take(character).map(char::len_utf16).sum();
    // Columns past the end of the line keep their overshoot.
    let overshoot = character.saturating_sub(s.chars().count());
    (width + overshoot) as u32
}

/// Position just past the last character of `text`.
pub(crate) fn end_position(text: &Rope) -> Position {
    let last = text.len_lines().saturating_sub(1);
    let width = line_text(text, last)
        .map(|s| s.chars().map(char::len_utf16).sum::<usize>())
        .unwrap_or(0);
    Position::new(last as u32, width as u32)
}

#[cfg(test)]
mod tests {
    use ropey::Rope;
    use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent};

    use crate::server::text::*;

    fn change(start: (u32, u32), end: (u32, u32), text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))),
            range_length: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn incremental_edit_replaces_range() {
        let mut rope = Rope::from_str(".a\n  color: red\n");
        apply_incremental_change_rope(&mut rope, &change((1, 9), (1, 12), "blue"));
        assert_eq!(rope.to_string(), ".a\n  color: blue\n");
    }

    #[test]
    fn full_replacement_without_range() {
        let mut rope = Rope::from_str(".a");
        let full = TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: ".b\n".to_string(),
        };
        apply_incremental_change_rope(&mut rope, &full);
        assert_eq!(rope.to_string(), ".b\n");
        assert_eq!(first_changed_line(&full), 0);
    }

    #[test]
    fn first_changed_line_uses_range_start() {
        assert_eq!(first_changed_line(&change((3, 0), (5, 2), "")), 3);
    }

    #[test]
    fn utf16_columns_count_surrogate_pairs() {
        let rope = Rope::from_str("content: \"😀\" $x\n");
        // the emoji is one char but two UTF-16 units
        assert_eq!(char_to_utf16_col(&rope, 0, 13), 14);
        assert_eq!(position_to_char_idx(&rope, Position::new(0, 14)), 13);
        assert_eq!(char_to_utf16_col(&rope, 0, 3), 3);
    }

    #[test]
    fn line_text_and_end_position() {
        let rope = Rope::from_str(".a\r\n  top: 0");
        assert_eq!(line_text(&rope, 0).as_deref(), Some(".a"));
        assert_eq!(line_text(&rope, 2), None);
        assert_eq!(end_position(&rope), Position::new(1, 8));
        assert_eq!(end_position(&Rope::from_str(".a\n")), Position::new(1, 0));
    }
}

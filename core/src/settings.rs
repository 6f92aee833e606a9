use serde::{Deserialize, Serialize};

/// Indentation settings a file is parsed and printed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileSettings {
    pub tab_size: usize,
    pub insert_spaces: bool,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            tab_size: 2,
            insert_spaces: false,
        }
    }
}

impl FileSettings {
    pub fn new(tab_size: usize, insert_spaces: bool) -> Self {
        Self { tab_size, insert_spaces }
    }

    /// Tab size used for arithmetic; a zero width would make every line a new level.
    pub fn effective_tab_size(&self) -> usize {
        self.tab_size.max(1)
    }

    /// Leading whitespace for a node at `level`.
    pub fn indent(&self, level: usize) -> String {
        if self.insert_spaces {
            " ".repeat(level * self.tab_size)
        } else {
            "\t".repeat(level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_tabs_of_two() {
        let s = FileSettings::default();
        assert_eq!(s.tab_size, 2);
        assert!(!s.insert_spaces);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let s: FileSettings = serde_json::from_str(r#"{"insertSpaces": true}"#).unwrap();
        assert_eq!(s, FileSettings::new(2, true));
    }

    #[test]
    fn indent_uses_configured_style() {
        assert_eq!(FileSettings::new(4, true).indent(2), "        ");
        assert_eq!(FileSettings::new(4, false).indent(2), "\t\t");
        assert_eq!(FileSettings::new(0, false).effective_tab_size(), 1);
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

pub const SOURCE: &str = "sass";

/// Zero-based line/character position, the same convention editors use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Range on a single line from `start` to `end` characters.
    pub fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}-{}", self.start, self.end.character + 1)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "info",
            Severity::Hint => "hint",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    #[serde(rename = "@useNotTopLevel")]
    UseNotTopLevel,
    #[serde(rename = "invalidIndentation")]
    InvalidIndentation,
    #[serde(rename = "variableNotFound")]
    VariableNotFound,
    #[serde(rename = "importNotFound")]
    ImportNotFound,
    #[serde(rename = "importCycle")]
    ImportCycle,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UseNotTopLevel => "@useNotTopLevel",
            DiagnosticCode::InvalidIndentation => "invalidIndentation",
            DiagnosticCode::VariableNotFound => "variableNotFound",
            DiagnosticCode::ImportNotFound => "importNotFound",
            DiagnosticCode::ImportCycle => "importCycle",
        }
    }
}

/// A problem found while parsing one revision of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub severity: Severity,
    pub source: String,
    pub range: Range,
    /// Formatting the file removes the cause (e.g. indentation).
    pub is_resolved_by_stringify: bool,
}

impl Diagnostic {
    fn new(code: DiagnosticCode, severity: Severity, message: String, range: Range, resolved: bool) -> Self {
        Self {
            code,
            message,
            severity,
            source: SOURCE.to_string(),
            range,
            is_resolved_by_stringify: resolved,
        }
    }

    pub fn use_not_top_level(range: Range) -> Self {
        Self::new(
            DiagnosticCode::UseNotTopLevel,
            Severity::Error,
            "@use rules must come before any rules other than @forward, including style rules. \
             However, you can declare variables before @use rules to use when configuring modules."
                .to_string(),
            range,
            true,
        )
    }

    /// `depth` is the number of scopes open at the offending line.
    pub fn invalid_indentation(range: Range, depth: usize, tab_size: usize, insert_spaces: bool) -> Self {
        let expected = depth * tab_size;
        let unit = if insert_spaces { "space" } else { "tab" };
        Self::new(
            DiagnosticCode::InvalidIndentation,
            Severity::Error,
            format!("Invalid Indentation Expected {} {}", expected, pluralize(unit, expected)),
            range,
            true,
        )
    }

    pub fn variable_not_found(range: Range, name: &str) -> Self {
        Self::new(
            DiagnosticCode::VariableNotFound,
            Severity::Error,
            format!("Variable declaration for {} not found.", name),
            range,
            false,
        )
    }

    pub fn import_not_found(range: Range, path: &str) -> Self {
        Self::new(
            DiagnosticCode::ImportNotFound,
            Severity::Warning,
            format!("Can't find stylesheet to import: {}", path),
            range,
            false,
        )
    }

    pub fn import_cycle(range: Range, path: &str) -> Self {
        Self::new(
            DiagnosticCode::ImportCycle,
            Severity::Warning,
            format!("Module loop: {} is already being loaded.", path),
            range,
            false,
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {} [{}]", self.range.start, self.severity, self.message, self.code.as_str())
    }
}

fn pluralize(word: &str, amount: usize) -> String {
    if amount == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

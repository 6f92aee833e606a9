//! Parser, resolver and formatter for the indented Sass syntax.

pub mod ast;
pub mod cache;
pub mod classify;
pub mod diagnostics;
pub mod expr;
mod parser;
pub mod resolve;
pub mod settings;
pub mod stringify;

pub use ast::{Node, SassFile};
pub use cache::{Document, FileCache, FsLoader, MemoryLoader, PartialDocument, SourceLoader};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use parser::{head_params, node_params};
pub use settings::FileSettings;

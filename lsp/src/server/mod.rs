mod analysis;
mod config;
mod entry;
mod formatting;
mod handlers;
mod navigation;
mod state;
mod symbols;
mod text;
mod utils;

#[cfg(test)]
mod text_test;

pub use entry::run;

/// Delay before reparsing after an edit.
pub(crate) const CHANGE_DEBOUNCE_MS: u64 = 200;
/// Delay before the first parse of an opened document.
pub(crate) const OPEN_DEBOUNCE_MS: u64 = 50;

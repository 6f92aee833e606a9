use tracing::trace;

use super::scope::{ImportKind, Scope};
use crate::ast::Location;
use crate::cache::FileCache;

/// Looks up variable declarations visible from the line being parsed.
pub struct Resolver<'a> {
    pub uri: &'a str,
    pub scope: &'a Scope,
    pub cache: &'a FileCache,
}

impl<'a> Resolver<'a> {
    pub fn new(uri: &'a str, scope: &'a Scope, cache: &'a FileCache) -> Self {
        Self { uri, scope, cache }
    }

    /// Declaration of `name` (`$` included), nearest first.
    ///
    /// Head parameters of open scopes shadow everything, then the file's own
    /// bindings from the innermost level out, then imported files in the
    /// order they were declared.
    pub fn resolve(&self, name: &str, namespace: Option<&str>) -> Option<Location> {
        if namespace.is_none() {
            if let Some(loc) = self.find_in_params(name) {
                return Some(loc);
            }
            if let Some(loc) = self.find_in_bindings(name) {
                return Some(loc);
            }
        }
        self.find_in_imports(name, namespace)
    }

    /// `namespace` belongs to a `@use` of a module that is never loaded
    /// (`sass:math`); its members cannot be checked.
    pub fn is_external_namespace(&self, namespace: Option<&str>) -> bool {
        namespace.is_some()
            && self.scope.imports.iter().flatten().any(|import| {
                import.is_external()
                    && matches!(&import.kind, ImportKind::Use { namespace: ns } if ns.as_deref() == namespace)
            })
    }

    fn find_in_params(&self, name: &str) -> Option<Location> {
        self.scope
            .frames
            .iter()
            .rev()
            .find(|frame| frame.params.iter().any(|p| p == name))
            .map(|frame| Location::new(self.uri, frame.line))
    }

    fn find_in_bindings(&self, name: &str) -> Option<Location> {
        self.scope
            .variables
            .iter()
            .rev()
            .flat_map(|level| level.iter().rev())
            .find(|binding| binding.name == name)
            .map(|binding| Location::new(self.uri, binding.line))
    }

    fn find_in_imports(&self, name: &str, namespace: Option<&str>) -> Option<Location> {
        for import in self.scope.imports.iter().flatten() {
            let visible = match &import.kind {
                ImportKind::Import => namespace.is_none(),
                ImportKind::Use { namespace: ns } => ns.as_deref() == namespace,
            };
            if !visible {
                continue;
            }
            if let Some(var) = self.cache.find_variable(&import.uri, name) {
                trace!(name, target = %import.uri, line = var.line, "resolved through import");
                return Some(Location::new(import.uri.as_str(), var.line));
            }
        }
        None
    }
}

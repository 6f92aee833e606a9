//! Scope tracking and name resolution.

pub mod path;
pub mod resolver;
pub mod scope;

pub use path::{ImportTarget, default_namespace, resolve_target};
pub use resolver::Resolver;
pub use scope::{Attach, Binding, ImportBinding, ImportKind, Placement, Scope, ScopeFrame, distance, level};

#[cfg(test)]
mod scope_test;

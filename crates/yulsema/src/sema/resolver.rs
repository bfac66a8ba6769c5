//! External identifier resolution

use crate::common::{Ident, Span};

/// How an external identifier is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
}

/// Resolves identifiers against bindings that live outside the analyzed tree
/// (e.g. the host language of inline code).
///
/// Called synchronously during analysis; implementations must not call back
/// into the analyzer.
pub trait Resolver {
    /// Type of `name` for the given access, or `None` to decline and let the
    /// ordinary scope rules apply.
    fn resolve(&self, name: Ident, access: AccessKind, span: Span) -> Option<Ident>;
}

impl<F> Resolver for F
where
    F: Fn(Ident, AccessKind, Span) -> Option<Ident>,
{
    fn resolve(&self, name: Ident, access: AccessKind, span: Span) -> Option<Ident> {
        self(name, access, span)
    }
}

//! Expression AST nodes

use super::Literal;
use crate::common::{Ident, Span};

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn literal(literal: Literal, span: Span) -> Self {
        Self::new(ExprKind::Literal(literal), span)
    }

    pub fn identifier(name: impl Into<Ident>, span: Span) -> Self {
        Self::new(ExprKind::Identifier(name.into()), span)
    }

    pub fn call(name: impl Into<Ident>, args: Vec<Expr>, span: Span) -> Self {
        Self::new(
            ExprKind::Call(FunctionCall {
                name: Name::new(name, span),
                args,
            }),
            span,
        )
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

/// Expression kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Literal: 42, 0xff, "abc", true
    Literal(Literal),

    /// Identifier: x
    Identifier(Ident),

    /// Call of a builtin or user function: add(x, 1)
    Call(FunctionCall),
}

/// Function call: f(a, b)
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: Name,
    pub args: Vec<Expr>,
}

/// Name with the location it was written at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Name {
    pub name: Ident,
    pub span: Span,
}

impl Name {
    pub fn new(name: impl Into<Ident>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Declared name with an optional type: x or x:u256
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedName {
    pub name: Ident,
    /// `None` means the dialect default type
    pub ty: Option<Ident>,
    pub span: Span,
}

impl TypedName {
    pub fn new(name: impl Into<Ident>, span: Span) -> Self {
        Self {
            name: name.into(),
            ty: None,
            span,
        }
    }

    pub fn with_type(mut self, ty: impl Into<Ident>) -> Self {
        self.ty = Some(ty.into());
        self
    }
}

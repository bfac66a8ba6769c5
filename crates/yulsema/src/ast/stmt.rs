//! Statement AST nodes

use std::sync::atomic::{AtomicU32, Ordering};

use super::{Expr, Literal, Name, TypedName};
use crate::common::Span;

/// Identity of a block, stable for the lifetime of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);

impl BlockId {
    fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Expression statement: f(x)
    Expr(Expr),

    /// Assignment: a, b := f()
    Assign {
        targets: Vec<Name>,
        value: Expr,
    },

    /// Variable declaration: let a, b:u256 := f()
    Let {
        variables: Vec<TypedName>,
        value: Option<Expr>,
    },

    /// Function definition: function f(a) -> r { ... }
    Function(FunctionDefinition),

    /// If statement: if cond { ... }
    If {
        condition: Expr,
        body: Block,
    },

    /// Switch statement: switch x case 1 { ... } default { ... }
    Switch {
        scrutinee: Expr,
        cases: Vec<Case>,
    },

    /// For loop: for { init } cond { post } { body }
    For(ForLoop),

    /// Break statement
    Break,

    /// Continue statement
    Continue,

    /// Leave statement (return from the current function)
    Leave,

    /// Nested block: { ... }
    Block(Block),
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: Name,
    pub params: Vec<TypedName>,
    pub returns: Vec<TypedName>,
    pub body: Block,
}

/// Switch case; `value` is `None` for the default case
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub value: Option<Literal>,
    pub body: Block,
    pub span: Span,
}

/// For loop
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub init: Block,
    pub condition: Expr,
    pub post: Block,
    pub body: Block,
}

/// Block: { ... }
///
/// Cloning allocates a fresh [`BlockId`], so a copied block gets its own
/// scope when it is placed elsewhere in the tree. Equality ignores the id.
#[derive(Debug)]
pub struct Block {
    pub id: BlockId,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    /// Create a block with a fresh [`BlockId`]
    pub fn new(statements: Vec<Stmt>, span: Span) -> Self {
        Self {
            id: BlockId::fresh(),
            statements,
            span,
        }
    }

    pub fn empty(span: Span) -> Self {
        Self::new(Vec::new(), span)
    }
}

impl Clone for Block {
    fn clone(&self) -> Self {
        Self::new(self.statements.clone(), self.span)
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.statements == other.statements && self.span == other.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypedName;

    #[test]
    fn test_clone_gets_fresh_id() {
        let inner = Block::empty(Span::dummy());
        let outer = Block::new(
            vec![
                Stmt::new(StmtKind::Block(inner), Span::dummy()),
                Stmt::new(
                    StmtKind::Let {
                        variables: vec![TypedName::new("x", Span::dummy())],
                        value: None,
                    },
                    Span::dummy(),
                ),
            ],
            Span::dummy(),
        );
        let copy = outer.clone();

        assert_ne!(copy.id, outer.id);
        let (StmtKind::Block(a), StmtKind::Block(b)) =
            (&outer.statements[0].kind, &copy.statements[0].kind)
        else {
            panic!("expected nested blocks");
        };
        assert_ne!(a.id, b.id);
        assert_eq!(copy, outer);
    }
}

//! Program tree handed over by the parser
//!
//! The tree is immutable once built. Blocks carry a [`BlockId`] so that the
//! analysis result can refer to them without borrowing the tree.

mod display;
mod expr;
mod literal;
mod stmt;

pub(crate) use display::{indent, quote};
pub use expr::*;
pub use literal::*;
pub use stmt::*;

//! yulsema - semantic analysis for a Yul-style stack-machine IR
//!
//! Takes an already parsed program tree and checks that it is well scoped,
//! well typed and free of misplaced control statements, producing the scope
//! tables later stages consume.
//!
//! ## Architecture
//!
//! - **AST** (`ast/`): Program tree and its source rendering
//! - **Dialect** (`dialect/`): Builtins, types and literal grammar (EVM reference dialect)
//! - **Sema** (`sema/`): Scope construction and the analyzer
//! - **Object** (`object/`): Code/data containers and qualified names
//! - **Common** (`common/`): Shared infrastructure (identifiers, errors, spans)

pub mod ast;
pub mod common;
pub mod dialect;
pub mod object;
pub mod sema;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, Diagnostic, DiagnosticList, DiagnosticReporter, Ident, Span};
pub use dialect::{Dialect, EvmDialect, EvmVersion};
pub use object::{Data, Object, ObjectNode};
pub use sema::{Analysis, Analyzer, AnalyzerConfig, AnalysisInfo};

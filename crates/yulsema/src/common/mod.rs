//! Common infrastructure shared by the analyzer and the object model

mod error;
mod ident;
mod span;

pub use error::{
    CompileError, CompileResult, Diagnostic, DiagnosticList, DiagnosticReporter, ErrorReporter,
};
pub use ident::Ident;
pub use span::Span;

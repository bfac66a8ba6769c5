//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use thiserror::Error;
use super::Span;

/// Problem found while analyzing a program tree
///
/// Diagnostics are accumulated, never thrown: the analyzer keeps walking after
/// reporting one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("Type error at {span:?}: {message}")]
    Type { message: String, span: Span },

    #[error("Declaration error at {span:?}: {message}")]
    Declaration { message: String, span: Span },

    #[error("Warning at {span:?}: {message}")]
    Warning { message: String, span: Span },
}

impl Diagnostic {
    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        Self::Type {
            message: message.into(),
            span,
        }
    }

    pub fn declaration(message: impl Into<String>, span: Span) -> Self {
        Self::Declaration {
            message: message.into(),
            span,
        }
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::Warning {
            message: message.into(),
            span,
        }
    }

    /// Warnings never make an analysis fail
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Warning { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Type { message, .. }
            | Self::Declaration { message, .. }
            | Self::Warning { message, .. } => message,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Type { span, .. } | Self::Declaration { span, .. } | Self::Warning { span, .. } => {
                *span
            }
        }
    }
}

/// Fatal error, returned instead of accumulated
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Internal consistency violation: {} error(s) in code that must be valid, first: {}",
        .diagnostics.len(),
        .diagnostics.first().map_or("<none>", Diagnostic::message))]
    InternalConsistency { diagnostics: Vec<Diagnostic> },

    #[error("Cannot render diagnostic: {0}")]
    Render(#[from] codespan_reporting::files::Error),
}

impl CompileError {
    pub fn internal_consistency(diagnostics: Vec<Diagnostic>) -> Self {
        Self::InternalConsistency { diagnostics }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Sink for diagnostics produced during analysis
pub trait ErrorReporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// In-memory [`ErrorReporter`] keeping diagnostics in report order
#[derive(Debug, Clone, Default)]
pub struct DiagnosticList {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl ErrorReporter for DiagnosticList {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    fn to_codespan(file_id: usize, diagnostic: &Diagnostic) -> CodespanDiagnostic<usize> {
        let (severity, title) = match diagnostic {
            Diagnostic::Type { .. } => (Severity::Error, "Type error"),
            Diagnostic::Declaration { .. } => (Severity::Error, "Declaration error"),
            Diagnostic::Warning { .. } => (Severity::Warning, "Warning"),
        };

        CodespanDiagnostic::new(severity)
            .with_message(title)
            .with_labels(vec![
                Label::primary(file_id, diagnostic.span().range()).with_message(diagnostic.message())
            ])
    }

    /// Render `diagnostics` into `writer`
    pub fn emit_to(
        &self,
        writer: &mut dyn WriteColor,
        file_id: usize,
        diagnostics: &[Diagnostic],
    ) -> CompileResult<()> {
        for diagnostic in diagnostics {
            term::emit(writer, &self.config, &self.files, &Self::to_codespan(file_id, diagnostic))?;
        }
        Ok(())
    }

    /// Render `diagnostics` to stderr
    pub fn report_all(&self, file_id: usize, diagnostics: &[Diagnostic]) {
        let writer = StandardStream::stderr(ColorChoice::Auto);
        let _ = self.emit_to(&mut writer.lock(), file_id, diagnostics);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

//! Semantic analysis
//!
//! Scope construction ([`ScopeFiller`]) followed by a single checking pass
//! ([`Analyzer`]) that validates scoping, typing and control flow.

mod analyzer;
mod filler;
mod resolver;
mod scope;

pub use analyzer::{Analysis, Analyzer};
pub use filler::ScopeFiller;
pub use resolver::{AccessKind, Resolver};
pub use scope::{AnalysisInfo, Resolved, Scope, ScopeEntry, ScopeId};

/// Configuration options passed to the analyzer
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerConfig {
    pub verbose: bool,
    /// Print the scope tables once they are built
    pub dump_scopes: bool,
}

//! Scope construction pre-pass
//!
//! Builds the scope of every block before the analyzer walks the tree.
//! Functions of a block are registered before anything else in it, which makes
//! them visible throughout the block (including before their definition and
//! inside their own body).

use crate::ast::{Block, FunctionDefinition, StmtKind, TypedName};
use crate::common::{Diagnostic, ErrorReporter, Ident, Span};
use crate::dialect::Dialect;
use super::scope::{AnalysisInfo, Scope, ScopeId};

/// Populates an [`AnalysisInfo`] with one scope per block
pub struct ScopeFiller<'a> {
    info: &'a mut AnalysisInfo,
    reporter: &'a mut dyn ErrorReporter,
    dialect: &'a dyn Dialect,
    errors: usize,
}

impl<'a> ScopeFiller<'a> {
    pub fn new(
        info: &'a mut AnalysisInfo,
        reporter: &'a mut dyn ErrorReporter,
        dialect: &'a dyn Dialect,
    ) -> Self {
        Self {
            info,
            reporter,
            dialect,
            errors: 0,
        }
    }

    /// Fill scopes for `root` and everything below it; returns the number of
    /// errors reported.
    pub fn fill(mut self, root: &Block) -> usize {
        self.fill_block(root, None);
        self.errors
    }

    fn fill_block(&mut self, block: &Block, parent: Option<ScopeId>) -> ScopeId {
        let scope = self.info.push_scope(Scope::new(parent));
        if self.info.scope_id(block.id).is_some() {
            self.error(Diagnostic::declaration(
                "Block appears more than once in the tree",
                block.span,
            ));
        }
        self.info.bind_block(block.id, scope);

        for stmt in &block.statements {
            if let StmtKind::Function(function) = &stmt.kind {
                self.register_function(scope, function);
            }
        }

        for stmt in &block.statements {
            match &stmt.kind {
                StmtKind::Let { variables, .. } => {
                    for variable in variables {
                        self.register_variable(scope, variable);
                    }
                }
                StmtKind::Function(function) => self.fill_function(scope, function),
                StmtKind::If { body, .. } => {
                    self.fill_block(body, Some(scope));
                }
                StmtKind::Switch { cases, .. } => {
                    for case in cases {
                        self.fill_block(&case.body, Some(scope));
                    }
                }
                StmtKind::For(for_loop) => {
                    let init = self.fill_block(&for_loop.init, Some(scope));
                    self.fill_block(&for_loop.body, Some(init));
                    self.fill_block(&for_loop.post, Some(init));
                }
                StmtKind::Block(inner) => {
                    self.fill_block(inner, Some(scope));
                }
                StmtKind::Expr(_)
                | StmtKind::Assign { .. }
                | StmtKind::Break
                | StmtKind::Continue
                | StmtKind::Leave => {}
            }
        }

        scope
    }

    fn fill_function(&mut self, parent: ScopeId, function: &FunctionDefinition) {
        let scope = self.info.push_scope(Scope::function(Some(parent)));
        self.info.bind_function_body(function.body.id, scope);

        for variable in function.params.iter().chain(&function.returns) {
            self.register_variable(scope, variable);
        }

        self.fill_block(&function.body, Some(scope));
    }

    fn register_function(&mut self, scope: ScopeId, function: &FunctionDefinition) {
        let name = function.name;
        if !self.check_not_builtin(name.name, name.span) {
            return;
        }
        let parameters = function.params.iter().map(|p| self.type_of(p)).collect();
        let returns = function.returns.iter().map(|r| self.type_of(r)).collect();
        if let Err(message) =
            self.info.scope_mut(scope).register_function(name.name, parameters, returns)
        {
            self.error(Diagnostic::declaration(message, name.span));
        }
    }

    fn register_variable(&mut self, scope: ScopeId, variable: &TypedName) {
        if !self.check_not_builtin(variable.name, variable.span) {
            return;
        }
        let ty = self.type_of(variable);
        if let Err(message) = self.info.scope_mut(scope).register_variable(variable.name, ty) {
            self.error(Diagnostic::declaration(message, variable.span));
        }
    }

    fn check_not_builtin(&mut self, name: Ident, span: Span) -> bool {
        if self.dialect.builtin(name).is_some() {
            self.error(Diagnostic::declaration(
                format!("Cannot use builtin function name `{name}` as identifier name"),
                span,
            ));
            return false;
        }
        true
    }

    fn type_of(&self, variable: &TypedName) -> Ident {
        variable.ty.unwrap_or_else(|| self.dialect.default_type())
    }

    fn error(&mut self, diagnostic: Diagnostic) {
        self.errors += 1;
        self.reporter.report(diagnostic);
    }
}

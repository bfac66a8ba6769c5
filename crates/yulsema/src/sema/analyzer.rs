//! Semantic analyzer - scoping, type checking and control-flow validation
//!
//! One depth-first pass over a block. Problems are reported to an
//! [`ErrorReporter`] and the walk always continues, so a single run surfaces
//! every diagnostic it can.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ptr;

use crate::ast::*;
use crate::common::{
    CompileError, CompileResult, Diagnostic, DiagnosticList, ErrorReporter, Ident, Span,
};
use crate::dialect::{check_literal_value, Dialect, LiteralArgument, OperationStatus};
use crate::object::Object;
use super::filler::ScopeFiller;
use super::resolver::{AccessKind, Resolver};
use super::scope::{AnalysisInfo, ScopeEntry, ScopeId};
use super::AnalyzerConfig;

/// Where the walk currently is
#[derive(Debug, Clone, Copy)]
struct Context {
    scope: ScopeId,
    /// Innermost loop whose body we are in
    current_loop: Option<Span>,
    current_function: Option<Ident>,
}

/// Owned copy of a scope entry found by a lookup
enum Binding {
    Variable {
        scope: ScopeId,
        ty: Ident,
        crossed_function: bool,
    },
    Function {
        parameters: Vec<Ident>,
        returns: Vec<Ident>,
    },
    Label,
}

/// Result of [`Analyzer::analyze`]
#[derive(Debug)]
pub struct Analysis<'a> {
    /// No errors were reported by this run; warnings do not count
    pub success: bool,
    pub info: AnalysisInfo,
    /// Objects referenced by name, each once, in order of first use
    pub needed_objects: Vec<&'a Object>,
}

/// Semantic analyzer
///
/// Consumed by [`analyze`](Self::analyze); build a new one per run.
pub struct Analyzer<'a, 'r> {
    dialect: &'a dyn Dialect,
    reporter: &'r mut dyn ErrorReporter,
    resolver: Option<&'a dyn Resolver>,
    data_names: BTreeSet<Ident>,
    objects_by_data_name: BTreeMap<Ident, &'a Object>,
    config: AnalyzerConfig,

    info: AnalysisInfo,
    active: HashSet<(ScopeId, Ident)>,
    needed_objects: Vec<&'a Object>,
    errors: usize,
    warnings: usize,
}

impl<'a, 'r> Analyzer<'a, 'r> {
    pub fn new(dialect: &'a dyn Dialect, reporter: &'r mut dyn ErrorReporter) -> Self {
        Self {
            dialect,
            reporter,
            resolver: None,
            data_names: BTreeSet::new(),
            objects_by_data_name: BTreeMap::new(),
            config: AnalyzerConfig::default(),
            info: AnalysisInfo::new(),
            active: HashSet::new(),
            needed_objects: Vec::new(),
            errors: 0,
            warnings: 0,
        }
    }

    /// Consult `resolver` for identifiers the tree does not declare
    pub fn with_resolver(mut self, resolver: &'a dyn Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Make the qualified data and object names of `object` addressable
    pub fn with_object(mut self, object: &'a Object) -> Self {
        self.data_names = object.data_names();
        self.objects_by_data_name = object.sub_objects_by_data_name();
        self
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Analyze `block` and everything below it
    pub fn analyze(mut self, block: &Block) -> Analysis<'a> {
        if self.config.verbose {
            eprintln!("Building scopes ({} dialect)...", self.dialect.name());
        }
        self.errors += ScopeFiller::new(&mut self.info, &mut *self.reporter, self.dialect).fill(block);

        if self.config.dump_scopes {
            eprintln!("{}", scopes_dump(&self.info));
        }

        if self.config.verbose {
            eprintln!("Analyzing...");
        }
        if let Some(scope) = self.info.scope_id(block.id) {
            let ctx = Context {
                scope,
                current_loop: None,
                current_function: None,
            };
            self.visit_block(block, ctx);
        }

        if self.config.verbose {
            eprintln!(
                "Analysis finished: {} error(s), {} warning(s), {} object(s) needed",
                self.errors,
                self.warnings,
                self.needed_objects.len()
            );
        }

        Analysis {
            success: self.errors == 0,
            info: self.info,
            needed_objects: self.needed_objects,
        }
    }

    /// Analyze the code of `object`, which is expected to be valid.
    ///
    /// Any error is an internal consistency violation of whoever produced
    /// the object.
    pub fn analyze_strict(dialect: &dyn Dialect, object: &Object) -> CompileResult<AnalysisInfo> {
        let mut reporter = DiagnosticList::new();
        let analysis = Analyzer::new(dialect, &mut reporter)
            .with_object(object)
            .analyze(object.code());
        if analysis.success {
            return Ok(analysis.info);
        }
        let errors = reporter
            .into_diagnostics()
            .into_iter()
            .filter(Diagnostic::is_error)
            .collect();
        Err(CompileError::internal_consistency(errors))
    }

    // Statements

    fn visit_block(&mut self, block: &Block, ctx: Context) {
        if let Some(scope) = self.visit_statements(block, ctx) {
            self.deactivate(scope);
        }
    }

    /// Analyze the statements of `block` in its scope, leaving its variables
    /// active
    fn visit_statements(&mut self, block: &Block, ctx: Context) -> Option<ScopeId> {
        let scope = self.info.scope_id(block.id)?;
        let inner = Context { scope, ..ctx };
        for stmt in &block.statements {
            self.visit_stmt(stmt, inner);
        }
        Some(scope)
    }

    fn visit_stmt(&mut self, stmt: &Stmt, ctx: Context) {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                let types = self.visit_expr(expr, ctx);
                if !types.is_empty() {
                    self.type_error(
                        format!(
                            "Top-level expressions are not supposed to return values (this expression returns {} value(s)). Use `pop()` or assign them.",
                            types.len()
                        ),
                        expr.span,
                    );
                }
            }
            StmtKind::Assign { targets, value } => {
                self.visit_assignment(targets, value, stmt.span, ctx);
            }
            StmtKind::Let { variables, value } => {
                self.visit_let(variables, value.as_ref(), stmt.span, ctx);
            }
            StmtKind::Function(function) => self.visit_function(function),
            StmtKind::If { condition, body } => {
                self.expect_bool(condition, ctx);
                self.visit_block(body, ctx);
            }
            StmtKind::Switch { scrutinee, cases } => {
                self.visit_switch(scrutinee, cases, stmt.span, ctx);
            }
            StmtKind::For(for_loop) => self.visit_for(for_loop, stmt.span, ctx),
            StmtKind::Break | StmtKind::Continue => {
                if ctx.current_loop.is_none() {
                    let keyword = if matches!(stmt.kind, StmtKind::Break) { "break" } else { "continue" };
                    self.declaration_error(
                        format!("Keyword `{keyword}` needs to be inside a for-loop body."),
                        stmt.span,
                    );
                }
            }
            StmtKind::Leave => {
                if ctx.current_function.is_none() {
                    self.declaration_error(
                        "Keyword `leave` can only be used inside a function.",
                        stmt.span,
                    );
                }
            }
            StmtKind::Block(block) => self.visit_block(block, ctx),
        }
    }

    fn visit_assignment(&mut self, targets: &[Name], value: &Expr, span: Span, ctx: Context) {
        let mut seen = HashSet::new();
        for target in targets {
            if !seen.insert(target.name) {
                self.declaration_error(
                    format!(
                        "Variable `{}` occurs multiple times on the left-hand side of the assignment.",
                        target.name
                    ),
                    target.span,
                );
            }
        }

        let value_types = self.visit_expr(value, ctx);
        let target_types: Vec<_> = targets
            .iter()
            .map(|target| self.check_assignment_target(*target, ctx))
            .collect();

        if value_types.len() != targets.len() {
            self.type_error(
                format!(
                    "Variable count for assignment to \"{}\" does not match number of values ({} vs. {})",
                    join_names(targets.iter().map(|t| t.name)),
                    targets.len(),
                    value_types.len()
                ),
                span,
            );
            return;
        }

        for ((target, expected), given) in targets.iter().zip(target_types).zip(value_types) {
            if let Some(expected) = expected {
                self.expect_assignable(expected, given, target.span);
            }
        }
    }

    /// Type of an assignment target, `None` if it cannot be written
    fn check_assignment_target(&mut self, target: Name, ctx: Context) -> Option<Ident> {
        match self.lookup(ctx.scope, target.name) {
            Some(Binding::Variable {
                scope,
                ty,
                crossed_function,
            }) => self.check_variable(target.name, scope, ty, crossed_function, target.span),
            Some(Binding::Function { .. } | Binding::Label) => {
                self.declaration_error(
                    format!("Assignment requires variable: `{}` is not a variable.", target.name),
                    target.span,
                );
                None
            }
            None => {
                let resolved = self
                    .resolver
                    .and_then(|resolver| resolver.resolve(target.name, AccessKind::Write, target.span));
                if resolved.is_none() {
                    self.declaration_error(
                        format!("Variable `{}` not found or variable not lvalue.", target.name),
                        target.span,
                    );
                }
                resolved
            }
        }
    }

    fn visit_let(&mut self, variables: &[TypedName], value: Option<&Expr>, span: Span, ctx: Context) {
        for variable in variables {
            if let Some(ty) = variable.ty {
                self.check_type(ty, variable.span);
            }
        }

        if let Some(value) = value {
            let types = self.visit_expr(value, ctx);
            if types.len() == variables.len() {
                for (variable, given) in variables.iter().zip(types) {
                    let expected = variable.ty.unwrap_or_else(|| self.dialect.default_type());
                    self.expect_assignable(expected, given, variable.span);
                }
            } else {
                self.type_error(
                    format!(
                        "Variable count mismatch for declaration of \"{}\": {} variables and {} values.",
                        join_names(variables.iter().map(|v| v.name)),
                        variables.len(),
                        types.len()
                    ),
                    span,
                );
            }
        }

        for variable in variables {
            self.active.insert((ctx.scope, variable.name));
        }
    }

    fn visit_function(&mut self, function: &FunctionDefinition) {
        let Some(scope) = self.info.function_scope_id(function.body.id) else {
            return;
        };

        for variable in function.params.iter().chain(&function.returns) {
            if let Some(ty) = variable.ty {
                self.check_type(ty, variable.span);
            }
            self.active.insert((scope, variable.name));
        }

        let ctx = Context {
            scope,
            current_loop: None,
            current_function: Some(function.name.name),
        };
        self.visit_block(&function.body, ctx);
        self.deactivate(scope);
    }

    fn visit_switch(&mut self, scrutinee: &Expr, cases: &[Case], span: Span, ctx: Context) {
        if let [only] = cases {
            if only.value.is_none() {
                self.warning("Switch statement with only a default case.", span);
            }
        }

        let ty = self.expect_expression(scrutinee, ctx);
        let mut values = HashSet::new();
        let mut has_default = false;

        for case in cases {
            match &case.value {
                Some(literal) => {
                    let case_type = self.visit_literal(literal, case.span);
                    self.expect_type(ty, case_type, case.span);
                    if let Some(value) = literal.value() {
                        if !values.insert(value) {
                            self.declaration_error(
                                format!("Duplicate case \"{}\" defined.", literal.value),
                                case.span,
                            );
                        }
                    }
                }
                None if has_default => {
                    self.declaration_error("Only one default case allowed.", case.span);
                }
                None => has_default = true,
            }
            self.visit_block(&case.body, ctx);
        }
    }

    fn visit_for(&mut self, for_loop: &ForLoop, span: Span, ctx: Context) {
        let outside = Context {
            current_loop: None,
            ..ctx
        };
        let Some(init) = self.visit_statements(&for_loop.init, outside) else {
            return;
        };

        let header = Context { scope: init, ..outside };
        self.expect_bool(&for_loop.condition, header);
        self.visit_block(
            &for_loop.body,
            Context {
                current_loop: Some(span),
                ..header
            },
        );
        self.visit_block(&for_loop.post, header);

        self.deactivate(init);
    }

    // Expressions

    /// Types of the values `expr` evaluates to
    fn visit_expr(&mut self, expr: &Expr, ctx: Context) -> Vec<Ident> {
        match &expr.kind {
            ExprKind::Literal(literal) => vec![self.visit_literal(literal, expr.span)],
            ExprKind::Identifier(name) => vec![self.visit_identifier(*name, expr.span, ctx)],
            ExprKind::Call(call) => self.visit_call(call, ctx),
        }
    }

    fn visit_literal(&mut self, literal: &Literal, span: Span) -> Ident {
        let ty = literal.ty.unwrap_or_else(|| self.dialect.literal_type(literal.kind));
        if !self.check_type(ty, span) {
            return self.dialect.default_type();
        }
        match self.dialect.validate_literal(literal, ty) {
            Ok(()) => ty,
            Err(message) => {
                self.type_error(message, span);
                self.dialect.default_type()
            }
        }
    }

    fn visit_identifier(&mut self, name: Ident, span: Span, ctx: Context) -> Ident {
        let default = self.dialect.default_type();

        match self.lookup(ctx.scope, name) {
            Some(Binding::Variable {
                scope,
                ty,
                crossed_function,
            }) => {
                return self
                    .check_variable(name, scope, ty, crossed_function, span)
                    .unwrap_or(default);
            }
            Some(Binding::Function { .. }) => {
                self.type_error(format!("Function `{name}` used without being called."), span);
                return default;
            }
            Some(Binding::Label) => {
                self.type_error(format!("Label `{name}` cannot be used as a value."), span);
                return default;
            }
            None => {}
        }

        if self.dialect.builtin(name).is_some() {
            self.check_operation(name, span);
            self.type_error(format!("Builtin function `{name}` must be called."), span);
            return default;
        }

        if let Some(ty) = self
            .resolver
            .and_then(|resolver| resolver.resolve(name, AccessKind::Read, span))
        {
            return ty;
        }

        if self.data_names.contains(&name) {
            self.mark_needed(name);
            return self.dialect.address_type();
        }

        self.declaration_error(format!("Identifier `{name}` not found."), span);
        default
    }

    fn visit_call(&mut self, call: &FunctionCall, ctx: Context) -> Vec<Ident> {
        let name = call.name;
        let dialect = self.dialect;
        let builtin = dialect.builtin(name.name);

        let signature = if let Some(builtin) = builtin {
            self.check_operation(name.name, name.span);
            Some((builtin.parameters.clone(), builtin.returns.clone()))
        } else {
            match self.lookup(ctx.scope, name.name) {
                Some(Binding::Function { parameters, returns }) => Some((parameters, returns)),
                Some(Binding::Variable { .. }) => {
                    self.type_error("Attempt to call variable instead of function.", name.span);
                    None
                }
                Some(Binding::Label) => {
                    self.type_error(format!("Attempt to call label `{}`.", name.name), name.span);
                    None
                }
                None => {
                    self.declaration_error(format!("Function `{}` not found.", name.name), name.span);
                    None
                }
            }
        };

        // Stack order: the last argument is evaluated first
        let mut argument_types = vec![None; call.args.len()];
        for (index, argument) in call.args.iter().enumerate().rev() {
            match builtin.and_then(|builtin| builtin.literal_argument(index)) {
                Some(kind) => self.check_literal_argument(argument, kind),
                None => argument_types[index] = Some(self.expect_expression(argument, ctx)),
            }
        }

        let Some((parameters, returns)) = signature else {
            return vec![self.dialect.default_type()];
        };

        if parameters.len() == call.args.len() {
            for ((parameter, argument), given) in parameters.iter().zip(&call.args).zip(argument_types) {
                if let Some(given) = given {
                    self.expect_type(*parameter, given, argument.span);
                }
            }
        } else {
            self.type_error(
                format!(
                    "Function `{}` expects {} arguments but got {}.",
                    name.name,
                    parameters.len(),
                    call.args.len()
                ),
                name.span,
            );
        }

        returns
    }

    fn check_literal_argument(&mut self, argument: &Expr, kind: LiteralArgument) {
        let Some(literal) = argument.as_literal() else {
            self.type_error("Function expects direct literals as arguments.", argument.span);
            return;
        };

        match kind {
            LiteralArgument::Any => {
                if let Err(message) = check_literal_value(literal) {
                    self.type_error(message, argument.span);
                }
            }
            LiteralArgument::ObjectName => {
                let name = Ident::new(&literal.value);
                if self.data_names.contains(&name) {
                    self.mark_needed(name);
                } else {
                    self.declaration_error(
                        format!("Unknown data object \"{}\".", literal.value),
                        argument.span,
                    );
                }
            }
        }
    }

    // Checks

    /// `expr` must evaluate to exactly one value
    fn expect_expression(&mut self, expr: &Expr, ctx: Context) -> Ident {
        let types = self.visit_expr(expr, ctx);
        if let [ty] = types.as_slice() {
            return *ty;
        }
        self.type_error(
            format!(
                "Expected expression to evaluate to one value, but got {} values instead.",
                types.len()
            ),
            expr.span,
        );
        self.dialect.default_type()
    }

    fn expect_bool(&mut self, expr: &Expr, ctx: Context) {
        let errors = self.errors;
        let ty = self.expect_expression(expr, ctx);
        let bool_type = self.dialect.bool_type();
        if self.errors == errors && ty != bool_type {
            self.type_error(
                format!("Expected a value of boolean type \"{bool_type}\" but got \"{ty}\"."),
                expr.span,
            );
        }
    }

    fn expect_type(&mut self, expected: Ident, given: Ident, span: Span) {
        if expected != given {
            self.type_error(
                format!("Expected a value of type \"{expected}\" but got \"{given}\"."),
                span,
            );
        }
    }

    fn expect_assignable(&mut self, expected: Ident, given: Ident, span: Span) {
        if expected != given {
            self.type_error(
                format!("Assigning a value of type \"{given}\" to a variable of type \"{expected}\"."),
                span,
            );
        }
    }

    fn check_type(&mut self, ty: Ident, span: Span) -> bool {
        if self.dialect.is_valid_type(ty) {
            return true;
        }
        self.type_error(
            format!("\"{ty}\" is not a valid type (user defined types are not yet supported)."),
            span,
        );
        false
    }

    /// Type of a variable reference, `None` if it is not visible here
    fn check_variable(
        &mut self,
        name: Ident,
        scope: ScopeId,
        ty: Ident,
        crossed_function: bool,
        span: Span,
    ) -> Option<Ident> {
        if crossed_function {
            self.declaration_error(
                format!("Identifier `{name}` is a variable declared outside the current function."),
                span,
            );
            return None;
        }
        if !self.active.contains(&(scope, name)) {
            self.declaration_error(format!("Variable `{name}` used before it was declared."), span);
            return None;
        }
        Some(ty)
    }

    fn check_operation(&mut self, name: Ident, span: Span) {
        match self.dialect.operation_status(name) {
            OperationStatus::Available => {}
            OperationStatus::Deprecated(message) => self.warning(message, span),
            OperationStatus::Unavailable(message) => self.type_error(message, span),
        }
    }

    // State

    fn lookup(&self, scope: ScopeId, name: Ident) -> Option<Binding> {
        let resolved = self.info.lookup(scope, name)?;
        Some(match resolved.entry {
            ScopeEntry::Variable { ty, .. } => Binding::Variable {
                scope: resolved.scope,
                ty: *ty,
                crossed_function: resolved.crossed_function,
            },
            ScopeEntry::Function {
                parameters, returns, ..
            } => Binding::Function {
                parameters: parameters.clone(),
                returns: returns.clone(),
            },
            ScopeEntry::Label { .. } => Binding::Label,
        })
    }

    fn deactivate(&mut self, scope: ScopeId) {
        self.active.retain(|&(declared_in, _)| declared_in != scope);
    }

    fn mark_needed(&mut self, name: Ident) {
        let Some(&object) = self.objects_by_data_name.get(&name) else {
            return;
        };
        if !self.needed_objects.iter().any(|needed| ptr::eq(*needed, object)) {
            self.needed_objects.push(object);
        }
    }

    fn type_error(&mut self, message: impl Into<String>, span: Span) {
        self.errors += 1;
        self.reporter.report(Diagnostic::type_error(message, span));
    }

    fn declaration_error(&mut self, message: impl Into<String>, span: Span) {
        self.errors += 1;
        self.reporter.report(Diagnostic::declaration(message, span));
    }

    fn warning(&mut self, message: impl Into<String>, span: Span) {
        self.warnings += 1;
        self.reporter.report(Diagnostic::warning(message, span));
    }
}

/// Scope tables framed the way `dump_scopes` prints them
fn scopes_dump(info: &AnalysisInfo) -> String {
    format!("=== Scopes ===\n{info}=== End Scopes ===\n")
}

fn join_names(names: impl Iterator<Item = Ident>) -> String {
    names.map(|name| name.to_string()).collect::<Vec<_>>().join(", ")
}

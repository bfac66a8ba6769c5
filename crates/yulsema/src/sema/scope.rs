//! Symbol tables and scope management

use std::collections::HashMap;
use std::fmt;

use crate::ast::{Block, BlockId};
use crate::common::Ident;

/// Index of a scope in [`AnalysisInfo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An entry in a scope
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeEntry {
    Variable {
        name: Ident,
        ty: Ident,
    },
    Function {
        name: Ident,
        parameters: Vec<Ident>,
        returns: Vec<Ident>,
    },
    /// Jump target. The scope filler declares none for the current
    /// statement set. The analyzer rejects any use of one in expressions
    /// or as an assignment target.
    Label {
        name: Ident,
    },
}

impl ScopeEntry {
    pub fn name(&self) -> Ident {
        match self {
            Self::Variable { name, .. } | Self::Function { name, .. } | Self::Label { name } => *name,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable { .. })
    }
}

/// Names declared directly in one block or function header
#[derive(Debug, Clone, Default)]
pub struct Scope {
    parent: Option<ScopeId>,
    /// Set for the scope holding a function's parameters and return variables
    function_scope: bool,
    entries: Vec<ScopeEntry>,
    index: HashMap<Ident, usize>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    pub fn function(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            function_scope: true,
            ..Self::default()
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn is_function_scope(&self) -> bool {
        self.function_scope
    }

    fn define(&mut self, entry: ScopeEntry) -> Result<(), String> {
        let name = entry.name();
        if self.index.contains_key(&name) {
            return Err(format!("`{name}` is already declared in this scope"));
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn register_variable(&mut self, name: Ident, ty: Ident) -> Result<(), String> {
        self.define(ScopeEntry::Variable { name, ty })
    }

    pub fn register_function(
        &mut self,
        name: Ident,
        parameters: Vec<Ident>,
        returns: Vec<Ident>,
    ) -> Result<(), String> {
        self.define(ScopeEntry::Function { name, parameters, returns })
    }

    /// Hook for statement kinds that introduce jump labels
    pub fn register_label(&mut self, name: Ident) -> Result<(), String> {
        self.define(ScopeEntry::Label { name })
    }

    pub fn lookup_local(&self, name: Ident) -> Option<&ScopeEntry> {
        self.index.get(&name).map(|&i| &self.entries[i])
    }

    /// Entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = &ScopeEntry> {
        self.entries.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = Ident> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.is_variable())
            .map(ScopeEntry::name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a successful lookup
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// Scope the entry was declared in
    pub scope: ScopeId,
    pub entry: &'a ScopeEntry,
    /// A function scope was left on the way out
    pub crossed_function: bool,
}

/// Scope tables produced by the analysis
///
/// Owns every scope; blocks and function bodies map to them by [`BlockId`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisInfo {
    scopes: Vec<Scope>,
    block_scopes: HashMap<BlockId, ScopeId>,
    function_scopes: HashMap<BlockId, ScopeId>,
}

impl AnalysisInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_scope(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(scope);
        id
    }

    pub(crate) fn bind_block(&mut self, block: BlockId, scope: ScopeId) {
        self.block_scopes.insert(block, scope);
    }

    pub(crate) fn bind_function_body(&mut self, body: BlockId, scope: ScopeId) {
        self.function_scopes.insert(body, scope);
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub fn scope_id(&self, block: BlockId) -> Option<ScopeId> {
        self.block_scopes.get(&block).copied()
    }

    /// The scope of `block`
    pub fn scope_of(&self, block: &Block) -> Option<&Scope> {
        self.scope_id(block.id).map(|id| self.scope(id))
    }

    /// Scope holding the parameters and return variables of the function
    /// whose body is `body`
    pub fn function_scope_id(&self, body: BlockId) -> Option<ScopeId> {
        self.function_scopes.get(&body).copied()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Look `name` up starting at `from` and walking outward.
    ///
    /// Stops at the first scope declaring `name`, so inner declarations
    /// shadow outer ones.
    pub fn lookup(&self, from: ScopeId, name: Ident) -> Option<Resolved<'_>> {
        let mut crossed_function = false;
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(entry) = scope.lookup_local(name) {
                return Some(Resolved {
                    scope: id,
                    entry,
                    crossed_function,
                });
            }
            if scope.function_scope {
                crossed_function = true;
            }
            current = scope.parent;
        }
        None
    }
}

impl fmt::Display for AnalysisInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, scope) in self.scopes.iter().enumerate() {
            let kind = if scope.function_scope { "function scope" } else { "scope" };
            match scope.parent {
                Some(parent) => writeln!(f, "{kind} #{i} (parent #{})", parent.0)?,
                None => writeln!(f, "{kind} #{i}")?,
            }
            for entry in &scope.entries {
                match entry {
                    ScopeEntry::Variable { name, ty } => writeln!(f, "    let {name}:{ty}")?,
                    ScopeEntry::Function { name, parameters, returns } => {
                        let join = |types: &[Ident]| {
                            types.iter().map(Ident::to_string).collect::<Vec<_>>().join(", ")
                        };
                        write!(f, "    function {name}({})", join(parameters))?;
                        if returns.is_empty() {
                            writeln!(f)?;
                        } else {
                            writeln!(f, " -> {}", join(returns))?;
                        }
                    }
                    ScopeEntry::Label { name } => writeln!(f, "    label {name}")?,
                }
            }
        }
        Ok(())
    }
}

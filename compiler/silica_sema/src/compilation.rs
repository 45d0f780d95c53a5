//! The compilation: symbol and scope arenas, lazy member materialization,
//! and name lookup.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use silica_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticSink, ErrorCode};
use silica_syntax::ast::{
    CompilationUnitSyntax, DataTypeSyntax, DataTypeSyntaxKind, Lifetime, MemberSyntax,
    MemberSyntaxKind, SubroutineKind, VarDeclSyntax,
};
use silica_syntax::{Name, SharedInterner, Span};
use silica_types::{ConstantValue, TypeId, TypePool};

use crate::scope::{LookupLocation, ScopeData, ScopeId, ScopeSyntax};
use crate::statement::Statement;
use crate::symbol::{MethodFlags, Namespace, Symbol, SymbolData, SymbolId, SymbolKind};
use crate::system::{self, SystemSubroutine};

/// Tunable limits for a compilation.
#[derive(Clone, Debug)]
pub struct CompilationOptions {
    /// Maximum constant-function call depth before evaluation fails.
    pub max_call_depth: u32,
    /// Maximum statements executed by one constant evaluation.
    pub max_steps: u64,
    /// Error limit forwarded to the diagnostic sink (0 = unlimited).
    pub error_limit: usize,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        CompilationOptions {
            max_call_depth: 128,
            max_steps: 1 << 20,
            error_limit: 64,
        }
    }
}

/// Resolved signature of a subroutine: everything call binding needs
/// without touching the body.
#[derive(Clone, Debug)]
pub struct SubroutineSig {
    pub kind: SubroutineKind,
    pub flags: MethodFlags,
    pub scope: ScopeId,
    pub return_type: TypeId,
    /// Formal argument symbols in declaration order.
    pub formals: Vec<SymbolId>,
    /// The implicit result variable, named after the function.
    pub return_var: Option<SymbolId>,
    /// The enclosing class, for methods.
    pub class: Option<SymbolId>,
}

/// The root of the semantic model.
///
/// Owns every symbol, scope, type, and diagnostic. Interior mutability is
/// confined to `RefCell`s; accessors clone data out so no borrow is held
/// across recursive resolution.
pub struct Compilation {
    pub types: TypePool,
    pub interner: SharedInterner,
    pub options: CompilationOptions,
    pub(crate) symbols: RefCell<Vec<Symbol>>,
    pub(crate) scopes: RefCell<Vec<ScopeData>>,
    sink: RefCell<DiagnosticSink>,
    packages: RefCell<FxHashMap<Name, SymbolId>>,

    // Lazy resolution memos. A symbol in `resolving` has a resolution in
    // flight; hitting it again is a cycle.
    pub(crate) value_types: RefCell<FxHashMap<SymbolId, TypeId>>,
    pub(crate) param_values: RefCell<FxHashMap<SymbolId, ConstantValue>>,
    pub(crate) param_types: RefCell<FxHashMap<SymbolId, TypeId>>,
    pub(crate) enum_values: RefCell<FxHashMap<SymbolId, ConstantValue>>,
    pub(crate) enum_owner_types: RefCell<FxHashMap<SymbolId, TypeId>>,
    pub(crate) typedef_types: RefCell<FxHashMap<SymbolId, TypeId>>,
    pub(crate) class_type_ids: RefCell<FxHashMap<SymbolId, TypeId>>,
    pub(crate) subr_sigs: RefCell<FxHashMap<SymbolId, Rc<SubroutineSig>>>,
    pub(crate) subr_bodies: RefCell<FxHashMap<SymbolId, Rc<[Statement]>>>,
    pub(crate) var_inits: RefCell<FxHashMap<SymbolId, Option<Rc<crate::expression::Expression>>>>,
    pub(crate) resolving: RefCell<FxHashSet<SymbolId>>,
    /// Distinguishes anonymous nominal types (inline structs).
    pub(crate) anon_counter: Cell<u32>,

    system_subs: FxHashMap<Name, Rc<dyn SystemSubroutine>>,
    root_scope: ScopeId,
    root_symbol: SymbolId,
}

impl Compilation {
    pub fn new() -> Self {
        Self::with_options(CompilationOptions::default())
    }

    pub fn with_options(options: CompilationOptions) -> Self {
        let interner = SharedInterner::new();
        let sink = DiagnosticSink::with_config(DiagnosticConfig {
            error_limit: options.error_limit,
        });

        let root_symbol = SymbolId::from_raw(0);
        let root_scope = ScopeId::from_raw(0);
        let symbols = vec![Symbol {
            kind: SymbolKind::Root,
            name: Name::EMPTY,
            span: Span::DUMMY,
            parent: None,
            index: 0,
            data: SymbolData::Scope(root_scope),
        }];
        let scopes = vec![ScopeData::new(root_symbol, None)];

        let system_subs = system::builtin_subroutines(&interner);

        Compilation {
            types: TypePool::new(),
            interner,
            options,
            symbols: RefCell::new(symbols),
            scopes: RefCell::new(scopes),
            sink: RefCell::new(sink),
            packages: RefCell::new(FxHashMap::default()),
            value_types: RefCell::new(FxHashMap::default()),
            param_values: RefCell::new(FxHashMap::default()),
            param_types: RefCell::new(FxHashMap::default()),
            enum_values: RefCell::new(FxHashMap::default()),
            enum_owner_types: RefCell::new(FxHashMap::default()),
            typedef_types: RefCell::new(FxHashMap::default()),
            class_type_ids: RefCell::new(FxHashMap::default()),
            subr_sigs: RefCell::new(FxHashMap::default()),
            subr_bodies: RefCell::new(FxHashMap::default()),
            var_inits: RefCell::new(FxHashMap::default()),
            resolving: RefCell::new(FxHashSet::default()),
            anon_counter: Cell::new(0),
            system_subs,
            root_scope,
            root_symbol,
        }
    }

    pub fn root(&self) -> SymbolId {
        self.root_symbol
    }

    pub fn root_scope(&self) -> ScopeId {
        self.root_scope
    }

    /// Intern a string as a [`Name`].
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    // ---------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------

    pub fn report(&self, diag: Diagnostic) {
        self.sink.borrow_mut().push(diag);
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.sink.borrow().diagnostics().to_vec()
    }

    pub fn has_errors(&self) -> bool {
        self.sink.borrow().has_errors()
    }

    /// Check whether any diagnostic with the given code was reported.
    pub fn has_diagnostic(&self, code: ErrorCode) -> bool {
        self.sink.borrow().diagnostics().iter().any(|d| d.code == code)
    }

    // ---------------------------------------------------------------
    // Symbol and scope arenas
    // ---------------------------------------------------------------

    /// Clone a symbol out of the arena.
    pub fn symbol(&self, id: SymbolId) -> Symbol {
        let symbols = self.symbols.borrow();
        symbols.get(id.raw() as usize).cloned().unwrap_or(Symbol {
            kind: SymbolKind::Root,
            name: Name::EMPTY,
            span: Span::DUMMY,
            parent: None,
            index: 0,
            data: SymbolData::None,
        })
    }

    pub fn symbol_name_str(&self, id: SymbolId) -> &'static str {
        self.interner.resolve(self.symbol(id).name)
    }

    pub(crate) fn add_symbol(&self, symbol: Symbol) -> SymbolId {
        let mut symbols = self.symbols.borrow_mut();
        let id = match u32::try_from(symbols.len()) {
            Ok(raw) => SymbolId::from_raw(raw),
            Err(_) => panic!("symbol arena exceeded capacity"),
        };
        symbols.push(symbol);
        id
    }

    pub(crate) fn create_scope(&self, owner: SymbolId, parent: Option<ScopeId>) -> ScopeId {
        let mut scopes = self.scopes.borrow_mut();
        let id = match u32::try_from(scopes.len()) {
            Ok(raw) => ScopeId::from_raw(raw),
            Err(_) => panic!("scope arena exceeded capacity"),
        };
        let mut data = ScopeData::new(owner, parent);
        // Nested scopes inherit the enclosing class context.
        if let Some(p) = parent {
            data.class = scopes[p.raw() as usize].class;
        }
        scopes.push(data);
        id
    }

    pub(crate) fn with_scope_mut<R>(&self, id: ScopeId, f: impl FnOnce(&mut ScopeData) -> R) -> R {
        let mut scopes = self.scopes.borrow_mut();
        let idx = id.raw() as usize;
        f(&mut scopes[idx])
    }

    pub(crate) fn scope_parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes.borrow()[id.raw() as usize].parent
    }

    pub(crate) fn scope_owner(&self, id: ScopeId) -> SymbolId {
        self.scopes.borrow()[id.raw() as usize].owner
    }

    pub(crate) fn scope_is_procedural(&self, id: ScopeId) -> bool {
        self.scopes.borrow()[id.raw() as usize].is_procedural
    }

    pub(crate) fn scope_class(&self, id: ScopeId) -> Option<SymbolId> {
        self.scopes.borrow()[id.raw() as usize].class
    }

    pub(crate) fn scope_default_lifetime(&self, id: ScopeId) -> Lifetime {
        self.scopes.borrow()[id.raw() as usize].default_lifetime
    }

    /// Walk outward from a symbol looking for an enclosing scope whose
    /// owner has the given kind.
    pub fn find_ancestor(&self, sym: SymbolId, kind: SymbolKind) -> Option<SymbolId> {
        let mut scope = self.symbol(sym).parent;
        while let Some(s) = scope {
            let owner = self.scope_owner(s);
            if self.symbol(owner).kind == kind {
                return Some(owner);
            }
            scope = self.scope_parent(s);
        }
        None
    }

    /// Members of a scope in declaration order, materializing first.
    pub fn scope_members(&self, id: ScopeId) -> Vec<SymbolId> {
        self.ensure_materialized(id);
        self.scopes.borrow()[id.raw() as usize].members.clone()
    }

    /// Find a direct member by name, materializing the scope first.
    pub fn scope_find(&self, id: ScopeId, namespace: Namespace, name: Name) -> Option<SymbolId> {
        self.ensure_materialized(id);
        self.scopes.borrow()[id.raw() as usize].find(namespace, name)
    }

    /// Test convenience: find a member of a scope-owning symbol by string.
    pub fn find_member(&self, owner: SymbolId, name: &str) -> Option<SymbolId> {
        let scope = self.symbol(owner).owned_scope()?;
        let name = self.name(name);
        self.scope_find(scope, Namespace::Members, name)
            .or_else(|| self.scope_find(scope, Namespace::Definitions, name))
    }

    /// Insert a symbol into a scope's member list and name table,
    /// assigning its declaration index. Reports duplicates.
    pub(crate) fn insert_member(&self, scope: ScopeId, namespace: Namespace, id: SymbolId) {
        let (name, span) = {
            let symbols = self.symbols.borrow();
            let sym = &symbols[id.raw() as usize];
            (sym.name, sym.span)
        };

        let (index, previous) = self.with_scope_mut(scope, |data| {
            let index = data.members.len() as u32;
            data.members.push(id);
            let previous = if name.is_empty() {
                None
            } else {
                data.names.insert((namespace, name), id)
            };
            (index, previous)
        });

        {
            let mut symbols = self.symbols.borrow_mut();
            let sym = &mut symbols[id.raw() as usize];
            sym.parent = Some(scope);
            sym.index = index;
        }

        if let Some(prev) = previous {
            let prev_span = self.symbol(prev).span;
            self.report(
                Diagnostic::error(ErrorCode::E4006)
                    .with_message(format!(
                        "duplicate definition of '{}'",
                        self.interner.resolve(name)
                    ))
                    .with_label(span, "redefined here")
                    .with_secondary_label(prev_span, "previous definition"),
            );
        }
    }

    // ---------------------------------------------------------------
    // Units and materialization
    // ---------------------------------------------------------------

    /// Add a compilation unit; its members materialize on first lookup.
    pub fn add_unit(&self, unit: CompilationUnitSyntax) -> SymbolId {
        let sym = self.add_symbol(Symbol {
            kind: SymbolKind::CompilationUnit,
            name: Name::EMPTY,
            span: Span::DUMMY,
            parent: Some(self.root_scope),
            index: 0,
            data: SymbolData::None,
        });
        let scope = self.create_scope(sym, Some(self.root_scope));
        self.with_scope_mut(scope, |data| {
            data.syntax = ScopeSyntax::Members(Rc::new(unit.members));
            data.done = false;
        });
        {
            let mut symbols = self.symbols.borrow_mut();
            symbols[sym.raw() as usize].data = SymbolData::Scope(scope);
        }
        self.with_scope_mut(self.root_scope, |data| data.members.push(sym));
        sym
    }

    /// Materialize a scope's deferred members. The done flag flips before
    /// any symbol is created; creation never performs lookups, so this
    /// cannot re-enter itself for the same scope.
    pub(crate) fn ensure_materialized(&self, scope: ScopeId) {
        let pending = {
            let mut scopes = self.scopes.borrow_mut();
            let data = &mut scopes[scope.raw() as usize];
            if data.done {
                return;
            }
            data.done = true;
            match std::mem::take(&mut data.syntax) {
                ScopeSyntax::Members(members) => Some(members),
                ScopeSyntax::None => None,
            }
        };
        if let Some(members) = pending {
            tracing::debug!(scope = scope.raw(), count = members.len(), "materializing scope");
            for member in members.iter() {
                self.materialize_member(scope, member);
            }
        }
    }

    fn materialize_member(&self, scope: ScopeId, member: &MemberSyntax) {
        match &member.kind {
            MemberSyntaxKind::Module(decl) => {
                let sym = self.add_symbol(Symbol {
                    kind: SymbolKind::Module,
                    name: decl.name,
                    span: decl.name_span,
                    parent: Some(scope),
                    index: 0,
                    data: SymbolData::None,
                });
                let inner = self.create_scope(sym, Some(scope));
                self.with_scope_mut(inner, |data| {
                    data.syntax = ScopeSyntax::Members(Rc::new(decl.members.clone()));
                    data.done = false;
                });
                self.symbols.borrow_mut()[sym.raw() as usize].data = SymbolData::Scope(inner);
                self.insert_member(scope, Namespace::Definitions, sym);
            }
            MemberSyntaxKind::Package(decl) => {
                let sym = self.add_symbol(Symbol {
                    kind: SymbolKind::Package,
                    name: decl.name,
                    span: decl.name_span,
                    parent: Some(scope),
                    index: 0,
                    data: SymbolData::None,
                });
                let inner = self.create_scope(sym, Some(scope));
                self.with_scope_mut(inner, |data| {
                    data.syntax = ScopeSyntax::Members(Rc::new(decl.members.clone()));
                    data.done = false;
                });
                self.symbols.borrow_mut()[sym.raw() as usize].data = SymbolData::Scope(inner);
                self.insert_member(scope, Namespace::Definitions, sym);
                self.packages.borrow_mut().insert(decl.name, sym);
            }
            MemberSyntaxKind::GenerateBlock(decl) => {
                let sym = self.add_symbol(Symbol {
                    kind: SymbolKind::GenerateBlock,
                    name: decl.label.unwrap_or(Name::EMPTY),
                    span: member.span,
                    parent: Some(scope),
                    index: 0,
                    data: SymbolData::None,
                });
                let inner = self.create_scope(sym, Some(scope));
                self.with_scope_mut(inner, |data| {
                    data.syntax = ScopeSyntax::Members(Rc::new(decl.members.clone()));
                    data.done = false;
                });
                self.symbols.borrow_mut()[sym.raw() as usize].data = SymbolData::Scope(inner);
                self.insert_member(scope, Namespace::Members, sym);
            }
            MemberSyntaxKind::Variable(decl) => {
                let in_class = self.symbol(self.scope_owner(scope)).kind == SymbolKind::ClassType;
                let kind = if in_class {
                    SymbolKind::ClassProperty
                } else {
                    SymbolKind::Variable
                };
                let sym = self.add_symbol(Symbol {
                    kind,
                    name: decl.name,
                    span: decl.name_span,
                    parent: Some(scope),
                    index: 0,
                    data: SymbolData::Variable(Rc::new(decl.clone())),
                });
                self.insert_member(scope, Namespace::Members, sym);
                self.create_enum_members_for(scope, sym, &decl.ty);
                self.check_var_decl(decl, false);
            }
            MemberSyntaxKind::Parameter(decl) => {
                let sym = self.add_symbol(Symbol {
                    kind: SymbolKind::Parameter,
                    name: decl.name,
                    span: decl.name_span,
                    parent: Some(scope),
                    index: 0,
                    data: SymbolData::Parameter(Rc::new(decl.clone())),
                });
                self.insert_member(scope, Namespace::Members, sym);
            }
            MemberSyntaxKind::Typedef(decl) => {
                let sym = self.add_symbol(Symbol {
                    kind: SymbolKind::TypeAlias,
                    name: decl.name,
                    span: decl.name_span,
                    parent: Some(scope),
                    index: 0,
                    data: SymbolData::TypeAlias(Rc::new(decl.clone())),
                });
                self.insert_member(scope, Namespace::Members, sym);
                self.create_enum_members_for(scope, sym, &decl.ty);
            }
            MemberSyntaxKind::Subroutine(decl) => {
                self.materialize_subroutine(scope, decl);
            }
            MemberSyntaxKind::Class(decl) => {
                let sym = self.add_symbol(Symbol {
                    kind: SymbolKind::ClassType,
                    name: decl.name,
                    span: decl.name_span,
                    parent: Some(scope),
                    index: 0,
                    data: SymbolData::None,
                });
                let inner = self.create_scope(sym, Some(scope));
                self.with_scope_mut(inner, |data| {
                    data.syntax = ScopeSyntax::Members(Rc::new(decl.members.clone()));
                    data.done = false;
                    data.class = Some(sym);
                });
                self.symbols.borrow_mut()[sym.raw() as usize].data = SymbolData::Class {
                    scope: inner,
                    syntax: Rc::new(decl.clone()),
                };
                self.insert_member(scope, Namespace::Members, sym);
            }
            MemberSyntaxKind::Constraint(decl) => {
                let sym = self.add_symbol(Symbol {
                    kind: SymbolKind::ConstraintBlock,
                    name: decl.name,
                    span: decl.name_span,
                    parent: Some(scope),
                    index: 0,
                    data: SymbolData::Constraint(Rc::new(decl.clone())),
                });
                self.insert_member(scope, Namespace::Members, sym);
            }
        }
    }

    /// Declaration-site checks shared by scope members and procedural
    /// declarations.
    pub(crate) fn check_var_decl(&self, decl: &VarDeclSyntax, procedural: bool) {
        if !procedural && decl.lifetime == Some(Lifetime::Automatic) {
            self.report(
                Diagnostic::error(ErrorCode::E4401)
                    .with_message(format!(
                        "'{}' cannot be automatic outside a procedural context",
                        self.interner.resolve(decl.name)
                    ))
                    .with_label(decl.name_span, "declared automatic here")
                    .with_note("the variable is treated as static"),
            );
        }
        if decl.is_const && decl.init.is_none() {
            self.report(
                Diagnostic::error(ErrorCode::E4402)
                    .with_message(format!(
                        "const variable '{}' requires an initializer",
                        self.interner.resolve(decl.name)
                    ))
                    .with_label(decl.name_span, "missing initializer"),
            );
        }
    }

    /// Enum members leak into the scope enclosing the declaration that
    /// introduces the enum type. Their values resolve lazily.
    pub(crate) fn create_enum_members_for(
        &self,
        scope: ScopeId,
        owner: SymbolId,
        ty: &DataTypeSyntax,
    ) {
        if let DataTypeSyntaxKind::Enum { members, .. } = &ty.kind {
            for (position, member) in members.iter().enumerate() {
                let sym = self.add_symbol(Symbol {
                    kind: SymbolKind::EnumValue,
                    name: member.name,
                    span: member.span,
                    parent: Some(scope),
                    index: 0,
                    data: SymbolData::EnumValue {
                        owner,
                        position: position as u32,
                    },
                });
                self.insert_member(scope, Namespace::Members, sym);
            }
        }
    }

    fn materialize_subroutine(
        &self,
        scope: ScopeId,
        decl: &silica_syntax::ast::SubroutineDeclSyntax,
    ) {
        let sym = self.add_symbol(Symbol {
            kind: SymbolKind::Subroutine,
            name: decl.name,
            span: decl.name_span,
            parent: Some(scope),
            index: 0,
            data: SymbolData::None,
        });
        let inner = self.create_scope(sym, Some(scope));
        let lifetime = decl.lifetime.unwrap_or(Lifetime::Static);
        self.with_scope_mut(inner, |data| {
            data.is_procedural = true;
            data.default_lifetime = lifetime;
        });

        // Formals and the implicit result variable are created eagerly so
        // the signature can resolve without re-reading syntax lists.
        for formal in &decl.formals {
            let fsym = self.add_symbol(Symbol {
                kind: SymbolKind::FormalArg,
                name: formal.name,
                span: formal.span,
                parent: Some(inner),
                index: 0,
                data: SymbolData::FormalArg(Rc::new(formal.clone())),
            });
            self.insert_member(inner, Namespace::Members, fsym);
        }
        if decl.kind == SubroutineKind::Function && decl.return_type.is_some() {
            let rsym = self.add_symbol(Symbol {
                kind: SymbolKind::Variable,
                name: decl.name,
                span: decl.name_span,
                parent: Some(inner),
                index: 0,
                data: SymbolData::None,
            });
            self.insert_member(inner, Namespace::Members, rsym);
        }

        self.symbols.borrow_mut()[sym.raw() as usize].data = SymbolData::Subroutine {
            scope: inner,
            syntax: Rc::new(decl.clone()),
        };
        self.insert_member(scope, Namespace::Members, sym);
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    pub fn lookup_package(&self, name: Name) -> Option<SymbolId> {
        // Packages materialize when any unit does; force all units first.
        let units: Vec<SymbolId> = self.scope_members(self.root_scope);
        for unit in units {
            if let Some(scope) = self.symbol(unit).owned_scope() {
                self.ensure_materialized(scope);
            }
        }
        self.packages.borrow().get(&name).copied()
    }

    /// Walk the scope chain resolving a name.
    ///
    /// In procedural scopes a symbol declared at or after the lookup
    /// location is skipped and the search continues outward; declarative
    /// scopes (modules, packages, classes) are order-insensitive.
    pub fn lookup_unqualified(
        &self,
        namespace: Namespace,
        name: Name,
        location: LookupLocation,
    ) -> Option<SymbolId> {
        let mut scope = Some(location.scope);
        let mut loc = location;
        while let Some(cur) = scope {
            if let Some(found) = self.scope_find(cur, namespace, name) {
                let visible = if self.scope_is_procedural(cur) {
                    let index = self.symbol(found).index;
                    loc.sees_index(cur, index).unwrap_or(true)
                } else {
                    true
                };
                if visible {
                    return Some(found);
                }
            }
            let parent = self.scope_parent(cur);
            if let Some(p) = parent {
                // Translate the location: everything before the owning
                // symbol's declaration is visible in the parent.
                let owner = self.scope_owner(cur);
                let owner_index = self.symbol(owner).index;
                loc = LookupLocation::before_index(p, owner_index.saturating_add(1));
            }
            scope = parent;
        }
        None
    }

    /// Whether `sym` is declared before `location`, translating the
    /// location outward until it reaches the symbol's scope.
    ///
    /// `None` when the walk never reaches that scope (the two live in
    /// unrelated compilation units); ordering does not apply there.
    pub fn is_declared_before(&self, sym: SymbolId, location: LookupLocation) -> Option<bool> {
        let target = self.symbol(sym).parent?;
        let index = self.symbol(sym).index;
        let mut loc = location;
        loop {
            if let Some(seen) = loc.sees_index(target, index) {
                return Some(seen);
            }
            let parent = self.scope_parent(loc.scope)?;
            let owner_index = self.symbol(self.scope_owner(loc.scope)).index;
            loc = LookupLocation::before_index(parent, owner_index.saturating_add(1));
        }
    }

    pub(crate) fn system_subroutine(&self, name: Name) -> Option<Rc<dyn SystemSubroutine>> {
        self.system_subs.get(&name).cloned()
    }
}

impl Default for Compilation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_syntax::ast::{ExprSyntax, ModuleDeclSyntax, ParamDeclSyntax, TypeKeyword};

    fn unit_with_module(comp: &Compilation) -> SymbolId {
        let param = ParamDeclSyntax {
            name: comp.name("P"),
            name_span: Span::DUMMY,
            ty: DataTypeSyntax::keyword(TypeKeyword::Int, Span::DUMMY),
            init: Some(ExprSyntax::int(1, Span::DUMMY)),
            is_local: false,
        };
        let module = MemberSyntax::new(
            MemberSyntaxKind::Module(ModuleDeclSyntax {
                name: comp.name("m"),
                name_span: Span::DUMMY,
                members: vec![MemberSyntax::new(
                    MemberSyntaxKind::Parameter(param),
                    Span::DUMMY,
                )],
            }),
            Span::DUMMY,
        );
        comp.add_unit(CompilationUnitSyntax {
            members: vec![module],
        })
    }

    #[test]
    fn members_materialize_on_first_lookup() {
        let comp = Compilation::new();
        let unit = unit_with_module(&comp);
        let Some(scope) = comp.symbol(unit).owned_scope() else {
            panic!("unit should own a scope");
        };
        assert!(!comp.scopes.borrow()[scope.raw() as usize].done);
        assert!(comp.find_member(unit, "m").is_some());
        assert!(comp.scopes.borrow()[scope.raw() as usize].done);
    }

    #[test]
    fn find_ancestor_walks_enclosing_scopes() {
        let comp = Compilation::new();
        let unit = unit_with_module(&comp);
        let Some(module) = comp.find_member(unit, "m") else {
            panic!("module should materialize");
        };
        let Some(param) = comp.find_member(module, "P") else {
            panic!("parameter should materialize");
        };
        assert_eq!(comp.find_ancestor(param, SymbolKind::Module), Some(module));
        assert_eq!(comp.find_ancestor(param, SymbolKind::Package), None);
    }
}

//! Scopes: name tables with lazy member materialization.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use silica_syntax::ast::{Lifetime, MemberSyntax};
use silica_syntax::Name;

use crate::symbol::{Namespace, SymbolId};

/// Handle to a scope in a [`Compilation`](crate::Compilation).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ScopeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// Deferred member syntax a scope materializes on first lookup.
#[derive(Clone, Debug, Default)]
pub enum ScopeSyntax {
    /// Nothing pending; members are inserted directly (procedural blocks).
    #[default]
    None,
    /// A member list not yet turned into symbols.
    Members(Rc<Vec<MemberSyntax>>),
}

/// A scope's name tables and member list.
///
/// `names` is keyed by namespace so definitions and ordinary members can
/// share a name. `done` flips before members are created; member creation
/// is purely syntactic, so re-entry during materialization cannot happen
/// through lookups.
#[derive(Clone, Debug)]
pub struct ScopeData {
    pub owner: SymbolId,
    /// Lexically enclosing scope.
    pub parent: Option<ScopeId>,
    pub names: FxHashMap<(Namespace, Name), SymbolId>,
    /// Members in declaration order.
    pub members: Vec<SymbolId>,
    /// Lifetime for variables declared without an explicit keyword.
    pub default_lifetime: Lifetime,
    /// Procedural scopes (subroutine bodies, statement blocks) enforce
    /// declare-before-use.
    pub is_procedural: bool,
    /// The enclosing class symbol, if any, propagated to nested scopes.
    pub class: Option<SymbolId>,
    pub syntax: ScopeSyntax,
    pub done: bool,
}

impl ScopeData {
    pub fn new(owner: SymbolId, parent: Option<ScopeId>) -> Self {
        ScopeData {
            owner,
            parent,
            names: FxHashMap::default(),
            members: Vec::new(),
            default_lifetime: Lifetime::Static,
            is_procedural: false,
            class: None,
            syntax: ScopeSyntax::None,
            done: true,
        }
    }

    /// Find a member by name in one namespace, without walking parents.
    pub fn find(&self, namespace: Namespace, name: Name) -> Option<SymbolId> {
        self.names.get(&(namespace, name)).copied()
    }
}

/// A position within a scope used to enforce declaration order.
///
/// Lookups from a procedural context skip symbols declared at or after
/// the location, falling through to outer scopes instead.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LookupLocation {
    pub scope: ScopeId,
    /// Declaration index the lookup happens before.
    pub index: u32,
}

impl LookupLocation {
    /// A location after every member of the scope.
    pub fn at_end(scope: ScopeId) -> Self {
        LookupLocation {
            scope,
            index: u32::MAX,
        }
    }

    /// A location just before the member with the given index.
    pub fn before_index(scope: ScopeId, index: u32) -> Self {
        LookupLocation { scope, index }
    }

    /// Whether a symbol at `index` in this same scope is visible from
    /// here. `None` when the symbol lives in a different scope; the
    /// caller decides based on scope kind.
    pub fn sees_index(&self, scope: ScopeId, index: u32) -> Option<bool> {
        if scope == self.scope {
            Some(index < self.index)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_ordering() {
        let scope = ScopeId::from_raw(3);
        let loc = LookupLocation::before_index(scope, 2);
        assert_eq!(loc.sees_index(scope, 1), Some(true));
        assert_eq!(loc.sees_index(scope, 2), Some(false));
        assert_eq!(loc.sees_index(ScopeId::from_raw(4), 0), None);
        assert_eq!(
            LookupLocation::at_end(scope).sees_index(scope, u32::MAX - 1),
            Some(true)
        );
    }

    #[test]
    fn namespaces_do_not_collide() {
        let mut data = ScopeData::new(SymbolId::from_raw(0), None);
        let name = Name::from_raw(7);
        data.names
            .insert((Namespace::Definitions, name), SymbolId::from_raw(1));
        data.names
            .insert((Namespace::Members, name), SymbolId::from_raw(2));
        assert_eq!(
            data.find(Namespace::Definitions, name),
            Some(SymbolId::from_raw(1))
        );
        assert_eq!(data.find(Namespace::Members, name), Some(SymbolId::from_raw(2)));
    }
}

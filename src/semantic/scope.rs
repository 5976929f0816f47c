//! Scope tree and symbol table
//!
//! Scopes live in an arena and refer to each other by [`ScopeId`]; the parent
//! link is an index, so there are no ownership cycles between parent and
//! child. Symbols live in a second arena indexed by [`SymbolId`].
//!
//! Each scope maps the *source* spelling of a name (`V_x`, `F_sum`) to its
//! entry. Variables and functions can never share a key because of their
//! prefixes; clashes between `V_x` and `F_x` are detected by the resolver.

use crate::parser::ast::{SourceLocation, Type};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
}

/// One declared name
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub original_name: String,
    pub unique_name: String,
    pub kind: SymbolKind,
    /// Declared type of a variable, or return type of a function
    pub ty: Type,
    /// Depth of the declaring scope
    pub level: usize,
    /// Position of the declaring name, used to tell duplicate declarations apart
    pub declaration: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub name: String,
    pub level: usize,
    pub symbols: FxHashMap<String, SymbolId>,
    pub children: Vec<ScopeId>,
}

#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<SymbolEntry>,
    by_unique: FxHashMap<String, SymbolId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Name of the root scope
    pub const GLOBAL_NAME: &'static str = "global";

    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                name: Self::GLOBAL_NAME.to_string(),
                level: 0,
                symbols: FxHashMap::default(),
                children: Vec::new(),
            }],
            symbols: Vec::new(),
            by_unique: FxHashMap::default(),
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a scope nested in `parent`
    pub fn add_scope(&mut self, parent: ScopeId, name: impl Into<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        let level = self.scopes[parent.0].level + 1;
        self.scopes.push(Scope {
            parent: Some(parent),
            name: name.into(),
            level,
            symbols: FxHashMap::default(),
            children: Vec::new(),
        });
        self.scopes[parent.0].children.push(id);
        id
    }

    /// Register `entry` in `scope`. The caller guarantees that the original
    /// name is not yet bound in that scope and the unique name is fresh.
    pub fn declare(&mut self, scope: ScopeId, entry: SymbolEntry) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.scopes[scope.0]
            .symbols
            .insert(entry.original_name.clone(), id);
        self.by_unique.insert(entry.unique_name.clone(), id);
        self.symbols.push(entry);
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolEntry {
        &self.symbols[id.0]
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn symbols(&self) -> &[SymbolEntry] {
        &self.symbols
    }

    /// Binding of `name` in exactly this scope
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.0].symbols.get(name).copied()
    }

    /// Nearest binding of `name`, searching outward through parent scopes
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.lookup_local(id, name) {
                return Some(symbol);
            }
            current = self.scopes[id.0].parent;
        }
        None
    }

    pub fn lookup_variable(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.lookup(scope, name)
            .filter(|id| self.symbol(*id).kind == SymbolKind::Variable)
    }

    pub fn lookup_function(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.lookup(scope, name)
            .filter(|id| self.symbol(*id).kind == SymbolKind::Function)
    }

    /// Entry carrying a given unique name (`v3`, `f1`)
    pub fn symbol_by_unique(&self, unique: &str) -> Option<&SymbolEntry> {
        self.by_unique.get(unique).map(|id| self.symbol(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str, unique: &str, level: usize) -> SymbolEntry {
        SymbolEntry {
            original_name: name.to_string(),
            unique_name: unique.to_string(),
            kind: SymbolKind::Variable,
            ty: Type::Num,
            level,
            declaration: SourceLocation::new(1, 1),
        }
    }

    #[test]
    fn test_nested_scopes_have_increasing_levels() {
        let mut tree = ScopeTree::new();
        let global = tree.global();
        let outer = tree.add_scope(global, "F_outer");
        let inner = tree.add_scope(outer, "F_inner");

        assert_eq!(tree.scope(global).level, 0);
        assert_eq!(tree.scope(inner).level, 2);
        assert_eq!(tree.scope(inner).parent, Some(outer));
        assert_eq!(tree.scope(global).children, vec![outer]);
    }

    #[test]
    fn test_nearest_declaration_wins() {
        let mut tree = ScopeTree::new();
        let global = tree.global();
        let func = tree.add_scope(global, "F_f");
        tree.declare(global, variable("V_x", "v1", 0));
        tree.declare(func, variable("V_x", "v2", 1));

        let from_func = tree.lookup_variable(func, "V_x").unwrap();
        assert_eq!(tree.symbol(from_func).unique_name, "v2");
        let from_global = tree.lookup_variable(global, "V_x").unwrap();
        assert_eq!(tree.symbol(from_global).unique_name, "v1");
        assert_eq!(tree.symbol_by_unique("v2").unwrap().level, 1);
    }

    #[test]
    fn test_lookup_filters_by_kind() {
        let mut tree = ScopeTree::new();
        let global = tree.global();
        tree.declare(global, variable("V_x", "v1", 0));

        assert!(tree.lookup_variable(global, "V_x").is_some());
        assert!(tree.lookup_function(global, "V_x").is_none());
        assert!(tree.lookup_variable(global, "V_y").is_none());
    }
}

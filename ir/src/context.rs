//! Declaration contexts, lexical scopes, and the `AstContext` that owns them together with the
//! declaration arena.

use crate::decl::{Decl, DeclId, DeclTable};
use std::ops::Index;
use tracing::trace;

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Copy, Clone)]
pub struct DeclContextId(pub u64);

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Copy, Clone)]
pub struct ScopeId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclContextKind {
    TranslationUnit,
    Function(String),
    Block,
}

#[derive(Debug)]
pub struct DeclContext {
    pub kind: DeclContextKind,
    pub parent: Option<DeclContextId>,
}

/// The semantic containers declarations live in. The first context is always the translation
/// unit.
#[derive(Debug)]
pub struct ContextTable {
    contexts: Vec<DeclContext>,
}

impl Default for ContextTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextTable {
    pub fn new() -> Self {
        Self {
            contexts: vec![DeclContext {
                kind: DeclContextKind::TranslationUnit,
                parent: None,
            }],
        }
    }

    pub fn translation_unit(&self) -> DeclContextId {
        DeclContextId(0)
    }

    pub fn add(&mut self, kind: DeclContextKind, parent: DeclContextId) -> DeclContextId {
        let id = DeclContextId(self.contexts.len() as u64);
        self.contexts.push(DeclContext {
            kind,
            parent: Some(parent),
        });
        id
    }

    pub fn add_function(&mut self, name: impl Into<String>) -> DeclContextId {
        let tu = self.translation_unit();
        self.add(DeclContextKind::Function(name.into()), tu)
    }

    pub fn get(&self, id: DeclContextId) -> Option<&DeclContext> {
        self.contexts.get(id.0 as usize)
    }

    /// Whether `outer` encloses `inner`, walking `inner`'s parent chain. A context encloses
    /// itself.
    pub fn encloses(&self, outer: DeclContextId, inner: DeclContextId) -> bool {
        let mut cur = Some(inner);
        while let Some(id) = cur {
            if id == outer {
                return true;
            }
            cur = self.get(id).and_then(|c| c.parent);
        }
        false
    }
}

impl Index<DeclContextId> for ContextTable {
    type Output = DeclContext;

    fn index(&self, index: DeclContextId) -> &DeclContext {
        self.get(index)
            .unwrap_or_else(|| panic!("could not find declaration context id: {index:?}"))
    }
}

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    // in declaration order
    pub decls: Vec<DeclId>,
}

#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

impl ScopeTable {
    pub fn add(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u64);
        self.scopes.push(Scope {
            parent,
            decls: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn declare(&mut self, scope: ScopeId, decl: DeclId) {
        self.scopes
            .get_mut(scope.0 as usize)
            .unwrap_or_else(|| panic!("could not find scope id: {scope:?}"))
            .decls
            .push(decl);
    }
}

/// Outcome of an ordinary-name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    NotFound,
    Found(DeclId),
    // more than one candidate, e.g. an overload set
    Ambiguous(Vec<DeclId>),
}

/// Owns every declaration, declaration context and scope of a translation unit.
#[derive(Debug, Default)]
pub struct AstContext {
    pub decls: DeclTable,
    pub contexts: ContextTable,
    pub scopes: ScopeTable,
}

impl AstContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `decl` to the arena and, if given, makes it visible in `scope`.
    pub fn declare(&mut self, decl: Decl, scope: Option<ScopeId>) -> DeclId {
        let id = self.decls.add(decl);
        if let Some(scope) = scope {
            self.scopes.declare(scope, id);
        }
        id
    }

    /// Ordinary-name lookup starting at `scope`. The innermost scope declaring `name` wins; every
    /// declaration of `name` in that scope is a candidate.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> LookupResult {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let Some(s) = self.scopes.get(id) else { break };
            let found: Vec<DeclId> = s
                .decls
                .iter()
                .copied()
                .filter(|d| self.decls.get(*d).is_some_and(|decl| decl.name() == name))
                .collect();
            match found.len() {
                0 => cur = s.parent,
                1 => return LookupResult::Found(found[0]),
                _ => {
                    trace!("lookup of `{name}` is ambiguous in {id:?}");
                    return LookupResult::Ambiguous(found);
                }
            }
        }
        LookupResult::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{PrimType, QualType};
    use crate::decl::VarDecl;

    fn var(name: &str, context: DeclContextId) -> Decl {
        Decl::Var(VarDecl::new(name, QualType::prim(PrimType::Int), context))
    }

    #[test]
    fn encloses_walks_parents() {
        let mut contexts = ContextTable::new();
        let tu = contexts.translation_unit();
        let f = contexts.add_function("f");
        let block = contexts.add(DeclContextKind::Block, f);
        let g = contexts.add_function("g");

        assert!(contexts.encloses(f, f));
        assert!(contexts.encloses(f, block));
        assert!(contexts.encloses(tu, block));
        assert!(!contexts.encloses(block, f));
        assert!(!contexts.encloses(g, block));
    }

    #[test]
    fn innermost_scope_wins() {
        let mut ctx = AstContext::new();
        let f = ctx.contexts.add_function("f");
        let outer = ctx.scopes.add(None);
        let inner = ctx.scopes.add(Some(outer));

        let a_outer = ctx.declare(var("a", f), Some(outer));
        let a_inner = ctx.declare(var("a", f), Some(inner));
        let b = ctx.declare(var("b", f), Some(outer));

        assert_eq!(ctx.lookup(inner, "a"), LookupResult::Found(a_inner));
        assert_eq!(ctx.lookup(outer, "a"), LookupResult::Found(a_outer));
        assert_eq!(ctx.lookup(inner, "b"), LookupResult::Found(b));
        assert_eq!(ctx.lookup(inner, "c"), LookupResult::NotFound);
    }

    #[test]
    fn several_candidates_are_ambiguous() {
        let mut ctx = AstContext::new();
        let tu = ctx.contexts.translation_unit();
        let scope = ctx.scopes.add(None);
        let first = ctx.declare(var("dup", tu), Some(scope));
        let second = ctx.declare(var("dup", tu), Some(scope));

        assert_eq!(
            ctx.lookup(scope, "dup"),
            LookupResult::Ambiguous(vec![first, second])
        );
    }

    #[test]
    fn declare_without_scope_is_invisible() {
        let mut ctx = AstContext::new();
        let tu = ctx.contexts.translation_unit();
        let scope = ctx.scopes.add(None);
        let id = ctx.declare(var("hidden", tu), None);

        assert_eq!(ctx.decls[id].name(), "hidden");
        assert_eq!(ctx.lookup(scope, "hidden"), LookupResult::NotFound);
    }
}

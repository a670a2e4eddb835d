/*
 *  The reference rebinder.
 *
 *  Walks a tree that has been moved under a new function and re-points
 *  identifier references.  A reference is only considered when the
 *  declaration it names lives inside the function being transformed;
 *  such a reference is either substituted through the substitution map
 *  or looked up again by name in the new scope.  Lookups that find
 *  nothing, or more than one candidate, leave the reference alone.
 *
 *  No nodes are created, apart from the copy of a declared type a
 *  substituted reference may be re-typed to.
 */

use crate::decl_clone::{restore_var_parts, take_var_parts};
use crate::{CloneError, DeclSubstitutionMap, SemaActions, StmtClone, guard};
use astclone_core::config::RebindConfig;
use astclone_ir::ast::{Expr, ExprKind, QualType, Stmt, StmtKind, Type};
use astclone_ir::{DeclContextId, DeclId, LookupResult, NodeMut, ScopeId};
use std::mem;
use tracing::{debug, trace};

pub struct ReferencesUpdater<'a, S: SemaActions + ?Sized> {
    sema: &'a mut S,
    scope: ScopeId,
    function: DeclContextId,
    subst: &'a DeclSubstitutionMap,
    retype_substituted: bool,
}

/// Rebinds every reference in `tree` that targets a declaration inside `target_context`, using
/// `subst` first and ordinary-name lookup in `scope` otherwise.
pub fn rebind<S: SemaActions + ?Sized>(
    tree: &mut Stmt,
    target_context: DeclContextId,
    scope: ScopeId,
    sema: &mut S,
    subst: &DeclSubstitutionMap,
) -> Result<(), CloneError> {
    ReferencesUpdater::new(sema, scope, target_context, subst).rebind_stmt(tree)
}

impl<'a, S: SemaActions + ?Sized> ReferencesUpdater<'a, S> {
    pub fn new(
        sema: &'a mut S,
        scope: ScopeId,
        function: DeclContextId,
        subst: &'a DeclSubstitutionMap,
    ) -> Self {
        Self {
            sema,
            scope,
            function,
            subst,
            retype_substituted: true,
        }
    }

    pub fn with_config(mut self, config: &RebindConfig) -> Self {
        self.retype_substituted = config.retype_substituted;
        self
    }

    pub fn rebind_stmt(&mut self, s: &mut Stmt) -> Result<(), CloneError> {
        let decls: Vec<DeclId> = match &s.kind {
            StmtKind::Decl(decls) => decls.clone(),
            StmtKind::If { cond_var, .. }
            | StmtKind::While { cond_var, .. }
            | StmtKind::For { cond_var, .. }
            | StmtKind::Switch { cond_var, .. } => cond_var.iter().copied().collect(),
            StmtKind::Catch { exception, .. } => exception.iter().copied().collect(),
            _ => Vec::new(),
        };
        for decl in decls {
            self.rebind_var(decl)?;
        }
        for child in s.children_mut() {
            match child {
                NodeMut::Stmt(s) => self.rebind_stmt(s)?,
                NodeMut::Expr(e) => self.rebind_expr(e)?,
            }
        }
        Ok(())
    }

    pub fn rebind_expr(&mut self, e: &mut Expr) -> Result<(), CloneError> {
        if matches!(e.kind, ExprKind::DeclRef { .. }) {
            self.rebind_decl_ref(e)?;
        }
        guard::repair_type(e);
        // array sizes computed at runtime may mention relocated declarations
        self.rebind_type(&mut e.ty)?;
        for t in e.written_types_mut() {
            self.rebind_type(t)?;
        }
        for child in e.children_mut() {
            match child {
                NodeMut::Stmt(s) => self.rebind_stmt(s)?,
                NodeMut::Expr(e) => self.rebind_expr(e)?,
            }
        }
        Ok(())
    }

    fn rebind_type(&mut self, t: &mut QualType) -> Result<(), CloneError> {
        let Some(typ) = t.typ.as_deref_mut() else {
            return Ok(());
        };
        match typ {
            Type::VariableArray { elem, size, .. } => {
                self.rebind_expr(size)?;
                self.rebind_type(elem)
            }
            Type::Pointer(inner)
            | Type::LValueReference(inner)
            | Type::RValueReference(inner)
            | Type::ConstantArray { elem: inner, .. }
            | Type::IncompleteArray { elem: inner } => self.rebind_type(inner),
            Type::Function(f) => {
                self.rebind_type(&mut f.ret)?;
                for p in &mut f.params {
                    self.rebind_type(p)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Visits the declared type and initializer of a variable introduced inside the tree.
    fn rebind_var(&mut self, decl: DeclId) -> Result<(), CloneError> {
        let (mut ty, mut init) = take_var_parts(&mut *self.sema, decl);
        let result = self.rebind_type(&mut ty).and_then(|()| match init.as_deref_mut() {
            Some(init) => self.rebind_expr(init),
            None => Ok(()),
        });
        restore_var_parts(&mut *self.sema, decl, ty, init);
        result
    }

    fn rebind_decl_ref(&mut self, e: &mut Expr) -> Result<(), CloneError> {
        let ExprKind::DeclRef { decl, name, .. } = &mut e.kind else {
            return Ok(());
        };
        let ast = self.sema.ast();
        let Some(target) = ast.decls.get(*decl) else {
            trace!("reference to `{name}` names unknown declaration {decl:?}");
            return Ok(());
        };
        if !ast.contexts.encloses(self.function, target.context()) {
            trace!("`{name}` is declared outside the function; leaving it");
            return Ok(());
        }

        if let Some(replacement) = self.subst.get(*decl) {
            debug!("substituting {decl:?} -> {replacement:?} for `{name}`");
            *decl = replacement;
            if let Some(d) = self.sema.ast().decls.get(replacement) {
                *name = d.name().to_string();
            }
            self.sema.mark_used(replacement);
            if self.retype_substituted {
                self.retype(e, replacement)?;
            }
            return Ok(());
        }

        match self.sema.lookup_ordinary_name(self.scope, name) {
            LookupResult::Found(found)
                if self.sema.ast().decls.get(found).is_some_and(|d| d.is_value()) =>
            {
                trace!("rebinding `{name}` from {decl:?} to {found:?}");
                *decl = found;
                self.sema.mark_used(found);
            }
            LookupResult::Found(_) => trace!("`{name}` does not name a value; leaving it"),
            LookupResult::NotFound => trace!("`{name}` not found in {:?}", self.scope),
            LookupResult::Ambiguous(candidates) => {
                trace!(
                    "`{name}` is ambiguous ({} candidates); leaving it",
                    candidates.len()
                )
            }
        }
        Ok(())
    }

    /// Gives a substituted reference the (non-reference) type of its new declaration when the
    /// two differ.
    fn retype(&mut self, e: &mut Expr, decl: DeclId) -> Result<(), CloneError> {
        let Some(target) = self.sema.ast_mut().decls.get_mut(decl) else {
            return Err(CloneError::UnknownDecl(decl));
        };
        // unset while the declaration itself is being visited
        if target.ty().is_null() || target.ty().non_reference() == &e.ty {
            return Ok(());
        }
        let declared = mem::replace(target.ty_mut(), QualType::null());
        let mut scratch = DeclSubstitutionMap::new();
        let result =
            StmtClone::new(&mut *self.sema, &mut scratch).clone_type(declared.non_reference());
        if let Some(target) = self.sema.ast_mut().decls.get_mut(decl) {
            *target.ty_mut() = declared;
        }
        e.ty = result?;
        Ok(())
    }
}

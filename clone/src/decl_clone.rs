//! Cloning local variable declarations.

use crate::{CloneError, SemaActions, StmtClone};
use astclone_ir::DeclId;
use astclone_ir::ast::{Expr, QualType};
use astclone_ir::decl::{Decl, InitStyle, VarDecl};
use std::mem;
use tracing::trace;

impl<S: SemaActions + ?Sized> StmtClone<'_, S> {
    /// Clones the variable `original` into its own declaration context and registers the copy
    /// with the semantic-action service. The original-to-clone pair is recorded before the
    /// initializer is cloned, so an initializer mentioning the variable itself refers to the
    /// copy.
    pub(crate) fn decl(&mut self, original: DeclId) -> Result<DeclId, CloneError> {
        let var = match self.sema.ast().decls.get(original) {
            None => return Err(CloneError::UnknownDecl(original)),
            Some(Decl::Var(var)) => var,
            Some(other) => {
                return Err(CloneError::UnsupportedDecl {
                    kind: other.kind_name(),
                    name: other.name().to_string(),
                });
            }
        };
        if self.subst.contains(original) {
            return Err(CloneError::AlreadyCloned(original));
        }
        let clone = VarDecl {
            name: var.name.clone(),
            ty: QualType::null(),
            storage: var.storage,
            tls: var.tls,
            init: None,
            init_style: var.init_style,
            context: var.context,
            loc: var.loc,
            referenced: false,
            used: false,
        };

        // lifted out of the arena while cloning; restored on every path
        let (ty, init) = take_var_parts(&mut *self.sema, original);
        let result = self.adopt(original, clone, &ty, init.as_deref());
        restore_var_parts(&mut *self.sema, original, ty, init);
        result
    }

    fn adopt(
        &mut self,
        original: DeclId,
        mut clone: VarDecl,
        ty: &QualType,
        init: Option<&Expr>,
    ) -> Result<DeclId, CloneError> {
        clone.ty = self.ty(ty)?;
        let style: InitStyle = clone.init_style;
        let id = self.sema.register_var_decl(clone);
        self.subst.record(original, id)?;
        if let Some(init) = init {
            let init = self.expr(init)?;
            self.sema.add_initializer(id, Box::new(init), style);
        }
        trace!("cloned declaration {original:?} as {id:?}");
        Ok(id)
    }
}

/// Moves the declared type and initializer out of a variable, leaving an unset type and no
/// initializer behind. Non-variables yield an unset type.
pub(crate) fn take_var_parts<S: SemaActions + ?Sized>(
    sema: &mut S,
    id: DeclId,
) -> (QualType, Option<Box<Expr>>) {
    match sema.ast_mut().decls.get_mut(id).and_then(Decl::as_var_mut) {
        Some(var) => (mem::replace(&mut var.ty, QualType::null()), var.init.take()),
        None => (QualType::null(), None),
    }
}

pub(crate) fn restore_var_parts<S: SemaActions + ?Sized>(
    sema: &mut S,
    id: DeclId,
    ty: QualType,
    init: Option<Box<Expr>>,
) {
    if let Some(var) = sema.ast_mut().decls.get_mut(id).and_then(Decl::as_var_mut) {
        var.ty = ty;
        var.init = init;
    }
}

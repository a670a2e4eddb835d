//! Fallbacks for the two node kinds whose payload or type some front-end versions leave unset:
//! predefined identifiers (`__func__` and friends) and source-location builtins
//! (`__builtin_FILE()` and friends).
//!
//! Every clone of either kind passes through here, and the rebinder repairs their types with
//! [`repair_type`], so an unset payload or type never leaves this module.

use crate::{CloneError, SemaActions, StmtClone};
use astclone_ir::ast::{Expr, ExprKind, PredefinedIdent, QualType, SourceLocIdent};
use tracing::warn;

/// The type a guarded node gets when its own type is unset, or None for unguarded kinds.
pub fn fallback_type(kind: &ExprKind) -> Option<QualType> {
    match kind {
        ExprKind::Predefined { .. } => Some(QualType::const_char_ptr()),
        ExprKind::SourceLoc { .. } => Some(QualType::const_char()),
        _ => None,
    }
}

/// Gives a guarded node with an unset type its fallback type. Returns whether a repair was made.
pub fn repair_type(e: &mut Expr) -> bool {
    if !e.ty.is_null() {
        return false;
    }
    let Some(ty) = fallback_type(&e.kind) else {
        return false;
    };
    warn!(
        "{} at {:?} has no type; using the fallback",
        e.kind_name(),
        e.range.begin
    );
    e.ty = ty;
    true
}

impl<S: SemaActions + ?Sized> StmtClone<'_, S> {
    pub(crate) fn clone_predefined(
        &mut self,
        e: &Expr,
        ident: PredefinedIdent,
        function_name: Option<&Expr>,
    ) -> Result<Expr, CloneError> {
        let function_name = match function_name {
            Some(name) => self.expr(name)?,
            None => {
                warn!(
                    "PredefinedExpr {ident:?} at {:?} has no function name; using \"\"",
                    e.range.begin
                );
                Expr::string("", e.range.begin)
            }
        };
        self.guarded(
            e,
            ExprKind::Predefined {
                ident,
                function_name: Some(Box::new(function_name)),
            },
        )
    }

    pub(crate) fn clone_source_loc(
        &mut self,
        e: &Expr,
        ident: SourceLocIdent,
        value: Option<&Expr>,
    ) -> Result<Expr, CloneError> {
        let value = match value {
            Some(value) => self.expr(value)?,
            None => {
                warn!(
                    "SourceLocExpr {ident:?} at {:?} has no value; using \"\"",
                    e.range.begin
                );
                Expr::string("", e.range.begin)
            }
        };
        self.guarded(
            e,
            ExprKind::SourceLoc {
                ident,
                value: Some(Box::new(value)),
            },
        )
    }

    fn guarded(&mut self, e: &Expr, kind: ExprKind) -> Result<Expr, CloneError> {
        let mut cloned = Expr {
            kind,
            ty: self.ty(&e.ty)?,
            value_kind: e.value_kind,
            object_kind: e.object_kind,
            range: e.range,
        };
        repair_type(&mut cloned);
        Ok(cloned)
    }
}

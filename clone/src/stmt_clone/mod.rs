/*
 *  The node cloner.
 *
 *  `StmtClone` produces a tree that shares no node with its source.
 *  Every kind in the closed node set has a rule here; children are
 *  cloned before the node that owns them is rebuilt, and every
 *  expression's type goes through the type adapter.  Declarations met
 *  on the way are handed to the declaration cloner (`decl_clone`), and
 *  the two version-sensitive kinds go through `guard`.
 *
 *  Cloning never looks names up and never mutates the source tree.
 */

#[cfg(test)]
mod tests;

use crate::{CloneError, DeclSubstitutionMap, SemaActions};
use astclone_core::config::CloneConfig;
use astclone_ir::DeclId;
use astclone_ir::ast::*;
use tracing::{debug, error};

pub struct StmtClone<'a, S: SemaActions + ?Sized> {
    pub(crate) sema: &'a mut S,
    pub(crate) subst: &'a mut DeclSubstitutionMap,
    remap_references: bool,
}

impl<'a, S: SemaActions + ?Sized> StmtClone<'a, S> {
    pub fn new(sema: &'a mut S, subst: &'a mut DeclSubstitutionMap) -> Self {
        Self {
            sema,
            subst,
            remap_references: true,
        }
    }

    pub fn with_config(mut self, config: &CloneConfig) -> Self {
        self.remap_references = config.remap_references;
        self
    }

    /// Clones a statement tree. On error nothing is returned and the substitution map may hold
    /// entries for declarations cloned before the failure.
    pub fn clone_stmt(&mut self, s: &Stmt) -> Result<Stmt, CloneError> {
        let before = self.subst.len();
        let cloned = self.stmt(s).inspect_err(|e| error!("clone aborted: {e}"))?;
        debug!(
            "cloned {} ({} declarations recorded)",
            s.kind_name(),
            self.subst.len() - before
        );
        Ok(cloned)
    }

    pub fn clone_expr(&mut self, e: &Expr) -> Result<Expr, CloneError> {
        let before = self.subst.len();
        let cloned = self.expr(e).inspect_err(|e| error!("clone aborted: {e}"))?;
        debug!(
            "cloned {} ({} declarations recorded)",
            e.kind_name(),
            self.subst.len() - before
        );
        Ok(cloned)
    }

    pub fn clone_type(&mut self, t: &QualType) -> Result<QualType, CloneError> {
        self.ty(t).inspect_err(|e| error!("clone aborted: {e}"))
    }

    pub fn clone_decl(&mut self, d: DeclId) -> Result<DeclId, CloneError> {
        self.decl(d).inspect_err(|e| error!("clone aborted: {e}"))
    }

    pub fn clone_decl_or_null(&mut self, d: Option<DeclId>) -> Result<Option<DeclId>, CloneError> {
        d.map(|d| self.clone_decl(d)).transpose()
    }

    pub(crate) fn stmt(&mut self, s: &Stmt) -> Result<Stmt, CloneError> {
        let kind = match &s.kind {
            StmtKind::Compound(body) => StmtKind::Compound(self.stmts(body)?),
            StmtKind::Null => StmtKind::Null,
            StmtKind::Expr(e) => StmtKind::Expr(self.boxed(e)?),
            StmtKind::Decl(decls) => StmtKind::Decl(
                decls
                    .iter()
                    .map(|d| self.decl(*d))
                    .collect::<Result<Vec<_>, CloneError>>()?,
            ),
            StmtKind::If {
                init,
                cond_var,
                cond,
                then,
                els,
                is_constexpr,
            } => StmtKind::If {
                init: self.opt_stmt(init)?,
                cond_var: self.opt_decl(*cond_var)?,
                cond: self.boxed(cond)?,
                then: self.boxed_stmt(then)?,
                els: self.opt_stmt(els)?,
                is_constexpr: *is_constexpr,
            },
            StmtKind::While {
                cond_var,
                cond,
                body,
            } => StmtKind::While {
                cond_var: self.opt_decl(*cond_var)?,
                cond: self.boxed(cond)?,
                body: self.boxed_stmt(body)?,
            },
            StmtKind::Do { body, cond } => StmtKind::Do {
                body: self.boxed_stmt(body)?,
                cond: self.boxed(cond)?,
            },
            StmtKind::For {
                init,
                cond,
                cond_var,
                inc,
                body,
            } => {
                let init = self.opt_stmt(init)?;
                let cond_var = self.opt_decl(*cond_var)?;
                StmtKind::For {
                    init,
                    cond: self.opt(cond)?,
                    cond_var,
                    inc: self.opt(inc)?,
                    body: self.boxed_stmt(body)?,
                }
            }
            StmtKind::Switch {
                init,
                cond_var,
                cond,
                body,
            } => StmtKind::Switch {
                init: self.opt_stmt(init)?,
                cond_var: self.opt_decl(*cond_var)?,
                cond: self.boxed(cond)?,
                body: self.boxed_stmt(body)?,
            },
            StmtKind::Case { lhs, rhs, sub } => StmtKind::Case {
                lhs: self.boxed(lhs)?,
                rhs: self.opt(rhs)?,
                sub: self.boxed_stmt(sub)?,
            },
            StmtKind::Default { sub } => StmtKind::Default {
                sub: self.boxed_stmt(sub)?,
            },
            StmtKind::Break => StmtKind::Break,
            StmtKind::Continue => StmtKind::Continue,
            StmtKind::Return(value) => StmtKind::Return(self.opt(value)?),
            // labels are not cloned; the copy jumps to the same label declaration
            StmtKind::Goto { label } => StmtKind::Goto { label: *label },
            StmtKind::Label { label, sub } => StmtKind::Label {
                label: *label,
                sub: self.boxed_stmt(sub)?,
            },
            StmtKind::Try { block, handlers } => StmtKind::Try {
                block: self.boxed_stmt(block)?,
                handlers: self.stmts(handlers)?,
            },
            StmtKind::Catch { exception, handler } => StmtKind::Catch {
                exception: self.opt_decl(*exception)?,
                handler: self.boxed_stmt(handler)?,
            },
            StmtKind::Other { kind } => {
                return Err(CloneError::UnsupportedStmt { kind: kind.clone() });
            }
        };
        Ok(Stmt {
            kind,
            range: s.range,
        })
    }

    pub(crate) fn expr(&mut self, e: &Expr) -> Result<Expr, CloneError> {
        let kind = match &e.kind {
            ExprKind::Predefined {
                ident,
                function_name,
            } => return self.clone_predefined(e, *ident, function_name.as_deref()),
            ExprKind::SourceLoc { ident, value } => {
                return self.clone_source_loc(e, *ident, value.as_deref());
            }

            ExprKind::Binary { op, lhs, rhs, fp } => ExprKind::Binary {
                op: *op,
                lhs: self.boxed(lhs)?,
                rhs: self.boxed(rhs)?,
                fp: *fp,
            },
            ExprKind::CompoundAssign {
                op,
                lhs,
                rhs,
                computation_lhs_ty,
                computation_result_ty,
                fp,
            } => ExprKind::CompoundAssign {
                op: *op,
                lhs: self.boxed(lhs)?,
                rhs: self.boxed(rhs)?,
                computation_lhs_ty: self.ty(computation_lhs_ty)?,
                computation_result_ty: self.ty(computation_result_ty)?,
                fp: *fp,
            },
            ExprKind::Unary {
                op,
                sub,
                can_overflow,
            } => ExprKind::Unary {
                op: *op,
                sub: self.boxed(sub)?,
                can_overflow: *can_overflow,
            },

            ExprKind::DeclRef {
                decl,
                name,
                refers_to_enclosing,
                non_odr_use,
            } => {
                let (decl, name) = self.remap(*decl, name);
                ExprKind::DeclRef {
                    decl,
                    name,
                    refers_to_enclosing: *refers_to_enclosing,
                    non_odr_use: *non_odr_use,
                }
            }

            ExprKind::IntegerLiteral { value } => ExprKind::IntegerLiteral { value: *value },
            ExprKind::FloatingLiteral {
                value,
                exact,
                semantics,
            } => ExprKind::FloatingLiteral {
                value: *value,
                exact: *exact,
                semantics: *semantics,
            },
            ExprKind::CharacterLiteral { value, kind } => ExprKind::CharacterLiteral {
                value: *value,
                kind: *kind,
            },
            ExprKind::StringLiteral(lit) => ExprKind::StringLiteral(StringLiteral {
                bytes: lit.bytes.clone(),
                kind: lit.kind,
                pascal: lit.pascal,
                token_locs: lit.token_locs.clone(),
            }),
            ExprKind::ImaginaryLiteral { sub } => ExprKind::ImaginaryLiteral {
                sub: self.boxed(sub)?,
            },
            ExprKind::BoolLiteral(b) => ExprKind::BoolLiteral(*b),
            ExprKind::NullPtrLiteral => ExprKind::NullPtrLiteral,
            ExprKind::GnuNull => ExprKind::GnuNull,

            ExprKind::Paren { sub } => ExprKind::Paren {
                sub: self.boxed(sub)?,
            },
            ExprKind::ArraySubscript { base, index } => ExprKind::ArraySubscript {
                base: self.boxed(base)?,
                index: self.boxed(index)?,
            },
            ExprKind::Member {
                base,
                is_arrow,
                member,
                name,
            } => ExprKind::Member {
                base: self.boxed(base)?,
                is_arrow: *is_arrow,
                member: *member,
                name: name.clone(),
            },

            ExprKind::Call { callee, args } => ExprKind::Call {
                callee: self.boxed(callee)?,
                args: self.exprs(args)?,
            },
            ExprKind::CudaKernelCall {
                callee,
                config,
                args,
            } => ExprKind::CudaKernelCall {
                callee: self.boxed(callee)?,
                config: self.boxed(config)?,
                args: self.exprs(args)?,
            },
            ExprKind::OperatorCall {
                op,
                callee,
                args,
                fp,
            } => ExprKind::OperatorCall {
                op: *op,
                callee: self.boxed(callee)?,
                args: self.exprs(args)?,
                fp: *fp,
            },
            ExprKind::MemberCall { callee, args } => ExprKind::MemberCall {
                callee: self.boxed(callee)?,
                args: self.exprs(args)?,
            },

            ExprKind::ImplicitCast { cast, sub } => ExprKind::ImplicitCast {
                cast: *cast,
                sub: self.boxed(sub)?,
            },
            ExprKind::CStyleCast { cast, sub, written } => ExprKind::CStyleCast {
                cast: *cast,
                sub: self.boxed(sub)?,
                written: self.ty(written)?,
            },
            ExprKind::NamedCast {
                which,
                cast,
                sub,
                written,
            } => ExprKind::NamedCast {
                which: *which,
                cast: *cast,
                sub: self.boxed(sub)?,
                written: self.ty(written)?,
            },
            ExprKind::FunctionalCast { cast, sub, written } => ExprKind::FunctionalCast {
                cast: *cast,
                sub: self.boxed(sub)?,
                written: self.ty(written)?,
            },

            ExprKind::Construct {
                ctor,
                args,
                flags,
                kind,
            } => ExprKind::Construct {
                ctor: *ctor,
                args: self.exprs(args)?,
                flags: *flags,
                kind: *kind,
            },
            ExprKind::TemporaryObject {
                ctor,
                args,
                flags,
                written,
            } => ExprKind::TemporaryObject {
                ctor: *ctor,
                args: self.exprs(args)?,
                flags: *flags,
                written: self.ty(written)?,
            },
            ExprKind::DefaultArg { param } => ExprKind::DefaultArg { param: *param },
            ExprKind::ExprWithCleanups { sub, side_effects } => ExprKind::ExprWithCleanups {
                sub: self.boxed(sub)?,
                side_effects: *side_effects,
            },
            ExprKind::Constant { sub } => ExprKind::Constant {
                sub: self.boxed(sub)?,
            },
            ExprKind::MaterializeTemporary {
                sub,
                bound_to_lvalue_ref,
            } => ExprKind::MaterializeTemporary {
                sub: self.opt(sub)?,
                bound_to_lvalue_ref: *bound_to_lvalue_ref,
            },

            ExprKind::Conditional { cond, then, els } => ExprKind::Conditional {
                cond: self.boxed(cond)?,
                then: self.boxed(then)?,
                els: self.boxed(els)?,
            },
            ExprKind::AddrLabel { label } => ExprKind::AddrLabel { label: *label },
            ExprKind::StmtExpr {
                sub,
                template_depth,
            } => ExprKind::StmtExpr {
                sub: self.boxed_stmt(sub)?,
                template_depth: *template_depth,
            },
            ExprKind::Choose {
                cond,
                lhs,
                rhs,
                cond_true,
            } => ExprKind::Choose {
                cond: self.boxed(cond)?,
                lhs: self.boxed(lhs)?,
                rhs: self.boxed(rhs)?,
                cond_true: *cond_true,
            },
            ExprKind::VaArg {
                sub,
                written,
                ms_abi,
            } => ExprKind::VaArg {
                sub: self.boxed(sub)?,
                written: self.ty(written)?,
                ms_abi: *ms_abi,
            },
            ExprKind::ImplicitValueInit => ExprKind::ImplicitValueInit,
            ExprKind::ScalarValueInit => ExprKind::ScalarValueInit,
            ExprKind::ExtVectorElement { base, accessor } => ExprKind::ExtVectorElement {
                base: self.boxed(base)?,
                accessor: accessor.clone(),
            },
            ExprKind::This { implicit } => ExprKind::This {
                implicit: *implicit,
            },
            ExprKind::Throw {
                sub,
                thrown_var_in_scope,
            } => ExprKind::Throw {
                sub: self.opt(sub)?,
                thrown_var_in_scope: *thrown_var_in_scope,
            },
            ExprKind::SubstNonTypeTemplateParm {
                replacement,
                index,
                pack_index,
                ref_param,
            } => ExprKind::SubstNonTypeTemplateParm {
                replacement: self.boxed(replacement)?,
                index: *index,
                pack_index: *pack_index,
                ref_param: *ref_param,
            },
            ExprKind::PseudoObject {
                syntactic,
                semantics,
                result_index,
            } => ExprKind::PseudoObject {
                syntactic: self.boxed(syntactic)?,
                semantics: self.exprs(semantics)?,
                result_index: *result_index,
            },

            ExprKind::InitList { inits, union_field } => ExprKind::InitList {
                inits: self.exprs(inits)?,
                union_field: *union_field,
            },
            ExprKind::DesignatedInit {
                designators,
                index_exprs,
                init,
                gnu_syntax,
            } => ExprKind::DesignatedInit {
                designators: designators.clone(),
                index_exprs: self.exprs(index_exprs)?,
                init: self.boxed(init)?,
                gnu_syntax: *gnu_syntax,
            },
            ExprKind::UnaryExprOrTypeTrait { trait_kind, arg } => {
                ExprKind::UnaryExprOrTypeTrait {
                    trait_kind: *trait_kind,
                    arg: match arg {
                        TraitArg::Type(t) => TraitArg::Type(self.ty(t)?),
                        TraitArg::Expr(e) => TraitArg::Expr(self.boxed(e)?),
                    },
                }
            }
            ExprKind::UnresolvedLookup {
                name,
                requires_adl,
                decls,
            } => ExprKind::UnresolvedLookup {
                name: name.clone(),
                requires_adl: *requires_adl,
                decls: decls.clone(),
            },
            ExprKind::ShuffleVector { exprs } => ExprKind::ShuffleVector {
                exprs: self.exprs(exprs)?,
            },

            ExprKind::Other { kind } => {
                return Err(CloneError::UnsupportedExpr { kind: kind.clone() });
            }
        };
        Ok(Expr {
            kind,
            ty: self.ty(&e.ty)?,
            value_kind: e.value_kind,
            object_kind: e.object_kind,
            range: e.range,
        })
    }

    /// The declaration a cloned reference should point at, and its name.
    fn remap(&self, decl: DeclId, name: &str) -> (DeclId, String) {
        if !self.remap_references {
            return (decl, name.to_string());
        }
        match self.subst.get(decl) {
            Some(to) => {
                let name = self
                    .sema
                    .ast()
                    .decls
                    .get(to)
                    .map_or(name, |d| d.name())
                    .to_string();
                (to, name)
            }
            None => (decl, name.to_string()),
        }
    }

    fn boxed(&mut self, e: &Expr) -> Result<Box<Expr>, CloneError> {
        self.expr(e).map(Box::new)
    }

    fn opt(&mut self, e: &Option<Box<Expr>>) -> Result<Option<Box<Expr>>, CloneError> {
        e.as_deref().map(|e| self.boxed(e)).transpose()
    }

    fn exprs(&mut self, es: &[Expr]) -> Result<Vec<Expr>, CloneError> {
        es.iter().map(|e| self.expr(e)).collect()
    }

    fn boxed_stmt(&mut self, s: &Stmt) -> Result<Box<Stmt>, CloneError> {
        self.stmt(s).map(Box::new)
    }

    fn opt_stmt(&mut self, s: &Option<Box<Stmt>>) -> Result<Option<Box<Stmt>>, CloneError> {
        s.as_deref().map(|s| self.boxed_stmt(s)).transpose()
    }

    fn stmts(&mut self, ss: &[Stmt]) -> Result<Vec<Stmt>, CloneError> {
        ss.iter().map(|s| self.stmt(s)).collect()
    }

    fn opt_decl(&mut self, d: Option<DeclId>) -> Result<Option<DeclId>, CloneError> {
        d.map(|d| self.decl(d)).transpose()
    }
}

/*
 *  Support functions for the node data structures:
 *  - builders used by the importer, the cloning engine and tests
 *  - uniform child iteration (shared and mutable)
 *  - kind names and the shape summary of a tree
 */

use super::*;

/// A shared reference to either kind of node.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

/// A mutable reference to either kind of node.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Stmt(&'a mut Stmt),
    Expr(&'a mut Expr),
}

impl<'a> NodeRef<'a> {
    pub fn kind_name(self) -> &'static str {
        match self {
            NodeRef::Stmt(s) => s.kind_name(),
            NodeRef::Expr(e) => e.kind_name(),
        }
    }

    pub fn children(self) -> Vec<NodeRef<'a>> {
        match self {
            NodeRef::Stmt(s) => s.children(),
            NodeRef::Expr(e) => e.children(),
        }
    }
}

/*
 *
 *  Builders
 *
 */

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            range: SourceRange::default(),
        }
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    pub fn compound(body: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Compound(body))
    }

    pub fn expr(e: Expr) -> Self {
        Self::new(StmtKind::Expr(Box::new(e)))
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Return(value.map(Box::new)))
    }

    pub fn decl(decls: Vec<crate::decl::DeclId>) -> Self {
        Self::new(StmtKind::Decl(decls))
    }
}

impl Expr {
    pub fn new(kind: ExprKind, ty: QualType, value_kind: ValueKind) -> Self {
        Self {
            kind,
            ty,
            value_kind,
            object_kind: ObjectKind::Ordinary,
            range: SourceRange::default(),
        }
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    /// An `int` literal.
    pub fn int(value: u64) -> Self {
        Self::new(
            ExprKind::IntegerLiteral { value },
            QualType::prim(PrimType::Int),
            ValueKind::PRValue,
        )
    }

    /// A `double` literal.
    pub fn float(value: f64) -> Self {
        Self::new(
            ExprKind::FloatingLiteral {
                value,
                exact: true,
                semantics: FloatSemantics::IeeeDouble,
            },
            QualType::prim(PrimType::Double),
            ValueKind::PRValue,
        )
    }

    /// An ordinary narrow string literal spelled at `loc`.
    pub fn string(text: &str, loc: SourceLoc) -> Self {
        Self::new(
            ExprKind::StringLiteral(StringLiteral {
                bytes: text.as_bytes().to_vec(),
                kind: StringKind::Ordinary,
                pascal: false,
                token_locs: vec![loc],
            }),
            QualType::string_literal(text.len()),
            ValueKind::LValue,
        )
        .with_range(SourceRange::at(loc))
    }

    pub fn decl_ref(decl: crate::decl::DeclId, name: impl Into<String>, ty: QualType) -> Self {
        Self::new(
            ExprKind::DeclRef {
                decl,
                name: name.into(),
                refers_to_enclosing: false,
                non_odr_use: false,
            },
            ty,
            ValueKind::LValue,
        )
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr, ty: QualType) -> Self {
        let value_kind = match op {
            BinOp::Assign => ValueKind::LValue,
            _ => ValueKind::PRValue,
        };
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                fp: FpOptions::default(),
            },
            ty,
            value_kind,
        )
    }

    pub fn implicit_cast(cast: CastKind, sub: Expr, ty: QualType) -> Self {
        Self::new(
            ExprKind::ImplicitCast {
                cast,
                sub: Box::new(sub),
            },
            ty,
            ValueKind::PRValue,
        )
    }

    pub fn call(callee: Expr, args: Vec<Expr>, ty: QualType) -> Self {
        Self::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            ty,
            ValueKind::PRValue,
        )
    }

    /// `(sub)`; `ty` must be a copy of `sub`'s type.
    pub fn paren(sub: Expr, ty: QualType) -> Self {
        let value_kind = sub.value_kind;
        Self::new(ExprKind::Paren { sub: Box::new(sub) }, ty, value_kind)
    }
}

/*
 *
 *  Kind names
 *
 */

impl Stmt {
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            StmtKind::Compound(_) => "CompoundStmt",
            StmtKind::Null => "NullStmt",
            StmtKind::Expr(_) => "ExprStmt",
            StmtKind::Decl(_) => "DeclStmt",
            StmtKind::If { .. } => "IfStmt",
            StmtKind::While { .. } => "WhileStmt",
            StmtKind::Do { .. } => "DoStmt",
            StmtKind::For { .. } => "ForStmt",
            StmtKind::Switch { .. } => "SwitchStmt",
            StmtKind::Case { .. } => "CaseStmt",
            StmtKind::Default { .. } => "DefaultStmt",
            StmtKind::Break => "BreakStmt",
            StmtKind::Continue => "ContinueStmt",
            StmtKind::Return(_) => "ReturnStmt",
            StmtKind::Goto { .. } => "GotoStmt",
            StmtKind::Label { .. } => "LabelStmt",
            StmtKind::Try { .. } => "CXXTryStmt",
            StmtKind::Catch { .. } => "CXXCatchStmt",
            StmtKind::Other { .. } => "Other",
        }
    }
}

impl Expr {
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Binary { .. } => "BinaryOperator",
            ExprKind::CompoundAssign { .. } => "CompoundAssignOperator",
            ExprKind::Unary { .. } => "UnaryOperator",
            ExprKind::DeclRef { .. } => "DeclRefExpr",
            ExprKind::IntegerLiteral { .. } => "IntegerLiteral",
            ExprKind::FloatingLiteral { .. } => "FloatingLiteral",
            ExprKind::CharacterLiteral { .. } => "CharacterLiteral",
            ExprKind::StringLiteral(_) => "StringLiteral",
            ExprKind::ImaginaryLiteral { .. } => "ImaginaryLiteral",
            ExprKind::BoolLiteral(_) => "CXXBoolLiteralExpr",
            ExprKind::NullPtrLiteral => "CXXNullPtrLiteralExpr",
            ExprKind::GnuNull => "GNUNullExpr",
            ExprKind::Predefined { .. } => "PredefinedExpr",
            ExprKind::SourceLoc { .. } => "SourceLocExpr",
            ExprKind::Paren { .. } => "ParenExpr",
            ExprKind::ArraySubscript { .. } => "ArraySubscriptExpr",
            ExprKind::Member { .. } => "MemberExpr",
            ExprKind::Call { .. } => "CallExpr",
            ExprKind::CudaKernelCall { .. } => "CUDAKernelCallExpr",
            ExprKind::OperatorCall { .. } => "CXXOperatorCallExpr",
            ExprKind::MemberCall { .. } => "CXXMemberCallExpr",
            ExprKind::ImplicitCast { .. } => "ImplicitCastExpr",
            ExprKind::CStyleCast { .. } => "CStyleCastExpr",
            ExprKind::NamedCast { which, .. } => match which {
                NamedCastKind::Static => "CXXStaticCastExpr",
                NamedCastKind::Dynamic => "CXXDynamicCastExpr",
                NamedCastKind::Reinterpret => "CXXReinterpretCastExpr",
                NamedCastKind::Const => "CXXConstCastExpr",
            },
            ExprKind::FunctionalCast { .. } => "CXXFunctionalCastExpr",
            ExprKind::Construct { .. } => "CXXConstructExpr",
            ExprKind::TemporaryObject { .. } => "CXXTemporaryObjectExpr",
            ExprKind::DefaultArg { .. } => "CXXDefaultArgExpr",
            ExprKind::ExprWithCleanups { .. } => "ExprWithCleanups",
            ExprKind::Constant { .. } => "ConstantExpr",
            ExprKind::MaterializeTemporary { .. } => "MaterializeTemporaryExpr",
            ExprKind::Conditional { .. } => "ConditionalOperator",
            ExprKind::AddrLabel { .. } => "AddrLabelExpr",
            ExprKind::StmtExpr { .. } => "StmtExpr",
            ExprKind::Choose { .. } => "ChooseExpr",
            ExprKind::VaArg { .. } => "VAArgExpr",
            ExprKind::ImplicitValueInit => "ImplicitValueInitExpr",
            ExprKind::ScalarValueInit => "CXXScalarValueInitExpr",
            ExprKind::ExtVectorElement { .. } => "ExtVectorElementExpr",
            ExprKind::This { .. } => "CXXThisExpr",
            ExprKind::Throw { .. } => "CXXThrowExpr",
            ExprKind::SubstNonTypeTemplateParm { .. } => "SubstNonTypeTemplateParmExpr",
            ExprKind::PseudoObject { .. } => "PseudoObjectExpr",
            ExprKind::InitList { .. } => "InitListExpr",
            ExprKind::DesignatedInit { .. } => "DesignatedInitExpr",
            ExprKind::UnaryExprOrTypeTrait { .. } => "UnaryExprOrTypeTraitExpr",
            ExprKind::UnresolvedLookup { .. } => "UnresolvedLookupExpr",
            ExprKind::ShuffleVector { .. } => "ShuffleVectorExpr",
            ExprKind::Other { .. } => "Other",
        }
    }
}

/*
 *
 *  Child iteration
 *
 *  Children are listed in source order.  Declarations referenced by
 *  id (`Decl` statements, condition variables, catch parameters) are
 *  not children; neither are expressions embedded in types.
 *
 */

impl Stmt {
    pub fn children(&self) -> Vec<NodeRef<'_>> {
        let mut out = Vec::new();
        match &self.kind {
            StmtKind::Compound(body) => out.extend(body.iter().map(NodeRef::Stmt)),
            StmtKind::Null
            | StmtKind::Decl(_)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Goto { .. }
            | StmtKind::Other { .. } => {}
            StmtKind::Expr(e) => out.push(NodeRef::Expr(e)),
            StmtKind::If {
                init,
                cond,
                then,
                els,
                ..
            } => {
                out.extend(init.as_deref().map(NodeRef::Stmt));
                out.push(NodeRef::Expr(cond));
                out.push(NodeRef::Stmt(then));
                out.extend(els.as_deref().map(NodeRef::Stmt));
            }
            StmtKind::While { cond, body, .. } => {
                out.push(NodeRef::Expr(cond));
                out.push(NodeRef::Stmt(body));
            }
            StmtKind::Do { body, cond } => {
                out.push(NodeRef::Stmt(body));
                out.push(NodeRef::Expr(cond));
            }
            StmtKind::For {
                init,
                cond,
                inc,
                body,
                ..
            } => {
                out.extend(init.as_deref().map(NodeRef::Stmt));
                out.extend(cond.as_deref().map(NodeRef::Expr));
                out.extend(inc.as_deref().map(NodeRef::Expr));
                out.push(NodeRef::Stmt(body));
            }
            StmtKind::Switch {
                init, cond, body, ..
            } => {
                out.extend(init.as_deref().map(NodeRef::Stmt));
                out.push(NodeRef::Expr(cond));
                out.push(NodeRef::Stmt(body));
            }
            StmtKind::Case { lhs, rhs, sub } => {
                out.push(NodeRef::Expr(lhs));
                out.extend(rhs.as_deref().map(NodeRef::Expr));
                out.push(NodeRef::Stmt(sub));
            }
            StmtKind::Default { sub } | StmtKind::Label { sub, .. } => {
                out.push(NodeRef::Stmt(sub))
            }
            StmtKind::Return(value) => out.extend(value.as_deref().map(NodeRef::Expr)),
            StmtKind::Try { block, handlers } => {
                out.push(NodeRef::Stmt(block));
                out.extend(handlers.iter().map(NodeRef::Stmt));
            }
            StmtKind::Catch { handler, .. } => out.push(NodeRef::Stmt(handler)),
        }
        out
    }

    pub fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        let mut out = Vec::new();
        match &mut self.kind {
            StmtKind::Compound(body) => out.extend(body.iter_mut().map(NodeMut::Stmt)),
            StmtKind::Null
            | StmtKind::Decl(_)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Goto { .. }
            | StmtKind::Other { .. } => {}
            StmtKind::Expr(e) => out.push(NodeMut::Expr(e)),
            StmtKind::If {
                init,
                cond,
                then,
                els,
                ..
            } => {
                out.extend(init.as_deref_mut().map(NodeMut::Stmt));
                out.push(NodeMut::Expr(cond));
                out.push(NodeMut::Stmt(then));
                out.extend(els.as_deref_mut().map(NodeMut::Stmt));
            }
            StmtKind::While { cond, body, .. } => {
                out.push(NodeMut::Expr(cond));
                out.push(NodeMut::Stmt(body));
            }
            StmtKind::Do { body, cond } => {
                out.push(NodeMut::Stmt(body));
                out.push(NodeMut::Expr(cond));
            }
            StmtKind::For {
                init,
                cond,
                inc,
                body,
                ..
            } => {
                out.extend(init.as_deref_mut().map(NodeMut::Stmt));
                out.extend(cond.as_deref_mut().map(NodeMut::Expr));
                out.extend(inc.as_deref_mut().map(NodeMut::Expr));
                out.push(NodeMut::Stmt(body));
            }
            StmtKind::Switch {
                init, cond, body, ..
            } => {
                out.extend(init.as_deref_mut().map(NodeMut::Stmt));
                out.push(NodeMut::Expr(cond));
                out.push(NodeMut::Stmt(body));
            }
            StmtKind::Case { lhs, rhs, sub } => {
                out.push(NodeMut::Expr(lhs));
                out.extend(rhs.as_deref_mut().map(NodeMut::Expr));
                out.push(NodeMut::Stmt(sub));
            }
            StmtKind::Default { sub } | StmtKind::Label { sub, .. } => {
                out.push(NodeMut::Stmt(sub))
            }
            StmtKind::Return(value) => out.extend(value.as_deref_mut().map(NodeMut::Expr)),
            StmtKind::Try { block, handlers } => {
                out.push(NodeMut::Stmt(block));
                out.extend(handlers.iter_mut().map(NodeMut::Stmt));
            }
            StmtKind::Catch { handler, .. } => out.push(NodeMut::Stmt(handler)),
        }
        out
    }
}

impl Expr {
    pub fn children(&self) -> Vec<NodeRef<'_>> {
        let mut out = Vec::new();
        match &self.kind {
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::CompoundAssign { lhs, rhs, .. } => {
                out.push(NodeRef::Expr(lhs));
                out.push(NodeRef::Expr(rhs));
            }
            ExprKind::Unary { sub, .. }
            | ExprKind::ImaginaryLiteral { sub }
            | ExprKind::Paren { sub }
            | ExprKind::ImplicitCast { sub, .. }
            | ExprKind::CStyleCast { sub, .. }
            | ExprKind::NamedCast { sub, .. }
            | ExprKind::FunctionalCast { sub, .. }
            | ExprKind::ExprWithCleanups { sub, .. }
            | ExprKind::Constant { sub }
            | ExprKind::VaArg { sub, .. } => out.push(NodeRef::Expr(sub)),
            ExprKind::DeclRef { .. }
            | ExprKind::IntegerLiteral { .. }
            | ExprKind::FloatingLiteral { .. }
            | ExprKind::CharacterLiteral { .. }
            | ExprKind::StringLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::NullPtrLiteral
            | ExprKind::GnuNull
            | ExprKind::DefaultArg { .. }
            | ExprKind::AddrLabel { .. }
            | ExprKind::ImplicitValueInit
            | ExprKind::ScalarValueInit
            | ExprKind::This { .. }
            | ExprKind::UnresolvedLookup { .. }
            | ExprKind::Other { .. } => {}
            ExprKind::Predefined { function_name, .. } => {
                out.extend(function_name.as_deref().map(NodeRef::Expr))
            }
            ExprKind::SourceLoc { value, .. } => out.extend(value.as_deref().map(NodeRef::Expr)),
            ExprKind::ArraySubscript { base, index } => {
                out.push(NodeRef::Expr(base));
                out.push(NodeRef::Expr(index));
            }
            ExprKind::Member { base, .. } | ExprKind::ExtVectorElement { base, .. } => {
                out.push(NodeRef::Expr(base))
            }
            ExprKind::Call { callee, args }
            | ExprKind::OperatorCall { callee, args, .. }
            | ExprKind::MemberCall { callee, args } => {
                out.push(NodeRef::Expr(callee));
                out.extend(args.iter().map(NodeRef::Expr));
            }
            ExprKind::CudaKernelCall {
                callee,
                config,
                args,
            } => {
                out.push(NodeRef::Expr(callee));
                out.push(NodeRef::Expr(config));
                out.extend(args.iter().map(NodeRef::Expr));
            }
            ExprKind::Construct { args, .. } | ExprKind::TemporaryObject { args, .. } => {
                out.extend(args.iter().map(NodeRef::Expr))
            }
            ExprKind::MaterializeTemporary { sub, .. } | ExprKind::Throw { sub, .. } => {
                out.extend(sub.as_deref().map(NodeRef::Expr))
            }
            ExprKind::Conditional { cond, then, els } => {
                out.push(NodeRef::Expr(cond));
                out.push(NodeRef::Expr(then));
                out.push(NodeRef::Expr(els));
            }
            ExprKind::StmtExpr { sub, .. } => out.push(NodeRef::Stmt(sub)),
            ExprKind::Choose { cond, lhs, rhs, .. } => {
                out.push(NodeRef::Expr(cond));
                out.push(NodeRef::Expr(lhs));
                out.push(NodeRef::Expr(rhs));
            }
            ExprKind::SubstNonTypeTemplateParm { replacement, .. } => {
                out.push(NodeRef::Expr(replacement))
            }
            ExprKind::PseudoObject {
                syntactic,
                semantics,
                ..
            } => {
                out.push(NodeRef::Expr(syntactic));
                out.extend(semantics.iter().map(NodeRef::Expr));
            }
            ExprKind::InitList { inits, .. } => out.extend(inits.iter().map(NodeRef::Expr)),
            ExprKind::DesignatedInit {
                index_exprs, init, ..
            } => {
                out.extend(index_exprs.iter().map(NodeRef::Expr));
                out.push(NodeRef::Expr(init));
            }
            ExprKind::UnaryExprOrTypeTrait { arg, .. } => {
                if let TraitArg::Expr(e) = arg {
                    out.push(NodeRef::Expr(e));
                }
            }
            ExprKind::ShuffleVector { exprs } => out.extend(exprs.iter().map(NodeRef::Expr)),
        }
        out
    }

    pub fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        let mut out = Vec::new();
        match &mut self.kind {
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::CompoundAssign { lhs, rhs, .. } => {
                out.push(NodeMut::Expr(lhs));
                out.push(NodeMut::Expr(rhs));
            }
            ExprKind::Unary { sub, .. }
            | ExprKind::ImaginaryLiteral { sub }
            | ExprKind::Paren { sub }
            | ExprKind::ImplicitCast { sub, .. }
            | ExprKind::CStyleCast { sub, .. }
            | ExprKind::NamedCast { sub, .. }
            | ExprKind::FunctionalCast { sub, .. }
            | ExprKind::ExprWithCleanups { sub, .. }
            | ExprKind::Constant { sub }
            | ExprKind::VaArg { sub, .. } => out.push(NodeMut::Expr(sub)),
            ExprKind::DeclRef { .. }
            | ExprKind::IntegerLiteral { .. }
            | ExprKind::FloatingLiteral { .. }
            | ExprKind::CharacterLiteral { .. }
            | ExprKind::StringLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::NullPtrLiteral
            | ExprKind::GnuNull
            | ExprKind::DefaultArg { .. }
            | ExprKind::AddrLabel { .. }
            | ExprKind::ImplicitValueInit
            | ExprKind::ScalarValueInit
            | ExprKind::This { .. }
            | ExprKind::UnresolvedLookup { .. }
            | ExprKind::Other { .. } => {}
            ExprKind::Predefined { function_name, .. } => {
                out.extend(function_name.as_deref_mut().map(NodeMut::Expr))
            }
            ExprKind::SourceLoc { value, .. } => {
                out.extend(value.as_deref_mut().map(NodeMut::Expr))
            }
            ExprKind::ArraySubscript { base, index } => {
                out.push(NodeMut::Expr(base));
                out.push(NodeMut::Expr(index));
            }
            ExprKind::Member { base, .. } | ExprKind::ExtVectorElement { base, .. } => {
                out.push(NodeMut::Expr(base))
            }
            ExprKind::Call { callee, args }
            | ExprKind::OperatorCall { callee, args, .. }
            | ExprKind::MemberCall { callee, args } => {
                out.push(NodeMut::Expr(callee));
                out.extend(args.iter_mut().map(NodeMut::Expr));
            }
            ExprKind::CudaKernelCall {
                callee,
                config,
                args,
            } => {
                out.push(NodeMut::Expr(callee));
                out.push(NodeMut::Expr(config));
                out.extend(args.iter_mut().map(NodeMut::Expr));
            }
            ExprKind::Construct { args, .. } | ExprKind::TemporaryObject { args, .. } => {
                out.extend(args.iter_mut().map(NodeMut::Expr))
            }
            ExprKind::MaterializeTemporary { sub, .. } | ExprKind::Throw { sub, .. } => {
                out.extend(sub.as_deref_mut().map(NodeMut::Expr))
            }
            ExprKind::Conditional { cond, then, els } => {
                out.push(NodeMut::Expr(cond));
                out.push(NodeMut::Expr(then));
                out.push(NodeMut::Expr(els));
            }
            ExprKind::StmtExpr { sub, .. } => out.push(NodeMut::Stmt(sub)),
            ExprKind::Choose { cond, lhs, rhs, .. } => {
                out.push(NodeMut::Expr(cond));
                out.push(NodeMut::Expr(lhs));
                out.push(NodeMut::Expr(rhs));
            }
            ExprKind::SubstNonTypeTemplateParm { replacement, .. } => {
                out.push(NodeMut::Expr(replacement))
            }
            ExprKind::PseudoObject {
                syntactic,
                semantics,
                ..
            } => {
                out.push(NodeMut::Expr(syntactic));
                out.extend(semantics.iter_mut().map(NodeMut::Expr));
            }
            ExprKind::InitList { inits, .. } => out.extend(inits.iter_mut().map(NodeMut::Expr)),
            ExprKind::DesignatedInit {
                index_exprs, init, ..
            } => {
                out.extend(index_exprs.iter_mut().map(NodeMut::Expr));
                out.push(NodeMut::Expr(init));
            }
            ExprKind::UnaryExprOrTypeTrait { arg, .. } => {
                if let TraitArg::Expr(e) = arg {
                    out.push(NodeMut::Expr(e));
                }
            }
            ExprKind::ShuffleVector { exprs } => {
                out.extend(exprs.iter_mut().map(NodeMut::Expr))
            }
        }
        out
    }

    /// Types spelled out in the source as part of this node (cast targets, `sizeof(T)`
    /// arguments, ...), as opposed to the node's own type.
    pub fn written_types_mut(&mut self) -> Vec<&mut QualType> {
        match &mut self.kind {
            ExprKind::CompoundAssign {
                computation_lhs_ty,
                computation_result_ty,
                ..
            } => vec![computation_lhs_ty, computation_result_ty],
            ExprKind::CStyleCast { written, .. }
            | ExprKind::NamedCast { written, .. }
            | ExprKind::FunctionalCast { written, .. }
            | ExprKind::TemporaryObject { written, .. }
            | ExprKind::VaArg { written, .. } => vec![written],
            ExprKind::UnaryExprOrTypeTrait {
                arg: TraitArg::Type(t),
                ..
            } => vec![t],
            _ => Vec::new(),
        }
    }
}

/*
 *
 *  Shape
 *
 */

/// Pre-order list of `(kind name, child count)` for every node under `root`. Two trees with the
/// same shape have the same kinds, the same arity at every node and the same element order in
/// every sequence.
pub fn shape(root: NodeRef<'_>) -> Vec<(&'static str, usize)> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let children = node.children();
        out.push((node.kind_name(), children.len()));
        stack.extend(children.into_iter().rev());
    }
    out
}

impl Stmt {
    pub fn shape(&self) -> Vec<(&'static str, usize)> {
        shape(NodeRef::Stmt(self))
    }
}

impl Expr {
    pub fn shape(&self) -> Vec<(&'static str, usize)> {
        shape(NodeRef::Expr(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::DeclId;

    fn int_ty() -> QualType {
        QualType::prim(PrimType::Int)
    }

    #[test]
    fn shape_is_preorder() {
        // { x = 1 + 2; return x; }
        let x = DeclId(1);
        let sum = Expr::binary(BinOp::Add, Expr::int(1), Expr::int(2), int_ty());
        let assign = Expr::binary(BinOp::Assign, Expr::decl_ref(x, "x", int_ty()), sum, int_ty());
        let read = Expr::implicit_cast(
            CastKind::LValueToRValue,
            Expr::decl_ref(x, "x", int_ty()),
            int_ty(),
        );
        let body = Stmt::compound(vec![Stmt::expr(assign), Stmt::ret(Some(read))]);

        assert_eq!(
            body.shape(),
            vec![
                ("CompoundStmt", 2),
                ("ExprStmt", 1),
                ("BinaryOperator", 2),
                ("DeclRefExpr", 0),
                ("BinaryOperator", 2),
                ("IntegerLiteral", 0),
                ("IntegerLiteral", 0),
                ("ReturnStmt", 1),
                ("ImplicitCastExpr", 1),
                ("DeclRefExpr", 0),
            ]
        );
    }

    #[test]
    fn optional_children_are_skipped() {
        let stmt = Stmt::new(StmtKind::If {
            init: None,
            cond_var: Some(DeclId(3)),
            cond: Box::new(Expr::int(1)),
            then: Box::new(Stmt::new(StmtKind::Null)),
            els: None,
            is_constexpr: false,
        });
        let kinds: Vec<_> = stmt.children().iter().map(|c| c.kind_name()).collect();
        assert_eq!(kinds, vec!["IntegerLiteral", "NullStmt"]);
    }

    #[test]
    fn children_mut_reaches_every_child() {
        let mut call = Expr::call(
            Expr::decl_ref(DeclId(1), "f", QualType::null()),
            vec![Expr::int(1), Expr::int(2)],
            int_ty(),
        );
        for child in call.children_mut() {
            if let NodeMut::Expr(e) = child {
                e.range = SourceRange::at(SourceLoc {
                    file: 1,
                    line: 7,
                    col: 3,
                });
            }
        }
        assert!(call.children().iter().all(|c| match c {
            NodeRef::Expr(e) => e.range.begin.line == 7,
            NodeRef::Stmt(_) => false,
        }));
    }

    #[test]
    fn written_types() {
        let mut sizeof = Expr::new(
            ExprKind::UnaryExprOrTypeTrait {
                trait_kind: UnaryTraitKind::SizeOf,
                arg: TraitArg::Type(int_ty()),
            },
            QualType::prim(PrimType::ULong),
            ValueKind::PRValue,
        );
        assert_eq!(sizeof.written_types_mut().len(), 1);
        assert!(sizeof.children().is_empty());

        let mut lit = Expr::int(4);
        assert!(lit.written_types_mut().is_empty());
    }

    #[test]
    fn string_literal_type_counts_terminator() {
        let e = Expr::string("abc", SourceLoc::default());
        assert_eq!(e.ty, QualType::string_literal(3));
        let Some(Type::ConstantArray { size, elem }) = e.ty.typ.as_deref() else {
            panic!("expected a constant array, got {:?}", e.ty);
        };
        assert_eq!(*size, 4);
        assert!(elem.quals.is_const);
    }
}

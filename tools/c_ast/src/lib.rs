//! Imports one function from clang's JSON AST dump (`clang -Xclang -ast-dump=json -fsyntax-only`)
//! into the `astclone_ir` model.
//!
//! The dump is deserialized with `clang-ast` into [`Clang`] nodes, which name only the kinds the
//! importer understands; everything else lands in [`Clang::Other`] and comes out of the import as
//! an `Other` node.

mod spelling;

pub use spelling::parse_type;

use astclone_ir::ast::{
    self as ir, Expr, ExprKind, FpOptions, ObjectKind, SourceLoc, SourceRange, Stmt, StmtKind, StringLiteral,
    TraitArg,
};
use astclone_ir::decl::{FunctionDecl, InitStyle, NamedDecl, StorageClass, ThreadStorage};
use astclone_ir::{AstContext, Decl, DeclContextId, DeclId, ScopeId, VarDecl};
use clang_ast::Node;
use serde::Deserialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, trace};

/// A type as clang spells it.
#[derive(Deserialize, Debug)]
pub struct QualType {
    /// The type as written, possibly naming typedefs.
    #[serde(rename = "qualType")]
    pub qual_type: String,
    /// The type with typedefs and `typeof`s resolved, when it differs.
    #[serde(rename = "desugaredQualType")]
    pub desugared_qual_type: Option<String>,
}

impl QualType {
    fn parse(&self) -> ir::QualType {
        parse_type(&self.qual_type)
    }
}

/// The abbreviated declaration clang attaches to a `DeclRefExpr`.
#[derive(Deserialize, Debug)]
pub struct BareDecl {
    pub id: clang_ast::Id,
    pub kind: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
}

/// The subset of clang's node kinds the importer maps.
#[derive(Deserialize, Debug)]
pub enum Clang {
    TranslationUnitDecl,
    FunctionDecl {
        loc: Option<clang_ast::SourceLocation>,
        name: String,
        #[serde(rename = "type")]
        ty: QualType,
    },
    ParmVarDecl {
        loc: Option<clang_ast::SourceLocation>,
        name: Option<String>,
        #[serde(rename = "type")]
        ty: QualType,
    },
    VarDecl {
        loc: Option<clang_ast::SourceLocation>,
        name: String,
        #[serde(rename = "type")]
        ty: QualType,
        #[serde(rename = "storageClass")]
        storage_class: Option<String>,
        tls: Option<String>,
        init: Option<String>,
    },
    TypedefDecl {
        loc: Option<clang_ast::SourceLocation>,
        name: String,
    },
    RecordDecl {
        loc: Option<clang_ast::SourceLocation>,
        name: Option<String>,
    },

    CompoundStmt {
        range: Option<clang_ast::SourceRange>,
    },
    NullStmt {
        range: Option<clang_ast::SourceRange>,
    },
    DeclStmt {
        range: Option<clang_ast::SourceRange>,
    },
    ReturnStmt {
        range: Option<clang_ast::SourceRange>,
    },
    IfStmt {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "hasInit", default)]
        has_init: bool,
        #[serde(rename = "hasVar", default)]
        has_var: bool,
        #[serde(rename = "hasElse", default)]
        has_else: bool,
        #[serde(rename = "isConstexpr", default)]
        is_constexpr: bool,
    },
    WhileStmt {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "hasVar", default)]
        has_var: bool,
    },
    DoStmt {
        range: Option<clang_ast::SourceRange>,
    },
    // clang always dumps five children, with `{}` for absent ones
    ForStmt {
        range: Option<clang_ast::SourceRange>,
    },
    SwitchStmt {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "hasInit", default)]
        has_init: bool,
        #[serde(rename = "hasVar", default)]
        has_var: bool,
    },
    CaseStmt {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "isGNURange", default)]
        is_gnu_range: bool,
    },
    DefaultStmt {
        range: Option<clang_ast::SourceRange>,
    },
    BreakStmt {
        range: Option<clang_ast::SourceRange>,
    },
    ContinueStmt {
        range: Option<clang_ast::SourceRange>,
    },
    LabelStmt {
        range: Option<clang_ast::SourceRange>,
        name: String,
        #[serde(rename = "declId")]
        decl_id: clang_ast::Id,
    },
    GotoStmt {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "targetLabelDeclId")]
        target: clang_ast::Id,
    },

    IntegerLiteral {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        value: String,
    },
    FloatingLiteral {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        value: String,
    },
    CharacterLiteral {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        value: u32,
    },
    StringLiteral {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        value: String,
    },
    CXXBoolLiteralExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        value: bool,
    },
    CXXNullPtrLiteralExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    GNUNullExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    DeclRefExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        #[serde(rename = "referencedDecl")]
        referenced_decl: BareDecl,
        #[serde(rename = "nonOdrUseReason")]
        non_odr_use_reason: Option<String>,
    },
    BinaryOperator {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        opcode: String,
    },
    CompoundAssignOperator {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        opcode: String,
        #[serde(rename = "computeLHSType")]
        compute_lhs_type: Option<QualType>,
        #[serde(rename = "computeResultType")]
        compute_result_type: Option<QualType>,
    },
    UnaryOperator {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        opcode: String,
        #[serde(rename = "isPostfix", default)]
        is_postfix: bool,
        // only dumped when false
        #[serde(rename = "canOverflow")]
        can_overflow: Option<bool>,
    },
    ImplicitCastExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        #[serde(rename = "castKind")]
        cast_kind: String,
    },
    CStyleCastExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        #[serde(rename = "castKind")]
        cast_kind: String,
    },
    ParenExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    ArraySubscriptExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    CallExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    MemberExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        name: String,
        #[serde(rename = "isArrow", default)]
        is_arrow: bool,
        #[serde(rename = "referencedMemberDecl")]
        member: Option<clang_ast::Id>,
    },
    ConditionalOperator {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    PredefinedExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        name: String,
    },
    UnaryExprOrTypeTraitExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        name: String,
        #[serde(rename = "argType")]
        arg_type: Option<QualType>,
    },
    InitListExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    ImplicitValueInitExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    ExprWithCleanups {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
        #[serde(rename = "cleanupsHaveSideEffects", default)]
        side_effects: bool,
    },
    ConstantExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    StmtExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },
    VAArgExpr {
        range: Option<clang_ast::SourceRange>,
        #[serde(rename = "type")]
        ty: Option<QualType>,
        #[serde(rename = "valueCategory")]
        value_category: Option<String>,
    },

    /// Every other node, and the `{}` placeholders clang dumps for absent children.
    Other { kind: Option<String> },
}

/// What every expression node carries besides its kind-specific fields.
struct ExprInfo<'a> {
    range: &'a Option<clang_ast::SourceRange>,
    ty: Option<&'a QualType>,
    value_category: Option<&'a str>,
}

impl Clang {
    fn expr_info(&self) -> Option<ExprInfo<'_>> {
        match self {
            Clang::IntegerLiteral { range, ty, value_category, .. }
            | Clang::FloatingLiteral { range, ty, value_category, .. }
            | Clang::CharacterLiteral { range, ty, value_category, .. }
            | Clang::StringLiteral { range, ty, value_category, .. }
            | Clang::CXXBoolLiteralExpr { range, ty, value_category, .. }
            | Clang::CXXNullPtrLiteralExpr { range, ty, value_category }
            | Clang::GNUNullExpr { range, ty, value_category }
            | Clang::DeclRefExpr { range, ty, value_category, .. }
            | Clang::BinaryOperator { range, ty, value_category, .. }
            | Clang::CompoundAssignOperator { range, ty, value_category, .. }
            | Clang::UnaryOperator { range, ty, value_category, .. }
            | Clang::ImplicitCastExpr { range, ty, value_category, .. }
            | Clang::CStyleCastExpr { range, ty, value_category, .. }
            | Clang::ParenExpr { range, ty, value_category }
            | Clang::ArraySubscriptExpr { range, ty, value_category }
            | Clang::CallExpr { range, ty, value_category }
            | Clang::MemberExpr { range, ty, value_category, .. }
            | Clang::ConditionalOperator { range, ty, value_category }
            | Clang::PredefinedExpr { range, ty, value_category, .. }
            | Clang::UnaryExprOrTypeTraitExpr { range, ty, value_category, .. }
            | Clang::InitListExpr { range, ty, value_category }
            | Clang::ImplicitValueInitExpr { range, ty, value_category }
            | Clang::ExprWithCleanups { range, ty, value_category, .. }
            | Clang::ConstantExpr { range, ty, value_category }
            | Clang::StmtExpr { range, ty, value_category }
            | Clang::VAArgExpr { range, ty, value_category } => Some(ExprInfo {
                range,
                ty: ty.as_ref(),
                value_category: value_category.as_deref(),
            }),
            _ => None,
        }
    }

    fn stmt_range(&self) -> Option<&clang_ast::SourceRange> {
        match self {
            Clang::CompoundStmt { range }
            | Clang::NullStmt { range }
            | Clang::DeclStmt { range }
            | Clang::ReturnStmt { range }
            | Clang::IfStmt { range, .. }
            | Clang::WhileStmt { range, .. }
            | Clang::DoStmt { range }
            | Clang::ForStmt { range }
            | Clang::SwitchStmt { range, .. }
            | Clang::CaseStmt { range, .. }
            | Clang::DefaultStmt { range }
            | Clang::BreakStmt { range }
            | Clang::ContinueStmt { range }
            | Clang::LabelStmt { range, .. }
            | Clang::GotoStmt { range, .. } => range.as_ref(),
            _ => self.expr_info().and_then(|info| info.range.as_ref()),
        }
    }

    /// The clang class name of this node.
    pub fn kind_name(&self) -> &str {
        match self {
            Clang::TranslationUnitDecl => "TranslationUnitDecl",
            Clang::FunctionDecl { .. } => "FunctionDecl",
            Clang::ParmVarDecl { .. } => "ParmVarDecl",
            Clang::VarDecl { .. } => "VarDecl",
            Clang::TypedefDecl { .. } => "TypedefDecl",
            Clang::RecordDecl { .. } => "RecordDecl",
            Clang::CompoundStmt { .. } => "CompoundStmt",
            Clang::NullStmt { .. } => "NullStmt",
            Clang::DeclStmt { .. } => "DeclStmt",
            Clang::ReturnStmt { .. } => "ReturnStmt",
            Clang::IfStmt { .. } => "IfStmt",
            Clang::WhileStmt { .. } => "WhileStmt",
            Clang::DoStmt { .. } => "DoStmt",
            Clang::ForStmt { .. } => "ForStmt",
            Clang::SwitchStmt { .. } => "SwitchStmt",
            Clang::CaseStmt { .. } => "CaseStmt",
            Clang::DefaultStmt { .. } => "DefaultStmt",
            Clang::BreakStmt { .. } => "BreakStmt",
            Clang::ContinueStmt { .. } => "ContinueStmt",
            Clang::LabelStmt { .. } => "LabelStmt",
            Clang::GotoStmt { .. } => "GotoStmt",
            Clang::IntegerLiteral { .. } => "IntegerLiteral",
            Clang::FloatingLiteral { .. } => "FloatingLiteral",
            Clang::CharacterLiteral { .. } => "CharacterLiteral",
            Clang::StringLiteral { .. } => "StringLiteral",
            Clang::CXXBoolLiteralExpr { .. } => "CXXBoolLiteralExpr",
            Clang::CXXNullPtrLiteralExpr { .. } => "CXXNullPtrLiteralExpr",
            Clang::GNUNullExpr { .. } => "GNUNullExpr",
            Clang::DeclRefExpr { .. } => "DeclRefExpr",
            Clang::BinaryOperator { .. } => "BinaryOperator",
            Clang::CompoundAssignOperator { .. } => "CompoundAssignOperator",
            Clang::UnaryOperator { .. } => "UnaryOperator",
            Clang::ImplicitCastExpr { .. } => "ImplicitCastExpr",
            Clang::CStyleCastExpr { .. } => "CStyleCastExpr",
            Clang::ParenExpr { .. } => "ParenExpr",
            Clang::ArraySubscriptExpr { .. } => "ArraySubscriptExpr",
            Clang::CallExpr { .. } => "CallExpr",
            Clang::MemberExpr { .. } => "MemberExpr",
            Clang::ConditionalOperator { .. } => "ConditionalOperator",
            Clang::PredefinedExpr { .. } => "PredefinedExpr",
            Clang::UnaryExprOrTypeTraitExpr { .. } => "UnaryExprOrTypeTraitExpr",
            Clang::InitListExpr { .. } => "InitListExpr",
            Clang::ImplicitValueInitExpr { .. } => "ImplicitValueInitExpr",
            Clang::ExprWithCleanups { .. } => "ExprWithCleanups",
            Clang::ConstantExpr { .. } => "ConstantExpr",
            Clang::StmtExpr { .. } => "StmtExpr",
            Clang::VAArgExpr { .. } => "VAArgExpr",
            Clang::Other { kind } => kind.as_deref().unwrap_or(""),
        }
    }

    fn is_placeholder(&self) -> bool {
        matches!(self, Clang::Other { kind: None })
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed AST dump: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no definition of function `{0}` in the translation unit")]
    MissingFunction(String),
    #[error("{kind} has {found} children, expected {expected}")]
    Arity {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("malformed {what} `{text}`")]
    Malformed { what: &'static str, text: String },
    #[error("cannot import a {0} as a local declaration")]
    UnsupportedDecl(String),
}

/// A function body lifted out of a dump, with the declarations it mentions.
#[derive(Debug)]
pub struct ImportedFunction {
    pub ast: AstContext,
    pub body: Stmt,
    /// The function's declaration context; locals and parameters live in it.
    pub context: DeclContextId,
    /// The function's outermost scope, holding the parameters and the body's top-level locals.
    pub scope: ScopeId,
    pub params: Vec<DeclId>,
    /// Source files by the index used in `SourceLoc::file`.
    pub files: Vec<String>,
}

/// Imports the definition of `function` from a translation unit dumped as JSON.
pub fn import_function(json: &str, function: &str) -> Result<ImportedFunction, ImportError> {
    let tu: Node<Clang> = serde_json::from_str(json)?;
    let definition = tu
        .inner
        .iter()
        .find(|n| {
            matches!(&n.kind, Clang::FunctionDecl { name, .. } if name == function)
                && n.inner.iter().any(|c| matches!(c.kind, Clang::CompoundStmt { .. }))
        })
        .ok_or_else(|| ImportError::MissingFunction(function.to_string()))?;
    debug!("importing `{function}`");
    Importer::new(function).function(definition)
}

pub fn import_function_from_path(
    path: &Path,
    function: &str,
) -> Result<ImportedFunction, ImportError> {
    let json = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_function(&json, function)
}

struct Importer {
    ast: AstContext,
    // clang node id -> imported declaration
    decls: HashMap<clang_ast::Id, DeclId>,
    files: Vec<Arc<str>>,
    function: DeclContextId,
    tu_scope: ScopeId,
    scope: ScopeId,
}

impl Importer {
    fn new(function: &str) -> Self {
        let mut ast = AstContext::new();
        let function = ast.contexts.add_function(function);
        let tu_scope = ast.scopes.add(None);
        let scope = ast.scopes.add(Some(tu_scope));
        Self {
            ast,
            decls: HashMap::new(),
            files: Vec::new(),
            function,
            tu_scope,
            scope,
        }
    }

    fn function(mut self, node: &Node<Clang>) -> Result<ImportedFunction, ImportError> {
        let mut function = String::new();
        if let Clang::FunctionDecl { loc, name, ty } = &node.kind {
            function.clone_from(name);
            let decl = Decl::Function(FunctionDecl {
                name: name.clone(),
                ty: ty.parse(),
                context: self.ast.contexts.translation_unit(),
                loc: self.loc(loc.as_ref()),
                referenced: false,
                used: false,
            });
            let id = self.ast.declare(decl, Some(self.tu_scope));
            self.decls.insert(node.id, id);
        }

        let mut params = Vec::new();
        let mut body = None;
        for child in &node.inner {
            match &child.kind {
                Clang::ParmVarDecl { loc, name, ty } => {
                    let mut var = VarDecl::new(
                        name.clone().unwrap_or_default(),
                        ty.parse(),
                        self.function,
                    );
                    var.loc = self.loc(loc.as_ref());
                    let id = self.ast.declare(Decl::Param(var), Some(self.scope));
                    self.decls.insert(child.id, id);
                    params.push(id);
                }
                // the body's own block shares the function scope
                Clang::CompoundStmt { range } => {
                    let range = self.range(range.as_ref());
                    body = Some(
                        Stmt::new(StmtKind::Compound(self.stmts(&child.inner)?)).with_range(range),
                    );
                }
                _ => {}
            }
        }
        let body = body.ok_or(ImportError::MissingFunction(function))?;
        debug!(
            "imported {} declarations from {} files",
            self.ast.decls.len(),
            self.files.len()
        );
        Ok(ImportedFunction {
            ast: self.ast,
            body,
            context: self.function,
            scope: self.scope,
            params,
            files: self.files.iter().map(|f| f.to_string()).collect(),
        })
    }

    fn stmts(&mut self, nodes: &[Node<Clang>]) -> Result<Vec<Stmt>, ImportError> {
        nodes.iter().map(|n| self.stmt(n)).collect()
    }

    fn boxed_stmt(&mut self, node: &Node<Clang>) -> Result<Box<Stmt>, ImportError> {
        self.stmt(node).map(Box::new)
    }

    fn boxed(&mut self, node: &Node<Clang>) -> Result<Box<Expr>, ImportError> {
        self.expr(node).map(Box::new)
    }

    fn opt_stmt(&mut self, node: &Node<Clang>) -> Result<Option<Box<Stmt>>, ImportError> {
        if node.kind.is_placeholder() {
            return Ok(None);
        }
        self.boxed_stmt(node).map(Some)
    }

    fn opt_expr(&mut self, node: &Node<Clang>) -> Result<Option<Box<Expr>>, ImportError> {
        if node.kind.is_placeholder() {
            return Ok(None);
        }
        self.boxed(node).map(Some)
    }

    fn stmt(&mut self, node: &Node<Clang>) -> Result<Stmt, ImportError> {
        if node.kind.expr_info().is_some() {
            let e = self.expr(node)?;
            let range = e.range;
            return Ok(Stmt::new(StmtKind::Expr(Box::new(e))).with_range(range));
        }
        let range = self.range(node.kind.stmt_range());
        let kind = match &node.kind {
            Clang::CompoundStmt { .. } => {
                let outer = self.scope;
                self.scope = self.ast.scopes.add(Some(outer));
                let body = self.stmts(&node.inner);
                self.scope = outer;
                StmtKind::Compound(body?)
            }
            Clang::NullStmt { .. } => StmtKind::Null,
            Clang::DeclStmt { .. } => StmtKind::Decl(
                node.inner
                    .iter()
                    .map(|d| self.local_decl(d))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Clang::ReturnStmt { .. } => StmtKind::Return(match node.inner.first() {
                Some(value) => Some(self.boxed(value)?),
                None => None,
            }),
            Clang::IfStmt {
                has_init,
                has_var,
                has_else,
                is_constexpr,
                ..
            } => {
                let mut kids = Kids::new(
                    "IfStmt",
                    &node.inner,
                    2 + usize::from(*has_init) + usize::from(*has_var) + usize::from(*has_else),
                )?;
                let init = if *has_init {
                    Some(self.boxed_stmt(kids.next()?)?)
                } else {
                    None
                };
                let cond_var = if *has_var {
                    Some(self.cond_var(kids.next()?)?)
                } else {
                    None
                };
                let cond = self.boxed(kids.next()?)?;
                let then = self.boxed_stmt(kids.next()?)?;
                let els = if *has_else {
                    Some(self.boxed_stmt(kids.next()?)?)
                } else {
                    None
                };
                StmtKind::If {
                    init,
                    cond_var,
                    cond,
                    then,
                    els,
                    is_constexpr: *is_constexpr,
                }
            }
            Clang::WhileStmt { has_var, .. } => {
                let mut kids = Kids::new("WhileStmt", &node.inner, 2 + usize::from(*has_var))?;
                let cond_var = if *has_var {
                    Some(self.cond_var(kids.next()?)?)
                } else {
                    None
                };
                StmtKind::While {
                    cond_var,
                    cond: self.boxed(kids.next()?)?,
                    body: self.boxed_stmt(kids.next()?)?,
                }
            }
            Clang::DoStmt { .. } => {
                let [body, cond] = exactly::<2>("DoStmt", &node.inner)?;
                StmtKind::Do {
                    body: self.boxed_stmt(body)?,
                    cond: self.boxed(cond)?,
                }
            }
            Clang::ForStmt { .. } => {
                let [init, cond_var, cond, inc, body] = exactly::<5>("ForStmt", &node.inner)?;
                StmtKind::For {
                    init: self.opt_stmt(init)?,
                    cond_var: if cond_var.kind.is_placeholder() {
                        None
                    } else {
                        Some(self.cond_var(cond_var)?)
                    },
                    cond: self.opt_expr(cond)?,
                    inc: self.opt_expr(inc)?,
                    body: self.boxed_stmt(body)?,
                }
            }
            Clang::SwitchStmt {
                has_init, has_var, ..
            } => {
                let mut kids = Kids::new(
                    "SwitchStmt",
                    &node.inner,
                    2 + usize::from(*has_init) + usize::from(*has_var),
                )?;
                let init = if *has_init {
                    Some(self.boxed_stmt(kids.next()?)?)
                } else {
                    None
                };
                let cond_var = if *has_var {
                    Some(self.cond_var(kids.next()?)?)
                } else {
                    None
                };
                StmtKind::Switch {
                    init,
                    cond_var,
                    cond: self.boxed(kids.next()?)?,
                    body: self.boxed_stmt(kids.next()?)?,
                }
            }
            Clang::CaseStmt { is_gnu_range, .. } => {
                let mut kids =
                    Kids::new("CaseStmt", &node.inner, 2 + usize::from(*is_gnu_range))?;
                let lhs = self.boxed(kids.next()?)?;
                let rhs = if *is_gnu_range {
                    Some(self.boxed(kids.next()?)?)
                } else {
                    None
                };
                StmtKind::Case {
                    lhs,
                    rhs,
                    sub: self.boxed_stmt(kids.next()?)?,
                }
            }
            Clang::DefaultStmt { .. } => {
                let [sub] = exactly::<1>("DefaultStmt", &node.inner)?;
                StmtKind::Default {
                    sub: self.boxed_stmt(sub)?,
                }
            }
            Clang::BreakStmt { .. } => StmtKind::Break,
            Clang::ContinueStmt { .. } => StmtKind::Continue,
            Clang::LabelStmt { name, decl_id, .. } => {
                let label = self.label(*decl_id, Some(name.as_str()));
                let [sub] = exactly::<1>("LabelStmt", &node.inner)?;
                StmtKind::Label {
                    label,
                    sub: self.boxed_stmt(sub)?,
                }
            }
            Clang::GotoStmt { target, .. } => StmtKind::Goto {
                label: self.label(*target, None),
            },
            other => {
                trace!("no statement mapping for {}", other.kind_name());
                StmtKind::Other {
                    kind: other.kind_name().to_string(),
                }
            }
        };
        Ok(Stmt::new(kind).with_range(range))
    }

    /// The variable of a condition, dumped as a `DeclStmt` holding one `VarDecl`.
    fn cond_var(&mut self, node: &Node<Clang>) -> Result<DeclId, ImportError> {
        match (&node.kind, node.inner.as_slice()) {
            (Clang::DeclStmt { .. }, [var]) => self.local_decl(var),
            _ => self.local_decl(node),
        }
    }

    fn local_decl(&mut self, node: &Node<Clang>) -> Result<DeclId, ImportError> {
        let decl = match &node.kind {
            Clang::VarDecl {
                loc,
                name,
                ty,
                storage_class,
                tls,
                init,
            } => {
                let mut var = VarDecl::new(name.clone(), ty.parse(), self.function);
                var.loc = self.loc(loc.as_ref());
                var.storage = match storage_class.as_deref() {
                    Some("static") => StorageClass::Static,
                    Some("extern") => StorageClass::Extern,
                    Some("register") => StorageClass::Register,
                    Some("auto") => StorageClass::Auto,
                    Some("__private_extern__") => StorageClass::PrivateExtern,
                    _ => StorageClass::None,
                };
                // clang only dumps the TLS model, not the keyword
                var.tls = match tls {
                    Some(_) => ThreadStorage::C11,
                    None => ThreadStorage::None,
                };
                var.init_style = match init.as_deref() {
                    Some("call") => InitStyle::Call,
                    Some("list") => InitStyle::List,
                    _ => InitStyle::Copy,
                };
                let id = self.ast.declare(Decl::Var(var), Some(self.scope));
                // registered first, so the initializer can mention the variable itself
                self.decls.insert(node.id, id);
                let init = match node.inner.iter().find(|c| c.kind.expr_info().is_some()) {
                    Some(init) => Some(self.boxed(init)?),
                    None => None,
                };
                if let Some(var) = self.ast.decls.get_mut(id).and_then(Decl::as_var_mut) {
                    var.init = init;
                }
                return Ok(id);
            }
            Clang::TypedefDecl { loc, name } => {
                let mut named = NamedDecl::new(name.clone(), ir::QualType::null(), self.function);
                named.loc = self.loc(loc.as_ref());
                Decl::Typedef(named)
            }
            Clang::RecordDecl { loc, name } => {
                let mut named = NamedDecl::new(
                    name.clone().unwrap_or_default(),
                    ir::QualType::null(),
                    self.function,
                );
                named.loc = self.loc(loc.as_ref());
                Decl::Record(named)
            }
            other => return Err(ImportError::UnsupportedDecl(other.kind_name().to_string())),
        };
        let id = self.ast.declare(decl, Some(self.scope));
        self.decls.insert(node.id, id);
        Ok(id)
    }

    fn label(&mut self, id: clang_ast::Id, name: Option<&str>) -> DeclId {
        if let Some(&decl) = self.decls.get(&id) {
            // a `goto` may come before its label
            if let (Some(name), Some(Decl::Label(label))) = (name, self.ast.decls.get_mut(decl)) {
                label.name = name.to_string();
            }
            return decl;
        }
        let label = NamedDecl::new(
            name.unwrap_or_default(),
            ir::QualType::null(),
            self.function,
        );
        let decl = self.ast.declare(Decl::Label(label), None);
        self.decls.insert(id, decl);
        decl
    }

    /// The declaration a reference names, created in the translation unit on first sight when it
    /// is not a local of the imported function.
    fn referenced(&mut self, bare: &BareDecl) -> DeclId {
        if let Some(&decl) = self.decls.get(&bare.id) {
            return decl;
        }
        let name = bare.name.clone().unwrap_or_default();
        let ty = bare
            .ty
            .as_ref()
            .map_or_else(ir::QualType::null, QualType::parse);
        let tu = self.ast.contexts.translation_unit();
        trace!("declaring {} `{name}` on first reference", bare.kind);
        let decl = match bare.kind.as_str() {
            "FunctionDecl" => Decl::Function(FunctionDecl {
                name,
                ty,
                context: tu,
                loc: SourceLoc::default(),
                referenced: false,
                used: false,
            }),
            "ParmVarDecl" => Decl::Param(VarDecl::new(name, ty, self.function)),
            "EnumConstantDecl" => Decl::EnumConstant(NamedDecl::new(name, ty, tu)),
            _ => Decl::Var(VarDecl::new(name, ty, tu)),
        };
        let id = self.ast.declare(decl, Some(self.tu_scope));
        self.decls.insert(bare.id, id);
        id
    }

    fn member(&mut self, id: Option<clang_ast::Id>, name: &str) -> DeclId {
        if let Some(decl) = id.and_then(|id| self.decls.get(&id).copied()) {
            return decl;
        }
        let tu = self.ast.contexts.translation_unit();
        let decl = self.ast.declare(
            Decl::Field(NamedDecl::new(name, ir::QualType::null(), tu)),
            None,
        );
        if let Some(id) = id {
            self.decls.insert(id, decl);
        }
        decl
    }

    fn exprs(&mut self, nodes: &[Node<Clang>]) -> Result<Vec<Expr>, ImportError> {
        nodes.iter().map(|n| self.expr(n)).collect()
    }

    fn expr(&mut self, node: &Node<Clang>) -> Result<Expr, ImportError> {
        let Some(info) = node.kind.expr_info() else {
            trace!("no expression mapping for {}", node.kind.kind_name());
            return Ok(Expr::new(
                ExprKind::Other {
                    kind: node.kind.kind_name().to_string(),
                },
                ir::QualType::null(),
                Default::default(),
            ));
        };
        let ty = info
            .ty
            .map_or_else(ir::QualType::null, QualType::parse);
        let range = self.range(info.range.as_ref());
        let value_kind = spelling::value_kind(info.value_category);

        let kind = match &node.kind {
            Clang::IntegerLiteral { value, .. } => ExprKind::IntegerLiteral {
                value: value.parse().map_err(|_| ImportError::Malformed {
                    what: "integer literal",
                    text: value.clone(),
                })?,
            },
            Clang::FloatingLiteral { value, .. } => ExprKind::FloatingLiteral {
                value: value.parse().map_err(|_| ImportError::Malformed {
                    what: "floating literal",
                    text: value.clone(),
                })?,
                exact: true,
                semantics: spelling::float_semantics(&ty),
            },
            Clang::CharacterLiteral { value, .. } => ExprKind::CharacterLiteral {
                value: *value,
                kind: spelling::char_kind(&ty),
            },
            Clang::StringLiteral { value, .. } => {
                let (kind, bytes) = spelling::string_literal(value)?;
                ExprKind::StringLiteral(StringLiteral {
                    bytes,
                    kind,
                    pascal: false,
                    token_locs: vec![range.begin],
                })
            }
            Clang::CXXBoolLiteralExpr { value, .. } => ExprKind::BoolLiteral(*value),
            Clang::CXXNullPtrLiteralExpr { .. } => ExprKind::NullPtrLiteral,
            Clang::GNUNullExpr { .. } => ExprKind::GnuNull,
            Clang::DeclRefExpr {
                referenced_decl,
                non_odr_use_reason,
                ..
            } => ExprKind::DeclRef {
                decl: self.referenced(referenced_decl),
                name: referenced_decl.name.clone().unwrap_or_default(),
                refers_to_enclosing: false,
                non_odr_use: non_odr_use_reason.is_some(),
            },
            Clang::BinaryOperator { opcode, .. } => {
                let [lhs, rhs] = exactly::<2>("BinaryOperator", &node.inner)?;
                ExprKind::Binary {
                    op: spelling::binary_op(opcode)?,
                    lhs: self.boxed(lhs)?,
                    rhs: self.boxed(rhs)?,
                    fp: FpOptions::default(),
                }
            }
            Clang::CompoundAssignOperator {
                opcode,
                compute_lhs_type,
                compute_result_type,
                ..
            } => {
                let [lhs, rhs] = exactly::<2>("CompoundAssignOperator", &node.inner)?;
                let written =
                    |t: &Option<QualType>| t.as_ref().map_or_else(ir::QualType::null, QualType::parse);
                ExprKind::CompoundAssign {
                    op: spelling::binary_op(opcode)?,
                    lhs: self.boxed(lhs)?,
                    rhs: self.boxed(rhs)?,
                    computation_lhs_ty: written(compute_lhs_type),
                    computation_result_ty: written(compute_result_type),
                    fp: FpOptions::default(),
                }
            }
            Clang::UnaryOperator {
                opcode,
                is_postfix,
                can_overflow,
                ..
            } => {
                let [sub] = exactly::<1>("UnaryOperator", &node.inner)?;
                ExprKind::Unary {
                    op: spelling::unary_op(opcode, *is_postfix)?,
                    sub: self.boxed(sub)?,
                    can_overflow: can_overflow.unwrap_or(true),
                }
            }
            Clang::ImplicitCastExpr { cast_kind, .. } => {
                let [sub] = exactly::<1>("ImplicitCastExpr", &node.inner)?;
                ExprKind::ImplicitCast {
                    cast: spelling::cast_kind(cast_kind),
                    sub: self.boxed(sub)?,
                }
            }
            Clang::CStyleCastExpr {
                cast_kind,
                ty: written,
                ..
            } => {
                let [sub] = exactly::<1>("CStyleCastExpr", &node.inner)?;
                ExprKind::CStyleCast {
                    cast: spelling::cast_kind(cast_kind),
                    sub: self.boxed(sub)?,
                    written: written.as_ref().map_or_else(ir::QualType::null, QualType::parse),
                }
            }
            Clang::ParenExpr { .. } => {
                let [sub] = exactly::<1>("ParenExpr", &node.inner)?;
                ExprKind::Paren {
                    sub: self.boxed(sub)?,
                }
            }
            Clang::ArraySubscriptExpr { .. } => {
                let [base, index] = exactly::<2>("ArraySubscriptExpr", &node.inner)?;
                ExprKind::ArraySubscript {
                    base: self.boxed(base)?,
                    index: self.boxed(index)?,
                }
            }
            Clang::CallExpr { .. } => {
                let Some((callee, args)) = node.inner.split_first() else {
                    return Err(ImportError::Arity {
                        kind: "CallExpr",
                        expected: 1,
                        found: 0,
                    });
                };
                ExprKind::Call {
                    callee: self.boxed(callee)?,
                    args: self.exprs(args)?,
                }
            }
            Clang::MemberExpr {
                name,
                is_arrow,
                member,
                ..
            } => {
                let [base] = exactly::<1>("MemberExpr", &node.inner)?;
                ExprKind::Member {
                    base: self.boxed(base)?,
                    is_arrow: *is_arrow,
                    member: self.member(*member, name),
                    name: name.clone(),
                }
            }
            Clang::ConditionalOperator { .. } => {
                let [cond, then, els] = exactly::<3>("ConditionalOperator", &node.inner)?;
                ExprKind::Conditional {
                    cond: self.boxed(cond)?,
                    then: self.boxed(then)?,
                    els: self.boxed(els)?,
                }
            }
            // older clangs leave the function name out
            Clang::PredefinedExpr { name, .. } => ExprKind::Predefined {
                ident: spelling::predefined_ident(name)?,
                function_name: match node.inner.first() {
                    Some(literal) => Some(self.boxed(literal)?),
                    None => None,
                },
            },
            Clang::UnaryExprOrTypeTraitExpr { name, arg_type, .. } => {
                let arg = match (arg_type, node.inner.first()) {
                    (Some(t), _) => TraitArg::Type(t.parse()),
                    (None, Some(e)) => TraitArg::Expr(self.boxed(e)?),
                    (None, None) => {
                        return Err(ImportError::Arity {
                            kind: "UnaryExprOrTypeTraitExpr",
                            expected: 1,
                            found: 0,
                        });
                    }
                };
                ExprKind::UnaryExprOrTypeTrait {
                    trait_kind: spelling::trait_kind(name)?,
                    arg,
                }
            }
            Clang::InitListExpr { .. } => ExprKind::InitList {
                inits: self.exprs(&node.inner)?,
                union_field: None,
            },
            Clang::ImplicitValueInitExpr { .. } => ExprKind::ImplicitValueInit,
            Clang::ExprWithCleanups { side_effects, .. } => {
                let [sub] = exactly::<1>("ExprWithCleanups", &node.inner)?;
                ExprKind::ExprWithCleanups {
                    sub: self.boxed(sub)?,
                    side_effects: *side_effects,
                }
            }
            Clang::ConstantExpr { .. } => {
                let [sub] = exactly::<1>("ConstantExpr", &node.inner)?;
                ExprKind::Constant {
                    sub: self.boxed(sub)?,
                }
            }
            Clang::StmtExpr { .. } => {
                let [sub] = exactly::<1>("StmtExpr", &node.inner)?;
                ExprKind::StmtExpr {
                    sub: self.boxed_stmt(sub)?,
                    template_depth: 0,
                }
            }
            Clang::VAArgExpr { ty: written, .. } => {
                let [sub] = exactly::<1>("VAArgExpr", &node.inner)?;
                ExprKind::VaArg {
                    sub: self.boxed(sub)?,
                    written: written.as_ref().map_or_else(ir::QualType::null, QualType::parse),
                    ms_abi: false,
                }
            }
            other => ExprKind::Other {
                kind: other.kind_name().to_string(),
            },
        };
        Ok(Expr {
            kind,
            ty,
            value_kind,
            object_kind: ObjectKind::Ordinary,
            range,
        })
    }

    fn file(&mut self, name: &Arc<str>) -> u32 {
        let index = match self.files.iter().position(|f| f == name) {
            Some(index) => index,
            None => {
                self.files.push(name.clone());
                self.files.len() - 1
            }
        };
        index as u32
    }

    fn loc(&mut self, loc: Option<&clang_ast::SourceLocation>) -> SourceLoc {
        let Some(bare) = loc.and_then(|l| l.spelling_loc.as_ref().or(l.expansion_loc.as_ref()))
        else {
            return SourceLoc::default();
        };
        SourceLoc {
            file: self.file(&bare.file),
            line: bare.line as u32,
            col: bare.col as u32,
        }
    }

    fn range(&mut self, range: Option<&clang_ast::SourceRange>) -> SourceRange {
        match range {
            Some(r) => SourceRange {
                begin: self.loc(Some(&r.begin)),
                end: self.loc(Some(&r.end)),
            },
            None => SourceRange::default(),
        }
    }
}

/// The children of a node with a fixed number of them.
fn exactly<'n, const N: usize>(
    kind: &'static str,
    inner: &'n [Node<Clang>],
) -> Result<&'n [Node<Clang>; N], ImportError> {
    inner.try_into().map_err(|_| ImportError::Arity {
        kind,
        expected: N,
        found: inner.len(),
    })
}

/// The children of a node whose arity depends on its flags, taken in order.
struct Kids<'n> {
    kind: &'static str,
    expected: usize,
    iter: std::slice::Iter<'n, Node<Clang>>,
}

impl<'n> Kids<'n> {
    fn new(
        kind: &'static str,
        inner: &'n [Node<Clang>],
        expected: usize,
    ) -> Result<Self, ImportError> {
        if inner.len() != expected {
            return Err(ImportError::Arity {
                kind,
                expected,
                found: inner.len(),
            });
        }
        Ok(Self {
            kind,
            expected,
            iter: inner.iter(),
        })
    }

    fn next(&mut self) -> Result<&'n Node<Clang>, ImportError> {
        self.iter.next().ok_or(ImportError::Arity {
            kind: self.kind,
            expected: self.expected,
            found: self.expected - self.iter.len(),
        })
    }
}

//! The semantic-action service the engine calls into for declaration bookkeeping and name lookup.

use astclone_ir::ast::Expr;
use astclone_ir::decl::{Decl, InitStyle};
use astclone_ir::{AstContext, DeclId, LookupResult, ScopeId, VarDecl};
use tracing::{trace, warn};

/// Declaration registration, initializer attachment and ordinary-name lookup.
///
/// The cloner and the rebinder never edit scopes directly; everything that a parser would
/// record when it meets a declaration goes through here.
pub trait SemaActions {
    fn ast(&self) -> &AstContext;

    fn ast_mut(&mut self) -> &mut AstContext;

    /// Adopts `decl` as if it had just been parsed: it gets an id and, when a scope is active,
    /// becomes visible there.
    fn register_var_decl(&mut self, decl: VarDecl) -> DeclId;

    fn add_initializer(&mut self, decl: DeclId, init: Box<Expr>, style: InitStyle) {
        match self.ast_mut().decls.get_mut(decl).and_then(Decl::as_var_mut) {
            Some(var) => {
                var.init = Some(init);
                var.init_style = style;
            }
            None => warn!("ignoring initializer for non-variable declaration {decl:?}"),
        }
    }

    /// Ordinary-name lookup starting at `scope`. Never creates builtins.
    fn lookup_ordinary_name(&self, scope: ScopeId, name: &str) -> LookupResult {
        self.ast().lookup(scope, name)
    }

    fn mark_used(&mut self, decl: DeclId) {
        if let Some(d) = self.ast_mut().decls.get_mut(decl) {
            d.set_used();
        }
    }
}

/// `SemaActions` over an owned `AstContext`, with an optional current scope that new variables
/// are registered into.
#[derive(Debug, Default)]
pub struct Sema {
    ast: AstContext,
    current_scope: Option<ScopeId>,
}

impl Sema {
    pub fn new(ast: AstContext) -> Self {
        Self {
            ast,
            current_scope: None,
        }
    }

    pub fn into_ast(self) -> AstContext {
        self.ast
    }

    pub fn current_scope(&self) -> Option<ScopeId> {
        self.current_scope
    }

    pub fn set_current_scope(&mut self, scope: Option<ScopeId>) {
        self.current_scope = scope;
    }

    /// Opens a scope nested in the current one and makes it current.
    pub fn enter_scope(&mut self) -> ScopeId {
        let scope = self.ast.scopes.add(self.current_scope);
        self.current_scope = Some(scope);
        scope
    }

    /// Returns to the parent of the current scope.
    pub fn exit_scope(&mut self) {
        self.current_scope = self
            .current_scope
            .and_then(|s| self.ast.scopes.get(s))
            .and_then(|s| s.parent);
    }
}

impl SemaActions for Sema {
    fn ast(&self) -> &AstContext {
        &self.ast
    }

    fn ast_mut(&mut self) -> &mut AstContext {
        &mut self.ast
    }

    fn register_var_decl(&mut self, decl: VarDecl) -> DeclId {
        trace!("registering `{}` in {:?}", decl.name, self.current_scope);
        self.ast.declare(Decl::Var(decl), self.current_scope)
    }
}

//! The in-memory syntax tree the cloning engine works on: statement and expression nodes, their
//! qualified types, and the declarations, declaration contexts and scopes they refer to.
//!
//! Nodes own their children. Declarations are shared between trees and are therefore kept in an
//! arena inside [`AstContext`](context::AstContext) and referenced by [`DeclId`](decl::DeclId).

pub mod ast;
pub mod context;
pub mod decl;

pub use ast::support::{NodeMut, NodeRef};
pub use context::{AstContext, DeclContextId, LookupResult, ScopeId};
pub use decl::{Decl, DeclId, DeclTable, VarDecl};

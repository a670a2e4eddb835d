//! Clone-and-rebind engine for function bodies.
//!
//! [`StmtClone`] copies a statement or expression tree into a tree that shares no node with its
//! source, cloning local variables through the semantic-action service and recording each
//! original-to-clone pair in a [`DeclSubstitutionMap`]. Once a copy has been attached under a new
//! function, [`rebind`] (or a [`ReferencesUpdater`]) re-points the references inside it: first
//! through the substitution map, otherwise by looking the name up again in the new scope.
//!
//! ```
//! use astclone::{DeclSubstitutionMap, Sema, StmtClone};
//! use astclone_ir::ast::{Expr, Stmt};
//!
//! let mut sema = Sema::default();
//! let mut subst = DeclSubstitutionMap::new();
//! let body = Stmt::compound(vec![Stmt::ret(Some(Expr::int(0)))]);
//! let copy = StmtClone::new(&mut sema, &mut subst).clone_stmt(&body).unwrap();
//! assert_eq!(copy.shape(), body.shape());
//! ```

mod decl_clone;
mod error;
pub mod guard;
mod references;
mod sema;
mod stmt_clone;
mod subst;
mod type_adapter;

pub use error::CloneError;
pub use references::{ReferencesUpdater, rebind};
pub use sema::{Sema, SemaActions};
pub use stmt_clone::StmtClone;
pub use subst::DeclSubstitutionMap;

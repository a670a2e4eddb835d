use astclone_ir::DeclId;
use thiserror::Error;

/// Reasons a clone or rebind operation aborts. No partial tree is ever returned alongside one of
/// these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CloneError {
    #[error("no cloning rule for statement kind `{kind}`")]
    UnsupportedStmt { kind: String },
    #[error("no cloning rule for expression kind `{kind}`")]
    UnsupportedExpr { kind: String },
    #[error("cannot clone {kind} declaration `{name}`; only local variables are supported")]
    UnsupportedDecl { kind: &'static str, name: String },
    #[error("variable-length array type has an unset element type")]
    UnsetArrayElement,
    #[error("declaration {0:?} has already been cloned")]
    AlreadyCloned(DeclId),
    #[error("declaration {0:?} does not exist")]
    UnknownDecl(DeclId),
}

impl CloneError {
    /// True for the "no rule for this kind" family of failures.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            CloneError::UnsupportedStmt { .. }
                | CloneError::UnsupportedExpr { .. }
                | CloneError::UnsupportedDecl { .. }
        )
    }
}

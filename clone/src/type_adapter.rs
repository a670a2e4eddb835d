//! Rebuilding types for cloned nodes.

use crate::{CloneError, SemaActions, StmtClone};
use astclone_ir::ast::{FunctionType, QualType, Type};

impl<S: SemaActions + ?Sized> StmtClone<'_, S> {
    /// Rebuilds `t` with the same qualifiers. An unset type stays unset. A variable-length
    /// array gets a freshly cloned size expression, so the copy never aliases the original's.
    pub(crate) fn ty(&mut self, t: &QualType) -> Result<QualType, CloneError> {
        let Some(typ) = t.typ.as_deref() else {
            return Ok(QualType::null());
        };
        let typ = match typ {
            Type::Void => Type::Void,
            Type::Prim(p) => Type::Prim(*p),
            Type::Complex(p) => Type::Complex(*p),
            Type::Pointer(inner) => Type::Pointer(self.ty(inner)?),
            Type::LValueReference(inner) => Type::LValueReference(self.ty(inner)?),
            Type::RValueReference(inner) => Type::RValueReference(self.ty(inner)?),
            Type::ConstantArray { elem, size } => Type::ConstantArray {
                elem: self.ty(elem)?,
                size: *size,
            },
            Type::IncompleteArray { elem } => Type::IncompleteArray {
                elem: self.ty(elem)?,
            },
            Type::VariableArray {
                elem,
                size,
                modifier,
            } => {
                if elem.is_null() {
                    return Err(CloneError::UnsetArrayElement);
                }
                Type::VariableArray {
                    elem: self.ty(elem)?,
                    size: Box::new(self.expr(size)?),
                    modifier: *modifier,
                }
            }
            Type::Function(f) => Type::Function(FunctionType {
                ret: self.ty(&f.ret)?,
                params: f
                    .params
                    .iter()
                    .map(|p| self.ty(p))
                    .collect::<Result<Vec<_>, CloneError>>()?,
                variadic: f.variadic,
            }),
            Type::Record(name) => Type::Record(name.clone()),
            Type::Enum(name) => Type::Enum(name.clone()),
            Type::Typedef(name) => Type::Typedef(name.clone()),
            Type::NullPtr => Type::NullPtr,
        };
        Ok(QualType::with_quals(typ, t.quals))
    }
}

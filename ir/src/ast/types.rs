//! Qualified types attached to expressions and declarations.
//!
//! A `QualType` whose `typ` is `None` is the *unset* type. Some front-end versions leave the type
//! of a handful of nodes unset; consumers treat that as a distinct state rather than an invariant
//! violation.
//!
//! Types are deliberately not `Clone`: a variable-length array embeds its size expression, and a
//! copy of the type must be a copy of that expression too. Use the cloning engine's type adapter.

use super::Expr;

#[derive(Debug, PartialEq)]
pub struct QualType {
    pub typ: Option<Box<Type>>,
    pub quals: Qualifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_restrict: bool,
}

#[derive(Debug, PartialEq)]
pub enum Type {
    Void,

    Prim(PrimType),

    Complex(PrimType),

    Pointer(QualType),
    LValueReference(QualType),
    RValueReference(QualType),

    // constant size array
    ConstantArray {
        elem: QualType,
        size: u64,
    },
    // array type with no size given
    IncompleteArray {
        elem: QualType,
    },
    // array whose extent is computed at runtime
    VariableArray {
        elem: QualType,
        size: Box<Expr>,
        modifier: ArraySizeModifier,
    },

    Function(FunctionType),

    // named types, by spelling
    Record(String),
    Enum(String),
    Typedef(String),

    NullPtr,
}

#[derive(Debug, PartialEq)]
pub struct FunctionType {
    pub ret: QualType,
    pub params: Vec<QualType>,
    pub variadic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArraySizeModifier {
    #[default]
    Normal,
    // `T a[static n]`
    Static,
    // `T a[*]`
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimType {
    Bool,
    Char,

    // signed
    SChar,
    Short,
    Int,
    Long,
    LongLong,

    // unsigned
    UChar,
    UShort,
    UInt,
    ULong,
    ULongLong,

    // Clang specific types
    Int128,
    UInt128,

    // character types beyond `char`
    WChar,
    Char16,
    Char32,

    // floating point types
    Float,
    Double,
    LongDouble,
    Half,
    BFloat16,
}

impl Qualifiers {
    pub fn new(is_const: bool, is_volatile: bool, is_restrict: bool) -> Self {
        Self {
            is_const,
            is_volatile,
            is_restrict,
        }
    }

    pub fn constant() -> Self {
        Self::new(true, false, false)
    }
}

impl QualType {
    /// An unqualified type.
    pub fn new(typ: Type) -> Self {
        Self::with_quals(typ, Qualifiers::default())
    }

    pub fn with_quals(typ: Type, quals: Qualifiers) -> Self {
        Self {
            typ: Some(Box::new(typ)),
            quals,
        }
    }

    /// The unset type.
    pub fn null() -> Self {
        Self {
            typ: None,
            quals: Qualifiers::default(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.typ.is_none()
    }

    pub fn prim(p: PrimType) -> Self {
        Self::new(Type::Prim(p))
    }

    pub fn pointer_to(pointee: QualType) -> Self {
        Self::new(Type::Pointer(pointee))
    }

    pub fn lvalue_ref_to(referee: QualType) -> Self {
        Self::new(Type::LValueReference(referee))
    }

    /// `const char`
    pub fn const_char() -> Self {
        Self::with_quals(Type::Prim(PrimType::Char), Qualifiers::constant())
    }

    /// `const char *`
    pub fn const_char_ptr() -> Self {
        Self::pointer_to(Self::const_char())
    }

    /// The type of an ordinary narrow string literal holding `len` bytes plus the terminator.
    pub fn string_literal(len: usize) -> Self {
        Self::new(Type::ConstantArray {
            elem: Self::const_char(),
            size: len as u64 + 1,
        })
    }

    /// Strips one level of reference-ness, like Clang's `getNonReferenceType`.
    pub fn non_reference(&self) -> &QualType {
        match self.typ.as_deref() {
            Some(Type::LValueReference(inner)) | Some(Type::RValueReference(inner)) => inner,
            _ => self,
        }
    }

    pub fn is_variable_array(&self) -> bool {
        matches!(self.typ.as_deref(), Some(Type::VariableArray { .. }))
    }

    /// Whether a variable-length array appears anywhere inside this type.
    pub fn contains_variable_array(&self) -> bool {
        match self.typ.as_deref() {
            None => false,
            Some(Type::VariableArray { .. }) => true,
            Some(Type::Pointer(inner))
            | Some(Type::LValueReference(inner))
            | Some(Type::RValueReference(inner))
            | Some(Type::ConstantArray { elem: inner, .. })
            | Some(Type::IncompleteArray { elem: inner }) => inner.contains_variable_array(),
            Some(Type::Function(f)) => {
                f.ret.contains_variable_array()
                    || f.params.iter().any(QualType::contains_variable_array)
            }
            Some(_) => false,
        }
    }
}

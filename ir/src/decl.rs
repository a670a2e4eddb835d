/*
 *  Declarations referenced from statement and expression nodes.
 *
 *  Declarations live in a `DeclTable` arena and are named by `DeclId`.
 *  A declaration is owned by the context that introduces it; this
 *  crate never removes one once it has been added.
 */

use crate::ast::{Expr, QualType, SourceLoc};
use crate::context::DeclContextId;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Copy, Clone)]
pub struct DeclId(pub u64);

#[derive(Debug)]
pub enum Decl {
    Var(VarDecl),
    Param(VarDecl),
    Function(FunctionDecl),
    Field(NamedDecl),
    EnumConstant(NamedDecl),
    Typedef(NamedDecl),
    Record(NamedDecl),
    Label(NamedDecl),
}

#[derive(Debug)]
pub struct VarDecl {
    pub name: String,
    pub ty: QualType,
    pub storage: StorageClass,
    pub tls: ThreadStorage,
    pub init: Option<Box<Expr>>,
    pub init_style: InitStyle,
    pub context: DeclContextId,
    pub loc: SourceLoc,
    pub referenced: bool,
    pub used: bool,
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub ty: QualType,
    pub context: DeclContextId,
    pub loc: SourceLoc,
    pub referenced: bool,
    pub used: bool,
}

// Everything that carries little more than a name.  `ty` is unset for
// kinds that have no value type (labels, records, typedefs).
#[derive(Debug)]
pub struct NamedDecl {
    pub name: String,
    pub ty: QualType,
    pub context: DeclContextId,
    pub loc: SourceLoc,
    pub referenced: bool,
    pub used: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageClass {
    #[default]
    None,
    Extern,
    Static,
    PrivateExtern,
    Auto,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadStorage {
    #[default]
    None,
    // `__thread`
    Gnu,
    // `thread_local`
    Cxx11,
    // `_Thread_local`
    C11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitStyle {
    // `T x = init;`
    #[default]
    Copy,
    // `T x(init);`
    Call,
    // `T x{init};`
    List,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: QualType, context: DeclContextId) -> Self {
        Self {
            name: name.into(),
            ty,
            storage: StorageClass::None,
            tls: ThreadStorage::None,
            init: None,
            init_style: InitStyle::Copy,
            context,
            loc: SourceLoc::default(),
            referenced: false,
            used: false,
        }
    }

    /// Direct initialization is anything but the `=` form.
    pub fn is_direct_init(&self) -> bool {
        self.init_style != InitStyle::Copy
    }
}

impl NamedDecl {
    pub fn new(name: impl Into<String>, ty: QualType, context: DeclContextId) -> Self {
        Self {
            name: name.into(),
            ty,
            context,
            loc: SourceLoc::default(),
            referenced: false,
            used: false,
        }
    }
}

impl Decl {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Var(_) => "Var",
            Decl::Param(_) => "ParmVar",
            Decl::Function(_) => "Function",
            Decl::Field(_) => "Field",
            Decl::EnumConstant(_) => "EnumConstant",
            Decl::Typedef(_) => "Typedef",
            Decl::Record(_) => "Record",
            Decl::Label(_) => "Label",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Decl::Var(v) | Decl::Param(v) => &v.name,
            Decl::Function(f) => &f.name,
            Decl::Field(n)
            | Decl::EnumConstant(n)
            | Decl::Typedef(n)
            | Decl::Record(n)
            | Decl::Label(n) => &n.name,
        }
    }

    pub fn context(&self) -> DeclContextId {
        match self {
            Decl::Var(v) | Decl::Param(v) => v.context,
            Decl::Function(f) => f.context,
            Decl::Field(n)
            | Decl::EnumConstant(n)
            | Decl::Typedef(n)
            | Decl::Record(n)
            | Decl::Label(n) => n.context,
        }
    }

    pub fn ty(&self) -> &QualType {
        match self {
            Decl::Var(v) | Decl::Param(v) => &v.ty,
            Decl::Function(f) => &f.ty,
            Decl::Field(n)
            | Decl::EnumConstant(n)
            | Decl::Typedef(n)
            | Decl::Record(n)
            | Decl::Label(n) => &n.ty,
        }
    }

    pub fn ty_mut(&mut self) -> &mut QualType {
        match self {
            Decl::Var(v) | Decl::Param(v) => &mut v.ty,
            Decl::Function(f) => &mut f.ty,
            Decl::Field(n)
            | Decl::EnumConstant(n)
            | Decl::Typedef(n)
            | Decl::Record(n)
            | Decl::Label(n) => &mut n.ty,
        }
    }

    /// Whether this declaration denotes a value, i.e. can be the target of a `DeclRef`.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            Decl::Var(_)
                | Decl::Param(_)
                | Decl::Function(_)
                | Decl::Field(_)
                | Decl::EnumConstant(_)
        )
    }

    pub fn is_used(&self) -> bool {
        match self {
            Decl::Var(v) | Decl::Param(v) => v.used,
            Decl::Function(f) => f.used,
            Decl::Field(n)
            | Decl::EnumConstant(n)
            | Decl::Typedef(n)
            | Decl::Record(n)
            | Decl::Label(n) => n.used,
        }
    }

    /// Sets both the "referenced" and the "used" markers.
    pub fn set_used(&mut self) {
        let (referenced, used) = match self {
            Decl::Var(v) | Decl::Param(v) => (&mut v.referenced, &mut v.used),
            Decl::Function(f) => (&mut f.referenced, &mut f.used),
            Decl::Field(n)
            | Decl::EnumConstant(n)
            | Decl::Typedef(n)
            | Decl::Record(n)
            | Decl::Label(n) => (&mut n.referenced, &mut n.used),
        };
        *referenced = true;
        *used = true;
    }

    pub fn as_var(&self) -> Option<&VarDecl> {
        match self {
            Decl::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_var_mut(&mut self) -> Option<&mut VarDecl> {
        match self {
            Decl::Var(v) => Some(v),
            _ => None,
        }
    }
}

/// Arena of declarations. Ids are handed out from a counter and never reused.
#[derive(Debug)]
pub struct DeclTable {
    id_count: u64,
    decls: HashMap<DeclId, Decl>,
}

impl Default for DeclTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclTable {
    pub fn new() -> Self {
        Self {
            id_count: 1, // is a uid assignment counter, not necc. count
            decls: HashMap::new(),
        }
    }

    pub fn add(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.id_count);
        self.id_count += 1;
        self.decls.insert(id, decl);
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(&id)
    }

    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut Decl> {
        self.decls.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

impl Index<DeclId> for DeclTable {
    type Output = Decl;

    fn index(&self, index: DeclId) -> &Decl {
        self.decls
            .get(&index)
            .unwrap_or_else(|| panic!("could not find declaration id: {index:?}"))
    }
}

impl IndexMut<DeclId> for DeclTable {
    fn index_mut(&mut self, index: DeclId) -> &mut Decl {
        self.decls
            .get_mut(&index)
            .unwrap_or_else(|| panic!("could not find declaration id: {index:?}"))
    }
}

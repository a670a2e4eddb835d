/*
 *  This file contains the node data structures for the engine's
 *  view of a C/C++ function body.
 *
 *  Original Intentions when creating this file:
 *  - Nodes own their children outright; a tree never shares a node
 *    with another tree.  For that reason neither `Stmt` nor `Expr`
 *    implements `Clone`: copies are made by the cloning engine, which
 *    knows how to handle declarations and variable-length array types.
 *  - Declarations are not stored in the tree.  Nodes refer to them
 *    through `DeclId` handles into the `DeclTable` of an `AstContext`.
 *  - Builders, traversal helpers and the shape summary used by tests
 *    live in `support`, not here.
 *
 *  Kind names and payloads follow Clang's statement classes closely,
 *  since the trees this crate models come out of Clang.
 */

pub mod support;
pub mod types;

use crate::decl::DeclId;
pub use types::*;

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Copy, Clone, Default)]
pub struct SourceLoc {
    pub file: u32,
    pub line: u32,
    pub col: u32,
}

#[derive(Eq, PartialEq, Hash, Debug, Copy, Clone, Default)]
pub struct SourceRange {
    pub begin: SourceLoc,
    pub end: SourceLoc,
}

impl SourceRange {
    pub fn at(loc: SourceLoc) -> Self {
        Self { begin: loc, end: loc }
    }
}

#[derive(Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub range: SourceRange,
}

#[derive(Debug, PartialEq)]
pub enum StmtKind {
    Compound(Vec<Stmt>),
    Null,

    Expr(Box<Expr>),
    // every declaration in a `DeclStmt`, in source order
    Decl(Vec<DeclId>),

    If {
        init: Option<Box<Stmt>>,
        cond_var: Option<DeclId>,
        cond: Box<Expr>,
        then: Box<Stmt>,
        els: Option<Box<Stmt>>,
        is_constexpr: bool,
    },
    While {
        cond_var: Option<DeclId>,
        cond: Box<Expr>,
        body: Box<Stmt>,
    },
    Do {
        body: Box<Stmt>,
        cond: Box<Expr>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Box<Expr>>,
        cond_var: Option<DeclId>,
        inc: Option<Box<Expr>>,
        body: Box<Stmt>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        cond_var: Option<DeclId>,
        cond: Box<Expr>,
        body: Box<Stmt>,
    },
    // `case lhs ... rhs:` where the range form is a GNU extension
    Case {
        lhs: Box<Expr>,
        rhs: Option<Box<Expr>>,
        sub: Box<Stmt>,
    },
    Default {
        sub: Box<Stmt>,
    },
    Break,
    Continue,

    Return(Option<Box<Expr>>),

    Goto {
        label: DeclId,
    },
    Label {
        label: DeclId,
        sub: Box<Stmt>,
    },

    Try {
        block: Box<Stmt>,
        handlers: Vec<Stmt>,
    },
    // `exception` is None for `catch (...)`
    Catch {
        exception: Option<DeclId>,
        handler: Box<Stmt>,
    },

    // A construct the front end produced but which has no cloning rule.
    Other {
        kind: String,
    },
}

#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: QualType,
    pub value_kind: ValueKind,
    pub object_kind: ObjectKind,
    pub range: SourceRange,
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        fp: FpOptions,
    },
    CompoundAssign {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        computation_lhs_ty: QualType,
        computation_result_ty: QualType,
        fp: FpOptions,
    },
    Unary {
        op: UnaryOp,
        sub: Box<Expr>,
        can_overflow: bool,
    },

    DeclRef {
        decl: DeclId,
        name: String,
        refers_to_enclosing: bool,
        non_odr_use: bool,
    },

    IntegerLiteral {
        value: u64,
    },
    FloatingLiteral {
        value: f64,
        exact: bool,
        semantics: FloatSemantics,
    },
    CharacterLiteral {
        value: u32,
        kind: CharKind,
    },
    StringLiteral(StringLiteral),
    ImaginaryLiteral {
        sub: Box<Expr>,
    },
    BoolLiteral(bool),
    NullPtrLiteral,
    GnuNull,

    // `__func__` and friends; `function_name` is the string literal the
    // front end attached, which some Clang versions leave out
    Predefined {
        ident: PredefinedIdent,
        function_name: Option<Box<Expr>>,
    },
    // `__builtin_FILE()` and friends; `value` is the evaluated payload
    SourceLoc {
        ident: SourceLocIdent,
        value: Option<Box<Expr>>,
    },

    Paren {
        sub: Box<Expr>,
    },
    ArraySubscript {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    // `obj.field` or `obj->field`
    Member {
        base: Box<Expr>,
        is_arrow: bool,
        member: DeclId,
        name: String,
    },

    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    CudaKernelCall {
        callee: Box<Expr>,
        config: Box<Expr>,
        args: Vec<Expr>,
    },
    OperatorCall {
        op: OverloadedOperator,
        callee: Box<Expr>,
        args: Vec<Expr>,
        fp: FpOptions,
    },
    MemberCall {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    ImplicitCast {
        cast: CastKind,
        sub: Box<Expr>,
    },
    CStyleCast {
        cast: CastKind,
        sub: Box<Expr>,
        written: QualType,
    },
    // static_cast, dynamic_cast, reinterpret_cast and const_cast
    NamedCast {
        which: NamedCastKind,
        cast: CastKind,
        sub: Box<Expr>,
        written: QualType,
    },
    // `T(x)`
    FunctionalCast {
        cast: CastKind,
        sub: Box<Expr>,
        written: QualType,
    },

    Construct {
        ctor: DeclId,
        args: Vec<Expr>,
        flags: ConstructFlags,
        kind: ConstructionKind,
    },
    TemporaryObject {
        ctor: DeclId,
        args: Vec<Expr>,
        flags: ConstructFlags,
        written: QualType,
    },
    DefaultArg {
        param: DeclId,
    },
    ExprWithCleanups {
        sub: Box<Expr>,
        side_effects: bool,
    },
    Constant {
        sub: Box<Expr>,
    },
    MaterializeTemporary {
        sub: Option<Box<Expr>>,
        bound_to_lvalue_ref: bool,
    },

    // `cond ? then : els`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        els: Box<Expr>,
    },
    // GNU `&&label`
    AddrLabel {
        label: DeclId,
    },
    // GNU `({ ... })`
    StmtExpr {
        sub: Box<Stmt>,
        template_depth: u32,
    },
    // `__builtin_choose_expr(cond, lhs, rhs)`
    Choose {
        cond: Box<Expr>,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        cond_true: bool,
    },
    VaArg {
        sub: Box<Expr>,
        written: QualType,
        ms_abi: bool,
    },
    ImplicitValueInit,
    // `T()` for a scalar `T`
    ScalarValueInit,
    ExtVectorElement {
        base: Box<Expr>,
        accessor: String,
    },
    This {
        implicit: bool,
    },
    Throw {
        sub: Option<Box<Expr>>,
        thrown_var_in_scope: bool,
    },
    SubstNonTypeTemplateParm {
        replacement: Box<Expr>,
        index: u32,
        pack_index: Option<u32>,
        ref_param: bool,
    },
    PseudoObject {
        syntactic: Box<Expr>,
        semantics: Vec<Expr>,
        result_index: Option<usize>,
    },

    InitList {
        inits: Vec<Expr>,
        union_field: Option<DeclId>,
    },
    // `[i].f = init`; index designators refer into `index_exprs`
    DesignatedInit {
        designators: Vec<Designator>,
        index_exprs: Vec<Expr>,
        init: Box<Expr>,
        gnu_syntax: bool,
    },
    // sizeof, alignof, ... applied either to a type or to an expression
    UnaryExprOrTypeTrait {
        trait_kind: UnaryTraitKind,
        arg: TraitArg,
    },
    UnresolvedLookup {
        name: String,
        requires_adl: bool,
        decls: Vec<DeclId>,
    },
    ShuffleVector {
        exprs: Vec<Expr>,
    },

    // A construct the front end produced but which has no cloning rule.
    Other {
        kind: String,
    },
}

#[derive(Debug, PartialEq)]
pub struct StringLiteral {
    pub bytes: Vec<u8>,
    pub kind: StringKind,
    pub pascal: bool,
    // one location per concatenated token
    pub token_locs: Vec<SourceLoc>,
}

#[derive(Debug, PartialEq)]
pub enum TraitArg {
    Type(QualType),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Designator {
    Field(String),
    // index into `index_exprs`
    Index(usize),
    // GNU `[lo ... hi]`; both indices refer into `index_exprs`
    Range(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstructFlags {
    pub elidable: bool,
    pub multiple_candidates: bool,
    pub list_init: bool,
    pub std_init_list: bool,
    pub zero_init: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FpOptions {
    pub contract: bool,
    pub fast_math: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    #[default]
    PRValue,
    LValue,
    XValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectKind {
    #[default]
    Ordinary,
    BitField,
    VectorComponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    AddressOf, // &x
    Deref,     // *x
    Plus,      // +x
    PostInc,   // x++
    PreInc,    // ++x
    Minus,     // -x
    PostDec,   // x--
    PreDec,    // --x
    BitNot,    // ~x
    Not,       // !x
    Real,      // [GNU C] __real x
    Imag,      // [GNU C] __imag x
    Extension, // [GNU C] __extension__ x
    Coawait,   // co_await x
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    PtrMemD, // .*
    PtrMemI, // ->*
    Mult,    // *
    Div,     // /
    Mod,     // %
    Add,     // +
    Sub,     // -
    ShiftL,  // <<
    ShiftR,  // >>
    Cmp,     // <=>
    Lt,      // <
    Gt,      // >
    Le,      // <=
    Ge,      // >=
    Eq,      // ==
    Neq,     // !=
    BitAnd,  // &
    BitXor,  // ^
    BitOr,   // |
    And,     // &&
    Or,      // ||

    AssignAdd,    // +=
    AssignSub,    // -=
    AssignMult,   // *=
    AssignDiv,    // /=
    AssignMod,    // %=
    AssignBitXor, // ^=
    AssignShiftL, // <<=
    AssignShiftR, // >>=
    AssignBitOr,  // |=
    AssignBitAnd, // &=

    Assign, // =
    Comma,  // ,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadedOperator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Exclaim,
    Equal,
    Less,
    Greater,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    EqualEqual,
    ExclaimEqual,
    LessEqual,
    GreaterEqual,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Arrow,
    Call,
    Subscript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Dependent,
    BitCast,
    LValueToRValue,
    NoOp,
    BaseToDerived,
    DerivedToBase,
    ArrayToPointerDecay,
    FunctionToPointerDecay,
    NullToPointer,
    ConstructorConversion,
    UserDefinedConversion,
    IntegralCast,
    IntegralToBoolean,
    IntegralToFloating,
    IntegralToPointer,
    PointerToIntegral,
    PointerToBoolean,
    FloatingToIntegral,
    FloatingToBoolean,
    FloatingCast,
    ToVoid,
    // any cast kind this model does not name
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedCastKind {
    Static,
    Dynamic,
    Reinterpret,
    Const,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionKind {
    Complete,
    NonVirtualBase,
    VirtualBase,
    Delegating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryTraitKind {
    SizeOf,
    AlignOf,
    PreferredAlignOf,
    VecStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredefinedIdent {
    Func,           // __func__
    Function,       // __FUNCTION__
    FuncDName,      // __FUNCDNAME__
    FuncSig,        // __FUNCSIG__
    PrettyFunction, // __PRETTY_FUNCTION__
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLocIdent {
    File,     // __builtin_FILE()
    FileName, // __builtin_FILE_NAME()
    Function, // __builtin_FUNCTION()
    Line,     // __builtin_LINE()
    Column,   // __builtin_COLUMN()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringKind {
    #[default]
    Ordinary,
    Wide,
    Utf8,
    Utf16,
    Utf32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharKind {
    #[default]
    Ascii,
    Wide,
    Utf8,
    Utf16,
    Utf32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatSemantics {
    IeeeHalf,
    IeeeSingle,
    #[default]
    IeeeDouble,
    X87DoubleExtended,
    IeeeQuad,
}

use super::*;
use crate::Sema;
use astclone_core::test_util::init_logging;
use astclone_ir::decl::{Decl, InitStyle, StorageClass, ThreadStorage, VarDecl};
use astclone_ir::{DeclContextId, ScopeId};

struct Fixture {
    sema: Sema,
    f: DeclContextId,
    scope: ScopeId,
}

fn fixture() -> Fixture {
    init_logging();
    let mut sema = Sema::default();
    let f = sema.ast_mut().contexts.add_function("f");
    let scope = sema.enter_scope();
    Fixture { sema, f, scope }
}

fn int() -> QualType {
    QualType::prim(PrimType::Int)
}

fn loc(line: u32, col: u32) -> SourceRange {
    SourceRange::at(SourceLoc { file: 1, line, col })
}

fn var(sema: &mut Sema, name: &str, ty: QualType, context: DeclContextId) -> DeclId {
    sema.register_var_decl(VarDecl::new(name, ty, context))
}

fn read(decl: DeclId, name: &str) -> Expr {
    Expr::implicit_cast(
        CastKind::LValueToRValue,
        Expr::decl_ref(decl, name, int()),
        int(),
    )
}

fn vla_of(elem: QualType, size: Expr) -> QualType {
    QualType::new(Type::VariableArray {
        elem,
        size: Box::new(size),
        modifier: ArraySizeModifier::Normal,
    })
}

// {
//   if (1) ; else break;
//   while (1) { continue; }
//   do ; while (0);
//   for (;;) ;
//   switch (2) { case 1 ... 3: break; default: ; }
//   try { } catch (...) { }
//   L: goto L;
//   return 1 ? 2 : 3;
// }
fn control_flow() -> Stmt {
    let label = DeclId(900);
    let null = || Stmt::new(StmtKind::Null);
    Stmt::compound(vec![
        Stmt::new(StmtKind::If {
            init: None,
            cond_var: None,
            cond: Box::new(Expr::int(1)),
            then: Box::new(null()),
            els: Some(Box::new(Stmt::new(StmtKind::Break))),
            is_constexpr: false,
        })
        .with_range(loc(2, 3)),
        Stmt::new(StmtKind::While {
            cond_var: None,
            cond: Box::new(Expr::int(1)),
            body: Box::new(Stmt::compound(vec![Stmt::new(StmtKind::Continue)])),
        }),
        Stmt::new(StmtKind::Do {
            body: Box::new(null()),
            cond: Box::new(Expr::int(0)),
        }),
        Stmt::new(StmtKind::For {
            init: None,
            cond: None,
            cond_var: None,
            inc: None,
            body: Box::new(null()),
        }),
        Stmt::new(StmtKind::Switch {
            init: None,
            cond_var: None,
            cond: Box::new(Expr::int(2)),
            body: Box::new(Stmt::compound(vec![
                Stmt::new(StmtKind::Case {
                    lhs: Box::new(Expr::int(1)),
                    rhs: Some(Box::new(Expr::int(3))),
                    sub: Box::new(Stmt::new(StmtKind::Break)),
                }),
                Stmt::new(StmtKind::Default {
                    sub: Box::new(null()),
                }),
            ])),
        }),
        Stmt::new(StmtKind::Try {
            block: Box::new(Stmt::compound(vec![])),
            handlers: vec![Stmt::new(StmtKind::Catch {
                exception: None,
                handler: Box::new(Stmt::compound(vec![])),
            })],
        }),
        Stmt::new(StmtKind::Label {
            label,
            sub: Box::new(Stmt::new(StmtKind::Goto { label })),
        }),
        Stmt::ret(Some(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(Expr::int(1)),
                then: Box::new(Expr::int(2)),
                els: Box::new(Expr::int(3)),
            },
            int(),
            ValueKind::PRValue,
        ))),
    ])
    .with_range(loc(1, 1))
}

#[test]
fn control_flow_is_copied_exactly() {
    let mut fx = fixture();
    let mut subst = DeclSubstitutionMap::new();
    let source = control_flow();

    let cloned = StmtClone::new(&mut fx.sema, &mut subst)
        .clone_stmt(&source)
        .unwrap();

    assert_eq!(cloned, source);
    assert_eq!(cloned.shape(), source.shape());
    assert!(subst.is_empty());
}

#[test]
fn expression_payloads_survive() {
    let mut fx = fixture();
    let x = var(&mut fx.sema, "x", int(), fx.f);
    let field = DeclId(901);
    let callee_ty = QualType::pointer_to(QualType::new(Type::Function(FunctionType {
        ret: int(),
        params: vec![int(), QualType::prim(PrimType::Double)],
        variadic: true,
    })));
    let callee = Expr::implicit_cast(
        CastKind::FunctionToPointerDecay,
        Expr::decl_ref(DeclId(902), "g", QualType::null()),
        callee_ty,
    );
    let args = vec![
        Expr::new(
            ExprKind::CompoundAssign {
                op: BinOp::AssignAdd,
                lhs: Box::new(Expr::decl_ref(x, "x", int())),
                rhs: Box::new(Expr::int(2)),
                computation_lhs_ty: int(),
                computation_result_ty: int(),
                fp: FpOptions::default(),
            },
            int(),
            ValueKind::LValue,
        ),
        Expr::new(
            ExprKind::CStyleCast {
                cast: CastKind::IntegralToFloating,
                sub: Box::new(Expr::new(
                    ExprKind::UnaryExprOrTypeTrait {
                        trait_kind: UnaryTraitKind::SizeOf,
                        arg: TraitArg::Type(QualType::with_quals(
                            Type::Prim(PrimType::Long),
                            Qualifiers::new(true, true, false),
                        )),
                    },
                    QualType::prim(PrimType::ULong),
                    ValueKind::PRValue,
                )),
                written: QualType::prim(PrimType::Double),
            },
            QualType::prim(PrimType::Double),
            ValueKind::PRValue,
        ),
        Expr::new(
            ExprKind::InitList {
                inits: vec![
                    Expr::new(
                        ExprKind::DesignatedInit {
                            designators: vec![Designator::Field("a".into()), Designator::Index(0)],
                            index_exprs: vec![Expr::int(4)],
                            init: Box::new(Expr::float(1.5)),
                            gnu_syntax: false,
                        },
                        QualType::prim(PrimType::Double),
                        ValueKind::PRValue,
                    ),
                    Expr::new(ExprKind::ImplicitValueInit, int(), ValueKind::PRValue),
                ],
                union_field: Some(field),
            },
            QualType::new(Type::Record("S".into())),
            ValueKind::PRValue,
        ),
        Expr::new(
            ExprKind::Member {
                base: Box::new(Expr::decl_ref(DeclId(903), "s", QualType::null())),
                is_arrow: true,
                member: field,
                name: "a".into(),
            },
            QualType::prim(PrimType::Double),
            ValueKind::LValue,
        ),
        Expr::new(
            ExprKind::StmtExpr {
                sub: Box::new(Stmt::compound(vec![Stmt::expr(Expr::new(
                    ExprKind::CharacterLiteral {
                        value: u32::from(b'q'),
                        kind: CharKind::Ascii,
                    },
                    QualType::prim(PrimType::Char),
                    ValueKind::PRValue,
                ))])),
                template_depth: 0,
            },
            QualType::prim(PrimType::Char),
            ValueKind::PRValue,
        ),
        Expr::new(
            ExprKind::Throw {
                sub: None,
                thrown_var_in_scope: false,
            },
            QualType::new(Type::Void),
            ValueKind::PRValue,
        ),
        Expr::string("hi", SourceLoc::default()),
    ];
    let source = Expr::call(callee, args, int()).with_range(loc(4, 9));

    let cloned = StmtClone::new(&mut fx.sema, &mut subst_empty())
        .clone_expr(&source)
        .unwrap();

    assert_eq!(cloned, source);
}

fn subst_empty() -> DeclSubstitutionMap {
    DeclSubstitutionMap::new()
}

#[test]
fn unset_type_stays_unset() {
    let mut fx = fixture();
    let source = Expr::new(ExprKind::GnuNull, QualType::null(), ValueKind::PRValue);
    let cloned = StmtClone::new(&mut fx.sema, &mut subst_empty())
        .clone_expr(&source)
        .unwrap();
    assert!(cloned.ty.is_null());
}

#[test]
fn variable_array_size_is_not_shared() {
    let mut fx = fixture();
    let n = var(&mut fx.sema, "n", int(), fx.f);
    let source = QualType::with_quals(
        Type::VariableArray {
            elem: QualType::prim(PrimType::Double),
            size: Box::new(read(n, "n")),
            modifier: ArraySizeModifier::Static,
        },
        Qualifiers::constant(),
    );

    let cloned = StmtClone::new(&mut fx.sema, &mut subst_empty())
        .clone_type(&source)
        .unwrap();

    assert_eq!(cloned, source);
    let (Some(Type::VariableArray { size: a, .. }), Some(Type::VariableArray { size: b, .. })) =
        (source.typ.as_deref(), cloned.typ.as_deref())
    else {
        panic!("expected variable arrays");
    };
    assert!(!std::ptr::eq(&**a, &**b));
}

#[test]
fn variable_array_with_unset_element_fails() {
    let mut fx = fixture();
    let source = vla_of(QualType::null(), Expr::int(3));
    assert_eq!(
        StmtClone::new(&mut fx.sema, &mut subst_empty()).clone_type(&source),
        Err(CloneError::UnsetArrayElement)
    );
}

#[test]
fn declarations_are_cloned_with_their_attributes() {
    let mut fx = fixture();
    let mut decl = VarDecl::new("counter", int(), fx.f);
    decl.storage = StorageClass::Static;
    decl.tls = ThreadStorage::Gnu;
    decl.init_style = InitStyle::List;
    decl.loc = SourceLoc {
        file: 1,
        line: 3,
        col: 14,
    };
    let original = fx.sema.register_var_decl(decl);
    fx.sema
        .add_initializer(original, Box::new(Expr::int(7)), InitStyle::List);

    let mut subst = DeclSubstitutionMap::new();
    let clone = StmtClone::new(&mut fx.sema, &mut subst)
        .clone_decl(original)
        .unwrap();

    assert_ne!(clone, original);
    assert_eq!(subst.get(original), Some(clone));
    let Some(Decl::Var(copy)) = fx.sema.ast().decls.get(clone) else {
        panic!("clone is not a variable");
    };
    assert_eq!(copy.name, "counter");
    assert_eq!(copy.ty, int());
    assert_eq!(copy.storage, StorageClass::Static);
    assert_eq!(copy.tls, ThreadStorage::Gnu);
    assert_eq!(copy.context, fx.f);
    assert_eq!(copy.loc.col, 14);
    assert!(copy.is_direct_init());
    assert_eq!(copy.init.as_deref(), Some(&Expr::int(7)));

    // the source keeps its own type and initializer
    let source = fx.sema.ast().decls[original].as_var().unwrap();
    assert_eq!(source.ty, int());
    assert_eq!(source.init.as_deref(), Some(&Expr::int(7)));
}

#[test]
fn self_referencing_initializer_points_at_clone() {
    // int x = sizeof(x);
    let mut fx = fixture();
    let x = var(&mut fx.sema, "x", int(), fx.f);
    let init = Expr::new(
        ExprKind::UnaryExprOrTypeTrait {
            trait_kind: UnaryTraitKind::SizeOf,
            arg: TraitArg::Expr(Box::new(Expr::decl_ref(x, "x", int()))),
        },
        QualType::prim(PrimType::ULong),
        ValueKind::PRValue,
    );
    fx.sema.add_initializer(x, Box::new(init), InitStyle::Copy);

    let mut subst = DeclSubstitutionMap::new();
    let cloned = StmtClone::new(&mut fx.sema, &mut subst)
        .clone_stmt(&Stmt::decl(vec![x]))
        .unwrap();

    let StmtKind::Decl(decls) = &cloned.kind else {
        panic!("expected a declaration statement");
    };
    let x2 = decls[0];
    let init = fx.sema.ast().decls[x2].as_var().unwrap().init.as_deref();
    let Some(ExprKind::UnaryExprOrTypeTrait {
        arg: TraitArg::Expr(operand),
        ..
    }) = init.map(|e| &e.kind)
    else {
        panic!("initializer was not cloned");
    };
    assert!(matches!(operand.kind, ExprKind::DeclRef { decl, .. } if decl == x2));
}

#[test]
fn declaration_groups_keep_their_order() {
    let mut fx = fixture();
    let a = var(&mut fx.sema, "a", int(), fx.f);
    let b = var(&mut fx.sema, "b", int(), fx.f);
    let c = var(&mut fx.sema, "c", int(), fx.f);

    let mut subst = DeclSubstitutionMap::new();
    let cloned = StmtClone::new(&mut fx.sema, &mut subst)
        .clone_stmt(&Stmt::decl(vec![a, b, c]))
        .unwrap();

    let StmtKind::Decl(decls) = &cloned.kind else {
        panic!("expected a declaration statement");
    };
    let names: Vec<_> = decls
        .iter()
        .map(|d| fx.sema.ast().decls[*d].name().to_string())
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert_eq!(subst.len(), 3);
}

#[test]
fn condition_variables_are_cloned() {
    // while (int v = 1) v;
    let mut fx = fixture();
    let v = var(&mut fx.sema, "v", int(), fx.f);
    fx.sema
        .add_initializer(v, Box::new(Expr::int(1)), InitStyle::Copy);
    let source = Stmt::new(StmtKind::While {
        cond_var: Some(v),
        cond: Box::new(Expr::implicit_cast(
            CastKind::IntegralToBoolean,
            read(v, "v"),
            QualType::prim(PrimType::Bool),
        )),
        body: Box::new(Stmt::expr(read(v, "v"))),
    });

    let mut subst = DeclSubstitutionMap::new();
    let cloned = StmtClone::new(&mut fx.sema, &mut subst)
        .clone_stmt(&source)
        .unwrap();

    let v2 = subst.get(v).unwrap();
    let StmtKind::While { cond_var, body, .. } = &cloned.kind else {
        panic!("expected a while loop");
    };
    assert_eq!(*cond_var, Some(v2));
    assert_eq!(**body, Stmt::expr(read(v2, "v")));
}

#[test]
fn remapping_can_be_turned_off() {
    let mut fx = fixture();
    let x = var(&mut fx.sema, "x", int(), fx.f);
    let y = var(&mut fx.sema, "y", int(), fx.f);
    let mut subst: DeclSubstitutionMap = [(x, y)].into_iter().collect();
    let config = CloneConfig {
        remap_references: false,
        ..CloneConfig::default()
    };

    let cloned = StmtClone::new(&mut fx.sema, &mut subst)
        .with_config(&config)
        .clone_expr(&read(x, "x"))
        .unwrap();
    assert_eq!(cloned, read(x, "x"));

    let cloned = StmtClone::new(&mut fx.sema, &mut subst)
        .clone_expr(&read(x, "x"))
        .unwrap();
    assert_eq!(cloned, read(y, "y"));
}

#[test]
fn only_local_variables_can_be_cloned() {
    let mut fx = fixture();
    let tu = fx.sema.ast().contexts.translation_unit();
    let param = fx.sema.ast_mut().declare(
        Decl::Param(VarDecl::new("p", int(), fx.f)),
        Some(fx.scope),
    );
    let fun = fx.sema.ast_mut().declare(
        Decl::Function(astclone_ir::decl::FunctionDecl {
            name: "g".into(),
            ty: QualType::null(),
            context: tu,
            loc: SourceLoc::default(),
            referenced: false,
            used: false,
        }),
        None,
    );
    let mut subst = DeclSubstitutionMap::new();
    let mut cloner = StmtClone::new(&mut fx.sema, &mut subst);

    assert_eq!(
        cloner.clone_decl(param),
        Err(CloneError::UnsupportedDecl {
            kind: "ParmVar",
            name: "p".into()
        })
    );
    assert!(cloner.clone_decl(fun).unwrap_err().is_unsupported());
    assert_eq!(
        cloner.clone_decl(DeclId(4242)),
        Err(CloneError::UnknownDecl(DeclId(4242)))
    );
    assert_eq!(cloner.clone_decl_or_null(None), Ok(None));
}

#[test]
fn a_declaration_is_cloned_once() {
    let mut fx = fixture();
    let x = var(&mut fx.sema, "x", int(), fx.f);
    let before = fx.sema.ast().decls.len();
    let mut subst = DeclSubstitutionMap::new();
    let mut cloner = StmtClone::new(&mut fx.sema, &mut subst);

    cloner.clone_decl(x).unwrap();
    assert_eq!(cloner.clone_decl(x), Err(CloneError::AlreadyCloned(x)));
    assert_eq!(fx.sema.ast().decls.len(), before + 1);
}

#[test]
fn failure_leaves_source_declarations_intact() {
    // double a[n] = { <unsupported> };
    let mut fx = fixture();
    let n = var(&mut fx.sema, "n", int(), fx.f);
    let a = var(&mut fx.sema, "a", vla_of(QualType::prim(PrimType::Double), read(n, "n")), fx.f);
    let bad = Expr::new(
        ExprKind::Other {
            kind: "BlockExpr".into(),
        },
        QualType::null(),
        ValueKind::PRValue,
    );
    fx.sema.add_initializer(a, Box::new(bad), InitStyle::Copy);

    let mut subst = DeclSubstitutionMap::new();
    let result = StmtClone::new(&mut fx.sema, &mut subst).clone_stmt(&Stmt::decl(vec![a]));

    assert_eq!(
        result,
        Err(CloneError::UnsupportedExpr {
            kind: "BlockExpr".into()
        })
    );
    let source = fx.sema.ast().decls[a].as_var().unwrap();
    assert!(source.ty.is_variable_array());
    assert!(source.init.is_some());
}

#[test]
fn source_location_fallbacks() {
    let mut fx = fixture();
    let source = Expr::new(
        ExprKind::SourceLoc {
            ident: SourceLocIdent::File,
            value: None,
        },
        QualType::null(),
        ValueKind::PRValue,
    )
    .with_range(loc(12, 5));

    let cloned = StmtClone::new(&mut fx.sema, &mut subst_empty())
        .clone_expr(&source)
        .unwrap();

    assert_eq!(cloned.kind_name(), "SourceLocExpr");
    assert_eq!(cloned.ty, QualType::const_char());
    assert_eq!(cloned.range, source.range);
    let ExprKind::SourceLoc {
        value: Some(value), ..
    } = &cloned.kind
    else {
        panic!("no payload synthesized");
    };
    assert_eq!(**value, Expr::string("", source.range.begin));
}

#[test]
fn well_formed_predefined_is_copied() {
    let mut fx = fixture();
    let source = Expr::new(
        ExprKind::Predefined {
            ident: PredefinedIdent::PrettyFunction,
            function_name: Some(Box::new(Expr::string("void f(int)", SourceLoc::default()))),
        },
        QualType::string_literal(11),
        ValueKind::LValue,
    );
    let cloned = StmtClone::new(&mut fx.sema, &mut subst_empty())
        .clone_expr(&source)
        .unwrap();
    assert_eq!(cloned, source);
}

#[test]
fn unsupported_statement_aborts() {
    let mut fx = fixture();
    let source = Stmt::compound(vec![
        Stmt::ret(None),
        Stmt::new(StmtKind::Other {
            kind: "GCCAsmStmt".into(),
        }),
    ]);
    let err = StmtClone::new(&mut fx.sema, &mut subst_empty())
        .clone_stmt(&source)
        .unwrap_err();
    assert_eq!(
        err,
        CloneError::UnsupportedStmt {
            kind: "GCCAsmStmt".into()
        }
    );
}

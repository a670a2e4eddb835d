//! Clone and rebind a body imported from a clang JSON dump.

use astclone::{DeclSubstitutionMap, Sema, SemaActions, StmtClone, rebind};
use astclone_core::test_util::init_logging;
use astclone_ir::ast::{Expr, ExprKind, QualType, StmtKind};
use astclone_ir::{DeclId, NodeRef};

// void check(int x) {
//   int y = x * 2;
//   (y > 0) ? (void)0 : __assert_fail("y > 0", "t.c", 3, __PRETTY_FUNCTION__);
// }
//
// The predefined expression is dumped without its function name or type, as some clang
// versions do.
const CHECK: &str = r#"
{
  "id": "0x1", "kind": "TranslationUnitDecl",
  "inner": [
    {
      "id": "0x10", "kind": "FunctionDecl", "name": "check", "type": { "qualType": "void (int)" },
      "inner": [
        { "id": "0x11", "kind": "ParmVarDecl", "name": "x", "type": { "qualType": "int" } },
        {
          "id": "0x12", "kind": "CompoundStmt",
          "inner": [
            {
              "id": "0x13", "kind": "DeclStmt",
              "inner": [
                {
                  "id": "0x14", "kind": "VarDecl", "name": "y", "type": { "qualType": "int" }, "init": "c",
                  "inner": [
                    {
                      "id": "0x15", "kind": "BinaryOperator", "type": { "qualType": "int" },
                      "valueCategory": "prvalue", "opcode": "*",
                      "inner": [
                        {
                          "id": "0x16", "kind": "ImplicitCastExpr", "type": { "qualType": "int" },
                          "valueCategory": "prvalue", "castKind": "LValueToRValue",
                          "inner": [
                            {
                              "id": "0x17", "kind": "DeclRefExpr", "type": { "qualType": "int" }, "valueCategory": "lvalue",
                              "referencedDecl": { "id": "0x11", "kind": "ParmVarDecl", "name": "x", "type": { "qualType": "int" } }
                            }
                          ]
                        },
                        { "id": "0x18", "kind": "IntegerLiteral", "type": { "qualType": "int" }, "valueCategory": "prvalue", "value": "2" }
                      ]
                    }
                  ]
                }
              ]
            },
            {
              "id": "0x20", "kind": "ConditionalOperator", "type": { "qualType": "void" }, "valueCategory": "prvalue",
              "inner": [
                {
                  "id": "0x21", "kind": "ParenExpr", "type": { "qualType": "int" }, "valueCategory": "prvalue",
                  "inner": [
                    {
                      "id": "0x22", "kind": "BinaryOperator", "type": { "qualType": "int" },
                      "valueCategory": "prvalue", "opcode": ">",
                      "inner": [
                        {
                          "id": "0x23", "kind": "ImplicitCastExpr", "type": { "qualType": "int" },
                          "valueCategory": "prvalue", "castKind": "LValueToRValue",
                          "inner": [
                            {
                              "id": "0x24", "kind": "DeclRefExpr", "type": { "qualType": "int" }, "valueCategory": "lvalue",
                              "referencedDecl": { "id": "0x14", "kind": "VarDecl", "name": "y", "type": { "qualType": "int" } }
                            }
                          ]
                        },
                        { "id": "0x25", "kind": "IntegerLiteral", "type": { "qualType": "int" }, "valueCategory": "prvalue", "value": "0" }
                      ]
                    }
                  ]
                },
                {
                  "id": "0x26", "kind": "CStyleCastExpr", "type": { "qualType": "void" },
                  "valueCategory": "prvalue", "castKind": "ToVoid",
                  "inner": [
                    { "id": "0x27", "kind": "IntegerLiteral", "type": { "qualType": "int" }, "valueCategory": "prvalue", "value": "0" }
                  ]
                },
                {
                  "id": "0x28", "kind": "CallExpr", "type": { "qualType": "void" }, "valueCategory": "prvalue",
                  "inner": [
                    {
                      "id": "0x29", "kind": "ImplicitCastExpr",
                      "type": { "qualType": "void (*)(const char *, const char *, unsigned int, const char *)" },
                      "valueCategory": "prvalue", "castKind": "FunctionToPointerDecay",
                      "inner": [
                        {
                          "id": "0x2a", "kind": "DeclRefExpr",
                          "type": { "qualType": "void (const char *, const char *, unsigned int, const char *)" },
                          "valueCategory": "lvalue",
                          "referencedDecl": { "id": "0x90", "kind": "FunctionDecl", "name": "__assert_fail" }
                        }
                      ]
                    },
                    {
                      "id": "0x2b", "kind": "ImplicitCastExpr", "type": { "qualType": "const char *" },
                      "valueCategory": "prvalue", "castKind": "ArrayToPointerDecay",
                      "inner": [
                        { "id": "0x2c", "kind": "StringLiteral", "type": { "qualType": "char[6]" }, "valueCategory": "lvalue", "value": "\"y > 0\"" }
                      ]
                    },
                    {
                      "id": "0x2d", "kind": "ImplicitCastExpr", "type": { "qualType": "const char *" },
                      "valueCategory": "prvalue", "castKind": "ArrayToPointerDecay",
                      "inner": [
                        { "id": "0x2e", "kind": "StringLiteral", "type": { "qualType": "char[4]" }, "valueCategory": "lvalue", "value": "\"t.c\"" }
                      ]
                    },
                    {
                      "id": "0x2f", "kind": "ImplicitCastExpr", "type": { "qualType": "unsigned int" },
                      "valueCategory": "prvalue", "castKind": "IntegralCast",
                      "inner": [
                        { "id": "0x30", "kind": "IntegerLiteral", "type": { "qualType": "int" }, "valueCategory": "prvalue", "value": "3" }
                      ]
                    },
                    {
                      "id": "0x31", "kind": "ImplicitCastExpr", "type": { "qualType": "const char *" },
                      "valueCategory": "prvalue", "castKind": "ArrayToPointerDecay",
                      "inner": [
                        { "id": "0x32", "kind": "PredefinedExpr", "valueCategory": "lvalue", "name": "__PRETTY_FUNCTION__" }
                      ]
                    }
                  ]
                }
              ]
            }
          ]
        }
      ]
    }
  ]
}
"#;

fn references(root: NodeRef<'_>) -> Vec<(DeclId, String)> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let NodeRef::Expr(Expr {
            kind: ExprKind::DeclRef { decl, name, .. },
            ..
        }) = node
        {
            out.push((*decl, name.clone()));
        }
        stack.extend(node.children().into_iter().rev());
    }
    out
}

fn find_predefined(root: NodeRef<'_>) -> Option<&Expr> {
    match root {
        NodeRef::Expr(e @ Expr {
            kind: ExprKind::Predefined { .. },
            ..
        }) => Some(e),
        _ => root.children().into_iter().find_map(find_predefined),
    }
}

#[test]
fn imported_assert_is_cloned_and_rebound() {
    init_logging();
    let imported = c_ast::import_function(CHECK, "check").unwrap();
    let [x] = imported.params[..] else {
        panic!("expected one parameter");
    };
    let mut sema = Sema::new(imported.ast);
    sema.set_current_scope(Some(imported.scope));
    let derivative = sema.enter_scope();

    let mut subst = DeclSubstitutionMap::new();
    let mut body = StmtClone::new(&mut sema, &mut subst)
        .clone_stmt(&imported.body)
        .unwrap();
    rebind(&mut body, imported.context, derivative, &mut sema, &subst).unwrap();

    let StmtKind::Compound(stmts) = &body.kind else {
        panic!("body is not a block");
    };
    let StmtKind::Decl(decls) = &stmts[0].kind else {
        panic!("first statement is not a declaration");
    };
    let [y2] = decls[..] else {
        panic!("expected one declaration");
    };
    assert_eq!(sema.ast().decls[y2].name(), "y");
    assert!(subst.iter().any(|(_, to)| to == y2));

    // the copy of `y` keeps reading the parameter
    let init = sema.ast().decls[y2].as_var().unwrap().init.as_deref().unwrap();
    assert_eq!(references(NodeRef::Expr(init)), vec![(x, "x".to_string())]);

    let refs = references(NodeRef::Stmt(&stmts[1]));
    assert_eq!(refs[0], (y2, "y".to_string()));
    assert_eq!(refs[1].1, "__assert_fail");
    assert_eq!(
        sema.ast().decls[refs[1].0].context(),
        sema.ast().contexts.translation_unit()
    );

    let pretty = find_predefined(NodeRef::Stmt(&body)).unwrap();
    assert_eq!(pretty.ty, QualType::const_char_ptr());
    let ExprKind::Predefined {
        function_name: Some(name),
        ..
    } = &pretty.kind
    else {
        panic!("function name was not synthesized");
    };
    assert!(matches!(&name.kind, ExprKind::StringLiteral(lit) if lit.bytes.is_empty()));

    // the source body is untouched
    assert!(find_predefined(NodeRef::Stmt(&imported.body)).unwrap().ty.is_null());
}

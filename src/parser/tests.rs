//! Parser tests.

use pretty_assertions::assert_eq;

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::Scanner;
use crate::parser::Parser;

fn parse(source: &str) -> Result<Source, ParserError> {
    let tokens = Scanner::new(source).scan_tokens().unwrap();
    Parser::new(tokens).parse()
}

fn parse_ok(source: &str) -> Source {
    parse(source).unwrap()
}

fn section_body(stmt: &Stmt) -> &[Stmt] {
    match &stmt.kind {
        StmtKind::Section(section) => &section.block.statements,
        other => panic!("Expected section, got {:?}", other),
    }
}

fn type_shape(ty: &TypeAnnotation) -> (&str, bool, bool) {
    (ty.name.as_str(), ty.array, ty.optional)
}

#[test]
fn test_section() {
    let source = parse_ok("testSection {}");
    assert_eq!(source.statements().len(), 1);
    match &source.statements()[0].kind {
        StmtKind::Section(section) => {
            assert_eq!(section.name, "testSection");
            assert!(section.block.statements.is_empty());
        }
        _ => panic!("Expected section"),
    }

    let source = parse_ok("testSection {\n\n} example {}");
    let names: Vec<_> = source
        .statements()
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Section(section) => section.name.clone(),
            _ => panic!("Expected section"),
        })
        .collect();
    assert_eq!(names, vec!["testSection", "example"]);
}

#[test]
fn test_typedef() {
    let source = parse_ok("testSection {\n  type Test: int\n}");
    let body = section_body(&source.statements()[0]);
    match &body[0].kind {
        StmtKind::Typedef(typedef) => {
            assert_eq!(typedef.name, "Test");
            assert_eq!(type_shape(&typedef.ty), ("int", false, false));
        }
        _ => panic!("Expected typedef"),
    }
}

#[test]
fn test_object_typedef() {
    let source = parse_ok(
        "testSection {
            type User: object {
                name: string
                age: int
                email: string?
            }
        }",
    );
    let body = section_body(&source.statements()[0]);
    let StmtKind::Typedef(typedef) = &body[0].kind else {
        panic!("Expected typedef");
    };
    assert!(typedef.ty.is_object());

    let fields: Vec<_> = typedef
        .ty
        .fields
        .iter()
        .map(|f| (f.name.as_str(), type_shape(&f.ty)))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("name", ("string", false, false)),
            ("age", ("int", false, false)),
            ("email", ("string", false, true)),
        ]
    );
}

#[test]
fn test_assign() {
    let source = parse_ok("testSection { let name: string }");
    let body = section_body(&source.statements()[0]);
    match &body[0].kind {
        StmtKind::Assign(assign) => {
            assert_eq!(assign.name, "name");
            assert_eq!(type_shape(&assign.ty), ("string", false, false));
            assert!(assign.value.is_none());
        }
        _ => panic!("Expected assign"),
    }

    let source = parse_ok(r#"testSection { let name: string = "Hello World" }"#);
    let body = section_body(&source.statements()[0]);
    let StmtKind::Assign(assign) = &body[0].kind else {
        panic!("Expected assign");
    };
    assert_eq!(
        assign.value.as_ref().map(|v| &v.kind),
        Some(&ExprKind::Literal(Literal::String("Hello World".to_string())))
    );
}

#[test]
fn test_array_types() {
    let source = parse_ok("let a: []int\nlet b: [string]\nlet c: []User?");
    let shapes: Vec<_> = source
        .statements()
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Assign(assign) => type_shape(&assign.ty),
            _ => panic!("Expected assign"),
        })
        .collect();
    assert_eq!(
        shapes,
        vec![
            ("int", true, false),
            ("string", true, false),
            ("User", true, true)
        ]
    );
}

#[test]
fn test_initializer() {
    let source = parse_ok(r#"let u: User = new { name = "a", age = 3 address = new { city = c } }"#);
    let StmtKind::Assign(assign) = &source.statements()[0].kind else {
        panic!("Expected assign");
    };
    let Some(ExprKind::Initialize(fields)) = assign.value.as_ref().map(|v| &v.kind) else {
        panic!("Expected initializer");
    };
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["name", "age", "address"]);
    assert!(matches!(fields[2].value.kind, ExprKind::Initialize(ref inner) if inner.len() == 1));
}

#[test]
fn test_member_value() {
    let source = parse_ok("let city: string = user.address.city");
    let StmtKind::Assign(assign) = &source.statements()[0].kind else {
        panic!("Expected assign");
    };
    let Some(ExprKind::Member { object, name }) = assign.value.as_ref().map(|v| &v.kind) else {
        panic!("Expected member access");
    };
    assert_eq!(name, "city");
    assert!(matches!(&object.kind, ExprKind::Member { name, .. } if name == "address"));
}

#[test]
fn test_call_statement() {
    let source = parse_ok(r#"print("a", 1, x.y)  user.greet()"#);
    assert_eq!(source.statements().len(), 2);

    match &source.statements()[0].kind {
        StmtKind::Expression(Expr {
            kind: ExprKind::Call { callee, arguments },
            ..
        }) => {
            assert_eq!(callee.kind, ExprKind::Ident("print".to_string()));
            assert_eq!(arguments.len(), 3);
        }
        _ => panic!("Expected call"),
    }

    match &source.statements()[1].kind {
        StmtKind::Expression(Expr {
            kind: ExprKind::Call { callee, arguments },
            ..
        }) => {
            assert!(matches!(&callee.kind, ExprKind::Member { name, .. } if name == "greet"));
            assert!(arguments.is_empty());
        }
        _ => panic!("Expected call"),
    }
}

#[test]
fn test_object_type_outside_typedef() {
    let err = parse(
        "testSection {
            let user: object {
                name: string?
                age: int
            }
        }",
    )
    .unwrap_err();
    assert!(matches!(err, ParserError::ObjectOutsideTypedef(_)));
}

#[test]
fn test_nested_object_type() {
    let err = parse("type User: object { address: object { city: string } }").unwrap_err();
    assert!(matches!(err, ParserError::ObjectOutsideTypedef(_)));
}

#[test]
fn test_optional_object() {
    let err = parse(
        "testSection {
            type user: object {
                name: string
            }?
        }",
    )
    .unwrap_err();
    assert!(matches!(err, ParserError::OptionalObject(_)));
}

#[test]
fn test_call_in_value_position() {
    let err = parse("let x: int = count()").unwrap_err();
    assert!(matches!(err, ParserError::General { .. }));
}

#[test]
fn test_initializer_as_argument() {
    let err = parse("print(new { a = 1 })").unwrap_err();
    assert!(matches!(err, ParserError::General { .. }));
}

#[test]
fn test_unclosed_section() {
    let err = parse("root { let x: int = 1").unwrap_err();
    assert!(matches!(err, ParserError::UnexpectedEof(_)));
}

#[test]
fn test_stray_closing_brace() {
    let err = parse("let x: int = 1 }").unwrap_err();
    assert!(matches!(err, ParserError::UnexpectedToken { .. }));
}

#[test]
fn test_statement_spans() {
    let source = parse_ok("root {\n  let x: int = 1\n}");
    let body = section_body(&source.statements()[0]);
    assert_eq!((body[0].span.line, body[0].span.column), (2, 3));
}

//! End-to-end VM tests: source text through compiler and VM.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::config::VmConfig;
use crate::error::RuntimeError;
use crate::lexer::Scanner;
use crate::parser::Parser;
use crate::span::Span;

use super::*;

fn chunk(source: &str) -> Chunk {
    let tokens = Scanner::new(source).scan_tokens().unwrap();
    let ast = Parser::new(tokens).parse().unwrap();
    Compiler::compile(&ast).unwrap()
}

fn run(source: &str) -> Result<Vm, RuntimeError> {
    let mut vm = Vm::new(chunk(source));
    vm.run()?;
    Ok(vm)
}

fn run_err(source: &str) -> RuntimeError {
    run(source).unwrap_err()
}

/// Register `name` as a host function recording the display form of its arguments.
fn record(vm: &mut Vm, name: &str) -> Rc<RefCell<Vec<Vec<String>>>> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    vm.register(name, move |args| {
        sink.borrow_mut()
            .push(args.iter().map(|arg| arg.to_string()).collect());
    });
    calls
}

const USER: &str = "
type Address: object { city: string }
type User: object {
    name: string
    email: string?
    address: Address?
    tags: []string
}
";

// ===== Types =====

#[test]
fn test_builtin_types_ignore_scope() {
    // A typedef named like a builtin never shadows it.
    let vm = run("s { type int: string  let x: int = 5 }\nlet y: int = 7").unwrap();
    assert_eq!(vm.get("y").map(|v| v.ty.full_name()), Some("int".to_string()));
}

#[test]
fn test_types_are_scoped_to_sections() {
    let err = run_err("A { type T: int }\nlet x: T = 1");
    assert!(matches!(err, RuntimeError::TypeNotFound(ref name, _) if name == "T"));
    assert_eq!(err.span().line, 2);
}

#[test]
fn test_alias_typedef_is_transparent() {
    let vm = run("type Port: int\nlet port: Port = 8080").unwrap();
    let port = vm.get("port").unwrap();
    assert_eq!(port.as_integer(), Some(8080));
    assert_eq!(port.ty.name, "int");
    assert!(vm.get_type("Port").is_some());
}

#[test]
fn test_duplicate_field_in_typedef() {
    let err = run_err("type T: object { a: int  a: string }");
    assert!(matches!(err, RuntimeError::DuplicateField(ref name, _) if name == "a"));
}

// ===== Store =====

#[test]
fn test_store_defaults() {
    let err = run_err("let x: int");
    assert!(matches!(err, RuntimeError::MissingValue(ref name, _) if name == "x"));

    let vm = run("let x: int?\nlet xs: [int]\nlet ys: []string?").unwrap();
    assert!(vm.get("x").unwrap().is_nil());
    assert_eq!(vm.get("xs").and_then(Value::as_array).map(|a| a.len()), Some(0));
    assert_eq!(vm.get("xs").map(|v| v.ty.full_name()), Some("[]int".to_string()));
    assert_eq!(vm.get("ys").and_then(Value::as_array).map(|a| a.len()), Some(0));
}

#[test]
fn test_store_literals() {
    let vm = run(
        r#"let s: string = "a"
           let i: int = -3
           let f: float = 2.5
           let b: bool = true"#,
    )
    .unwrap();
    assert_eq!(vm.get("s").and_then(Value::as_str), Some("a"));
    assert_eq!(vm.get("i").and_then(Value::as_integer), Some(-3));
    assert_eq!(vm.get("f").and_then(Value::as_float), Some(2.5));
    assert_eq!(vm.get("b").and_then(Value::as_bool), Some(true));
    assert!(vm.get("s").unwrap().mutable);
}

#[test]
fn test_type_mismatch() {
    let err = run_err(r#"let x: int = "a""#);
    assert!(matches!(
        err,
        RuntimeError::TypeMismatch { ref expected, ref found, .. } if expected == "int" && found == "string"
    ));

    let err = run_err("let x: float = 1");
    assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
}

#[test]
fn test_array_assignment_compares_element_type() {
    assert!(run("let a: []int\nlet b: []int = a").is_ok());

    let err = run_err("let a: []int\nlet c: []string = a");
    assert!(matches!(
        err,
        RuntimeError::TypeMismatch { ref expected, ref found, .. } if expected == "[]string" && found == "[]int"
    ));
}

#[test]
fn test_optional_value_copies() {
    let vm = run("let a: string?\nlet b: string? = a").unwrap();
    assert!(vm.get("b").unwrap().is_nil());

    // An absent optional cannot fill a required binding.
    let err = run_err("let a: string?\nlet b: string = a");
    assert!(matches!(err, RuntimeError::MissingValue(ref name, _) if name == "b"));
}

#[test]
fn test_name_not_found() {
    let err = run_err("let y: int = z");
    assert!(matches!(err, RuntimeError::NameNotFound(ref name, _) if name == "z"));
}

// ===== Sections =====

#[test]
fn test_section_bindings_do_not_leak() {
    let vm = run("root { let inner: int = 1 }\nlet outer: int = 2").unwrap();
    assert!(vm.get("inner").is_none());
    assert!(vm.get("outer").is_some());
}

#[test]
fn test_sections_see_enclosing_bindings() {
    let mut vm = Vm::new(chunk("let port: int = 80\nserver { let p: int = port  show(p) }"));
    let calls = record(&mut vm, "show");
    vm.run().unwrap();
    assert_eq!(*calls.borrow(), vec![vec!["80".to_string()]]);
}

#[test]
fn test_round_trip_only_top_level_reaches_root() {
    let body = r#"type User: object { name: string } let u: User = new { name = "a" }"#;

    let vm = run(body).unwrap();
    let u = vm.get("u").unwrap();
    assert_eq!(u.ty.name, "User");
    assert_eq!(
        u.as_object().and_then(|o| o.get("name")).and_then(Value::as_str),
        Some("a")
    );

    let vm = run(&format!("root {{ {} }}", body)).unwrap();
    assert!(vm.get("u").is_none());
}

// ===== Objects =====

#[test]
fn test_initializer_keeps_exact_field_set() {
    let vm = run(&format!(
        r#"{}
        let u: User = new {{ name = "a", address = new {{ city = "Paris" }} }}"#,
        USER
    ))
    .unwrap();
    let user = vm.get("u").and_then(Value::as_object).unwrap();
    let fields: Vec<&str> = user.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(fields, vec!["name", "address"]);

    let address = user.get("address").unwrap();
    assert_eq!(address.ty.name, "Address");
    assert_eq!(
        address.as_object().and_then(|o| o.get("city")).and_then(Value::as_str),
        Some("Paris")
    );
}

#[test]
fn test_unknown_field() {
    let err = run_err(&format!(r#"{} let u: User = new {{ nick = "a" }}"#, USER));
    assert!(matches!(
        err,
        RuntimeError::UnknownField { ref type_name, ref field, .. } if type_name == "User" && field == "nick"
    ));
}

#[test]
fn test_field_value_is_type_checked() {
    let err = run_err(&format!("{} let u: User = new {{ name = 1 }}", USER));
    assert!(matches!(err, RuntimeError::TypeMismatch { ref expected, .. } if expected == "string"));
}

#[test]
fn test_duplicate_initializer_field() {
    let err = run_err(&format!(r#"{} let u: User = new {{ name = "a" name = "b" }}"#, USER));
    assert!(matches!(err, RuntimeError::DuplicateField(ref name, _) if name == "name"));
}

#[test]
fn test_missing_required_field() {
    let err = run_err(&format!(r#"{} let u: User = new {{ email = "a@b" }}"#, USER));
    assert!(matches!(err, RuntimeError::MissingValue(ref name, _) if name == "User.name"));
}

#[test]
fn test_initializer_needs_object_type() {
    let err = run_err("let x: int = new { }");
    assert!(matches!(err, RuntimeError::TypeMismatch { ref found, .. } if found == "object"));

    let err = run_err(&format!(r#"{} let u: User = new {{ name = new {{ }} }}"#, USER));
    assert!(matches!(err, RuntimeError::TypeMismatch { ref expected, .. } if expected == "string"));
}

#[test]
fn test_member_access() {
    let vm = run(&format!(
        r#"{}
        let u: User = new {{ name = "a", address = new {{ city = "Oslo" }} }}
        let name: string = u.name
        let city: string = u.address.city
        let email: string? = u.email
        let tags: []string = u.tags"#,
        USER
    ))
    .unwrap();
    assert_eq!(vm.get("name").and_then(Value::as_str), Some("a"));
    assert_eq!(vm.get("city").and_then(Value::as_str), Some("Oslo"));
    assert!(vm.get("email").unwrap().is_nil());
    assert_eq!(vm.get("tags").and_then(Value::as_array).map(|a| a.len()), Some(0));
}

#[test]
fn test_member_access_errors() {
    let err = run_err("let x: int = 1\nlet y: int = x.foo");
    assert!(matches!(err, RuntimeError::NotAnObject(ref ty, _) if ty == "int"));

    let err = run_err(&format!(r#"{} let u: User = new {{ name = "a" }} let n: int = u.age"#, USER));
    assert!(matches!(err, RuntimeError::UnknownField { ref field, .. } if field == "age"));

    let err = run_err(&format!(r#"{} let a: Address? let c: string = a.city"#, USER));
    assert!(matches!(err, RuntimeError::MissingValue(ref name, _) if name == "Address.city"));
}

#[test]
fn test_same_named_object_types_compare_equal() {
    // Type equality ignores the object definition: a differently shaped
    // `User` declared in a section accepts the outer `User` value.
    let source = r#"
        type User: object { name: string }
        let u: User = new { name = "a" }
        other {
            type User: object { age: int }
            let v: User = u
        }
    "#;
    assert!(run(source).is_ok());
}

// ===== Calls =====

#[test]
fn test_call_passes_arguments_in_order() {
    let mut vm = Vm::new(chunk(r#"let n: int = 3  log(1, "a", true, 2.5, n)"#));
    let calls = record(&mut vm, "log");
    vm.run().unwrap();
    assert_eq!(
        *calls.borrow(),
        vec![vec!["1", "a", "true", "2.5", "3"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()]
    );
}

#[test]
fn test_member_call_dispatches_on_type_name() {
    let mut vm = Vm::new(chunk(&format!(
        r#"{} let u: User = new {{ name = "a" }}  u.greet("hi")
        let s: string = "abc"  s.len()
        let xs: []int  xs.len()"#,
        USER
    )));
    let greet = record(&mut vm, "User_greet");
    let string_len = record(&mut vm, "string_len");
    let array_len = record(&mut vm, "array_len");
    vm.run().unwrap();

    assert_eq!(
        *greet.borrow(),
        vec![vec!["User { name = a }".to_string(), "hi".to_string()]]
    );
    assert_eq!(*string_len.borrow(), vec![vec!["abc".to_string()]]);
    assert_eq!(*array_len.borrow(), vec![vec!["[]".to_string()]]);
}

#[test]
fn test_member_call_without_binding() {
    let err = run_err(r#"let s: string = "a"  s.shout()"#);
    assert!(matches!(err, RuntimeError::FunctionNotFound(ref name, _) if name == "string_shout"));
}

#[test]
fn test_call_unbound_function() {
    let err = run_err("missing(1)");
    assert!(matches!(err, RuntimeError::FunctionNotFound(ref name, _) if name == "missing"));
}

#[test]
fn test_call_non_function() {
    let err = run_err("let x: int = 1  x()");
    assert!(matches!(err, RuntimeError::NotCallable(ref ty, _) if ty == "int"));
}

#[test]
fn test_host_binding_visible_in_sections() {
    let mut vm = Vm::new(chunk("a { b { ping() } }"));
    let calls = record(&mut vm, "ping");
    vm.run().unwrap();
    assert_eq!(calls.borrow().len(), 1);
}

// ===== Errors & limits =====

#[test]
fn test_errors_carry_instruction_location() {
    let err = run_err("root {\n  let x: int\n}");
    assert_eq!((err.span().line, err.span().column), (2, 3));
}

#[test]
fn test_error_halts_and_unwinds() {
    let mut vm = Vm::new(chunk("let kept: int = 1\nsection { let x: int }\nlet never: int = 2"));
    assert!(vm.run().is_err());
    assert!(vm.is_halted());
    assert!(vm.get("kept").is_some());
    assert!(vm.get("never").is_none());
    assert_eq!(vm.failed().map(|err| err.span().line), Some(2));
}

#[test]
fn test_failed_run_keeps_failing() {
    let mut vm = Vm::new(chunk("let kept: int = 1\nlet x: int\nlet never: int = 2"));
    let first = vm.run().unwrap_err();
    assert!(matches!(first, RuntimeError::MissingValue(_, _)));

    let second = vm.run().unwrap_err();
    assert_eq!(second, first);
    assert_eq!(vm.failed(), Some(&first));
    assert!(vm.get("never").is_none());
}

#[test]
fn test_completed_run_is_not_failed() {
    let mut vm = Vm::new(chunk("let port: int = 80"));
    vm.run().unwrap();
    assert!(vm.is_halted());
    assert!(vm.failed().is_none());
    assert!(vm.run().is_ok());
}

#[test]
fn test_broken_instruction_stream_is_internal() {
    let mut bad = Chunk::new();
    bad.emit(Op::Store { has_value: false }, Span::new(0, 1, 4, 2));
    let err = Vm::new(bad).run().unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.span().line, 4);

    let mut bad = Chunk::new();
    bad.emit(Op::CloseSection, Span::default());
    assert!(Vm::new(bad).run().unwrap_err().is_internal());

    let mut bad = Chunk::new();
    bad.emit(Op::LoadName("dangling".to_string()), Span::default());
    assert!(Vm::new(bad).run().unwrap_err().is_internal());
}

#[test]
fn test_frame_depth_limit() {
    let config = VmConfig {
        max_frame_depth: 2,
        ..VmConfig::default()
    };
    let mut vm = Vm::with_config(chunk("a { b { } }"), &config);
    let err = vm.run().unwrap_err();
    assert!(matches!(err, RuntimeError::StackOverflow(..)));
    assert!(!err.is_internal());
}

#[test]
fn test_data_stack_limit() {
    let config = VmConfig {
        max_stack_size: 2,
        ..VmConfig::default()
    };
    let mut vm = Vm::with_config(chunk("let x: int = 1"), &config);
    assert!(matches!(vm.run(), Err(RuntimeError::StackOverflow(..))));
}

// ===== Output =====

#[test]
fn test_dump_json_skips_functions() {
    let mut vm = Vm::new(chunk("let name: string = \"cfg\"\nlet tags: []string\nlet email: string?"));
    record(&mut vm, "print");
    vm.run().unwrap();
    assert_eq!(
        vm.dump_json().unwrap(),
        "{\n  \"name\": \"cfg\",\n  \"tags\": [],\n  \"email\": null\n}"
    );
    assert_eq!(vm.globals().len(), 4);
}

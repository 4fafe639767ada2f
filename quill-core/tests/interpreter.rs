use quill_core::parser::ast::Statement;
use quill_core::runtime::evaluate;
use quill_core::{
    produce_ast, tokenize, Environment, Interpreter, QuillError, RuntimeError, ScopeId, TokenKind,
    Value,
};

fn run(src: &str) -> Result<Value, QuillError> {
    Interpreter::new().run(src)
}

fn assert_value(src: &str, expected: Value) {
    match run(src) {
        Ok(value) => assert_eq!(value, expected, "script: {}", src),
        Err(e) => panic!("Script failed: {e}\n{src}"),
    }
}

fn assert_runtime_error(src: &str, expected: RuntimeError) {
    match run(src) {
        Ok(value) => panic!("Script succeeded with {value} but was expected to fail"),
        Err(e) => assert_eq!(e, QuillError::Runtime(expected), "script: {}", src),
    }
}

#[test]
fn tokenize_empty_source_is_just_eof() {
    let tokens = tokenize("").unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

#[test]
fn tokenize_ignores_layout() {
    let compact: Vec<TokenKind> = tokenize("let x=1;").unwrap().iter().map(|t| t.kind).collect();
    let spaced: Vec<TokenKind> = tokenize("let\n\tx  =  1 ;")
        .unwrap()
        .iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(compact, spaced);
}

#[test]
fn program_has_one_child_per_statement() {
    let program = produce_ast("let a = 1; const b = 2; fn f(x) { x } a + b f(3)").unwrap();
    assert_eq!(program.len(), 5);
    assert!(matches!(program.body[2], Statement::FunctionDeclaration { .. }));
}

#[test]
fn arithmetic_precedence() {
    assert_value("2 + 3 * 4", Value::Number(14.0));
    assert_value("(2 + 3) * 4", Value::Number(20.0));
    assert_value("10 - 2 - 3", Value::Number(5.0));
    assert_value("7 % 4 * 2", Value::Number(6.0));
}

#[test]
fn functions_return_last_expression() {
    assert_value("fn add(a, b) { a + b } add(2, 3)", Value::Number(5.0));
    assert_value("fn nothing() {} nothing()", Value::Null);
}

#[test]
fn closures_see_later_assignments() {
    assert_value("let x = 1; fn f() { x } x = 5; f()", Value::Number(5.0));
}

#[test]
fn parameters_shadow_only_inside_the_call() {
    assert_value("let x = 1; fn f(x) { x } f(9)", Value::Number(9.0));
    assert_value("let x = 1; fn f(x) { x } f(9) x", Value::Number(1.0));
}

#[test]
fn constants_reject_reassignment() {
    let mut interpreter = Interpreter::new();
    interpreter.run("const x = 1;").unwrap();

    let err = interpreter.run("x = 2;").unwrap_err();
    assert_eq!(
        err,
        QuillError::Runtime(RuntimeError::ConstantReassignment("x".to_string()))
    );
    assert_eq!(interpreter.run("x").unwrap(), Value::Number(1.0));
}

#[test]
fn object_literals() {
    let value = run("let b = 7; { a: 1, b }").unwrap();
    assert_eq!(value.get_property("a"), Some(Value::Number(1.0)));
    assert_eq!(value.get_property("b"), Some(Value::Number(7.0)));

    assert_value("let o = { k: 1, k: 2 }; o.k", Value::Number(2.0));
    assert_value("let o = { inner: { y: 3 } }; o.inner.y", Value::Number(3.0));
}

#[test]
fn unknown_identifier_is_error() {
    assert_runtime_error("missing", RuntimeError::UndefinedVariable("missing".to_string()));
}

#[test]
fn calling_a_number_is_error() {
    let err = run("let n = 1; n()").unwrap_err();
    assert!(matches!(err, QuillError::Runtime(RuntimeError::NotCallable(_))));
}

#[test]
fn syntax_errors_are_reported_not_raised() {
    let err = run("let = 4;").unwrap_err();
    assert!(matches!(err, QuillError::Syntax { .. }));
    assert_eq!(err.kind(), "Parse error");

    let err = run("1 @ 2").unwrap_err();
    assert_eq!(err, QuillError::Lex { character: '@' });
}

#[test]
fn host_can_register_native_functions() {
    let mut env = Environment::with_globals();
    env.declare_var(
        ScopeId::GLOBAL,
        "double",
        Value::native("double", |args, _env, _scope| {
            let n = args.first().and_then(Value::as_number).unwrap_or(0.0);
            Ok(Value::Number(n * 2.0))
        }),
        true,
    )
    .unwrap();

    let program = produce_ast("double(21)").unwrap();
    assert_eq!(
        evaluate(&program, &mut env, ScopeId::GLOBAL).unwrap(),
        Value::Number(42.0)
    );
}

#[test]
fn evaluate_in_child_scope_leaves_globals_alone() {
    let mut env = Environment::with_globals();
    let child = env.create_scope(ScopeId::GLOBAL);

    let program = produce_ast("let local = 3; local * 2").unwrap();
    assert_eq!(
        evaluate(&program, &mut env, child).unwrap(),
        Value::Number(6.0)
    );
    assert!(env.lookup_var(ScopeId::GLOBAL, "local").is_err());
}

#[test]
fn repeated_calls_do_not_grow_the_environment() {
    let mut interpreter = Interpreter::new();
    interpreter.run("fn id(v) { v }").unwrap();
    let before = interpreter.environment.live_scopes();

    interpreter.run("id(1) id(2) id(3)").unwrap();

    assert_eq!(interpreter.environment.live_scopes(), before);
}

#[test]
fn calls_declaring_inner_functions_do_not_grow_the_environment() {
    let mut interpreter = Interpreter::new();
    interpreter.run("fn f() { fn g() { 1 } g() }").unwrap();
    let before = interpreter.environment.live_scopes();

    for _ in 0..1000 {
        interpreter.run("f()").unwrap();
    }

    assert_eq!(interpreter.environment.live_scopes(), before);
}

#[test]
fn returned_closures_outlive_their_call() {
    let mut interpreter = Interpreter::new();
    interpreter
        .run("fn adder(n) { fn add(m) { n + m } add } const addTen = adder(10);")
        .unwrap();

    for _ in 0..10 {
        interpreter.run("adder(1)(1)").unwrap();
    }

    assert_eq!(interpreter.run("addTen(5)").unwrap(), Value::Number(15.0));
}

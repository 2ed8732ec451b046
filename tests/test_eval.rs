//! Tests for the function-body interpreter.
//!
//! Traced functions run through this interpreter when a call chain is
//! replayed, so these tests exercise the statements and expressions such
//! functions are made of.

extern crate literal_tracer;

use literal_tracer::parser::JsParser;
use literal_tracer::runner::builtins::types::EvalContext;
use literal_tracer::runner::ds::error::EvalError;
use literal_tracer::runner::eval::statement::execute_program;
use literal_tracer::runner::eval::Frame;
use literal_tracer::TracedValue;
use pretty_assertions::assert_eq;

/// Run a program and return its global frame.
fn run(code: &str) -> Frame {
    let program = JsParser::parse_to_ast_from_str(code)
        .expect(&format!("Failed to parse: {}", code));
    let frame = Frame::global();
    let mut ctx = EvalContext::with_core();
    execute_program(&program, &frame, &mut ctx).expect(&format!("Failed to run: {}", code));
    frame
}

/// Run a program and return the error it stopped with.
fn run_err(code: &str) -> EvalError {
    let program = JsParser::parse_to_ast_from_str(code)
        .expect(&format!("Failed to parse: {}", code));
    let mut ctx = EvalContext::with_core();
    match execute_program(&program, &Frame::global(), &mut ctx) {
        Ok(_) => panic!("expected an error from: {}", code),
        Err(e) => e,
    }
}

/// Run a program and read one variable.
fn value_of(code: &str, name: &str) -> TracedValue {
    run(code).env.lookup(name).unwrap_or(TracedValue::Undefined)
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_arithmetic() {
    assert_eq!(value_of("var r = 7 / 2;", "r"), TracedValue::from(3.5));
    assert_eq!(value_of("var r = 10 % 4;", "r"), TracedValue::from(2));
    assert_eq!(value_of("var r = '6' * '7';", "r"), TracedValue::from(42));
    assert_eq!(value_of("var r = '3' - 1;", "r"), TracedValue::from(2));
    assert_eq!(value_of("var r = 1 + '1';", "r"), TracedValue::from("11"));
}

#[test]
fn test_comparisons() {
    assert_eq!(value_of("var r = 1 < 2;", "r"), TracedValue::from(true));
    assert_eq!(value_of("var r = 'b' > 'a';", "r"), TracedValue::from(true));
    assert_eq!(value_of("var r = 1 == '1';", "r"), TracedValue::from(true));
    assert_eq!(value_of("var r = 1 === '1';", "r"), TracedValue::from(false));
    assert_eq!(value_of("var r = null == undefined;", "r"), TracedValue::from(true));
    assert_eq!(value_of("var r = null === undefined;", "r"), TracedValue::from(false));
}

#[test]
fn test_logical_operators_short_circuit() {
    let frame = run(
        "var calls = 0;
         function hit() { calls++; return true; }
         var a = false && hit();
         var b = true || hit();
         var c = null || 'fallback';",
    );
    assert_eq!(frame.env.lookup("calls"), Some(TracedValue::from(0)));
    assert_eq!(frame.env.lookup("a"), Some(TracedValue::from(false)));
    assert_eq!(frame.env.lookup("b"), Some(TracedValue::from(true)));
    assert_eq!(frame.env.lookup("c"), Some(TracedValue::from("fallback")));
}

#[test]
fn test_update_expressions() {
    let frame = run("var i = 5; var post = i++; var pre = ++i; var down = i--;");
    assert_eq!(frame.env.lookup("post"), Some(TracedValue::from(5)));
    assert_eq!(frame.env.lookup("pre"), Some(TracedValue::from(7)));
    assert_eq!(frame.env.lookup("down"), Some(TracedValue::from(7)));
    assert_eq!(frame.env.lookup("i"), Some(TracedValue::from(6)));
}

#[test]
fn test_typeof_values() {
    let frame = run(
        "var t1 = typeof 1; var t2 = typeof 'x'; var t3 = typeof null;
         var t4 = typeof function () {}; var t5 = typeof notDeclared;",
    );
    assert_eq!(frame.env.lookup("t1"), Some(TracedValue::from("number")));
    assert_eq!(frame.env.lookup("t2"), Some(TracedValue::from("string")));
    assert_eq!(frame.env.lookup("t3"), Some(TracedValue::from("object")));
    assert_eq!(frame.env.lookup("t4"), Some(TracedValue::from("function")));
    assert_eq!(frame.env.lookup("t5"), Some(TracedValue::from("undefined")));
}

#[test]
fn test_conditional_expression() {
    assert_eq!(value_of("var r = 0 ? 'yes' : 'no';", "r"), TracedValue::from("no"));
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_if_else_chain() {
    let code = "function grade(n) {
                    if (n > 90) { return 'A'; }
                    else if (n > 80) { return 'B'; }
                    else { return 'C'; }
                }
                var a = grade(95), b = grade(85), c = grade(10);";
    let frame = run(code);
    assert_eq!(frame.env.lookup("a"), Some(TracedValue::from("A")));
    assert_eq!(frame.env.lookup("b"), Some(TracedValue::from("B")));
    assert_eq!(frame.env.lookup("c"), Some(TracedValue::from("C")));
}

#[test]
fn test_nested_loops_with_break() {
    let code = "var count = 0;
                for (var i = 0; i < 10; i++) {
                    for (var j = 0; j < 10; j++) {
                        if (j == 3) break;
                        count++;
                    }
                }";
    assert_eq!(value_of(code, "count"), TracedValue::from(30));
}

#[test]
fn test_while_with_continue() {
    let code = "var i = 0, odd = 0;
                while (i < 10) {
                    i++;
                    if (i % 2 == 0) continue;
                    odd++;
                }";
    assert_eq!(value_of(code, "odd"), TracedValue::from(5));
}

#[test]
fn test_return_exits_loops() {
    let code = "function firstOver(xs, n) {
                    for (var i = 0; i < xs.length; i++) {
                        if (xs[i] > n) return xs[i];
                    }
                    return -1;
                }
                var r = firstOver([1, 5, 9], 4);
                var none = firstOver([1], 4);";
    let frame = run(code);
    assert_eq!(frame.env.lookup("r"), Some(TracedValue::from(5)));
    assert_eq!(frame.env.lookup("none"), Some(TracedValue::from(-1)));
}

#[test]
fn test_uncaught_throw() {
    let err = run_err("throw 'bad';");
    assert!(matches!(err, EvalError::Thrown(TracedValue::String(ref s)) if s == "bad"));
}

#[test]
fn test_caught_host_errors_are_objects() {
    let code = "var name, message;
                try { undefinedFunction(); } catch (e) { name = e.name; message = e.message; }";
    let frame = run(code);
    assert_eq!(frame.env.lookup("name"), Some(TracedValue::from("ReferenceError")));
    assert_eq!(
        frame.env.lookup("message"),
        Some(TracedValue::from("undefinedFunction is not defined"))
    );
}

#[test]
fn test_finally_runs_after_return() {
    let code = "var log = [];
                function f() {
                    try { return 'body'; } finally { log.push('finally'); }
                }
                var r = f();";
    let frame = run(code);
    assert_eq!(frame.env.lookup("r"), Some(TracedValue::from("body")));
    assert_eq!(
        frame.env.lookup("log"),
        Some(TracedValue::from(vec![TracedValue::from("finally")]))
    );
}

// ============================================================================
// Functions and objects
// ============================================================================

#[test]
fn test_closures_keep_their_environment() {
    let code = "function counter() {
                    var n = 0;
                    return function () { n++; return n; };
                }
                var next = counter();
                next();
                next();
                var third = next();";
    assert_eq!(value_of(code, "third"), TracedValue::from(3));
}

#[test]
fn test_recursion() {
    let code = "function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); }
                var r = fact(10);";
    assert_eq!(value_of(code, "r"), TracedValue::from(3628800));
}

#[test]
fn test_missing_arguments_are_undefined() {
    let code = "function f(a, b) { return typeof b; } var r = f(1);";
    assert_eq!(value_of(code, "r"), TracedValue::from("undefined"));
}

#[test]
fn test_methods_see_this() {
    let code = "var obj = { name: 'box', describe: function () { return 'I am ' + this.name; } };
                var r = obj.describe();";
    assert_eq!(value_of(code, "r"), TracedValue::from("I am box"));
}

#[test]
fn test_call_and_apply() {
    let code = "function greet(greeting) { return greeting + ' ' + this.name; }
                var who = { name: 'Ada' };
                var a = greet.call(who, 'Hi');
                var b = greet.apply(who, ['Hello']);";
    let frame = run(code);
    assert_eq!(frame.env.lookup("a"), Some(TracedValue::from("Hi Ada")));
    assert_eq!(frame.env.lookup("b"), Some(TracedValue::from("Hello Ada")));
}

#[test]
fn test_object_property_updates() {
    let code = "var o = { a: 1 };
                o.b = 2;
                o['c'] = o.a + o.b;
                delete o.a;
                var keys = Object.keys(o).join(',');
                var hasA = 'a' in o;";
    let frame = run(code);
    assert_eq!(frame.env.lookup("keys"), Some(TracedValue::from("b,c")));
    assert_eq!(frame.env.lookup("hasA"), Some(TracedValue::from(false)));
}

#[test]
fn test_arrays_are_shared_by_reference() {
    let code = "var a = [1, 2];
                var b = a;
                b.push(3);
                var len = a.length;";
    assert_eq!(value_of(code, "len"), TracedValue::from(3));
}

#[test]
fn test_calling_a_non_function() {
    let err = run_err("var x = 1; x();");
    assert!(!matches!(err, EvalError::ReferenceError(_)));
}

#[test]
fn test_reading_from_undefined() {
    let err = run_err("var x; x.y;");
    assert!(matches!(err, EvalError::TypeError(_)));
}

// ============================================================================
// Limits
// ============================================================================

#[test]
fn test_default_call_depth_fits_a_small_stack() {
    let stopped = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let direct = run_err("function f(n) { return f(n + 1); } f(0);");
            let through_map = run_err(
                "function g(n) { return [n + 1].map(function (m) { return g(m); })[0]; } g(0);",
            );
            matches!(direct, EvalError::CallDepthExceeded(64))
                && matches!(through_map, EvalError::CallDepthExceeded(64))
        })
        .unwrap()
        .join()
        .unwrap();
    assert!(stopped);
}

/// Benchmark runner for the literal tracer.
///
/// Times scope tracing, call-chain replay and the interpreter that backs
/// function calls during replay.

extern crate literal_tracer;

use literal_tracer::parser::JsParser;
use literal_tracer::runner::builtins::types::EvalContext;
use literal_tracer::runner::eval::statement::execute_program;
use literal_tracer::runner::eval::Frame;
use literal_tracer::{function_chain_from_line, trace, TracedValue};
use std::time::{Duration, Instant};

/// Trace a source repeatedly and return the elapsed time.
fn run_trace_benchmark(name: &str, code: &str, iterations: u32) -> Duration {
    let start = Instant::now();

    for _ in 0..iterations {
        let results = trace(code).expect(&format!("Failed to trace benchmark: {}", name));
        let _ = results.all_assignments();
    }

    start.elapsed()
}

/// Replay a line against traced bindings and return the elapsed time.
fn run_chain_benchmark(name: &str, code: &str, line: &str, iterations: u32) -> Duration {
    let results = trace(code).expect(&format!("Failed to trace benchmark: {}", name));
    let assignments = results.all_assignments();

    let start = Instant::now();

    for _ in 0..iterations {
        let mut chain = function_chain_from_line(line, &assignments)
            .expect(&format!("Failed to build chain: {}", name));
        let last = chain.len() - 1;
        let _ = chain.execute_until(last);
    }

    start.elapsed()
}

/// Interpret a whole program repeatedly and return the elapsed time.
fn run_interpreter_benchmark(name: &str, code: &str, iterations: u32) -> Duration {
    let ast = JsParser::parse_to_ast_from_str(code)
        .expect(&format!("Failed to parse benchmark: {}", name));

    let start = Instant::now();

    for _ in 0..iterations {
        let mut ctx = EvalContext::with_core();
        let frame = Frame::global();
        let _ = execute_program(&ast, &frame, &mut ctx);
    }

    start.elapsed()
}

/// Get the final value of a chain.
fn replay(code: &str, line: &str) -> TracedValue {
    let assignments = trace(code).unwrap().all_assignments();
    let mut chain = function_chain_from_line(line, &assignments).unwrap();
    let last = chain.len() - 1;
    chain.execute_until(last).unwrap_or(TracedValue::Undefined)
}

// ============================================================================
// Benchmark definitions
// ============================================================================

const BENCH_STRING_HELPERS: &str = r#"
var someString = 'bla';
function addAwesomeness(input) {
    return 'AWESOME ' + input + ' AWESOME';
}
function addDashes(input) {
    return '--- ' + input + ' ---';
}
function addMarks(input) {
    return '!!' + input + '!!';
}
"#;

const LINE_STRING_HELPERS: &str = "addMarks(addDashes(addAwesomeness(someString))).indexOf('A')";

const BENCH_ARRAY_PIPELINE: &str = r#"
var anArray = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
var index = 2;
function appendBla(s) {
    return s + 'bla';
}
"#;

const LINE_ARRAY_PIPELINE: &str =
    "anArray.slice(index).map(appendBla).reverse().join('-').toUpperCase()";

const BENCH_CSV: &str = r#"
var lines = ['Alien,10', 'Heat,12', 'Ronin,8', 'Brazil,9'];
function priceOf(line) {
    return Number(line.split(',')[1]);
}
"#;

const LINE_CSV: &str = "lines.map(priceOf).filter(function (p) { return p > 8; }).length";

const BENCH_NESTED_SCOPES: &str = r#"
var outer = 1;
function level1(a) {
    var one = a + outer;
    function level2(b) {
        var two = b * 2;
        function level3(c) {
            var three = c - 1;
            return three;
        }
        return level3(two);
    }
    return level2(one);
}
var result = level1(3);
"#;

const BENCH_LOOP_SUM: &str = r#"
var sum = 0;
for (var i = 0; i < 10000; i = i + 1) {
    sum = sum + i;
}
"#;

fn main() {
    println!("=======================================================");
    println!("  Literal Tracer - Performance Benchmarks");
    println!("=======================================================\n");

    let traces: Vec<(&str, &str, u32)> = vec![
        ("Trace string helpers", BENCH_STRING_HELPERS, 1000),
        ("Trace array pipeline", BENCH_ARRAY_PIPELINE, 1000),
        ("Trace CSV", BENCH_CSV, 1000),
        ("Trace nested scopes", BENCH_NESTED_SCOPES, 1000),
    ];

    let chains: Vec<(&str, &str, &str, u32)> = vec![
        ("Replay string helpers", BENCH_STRING_HELPERS, LINE_STRING_HELPERS, 1000),
        ("Replay array pipeline", BENCH_ARRAY_PIPELINE, LINE_ARRAY_PIPELINE, 1000),
        ("Replay CSV", BENCH_CSV, LINE_CSV, 1000),
    ];

    println!("{:<30} {:>14}", "Benchmark", "Time");
    println!("{}", "-".repeat(45));

    let mut total = Duration::ZERO;

    for (name, code, iterations) in &traces {
        let dur = run_trace_benchmark(name, code, *iterations);
        total += dur;
        println!("{:<30} {:>12.2?}", name, dur);
    }

    for (name, code, line, iterations) in &chains {
        let dur = run_chain_benchmark(name, code, line, *iterations);
        total += dur;
        println!("{:<30} {:>12.2?}", name, dur);
    }

    let dur = run_interpreter_benchmark("Loop Sum", BENCH_LOOP_SUM, 100);
    total += dur;
    println!("{:<30} {:>12.2?}", "Interpret loop sum (10K)", dur);

    println!("{}", "-".repeat(45));
    println!("{:<30} {:>12.2?}", "TOTAL", total);

    // Verify correctness
    println!("\n=======================================================");
    println!("  Correctness Verification");
    println!("=======================================================\n");

    let verifications: Vec<(&str, &str, &str, TracedValue)> = vec![
        (
            "String helpers",
            BENCH_STRING_HELPERS,
            LINE_STRING_HELPERS,
            TracedValue::from(6),
        ),
        (
            "Array pipeline",
            BENCH_ARRAY_PIPELINE,
            LINE_ARRAY_PIPELINE,
            TracedValue::from("HBLA-GBLA-FBLA-EBLA-DBLA-CBLA"),
        ),
        ("CSV", BENCH_CSV, LINE_CSV, TracedValue::from(3)),
    ];

    println!("{:<20} {:>32} {:>4}", "Test", "Expected", "");
    println!("{}", "-".repeat(58));

    for (name, code, line, expected) in verifications {
        let actual = replay(code, line);
        let status = if actual == expected { "✓" } else { "✗" };
        println!("{:<20} {:>32} {:>4} {}", name, expected.to_string(), status, actual);
    }

    println!("\n=======================================================");
}

//! Tests for the scope tree: function scopes, scope lookup by position and
//! name, and executing traced functions.

extern crate literal_tracer;

use literal_tracer::runner::builtins::types::EvalContext;
use literal_tracer::runner::ds::operations::object::get_property;
use literal_tracer::{trace, TracedValue};

fn call(callee: &TracedValue, args: Vec<TracedValue>) -> TracedValue {
    let mut ctx = EvalContext::with_core();
    ctx.call_function(callee, TracedValue::Undefined, args)
        .expect("call should succeed")
}

fn prop(value: &TracedValue, key: &str) -> TracedValue {
    get_property(value, key).unwrap()
}

const NESTED: &str = "var sth = 'sth';\n\
                      function foo() {\n\
                      \x20  var baz = 'blah';\n\
                      \x20  function foo2() {\n\
                      \x20       var bar = 'asdf';\n\
                      \x20  }\n\
                      }\n\
                      var blubb;\n\n\n";

// ============================================================================
// Global scope
// ============================================================================

mod global_scope_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_globals_are_visible_everywhere() {
        let source = "var foo = 'foo';\nvar bar = 'bar';\n function foobar() {\n\treturn foo + bar;\n}";
        let result = trace(source).unwrap();

        for (line, column) in [(3, 1), (1, 2)] {
            let scope = result.scope_for_position(line, column);
            assert_eq!(scope.traced_value_for("foo"), TracedValue::from("foo"));
            assert_eq!(scope.traced_value_for("bar"), TracedValue::from("bar"));
            assert_eq!(
                call(&scope.traced_value_for("foobar"), vec![]),
                TracedValue::from("foobar")
            );
        }
    }

    #[test]
    fn test_root_has_no_parent_and_no_name() {
        let result = trace("var a = 1;").unwrap();
        assert_eq!(result.scope_name(), None);
        assert!(result.parent().is_empty());
        assert_eq!(result.root(), result);
    }

    #[test]
    fn test_function_locals_stay_in_the_function() {
        assert_eq!(
            trace("function foo() {var a = 2;};").unwrap().traced_value_for("a"),
            TracedValue::Undefined
        );
        assert_eq!(
            trace("var a = 5; function foo() {var a = 2;};")
                .unwrap()
                .traced_value_for("a"),
            TracedValue::from(5)
        );
    }
}

// ============================================================================
// Function declarations
// ============================================================================

mod function_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_declared_function_is_stored() {
        let cursor = trace("function Cursor(){}").unwrap().traced_value_for("Cursor");
        assert!(cursor.is_callable());
    }

    #[test]
    fn test_constructor_registered_on_prototype() {
        let result = trace("function Cursor(){}\nCursor.prototype.constructor = Cursor;").unwrap();
        let cursor = result.traced_value_for("Cursor");
        let prototype = prop(&cursor, "prototype");
        assert!(!prototype.is_nullish());
        assert!(prop(&prototype, "constructor").same_identity(&cursor));
    }

    #[test]
    fn test_members_on_prototype() {
        let source = "function Cursor(){}\nCursor.prototype.constructor = Cursor;\n\
                      Cursor.prototype.view = 'someView';";
        let cursor = trace(source).unwrap().traced_value_for("Cursor");
        assert_eq!(
            prop(&prop(&cursor, "prototype"), "view"),
            TracedValue::from("someView")
        );
    }

    #[test]
    fn test_function_expressions_in_variables() {
        let value = trace("var someFunction = function() {var bar = 'asdf'}")
            .unwrap()
            .traced_value_for("someFunction");
        assert!(value.is_callable());
    }

    #[test]
    fn test_function_expressions_on_prototype() {
        let cursor = trace("function Cursor(){}\nCursor.prototype.fnc = function() {};")
            .unwrap()
            .traced_value_for("Cursor");
        assert!(prop(&prop(&cursor, "prototype"), "fnc").is_callable());
    }

    #[test]
    fn test_assignments_to_this_land_in_the_function_scope() {
        let result = trace("function Something() { \n\tthis.foo = 'bar'\n}").unwrap();
        assert_eq!(
            result.scope_by_name("Something").traced_value_for("foo"),
            TracedValue::from("bar")
        );
    }

    #[test]
    fn test_functions_without_arguments_are_executable() {
        let source = "function helloWorld() {\n   return \"Hello World\";}";
        let hello = trace(source).unwrap().traced_value_for("helloWorld");
        assert_eq!(call(&hello, vec![]), TracedValue::from("Hello World"));

        let source = "function helloWorldBuilder() {\n\
                      \x20  return function() { \n\
                      \x20      return \"Hello World!\";\n\
                      \x20  } \n\
                      }";
        let builder = trace(source).unwrap().traced_value_for("helloWorldBuilder");
        let built = call(&builder, vec![]);
        assert_eq!(call(&built, vec![]), TracedValue::from("Hello World!"));
    }

    #[test]
    fn test_functions_with_arguments_are_executable() {
        let source = "function helloWorld(who) {\n   return \"Hello \" + who;}";
        let hello = trace(source).unwrap().traced_value_for("helloWorld");
        assert_eq!(call(&hello, vec!["Foo".into()]), TracedValue::from("Hello Foo"));

        let source = "var helloWorld = function(who) {\n   return \"Hello \" + who;}";
        let hello = trace(source).unwrap().traced_value_for("helloWorld");
        assert_eq!(call(&hello, vec!["Foo".into()]), TracedValue::from("Hello Foo"));

        let source = "function HelloWorld() {}; HelloWorld.prototype.hello = function(who) {\n\
                      \x20  return \"Hello \" \n + who;}";
        let class = trace(source).unwrap().traced_value_for("HelloWorld");
        let hello = prop(&prop(&class, "prototype"), "hello");
        assert_eq!(call(&hello, vec!["Foo".into()]), TracedValue::from("Hello Foo"));
    }

    #[test]
    fn test_functions_close_over_enclosing_literals() {
        let source = "function a () { \r\n    var greeting = \"Hello \"; \r\n    function b (name) {\r\n        return greeting + name;\r\n    }\r\n}";
        let b = trace(source).unwrap().scope_for_position(2, 1).traced_value_for("b");
        assert_eq!(call(&b, vec!["world".into()]), TracedValue::from("Hello world"));

        let source = "var greeting = \"Hello \" ;\r\n function a () { \r\n    function b (name) {\r\n        return greeting + name;\r\n    }\r\n}";
        let b = trace(source).unwrap().scope_for_position(3, 1).traced_value_for("b");
        assert_eq!(call(&b, vec!["World".into()]), TracedValue::from("Hello World"));
    }
}

// ============================================================================
// Scope lookup
// ============================================================================

mod lookup_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FOO_FOO2: &str = "function foo() {\n   function foo2() {\n        var bar = 'asdf';\n   }\n}";

    #[test]
    fn test_scope_by_name() {
        let result = trace("function foo() { var bar = 'asdf'; }").unwrap();
        assert_eq!(
            result.scope_by_name("foo").traced_value_for("bar"),
            TracedValue::from("asdf")
        );

        let result = trace(FOO_FOO2).unwrap();
        assert_eq!(
            result.scope_by_name("foo2").traced_value_for("bar"),
            TracedValue::from("asdf")
        );
    }

    #[test]
    fn test_missing_scope_is_empty() {
        let result = trace(FOO_FOO2).unwrap();
        let missing = result.scope_by_name("asdf");
        assert!(missing.is_empty());
        assert_eq!(missing.traced_value_for("bar"), TracedValue::Undefined);
        assert!(missing.all_assignments().is_empty());
    }

    #[test]
    fn test_scopes_carry_locations() {
        let result = trace(FOO_FOO2).unwrap();

        let foo = result.scope_by_name("foo").location().unwrap();
        assert_eq!(foo.start.line, 1);
        assert_eq!(foo.end.line, 5);

        let foo2 = result.scope_by_name("foo2").location().unwrap();
        assert_eq!(foo2.start.line, 2);
        assert_eq!(foo2.end.line, 4);
    }

    #[test]
    fn test_scope_for_line() {
        let result = trace(FOO_FOO2).unwrap();
        assert!(!result.scope_for_position(3, 1).is_empty());
        assert_eq!(result.scope_for_position(2, 1), result.scope_by_name("foo"));
        assert_eq!(result.scope_for_position(3, 1), result.scope_by_name("foo2"));
    }

    #[test]
    fn test_function_expressions_open_named_scopes() {
        let result = trace("var someFunction = function() {\n var bar = 'asdf';\n}").unwrap();
        let by_name = result.scope_by_name("someFunction");
        assert!(!by_name.is_empty());
        assert_eq!(result.scope_for_position(2, 1), by_name);
        assert_eq!(
            result.scope_for_position(2, 1).traced_value_for("bar"),
            TracedValue::from("asdf")
        );
    }

    #[test]
    fn test_prototype_member_functions_open_scopes() {
        let source = "function Cursor(){}\nCursor.prototype.fnc = function() {\n var bar = 'asdf'\n};";
        let scope = trace(source).unwrap().scope_for_position(3, 1);
        assert!(!scope.is_empty());
        assert_eq!(scope.traced_value_for("bar"), TracedValue::from("asdf"));
    }

    #[test]
    fn test_parent_variables_are_visible() {
        let source = "function foo() {\n   var baz = 'blah';\n   function foo2() {\n        var bar = 'asdf';\n   }\n}";
        let scope = trace(source).unwrap().scope_for_position(4, 1);
        assert_eq!(scope.traced_value_for("bar"), TracedValue::from("asdf"));
        assert_eq!(scope.traced_value_for("baz"), TracedValue::from("blah"));
    }

    #[test]
    fn test_nearest_binding_wins() {
        let source = "var baz = 'notBlah';\nfunction foo() {\n   var baz = 'blah';\n   function foo2() {\n        var bar = 'asdf';\n   }\n}";
        let scope = trace(source).unwrap().scope_for_position(4, 1);
        assert_eq!(scope.traced_value_for("baz"), TracedValue::from("blah"));
    }

    #[test]
    fn test_parent_and_children_navigation() {
        let result = trace(FOO_FOO2).unwrap();
        let foo2 = result.scope_by_name("foo2");
        assert_eq!(foo2.parent(), result.scope_by_name("foo"));
        assert_eq!(foo2.parent().parent(), result);

        let children = result.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].scope_name(), Some("foo"));
    }
}

// ============================================================================
// Visible assignments
// ============================================================================

mod assignments_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_assignments_collects_enclosing_scopes() {
        let source = "var sth = 'sth';\nfunction foo() {\n   var baz = 'blah';\n   function foo2() {\n        var bar = 'asdf';\n   }\n}";

        let all = trace(source).unwrap().scope_for_position(5, 1).all_assignments();
        assert_eq!(all.get("bar"), Some(&TracedValue::from("asdf")));
        assert_eq!(all.get("baz"), Some(&TracedValue::from("blah")));
        assert_eq!(all.get("sth"), Some(&TracedValue::from("sth")));

        let all = trace(source).unwrap().scope_for_position(3, 1).all_assignments();
        assert_eq!(all.get("bar"), None);
        assert_eq!(all.get("baz"), Some(&TracedValue::from("blah")));
        assert_eq!(all.get("sth"), Some(&TracedValue::from("sth")));
    }

    #[test]
    fn test_single_line_scopes_by_column() {
        let source = "var sth = 'sth';function foo() {var baz = 'blah';function foo2() {var bar = 'asdf';}}";

        let all = trace(source).unwrap().scope_for_position(1, 72).all_assignments();
        assert_eq!(all.get("bar"), Some(&TracedValue::from("asdf")));
        assert_eq!(all.get("baz"), Some(&TracedValue::from("blah")));
        assert_eq!(all.get("sth"), Some(&TracedValue::from("sth")));

        let all = trace(source).unwrap().scope_for_position(1, 47).all_assignments();
        assert_eq!(all.get("bar"), None);
        assert_eq!(all.get("baz"), Some(&TracedValue::from("blah")));
        assert_eq!(all.get("sth"), Some(&TracedValue::from("sth")));
    }

    #[test]
    fn test_inner_bindings_hide_outer_ones() {
        let source = "var x = 'outer';\nfunction f() {\n  var x = 'inner';\n  return x;\n}";
        let all = trace(source).unwrap().scope_for_position(3, 1).all_assignments();
        assert_eq!(all.get("x"), Some(&TracedValue::from("inner")));
        assert_eq!(all.keys().filter(|k| *k == "x").count(), 1);
    }
}

// ============================================================================
// Multi-line programs
// ============================================================================

mod position_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finds_the_right_scope() {
        let result = trace(NESTED).unwrap();
        let name_at = |line, column| {
            result
                .scope_for_position(line, column)
                .scope_name()
                .map(str::to_string)
        };

        assert_eq!(name_at(1, 1), None);
        assert_eq!(
            result.scope_for_position(1, 1).traced_value_for("sth"),
            TracedValue::from("sth")
        );

        assert_eq!(name_at(2, 1), None);
        assert_eq!(name_at(2, 15), None);
        assert_eq!(name_at(2, 16).as_deref(), Some("foo"));

        assert_eq!(name_at(4, 1).as_deref(), Some("foo"));
        assert_eq!(name_at(4, 19).as_deref(), Some("foo"));
        assert_eq!(name_at(4, 20).as_deref(), Some("foo2"));

        assert_eq!(name_at(5, 4).as_deref(), Some("foo2"));
        assert_eq!(name_at(6, 3).as_deref(), Some("foo2"));
        assert_eq!(name_at(6, 4).as_deref(), Some("foo"));

        assert_eq!(name_at(7, 0).as_deref(), Some("foo"));
        assert_eq!(name_at(7, 1), None);
        assert_eq!(name_at(8, 0), None);

        assert!(!result.scope_for_position(10, 0).is_empty());
        assert_eq!(
            result.scope_for_position(10, 0),
            result.scope_for_position(7, 1)
        );
    }
}

// ============================================================================
// Context entries
// ============================================================================

mod context_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use literal_tracer::tracer::ContextKind;

    #[test]
    fn test_declarations_and_calls_are_recorded() {
        let source = "var index = 2;\nvar howMany = 1;\nvar anArray = [\"a\", \"b\"];\nanArray.push(\"d\");\n";
        let result = trace(source).unwrap();

        assert_eq!(result.context_for("index")[0].start_line(), 1);
        assert_eq!(result.context_for("howMany")[0].start_line(), 2);

        let entries = result.context_for("anArray");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, ContextKind::Declaration);
        assert_eq!(entries[0].start_line(), 3);
        assert_eq!(entries[1].kind, ContextKind::Call);
        assert_eq!(entries[1].start_line(), 4);
    }

    #[test]
    fn test_calls_on_unknown_names_are_not_recorded() {
        let result = trace("console.log('x');").unwrap();
        assert!(result.context_for("console").is_empty());
    }

    #[test]
    fn test_function_declarations_are_recorded_once() {
        let result = trace("function f() {}\nfunction f() {}\n").unwrap();
        let entries = result.context_for("f");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ContextKind::FunctionDeclaration);
    }
}

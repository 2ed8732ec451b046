use super::api::JsParser;
use super::api::Rule;

use pest::consumes_to;
use pest::parses_to;
use pest::Parser;

#[test]
fn test_decimal_number_with_no_dot() {
    parses_to! {
        parser: JsParser,
        input: "10",
        rule: Rule::numeric_literal,
        tokens: [
            numeric_literal(0, 2)
        ]
    };
}

#[test]
fn test_decimal_number_with_dot_and_exponent() {
    parses_to! {
        parser: JsParser,
        input: "1.123e10",
        rule: Rule::numeric_literal,
        tokens: [
            numeric_literal(0, 8)
        ]
    };
}

#[test]
fn test_hex_number() {
    parses_to! {
        parser: JsParser,
        input: "0xFF",
        rule: Rule::numeric_literal,
        tokens: [
            numeric_literal(0, 4)
        ]
    };
}

#[test]
fn test_number_followed_by_letter_is_rejected() {
    assert!(JsParser::parse(Rule::numeric_literal, "3in").is_err());
}

#[test]
fn test_single_quoted_string() {
    parses_to! {
        parser: JsParser,
        input: "'abc'",
        rule: Rule::string_literal,
        tokens: [
            string_literal(0, 5, [
                single_string_characters(1, 4)
            ])
        ]
    };
}

#[test]
fn test_double_quoted_string_with_escaped_quote() {
    parses_to! {
        parser: JsParser,
        input: r#""a\"b""#,
        rule: Rule::string_literal,
        tokens: [
            string_literal(0, 6, [
                double_string_characters(1, 5)
            ])
        ]
    };
}

#[test]
fn test_empty_string() {
    parses_to! {
        parser: JsParser,
        input: "''",
        rule: Rule::string_literal,
        tokens: [
            string_literal(0, 2, [
                single_string_characters(1, 1)
            ])
        ]
    };
}

#[test]
fn test_identifier() {
    parses_to! {
        parser: JsParser,
        input: "$foo_1",
        rule: Rule::identifier,
        tokens: [
            identifier(0, 6)
        ]
    };
}

#[test]
fn test_reserved_words_are_not_identifiers() {
    for word in &["var", "function", "in", "instanceof", "this", "null", "new"] {
        assert!(
            JsParser::parse(Rule::identifier, word).is_err(),
            "{} parsed as identifier",
            word
        );
    }
}

#[test]
fn test_identifiers_prefixed_by_reserved_words() {
    for word in &["variable", "instanceofFoo", "inner", "newValue", "thisOne", "done"] {
        let parsed = JsParser::parse(Rule::identifier, word)
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(parsed.as_str(), *word);
    }
}

#[test]
fn test_empty_statement() {
    parses_to! {
        parser: JsParser,
        input: ";",
        rule: Rule::empty_statement,
        tokens: [
            empty_statement(0, 1)
        ]
    };
}

#[test]
fn test_break_statement() {
    parses_to! {
        parser: JsParser,
        input: "break;",
        rule: Rule::break_statement,
        tokens: [
            break_statement(0, 6, [
                kw_break(0, 5)
            ])
        ]
    };
}

#[test]
fn test_variable_statement_without_initializer() {
    parses_to! {
        parser: JsParser,
        input: "let a, b;",
        rule: Rule::variable_statement,
        tokens: [
            variable_statement(0, 9, [
                var_kind(0, 3),
                variable_declaration(4, 5, [
                    identifier(4, 5)
                ]),
                variable_declaration(7, 8, [
                    identifier(7, 8)
                ])
            ])
        ]
    };
}

#[test]
fn test_variable_statement_with_initializer() {
    parses_to! {
        parser: JsParser,
        input: "var a = 1;",
        rule: Rule::variable_statement,
        tokens: [
            variable_statement(0, 10, [
                var_kind(0, 3),
                variable_declaration(4, 9, [
                    identifier(4, 5),
                    assignment_expression(8, 9, [
                        conditional_expression(8, 9, [
                            logical_or_expression(8, 9, [
                                logical_and_expression(8, 9, [
                                    equality_expression(8, 9, [
                                        relational_expression(8, 9, [
                                            additive_expression(8, 9, [
                                                multiplicative_expression(8, 9, [
                                                    unary_expression(8, 9, [
                                                        postfix_expression(8, 9, [
                                                            left_hand_side_expression(8, 9, [
                                                                primary_expression(8, 9, [
                                                                    numeric_literal(8, 9)
                                                                ])
                                                            ])
                                                        ])
                                                    ])
                                                ])
                                            ])
                                        ])
                                    ])
                                ])
                            ])
                        ])
                    ])
                ])
            ])
        ]
    };
}

#[test]
fn test_member_call_chain() {
    parses_to! {
        parser: JsParser,
        input: "a.b(c)",
        rule: Rule::left_hand_side_expression,
        tokens: [
            left_hand_side_expression(0, 6, [
                primary_expression(0, 1, [
                    identifier(0, 1)
                ]),
                dot_member(1, 3, [
                    identifier_name(2, 3)
                ]),
                arguments(3, 6, [
                    assignment_expression(4, 5, [
                        conditional_expression(4, 5, [
                            logical_or_expression(4, 5, [
                                logical_and_expression(4, 5, [
                                    equality_expression(4, 5, [
                                        relational_expression(4, 5, [
                                            additive_expression(4, 5, [
                                                multiplicative_expression(4, 5, [
                                                    unary_expression(4, 5, [
                                                        postfix_expression(4, 5, [
                                                            left_hand_side_expression(4, 5, [
                                                                primary_expression(4, 5, [
                                                                    identifier(4, 5)
                                                                ])
                                                            ])
                                                        ])
                                                    ])
                                                ])
                                            ])
                                        ])
                                    ])
                                ])
                            ])
                        ])
                    ])
                ])
            ])
        ]
    };
}

#[test]
fn test_keyword_property_names_are_allowed() {
    parses_to! {
        parser: JsParser,
        input: "a.new",
        rule: Rule::left_hand_side_expression,
        tokens: [
            left_hand_side_expression(0, 5, [
                primary_expression(0, 1, [
                    identifier(0, 1)
                ]),
                dot_member(1, 5, [
                    identifier_name(2, 5)
                ])
            ])
        ]
    };
}

#[test]
fn test_new_expression_without_arguments() {
    parses_to! {
        parser: JsParser,
        input: "new Foo",
        rule: Rule::new_expression,
        tokens: [
            new_expression(0, 7, [
                kw_new(0, 3),
                new_callee(4, 7, [
                    primary_expression(4, 7, [
                        identifier(4, 7)
                    ])
                ])
            ])
        ]
    };
}

#[test]
fn test_assignment_operators_do_not_swallow_comparison() {
    parses_to! {
        parser: JsParser,
        input: "+=",
        rule: Rule::assignment_operator,
        tokens: [
            assignment_operator(0, 2)
        ]
    };
    assert!(JsParser::parse(Rule::assignment_operator, "==").is_err());
    assert!(JsParser::parse(Rule::assignment_operator, "=>").is_err());
}

#[test]
fn test_comments_are_skipped() {
    let source = "// leading\nvar a = 1; /* block\n comment */ a;";
    let script = JsParser::parse(Rule::script, source).unwrap().next().unwrap();
    let rules: Vec<Rule> = script.into_inner().map(|p| p.as_rule()).collect();
    assert_eq!(
        rules,
        vec![Rule::variable_statement, Rule::expression_statement, Rule::EOI]
    );
}

#[test]
fn test_statements_without_semicolons() {
    let source = "var a = 1\nvar b = a\nb";
    let script = JsParser::parse(Rule::script, source).unwrap().next().unwrap();
    assert_eq!(script.into_inner().count(), 4);
}

#[test]
fn test_block_is_preferred_over_object_literal_at_statement_start() {
    let script = JsParser::parse(Rule::script, "{ a; }").unwrap().next().unwrap();
    let first = script.into_inner().next().unwrap();
    assert_eq!(first.as_rule(), Rule::block_statement);
}

use std::iter::Peekable;
use std::rc::Rc;

use pest::error::{Error, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use pest::{Parser, Span};
use pest_derive::Parser;

use super::ast::*;
use super::util::{parse_numeric_literal, unescape_string_literal, LineIndex, NumericValue};

#[derive(Parser)]
#[grammar = "parser/js_grammar.pest"] // relative to src
pub struct JsParser;

impl JsParser {
    pub fn parse_to_ast_from_str(script: &str) -> Result<ProgramData, Error<Rule>> {
        let pairs = JsParser::parse(Rule::script, script)?;
        let builder = AstBuilder {
            lines: LineIndex::new(script),
        };
        let mut program = None;
        for pair in pairs {
            if pair.as_rule() == Rule::script {
                program = Some(builder.build_ast_from_script(pair)?);
            }
        }
        match program {
            Some(p) => Ok(p),
            None => Err(Error::new_from_pos(
                ErrorVariant::CustomError {
                    message: "Script produced no program".to_string(),
                },
                pest::Position::from_start(script),
            )),
        }
    }

    pub fn parse_to_pairs(script: &str) -> Result<Pairs<Rule>, Error<Rule>> {
        JsParser::parse(Rule::script, script)
    }
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> Error<Rule> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn get_missing_child_error(id: i32, rule: Rule, span: Span) -> Error<Rule> {
    let message = format!("Missing child in [{:?}] - {}", rule, id);
    Error::new_from_span(ErrorVariant::CustomError { message }, span)
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_function
            | Rule::kw_return
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_do
            | Rule::kw_for
            | Rule::kw_break
            | Rule::kw_continue
            | Rule::kw_throw
            | Rule::kw_try
            | Rule::kw_catch
            | Rule::kw_finally
            | Rule::kw_new
    )
}

/// Walks the children of a pair while skipping keyword tokens.
struct PairCursor<'i> {
    rule: Rule,
    span: Span<'i>,
    pairs: Peekable<Pairs<'i, Rule>>,
}

impl<'i> PairCursor<'i> {
    fn new(pair: Pair<'i, Rule>) -> Self {
        PairCursor {
            rule: pair.as_rule(),
            span: pair.as_span(),
            pairs: pair.into_inner().peekable(),
        }
    }

    fn skip_keywords(&mut self) {
        while let Some(p) = self.pairs.peek() {
            if is_keyword(p.as_rule()) {
                self.pairs.next();
            } else {
                break;
            }
        }
    }

    fn peek_rule(&mut self) -> Option<Rule> {
        self.skip_keywords();
        self.pairs.peek().map(|p| p.as_rule())
    }

    fn next_optional(&mut self) -> Option<Pair<'i, Rule>> {
        self.skip_keywords();
        self.pairs.next()
    }

    fn next_if(&mut self, rule: Rule) -> Option<Pair<'i, Rule>> {
        if self.peek_rule() == Some(rule) {
            self.pairs.next()
        } else {
            None
        }
    }

    fn next_pair(&mut self, id: i32) -> Result<Pair<'i, Rule>, Error<Rule>> {
        let (rule, span) = (self.rule, self.span);
        self.next_optional()
            .ok_or_else(|| get_missing_child_error(id, rule, span))
    }
}

struct AstBuilder<'a> {
    lines: LineIndex<'a>,
}

impl<'a> AstBuilder<'a> {
    fn meta(&self, pair: &Pair<Rule>) -> Meta {
        let span = pair.as_span();
        Meta {
            start_index: span.start(),
            end_index: span.end(),
            loc: SourceLocation {
                start: self.lines.position(span.start()),
                end: self.lines.position(span.end()),
            },
        }
    }

    fn build_ast_from_script(&self, pair: Pair<Rule>) -> Result<ProgramData, Error<Rule>> {
        let whole = self.meta(&pair);
        let mut body = vec![];
        for inner_pair in pair.into_inner() {
            if inner_pair.as_rule() == Rule::EOI {
                continue;
            }
            body.push(self.build_ast_from_statement(inner_pair)?);
        }
        // Program spans its first to last statement, like esprima's.
        let meta = match (body.first(), body.last()) {
            (Some(first), Some(last)) => Meta::spanning(first.get_meta(), last.get_meta()),
            _ => whole,
        };
        Ok(ProgramData { meta, body })
    }

    fn build_ast_from_statement(&self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = self.meta(&pair);
        Ok(match pair.as_rule() {
            Rule::function_declaration => StatementType::DeclarationStatement(
                DeclarationType::FunctionDeclaration(Rc::new(self.build_ast_from_function(pair)?)),
            ),
            Rule::variable_statement => StatementType::DeclarationStatement(
                DeclarationType::VariableDeclaration(self.build_ast_from_variable_declaration(pair)?),
            ),
            Rule::block_statement => {
                StatementType::BlockStatement(self.build_ast_from_block_statement(pair)?)
            }
            Rule::empty_statement => StatementType::EmptyStatement { meta },
            Rule::expression_statement => {
                let mut cursor = PairCursor::new(pair);
                StatementType::ExpressionStatement {
                    meta,
                    expression: self.build_ast_from_expression(cursor.next_pair(1)?)?,
                }
            }
            Rule::if_statement => {
                let mut cursor = PairCursor::new(pair);
                let test = self.build_ast_from_expression(cursor.next_pair(2)?)?;
                let consequent = Box::new(self.build_ast_from_statement(cursor.next_pair(3)?)?);
                let alternate = match cursor.next_optional() {
                    Some(p) => Some(Box::new(self.build_ast_from_statement(p)?)),
                    None => None,
                };
                StatementType::IfStatement {
                    meta,
                    test,
                    consequent,
                    alternate,
                }
            }
            Rule::while_statement => {
                let mut cursor = PairCursor::new(pair);
                let test = self.build_ast_from_expression(cursor.next_pair(4)?)?;
                let body = Box::new(self.build_ast_from_statement(cursor.next_pair(5)?)?);
                StatementType::WhileStatement { meta, test, body }
            }
            Rule::do_while_statement => {
                let mut cursor = PairCursor::new(pair);
                let body = Box::new(self.build_ast_from_statement(cursor.next_pair(6)?)?);
                let test = self.build_ast_from_expression(cursor.next_pair(7)?)?;
                StatementType::DoWhileStatement { meta, body, test }
            }
            Rule::for_statement => self.build_ast_from_for_statement(pair)?,
            Rule::return_statement => {
                let mut cursor = PairCursor::new(pair);
                let argument = match cursor.next_optional() {
                    Some(p) => Some(self.build_ast_from_expression(p)?),
                    None => None,
                };
                StatementType::ReturnStatement { meta, argument }
            }
            Rule::break_statement => StatementType::BreakStatement { meta },
            Rule::continue_statement => StatementType::ContinueStatement { meta },
            Rule::throw_statement => {
                let mut cursor = PairCursor::new(pair);
                StatementType::ThrowStatement {
                    meta,
                    argument: self.build_ast_from_expression(cursor.next_pair(8)?)?,
                }
            }
            Rule::try_statement => self.build_ast_from_try_statement(pair)?,
            _ => return Err(get_unexpected_error(9, &pair)),
        })
    }

    fn build_ast_from_block_statement(
        &self,
        pair: Pair<Rule>,
    ) -> Result<BlockStatementData, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut body = vec![];
        for inner_pair in pair.into_inner() {
            body.push(self.build_ast_from_statement(inner_pair)?);
        }
        Ok(BlockStatementData { meta, body })
    }

    fn build_ast_from_variable_declaration(
        &self,
        pair: Pair<Rule>,
    ) -> Result<VariableDeclarationData, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut kind = VariableDeclarationKind::Var;
        let mut declarations = vec![];
        for var_pair in pair.into_inner() {
            match var_pair.as_rule() {
                Rule::var_kind => {
                    kind = match var_pair.as_str() {
                        "let" => VariableDeclarationKind::Let,
                        "const" => VariableDeclarationKind::Const,
                        _ => VariableDeclarationKind::Var,
                    }
                }
                Rule::variable_declaration => {
                    let declarator_meta = self.meta(&var_pair);
                    let mut cursor = PairCursor::new(var_pair);
                    let id = self.get_identifier_data(cursor.next_pair(10)?);
                    let init = match cursor.next_optional() {
                        Some(p) => Some(self.build_ast_from_assignment_expression(p)?),
                        None => None,
                    };
                    declarations.push(VariableDeclaratorData {
                        meta: declarator_meta,
                        id,
                        init,
                    });
                }
                _ => return Err(get_unexpected_error(11, &var_pair)),
            }
        }
        Ok(VariableDeclarationData {
            meta,
            declarations,
            kind,
        })
    }

    fn build_ast_from_for_statement(&self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let init = match cursor.next_if(Rule::for_init) {
            Some(init_pair) => {
                let mut init_cursor = PairCursor::new(init_pair);
                let inner_pair = init_cursor.next_pair(12)?;
                Some(if inner_pair.as_rule() == Rule::for_variable_declaration {
                    VariableDeclarationOrExpression::VariableDeclaration(
                        self.build_ast_from_variable_declaration(inner_pair)?,
                    )
                } else {
                    VariableDeclarationOrExpression::Expression(
                        self.build_ast_from_expression(inner_pair)?,
                    )
                })
            }
            None => None,
        };
        let test = match cursor.next_if(Rule::for_test) {
            Some(p) => Some(self.build_ast_from_expression(PairCursor::new(p).next_pair(13)?)?),
            None => None,
        };
        let update = match cursor.next_if(Rule::for_update) {
            Some(p) => Some(self.build_ast_from_expression(PairCursor::new(p).next_pair(14)?)?),
            None => None,
        };
        let body = Box::new(self.build_ast_from_statement(cursor.next_pair(15)?)?);
        Ok(StatementType::ForStatement {
            meta,
            init,
            test,
            update,
            body,
        })
    }

    fn build_ast_from_try_statement(&self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let block = self.build_ast_from_block_statement(cursor.next_pair(16)?)?;
        let handler = match cursor.next_if(Rule::catch_clause) {
            Some(catch_pair) => {
                let catch_meta = self.meta(&catch_pair);
                let mut catch_cursor = PairCursor::new(catch_pair);
                let param = catch_cursor
                    .next_if(Rule::identifier)
                    .map(|p| self.get_identifier_data(p));
                let body = self.build_ast_from_block_statement(catch_cursor.next_pair(17)?)?;
                Some(CatchClauseData {
                    meta: catch_meta,
                    param,
                    body,
                })
            }
            None => None,
        };
        let finalizer = match cursor.next_if(Rule::finally_clause) {
            Some(finally_pair) => Some(
                self.build_ast_from_block_statement(PairCursor::new(finally_pair).next_pair(18)?)?,
            ),
            None => None,
        };
        Ok(StatementType::TryStatement {
            meta,
            block,
            handler,
            finalizer,
        })
    }

    fn build_ast_from_function(&self, pair: Pair<Rule>) -> Result<FunctionData, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let id = cursor
            .next_if(Rule::identifier)
            .map(|p| self.get_identifier_data(p));
        let params = self.get_formal_parameters(cursor.next_pair(19)?);
        let body_pair = cursor.next_pair(20)?;
        Ok(FunctionData {
            meta,
            id,
            params,
            body: FunctionBodyOrExpression::FunctionBody(self.build_ast_from_function_body(body_pair)?),
            is_arrow: false,
        })
    }

    fn build_ast_from_arrow_function(&self, pair: Pair<Rule>) -> Result<FunctionData, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let params = self.get_formal_parameters(cursor.next_pair(21)?);
        let body_pair = cursor.next_pair(22)?;
        let body = if body_pair.as_rule() == Rule::function_body {
            FunctionBodyOrExpression::FunctionBody(self.build_ast_from_function_body(body_pair)?)
        } else {
            FunctionBodyOrExpression::Expression(Box::new(
                self.build_ast_from_assignment_expression(body_pair)?,
            ))
        };
        Ok(FunctionData {
            meta,
            id: None,
            params,
            body,
            is_arrow: true,
        })
    }

    fn get_formal_parameters(&self, pair: Pair<Rule>) -> Vec<IdentifierData> {
        pair.into_inner()
            .filter(|p| p.as_rule() == Rule::identifier)
            .map(|p| self.get_identifier_data(p))
            .collect()
    }

    fn build_ast_from_function_body(
        &self,
        pair: Pair<Rule>,
    ) -> Result<FunctionBodyData, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut body = vec![];
        for inner_pair in pair.into_inner() {
            body.push(self.build_ast_from_statement(inner_pair)?);
        }
        Ok(FunctionBodyData { meta, body })
    }

    fn get_identifier_data(&self, pair: Pair<Rule>) -> IdentifierData {
        IdentifierData {
            name: pair.as_str().to_string(),
            meta: self.meta(&pair),
        }
    }

    fn build_ast_from_expression(&self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut expressions = vec![];
        for inner_pair in pair.into_inner() {
            expressions.push(self.build_ast_from_assignment_expression(inner_pair)?);
        }
        if expressions.len() == 1 {
            if let Some(e) = expressions.pop() {
                return Ok(e);
            }
        }
        Ok(ExpressionType::SequenceExpression { meta, expressions })
    }

    fn build_ast_from_assignment_expression(
        &self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let first = cursor.next_pair(23)?;
        if first.as_rule() == Rule::arrow_function {
            return Ok(ExpressionType::FunctionExpression(Rc::new(
                self.build_ast_from_arrow_function(first)?,
            )));
        }
        let left = self.build_ast_from_expression_pair(first)?;
        match cursor.next_optional() {
            None => Ok(left),
            Some(op_pair) => {
                let operator = match op_pair.as_str() {
                    "=" => AssignmentOperator::Equals,
                    "+=" => AssignmentOperator::AddEquals,
                    "-=" => AssignmentOperator::SubtractEquals,
                    "*=" => AssignmentOperator::MultiplyEquals,
                    "/=" => AssignmentOperator::DivideEquals,
                    "%=" => AssignmentOperator::ModuloEquals,
                    _ => return Err(get_unexpected_error(24, &op_pair)),
                };
                match left {
                    ExpressionType::Identifier(_) | ExpressionType::MemberExpression(_) => {}
                    _ => {
                        return Err(Error::new_from_span(
                            ErrorVariant::CustomError {
                                message: "Invalid left-hand side in assignment".to_string(),
                            },
                            op_pair.as_span(),
                        ))
                    }
                }
                let right = self.build_ast_from_assignment_expression(cursor.next_pair(25)?)?;
                Ok(ExpressionType::AssignmentExpression {
                    meta,
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
        }
    }

    /// Dispatches any expression-level pair to its builder.
    fn build_ast_from_expression_pair(
        &self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        match pair.as_rule() {
            Rule::expression => self.build_ast_from_expression(pair),
            Rule::assignment_expression => self.build_ast_from_assignment_expression(pair),
            Rule::conditional_expression => self.build_ast_from_conditional_expression(pair),
            Rule::logical_or_expression
            | Rule::logical_and_expression
            | Rule::equality_expression
            | Rule::relational_expression
            | Rule::additive_expression
            | Rule::multiplicative_expression => self.build_ast_from_binary_chain(pair),
            Rule::unary_expression => self.build_ast_from_unary_expression(pair),
            Rule::postfix_expression => self.build_ast_from_postfix_expression(pair),
            Rule::left_hand_side_expression => self.build_ast_from_left_hand_side_expression(pair),
            Rule::primary_expression => self.build_ast_from_primary_expression(pair),
            _ => Err(get_unexpected_error(26, &pair)),
        }
    }

    fn build_ast_from_conditional_expression(
        &self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let test = self.build_ast_from_expression_pair(cursor.next_pair(27)?)?;
        match cursor.next_optional() {
            None => Ok(test),
            Some(consequent_pair) => {
                let consequent = self.build_ast_from_assignment_expression(consequent_pair)?;
                let alternate = self.build_ast_from_assignment_expression(cursor.next_pair(28)?)?;
                Ok(ExpressionType::ConditionalExpression {
                    meta,
                    test: Box::new(test),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                })
            }
        }
    }

    fn build_ast_from_binary_chain(&self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let mut cursor = PairCursor::new(pair);
        let mut left = self.build_ast_from_expression_pair(cursor.next_pair(29)?)?;
        while let Some(op_pair) = cursor.next_optional() {
            let right = self.build_ast_from_expression_pair(cursor.next_pair(30)?)?;
            let meta = Meta::spanning(left.get_meta(), right.get_meta());
            left = match op_pair.as_rule() {
                Rule::or_operator | Rule::and_operator => ExpressionType::LogicalExpression {
                    meta,
                    operator: if op_pair.as_rule() == Rule::or_operator {
                        LogicalOperator::Or
                    } else {
                        LogicalOperator::And
                    },
                    left: Box::new(left),
                    right: Box::new(right),
                },
                _ => {
                    let operator = match op_pair.as_str() {
                        "==" => BinaryOperator::EqualEqual,
                        "!=" => BinaryOperator::NotEqual,
                        "===" => BinaryOperator::StrictlyEqual,
                        "!==" => BinaryOperator::StrictlyUnequal,
                        "<" => BinaryOperator::LessThan,
                        "<=" => BinaryOperator::LessThanEqual,
                        ">" => BinaryOperator::GreaterThan,
                        ">=" => BinaryOperator::GreaterThanEqual,
                        "+" => BinaryOperator::Add,
                        "-" => BinaryOperator::Subtract,
                        "*" => BinaryOperator::Multiply,
                        "/" => BinaryOperator::Divide,
                        "%" => BinaryOperator::Modulo,
                        "in" => BinaryOperator::In,
                        "instanceof" => BinaryOperator::InstanceOf,
                        _ => return Err(get_unexpected_error(31, &op_pair)),
                    };
                    ExpressionType::BinaryExpression {
                        meta,
                        operator,
                        left: Box::new(left),
                        right: Box::new(right),
                    }
                }
            };
        }
        Ok(left)
    }

    fn build_ast_from_unary_expression(
        &self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let first = cursor.next_pair(32)?;
        match first.as_rule() {
            Rule::postfix_expression => self.build_ast_from_postfix_expression(first),
            Rule::update_operator => {
                let argument = self.build_ast_from_unary_expression(cursor.next_pair(33)?)?;
                self.check_update_target(&argument, &first)?;
                Ok(ExpressionType::UpdateExpression {
                    meta,
                    operator: get_update_operator(&first)?,
                    argument: Box::new(argument),
                    prefix: true,
                })
            }
            Rule::unary_operator => {
                let operator = match first.as_str() {
                    "delete" => UnaryOperator::Delete,
                    "void" => UnaryOperator::Void,
                    "typeof" => UnaryOperator::TypeOf,
                    "+" => UnaryOperator::Plus,
                    "-" => UnaryOperator::Minus,
                    "~" => UnaryOperator::BitwiseNot,
                    "!" => UnaryOperator::LogicalNot,
                    _ => return Err(get_unexpected_error(34, &first)),
                };
                let argument = self.build_ast_from_unary_expression(cursor.next_pair(35)?)?;
                Ok(ExpressionType::UnaryExpression {
                    meta,
                    operator,
                    argument: Box::new(argument),
                })
            }
            _ => Err(get_unexpected_error(36, &first)),
        }
    }

    fn build_ast_from_postfix_expression(
        &self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let argument = self.build_ast_from_left_hand_side_expression(cursor.next_pair(37)?)?;
        match cursor.next_optional() {
            None => Ok(argument),
            Some(op_pair) => {
                self.check_update_target(&argument, &op_pair)?;
                Ok(ExpressionType::UpdateExpression {
                    meta,
                    operator: get_update_operator(&op_pair)?,
                    argument: Box::new(argument),
                    prefix: false,
                })
            }
        }
    }

    fn check_update_target(
        &self,
        argument: &ExpressionType,
        op_pair: &Pair<Rule>,
    ) -> Result<(), Error<Rule>> {
        match argument {
            ExpressionType::Identifier(_) | ExpressionType::MemberExpression(_) => Ok(()),
            _ => Err(Error::new_from_span(
                ErrorVariant::CustomError {
                    message: "Invalid left-hand side expression in update operation".to_string(),
                },
                op_pair.as_span(),
            )),
        }
    }

    fn build_ast_from_left_hand_side_expression(
        &self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let mut cursor = PairCursor::new(pair);
        let base_pair = cursor.next_pair(38)?;
        let base = match base_pair.as_rule() {
            Rule::new_expression => self.build_ast_from_new_expression(base_pair)?,
            _ => self.build_ast_from_primary_expression(base_pair)?,
        };
        self.fold_accessors(base, cursor)
    }

    fn fold_accessors(
        &self,
        mut object: ExpressionType,
        mut cursor: PairCursor,
    ) -> Result<ExpressionType, Error<Rule>> {
        while let Some(accessor) = cursor.next_optional() {
            let meta = Meta::spanning(object.get_meta(), &self.meta(&accessor));
            object = match accessor.as_rule() {
                Rule::arguments => ExpressionType::CallExpression {
                    meta,
                    callee: Box::new(object),
                    arguments: self.get_arguments(accessor)?,
                },
                Rule::dot_member => {
                    let property = self.get_identifier_data(PairCursor::new(accessor).next_pair(39)?);
                    ExpressionType::MemberExpression(MemberExpressionType::SimpleMemberExpression {
                        meta,
                        object: Box::new(object),
                        property,
                    })
                }
                Rule::computed_member => {
                    let property =
                        self.build_ast_from_expression(PairCursor::new(accessor).next_pair(40)?)?;
                    ExpressionType::MemberExpression(
                        MemberExpressionType::ComputedMemberExpression {
                            meta,
                            object: Box::new(object),
                            property: Box::new(property),
                        },
                    )
                }
                _ => return Err(get_unexpected_error(41, &accessor)),
            };
        }
        Ok(object)
    }

    fn build_ast_from_new_expression(
        &self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let mut callee_cursor = PairCursor::new(cursor.next_pair(42)?);
        let callee_base = self.build_ast_from_primary_expression(callee_cursor.next_pair(43)?)?;
        let callee = self.fold_accessors(callee_base, callee_cursor)?;
        let arguments = match cursor.next_optional() {
            Some(p) => self.get_arguments(p)?,
            None => vec![],
        };
        Ok(ExpressionType::NewExpression {
            meta,
            callee: Box::new(callee),
            arguments,
        })
    }

    fn get_arguments(&self, pair: Pair<Rule>) -> Result<Vec<ExpressionType>, Error<Rule>> {
        let mut arguments = vec![];
        for inner_pair in pair.into_inner() {
            arguments.push(self.build_ast_from_assignment_expression(inner_pair)?);
        }
        Ok(arguments)
    }

    fn build_ast_from_primary_expression(
        &self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let inner_pair = PairCursor::new(pair).next_pair(44)?;
        let meta = self.meta(&inner_pair);
        Ok(match inner_pair.as_rule() {
            Rule::this_expression => ExpressionType::ThisExpression { meta },
            Rule::function_expression => {
                ExpressionType::FunctionExpression(Rc::new(self.build_ast_from_function(inner_pair)?))
            }
            Rule::identifier => ExpressionType::Identifier(self.get_identifier_data(inner_pair)),
            Rule::null_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::NullLiteral,
            }),
            Rule::boolean_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::BooleanLiteral(inner_pair.as_str() == "true"),
            }),
            Rule::numeric_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::NumberLiteral(self.get_number(&inner_pair)?),
            }),
            Rule::string_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::StringLiteral(self.get_string(inner_pair)?),
            }),
            Rule::array_literal => {
                let mut elements = vec![];
                for element in inner_pair.into_inner() {
                    elements.push(self.build_ast_from_assignment_expression(element)?);
                }
                ExpressionType::ArrayExpression { meta, elements }
            }
            Rule::object_literal => {
                let mut properties = vec![];
                for property_pair in inner_pair.into_inner() {
                    properties.push(self.get_property_data(property_pair)?);
                }
                ExpressionType::ObjectExpression { meta, properties }
            }
            Rule::parenthesized_expression => {
                self.build_ast_from_expression(PairCursor::new(inner_pair).next_pair(45)?)?
            }
            _ => return Err(get_unexpected_error(46, &inner_pair)),
        })
    }

    fn get_property_data(&self, pair: Pair<Rule>) -> Result<PropertyData, Error<Rule>> {
        let meta = self.meta(&pair);
        let mut cursor = PairCursor::new(pair);
        let key_pair = cursor.next_pair(47)?;
        let key = match key_pair.as_rule() {
            Rule::identifier_name => key_pair.as_str().to_string(),
            Rule::string_literal => self.get_string(key_pair)?,
            Rule::numeric_literal => match self.get_number(&key_pair)? {
                NumberLiteralType::IntegerLiteral(i) => i.to_string(),
                NumberLiteralType::FloatLiteral(f) => f.to_string(),
            },
            _ => return Err(get_unexpected_error(48, &key_pair)),
        };
        let value = self.build_ast_from_assignment_expression(cursor.next_pair(49)?)?;
        Ok(PropertyData { meta, key, value })
    }

    fn get_string(&self, pair: Pair<Rule>) -> Result<String, Error<Rule>> {
        let chars = PairCursor::new(pair).next_pair(50)?;
        Ok(unescape_string_literal(chars.as_str()))
    }

    fn get_number(&self, pair: &Pair<Rule>) -> Result<NumberLiteralType, Error<Rule>> {
        match parse_numeric_literal(pair.as_str()) {
            Some(NumericValue::Integer(i)) => Ok(NumberLiteralType::IntegerLiteral(i)),
            Some(NumericValue::Float(f)) => Ok(NumberLiteralType::FloatLiteral(f)),
            None => Err(get_unexpected_error(51, pair)),
        }
    }
}

fn get_update_operator(pair: &Pair<Rule>) -> Result<UpdateOperator, Error<Rule>> {
    match pair.as_str() {
        "++" => Ok(UpdateOperator::PlusPlus),
        "--" => Ok(UpdateOperator::MinusMinus),
        _ => Err(get_unexpected_error(52, pair)),
    }
}

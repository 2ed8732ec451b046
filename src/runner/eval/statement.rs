//! Statement execution.
//!
//! Blocks do not open a new environment: every declaration lands in the
//! enclosing function's environment, as `var` does.

use crate::parser::ast::{
    BlockStatementData, CatchClauseData, DeclarationType, ExpressionType, ProgramData,
    StatementType, VariableDeclarationData, VariableDeclarationOrExpression,
};
use crate::runner::builtins::types::EvalContext;
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::type_conversion::to_boolean;
use crate::runner::ds::value::TracedValue;

use super::expression::{evaluate_expression, evaluate_named};
use super::function::make_function;
use super::types::{Completion, CompletionType, EvalResult, Frame};

/// Hoists declarations and runs a whole program in `frame`.
pub fn execute_program(program: &ProgramData, frame: &Frame, ctx: &mut EvalContext) -> EvalResult {
    hoist_declarations(&program.body, frame);
    execute_statements(&program.body, frame, ctx)
}

/// Declares every `var` name as undefined and binds every function
/// declaration, looking into nested blocks but not into nested functions.
pub fn hoist_declarations(statements: &[StatementType], frame: &Frame) {
    for stmt in statements {
        hoist_statement(stmt, frame);
    }
}

fn hoist_statement(stmt: &StatementType, frame: &Frame) {
    match stmt {
        StatementType::DeclarationStatement(DeclarationType::VariableDeclaration(decl)) => {
            hoist_variables(decl, frame)
        }
        StatementType::DeclarationStatement(DeclarationType::FunctionDeclaration(data)) => {
            let f = make_function(data, None, &frame.env, &frame.this_value);
            frame.env.declare(data.name().unwrap_or("anonymous"), f);
        }
        StatementType::BlockStatement(block) => hoist_declarations(&block.body, frame),
        StatementType::IfStatement {
            consequent,
            alternate,
            ..
        } => {
            hoist_statement(consequent, frame);
            if let Some(alternate) = alternate {
                hoist_statement(alternate, frame);
            }
        }
        StatementType::WhileStatement { body, .. }
        | StatementType::DoWhileStatement { body, .. } => hoist_statement(body, frame),
        StatementType::ForStatement { init, body, .. } => {
            if let Some(VariableDeclarationOrExpression::VariableDeclaration(decl)) = init {
                hoist_variables(decl, frame);
            }
            hoist_statement(body, frame);
        }
        StatementType::TryStatement {
            block,
            handler,
            finalizer,
            ..
        } => {
            hoist_declarations(&block.body, frame);
            if let Some(handler) = handler {
                hoist_declarations(&handler.body.body, frame);
            }
            if let Some(finalizer) = finalizer {
                hoist_declarations(&finalizer.body, frame);
            }
        }
        _ => {}
    }
}

fn hoist_variables(decl: &VariableDeclarationData, frame: &Frame) {
    for declarator in &decl.declarations {
        if !frame.env.has_own_binding(&declarator.id.name) {
            frame.env.declare(&declarator.id.name, TracedValue::Undefined);
        }
    }
}

/// Runs `statements` in order, stopping at the first abrupt completion.
pub fn execute_statements(
    statements: &[StatementType],
    frame: &Frame,
    ctx: &mut EvalContext,
) -> EvalResult {
    let mut completion = Completion::normal();
    for stmt in statements {
        completion = execute_statement(stmt, frame, ctx)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
    }
    Ok(completion)
}

/// Execute a statement and return its completion.
pub fn execute_statement(stmt: &StatementType, frame: &Frame, ctx: &mut EvalContext) -> EvalResult {
    match stmt {
        StatementType::EmptyStatement { .. } => Ok(Completion::normal()),

        StatementType::ExpressionStatement { expression, .. } => {
            let value = evaluate_expression(expression, frame, ctx)?;
            Ok(Completion::normal_with_value(value))
        }

        StatementType::BlockStatement(block) => execute_statements(&block.body, frame, ctx),

        StatementType::DeclarationStatement(DeclarationType::VariableDeclaration(decl)) => {
            execute_variable_declaration(decl, frame, ctx)
        }

        // Bound while hoisting.
        StatementType::DeclarationStatement(DeclarationType::FunctionDeclaration(_)) => {
            Ok(Completion::normal())
        }

        StatementType::IfStatement {
            test,
            consequent,
            alternate,
            ..
        } => {
            if to_boolean(&evaluate_expression(test, frame, ctx)?) {
                execute_statement(consequent, frame, ctx)
            } else if let Some(alternate) = alternate {
                execute_statement(alternate, frame, ctx)
            } else {
                Ok(Completion::normal())
            }
        }

        StatementType::WhileStatement { test, body, .. } => {
            execute_loop(Some(test), None, body, false, frame, ctx)
        }

        StatementType::DoWhileStatement { body, test, .. } => {
            execute_loop(Some(test), None, body, true, frame, ctx)
        }

        StatementType::ForStatement {
            init,
            test,
            update,
            body,
            ..
        } => {
            match init {
                Some(VariableDeclarationOrExpression::VariableDeclaration(decl)) => {
                    execute_variable_declaration(decl, frame, ctx)?;
                }
                Some(VariableDeclarationOrExpression::Expression(expr)) => {
                    evaluate_expression(expr, frame, ctx)?;
                }
                None => {}
            }
            execute_loop(test.as_ref(), update.as_ref(), body, false, frame, ctx)
        }

        StatementType::BreakStatement { .. } => Ok(Completion::break_completion()),

        StatementType::ContinueStatement { .. } => Ok(Completion::continue_completion()),

        StatementType::ReturnStatement { argument, .. } => {
            let value = match argument {
                Some(arg) => evaluate_expression(arg, frame, ctx)?,
                None => TracedValue::Undefined,
            };
            Ok(Completion::return_value(value))
        }

        StatementType::ThrowStatement { argument, .. } => Err(EvalError::Thrown(
            evaluate_expression(argument, frame, ctx)?,
        )),

        StatementType::TryStatement {
            block,
            handler,
            finalizer,
            ..
        } => execute_try_statement(block, handler.as_ref(), finalizer.as_ref(), frame, ctx),
    }
}

fn execute_variable_declaration(
    decl: &VariableDeclarationData,
    frame: &Frame,
    ctx: &mut EvalContext,
) -> EvalResult {
    for declarator in &decl.declarations {
        let name = &declarator.id.name;
        match &declarator.init {
            Some(init) => {
                let value = evaluate_named(init, name, frame, ctx)?;
                frame.env.declare(name, value);
            }
            None if !frame.env.has_own_binding(name) => {
                frame.env.declare(name, TracedValue::Undefined);
            }
            None => {}
        }
    }
    Ok(Completion::normal())
}

/// Shared by `while`, `do ... while` and `for`.
fn execute_loop(
    test: Option<&ExpressionType>,
    update: Option<&ExpressionType>,
    body: &StatementType,
    body_first: bool,
    frame: &Frame,
    ctx: &mut EvalContext,
) -> EvalResult {
    let mut iterations = 0usize;
    let mut skip_test = body_first;
    loop {
        if !skip_test {
            if let Some(test) = test {
                if !to_boolean(&evaluate_expression(test, frame, ctx)?) {
                    break;
                }
            }
        }
        skip_test = false;

        iterations += 1;
        ctx.check_loop(iterations)?;

        let completion = execute_statement(body, frame, ctx)?;
        match completion.completion_type {
            CompletionType::Break => break,
            CompletionType::Return => return Ok(completion),
            CompletionType::Continue | CompletionType::Normal => {}
        }

        if let Some(update) = update {
            evaluate_expression(update, frame, ctx)?;
        }
    }
    Ok(Completion::normal())
}

fn execute_try_statement(
    block: &BlockStatementData,
    handler: Option<&CatchClauseData>,
    finalizer: Option<&BlockStatementData>,
    frame: &Frame,
    ctx: &mut EvalContext,
) -> EvalResult {
    let mut result = execute_statements(&block.body, frame, ctx);

    let caught = match (&result, handler) {
        (Err(err), Some(handler)) if err.is_catchable() => Some((err.to_thrown_value(), handler)),
        _ => None,
    };
    if let Some((thrown, handler)) = caught {
        if let Some(param) = &handler.param {
            frame.env.declare(&param.name, thrown);
        }
        result = execute_statements(&handler.body.body, frame, ctx);
    }

    if let Some(finalizer) = finalizer {
        let completion = execute_statements(&finalizer.body, frame, ctx)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
    }
    result
}

//! Expression evaluation.
//!
//! Follows the host language's semantics for every expression kind the
//! parser produces.

use indexmap::IndexMap;

use crate::parser::ast::{
    AssignmentOperator, ExpressionType, LiteralType, LogicalOperator, MemberExpressionType,
    UnaryOperator, UpdateOperator,
};
use crate::runner::builtins::types::EvalContext;
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::arithmetic::apply_binary_operator;
use crate::runner::ds::operations::object::{get_property, set_property};
use crate::runner::ds::operations::type_conversion::{
    get_type, to_boolean, to_int32, to_number, to_property_key,
};
use crate::runner::ds::value::TracedValue;

use super::function::{call_value, construct, invoke_method, make_function};
use super::types::{Frame, ValueResult};

/// The value a literal denotes.
pub fn literal_value(literal: &LiteralType) -> TracedValue {
    match literal {
        LiteralType::StringLiteral(s) => TracedValue::String(s.clone()),
        LiteralType::BooleanLiteral(b) => TracedValue::Boolean(*b),
        LiteralType::NullLiteral => TracedValue::Null,
        LiteralType::NumberLiteral(n) => TracedValue::Number(n.as_f64()),
    }
}

/// Evaluate an expression and return its value.
pub fn evaluate_expression(
    expr: &ExpressionType,
    frame: &Frame,
    ctx: &mut EvalContext,
) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(literal_value(&lit.value)),

        ExpressionType::Identifier(id) => resolve_identifier(&id.name, frame, ctx),

        ExpressionType::ThisExpression { .. } => Ok(frame.this_value.clone()),

        ExpressionType::ArrayExpression { elements, .. } => {
            let items = elements
                .iter()
                .map(|e| evaluate_expression(e, frame, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TracedValue::new_array(items))
        }

        ExpressionType::ObjectExpression { properties, .. } => {
            let mut map = IndexMap::new();
            for prop in properties {
                let value = evaluate_named(&prop.value, &prop.key, frame, ctx)?;
                map.insert(prop.key.clone(), value);
            }
            Ok(TracedValue::new_object(map))
        }

        ExpressionType::FunctionExpression(data) => {
            Ok(make_function(data, None, &frame.env, &frame.this_value))
        }

        ExpressionType::UnaryExpression {
            operator, argument, ..
        } => evaluate_unary_expression(operator, argument, frame, ctx),

        ExpressionType::UpdateExpression {
            operator,
            argument,
            prefix,
            ..
        } => {
            let old = to_number(&evaluate_expression(argument, frame, ctx)?);
            let new = match operator {
                UpdateOperator::PlusPlus => old + 1.0,
                UpdateOperator::MinusMinus => old - 1.0,
            };
            store(argument, TracedValue::Number(new), frame, ctx)?;
            Ok(TracedValue::Number(if *prefix { new } else { old }))
        }

        ExpressionType::BinaryExpression {
            operator,
            left,
            right,
            ..
        } => {
            let l = evaluate_expression(left, frame, ctx)?;
            let r = evaluate_expression(right, frame, ctx)?;
            apply_binary_operator(operator, &l, &r)
        }

        ExpressionType::AssignmentExpression {
            operator,
            left,
            right,
            ..
        } => evaluate_assignment_expression(operator, left, right, frame, ctx),

        ExpressionType::LogicalExpression {
            operator,
            left,
            right,
            ..
        } => {
            let l = evaluate_expression(left, frame, ctx)?;
            let short_circuit = match operator {
                LogicalOperator::Or => to_boolean(&l),
                LogicalOperator::And => !to_boolean(&l),
            };
            if short_circuit {
                Ok(l)
            } else {
                evaluate_expression(right, frame, ctx)
            }
        }

        ExpressionType::ConditionalExpression {
            test,
            consequent,
            alternate,
            ..
        } => {
            if to_boolean(&evaluate_expression(test, frame, ctx)?) {
                evaluate_expression(consequent, frame, ctx)
            } else {
                evaluate_expression(alternate, frame, ctx)
            }
        }

        ExpressionType::CallExpression {
            callee, arguments, ..
        } => {
            if let ExpressionType::MemberExpression(member) = callee.as_ref() {
                let (object, key) = evaluate_member_target(member, frame, ctx)?;
                let args = evaluate_arguments(arguments, frame, ctx)?;
                return invoke_method(ctx, &object, &key, args);
            }
            let function = evaluate_expression(callee, frame, ctx)?;
            let args = evaluate_arguments(arguments, frame, ctx)?;
            call_value(ctx, &function, TracedValue::Undefined, args)
        }

        ExpressionType::NewExpression {
            callee, arguments, ..
        } => {
            let constructor = evaluate_expression(callee, frame, ctx)?;
            let args = evaluate_arguments(arguments, frame, ctx)?;
            construct(ctx, &constructor, args)
        }

        ExpressionType::MemberExpression(member) => {
            let (object, key) = evaluate_member_target(member, frame, ctx)?;
            if let TracedValue::Unresolved(name) = &object {
                if let Some(value) = ctx.registry.get_property(name, &key) {
                    return Ok(value.clone());
                }
            }
            get_property(&object, &key)
        }

        ExpressionType::SequenceExpression { expressions, .. } => {
            let mut last = TracedValue::Undefined;
            for e in expressions {
                last = evaluate_expression(e, frame, ctx)?;
            }
            Ok(last)
        }
    }
}

/// Like [`evaluate_expression`], but an anonymous function takes `name`.
pub fn evaluate_named(
    expr: &ExpressionType,
    name: &str,
    frame: &Frame,
    ctx: &mut EvalContext,
) -> ValueResult {
    match expr {
        ExpressionType::FunctionExpression(data) => Ok(make_function(
            data,
            Some(name),
            &frame.env,
            &frame.this_value,
        )),
        _ => evaluate_expression(expr, frame, ctx),
    }
}

fn resolve_identifier(name: &str, frame: &Frame, ctx: &EvalContext) -> ValueResult {
    if let Some(value) = frame.env.lookup(name) {
        return Ok(value);
    }
    match name {
        "undefined" => Ok(TracedValue::Undefined),
        "NaN" => Ok(TracedValue::Number(f64::NAN)),
        "Infinity" => Ok(TracedValue::Number(f64::INFINITY)),
        _ if ctx.registry.has_object(name) => Ok(TracedValue::Unresolved(name.to_string())),
        _ => Err(EvalError::ReferenceError(name.to_string())),
    }
}

fn evaluate_arguments(
    arguments: &[ExpressionType],
    frame: &Frame,
    ctx: &mut EvalContext,
) -> Result<Vec<TracedValue>, EvalError> {
    arguments
        .iter()
        .map(|a| evaluate_expression(a, frame, ctx))
        .collect()
}

/// The object and property key a member expression refers to.
fn evaluate_member_target(
    member: &MemberExpressionType,
    frame: &Frame,
    ctx: &mut EvalContext,
) -> Result<(TracedValue, String), EvalError> {
    match member {
        MemberExpressionType::SimpleMemberExpression {
            object, property, ..
        } => Ok((
            evaluate_expression(object, frame, ctx)?,
            property.name.clone(),
        )),
        MemberExpressionType::ComputedMemberExpression {
            object, property, ..
        } => {
            let object = evaluate_expression(object, frame, ctx)?;
            let key = to_property_key(&evaluate_expression(property, frame, ctx)?);
            Ok((object, key))
        }
    }
}

/// Writes `value` to an identifier or member target.
fn store(
    target: &ExpressionType,
    value: TracedValue,
    frame: &Frame,
    ctx: &mut EvalContext,
) -> Result<(), EvalError> {
    match target {
        ExpressionType::Identifier(id) => {
            if !frame.env.assign(&id.name, value.clone()) {
                frame.env.declare(&id.name, value);
            }
            Ok(())
        }
        ExpressionType::MemberExpression(member) => {
            let (object, key) = evaluate_member_target(member, frame, ctx)?;
            set_property(&object, &key, value, ctx.max_array_growth)
        }
        other => Err(EvalError::ReferenceError(format!(
            "Invalid assignment target {}",
            other.type_name()
        ))),
    }
}

fn evaluate_assignment_expression(
    operator: &AssignmentOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    frame: &Frame,
    ctx: &mut EvalContext,
) -> ValueResult {
    let value = match operator.binary_operator() {
        None => match left {
            ExpressionType::Identifier(id) => evaluate_named(right, &id.name, frame, ctx)?,
            _ => evaluate_expression(right, frame, ctx)?,
        },
        Some(op) => {
            let current = evaluate_expression(left, frame, ctx)?;
            let rhs = evaluate_expression(right, frame, ctx)?;
            apply_binary_operator(&op, &current, &rhs)?
        }
    };
    store(left, value.clone(), frame, ctx)?;
    Ok(value)
}

fn evaluate_unary_expression(
    operator: &UnaryOperator,
    argument: &ExpressionType,
    frame: &Frame,
    ctx: &mut EvalContext,
) -> ValueResult {
    match operator {
        UnaryOperator::TypeOf => {
            let value = match evaluate_expression(argument, frame, ctx) {
                Err(EvalError::ReferenceError(_)) => TracedValue::Undefined,
                other => other?,
            };
            Ok(TracedValue::String(get_type(&value).to_string()))
        }
        UnaryOperator::Delete => {
            if let ExpressionType::MemberExpression(member) = argument {
                let (object, key) = evaluate_member_target(member, frame, ctx)?;
                if let TracedValue::Object(o) = &object {
                    o.borrow_mut().properties.shift_remove(&key);
                }
            }
            Ok(TracedValue::Boolean(true))
        }
        _ => {
            let value = evaluate_expression(argument, frame, ctx)?;
            Ok(match operator {
                UnaryOperator::Minus => TracedValue::Number(-to_number(&value)),
                UnaryOperator::Plus => TracedValue::Number(to_number(&value)),
                UnaryOperator::LogicalNot => TracedValue::Boolean(!to_boolean(&value)),
                UnaryOperator::BitwiseNot => TracedValue::Number(!to_int32(&value) as f64),
                _ => TracedValue::Undefined,
            })
        }
    }
}

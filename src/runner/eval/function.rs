//! Function call execution.
//!
//! Calls to traced functions, `new`, and method dispatch. Method calls look at
//! the receiver's own and prototype function properties first and fall back
//! to the built-in registry by type name.

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

use crate::parser::ast::{FunctionBodyOrExpression, FunctionData};
use crate::runner::builtins::types::EvalContext;
use crate::runner::ds::env::Environment;
use crate::runner::ds::error::EvalError;
use crate::runner::ds::value::{FunctionRef, FunctionValue, ObjectData, TracedValue};

use super::expression::evaluate_expression;
use super::statement::{execute_statements, hoist_declarations};
use super::types::{CompletionType, Frame, ValueResult};

/// Creates the callable for `data`, closing over `env`.
///
/// Arrow functions capture `this` from `frame_this`; other functions take it
/// from the call site.
pub fn make_function(
    data: &Rc<FunctionData>,
    name: Option<&str>,
    env: &Rc<Environment>,
    frame_this: &TracedValue,
) -> TracedValue {
    let name = data.name().or(name).unwrap_or("anonymous");
    let lexical_this = if data.is_arrow {
        Some(frame_this.clone())
    } else {
        None
    };
    TracedValue::Function(Rc::new(FunctionValue::new(
        data.clone(),
        name,
        env.clone(),
        lexical_this,
    )))
}

/// Calls any callable value: traced functions, or built-in constructors used
/// as conversion functions (`String(5)`).
pub fn call_value(
    ctx: &mut EvalContext,
    callee: &TracedValue,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> ValueResult {
    match callee {
        TracedValue::Function(f) => call_function(ctx, f, this, args),
        TracedValue::Unresolved(name) => match ctx.registry.get_constructor(name) {
            Some(native) => native(ctx, TracedValue::Undefined, args),
            None => Err(EvalError::NotCallable(name.clone())),
        },
        other => Err(EvalError::NotCallable(other.to_string())),
    }
}

/// Runs a traced function body in a fresh environment whose parent is the
/// function's defining environment.
pub fn call_function(
    ctx: &mut EvalContext,
    func: &FunctionRef,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> ValueResult {
    ctx.enter_call()?;
    trace!("Calling {} at depth {}", func.name, ctx.call_depth());
    let result = run_function_body(ctx, func, this, args);
    ctx.exit_call();
    result
}

fn run_function_body(
    ctx: &mut EvalContext,
    func: &FunctionRef,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> ValueResult {
    let env = Environment::new_child(&func.env);
    let mut args = args.into_iter();
    for param in &func.data.params {
        env.declare(&param.name, args.next().unwrap_or(TracedValue::Undefined));
    }
    let this_value = func.lexical_this.clone().unwrap_or(this);
    let frame = Frame::new(env, this_value);

    match &func.data.body {
        FunctionBodyOrExpression::Expression(expr) => evaluate_expression(expr, &frame, ctx),
        FunctionBodyOrExpression::FunctionBody(body) => {
            hoist_declarations(&body.body, &frame);
            let completion = execute_statements(&body.body, &frame, ctx)?;
            Ok(match completion.completion_type {
                CompletionType::Return => completion.get_value(),
                _ => TracedValue::Undefined,
            })
        }
    }
}

/// `new callee(...args)`.
pub fn construct(ctx: &mut EvalContext, callee: &TracedValue, args: Vec<TracedValue>) -> ValueResult {
    match callee {
        TracedValue::Function(f) if !f.data.is_arrow => {
            let object = match f.prototype_object() {
                Some(proto) => ObjectData::with_prototype(proto),
                None => ObjectData::new(),
            };
            let instance = TracedValue::Object(Rc::new(RefCell::new(object)));
            let result = call_function(ctx, f, instance.clone(), args)?;
            Ok(match result {
                TracedValue::Object(_) | TracedValue::Array(_) | TracedValue::Function(_) => result,
                _ => instance,
            })
        }
        TracedValue::Unresolved(name) => match ctx.registry.get_constructor(name) {
            Some(native) => native(ctx, TracedValue::Undefined, args),
            None => Err(EvalError::type_error(format!("{} is not a constructor", name))),
        },
        other => Err(EvalError::type_error(format!(
            "{} is not a constructor",
            other
        ))),
    }
}

/// `receiver.method(...args)`.
pub fn invoke_method(
    ctx: &mut EvalContext,
    receiver: &TracedValue,
    method: &str,
    args: Vec<TracedValue>,
) -> ValueResult {
    let own = match receiver {
        TracedValue::Undefined | TracedValue::Null => {
            return Err(EvalError::type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                receiver, method
            )))
        }
        TracedValue::Object(o) => o.borrow().lookup(method),
        TracedValue::Function(f) => f.get_own_property(method),
        TracedValue::Unresolved(name) => {
            return invoke_on_unresolved(ctx, name, receiver, method, args);
        }
        _ => None,
    };
    if let Some(callee) = own.filter(TracedValue::is_callable) {
        return call_value(ctx, &callee, receiver.clone(), args);
    }

    let type_name = receiver.type_name();
    match ctx.registry.find_method(type_name, method) {
        Some(native) => native(ctx, receiver.clone(), args),
        None => Err(EvalError::method_not_found(type_name, method)),
    }
}

/// A free identifier is either a built-in namespace (`Math.max`) or stands
/// for its own name, which then behaves as a string.
fn invoke_on_unresolved(
    ctx: &mut EvalContext,
    name: &str,
    receiver: &TracedValue,
    method: &str,
    args: Vec<TracedValue>,
) -> ValueResult {
    if let Some(native) = ctx.registry.get_static_method(name, method) {
        return native(ctx, receiver.clone(), args);
    }
    if !ctx.registry.has_object(name) {
        if let Some(native) = ctx.registry.find_method("String", method) {
            return native(ctx, TracedValue::String(name.to_string()), args);
        }
    }
    Err(EvalError::method_not_found(name, method))
}

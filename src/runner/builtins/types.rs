//! Core types shared by the registry and the native method implementations.

use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::config::TracerConfig;
use crate::runner::ds::error::EvalError;
use crate::runner::ds::value::TracedValue;
use crate::runner::eval::function::{call_value, construct, invoke_method};

/// Execution context passed to native functions and threaded through the
/// interpreter.
pub struct EvalContext {
    pub registry: Rc<BuiltInRegistry>,
    pub max_call_depth: usize,
    pub max_loop_iterations: usize,
    pub max_array_growth: usize,
    call_depth: usize,
}

impl EvalContext {
    pub fn new(registry: Rc<BuiltInRegistry>, config: &TracerConfig) -> Self {
        EvalContext {
            registry,
            max_call_depth: config.max_call_depth,
            max_loop_iterations: config.max_loop_iterations,
            max_array_growth: config.max_array_growth,
            call_depth: 0,
        }
    }

    /// Context over the core built-ins and default limits.
    pub fn with_core() -> Self {
        EvalContext::new(
            Rc::new(BuiltInRegistry::with_core()),
            &TracerConfig::default(),
        )
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    pub fn enter_call(&mut self) -> Result<(), EvalError> {
        if self.call_depth >= self.max_call_depth {
            return Err(EvalError::CallDepthExceeded(self.max_call_depth));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Fails once a loop has run more iterations than allowed.
    pub fn check_loop(&self, iterations: usize) -> Result<(), EvalError> {
        if iterations > self.max_loop_iterations {
            Err(EvalError::LoopLimitExceeded(self.max_loop_iterations))
        } else {
            Ok(())
        }
    }

    /// Calls `callee` with an explicit `this`.
    pub fn call_function(
        &mut self,
        callee: &TracedValue,
        this: TracedValue,
        args: Vec<TracedValue>,
    ) -> Result<TracedValue, EvalError> {
        call_value(self, callee, this, args)
    }

    /// `receiver.method(...args)`.
    pub fn call_method(
        &mut self,
        receiver: &TracedValue,
        method: &str,
        args: Vec<TracedValue>,
    ) -> Result<TracedValue, EvalError> {
        invoke_method(self, receiver, method, args)
    }

    /// `new callee(...args)`.
    pub fn construct(
        &mut self,
        callee: &TracedValue,
        args: Vec<TracedValue>,
    ) -> Result<TracedValue, EvalError> {
        construct(self, callee, args)
    }
}

/// Function signature for built-in methods.
/// Native functions receive the evaluation context, `this` value, and arguments.
pub type NativeFn = fn(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError>;

/// A host type such as `Array` or `String`, or a namespace object like `Math`.
pub struct BuiltInObject {
    /// Name of the object (e.g., "Array", "Object", "Math").
    pub name: String,

    /// Type whose methods are consulted next, if any.
    pub prototype: Option<String>,

    /// Methods callable on values of this type.
    pub methods: HashMap<String, NativeFn>,

    /// Methods called on the object itself (`Array.isArray`, `Math.max`).
    pub static_methods: HashMap<String, NativeFn>,

    /// Static properties.
    pub properties: HashMap<String, TracedValue>,

    /// Constructor function, if this object is constructable.
    pub constructor: Option<NativeFn>,
}

impl BuiltInObject {
    pub fn new(name: impl Into<String>) -> Self {
        BuiltInObject {
            name: name.into(),
            prototype: Some("Object".to_string()),
            methods: HashMap::new(),
            static_methods: HashMap::new(),
            properties: HashMap::new(),
            constructor: None,
        }
    }

    pub fn with_prototype(mut self, prototype: impl Into<String>) -> Self {
        self.prototype = Some(prototype.into());
        self
    }

    /// For `Object` itself, which ends every lookup.
    pub fn with_no_prototype(mut self) -> Self {
        self.prototype = None;
        self
    }

    pub fn add_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.methods.insert(name.into(), func);
        self
    }

    pub fn add_static_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.static_methods.insert(name.into(), func);
        self
    }

    pub fn add_property(mut self, name: impl Into<String>, value: TracedValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn with_constructor(mut self, constructor: NativeFn) -> Self {
        self.constructor = Some(constructor);
        self
    }
}

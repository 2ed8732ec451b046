//! Core types for the evaluation engine.

use std::rc::Rc;

use crate::runner::ds::env::Environment;
use crate::runner::ds::error::EvalError;
use crate::runner::ds::value::TracedValue;

/// Completion record type.
/// Represents how a statement finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionType {
    /// Normal completion - execution continues.
    Normal,
    /// Return completion - function returns.
    Return,
    /// Break completion - break from the enclosing loop.
    Break,
    /// Continue completion - continue loop iteration.
    Continue,
}

/// Completion record.
/// Every statement evaluation returns a completion record; throws travel as
/// `Err(EvalError)` instead.
#[derive(Debug, Clone)]
pub struct Completion {
    pub completion_type: CompletionType,
    pub value: Option<TracedValue>,
}

impl Completion {
    /// Create a normal completion with no value.
    pub fn normal() -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: None,
        }
    }

    /// Create a normal completion with a value.
    pub fn normal_with_value(value: TracedValue) -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: Some(value),
        }
    }

    /// Create a return completion.
    pub fn return_value(value: TracedValue) -> Self {
        Completion {
            completion_type: CompletionType::Return,
            value: Some(value),
        }
    }

    pub fn break_completion() -> Self {
        Completion {
            completion_type: CompletionType::Break,
            value: None,
        }
    }

    pub fn continue_completion() -> Self {
        Completion {
            completion_type: CompletionType::Continue,
            value: None,
        }
    }

    pub fn is_normal(&self) -> bool {
        self.completion_type == CompletionType::Normal
    }

    /// Check if this is an abrupt completion (not normal).
    pub fn is_abrupt(&self) -> bool {
        !self.is_normal()
    }

    /// Get the value, or undefined if none.
    pub fn get_value(&self) -> TracedValue {
        self.value.clone().unwrap_or(TracedValue::Undefined)
    }
}

/// The environment and `this` binding statements run against.
#[derive(Clone)]
pub struct Frame {
    pub env: Rc<Environment>,
    pub this_value: TracedValue,
}

impl Frame {
    pub fn new(env: Rc<Environment>, this_value: TracedValue) -> Self {
        Frame { env, this_value }
    }

    /// A fresh top-level frame with `this` undefined.
    pub fn global() -> Self {
        Frame::new(Environment::new_global(), TracedValue::Undefined)
    }
}

/// Result type for statement execution.
pub type EvalResult = Result<Completion, EvalError>;

/// Result type for value-returning operations.
pub type ValueResult = Result<TracedValue, EvalError>;

use indexmap::IndexMap;
use thiserror::Error;

use crate::runner::ds::value::TracedValue;

/// Failures raised while evaluating traced code or replaying a call chain.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("ReferenceError: {0} is not defined")]
    ReferenceError(String),
    #[error("RangeError: {0}")]
    RangeError(String),
    #[error("{receiver}.{method} is not a function")]
    MethodNotFound { receiver: String, method: String },
    #[error("{0} is not a function")]
    NotCallable(String),
    #[error("Uncaught {0}")]
    Thrown(TracedValue),
    #[error("Maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
    #[error("Loop ran for more than {0} iterations")]
    LoopLimitExceeded(usize),
}

impl EvalError {
    pub fn type_error(message: impl Into<String>) -> Self {
        EvalError::TypeError(message.into())
    }

    pub fn method_not_found(receiver: impl Into<String>, method: impl Into<String>) -> Self {
        EvalError::MethodNotFound {
            receiver: receiver.into(),
            method: method.into(),
        }
    }

    /// Limits guard the host process and cannot be intercepted by `catch`.
    pub fn is_catchable(&self) -> bool {
        !matches!(
            self,
            EvalError::CallDepthExceeded(_) | EvalError::LoopLimitExceeded(_)
        )
    }

    /// The value a `catch (e)` clause binds for this error.
    pub fn to_thrown_value(&self) -> TracedValue {
        let (name, message) = match self {
            EvalError::Thrown(v) => return v.clone(),
            EvalError::TypeError(m) => ("TypeError", m.clone()),
            EvalError::ReferenceError(n) => ("ReferenceError", format!("{} is not defined", n)),
            EvalError::RangeError(m) => ("RangeError", m.clone()),
            EvalError::MethodNotFound { .. } | EvalError::NotCallable(_) => {
                ("TypeError", self.to_string())
            }
            EvalError::CallDepthExceeded(_) | EvalError::LoopLimitExceeded(_) => {
                ("RangeError", self.to_string())
            }
        };
        error_object(name, &message)
    }
}

/// An `{ name, message }` object as thrown by host errors.
pub fn error_object(name: &str, message: &str) -> TracedValue {
    let mut props = IndexMap::new();
    props.insert("name".to_string(), TracedValue::from(name));
    props.insert("message".to_string(), TracedValue::from(message));
    TracedValue::new_object(props)
}

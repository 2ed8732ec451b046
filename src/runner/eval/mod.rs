//! Interpreter for the bodies of traced functions.
//!
//! Functions found while tracing are kept as AST plus the environment they
//! were defined in. Replaying a call chain may invoke them; this module runs
//! their statements and expressions directly against that environment.

pub mod expression;
pub mod function;
pub mod statement;
pub mod types;

pub use types::{Completion, CompletionType, EvalResult, Frame, ValueResult};

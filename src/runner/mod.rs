//! Replay machinery for traced values: the value model, the built-in
//! method registry, native implementations, and the function-body
//! interpreter.

pub mod builtins;
pub mod config;
pub mod ds;
pub mod eval;
pub mod std_lib;

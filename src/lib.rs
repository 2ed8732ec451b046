//! # literal_tracer - static values for JavaScript snippets
//!
//! Traces a piece of JavaScript without running it, recording what every
//! variable is bound to in every function scope, and replays chained method
//! calls such as `list.slice(1).map(f)` one step at a time against those
//! values.
//!
//! - PEG parser with an ESTree-shaped AST ([`parser`])
//! - Scope tree tracer and position/name lookups ([`tracer`])
//! - Line decomposition and step-wise call-chain replay ([`chain`])
//! - Value model, built-in methods and a small interpreter for traced
//!   function bodies ([`runner`])
//! - An editor-facing session keeping the last trace ([`session`])
//!
//! ## Quick Start
//!
//! ### Tracing a program
//!
//! ```
//! use literal_tracer::tracer;
//!
//! let results = tracer::trace("var a = 1, b = 2, c = a + b;").unwrap();
//! assert_eq!(results.traced_value_for("c"), 3.into());
//! ```
//!
//! ### Replaying a call chain
//!
//! ```
//! use literal_tracer::chain::function_chain_from_line;
//! use literal_tracer::tracer;
//!
//! let source = "var names = ['x', 'y', 'z'];\n\
//!               var shout = function (s) { return s.toUpperCase(); };";
//! let bindings = tracer::trace(source).unwrap().all_assignments();
//!
//! let mut chain = function_chain_from_line("names.slice(1).map(shout)", &bindings).unwrap();
//! assert_eq!(chain.execute_until(1).unwrap().to_string(), "[ 'y', 'z' ]");
//! assert_eq!(chain.execute_until(2).unwrap().to_string(), "[ 'Y', 'Z' ]");
//! ```
//!
//! ### Keeping a session
//!
//! ```
//! use literal_tracer::parser::ast::Position;
//! use literal_tracer::Session;
//!
//! let mut session = Session::new();
//! session
//!     .trace("var word = 'tracer';", Position::new(1, 0))
//!     .unwrap();
//! let steps = session.execute_line_until("word.indexOf('c')", 1).unwrap();
//! assert_eq!(steps[1].return_value, 3.into());
//! ```

pub mod chain;
pub mod parser;
pub mod runner;
pub mod session;
pub mod tracer;

pub use crate::chain::{function_chain_from_line, CallChainElement, FunctionChain, LineParser};
pub use crate::runner::config::TracerConfig;
pub use crate::runner::ds::value::TracedValue;
pub use crate::session::{Session, SessionError, StepResult};
pub use crate::tracer::{trace, TracingResults};

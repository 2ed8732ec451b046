//! Call chains: splitting a line into its chained calls and replaying them.

pub mod function_chain;
pub mod line_parser;

pub use self::function_chain::{
    function_chain_from_line, ChainError, ChainStep, FunctionChain, StepAction, ANONYMOUS,
};
pub use self::line_parser::{CallChainElement, ElementKind, LineParser};

//! Replays a call chain step by step against traced bindings.

use std::rc::Rc;

use log::debug;
use thiserror::Error;

use super::line_parser::{CallChainElement, ElementKind, LineParser};
use crate::parser::Rule;
use crate::runner::builtins::types::EvalContext;
use crate::runner::ds::env::Environment;
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::object::get_property;
use crate::runner::ds::operations::type_conversion::to_property_key;
use crate::runner::ds::value::TracedValue;
use crate::runner::eval::function::make_function;
use crate::tracer::results::Assignments;

/// Display name of a root that is not a plain identifier.
pub const ANONYMOUS: &str = "[anonymous]";

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Failed to parse line: {0}")]
    Parse(#[from] pest::error::Error<Rule>),
    #[error("Line contains no call chain")]
    EmptyChain,
    #[error("Cannot resolve the computed property at column {0}")]
    UnsupportedKey(usize),
    #[error("Step {step} is out of range for a chain of {len} steps")]
    StepOutOfRange { step: usize, len: usize },
    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Debug, Clone)]
pub enum StepAction {
    /// The receiver the chain starts from. `pristine` is a copy taken when the
    /// chain was built and is never mutated.
    Object {
        object: TracedValue,
        pristine: TracedValue,
    },
    /// Reads a property of the previous output.
    Property,
    /// Calls a method on the previous output.
    Call { args: Vec<TracedValue> },
}

#[derive(Debug, Clone)]
pub struct ChainStep {
    pub name: String,
    pub action: StepAction,
    /// Copy of the previous step's output taken before this step ran.
    pub unprocessed_input: Option<TracedValue>,
    pub output: Option<TracedValue>,
    /// The root receiver as it was right after this step ran.
    pub original: Option<TracedValue>,
}

impl ChainStep {
    fn new(name: impl Into<String>, action: StepAction) -> Self {
        ChainStep {
            name: name.into(),
            action,
            unprocessed_input: None,
            output: None,
            original: None,
        }
    }

    pub fn has_run(&self) -> bool {
        self.output.is_some()
    }
}

/// A call chain bound to concrete values.
///
/// Steps run at most once: asking for a later step continues from the state
/// the earlier steps left behind.
pub struct FunctionChain {
    steps: Vec<ChainStep>,
    executed: usize,
    ctx: EvalContext,
}

/// Builds a chain for `line` over the core built-ins.
pub fn function_chain_from_line(
    line: &str,
    bindings: &Assignments,
) -> Result<FunctionChain, ChainError> {
    FunctionChain::from_line(line, bindings, EvalContext::with_core())
}

/// Resolves element values against bindings, calling functions where the
/// line calls them.
struct ValueResolver<'a> {
    bindings: &'a Assignments,
    env: Option<Rc<Environment>>,
}

impl<'a> ValueResolver<'a> {
    fn new(bindings: &'a Assignments) -> Self {
        ValueResolver {
            bindings,
            env: None,
        }
    }

    fn binding(&self, name: &str) -> TracedValue {
        self.bindings
            .get(name)
            .map(TracedValue::deep_clone)
            .unwrap_or_else(|| TracedValue::Unresolved(name.to_string()))
    }

    /// Environment holding every binding, for inline functions.
    fn env(&mut self) -> Rc<Environment> {
        let bindings = self.bindings;
        self.env
            .get_or_insert_with(|| {
                let env = Environment::new_global();
                for (name, value) in bindings {
                    env.declare(name, value.clone());
                }
                env
            })
            .clone()
    }

    fn value_of(
        &mut self,
        element: &CallChainElement,
        ctx: &mut EvalContext,
    ) -> Result<TracedValue, ChainError> {
        if let Some(value) = &element.value {
            return Ok(value.deep_clone());
        }
        if let Some(function) = &element.function {
            let env = self.env();
            return Ok(make_function(&function.0, None, &env, &TracedValue::Undefined));
        }
        let name = element.name.as_deref().unwrap_or_default();
        let target = self.binding(name);
        match element.kind {
            ElementKind::Call => {
                let args = self.values_of(&element.params, ctx)?;
                Ok(ctx.call_function(&target, TracedValue::Undefined, args)?)
            }
            ElementKind::New => {
                let args = self.values_of(&element.params, ctx)?;
                Ok(ctx.construct(&target, args)?)
            }
            _ => Ok(target),
        }
    }

    fn values_of(
        &mut self,
        elements: &[CallChainElement],
        ctx: &mut EvalContext,
    ) -> Result<Vec<TracedValue>, ChainError> {
        elements.iter().map(|e| self.value_of(e, ctx)).collect()
    }

    /// The property name a step reads or calls.
    fn step_name(
        &mut self,
        element: &CallChainElement,
        ctx: &mut EvalContext,
    ) -> Result<String, ChainError> {
        match &element.key {
            Some(key) => self.property_key(key, element.loc.start.column, ctx),
            None => Ok(element.name.clone().unwrap_or_default()),
        }
    }

    /// Evaluates the key of a computed member such as `a[list.indexOf(x)]`.
    fn property_key(
        &mut self,
        key: &[CallChainElement],
        column: usize,
        ctx: &mut EvalContext,
    ) -> Result<String, ChainError> {
        let (first, rest) = key.split_first().ok_or(ChainError::UnsupportedKey(column))?;
        let mut value = self.value_of(first, ctx)?;
        for element in rest {
            let name = self.step_name(element, ctx)?;
            value = if element.is_invocation() {
                let args = self.values_of(&element.params, ctx)?;
                ctx.call_method(&value, &name, args)?
            } else {
                get_property(&value, &name)?
            };
        }
        match value {
            TracedValue::Unresolved(name) => Err(EvalError::ReferenceError(name).into()),
            value => Ok(to_property_key(&value)),
        }
    }
}

impl FunctionChain {
    /// Parses `line` and binds its elements using `bindings`.
    pub fn from_line(
        line: &str,
        bindings: &Assignments,
        mut ctx: EvalContext,
    ) -> Result<FunctionChain, ChainError> {
        let elements = LineParser::parse(line)?;
        let (first, rest) = elements.split_first().ok_or(ChainError::EmptyChain)?;
        let mut resolver = ValueResolver::new(bindings);

        let root_name = match (&first.name, first.kind) {
            (Some(name), ElementKind::Identifier | ElementKind::Property) => name.clone(),
            _ => ANONYMOUS.to_string(),
        };
        let object = resolver.value_of(first, &mut ctx)?;
        let pristine = object.deep_clone();
        let mut steps = vec![ChainStep::new(
            root_name,
            StepAction::Object { object, pristine },
        )];

        for element in rest {
            let name = resolver.step_name(element, &mut ctx)?;
            let action = if element.is_invocation() {
                StepAction::Call {
                    args: resolver.values_of(&element.params, &mut ctx)?,
                }
            } else {
                StepAction::Property
            };
            steps.push(ChainStep::new(name, action));
        }

        debug!("Built chain of {} steps for {}", steps.len(), line.trim());
        Ok(FunctionChain {
            steps,
            executed: 0,
            ctx,
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    pub fn step(&self, idx: usize) -> Option<&ChainStep> {
        self.steps.get(idx)
    }

    pub fn root_name(&self) -> &str {
        &self.steps[0].name
    }

    /// The root value as it was when the chain was built.
    pub fn pristine(&self) -> TracedValue {
        match &self.steps[0].action {
            StepAction::Object { pristine, .. } => pristine.clone(),
            _ => TracedValue::Undefined,
        }
    }

    fn working_object(&self) -> TracedValue {
        match &self.steps[0].action {
            StepAction::Object { object, .. } => object.clone(),
            _ => TracedValue::Undefined,
        }
    }

    /// Runs the steps up to and including `k` that have not run yet and
    /// returns the output of step `k`.
    pub fn execute_until(&mut self, k: usize) -> Result<TracedValue, ChainError> {
        if k >= self.steps.len() {
            return Err(ChainError::StepOutOfRange {
                step: k,
                len: self.steps.len(),
            });
        }
        while self.executed <= k {
            self.run_step(self.executed)?;
            self.executed += 1;
        }
        Ok(self.steps[k].output.clone().unwrap_or(TracedValue::Undefined))
    }

    fn run_step(&mut self, idx: usize) -> Result<(), ChainError> {
        let previous = match idx {
            0 => None,
            _ => self.steps[idx - 1].output.clone(),
        };
        let input = previous.as_ref().map(TracedValue::deep_clone);
        let step = &self.steps[idx];
        let output = match (&step.action, &previous) {
            (StepAction::Object { object, .. }, _) => object.clone(),
            (StepAction::Property, Some(input)) => get_property(input, &step.name)?,
            (StepAction::Call { args }, Some(input)) => {
                self.ctx.call_method(input, &step.name, args.clone())?
            }
            (_, None) => TracedValue::Undefined,
        };
        debug!("Step {} ({}) produced {}", idx, step.name, output);

        let original = self.working_object().deep_clone();
        let step = &mut self.steps[idx];
        step.unprocessed_input = input;
        step.output = Some(output);
        step.original = Some(original);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn bindings() -> Assignments {
        let mut b = IndexMap::new();
        b.insert(
            "anArray".to_string(),
            TracedValue::new_array(vec!["a".into(), "b".into(), "c".into()]),
        );
        b.insert("index".to_string(), 1.into());
        b.insert("count".to_string(), 2.into());
        b
    }

    #[test]
    fn out_of_range_steps_are_rejected() {
        let mut chain = function_chain_from_line("anArray.reverse()", &bindings()).unwrap();
        assert_eq!(chain.len(), 2);
        assert!(matches!(
            chain.execute_until(2),
            Err(ChainError::StepOutOfRange { step: 2, len: 2 })
        ));
    }

    #[test]
    fn replay_does_not_touch_the_bindings() {
        let b = bindings();
        let mut chain = function_chain_from_line("anArray.splice(index, count)", &b).unwrap();
        chain.execute_until(1).unwrap();
        assert_eq!(
            b["anArray"],
            TracedValue::new_array(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn empty_lines_have_no_chain() {
        assert!(matches!(
            function_chain_from_line(";", &bindings()),
            Err(ChainError::EmptyChain)
        ));
    }

    #[test]
    fn literal_roots_are_anonymous() {
        let chain = function_chain_from_line("'abc'.toUpperCase()", &bindings()).unwrap();
        assert_eq!(chain.root_name(), ANONYMOUS);
    }
}

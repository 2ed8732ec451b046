//! The state an editor keeps between commands: the most recent trace, plus
//! the registry and limits replays run with.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::chain::{CallChainElement, ChainError, ElementKind, FunctionChain, LineParser};
use crate::parser::ast::Position;
use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::builtins::types::EvalContext;
use crate::runner::config::{ConfigError, TracerConfig};
use crate::runner::ds::value::TracedValue;
use crate::tracer::results::Assignments;
use crate::tracer::{self, ContextEntry, ContextKind, TraceError, TracingResults};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No source has been traced yet")]
    NoTrace,
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Context entries by name, in discovery order.
pub type ContextMap = IndexMap<String, Vec<ContextEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: TracedValue,
}

/// What one replayed step received and returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub input: Option<TracedValue>,
    pub return_value: TracedValue,
    /// The chain's root receiver right after this step.
    pub original: NamedValue,
}

pub struct Session {
    config: TracerConfig,
    registry: Rc<BuiltInRegistry>,
    last_trace: Option<TracingResults>,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            config: TracerConfig::default(),
            registry: Rc::new(BuiltInRegistry::with_core()),
            last_trace: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// A session whose registry carries the aliases from `config`.
    pub fn with_config(config: TracerConfig) -> Result<Self, SessionError> {
        let registry = config.build_registry()?;
        Ok(Session {
            config,
            registry: Rc::new(registry),
            last_trace: None,
        })
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    pub fn last_trace(&self) -> Option<&TracingResults> {
        self.last_trace.as_ref()
    }

    fn current_trace(&self) -> Result<&TracingResults, SessionError> {
        self.last_trace.as_ref().ok_or(SessionError::NoTrace)
    }

    fn eval_context(&self) -> EvalContext {
        EvalContext::new(self.registry.clone(), &self.config)
    }

    /// Traces `source`, keeps the scope enclosing `position`, and returns
    /// everything visible from there.
    pub fn trace(&mut self, source: &str, position: Position) -> Result<Assignments, SessionError> {
        let results =
            tracer::trace_with_config(source, &self.config)?
                .scope_for_position(position.line, position.column);
        info!(
            "Traced {} scopes, positioned in {:?}",
            results.tree().len(),
            results
        );
        let assignments = results.all_assignments();
        self.last_trace = Some(results);
        Ok(assignments)
    }

    /// The chain elements of `line` with traced values filled in for names.
    pub fn elements_for_line(&self, line: &str) -> Result<Vec<CallChainElement>, SessionError> {
        let assignments = self.current_trace()?.all_assignments();
        let mut elements = LineParser::parse(line).map_err(ChainError::from)?;
        for element in elements.iter_mut() {
            substitute(element, &assignments);
            for param in element.params.iter_mut() {
                substitute(param, &assignments);
            }
        }
        Ok(elements)
    }

    /// Replays the chain on `line` up to step `idx` and reports every step.
    pub fn execute_line_until(
        &self,
        line: &str,
        idx: usize,
    ) -> Result<Vec<StepResult>, SessionError> {
        let assignments = self.current_trace()?.all_assignments();
        let mut chain = FunctionChain::from_line(line, &assignments, self.eval_context())?;
        info!("Executing '{}' until step {}", line.trim(), idx);
        chain.execute_until(idx)?;

        let root = chain.root_name().to_string();
        let steps = chain.steps();
        Ok((0..=idx)
            .map(|i| {
                let return_value = if i == idx {
                    steps[i].output.clone()
                } else {
                    steps[i + 1].unprocessed_input.clone()
                };
                StepResult {
                    input: steps[i].unprocessed_input.clone(),
                    return_value: return_value.unwrap_or(TracedValue::Undefined),
                    original: NamedValue {
                        name: root.clone(),
                        value: steps[i].original.clone().unwrap_or(TracedValue::Undefined),
                    },
                }
            })
            .collect())
    }

    /// Context entries for every name used on `line`.
    pub fn context_for_line(&self, line: &str) -> Result<ContextMap, SessionError> {
        let trace = self.current_trace()?;
        let elements = LineParser::parse(line).map_err(ChainError::from)?;
        let mut map = IndexMap::new();
        for name in names_in(&elements) {
            if map.contains_key(&name) {
                continue;
            }
            let entries = trace.context_for(&name);
            if !entries.is_empty() {
                map.insert(name, entries);
            }
        }
        Ok(map)
    }

    /// Context for the line at `position` in `source`, following the names
    /// each kept entry mentions in turn. Only entries before that line are
    /// kept, except function declarations.
    pub fn context_for_position_in_source(
        &self,
        position: Position,
        source: &str,
    ) -> Result<ContextMap, SessionError> {
        let results =
            tracer::trace_with_config(source, &self.config)?
                .scope_for_position(position.line, position.column);
        let line = source
            .lines()
            .nth(position.line.saturating_sub(1))
            .unwrap_or_default();
        let elements = LineParser::parse(line).map_err(ChainError::from)?;

        let mut collector = ContextCollector {
            results: &results,
            source,
            before_line: position.line,
            visited: HashSet::new(),
            map: IndexMap::new(),
        };
        for name in names_in(&elements) {
            collector.expand(&name);
        }
        Ok(collector.map)
    }
}

/// Fills in the traced value of a named element. Functions are shown by name.
fn substitute(element: &mut CallChainElement, assignments: &Assignments) {
    if element.value.is_some() {
        return;
    }
    let value = element.name.as_ref().and_then(|n| assignments.get(n));
    element.value = match value {
        Some(TracedValue::Function(f)) => {
            Some(TracedValue::String(format!("[Function] {}", f.name)))
        }
        Some(v) => Some(v.clone()),
        None => None,
    };
}

/// Names in depth-first order, each element's parameters before itself.
fn names_in(elements: &[CallChainElement]) -> Vec<String> {
    let mut names = Vec::new();
    collect_names(elements, &mut names);
    names
}

fn collect_names(elements: &[CallChainElement], names: &mut Vec<String>) {
    for element in elements {
        if let Some(key) = &element.key {
            collect_names(key, names);
        }
        collect_names(&element.params, names);
        if element.kind != ElementKind::Function {
            if let Some(name) = &element.name {
                names.push(name.clone());
            }
        }
    }
}

struct ContextCollector<'a> {
    results: &'a TracingResults,
    source: &'a str,
    before_line: usize,
    visited: HashSet<String>,
    map: ContextMap,
}

impl ContextCollector<'_> {
    fn expand(&mut self, name: &str) {
        if !self.visited.insert(name.to_string()) {
            return;
        }
        let entries = self.results.context_for(name);
        if entries.is_empty() {
            return;
        }
        let kept: Vec<ContextEntry> = entries
            .into_iter()
            .filter(|e| {
                e.start_line() < self.before_line || e.kind == ContextKind::FunctionDeclaration
            })
            .collect();
        self.map.insert(name.to_string(), kept.clone());

        for entry in &kept {
            let text = entry.meta.source_text(self.source);
            match LineParser::parse(text) {
                Ok(elements) => {
                    for next in names_in(&elements) {
                        self.expand(&next);
                    }
                }
                Err(e) => debug!("Not following context '{}': {}", text, e),
            }
        }
    }
}

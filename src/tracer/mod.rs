//! Static tracing of a program into a tree of scopes.
//!
//! The tracer walks declarations, assignments and function definitions in
//! source order and records what each name is bound to. Control flow is not
//! followed and calls are not made. Statements the tracer cannot model are
//! skipped, and a binding whose value cannot be determined is left
//! undefined; tracing always continues with the next statement.

pub mod resolver;
pub mod results;
pub mod scope;

use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::parser::ast::{
    DeclarationType, ExpressionType, HasMeta, ProgramData, SourceLocation, StatementType,
    VariableDeclarationData,
};
use crate::parser::{JsParser, Rule};
use crate::runner::config::TracerConfig;
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::arithmetic::apply_binary_operator;
use crate::runner::ds::operations::object::set_property;
use crate::runner::ds::value::TracedValue;

pub use self::resolver::{element_value, literal_elements};
pub use self::results::TracingResults;
pub use self::scope::{ContextEntry, ContextKind, Scope, ScopeId, ScopeTree};

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Failed to parse source: {0}")]
    Parse(#[from] pest::error::Error<Rule>),
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Parses and traces `source`. The results are positioned at the root scope.
pub fn trace(source: &str) -> Result<TracingResults, TraceError> {
    trace_with_config(source, &TracerConfig::default())
}

/// [`trace`] with the array limits from `config`.
pub fn trace_with_config(
    source: &str,
    config: &TracerConfig,
) -> Result<TracingResults, TraceError> {
    let program = JsParser::parse_to_ast_from_str(source)?;
    Ok(ScopeBuilder::build_with_config(&program, config))
}

/// Walks statements and fills a [`ScopeTree`].
pub struct ScopeBuilder {
    tree: ScopeTree,
    /// Passed to every array write the tracer makes.
    pub max_array_growth: usize,
}

impl ScopeBuilder {
    pub fn new(location: SourceLocation) -> Self {
        ScopeBuilder {
            tree: ScopeTree::new(location),
            max_array_growth: TracerConfig::default().max_array_growth,
        }
    }

    pub fn root(&self) -> ScopeId {
        self.tree.root()
    }

    /// Traces a whole program.
    pub fn build(program: &ProgramData) -> TracingResults {
        ScopeBuilder::build_with_config(program, &TracerConfig::default())
    }

    pub fn build_with_config(program: &ProgramData, config: &TracerConfig) -> TracingResults {
        let mut builder = ScopeBuilder::new(program.meta.loc);
        builder.max_array_growth = config.max_array_growth;
        let root = builder.root();
        builder.visit_statements(&program.body, root);
        builder.finish()
    }

    pub fn finish(self) -> TracingResults {
        let root = self.tree.root();
        TracingResults::new(Rc::new(self.tree), Some(root))
    }

    pub fn visit_statements(&mut self, statements: &[StatementType], scope: ScopeId) {
        for stmt in statements {
            self.visit_statement(stmt, scope);
        }
    }

    fn visit_statement(&mut self, stmt: &StatementType, scope: ScopeId) {
        match stmt {
            StatementType::DeclarationStatement(DeclarationType::VariableDeclaration(decl)) => {
                self.visit_variable_declaration(decl, scope)
            }
            StatementType::DeclarationStatement(DeclarationType::FunctionDeclaration(data)) => {
                let name = data.name().unwrap_or_default().to_string();
                let value = self.function_value(data, None, scope);
                if !name.is_empty() {
                    let target = self.tree.get_mut(scope);
                    if !target.has_context(&name) {
                        target.add_context(
                            &name,
                            ContextEntry::new(ContextKind::FunctionDeclaration, &data.meta),
                        );
                    }
                    target.env.declare(&name, value);
                }
            }
            StatementType::ExpressionStatement { expression, .. } => {
                self.visit_expression_statement(expression, scope)
            }
            StatementType::ReturnStatement {
                argument: Some(expression),
                ..
            } => self.visit_expression_statement(expression, scope),
            other => debug!("Skipping {} while tracing", other.type_name()),
        }
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclarationData, scope: ScopeId) {
        for declarator in &decl.declarations {
            let name = &declarator.id.name;
            let target = self.tree.get_mut(scope);
            target.add_context(name, ContextEntry::new(ContextKind::Declaration, &declarator.meta));
            target.env.declare(name, TracedValue::Null);

            if let Some(init) = &declarator.init {
                let value = match self.initial_value(init, name, scope) {
                    Ok(value) => value,
                    Err(e) => {
                        debug!("Leaving '{}' undefined: {}", name, e);
                        TracedValue::Undefined
                    }
                };
                self.tree.get(scope).env.declare(name, value);
            }
        }
    }

    /// Value of a declarator's initializer.
    fn initial_value(
        &mut self,
        init: &ExpressionType,
        name: &str,
        scope: ScopeId,
    ) -> Result<TracedValue, TraceError> {
        match init {
            ExpressionType::Identifier(id) => {
                Ok(self.lookup(&id.name, scope).unwrap_or(TracedValue::Undefined))
            }
            ExpressionType::ArrayExpression { elements, .. } => Ok(literal_elements(elements)),
            ExpressionType::AssignmentExpression { .. } => self.trace_assignment(init, scope),
            ExpressionType::FunctionExpression(data) => {
                Ok(self.function_value(data, Some(name), scope))
            }
            _ => self.value_for(init, scope),
        }
    }

    fn visit_expression_statement(&mut self, expression: &ExpressionType, scope: ScopeId) {
        match expression {
            ExpressionType::AssignmentExpression { .. } => {
                if let Err(e) = self.trace_assignment(expression, scope) {
                    debug!("Assignment not traced: {}", e);
                }
            }
            ExpressionType::BinaryExpression { .. } => {
                if let Err(e) = self.value_for(expression, scope) {
                    debug!("Expression not traced: {}", e);
                }
            }
            ExpressionType::CallExpression { meta, callee, .. } => {
                if let ExpressionType::MemberExpression(member) = callee.as_ref() {
                    if let ExpressionType::Identifier(object) = member.object() {
                        let target = self.tree.get_mut(scope);
                        if target.has_context(&object.name) {
                            target.add_context(
                                &object.name,
                                ContextEntry::new(ContextKind::Call, meta),
                            );
                        }
                    }
                }
            }
            other => debug!("Skipping {} statement while tracing", other.type_name()),
        }
    }

    /// Traces `a = b = value` right to left and returns the assigned value.
    fn trace_assignment(
        &mut self,
        expr: &ExpressionType,
        scope: ScopeId,
    ) -> Result<TracedValue, TraceError> {
        let (operator, left, right) = match expr {
            ExpressionType::AssignmentExpression {
                operator,
                left,
                right,
                ..
            } => (operator, left, right),
            other => return self.value_for(other, scope),
        };

        let mut value = match right.as_ref() {
            ExpressionType::AssignmentExpression { .. } => self.trace_assignment(right, scope)?,
            ExpressionType::FunctionExpression(data) => {
                let name = match left.as_ref() {
                    ExpressionType::Identifier(id) => Some(id.name.as_str()),
                    _ => None,
                };
                self.function_value(data, name, scope)
            }
            _ => self.value_for(right, scope)?,
        };
        if let Some(op) = operator.binary_operator() {
            let current = self.value_for(left, scope)?;
            value = apply_binary_operator(&op, &current, &value)?;
        }

        match left.as_ref() {
            ExpressionType::Identifier(id) => {
                self.tree.get(scope).env.declare(&id.name, value.clone());
            }
            ExpressionType::MemberExpression(member) => {
                let (object, key) = self.member_target(member, scope)?;
                match &object {
                    TracedValue::ScopeRef(id) => {
                        self.tree.get(*id).env.declare(&key, value.clone());
                    }
                    TracedValue::Object(_) | TracedValue::Array(_) | TracedValue::Function(_) => {
                        set_property(&object, &key, value.clone(), self.max_array_growth)?;
                    }
                    other => debug!(
                        "Not tracing assignment to '{}' on {} at line {}",
                        key,
                        other.type_name(),
                        member.get_meta().loc.start.line
                    ),
                }
            }
            other => {
                return Err(TraceError::UnsupportedConstruct(format!(
                    "assignment to {}",
                    other.type_name()
                )))
            }
        }
        Ok(value)
    }
}

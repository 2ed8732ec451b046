//! Decomposes one statement into the elements of its call chain.
//!
//! `var r = list.slice(1, n).map(f)` becomes `[list, slice(1, n), map(f)]`.
//! Only the right-hand side of a declaration or assignment is considered.

use std::fmt;
use std::rc::Rc;

use log::trace;
use pest::error::Error;
use serde::Serialize;

use crate::parser::ast::{
    DeclarationType, ExpressionType, FunctionData, HasMeta, MemberExpressionType, SourceLocation,
    StatementType,
};
use crate::parser::{JsParser, Rule};
use crate::runner::ds::operations::arithmetic::apply_binary_operator;
use crate::runner::ds::value::TracedValue;
use crate::runner::eval::expression::literal_value;
use crate::tracer::{element_value, literal_elements};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    Identifier,
    /// A property access that is not called.
    Property,
    Call,
    New,
    Literal,
    Array,
    Binary,
    /// An inline function or arrow function argument.
    Function,
}

/// An inline function argument, kept as AST so replay can create it.
#[derive(Clone)]
pub struct InlineFunction(pub Rc<FunctionData>);

impl PartialEq for InlineFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for InlineFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InlineFunction({})", self.0.name().unwrap_or("anonymous"))
    }
}

/// One position of a call chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallChainElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<TracedValue>,
    pub kind: ElementKind,
    pub loc: SourceLocation,
    pub params: Vec<CallChainElement>,
    pub params_count: usize,
    #[serde(skip)]
    pub function: Option<InlineFunction>,
    /// Elements of the key of a computed member such as `a[i]`. The key is
    /// resolved when the chain is bound; an empty key cannot be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Vec<CallChainElement>>,
}

impl CallChainElement {
    fn named(name: &str, kind: ElementKind, loc: SourceLocation) -> Self {
        CallChainElement {
            name: Some(name.to_string()),
            value: None,
            kind,
            loc,
            params: Vec::new(),
            params_count: 0,
            function: None,
            key: None,
        }
    }

    fn valued(value: TracedValue, kind: ElementKind, loc: SourceLocation) -> Self {
        CallChainElement {
            name: None,
            value: Some(value),
            kind,
            loc,
            params: Vec::new(),
            params_count: 0,
            function: None,
            key: None,
        }
    }

    fn computed(key: Vec<CallChainElement>, loc: SourceLocation) -> Self {
        CallChainElement {
            name: None,
            value: None,
            kind: ElementKind::Property,
            loc,
            params: Vec::new(),
            params_count: 0,
            function: None,
            key: Some(key),
        }
    }

    pub fn is_invocation(&self) -> bool {
        matches!(self.kind, ElementKind::Call | ElementKind::New)
    }
}

pub struct LineParser;

impl LineParser {
    /// Elements of the first statement in `line`, root first.
    pub fn parse(line: &str) -> Result<Vec<CallChainElement>, Error<Rule>> {
        let program = JsParser::parse_to_ast_from_str(line)?;
        let mut elements = Vec::new();
        match program.body.first() {
            Some(StatementType::ExpressionStatement { expression, .. }) => {
                parse_expression(expression, &mut elements)
            }
            Some(StatementType::DeclarationStatement(DeclarationType::VariableDeclaration(decl))) => {
                if let Some(init) = decl.declarations.first().and_then(|d| d.init.as_ref()) {
                    parse_expression(init, &mut elements);
                }
            }
            Some(other) => trace!("No call chain in {}", other.type_name()),
            None => {}
        }
        Ok(elements)
    }
}

fn parse_expression(expr: &ExpressionType, elements: &mut Vec<CallChainElement>) {
    match expr {
        ExpressionType::CallExpression {
            meta,
            callee,
            arguments,
        }
        | ExpressionType::NewExpression {
            meta,
            callee,
            arguments,
        } => {
            parse_expression(callee, elements);
            if let Some(last) = elements.last_mut() {
                last.kind = match expr {
                    ExpressionType::NewExpression { .. } => ElementKind::New,
                    _ => ElementKind::Call,
                };
                last.params_count = arguments.len();
                last.loc.end = meta.loc.end;
                for argument in arguments {
                    parse_expression(argument, &mut last.params);
                }
            }
        }
        ExpressionType::MemberExpression(member) => {
            parse_expression(member.object(), elements);
            match member {
                MemberExpressionType::SimpleMemberExpression { property, .. } => {
                    elements.push(CallChainElement::named(
                        &property.name,
                        ElementKind::Property,
                        property.meta.loc,
                    ))
                }
                MemberExpressionType::ComputedMemberExpression { property, .. } => {
                    let mut key = Vec::new();
                    parse_expression(property, &mut key);
                    elements.push(CallChainElement::computed(key, property.get_meta().loc));
                }
            }
        }
        ExpressionType::AssignmentExpression { right, .. } => parse_expression(right, elements),
        ExpressionType::Identifier(id) => elements.push(CallChainElement::named(
            &id.name,
            ElementKind::Identifier,
            id.meta.loc,
        )),
        ExpressionType::ArrayExpression { meta, elements: items } => elements.push(
            CallChainElement::valued(literal_elements(items), ElementKind::Array, meta.loc),
        ),
        ExpressionType::Literal(lit) => elements.push(CallChainElement::valued(
            literal_value(&lit.value),
            ElementKind::Literal,
            lit.meta.loc,
        )),
        ExpressionType::BinaryExpression {
            meta,
            operator,
            left,
            right,
        } => {
            let value = apply_binary_operator(operator, &element_value(left), &element_value(right))
                .unwrap_or(TracedValue::Undefined);
            elements.push(CallChainElement::valued(value, ElementKind::Binary, meta.loc));
        }
        ExpressionType::FunctionExpression(data) => {
            let mut element = CallChainElement::named(
                data.name().unwrap_or("anonymous"),
                ElementKind::Function,
                data.meta.loc,
            );
            element.function = Some(InlineFunction(data.clone()));
            elements.push(element);
        }
        other => trace!(
            "Ignoring {} at line {}",
            other.type_name(),
            other.get_meta().loc.start.line
        ),
    }
}

//! Static values of expressions.
//!
//! Nothing is executed here: calls and `new` are not modelled. Identifiers
//! with no binding resolve to [`TracedValue::Unresolved`].

use std::rc::Rc;

use indexmap::IndexMap;
use log::trace;

use super::scope::ScopeId;
use super::{ScopeBuilder, TraceError};
use crate::parser::ast::{
    ExpressionType, FunctionBodyOrExpression, FunctionData, MemberExpressionType, UnaryOperator,
};
use crate::runner::ds::operations::arithmetic::apply_binary_operator;
use crate::runner::ds::operations::object::get_property;
use crate::runner::ds::operations::type_conversion::{
    get_type, to_boolean, to_number, to_property_key,
};
use crate::runner::ds::value::TracedValue;
use crate::runner::eval::expression::literal_value;
use crate::runner::eval::function::make_function;

/// Value of an array literal element: literals (optionally signed) as
/// themselves, identifiers as unresolved names.
pub fn element_value(element: &ExpressionType) -> TracedValue {
    match element {
        ExpressionType::Literal(lit) => literal_value(&lit.value),
        ExpressionType::Identifier(id) => TracedValue::Unresolved(id.name.clone()),
        ExpressionType::UnaryExpression {
            operator: op @ (UnaryOperator::Minus | UnaryOperator::Plus),
            argument,
            ..
        } => match argument.as_ref() {
            ExpressionType::Literal(lit) => {
                let n = to_number(&literal_value(&lit.value));
                TracedValue::Number(if *op == UnaryOperator::Minus { -n } else { n })
            }
            _ => TracedValue::Undefined,
        },
        _ => TracedValue::Undefined,
    }
}

/// An array literal resolved one level deep.
pub fn literal_elements(elements: &[ExpressionType]) -> TracedValue {
    TracedValue::new_array(elements.iter().map(element_value).collect())
}

impl ScopeBuilder {
    /// Statically known value of `expr` in `scope`.
    pub fn value_for(
        &mut self,
        expr: &ExpressionType,
        scope: ScopeId,
    ) -> Result<TracedValue, TraceError> {
        let value = match expr {
            ExpressionType::Literal(lit) => literal_value(&lit.value),
            ExpressionType::Identifier(id) => self.lookup(&id.name, scope).unwrap_or_else(|| {
                if id.name == "undefined" {
                    TracedValue::Undefined
                } else {
                    TracedValue::Unresolved(id.name.clone())
                }
            }),
            ExpressionType::BinaryExpression {
                operator,
                left,
                right,
                ..
            } => {
                let l = self.value_for(left, scope)?;
                let r = self.value_for(right, scope)?;
                apply_binary_operator(operator, &l, &r)?
            }
            ExpressionType::UnaryExpression {
                operator, argument, ..
            } => {
                let v = self.value_for(argument, scope)?;
                match operator {
                    UnaryOperator::Minus => TracedValue::Number(-to_number(&v)),
                    UnaryOperator::Plus => TracedValue::Number(to_number(&v)),
                    UnaryOperator::LogicalNot => TracedValue::Boolean(!to_boolean(&v)),
                    UnaryOperator::TypeOf => TracedValue::String(get_type(&v).to_string()),
                    other => {
                        return Err(TraceError::UnsupportedConstruct(format!(
                            "UnaryExpression ({:?})",
                            other
                        )))
                    }
                }
            }
            ExpressionType::MemberExpression(member) => {
                let (object, key) = self.member_target(member, scope)?;
                match object {
                    TracedValue::ScopeRef(id) => self
                        .tree
                        .get(id)
                        .env
                        .lookup(&key)
                        .unwrap_or(TracedValue::Undefined),
                    other => get_property(&other, &key)?,
                }
            }
            ExpressionType::ObjectExpression { properties, .. } => {
                let mut map = IndexMap::new();
                for prop in properties {
                    let value = self.value_for(&prop.value, scope)?;
                    map.insert(prop.key.clone(), value);
                }
                TracedValue::new_object(map)
            }
            ExpressionType::ArrayExpression { elements, .. } => literal_elements(elements),
            ExpressionType::FunctionExpression(data) => self.function_value(data, None, scope),
            ExpressionType::ThisExpression { .. } => TracedValue::ScopeRef(scope),
            other => return Err(TraceError::UnsupportedConstruct(other.type_name().to_string())),
        };
        trace!("{} resolved to {}", expr.type_name(), value);
        Ok(value)
    }

    /// Parent-chain lookup starting at `scope`.
    pub(crate) fn lookup(&self, name: &str, scope: ScopeId) -> Option<TracedValue> {
        self.tree.get(scope).env.lookup(name)
    }

    /// The object a member expression reads from and its property key.
    pub(crate) fn member_target(
        &mut self,
        member: &MemberExpressionType,
        scope: ScopeId,
    ) -> Result<(TracedValue, String), TraceError> {
        match member {
            MemberExpressionType::SimpleMemberExpression {
                object, property, ..
            } => Ok((self.value_for(object, scope)?, property.name.clone())),
            MemberExpressionType::ComputedMemberExpression {
                object, property, ..
            } => {
                let object = self.value_for(object, scope)?;
                let key = to_property_key(&self.value_for(property, scope)?);
                Ok((object, key))
            }
        }
    }

    /// Opens a child scope for `data`, traces its body there, and returns the
    /// callable. The callable closes over `scope`, where it was defined.
    pub(crate) fn function_value(
        &mut self,
        data: &Rc<FunctionData>,
        name: Option<&str>,
        scope: ScopeId,
    ) -> TracedValue {
        let scope_name = data.name().or(name);
        let child = self
            .tree
            .add_child(scope, scope_name, data.body_meta().loc);
        for param in &data.params {
            self.tree
                .get(child)
                .env
                .declare(&param.name, TracedValue::Unresolved(param.name.clone()));
        }
        if let FunctionBodyOrExpression::FunctionBody(body) = &data.body {
            self.visit_statements(&body.body, child);
        }
        let env = self.tree.get(scope).env.clone();
        make_function(data, name, &env, &TracedValue::Undefined)
    }
}

//! Arena of lexical scopes produced by one trace.

use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::parser::ast::{Meta, SourceLocation};
use crate::runner::ds::env::Environment;
use crate::runner::ds::value::TracedValue;

/// Index of a scope in its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub usize);

/// What put a name into a scope's context list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContextKind {
    Declaration,
    FunctionDeclaration,
    Call,
}

/// A source span that mentions a name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextEntry {
    pub kind: ContextKind,
    pub meta: Meta,
}

impl ContextEntry {
    pub fn new(kind: ContextKind, meta: &Meta) -> Self {
        ContextEntry {
            kind,
            meta: meta.clone(),
        }
    }

    pub fn start_line(&self) -> usize {
        self.meta.loc.start.line
    }
}

pub struct Scope {
    /// Name of the owning function; `None` for the root and anonymous functions.
    pub name: Option<String>,
    pub location: SourceLocation,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Bindings of this scope. Its outer environment is the parent scope's.
    pub env: Rc<Environment>,
    pub contexts: IndexMap<String, Vec<ContextEntry>>,
}

impl Scope {
    /// Bindings made in this scope only, in declaration order.
    pub fn bindings(&self) -> IndexMap<String, TracedValue> {
        self.env.own_bindings()
    }

    pub fn add_context(&mut self, name: &str, entry: ContextEntry) {
        self.contexts
            .entry(name.to_string())
            .or_default()
            .push(entry);
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.contexts.get(name).map_or(false, |e| !e.is_empty())
    }
}

/// Owns every scope of a trace. The root is always `ScopeId(0)`.
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new(location: SourceLocation) -> Self {
        ScopeTree {
            scopes: vec![Scope {
                name: None,
                location,
                parent: None,
                children: Vec::new(),
                env: Environment::new_global(),
                contexts: IndexMap::new(),
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    /// Appends a child of `parent`; children keep declaration order.
    pub fn add_child(
        &mut self,
        parent: ScopeId,
        name: Option<&str>,
        location: SourceLocation,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        let env = Environment::new_child(&self.get(parent).env);
        self.scopes.push(Scope {
            name: name.map(str::to_string),
            location,
            parent: Some(parent),
            children: Vec::new(),
            env,
            contexts: IndexMap::new(),
        });
        self.get_mut(parent).children.push(id);
        id
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), move |current| self.get(*current).parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Position;

    fn loc(a: usize, b: usize) -> SourceLocation {
        SourceLocation {
            start: Position::new(a, 0),
            end: Position::new(b, 1),
        }
    }

    #[test]
    fn children_see_parent_bindings() {
        let mut tree = ScopeTree::new(loc(1, 10));
        let child = tree.add_child(tree.root(), Some("f"), loc(2, 4));
        tree.get(tree.root()).env.declare("a", TracedValue::from(1));
        tree.get(child).env.declare("b", TracedValue::from(2));

        assert_eq!(tree.get(child).env.lookup("a"), Some(TracedValue::from(1)));
        assert_eq!(tree.get(tree.root()).env.lookup("b"), None);
        assert_eq!(tree.get(tree.root()).children, vec![child]);
        assert_eq!(
            tree.ancestors(child).collect::<Vec<_>>(),
            vec![child, ScopeId(0)]
        );
    }
}

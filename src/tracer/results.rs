//! Queries over a finished trace.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::scope::{ContextEntry, Scope, ScopeId, ScopeTree};
use crate::parser::ast::SourceLocation;
use crate::runner::ds::value::TracedValue;

/// Name to value, innermost binding first.
pub type Assignments = IndexMap<String, TracedValue>;

/// A view of one scope in a trace.
///
/// Lookups that find no scope return an empty view rather than failing, so
/// calls can be chained.
#[derive(Clone)]
pub struct TracingResults {
    tree: Rc<ScopeTree>,
    current: Option<ScopeId>,
}

/// Whether `location` contains the 1-based `line` and 0-based `column`.
///
/// A scope on a single line only compares columns. On multi-line scopes the
/// opening line needs a column past the start and the closing line a column
/// before the end.
pub fn location_contains(location: &SourceLocation, line: usize, column: usize) -> bool {
    let (start, end) = (location.start, location.end);
    if start.line == end.line {
        start.column < column && end.column > column
    } else if line == start.line {
        start.column < column
    } else if line == end.line {
        end.column > column
    } else {
        start.line < line && line < end.line
    }
}

impl TracingResults {
    pub(crate) fn new(tree: Rc<ScopeTree>, current: Option<ScopeId>) -> Self {
        TracingResults { tree, current }
    }

    fn with_scope(&self, current: Option<ScopeId>) -> Self {
        TracingResults::new(self.tree.clone(), current)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn scope_id(&self) -> Option<ScopeId> {
        self.current
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.current.map(|id| self.tree.get(id))
    }

    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    pub fn scope_name(&self) -> Option<&str> {
        self.scope().and_then(|s| s.name.as_deref())
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.scope().map(|s| s.location)
    }

    pub fn root(&self) -> TracingResults {
        self.with_scope(Some(self.tree.root()))
    }

    pub fn parent(&self) -> TracingResults {
        self.with_scope(self.scope().and_then(|s| s.parent))
    }

    pub fn children(&self) -> Vec<TracingResults> {
        self.scope()
            .map(|s| s.children.iter().map(|c| self.with_scope(Some(*c))).collect())
            .unwrap_or_default()
    }

    /// Bindings visible from this scope. An inner binding hides an outer one
    /// of the same name.
    pub fn all_assignments(&self) -> Assignments {
        let mut all = IndexMap::new();
        if let Some(current) = self.current {
            for id in self.tree.ancestors(current) {
                for (name, value) in self.tree.get(id).bindings() {
                    all.entry(name).or_insert(value);
                }
            }
        }
        all
    }

    pub fn traced_value_for(&self, name: &str) -> TracedValue {
        self.current
            .and_then(|id| self.tree.get(id).env.lookup(name))
            .unwrap_or(TracedValue::Undefined)
    }

    /// The innermost scope below this one containing the position, or this
    /// scope when none does.
    pub fn scope_for_position(&self, line: usize, column: usize) -> TracingResults {
        let found = self.current.and_then(|id| {
            self.find(id, &|scope: &Scope| location_contains(&scope.location, line, column))
        });
        self.with_scope(found.or(self.current))
    }

    /// The scope of the function called `name`; empty when there is none.
    pub fn scope_by_name(&self, name: &str) -> TracingResults {
        let found = self
            .current
            .and_then(|id| self.find(id, &|scope: &Scope| scope.name.as_deref() == Some(name)));
        self.with_scope(found)
    }

    /// Depth-first search. Later matches replace earlier ones, and a match in
    /// a subtree replaces its root.
    fn find(&self, id: ScopeId, pred: &dyn Fn(&Scope) -> bool) -> Option<ScopeId> {
        let mut best = if pred(self.tree.get(id)) {
            Some(id)
        } else {
            None
        };
        for child in &self.tree.get(id).children {
            if let Some(found) = self.find(*child, pred) {
                best = Some(found);
            }
        }
        best
    }

    /// Context entries of this scope, by name.
    pub fn contexts(&self) -> IndexMap<String, Vec<ContextEntry>> {
        self.scope().map(|s| s.contexts.clone()).unwrap_or_default()
    }

    /// Entries recorded for `name` in the nearest scope that has any.
    pub fn context_for(&self, name: &str) -> Vec<ContextEntry> {
        self.current
            .and_then(|current| {
                self.tree
                    .ancestors(current)
                    .find_map(|id| self.tree.get(id).contexts.get(name).filter(|e| !e.is_empty()))
            })
            .cloned()
            .unwrap_or_default()
    }
}

impl PartialEq for TracingResults {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree) && self.current == other.current
    }
}

impl fmt::Debug for TracingResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current {
            None => write!(f, "TracingResults(empty)"),
            Some(id) => write!(
                f,
                "TracingResults(#{} {})",
                id.0,
                self.scope_name().unwrap_or("[anonymous]")
            ),
        }
    }
}

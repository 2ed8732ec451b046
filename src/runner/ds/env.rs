use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::runner::ds::value::TracedValue;

/// A binding environment with a link to the one it is nested in.
///
/// Scopes built by the tracer and call frames created by the interpreter are
/// both environments, so a function defined while tracing closes over the
/// very bindings the trace recorded.
#[derive(Default)]
pub struct Environment {
    bindings: RefCell<IndexMap<String, TracedValue>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new_global() -> Rc<Environment> {
        Rc::new(Environment::default())
    }

    pub fn new_child(outer: &Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            bindings: RefCell::new(IndexMap::new()),
            outer: Some(outer.clone()),
        })
    }

    pub fn outer(&self) -> Option<&Rc<Environment>> {
        self.outer.as_ref()
    }

    /// Creates or overwrites a binding in this environment.
    pub fn declare(&self, name: &str, value: TracedValue) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    pub fn has_own_binding(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    pub fn get_own(&self, name: &str) -> Option<TracedValue> {
        self.bindings.borrow().get(name).cloned()
    }

    pub fn lookup(&self, name: &str) -> Option<TracedValue> {
        if let Some(v) = self.get_own(name) {
            return Some(v);
        }
        let mut env = self.outer.clone();
        while let Some(e) = env {
            if let Some(v) = e.get_own(name) {
                return Some(v);
            }
            env = e.outer.clone();
        }
        None
    }

    /// Updates the nearest existing binding. Returns false when no environment
    /// in the chain binds `name`.
    pub fn assign(&self, name: &str, value: TracedValue) -> bool {
        if let Some(slot) = self.bindings.borrow_mut().get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.outer {
            Some(outer) => outer.assign(name, value),
            None => false,
        }
    }

    /// Snapshot of this environment's own bindings in declaration order.
    pub fn own_bindings(&self) -> IndexMap<String, TracedValue> {
        self.bindings.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_reads_through_to_outer() {
        let global = Environment::new_global();
        global.declare("a", 1.into());
        let inner = Environment::new_child(&global);
        inner.declare("b", 2.into());
        assert_eq!(inner.lookup("a"), Some(1.into()));
        assert_eq!(global.lookup("b"), None);
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let global = Environment::new_global();
        global.declare("a", 1.into());
        let inner = Environment::new_child(&global);
        assert!(inner.assign("a", 5.into()));
        assert!(!inner.has_own_binding("a"));
        assert_eq!(global.get_own("a"), Some(5.into()));
        assert!(!inner.assign("missing", 0.into()));
    }
}

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::parser::ast::FunctionData;
use crate::runner::ds::env::Environment;
use crate::runner::ds::operations::type_conversion::number_to_string;
use crate::tracer::scope::ScopeId;

/// Nesting beyond this depth is printed/serialized as `[Circular]`.
const MAX_RENDER_DEPTH: usize = 32;

pub type ArrayRef = Rc<RefCell<Vec<TracedValue>>>;
pub type ObjectRef = Rc<RefCell<ObjectData>>;
pub type FunctionRef = Rc<FunctionValue>;

/// A statically known value.
///
/// Arrays and objects are shared handles: cloning a `TracedValue` aliases the
/// underlying storage, so two bindings of the same literal observe each other's
/// mutations. Use [`TracedValue::deep_clone`] for an independent copy.
#[derive(Clone)]
pub enum TracedValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(FunctionRef),
    /// A free identifier with no known binding. Carries the identifier itself.
    Unresolved(String),
    /// The scope a `this` expression resolved to while tracing.
    ScopeRef(ScopeId),
}

#[derive(Default)]
pub struct ObjectData {
    pub properties: IndexMap<String, TracedValue>,
    pub prototype: Option<ObjectRef>,
}

impl ObjectData {
    pub fn new() -> Self {
        ObjectData::default()
    }

    pub fn with_prototype(prototype: ObjectRef) -> Self {
        ObjectData {
            properties: IndexMap::new(),
            prototype: Some(prototype),
        }
    }

    /// Own property first, then along the prototype chain.
    pub fn lookup(&self, key: &str) -> Option<TracedValue> {
        if let Some(v) = self.properties.get(key) {
            return Some(v.clone());
        }
        let mut next = self.prototype.clone();
        while let Some(proto) = next {
            let proto = proto.borrow();
            if let Some(v) = proto.properties.get(key) {
                return Some(v.clone());
            }
            next = proto.prototype.clone();
        }
        None
    }
}

/// A callable closing over the environment it was defined in.
pub struct FunctionValue {
    pub data: Rc<FunctionData>,
    pub name: String,
    pub env: Rc<Environment>,
    /// `this` captured by arrow functions at creation time.
    pub lexical_this: Option<TracedValue>,
    pub properties: RefCell<IndexMap<String, TracedValue>>,
}

impl FunctionValue {
    pub fn new(
        data: Rc<FunctionData>,
        name: impl Into<String>,
        env: Rc<Environment>,
        lexical_this: Option<TracedValue>,
    ) -> Self {
        FunctionValue {
            data,
            name: name.into(),
            env,
            lexical_this,
            properties: RefCell::new(IndexMap::new()),
        }
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.data.params.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn get_own_property(&self, key: &str) -> Option<TracedValue> {
        self.properties.borrow().get(key).cloned()
    }

    pub fn set_property(&self, key: &str, value: TracedValue) {
        self.properties.borrow_mut().insert(key.to_string(), value);
    }

    /// The `prototype` object, created on first access and kept afterwards.
    pub fn prototype_object(&self) -> Option<ObjectRef> {
        let mut props = self.properties.borrow_mut();
        match props.get("prototype") {
            Some(TracedValue::Object(o)) => Some(o.clone()),
            Some(_) => None,
            None => {
                let proto = Rc::new(RefCell::new(ObjectData::new()));
                props.insert("prototype".to_string(), TracedValue::Object(proto.clone()));
                Some(proto)
            }
        }
    }
}

#[derive(Default)]
struct CloneMemo {
    arrays: HashMap<*const RefCell<Vec<TracedValue>>, ArrayRef>,
    objects: HashMap<*const RefCell<ObjectData>, ObjectRef>,
}

impl TracedValue {
    pub fn new_array(items: Vec<TracedValue>) -> Self {
        TracedValue::Array(Rc::new(RefCell::new(items)))
    }

    pub fn new_object(properties: IndexMap<String, TracedValue>) -> Self {
        TracedValue::Object(Rc::new(RefCell::new(ObjectData {
            properties,
            prototype: None,
        })))
    }

    pub fn string(s: impl Into<String>) -> Self {
        TracedValue::String(s.into())
    }

    /// Name under which the built-in registry files methods for this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            TracedValue::Undefined => "undefined",
            TracedValue::Null => "null",
            TracedValue::Boolean(_) => "Boolean",
            TracedValue::Number(_) => "Number",
            TracedValue::String(_) => "String",
            TracedValue::Array(_) => "Array",
            TracedValue::Object(_) => "Object",
            TracedValue::Function(_) => "Function",
            TracedValue::Unresolved(_) => "Unresolved",
            TracedValue::ScopeRef(_) => "Scope",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, TracedValue::Undefined | TracedValue::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, TracedValue::Function(_))
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            TracedValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TracedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            TracedValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True when both values are the same heap value (or equal primitives).
    pub fn same_identity(&self, other: &TracedValue) -> bool {
        match (self, other) {
            (TracedValue::Array(a), TracedValue::Array(b)) => Rc::ptr_eq(a, b),
            (TracedValue::Object(a), TracedValue::Object(b)) => Rc::ptr_eq(a, b),
            (TracedValue::Function(a), TracedValue::Function(b)) => Rc::ptr_eq(a, b),
            (TracedValue::Array(_), _)
            | (TracedValue::Object(_), _)
            | (TracedValue::Function(_), _) => false,
            _ => self == other,
        }
    }

    /// Copies arrays and objects recursively. Aliasing inside the copied graph
    /// is preserved; functions and prototypes stay shared.
    pub fn deep_clone(&self) -> TracedValue {
        self.deep_clone_with(&mut CloneMemo::default())
    }

    fn deep_clone_with(&self, memo: &mut CloneMemo) -> TracedValue {
        match self {
            TracedValue::Array(a) => {
                if let Some(copy) = memo.arrays.get(&Rc::as_ptr(a)) {
                    return TracedValue::Array(copy.clone());
                }
                let copy = Rc::new(RefCell::new(Vec::new()));
                memo.arrays.insert(Rc::as_ptr(a), copy.clone());
                let items: Vec<TracedValue> =
                    a.borrow().iter().map(|v| v.deep_clone_with(memo)).collect();
                *copy.borrow_mut() = items;
                TracedValue::Array(copy)
            }
            TracedValue::Object(o) => {
                if let Some(copy) = memo.objects.get(&Rc::as_ptr(o)) {
                    return TracedValue::Object(copy.clone());
                }
                let copy = Rc::new(RefCell::new(ObjectData::new()));
                memo.objects.insert(Rc::as_ptr(o), copy.clone());
                let (properties, prototype) = {
                    let source = o.borrow();
                    let properties: IndexMap<String, TracedValue> = source
                        .properties
                        .iter()
                        .map(|(k, v)| (k.clone(), v.deep_clone_with(memo)))
                        .collect();
                    (properties, source.prototype.clone())
                };
                {
                    let mut target = copy.borrow_mut();
                    target.properties = properties;
                    target.prototype = prototype;
                }
                TracedValue::Object(copy)
            }
            other => other.clone(),
        }
    }

    fn deep_eq(&self, other: &TracedValue, depth: usize) -> bool {
        if depth > MAX_RENDER_DEPTH {
            return self.same_identity(other);
        }
        match (self, other) {
            (TracedValue::Undefined, TracedValue::Undefined) => true,
            (TracedValue::Null, TracedValue::Null) => true,
            (TracedValue::Boolean(a), TracedValue::Boolean(b)) => a == b,
            (TracedValue::Number(a), TracedValue::Number(b)) => a == b,
            (TracedValue::String(a), TracedValue::String(b)) => a == b,
            (TracedValue::Unresolved(a), TracedValue::Unresolved(b)) => a == b,
            (TracedValue::ScopeRef(a), TracedValue::ScopeRef(b)) => a == b,
            (TracedValue::Function(a), TracedValue::Function(b)) => Rc::ptr_eq(a, b),
            (TracedValue::Array(a), TracedValue::Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.deep_eq(y, depth + 1))
            }
            (TracedValue::Object(a), TracedValue::Object(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.properties.len() == b.properties.len()
                    && a.properties.iter().all(|(k, v)| match b.properties.get(k) {
                        Some(w) => v.deep_eq(w, depth + 1),
                        None => false,
                    })
            }
            _ => false,
        }
    }

    fn render(&self, f: &mut Formatter<'_>, depth: usize, nested: bool) -> fmt::Result {
        if depth > MAX_RENDER_DEPTH {
            return write!(f, "[Circular]");
        }
        match self {
            TracedValue::Undefined => write!(f, "undefined"),
            TracedValue::Null => write!(f, "null"),
            TracedValue::Boolean(b) => write!(f, "{}", b),
            TracedValue::Number(n) => write!(f, "{}", number_to_string(*n)),
            TracedValue::String(s) => {
                if nested {
                    write!(f, "'{}'", s)
                } else {
                    write!(f, "{}", s)
                }
            }
            TracedValue::Array(a) => {
                let items = a.borrow();
                if items.is_empty() {
                    return write!(f, "[]");
                }
                write!(f, "[ ")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    item.render(f, depth + 1, true)?;
                }
                write!(f, " ]")
            }
            TracedValue::Object(o) => {
                let o = o.borrow();
                if o.properties.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (idx, (k, v)) in o.properties.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", k)?;
                    v.render(f, depth + 1, true)?;
                }
                write!(f, " }}")
            }
            TracedValue::Function(func) => write!(f, "[Function] {}", func.name),
            TracedValue::Unresolved(name) => write!(f, "{}", name),
            TracedValue::ScopeRef(id) => write!(f, "[Scope] #{}", id.0),
        }
    }
}

impl PartialEq for TracedValue {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other, 0)
    }
}

impl Display for TracedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.render(f, 0, false)
    }
}

impl fmt::Debug for TracedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TracedValue::String(s) => write!(f, "{:?}", s),
            TracedValue::Unresolved(n) => write!(f, "Unresolved({})", n),
            _ => self.render(f, 0, true),
        }
    }
}

impl From<f64> for TracedValue {
    fn from(n: f64) -> Self {
        TracedValue::Number(n)
    }
}

impl From<i32> for TracedValue {
    fn from(n: i32) -> Self {
        TracedValue::Number(n as f64)
    }
}

impl From<bool> for TracedValue {
    fn from(b: bool) -> Self {
        TracedValue::Boolean(b)
    }
}

impl From<&str> for TracedValue {
    fn from(s: &str) -> Self {
        TracedValue::String(s.to_string())
    }
}

impl From<String> for TracedValue {
    fn from(s: String) -> Self {
        TracedValue::String(s)
    }
}

impl From<Vec<TracedValue>> for TracedValue {
    fn from(items: Vec<TracedValue>) -> Self {
        TracedValue::new_array(items)
    }
}

struct DepthLimited<'a>(&'a TracedValue, usize);

impl Serialize for DepthLimited<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let DepthLimited(value, depth) = *self;
        if depth > MAX_RENDER_DEPTH {
            return serializer.serialize_str("[Circular]");
        }
        match value {
            TracedValue::Undefined | TracedValue::Null => serializer.serialize_unit(),
            TracedValue::Boolean(b) => serializer.serialize_bool(*b),
            TracedValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                    serializer.serialize_i64(*n as i64)
                } else if n.is_finite() {
                    serializer.serialize_f64(*n)
                } else {
                    serializer.serialize_str(&number_to_string(*n))
                }
            }
            TracedValue::String(s) => serializer.serialize_str(s),
            TracedValue::Array(a) => {
                let items = a.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&DepthLimited(item, depth + 1))?;
                }
                seq.end()
            }
            TracedValue::Object(o) => {
                let o = o.borrow();
                let mut map = serializer.serialize_map(Some(o.properties.len()))?;
                for (k, v) in o.properties.iter() {
                    map.serialize_entry(k, &DepthLimited(v, depth + 1))?;
                }
                map.end()
            }
            TracedValue::Function(func) => {
                serializer.serialize_str(&format!("[Function] {}", func.name))
            }
            TracedValue::Unresolved(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("unresolved", name)?;
                map.end()
            }
            TracedValue::ScopeRef(id) => serializer.serialize_str(&format!("[Scope] #{}", id.0)),
        }
    }
}

impl Serialize for TracedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DepthLimited(self, 0).serialize(serializer)
    }
}

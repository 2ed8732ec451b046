//! Registry of built-in objects, looked up by type name at call time.

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use super::types::{BuiltInObject, NativeFn};
use crate::runner::ds::value::TracedValue;
use crate::runner::std_lib::register_core_builtins;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
    #[error("Method not found: {0}.{1}")]
    MethodNotFound(String, String),
}

/// Manages all built-in objects and their methods.
pub struct BuiltInRegistry {
    objects: HashMap<String, BuiltInObject>,
}

impl BuiltInRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BuiltInRegistry {
            objects: HashMap::new(),
        }
    }

    /// Create a registry with the core built-ins (Object, Function, Array,
    /// String, Number, Boolean, Math, JSON).
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        register_core_builtins(&mut registry);
        registry
    }

    pub fn register_object(&mut self, obj: BuiltInObject) {
        self.objects.insert(obj.name.clone(), obj);
    }

    pub fn get_object(&self, name: &str) -> Option<&BuiltInObject> {
        self.objects.get(name)
    }

    pub fn get_object_mut(&mut self, name: &str) -> Option<&mut BuiltInObject> {
        self.objects.get_mut(name)
    }

    /// Method of `object`, falling back along its prototype names.
    pub fn find_method(&self, object: &str, method: &str) -> Option<NativeFn> {
        let mut current = self.objects.get(object);
        while let Some(obj) = current {
            if let Some(f) = obj.methods.get(method) {
                return Some(*f);
            }
            current = obj
                .prototype
                .as_deref()
                .filter(|p| *p != obj.name)
                .and_then(|p| self.objects.get(p));
        }
        None
    }

    pub fn get_static_method(&self, object: &str, method: &str) -> Option<NativeFn> {
        self.objects
            .get(object)
            .and_then(|obj| obj.static_methods.get(method).copied())
    }

    pub fn get_property(&self, object: &str, property: &str) -> Option<&TracedValue> {
        self.objects
            .get(object)
            .and_then(|obj| obj.properties.get(property))
    }

    pub fn get_constructor(&self, object: &str) -> Option<NativeFn> {
        self.objects.get(object).and_then(|obj| obj.constructor)
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn has_method(&self, object: &str, method: &str) -> bool {
        self.find_method(object, method).is_some()
    }

    /// Replace (or add) a method on an existing object.
    pub fn override_method(
        &mut self,
        object: &str,
        method: &str,
        func: NativeFn,
    ) -> Result<(), RegistryError> {
        let obj = self
            .objects
            .get_mut(object)
            .ok_or_else(|| RegistryError::ObjectNotFound(object.to_string()))?;
        obj.methods.insert(method.to_string(), func);
        Ok(())
    }

    /// Makes `alias` call the same implementation as `method` on `object`.
    pub fn alias_method(
        &mut self,
        object: &str,
        alias: &str,
        method: &str,
    ) -> Result<(), RegistryError> {
        if !self.has_object(object) {
            return Err(RegistryError::ObjectNotFound(object.to_string()));
        }
        let func = self
            .find_method(object, method)
            .ok_or_else(|| RegistryError::MethodNotFound(object.to_string(), method.to_string()))?;
        debug!("Aliasing {}.{} to {}", object, alias, method);
        self.override_method(object, alias, func)
    }

    pub fn object_names(&self) -> Vec<&String> {
        self.objects.keys().collect()
    }
}

impl Default for BuiltInRegistry {
    fn default() -> Self {
        Self::with_core()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_fall_back_to_object() {
        let registry = BuiltInRegistry::with_core();
        assert!(registry.has_method("Array", "map"));
        assert!(registry.has_method("Array", "hasOwnProperty"));
        assert!(!registry.has_method("Array", "flyAway"));
    }

    #[test]
    fn alias_points_to_existing_method() {
        let mut registry = BuiltInRegistry::with_core();
        registry.alias_method("Array", "collect", "map").unwrap();
        assert!(registry.has_method("Array", "collect"));
        assert_eq!(
            registry.alias_method("Array", "x", "nope"),
            Err(RegistryError::MethodNotFound(
                "Array".to_string(),
                "nope".to_string()
            ))
        );
        assert_eq!(
            registry.alias_method("Nope", "x", "map"),
            Err(RegistryError::ObjectNotFound("Nope".to_string()))
        );
    }
}

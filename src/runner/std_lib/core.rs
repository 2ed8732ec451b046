//! Core built-ins registration.

use crate::runner::builtins::registry::BuiltInRegistry;

use super::array;
use super::boolean;
use super::function;
use super::json;
use super::math;
use super::number;
use super::object;
use super::string;

/// Register all core built-in objects with the registry.
pub fn register_core_builtins(registry: &mut BuiltInRegistry) {
    // Object first: every other type falls back to it.
    object::register(registry);
    function::register(registry);
    array::register(registry);
    string::register(registry);
    number::register(registry);
    boolean::register(registry);
    math::register(registry);
    json::register(registry);
}

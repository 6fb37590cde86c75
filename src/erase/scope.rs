//! Per-method type binding map
//!
//! Tracks the pre-erasure declared type of every local variable seen so far
//! in the innermost enclosing method. Nested blocks inside one method share
//! a single flat map; only method declarations open a fresh scope.

use crate::ast::TypeRef;
use std::collections::HashMap;

/// Mapping from variable name to its originally declared type.
///
/// Owned by one [`TypeEraser`](super::TypeEraser) instance, never shared, so
/// concurrent transformations cannot contaminate each other's bindings.
#[derive(Debug, Default)]
pub struct TypeBindings {
    map: HashMap<String, TypeRef>,
}

impl TypeBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Record a binding; a later declaration of the same name wins.
    pub fn record(&mut self, name: impl Into<String>, original_type: TypeRef) {
        self.map.insert(name.into(), original_type);
    }

    /// Look up the original type bound to `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&TypeRef> {
        self.map.get(name)
    }

    /// Enter a method scope: take the current map out, leaving an empty one.
    /// The returned snapshot must be handed back to [`leave_method`].
    ///
    /// [`leave_method`]: TypeBindings::leave_method
    pub fn enter_method(&mut self) -> HashMap<String, TypeRef> {
        std::mem::take(&mut self.map)
    }

    /// Leave a method scope: restore the enclosing map verbatim, discarding
    /// everything bound inside the method.
    pub fn leave_method(&mut self, saved: HashMap<String, TypeRef>) {
        self.map = saved;
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Location, Span, TypeRef};

    fn type_ref(name: &str) -> TypeRef {
        let location = Location::new(1, 1, 0);
        TypeRef {
            name: name.to_string(),
            type_args: None,
            array_dims: 0,
            span: Span::new(location, location),
        }
    }

    #[test]
    fn test_record_and_lookup() {
        let mut bindings = TypeBindings::new();
        bindings.record("x", type_ref("String"));
        assert_eq!(bindings.lookup("x").map(|t| t.name.as_str()), Some("String"));
        assert!(bindings.lookup("y").is_none());
    }

    #[test]
    fn test_last_declaration_wins() {
        let mut bindings = TypeBindings::new();
        bindings.record("x", type_ref("String"));
        bindings.record("x", type_ref("Integer"));
        assert_eq!(
            bindings.lookup("x").map(|t| t.name.as_str()),
            Some("Integer")
        );
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_method_scope_isolation() {
        let mut bindings = TypeBindings::new();
        bindings.record("outer", type_ref("A"));

        let saved = bindings.enter_method();
        assert!(bindings.is_empty());
        bindings.record("inner", type_ref("B"));
        assert!(bindings.lookup("outer").is_none());

        bindings.leave_method(saved);
        assert_eq!(bindings.lookup("outer").map(|t| t.name.as_str()), Some("A"));
        assert!(bindings.lookup("inner").is_none());
    }
}

//! Shared constants for the erasure pipeline.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// The universal reference supertype every erased declaration falls back to.
pub const DEFAULT_TOP_TYPE: &str = "Object";

/// Names of the Java primitive types.
pub static PRIMITIVE_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "boolean", "byte", "short", "int", "long", "char", "float", "double",
    ]
    .into_iter()
    .collect()
});

/// Check whether a type name denotes a primitive type
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(name)
}

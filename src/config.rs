use crate::consts;

/// Configuration for the erasure pipeline.
///
/// The only tunable today is the name of the universal top type that erased
/// declarations fall back to; `Object` matches Java semantics.
#[derive(Debug, Clone)]
pub struct Config {
    pub top_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_type: consts::DEFAULT_TOP_TYPE.to_string(),
        }
    }
}

impl Config {
    /// Override the top type name used for erased declarations
    pub fn with_top_type(mut self, name: impl Into<String>) -> Self {
        self.top_type = name.into();
        self
    }
}

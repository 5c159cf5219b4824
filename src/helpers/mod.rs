//! Helper functions for templates
//!
//! Helpers are registered by name and called with JSON arguments, the same
//! shape template contexts hand them.

pub mod excerpt;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

pub use excerpt::excerpt;

/// Errors raised while calling a helper
#[derive(Debug, Error)]
pub enum HelperError {
    #[error("unknown helper: {0}")]
    UnknownHelper(String),

    #[error("invalid argument to {helper}: {message}")]
    InvalidArgument { helper: String, message: String },
}

impl HelperError {
    pub(crate) fn invalid(helper: &str, message: &str) -> Self {
        Self::InvalidArgument {
            helper: helper.to_string(),
            message: message.to_string(),
        }
    }
}

/// A callable template helper
pub type HelperFn = Box<dyn Fn(&[Value]) -> Result<Value, HelperError> + Send + Sync>;

/// Named helpers available to templates
pub struct HelperRegistry {
    helpers: IndexMap<String, HelperFn>,
}

impl HelperRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            helpers: IndexMap::new(),
        }
    }

    /// Create a registry with the built-in helpers
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(excerpt::NAME, excerpt::helper);
        registry
    }

    /// Register a helper, replacing any helper with the same name
    pub fn register<F>(&mut self, name: &str, helper: F)
    where
        F: Fn(&[Value]) -> Result<Value, HelperError> + Send + Sync + 'static,
    {
        if self
            .helpers
            .insert(name.to_string(), Box::new(helper))
            .is_some()
        {
            tracing::debug!("Replaced helper {}", name);
        }
    }

    /// Call a helper by name
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, HelperError> {
        let helper = self
            .helpers
            .get(name)
            .ok_or_else(|| HelperError::UnknownHelper(name.to_string()))?;
        helper(args)
    }
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_excerpt_registered() {
        let registry = HelperRegistry::new();
        let out = registry
            .call("excerpt", &[json!({"content": "a\nb\nc"})])
            .unwrap();
        assert_eq!(out, json!("a\nb"));
    }

    #[test]
    fn test_unknown_helper() {
        let registry = HelperRegistry::empty();
        let err = registry.call("excerpt", &[]).unwrap_err();
        assert!(matches!(err, HelperError::UnknownHelper(name) if name == "excerpt"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = HelperRegistry::new();
        registry.register("upper", |args| {
            let s = args.first().and_then(Value::as_str).unwrap_or_default();
            Ok(json!(s.to_uppercase()))
        });
        registry.register("excerpt", |_| Ok(json!("fixed")));

        assert_eq!(registry.call("upper", &[json!("hi")]).unwrap(), json!("HI"));
        assert_eq!(registry.call("excerpt", &[]).unwrap(), json!("fixed"));
    }
}

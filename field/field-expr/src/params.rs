//! Named parameter bindings for expression evaluation.

use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Named scalar values bound to [`Expr::Param`](crate::Expr::Param) leaves
/// at evaluation time.
///
/// # Example
///
/// ```
/// use field_expr::FieldParams;
///
/// let params = FieldParams::new()
///     .with_param("time", 0.5)
///     .with_param("amplitude", 0.4);
///
/// assert_eq!(params.get("time"), Some(0.5));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldParams {
    values: HashMap<String, f64>,
}

impl FieldParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a parameter, chaining style.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Bind a parameter in place, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Whether a parameter with this name is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameters are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut params = FieldParams::new();
        assert!(params.is_empty());

        params.insert("scale", 2.0);
        assert_eq!(params.get("scale"), Some(2.0));
        assert_eq!(params.len(), 1);
        assert!(params.contains("scale"));
    }

    #[test]
    fn with_param_chains() {
        let params = FieldParams::new().with_param("a", 1.0).with_param("b", 2.0);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("b"), Some(2.0));
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut params = FieldParams::new().with_param("t", 0.0);
        params.insert("t", 1.0);
        assert_eq!(params.get("t"), Some(1.0));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn missing_lookup_is_none() {
        let params = FieldParams::new();
        assert_eq!(params.get("nope"), None);
        assert!(!params.contains("nope"));
    }
}

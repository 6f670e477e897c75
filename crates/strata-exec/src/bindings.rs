//! Variable bindings.
//!
//! Operators read their vector inputs from, and write their outputs to, a
//! name to `ResultVector` map owned by the execution context.

use std::collections::HashMap;

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::RowId;

use crate::result::ResultVector;

/// Named intermediate results of a session.
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    vars: HashMap<String, ResultVector>,
}

impl Bindings {
    /// Creates an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to `name`, returning the value it replaced.
    pub fn bind(&mut self, name: impl Into<String>, value: ResultVector) -> Option<ResultVector> {
        self.vars.insert(name.into(), value)
    }

    /// Looks up a binding.
    pub fn get(&self, name: &str) -> StrataResult<&ResultVector> {
        self.vars.get(name).ok_or_else(|| StrataError::VariableNotFound {
            name: name.to_string(),
        })
    }

    /// Removes a binding.
    pub fn remove(&mut self, name: &str) -> Option<ResultVector> {
        self.vars.remove(name)
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Drops every binding.
    pub fn clear(&mut self) {
        self.vars.clear();
    }

    /// Looks up a position vector.
    pub fn positions(&self, name: &str) -> StrataResult<&[RowId]> {
        let value = self.get(name)?;
        value.as_positions().ok_or(StrataError::TypeMismatch {
            expected: "positions",
            actual: value.type_name(),
        })
    }

    /// Looks up a value vector.
    pub fn values(&self, name: &str) -> StrataResult<&[i32]> {
        let value = self.get(name)?;
        value.as_values().ok_or(StrataError::TypeMismatch {
            expected: "values",
            actual: value.type_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::error::ErrorCode;

    #[test]
    fn test_bind_replaces() {
        let mut b = Bindings::new();
        assert!(b.bind("x", ResultVector::Int(1)).is_none());
        let old = b.bind("x", ResultVector::Int(2));
        assert_eq!(old, Some(ResultVector::Int(1)));
        assert_eq!(b.get("x").unwrap(), &ResultVector::Int(2));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_typed_lookup() {
        let mut b = Bindings::new();
        b.bind("p", ResultVector::Positions(vec![0, 2]));
        assert_eq!(b.positions("p").unwrap(), &[0, 2]);

        let err = b.values("p").unwrap_err();
        assert_eq!(err.code(), ErrorCode::TypeMismatch);

        let err = b.values("missing").unwrap_err();
        assert_eq!(err.code(), ErrorCode::VariableNotFound);
    }
}

//! Error handling and result types for skyline tree construction.
//!
//! Bulk loading and skyline traversal are deterministic batch computations, so
//! errors fall into three buckets: bad configuration (rejected before any tree
//! work), bad input points (rejected for the offending call only), and
//! structural invariant violations reported by the validation helpers.

use crate::types::NodeId;

/// Error type for skyline tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkylineError {
    /// A construction parameter is out of range.
    InvalidConfig(String),
    /// An input point does not have the configured dimensionality.
    DimensionMismatch(String),
    /// The tree structure broke one of its invariants.
    InvariantViolation(String),
}

impl SkylineError {
    /// Create an InvalidConfig error naming the parameter and its value.
    pub fn invalid_config(parameter: &str, value: usize, requirement: &str) -> Self {
        Self::InvalidConfig(format!(
            "{} = {} is invalid ({})",
            parameter, value, requirement
        ))
    }

    /// Create a DimensionMismatch error for the point at `index`.
    pub fn dimension_mismatch(index: usize, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch(format!(
            "point {} has {} coordinates, expected {}",
            index, found, expected
        ))
    }

    /// Create an InvariantViolation error for a node.
    pub fn invariant_violation(node: NodeId, position: usize, details: &str) -> Self {
        Self::InvariantViolation(format!(
            "node {} (position {}): {}",
            node, position, details
        ))
    }

    /// Check if this error is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// Check if this error was caused by the input points
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::DimensionMismatch(_))
    }
}

impl std::fmt::Display for SkylineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkylineError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SkylineError::DimensionMismatch(msg) => write!(f, "Dimension mismatch: {}", msg),
            SkylineError::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
        }
    }
}

impl std::error::Error for SkylineError {}

/// Internal result type for tree operations
pub(crate) type TreeResult<T> = Result<T, SkylineError>;

/// Result type for tree construction and validation
pub type BuildResult<T> = Result<T, SkylineError>;

/// Result extension trait for attaching context to errors
pub trait SkylineResultExt<T> {
    /// Prefix the error message with `context`
    fn with_context(self, context: &str) -> BuildResult<T>;
}

impl<T> SkylineResultExt<T> for Result<T, SkylineError> {
    fn with_context(self, context: &str) -> BuildResult<T> {
        self.map_err(|e| match e {
            SkylineError::InvalidConfig(msg) => {
                SkylineError::InvalidConfig(format!("{}: {}", context, msg))
            }
            SkylineError::DimensionMismatch(msg) => {
                SkylineError::DimensionMismatch(format!("{}: {}", context, msg))
            }
            SkylineError::InvariantViolation(msg) => {
                SkylineError::InvariantViolation(format!("{}: {}", context, msg))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_names_parameter_and_value() {
        let err = SkylineError::invalid_config("fanout", 3, "must be at least 4");
        assert!(err.is_config_error());
        assert!(!err.is_input_error());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: fanout = 3 is invalid (must be at least 4)"
        );
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = SkylineError::dimension_mismatch(7, 3, 2);
        assert!(err.is_input_error());
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: point 7 has 2 coordinates, expected 3"
        );
    }

    #[test]
    fn test_with_context_keeps_variant() {
        let result: BuildResult<()> = Err(SkylineError::invariant_violation(4, 1, "empty leaf"));
        let err = result.with_context("validate").unwrap_err();
        assert_eq!(
            err,
            SkylineError::InvariantViolation("validate: node 4 (position 1): empty leaf".into())
        );
    }
}

//! # Error Types
//!
//! Domain-specific error types for recipecart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  recipecart-core errors (this file)                                    │
//! │  ├── CoreError        - Catalog construction / domain errors           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  recipecart-engine errors (separate crate)                             │
//! │  ├── ServiceError     - External collaborator failures                 │
//! │  ├── ResolutionError  - No store location could be resolved (fatal)    │
//! │  └── EngineError      - Config / run level failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → CLI exit code       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per-ingredient search misses are NOT errors. They are recorded as
//! `MatchResult::Unmatched` and the run continues.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A recipe catalog was built with a default name it does not contain.
    #[error("Recipe not found in catalog: {0}")]
    RecipeNotFound(String),

    /// A recipe catalog must hold at least one recipe.
    #[error("Recipe catalog is empty")]
    EmptyCatalog,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before any collaborator is called.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed postal code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::RecipeNotFound("Pancakes".to_string());
        assert_eq!(err.to_string(), "Recipe not found in catalog: Pancakes");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "recipe query".to_string(),
        };
        assert_eq!(err.to_string(), "recipe query is required");

        let err = ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: 50,
        };
        assert_eq!(err.to_string(), "limit must be between 1 and 50");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

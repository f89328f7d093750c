//! # Validation Module
//!
//! Input validation for RecipeCart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI / Config                                                 │
//! │  ├── Argument parsing, TOML deserialization                            │
//! │  └── EngineConfig::validate() calls into THIS MODULE                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Orchestrator                                                 │
//! │  ├── Postal code format checked by the location resolver              │
//! │  └── Cart request checked before submission                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: External services                                            │
//! │  └── Catalog / cart APIs apply their own rules                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use recipecart_core::validation::{validate_postal_code, validate_search_limit};
//!
//! validate_postal_code("45202").unwrap();
//! validate_search_limit(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::CartRequest;
use crate::{MAX_CONCURRENCY, MAX_PACKAGE_COUNT, MAX_QUERY_LENGTH, MAX_SEARCH_LIMIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a recipe query.
///
/// ## Rules
/// - Can be empty (resolves to the default recipe)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_recipe_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "recipe query".to_string(),
            max: MAX_QUERY_LENGTH,
        });
    }

    Ok(query.to_string())
}

/// Validates a US postal code: `12345` or `12345-6789`.
pub fn validate_postal_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "postal code".to_string(),
        });
    }

    let (zip, plus4) = match code.split_once('-') {
        Some((zip, plus4)) => (zip, Some(plus4)),
        None => (code, None),
    };

    let digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
    let valid = digits(zip, 5) && plus4.map_or(true, |p| digits(p, 4));

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "postal code".to_string(),
            reason: "expected 5 digits, optionally followed by -NNNN".to_string(),
        });
    }

    Ok(code.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a per-term catalog search limit (1..=50).
pub fn validate_search_limit(limit: usize) -> ValidationResult<()> {
    if limit == 0 || limit > MAX_SEARCH_LIMIT {
        return Err(ValidationError::OutOfRange {
            field: "search limit".to_string(),
            min: 1,
            max: MAX_SEARCH_LIMIT as i64,
        });
    }

    Ok(())
}

/// Validates the number of concurrent ingredient searches (1..=16).
pub fn validate_max_concurrency(value: usize) -> ValidationResult<()> {
    if value == 0 || value > MAX_CONCURRENCY {
        return Err(ValidationError::OutOfRange {
            field: "max concurrency".to_string(),
            min: 1,
            max: MAX_CONCURRENCY as i64,
        });
    }

    Ok(())
}

/// Validates a package count before it is sent to the cart.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_PACKAGE_COUNT (999)
///
/// ## Cart Submission
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Orchestrator: AGGREGATED                                              │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_cart_request() ──► validate_package_count() per line         │
/// │       │                                                                 │
/// │       ├── qty == 0?   → Error: "quantity must be positive"             │
/// │       ├── qty > 999?  → Error: "quantity must be between 1 and 999"    │
/// │       │                                                                 │
/// │       └── OK → CartService::bulk_add                                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_package_count(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_PACKAGE_COUNT {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_PACKAGE_COUNT as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates every line of a cart request.
pub fn validate_cart_request(request: &CartRequest) -> ValidationResult<()> {
    for line in &request.items {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product id".to_string(),
            });
        }
        validate_package_count(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CartLine, Modality};

    #[test]
    fn test_validate_recipe_query() {
        assert_eq!(validate_recipe_query("  Apple Pie ").unwrap(), "Apple Pie");
        assert_eq!(validate_recipe_query("").unwrap(), "");
        assert!(validate_recipe_query(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_postal_code() {
        assert!(validate_postal_code("45202").is_ok());
        assert!(validate_postal_code("45202-1234").is_ok());

        assert!(validate_postal_code("").is_err());
        assert!(validate_postal_code("4520").is_err());
        assert!(validate_postal_code("4520a").is_err());
        assert!(validate_postal_code("45202-12").is_err());
    }

    #[test]
    fn test_validate_search_limit() {
        assert!(validate_search_limit(1).is_ok());
        assert!(validate_search_limit(50).is_ok());
        assert!(validate_search_limit(0).is_err());
        assert!(validate_search_limit(51).is_err());
    }

    #[test]
    fn test_validate_max_concurrency() {
        assert!(validate_max_concurrency(4).is_ok());
        assert!(validate_max_concurrency(0).is_err());
        assert!(validate_max_concurrency(17).is_err());
    }

    #[test]
    fn test_validate_package_count() {
        assert!(validate_package_count(1).is_ok());
        assert!(validate_package_count(999).is_ok());

        assert!(validate_package_count(0).is_err());
        assert!(validate_package_count(1000).is_err());
    }

    #[test]
    fn test_validate_cart_request() {
        let line = |id: &str, quantity| CartLine {
            product_id: id.to_string(),
            quantity,
            modality: Modality::Pickup,
        };

        let ok = CartRequest {
            items: vec![line("a", 1), line("b", 999)],
        };
        assert!(validate_cart_request(&ok).is_ok());

        let too_many = CartRequest {
            items: vec![line("a", 1), line("b", 1000)],
        };
        assert!(matches!(
            validate_cart_request(&too_many),
            Err(ValidationError::OutOfRange { .. })
        ));

        let no_id = CartRequest {
            items: vec![line(" ", 1)],
        };
        assert!(validate_cart_request(&no_id).is_err());

        assert!(validate_cart_request(&CartRequest::default()).is_ok());
    }
}

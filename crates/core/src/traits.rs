//! Core traits for Formwright
//!
//! The composed structures (resources, layout trees, action sets) all check
//! their own invariants through [`Validatable`].

use crate::error::EngineResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use formwright_core::{Validatable, EngineResult, EngineError};
///
/// struct Slug(String);
///
/// impl Validatable for Slug {
///     fn validate(&self) -> EngineResult<()> {
///         if self.0.is_empty() {
///             return Err(EngineError::validation("Slug cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or an `EngineError` describing the problem.
    fn validate(&self) -> EngineResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Named Trait
// ============================================================================

/// Trait for types addressed by a unique name within their collection
pub trait Named {
    /// Get the name
    fn name(&self) -> &str;

    /// Check if the name matches exactly
    fn name_matches(&self, other: &str) -> bool {
        self.name() == other
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct TestValidatable {
        valid: bool,
    }

    impl Validatable for TestValidatable {
        fn validate(&self) -> EngineResult<()> {
            if self.valid {
                Ok(())
            } else {
                Err(crate::error::EngineError::validation("Invalid state"))
            }
        }
    }

    #[test]
    fn test_validatable_trait() {
        let valid = TestValidatable { valid: true };
        assert!(valid.is_valid());
        assert!(valid.validation_errors().is_empty());

        let invalid = TestValidatable { valid: false };
        assert!(!invalid.is_valid());
        assert_eq!(
            invalid.validation_errors(),
            vec!["Validation error: Invalid state".to_string()]
        );
    }

    struct Tagged(&'static str);

    impl Named for Tagged {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_named_trait() {
        let t = Tagged("product");
        assert!(t.name_matches("product"));
        assert!(!t.name_matches("Product"));
    }
}

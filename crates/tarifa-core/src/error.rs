//! # Error Types
//!
//! Domain-specific error types for tarifa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tarifa-core errors (this file)                                         │
//! │  ├── CoreError        - Pricing/domain rule violations                  │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  tarifa-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  admin-api errors (in app)                                              │
//! │  └── ApiError         - What the admin UI sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, lot id, state)
//! 3. Errors are enum variants, never String
//! 4. Validation is rejected before any state change

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core pricing errors.
///
/// These errors represent business rule violations or resolution failures.
/// They are caught at the API boundary and translated into the error
/// taxonomy the admin UI understands (validation / not-found / conflict /
/// no-price-available).
#[derive(Debug, Error)]
pub enum CoreError {
    /// The resolver cannot produce a price for an item.
    ///
    /// ## When This Occurs
    /// - No explicit sale price on the item
    /// - No active price-list override for the item
    /// - No active markup rule for the item's category
    ///
    /// The dashboard counts this as a non-fatal condition; a direct price
    /// lookup surfaces it as a hard error.
    #[error("no price available for item {item_id} (category {category})")]
    NoPriceAvailable { item_id: String, category: String },

    /// A repricing lot is not in a state that allows the requested
    /// transition.
    ///
    /// ## When This Occurs
    /// - `apply` on a lot that is already applied or reverted
    /// - `revert` on a lot that was never applied, or already reverted
    /// - `simulate` on an applied/reverted lot
    #[error("lot {lot_id} is {current_state}, cannot {operation}")]
    InvalidLotState {
        lot_id: String,
        current_state: String,
        operation: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when operator input does not meet requirements and are
/// rejected before any state change, carrying the offending field.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: &'static str, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    /// Invalid format or inconsistent value (e.g. validity window with
    /// valid_from after valid_to).
    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Returns the offending field name, for structured API responses.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::Invalid { field, .. } => field,
        }
    }
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
        let err = CoreError::NoPriceAvailable {
            item_id: "itm-1".to_string(),
            category: "FRENOS".to_string(),
        };
        assert_eq!(err.to_string(), "no price available for item itm-1 (category FRENOS)");

        let err = CoreError::InvalidLotState {
            lot_id: "lot-1".to_string(),
            current_state: "applied".to_string(),
            operation: "apply",
        };
        assert_eq!(err.to_string(), "lot lot-1 is applied, cannot apply");
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::OutOfRange { field: "markup_percent", min: 0, max: 500 };
        assert_eq!(err.field(), "markup_percent");
        assert_eq!(err.to_string(), "markup_percent must be between 0 and 500");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required { field: "label" };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

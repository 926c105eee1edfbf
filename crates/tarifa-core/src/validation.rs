//! # Validation Module
//!
//! Business rule validation for pricing inputs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Admin UI                                                  │
//! │  ├── Basic format checks (empty, length)                            │
//! │  └── Immediate operator feedback                                    │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: admin-api handler (Rust)                                  │
//! │  ├── Type validation (deserialization)                              │
//! │  └── THIS MODULE: business rule validation                          │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL / CHECK constraints                                   │
//! │  └── Foreign key constraints                                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::lot::{Adjustment, AdjustmentType};
use crate::{MAX_DISCOUNT_BPS, MAX_LABEL_LEN, MAX_MARKUP_BPS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a human-readable name (price list, customer group).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 120 characters
pub fn validate_name(field: &'static str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field });
    }

    if name.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::TooLong { field, max: MAX_LABEL_LEN });
    }

    Ok(())
}

/// Validates a repricing lot label.
pub fn validate_lot_label(label: &str) -> ValidationResult<()> {
    validate_name("label", label)
}

// =============================================================================
// Percentage Validators
// =============================================================================

/// Validates a category markup in basis points.
///
/// ## Rules
/// - At most [`MAX_MARKUP_BPS`] (500%); anything higher is treated as a
///   data-entry mistake
pub fn validate_markup_bps(markup_bps: u32) -> ValidationResult<()> {
    if markup_bps > MAX_MARKUP_BPS {
        return Err(ValidationError::OutOfRange {
            field: "markup_bps",
            min: 0,
            max: MAX_MARKUP_BPS as i64,
        });
    }
    Ok(())
}

/// Validates a customer-group discount in basis points.
///
/// ## Rules
/// - At most [`MAX_DISCOUNT_BPS`] (100%); a deeper discount would price
///   below zero
pub fn validate_discount_bps(discount_bps: u32) -> ValidationResult<()> {
    if discount_bps > MAX_DISCOUNT_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount_bps",
            min: 0,
            max: MAX_DISCOUNT_BPS as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Validates a purchase cost or explicit sale price in cents.
pub fn validate_price_cents(field: &'static str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}

/// Validates a price-list override price in cents.
pub fn validate_override_cents(cents: i64) -> ValidationResult<()> {
    validate_price_cents("override_price_cents", cents)
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a price-list validity window: when both ends are set,
/// `valid_from` must not come after `valid_to`.
pub fn validate_validity_window(
    valid_from: Option<DateTime<Utc>>,
    valid_to: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    if let (Some(from), Some(to)) = (valid_from, valid_to) {
        if from > to {
            return Err(ValidationError::Invalid {
                field: "valid_from",
                reason: "valid_from is after valid_to".to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a lot adjustment.
///
/// ## Rules
/// - Percentage adjustments stay within ±[`MAX_MARKUP_BPS`]
/// - Fixed amounts have no bound besides i64; the engine clamps results
///   at zero anyway
pub fn validate_adjustment(adjustment: &Adjustment) -> ValidationResult<()> {
    if adjustment.kind == AdjustmentType::Percentage {
        let limit = MAX_MARKUP_BPS as i64;
        if adjustment.value < -limit || adjustment.value > limit {
            return Err(ValidationError::OutOfRange {
                field: "adjustment_value",
                min: -limit,
                max: limit,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rejects_empty_and_whitespace() {
        assert!(validate_name("name", "Taller norte").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
    }

    #[test]
    fn name_rejects_overlong() {
        let long = "x".repeat(MAX_LABEL_LEN + 1);
        match validate_name("name", &long) {
            Err(ValidationError::TooLong { field, max }) => {
                assert_eq!(field, "name");
                assert_eq!(max, MAX_LABEL_LEN);
            }
            other => panic!("expected TooLong, got {other:?}"),
        }
        assert!(validate_name("name", &"x".repeat(MAX_LABEL_LEN)).is_ok());
    }

    #[test]
    fn markup_bounds() {
        assert!(validate_markup_bps(0).is_ok());
        assert!(validate_markup_bps(MAX_MARKUP_BPS).is_ok());
        assert!(validate_markup_bps(MAX_MARKUP_BPS + 1).is_err());
    }

    #[test]
    fn discount_bounds() {
        assert!(validate_discount_bps(10_000).is_ok());
        assert!(validate_discount_bps(10_001).is_err());
    }

    #[test]
    fn prices_must_be_non_negative() {
        assert!(validate_price_cents("purchase_cost_cents", 0).is_ok());
        assert!(validate_price_cents("purchase_cost_cents", -1).is_err());
        assert!(validate_override_cents(1250).is_ok());
    }

    #[test]
    fn validity_window_ordering() {
        use chrono::TimeZone;
        let a = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        assert!(validate_validity_window(Some(a), Some(b)).is_ok());
        assert!(validate_validity_window(Some(b), Some(a)).is_err());
        assert!(validate_validity_window(None, Some(a)).is_ok());
        assert!(validate_validity_window(Some(a), None).is_ok());
        assert!(validate_validity_window(None, None).is_ok());
    }

    #[test]
    fn adjustment_percentage_bounds() {
        assert!(validate_adjustment(&Adjustment::percentage(50_000)).is_ok());
        assert!(validate_adjustment(&Adjustment::percentage(-50_000)).is_ok());
        assert!(validate_adjustment(&Adjustment::percentage(50_001)).is_err());
        assert!(validate_adjustment(&Adjustment::fixed_amount(i64::MAX)).is_ok());
    }
}

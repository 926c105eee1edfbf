//! # Repricing Lots
//!
//! Batch price adjustments with a strict lifecycle.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │   DRAFT ──simulate──▶ SIMULATED ──apply──▶ APPLIED ──revert──▶      │
//! │     │                    │                                REVERTED  │
//! │     └──────apply─────────┘                                          │
//! │                                                                     │
//! │   Simulation never mutates prices. Apply writes explicit sale       │
//! │   prices and snapshots every before/after pair; revert restores     │
//! │   the snapshotted before-prices byte for byte. Both are one-shot:   │
//! │   a second apply or revert is rejected as InvalidLotState.          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The adjustment arithmetic lives here so the storage layer applies
//! exactly what simulation previewed.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Category, Item};

// =============================================================================
// Adjustment
// =============================================================================

/// How a lot moves prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentType {
    /// Signed basis points applied multiplicatively: +1000 = +10%.
    Percentage,
    /// Signed cents added to the current price.
    FixedAmount,
}

impl AdjustmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Percentage => "PERCENTAGE",
            AdjustmentType::FixedAmount => "FIXED_AMOUNT",
        }
    }
}

impl std::str::FromStr for AdjustmentType {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERCENTAGE" => Ok(AdjustmentType::Percentage),
            "FIXED_AMOUNT" => Ok(AdjustmentType::FixedAmount),
            other => Err(crate::error::ValidationError::Invalid {
                field: "adjustment_type",
                reason: format!("unknown adjustment type '{other}'"),
            }),
        }
    }
}

/// A signed price adjustment.
///
/// `value` is basis points for [`AdjustmentType::Percentage`] and cents
/// for [`AdjustmentType::FixedAmount`]; negative values decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    #[serde(rename = "type")]
    pub kind: AdjustmentType,
    pub value: i64,
}

impl Adjustment {
    pub fn percentage(bps: i64) -> Self {
        Adjustment { kind: AdjustmentType::Percentage, value: bps }
    }

    pub fn fixed_amount(cents: i64) -> Self {
        Adjustment { kind: AdjustmentType::FixedAmount, value: cents }
    }

    /// Applies the adjustment to a price, clamping the result at zero.
    /// A price can never go negative, whatever the adjustment says.
    pub fn apply_to(&self, price: Money) -> Money {
        let adjusted = match self.kind {
            AdjustmentType::Percentage => price.apply_percentage_delta_bps(self.value),
            AdjustmentType::FixedAmount => price + Money::from_cents(self.value),
        };
        adjusted.clamp_non_negative()
    }
}

// =============================================================================
// Lot State
// =============================================================================

/// Lifecycle state of a repricing lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotState {
    Draft,
    Simulated,
    Applied,
    Reverted,
}

impl LotState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotState::Draft => "DRAFT",
            LotState::Simulated => "SIMULATED",
            LotState::Applied => "APPLIED",
            LotState::Reverted => "REVERTED",
        }
    }

    /// States from which `apply` is legal, for conditional UPDATEs.
    pub const APPLICABLE: [LotState; 2] = [LotState::Draft, LotState::Simulated];

    /// Simulation is a read-only preview; re-simulating is always fine
    /// before apply. A DRAFT lot becomes SIMULATED, a SIMULATED lot
    /// stays SIMULATED.
    pub fn on_simulate(self, lot_id: &str) -> CoreResult<LotState> {
        match self {
            LotState::Draft | LotState::Simulated => Ok(LotState::Simulated),
            LotState::Applied | LotState::Reverted => Err(self.invalid(lot_id, "simulate")),
        }
    }

    pub fn on_apply(self, lot_id: &str) -> CoreResult<LotState> {
        match self {
            LotState::Draft | LotState::Simulated => Ok(LotState::Applied),
            LotState::Applied | LotState::Reverted => Err(self.invalid(lot_id, "apply")),
        }
    }

    pub fn on_revert(self, lot_id: &str) -> CoreResult<LotState> {
        match self {
            LotState::Applied => Ok(LotState::Reverted),
            _ => Err(self.invalid(lot_id, "revert")),
        }
    }

    fn invalid(self, lot_id: &str, operation: &'static str) -> CoreError {
        CoreError::InvalidLotState {
            lot_id: lot_id.to_string(),
            current_state: self.as_str().to_string(),
            operation,
        }
    }
}

impl std::str::FromStr for LotState {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(LotState::Draft),
            "SIMULATED" => Ok(LotState::Simulated),
            "APPLIED" => Ok(LotState::Applied),
            "REVERTED" => Ok(LotState::Reverted),
            other => Err(crate::error::ValidationError::Invalid {
                field: "state",
                reason: format!("unknown lot state '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for LotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Repricing Lot
// =============================================================================

/// A stored repricing lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepricingLot {
    pub id: String,
    pub label: String,
    pub adjustment: Adjustment,
    /// Categories the lot targets; empty means every category.
    pub category_filter: Vec<Category>,
    pub state: LotState,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub applied_at: Option<chrono::DateTime<chrono::Utc>>,
    pub reverted_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Items actually touched by apply; None until applied.
    pub affected_count: Option<i64>,
}

impl RepricingLot {
    /// Whether an item is in the lot's target set. Inactive items are
    /// never repriced.
    pub fn matches(&self, item: &Item) -> bool {
        item.is_active && (self.category_filter.is_empty() || self.category_filter.contains(&item.category))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    #[test]
    fn percentage_increase() {
        // 10000 + 15% -> 11500
        let adj = Adjustment::percentage(1500);
        assert_eq!(adj.apply_to(Money::from_cents(10_000)).cents(), 11_500);
    }

    #[test]
    fn percentage_decrease_rounds_half_away() {
        let adj = Adjustment::percentage(-1500);
        assert_eq!(adj.apply_to(Money::from_cents(10_000)).cents(), 8_500);
        // 999 * -5% = -49.95 -> price 949 (delta rounds to -50)
        assert_eq!(Adjustment::percentage(-500).apply_to(Money::from_cents(999)).cents(), 949);
    }

    #[test]
    fn fixed_amount_clamps_at_zero() {
        let adj = Adjustment::fixed_amount(-2_000);
        assert_eq!(adj.apply_to(Money::from_cents(1_500)).cents(), 0);
        assert_eq!(adj.apply_to(Money::from_cents(2_000)).cents(), 0);
        assert_eq!(adj.apply_to(Money::from_cents(2_500)).cents(), 500);
    }

    #[test]
    fn percentage_clamps_at_zero() {
        // -150% would go negative; clamp wins.
        let adj = Adjustment::percentage(-15_000);
        assert_eq!(adj.apply_to(Money::from_cents(1_000)).cents(), 0);
    }

    #[test]
    fn lifecycle_happy_path() {
        let s = LotState::Draft;
        let s = s.on_simulate("l1").unwrap();
        assert_eq!(s, LotState::Simulated);
        let s = s.on_apply("l1").unwrap();
        assert_eq!(s, LotState::Applied);
        let s = s.on_revert("l1").unwrap();
        assert_eq!(s, LotState::Reverted);
    }

    #[test]
    fn apply_straight_from_draft_is_legal() {
        assert_eq!(LotState::Draft.on_apply("l1").unwrap(), LotState::Applied);
    }

    #[test]
    fn resimulate_before_apply_is_legal() {
        assert_eq!(LotState::Simulated.on_simulate("l1").unwrap(), LotState::Simulated);
    }

    #[test]
    fn double_apply_rejected() {
        let err = LotState::Applied.on_apply("l1").unwrap_err();
        match err {
            CoreError::InvalidLotState { lot_id, current_state, operation } => {
                assert_eq!(lot_id, "l1");
                assert_eq!(current_state, "APPLIED");
                assert_eq!(operation, "apply");
            }
            other => panic!("expected InvalidLotState, got {other:?}"),
        }
    }

    #[test]
    fn revert_requires_applied() {
        assert!(LotState::Draft.on_revert("l1").is_err());
        assert!(LotState::Simulated.on_revert("l1").is_err());
        assert!(LotState::Reverted.on_revert("l1").is_err());
    }

    #[test]
    fn simulate_after_apply_rejected() {
        assert!(LotState::Applied.on_simulate("l1").is_err());
        assert!(LotState::Reverted.on_simulate("l1").is_err());
    }

    fn lot_with_filter(filter: Vec<Category>) -> RepricingLot {
        RepricingLot {
            id: "l1".into(),
            label: "test".into(),
            adjustment: Adjustment::percentage(1000),
            category_filter: filter,
            state: LotState::Draft,
            created_at: Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
            applied_at: None,
            reverted_at: None,
            affected_count: None,
        }
    }

    fn active_item(category: Category) -> Item {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        Item {
            id: "i1".into(),
            sku: "S1".into(),
            name: "n".into(),
            category,
            purchase_cost_cents: 100,
            explicit_sale_price_cents: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_filter_matches_all_active() {
        let lot = lot_with_filter(vec![]);
        assert!(lot.matches(&active_item(Category::Frenos)));
        assert!(lot.matches(&active_item(Category::Motor)));
    }

    #[test]
    fn filter_restricts_categories() {
        let lot = lot_with_filter(vec![Category::Frenos, Category::Motor]);
        assert!(lot.matches(&active_item(Category::Frenos)));
        assert!(!lot.matches(&active_item(Category::Neumaticos)));
    }

    #[test]
    fn inactive_items_never_match() {
        let lot = lot_with_filter(vec![]);
        let mut item = active_item(Category::Frenos);
        item.is_active = false;
        assert!(!lot.matches(&item));
    }

    proptest! {
        /// Adjusted prices never go negative, whatever the inputs.
        #[test]
        fn adjustment_never_negative(
            price in 0i64..=10_000_000,
            bps in -50_000i64..=50_000,
            cents in -10_000_000i64..=10_000_000,
        ) {
            prop_assert!(!Adjustment::percentage(bps).apply_to(Money::from_cents(price)).is_negative());
            prop_assert!(!Adjustment::fixed_amount(cents).apply_to(Money::from_cents(price)).is_negative());
        }

        /// A zero adjustment is the identity on non-negative prices.
        #[test]
        fn zero_adjustment_is_identity(price in 0i64..=10_000_000) {
            prop_assert_eq!(Adjustment::percentage(0).apply_to(Money::from_cents(price)).cents(), price);
            prop_assert_eq!(Adjustment::fixed_amount(0).apply_to(Money::from_cents(price)).cents(), price);
        }

        /// Fixed-amount adjustments that stay in range are exactly additive.
        #[test]
        fn fixed_amount_is_additive_in_range(
            price in 0i64..=10_000_000,
            cents in 0i64..=10_000_000,
        ) {
            prop_assert_eq!(
                Adjustment::fixed_amount(cents).apply_to(Money::from_cents(price)).cents(),
                price + cents
            );
        }
    }
}

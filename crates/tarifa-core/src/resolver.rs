//! # Price Resolver
//!
//! Resolves a sale price for a catalog item from layered business rules.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Price Resolution                                    │
//! │                                                                         │
//! │  1. Price-list override                                                 │
//! │     Scan active lists valid at `as_of`, ordered by priority ASC,        │
//! │     then id ASC (deterministic tie-break). First list carrying an       │
//! │     override for the item supplies the BASE price.                      │
//! │          │ none                                                         │
//! │          ▼                                                              │
//! │  2. Explicit sale price on the item (operator-set or lot-applied)       │
//! │          │ none                                                         │
//! │          ▼                                                              │
//! │  3. Markup over cost: cost × (1 + markup_bps/10000), from the           │
//! │     ACTIVE rule for the item's category                                 │
//! │          │ no active rule                                               │
//! │          ▼                                                              │
//! │     Err(NoPriceAvailable)                                               │
//! │                                                                         │
//! │  4. Customer-group discount (multiplicative on the BASE, never on       │
//! │     cost): first active group containing the customer, groups           │
//! │     ordered by id ASC.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The resolver is a pure function of an explicitly injected
//! [`PricingSnapshot`] (never of ambient global state), so the same
//! inputs always produce the same price.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Category, CustomerGroup, Item, MarkupRule, PriceListHeader};

// =============================================================================
// Pricing Snapshot
// =============================================================================

/// A price list together with its per-item override map.
#[derive(Debug, Clone)]
pub struct PriceList {
    pub header: PriceListHeader,
    /// item_id -> override price in cents.
    pub overrides: HashMap<String, i64>,
}

/// A customer group together with its member roster.
#[derive(Debug, Clone)]
pub struct GroupRoster {
    pub group: CustomerGroup,
    pub member_ids: HashSet<String>,
}

/// Point-in-time view of all rule state the resolver needs.
///
/// Built by the storage layer from one consistent read; resolution over a
/// snapshot never touches the database, which is what lets the dashboard
/// price tens of thousands of items without holding a transaction open.
#[derive(Debug, Clone, Default)]
pub struct PricingSnapshot {
    rules: HashMap<Category, MarkupRule>,
    lists: Vec<PriceList>,
    groups: Vec<GroupRoster>,
}

impl PricingSnapshot {
    /// Assembles a snapshot, establishing the deterministic orderings the
    /// resolver relies on: lists by (priority, id), groups by id.
    ///
    /// Rules are keyed by category; a later rule for the same category
    /// replaces the earlier one (the store enforces at-most-one anyway).
    pub fn new(rules: Vec<MarkupRule>, mut lists: Vec<PriceList>, mut groups: Vec<GroupRoster>) -> Self {
        lists.sort_by(|a, b| {
            a.header
                .priority
                .cmp(&b.header.priority)
                .then_with(|| a.header.id.cmp(&b.header.id))
        });
        groups.sort_by(|a, b| a.group.id.cmp(&b.group.id));

        let rules = rules.into_iter().map(|r| (r.category, r)).collect();

        PricingSnapshot { rules, lists, groups }
    }

    /// The active markup rule for a category, if any.
    pub fn active_rule(&self, category: Category) -> Option<&MarkupRule> {
        self.rules.get(&category).filter(|r| r.is_active)
    }

    /// Whether a category has an active markup rule (dashboard counter).
    pub fn has_active_rule(&self, category: Category) -> bool {
        self.active_rule(category).is_some()
    }

    /// First active group containing the customer, by group id ascending.
    ///
    /// A customer in several rosters gets the first active match by
    /// group id, not the deepest discount, so resolution stays
    /// deterministic under overlapping memberships.
    pub fn group_for_customer(&self, customer_id: &str) -> Option<&CustomerGroup> {
        self.groups
            .iter()
            .filter(|g| g.group.is_active)
            .find(|g| g.member_ids.contains(customer_id))
            .map(|g| &g.group)
    }

    fn list_override(&self, item_id: &str, as_of: DateTime<Utc>) -> Option<(&PriceListHeader, i64)> {
        self.lists
            .iter()
            .filter(|l| l.header.is_active && l.header.is_valid_at(as_of))
            .find_map(|l| l.overrides.get(item_id).map(|cents| (&l.header, *cents)))
    }
}

// =============================================================================
// Resolved Price
// =============================================================================

/// Where the base price came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase", tag = "kind")]
pub enum PriceSource {
    /// A price-list override supplied the base price.
    ListOverride { list_id: String },
    /// The item's explicit sale price supplied the base price.
    ExplicitPrice,
    /// The base price was derived from purchase cost and category markup.
    CategoryMarkup { markup_bps: u32 },
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    /// The item that was priced.
    pub item_id: String,

    /// Base price before any customer discount.
    pub base_price: Money,

    /// Final price after the customer-group discount, if one applied.
    pub final_price: Money,

    /// Where the base price came from.
    pub source: PriceSource,

    /// Discount applied, in basis points, if a group matched.
    pub discount_bps: Option<u32>,

    /// The group that supplied the discount, if any.
    pub group_id: Option<String>,

    /// Margin `(final - cost) / final`; None when the final price is zero
    /// (division guard, not a real margin).
    pub margin: Option<f64>,
}

/// Margin ratio with a zero-price guard.
pub fn margin_ratio(final_price: Money, cost: Money) -> Option<f64> {
    if final_price.is_zero() {
        return None;
    }
    Some((final_price.cents() - cost.cents()) as f64 / final_price.cents() as f64)
}

// =============================================================================
// resolve()
// =============================================================================

/// Resolves the sale price of `item` at `as_of`, optionally for a
/// specific customer.
///
/// Pure: the only inputs are the arguments; the only failure is
/// [`CoreError::NoPriceAvailable`].
pub fn resolve(
    item: &Item,
    snapshot: &PricingSnapshot,
    as_of: DateTime<Utc>,
    customer_id: Option<&str>,
) -> CoreResult<ResolvedPrice> {
    // Base price: list override > explicit price > category markup.
    let (base_price, source) = if let Some((list, cents)) = snapshot.list_override(&item.id, as_of) {
        (Money::from_cents(cents), PriceSource::ListOverride { list_id: list.id.clone() })
    } else if let Some(explicit) = item.explicit_sale_price() {
        (explicit, PriceSource::ExplicitPrice)
    } else if let Some(rule) = snapshot.active_rule(item.category) {
        (
            item.purchase_cost().apply_markup_bps(rule.markup_bps),
            PriceSource::CategoryMarkup { markup_bps: rule.markup_bps },
        )
    } else {
        return Err(CoreError::NoPriceAvailable {
            item_id: item.id.clone(),
            category: item.category.to_string(),
        });
    };

    // Customer-group discount, multiplicative on the resolved base.
    let group = customer_id.and_then(|c| snapshot.group_for_customer(c));
    let (final_price, discount_bps, group_id) = match group {
        Some(g) => (base_price.apply_discount_bps(g.discount_bps), Some(g.discount_bps), Some(g.id.clone())),
        None => (base_price, None, None),
    };

    Ok(ResolvedPrice {
        item_id: item.id.clone(),
        base_price,
        final_price,
        source,
        discount_bps,
        group_id,
        margin: margin_ratio(final_price, item.purchase_cost()),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

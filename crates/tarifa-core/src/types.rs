//! # Domain Types
//!
//! Core domain types for the pricing layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │   MarkupRule    │   │   PriceList     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  category (PK)  │   │  id, priority   │       │
//! │  │  category       │   │  markup_bps     │   │  validity window│       │
//! │  │  cost_cents     │   │  is_active      │   │  item overrides │       │
//! │  │  explicit price │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  CustomerGroup  │   │    Category     │  closed enum:               │
//! │  │  ─────────────  │   │  ─────────────  │  unknown category strings   │
//! │  │  discount_bps   │   │  FRENOS, MOTOR, │  fail at construction,      │
//! │  │  member roster  │   │  SUSPENSION, …  │  never fall through to      │
//! │  └─────────────────┘   └─────────────────┘  "no markup" silently       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary columns are plain `*_cents: i64` fields (what the database
//! stores) with [`Money`] accessors for arithmetic, and all percentages
//! are integer basis points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// Part category. A fixed, closed set.
///
/// ## Why an enum and not a string?
/// The source of truth for markup rules is keyed by category. With a free
/// string, a typo ("FRENO") would silently resolve to "no markup"; with a
/// closed enum it is a construction-time error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Brake components.
    Frenos,
    /// Engine parts.
    Motor,
    /// Suspension and steering.
    Suspension,
    /// Electrical components.
    Electrico,
    /// Tyres and wheels.
    Neumaticos,
    /// Hydraulic components.
    Hidraulico,
    /// Filters (oil, air, fuel).
    Filtros,
    /// Bodywork and cabin parts.
    Carroceria,
}

impl Category {
    /// All categories, in a fixed order.
    ///
    /// Used by the dashboard to find categories with no active rule.
    pub const ALL: [Category; 8] = [
        Category::Frenos,
        Category::Motor,
        Category::Suspension,
        Category::Electrico,
        Category::Neumaticos,
        Category::Hidraulico,
        Category::Filtros,
        Category::Carroceria,
    ];

    /// Canonical storage/wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Frenos => "FRENOS",
            Category::Motor => "MOTOR",
            Category::Suspension => "SUSPENSION",
            Category::Electrico => "ELECTRICO",
            Category::Neumaticos => "NEUMATICOS",
            Category::Hidraulico => "HIDRAULICO",
            Category::Filtros => "FILTROS",
            Category::Carroceria => "CARROCERIA",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FRENOS" => Ok(Category::Frenos),
            "MOTOR" => Ok(Category::Motor),
            "SUSPENSION" => Ok(Category::Suspension),
            "ELECTRICO" => Ok(Category::Electrico),
            "NEUMATICOS" => Ok(Category::Neumaticos),
            "HIDRAULICO" => Ok(Category::Hidraulico),
            "FILTROS" => Ok(Category::Filtros),
            "CARROCERIA" => Ok(Category::Carroceria),
            other => Err(crate::error::ValidationError::Invalid {
                field: "category",
                reason: format!("unknown category '{other}'"),
            }),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A catalog item.
///
/// Owned by the inventory subsystem; the pricing core reads items and
/// writes only `explicit_sale_price_cents` (through repricing lots or a
/// revert). Cost and category are never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Part number - business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Part category (closed set).
    pub category: Category,

    /// Purchase cost in cents. Never negative.
    pub purchase_cost_cents: i64,

    /// Explicit sale price in cents, if an operator (or an applied lot)
    /// has set one. Overrides markup-derived pricing.
    pub explicit_sale_price_cents: Option<i64>,

    /// Whether the item is active (soft delete).
    pub is_active: bool,

    /// When the item was created.
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the purchase cost as a Money type.
    #[inline]
    pub fn purchase_cost(&self) -> Money {
        Money::from_cents(self.purchase_cost_cents)
    }

    /// Returns the explicit sale price, if set.
    #[inline]
    pub fn explicit_sale_price(&self) -> Option<Money> {
        self.explicit_sale_price_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Markup Rule
// =============================================================================

/// Per-category markup over purchase cost.
///
/// At most one rule per category (the category is the primary key).
/// An inactive rule is ignored by the resolver, same as no rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MarkupRule {
    /// The category this rule prices.
    pub category: Category,

    /// Markup in basis points (4000 = 40%). Range 0..=50_000 (0-500%).
    pub markup_bps: u32,

    /// Whether the rule participates in resolution.
    pub is_active: bool,

    /// When the rule was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Price List
// =============================================================================

/// The commercial channel of a price list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceListType {
    Retail,
    Wholesale,
    Workshop,
    Promo,
}

/// A named, prioritized set of per-item price overrides.
///
/// Lower `priority` wins. Validity window is optional on both ends
/// (open-ended when absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PriceListHeader {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name ("Taller enero", "Promo flota").
    pub name: String,

    /// Commercial channel.
    pub list_type: PriceListType,

    /// Precedence: lower = higher precedence. Ties break by id ascending.
    pub priority: i64,

    /// Start of validity, inclusive. Open-ended when absent.
    pub valid_from: Option<DateTime<Utc>>,

    /// End of validity, inclusive. Open-ended when absent.
    pub valid_to: Option<DateTime<Utc>>,

    /// Whether the list participates in resolution.
    pub is_active: bool,

    /// When the list was created.
    pub created_at: DateTime<Utc>,
}

impl PriceListHeader {
    /// Whether `as_of` falls inside this list's validity window.
    ///
    /// Open ends always match; the window is inclusive on both ends.
    pub fn is_valid_at(&self, as_of: DateTime<Utc>) -> bool {
        if let Some(from) = self.valid_from {
            if as_of < from {
                return false;
            }
        }
        if let Some(to) = self.valid_to {
            if as_of > to {
                return false;
            }
        }
        true
    }
}

/// A single per-item override inside a price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PriceListItem {
    /// The list this override belongs to.
    pub list_id: String,

    /// The overridden item.
    pub item_id: String,

    /// Override price in cents. Never negative.
    pub override_price_cents: i64,
}

// =============================================================================
// Customer Group
// =============================================================================

/// A named customer discount group.
///
/// The discount applies multiplicatively *after* the base/override price
/// is resolved. The roster lives in a separate membership table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerGroup {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name ("Flotas", "Talleres asociados").
    pub name: String,

    /// Discount in basis points (1500 = 15%). Range 0..=10_000.
    pub discount_bps: u32,

    /// Whether the group participates in resolution.
    pub is_active: bool,

    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Wire DTOs
//!
//! JSON shapes for the admin UI, decoupled from the domain types.
//!
//! ## Conventions
//! - camelCase field names
//! - money travels as integer cents (`priceCents`)
//! - percentages travel as decimal percent (`markupPercent: 40` means 40%,
//!   `15.5` means 15.5%); the domain works in basis points, and this module
//!   is the ONLY place the two meet

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tarifa_core::{
    Adjustment, Category, CustomerGroup, LotState, MarkupRule, PriceListHeader, PriceListType,
    PriceSource, PricedItem, RepricingLot, ResolvedPrice,
};
use tarifa_db::{SimulationLine, SimulationReport};

use crate::error::ApiError;

// =============================================================================
// Percent <-> Basis Points
// =============================================================================

/// `40.0` -> `4000`. Rounds to the nearest basis point, so the wire can
/// say `12.345` and the domain stores 1235 bps.
pub fn percent_to_bps(percent: f64) -> Result<i64, ApiError> {
    if !percent.is_finite() {
        return Err(ApiError::validation("percent must be a finite number"));
    }
    Ok((percent * 100.0).round() as i64)
}

fn percent_to_ubps(percent: f64, field: &str) -> Result<u32, ApiError> {
    let bps = percent_to_bps(percent)?;
    u32::try_from(bps).map_err(|_| ApiError::validation(format!("{field} must not be negative")))
}

/// `4000` -> `40.0`.
pub fn bps_to_percent(bps: i64) -> f64 {
    bps as f64 / 100.0
}

// =============================================================================
// Markup Rules
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupRuleDto {
    pub category: Category,
    pub markup_percent: f64,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<MarkupRule> for MarkupRuleDto {
    fn from(rule: MarkupRule) -> Self {
        MarkupRuleDto {
            category: rule.category,
            markup_percent: bps_to_percent(rule.markup_bps as i64),
            active: rule.is_active,
            updated_at: rule.updated_at,
        }
    }
}

/// One entry of the batch rules upsert.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupRuleUpsert {
    pub category: Category,
    pub markup_percent: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl MarkupRuleUpsert {
    pub fn markup_bps(&self) -> Result<u32, ApiError> {
        percent_to_ubps(self.markup_percent, "markupPercent")
    }
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Price Lists
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceListDto {
    pub id: String,
    pub name: String,
    pub list_type: PriceListType,
    pub priority: i64,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PriceListHeader> for PriceListDto {
    fn from(h: PriceListHeader) -> Self {
        PriceListDto {
            id: h.id,
            name: h.name,
            list_type: h.list_type,
            priority: h.priority,
            valid_from: h.valid_from,
            valid_to: h.valid_to,
            active: h.is_active,
            created_at: h.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePriceListRequest {
    pub name: String,
    pub list_type: PriceListType,
    #[serde(default = "default_priority")]
    pub priority: i64,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

fn default_priority() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOverrideRequest {
    pub item_id: String,
    pub price_cents: i64,
}

// =============================================================================
// Customer Groups
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerGroupDto {
    pub id: String,
    pub name: String,
    pub discount_percent: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerGroup> for CustomerGroupDto {
    fn from(g: CustomerGroup) -> Self {
        CustomerGroupDto {
            id: g.id,
            name: g.name,
            discount_percent: bps_to_percent(g.discount_bps as i64),
            active: g.is_active,
            created_at: g.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    pub discount_percent: f64,
}

impl CreateGroupRequest {
    pub fn discount_bps(&self) -> Result<u32, ApiError> {
        percent_to_ubps(self.discount_percent, "discountPercent")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub customer_id: String,
}

// =============================================================================
// Price Resolution
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPriceDto {
    pub item_id: String,
    pub base_price_cents: i64,
    pub final_price_cents: i64,
    pub source: PriceSource,
    pub discount_percent: Option<f64>,
    pub group_id: Option<String>,
    pub margin_percent: Option<f64>,
}

impl From<ResolvedPrice> for ResolvedPriceDto {
    fn from(r: ResolvedPrice) -> Self {
        ResolvedPriceDto {
            item_id: r.item_id,
            base_price_cents: r.base_price.cents(),
            final_price_cents: r.final_price.cents(),
            source: r.source,
            discount_percent: r.discount_bps.map(|bps| bps_to_percent(bps as i64)),
            group_id: r.group_id,
            margin_percent: r.margin.map(|m| m * 100.0),
        }
    }
}

// =============================================================================
// Adjustments and Lots
// =============================================================================

/// Wire form of an adjustment. Percentage carries decimal percent,
/// fixed amount carries signed cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum AdjustmentDto {
    Percentage { percent: f64 },
    FixedAmount { amount_cents: i64 },
}

impl AdjustmentDto {
    pub fn to_domain(self) -> Result<Adjustment, ApiError> {
        match self {
            AdjustmentDto::Percentage { percent } => {
                Ok(Adjustment::percentage(percent_to_bps(percent)?))
            }
            AdjustmentDto::FixedAmount { amount_cents } => Ok(Adjustment::fixed_amount(amount_cents)),
        }
    }
}

impl From<Adjustment> for AdjustmentDto {
    fn from(a: Adjustment) -> Self {
        match a.kind {
            tarifa_core::AdjustmentType::Percentage => {
                AdjustmentDto::Percentage { percent: bps_to_percent(a.value) }
            }
            tarifa_core::AdjustmentType::FixedAmount => {
                AdjustmentDto::FixedAmount { amount_cents: a.value }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub adjustment: AdjustmentDto,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLotRequest {
    pub label: String,
    pub adjustment: AdjustmentDto,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotDto {
    pub id: String,
    pub label: String,
    pub adjustment: AdjustmentDto,
    pub categories: Vec<Category>,
    pub state: LotState,
    pub created_at: DateTime<Utc>,
    pub applied_at: Option<DateTime<Utc>>,
    pub reverted_at: Option<DateTime<Utc>>,
    pub affected_count: Option<i64>,
}

impl From<RepricingLot> for LotDto {
    fn from(lot: RepricingLot) -> Self {
        LotDto {
            id: lot.id,
            label: lot.label,
            adjustment: lot.adjustment.into(),
            categories: lot.category_filter,
            state: lot.state,
            created_at: lot.created_at,
            applied_at: lot.applied_at,
            reverted_at: lot.reverted_at,
            affected_count: lot.affected_count,
        }
    }
}

// =============================================================================
// Simulation Report
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationLineDto {
    pub item_id: String,
    pub sku: String,
    pub name: String,
    pub category: Category,
    pub price_before_cents: i64,
    pub price_after_cents: i64,
    pub delta_cents: i64,
}

impl From<SimulationLine> for SimulationLineDto {
    fn from(line: SimulationLine) -> Self {
        let delta_cents = line.delta().cents();
        SimulationLineDto {
            item_id: line.item_id,
            sku: line.sku,
            name: line.name,
            category: line.category,
            price_before_cents: line.price_before.cents(),
            price_after_cents: line.price_after.cents(),
            delta_cents,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReportDto {
    pub affected_count: u64,
    pub skipped_count: u64,
    pub lines: Vec<SimulationLineDto>,
}

impl From<SimulationReport> for SimulationReportDto {
    fn from(report: SimulationReport) -> Self {
        SimulationReportDto {
            affected_count: report.affected_count,
            skipped_count: report.skipped_count,
            lines: report.lines.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedItemDto {
    pub item_id: String,
    pub sku: String,
    pub name: String,
    pub category: Category,
    pub purchase_cost_cents: i64,
    pub sale_price_cents: i64,
    pub margin_percent: Option<f64>,
}

impl From<PricedItem> for PricedItemDto {
    fn from(p: PricedItem) -> Self {
        PricedItemDto {
            item_id: p.item_id,
            sku: p.sku,
            name: p.name,
            category: p.category,
            purchase_cost_cents: p.purchase_cost.cents(),
            sale_price_cents: p.sale_price.cents(),
            margin_percent: p.margin.map(|m| m * 100.0),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginDistributionDto {
    pub negative: u64,
    pub low: u64,
    pub medium: u64,
    pub healthy: u64,
    pub high: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub total_items: u64,
    pub priced_items: u64,
    pub items_missing_markup: u64,
    pub items_missing_sale_price: u64,
    /// Mean margin ratio over items with a margin, absent otherwise.
    pub average_margin: Option<f64>,
    pub distribution: MarginDistributionDto,
    pub top_margin_items: Vec<PricedItemDto>,
    pub bottom_margin_items: Vec<PricedItemDto>,
}

impl From<tarifa_core::DashboardStats> for DashboardDto {
    fn from(s: tarifa_core::DashboardStats) -> Self {
        DashboardDto {
            total_items: s.total_items,
            priced_items: s.priced_items,
            items_missing_markup: s.items_missing_markup,
            items_missing_sale_price: s.items_missing_sale_price,
            average_margin: s.average_margin,
            distribution: MarginDistributionDto {
                negative: s.distribution.negative,
                low: s.distribution.low,
                medium: s.distribution.medium,
                healthy: s.distribution.healthy,
                high: s.distribution.high,
            },
            top_margin_items: s.top_margin_items.into_iter().map(Into::into).collect(),
            bottom_margin_items: s.bottom_margin_items.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: &'static str,
    pub migrations_total: usize,
    pub migrations_applied: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_round_trips_through_bps() {
        assert_eq!(percent_to_bps(40.0).unwrap(), 4000);
        assert_eq!(percent_to_bps(15.5).unwrap(), 1550);
        assert_eq!(percent_to_bps(-8.0).unwrap(), -800);
        assert_eq!(percent_to_bps(12.345).unwrap(), 1235);
        assert_eq!(bps_to_percent(4000), 40.0);
    }

    #[test]
    fn non_finite_percent_is_rejected() {
        assert!(percent_to_bps(f64::NAN).is_err());
        assert!(percent_to_bps(f64::INFINITY).is_err());
    }

    #[test]
    fn negative_markup_percent_is_rejected() {
        let upsert = MarkupRuleUpsert {
            category: Category::Frenos,
            markup_percent: -5.0,
            active: true,
        };
        assert!(upsert.markup_bps().is_err());
    }

    #[test]
    fn adjustment_dto_wire_shape() {
        let json = r#"{"type":"PERCENTAGE","percent":15}"#;
        let dto: AdjustmentDto = serde_json::from_str(json).unwrap();
        let adjustment = dto.to_domain().unwrap();
        assert_eq!(adjustment, Adjustment::percentage(1500));

        let json = r#"{"type":"FIXED_AMOUNT","amountCents":-500}"#;
        let dto: AdjustmentDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.to_domain().unwrap(), Adjustment::fixed_amount(-500));
    }

    #[test]
    fn lot_dto_carries_decimal_percent() {
        let lot = RepricingLot {
            id: "l1".into(),
            label: "test".into(),
            adjustment: Adjustment::percentage(800),
            category_filter: vec![Category::Motor],
            state: LotState::Draft,
            created_at: Utc::now(),
            applied_at: None,
            reverted_at: None,
            affected_count: None,
        };

        let dto = LotDto::from(lot);
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["adjustment"]["type"], "PERCENTAGE");
        assert_eq!(json["adjustment"]["percent"], 8.0);
        assert_eq!(json["state"], "DRAFT");
        assert_eq!(json["categories"][0], "MOTOR");
    }
}

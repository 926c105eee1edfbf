//! # Margin Dashboard
//!
//! Aggregates resolved prices into the operator overview: margin
//! distribution, catalog health counters, and the best and worst
//! earners.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Margin buckets ((final - cost) / final):                       │
//! │                                                                 │
//! │    NEGATIVE      margin <  0        selling below cost          │
//! │    LOW           0%  ..< 15%                                    │
//! │    MEDIUM        15% ..< 30%                                    │
//! │    HEALTHY       30% ..< 50%                                    │
//! │    HIGH          margin >= 50%                                  │
//! │                                                                 │
//! │  Items whose price cannot be resolved are counted separately    │
//! │  and never enter a bucket.                                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Category;

/// An item together with its resolved base price, as the dashboard
/// sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    pub item_id: String,
    pub sku: String,
    pub name: String,
    pub category: Category,
    pub purchase_cost: Money,
    pub sale_price: Money,
    /// `(sale_price - cost) / sale_price`; None when sale_price is 0.
    pub margin: Option<f64>,
}

/// Margin distribution band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarginBucket {
    Negative,
    Low,
    Medium,
    Healthy,
    High,
}

impl MarginBucket {
    /// Classifies a margin ratio. Boundaries are inclusive on the
    /// lower edge, so exactly 15% is MEDIUM and exactly 50% is HIGH.
    pub fn classify(margin: f64) -> MarginBucket {
        if margin < 0.0 {
            MarginBucket::Negative
        } else if margin < 0.15 {
            MarginBucket::Low
        } else if margin < 0.30 {
            MarginBucket::Medium
        } else if margin < 0.50 {
            MarginBucket::Healthy
        } else {
            MarginBucket::High
        }
    }
}

/// Counts per margin band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginDistribution {
    pub negative: u64,
    pub low: u64,
    pub medium: u64,
    pub healthy: u64,
    pub high: u64,
}

impl MarginDistribution {
    fn record(&mut self, bucket: MarginBucket) {
        match bucket {
            MarginBucket::Negative => self.negative += 1,
            MarginBucket::Low => self.low += 1,
            MarginBucket::Medium => self.medium += 1,
            MarginBucket::Healthy => self.healthy += 1,
            MarginBucket::High => self.high += 1,
        }
    }
}

/// The operator dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Active catalog items.
    pub total_items: u64,

    /// Active items that resolved to a price.
    pub priced_items: u64,

    /// Active items whose category has no active markup rule.
    pub items_missing_markup: u64,

    /// Active items for which resolution failed outright.
    pub items_missing_sale_price: u64,

    /// Mean margin ratio over margin-bearing priced items. None when no
    /// item carries a margin (empty catalog or all zero-price).
    pub average_margin: Option<f64>,

    pub distribution: MarginDistribution,

    /// Five highest-margin items, margin descending.
    pub top_margin_items: Vec<PricedItem>,

    /// Five lowest-margin items, margin ascending.
    pub bottom_margin_items: Vec<PricedItem>,
}

const RANKING_SIZE: usize = 5;

/// Builds dashboard statistics from the resolved catalog.
///
/// `priced` holds every active item that resolved; the two missing
/// counters come from the caller, which knows which items failed and
/// why. Zero-price items (margin None) are counted as priced but stay
/// out of the distribution, the rankings, and the average.
///
/// Ranking ties break on item id ascending so repeated calls over the
/// same catalog produce identical output.
pub fn compute_margin_stats(
    priced: &[PricedItem],
    total_items: u64,
    items_missing_markup: u64,
    items_missing_sale_price: u64,
) -> DashboardStats {
    let mut distribution = MarginDistribution::default();
    let mut ranked: Vec<&PricedItem> = Vec::with_capacity(priced.len());
    let mut margin_sum = 0.0_f64;

    for item in priced {
        if let Some(margin) = item.margin {
            distribution.record(MarginBucket::classify(margin));
            margin_sum += margin;
            ranked.push(item);
        }
    }

    let average_margin = if ranked.is_empty() { None } else { Some(margin_sum / ranked.len() as f64) };

    // f64 margins are finite here (guarded divisions), total_cmp keeps
    // the sort total anyway.
    ranked.sort_by(|a, b| {
        b.margin
            .unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&a.margin.unwrap_or(f64::NEG_INFINITY))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    let top_margin_items: Vec<PricedItem> = ranked.iter().take(RANKING_SIZE).map(|i| (*i).clone()).collect();

    let mut bottom: Vec<&PricedItem> = ranked;
    bottom.sort_by(|a, b| {
        a.margin
            .unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&b.margin.unwrap_or(f64::NEG_INFINITY))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    let bottom_margin_items: Vec<PricedItem> =
        bottom.iter().take(RANKING_SIZE).map(|i| (*i).clone()).collect();

    DashboardStats {
        total_items,
        priced_items: priced.len() as u64,
        items_missing_markup,
        items_missing_sale_price,
        average_margin,
        distribution,
        top_margin_items,
        bottom_margin_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(id: &str, cost: i64, price: i64) -> PricedItem {
        PricedItem {
            item_id: id.to_string(),
            sku: format!("SKU-{id}"),
            name: format!("Item {id}"),
            category: Category::Frenos,
            purchase_cost: Money::from_cents(cost),
            sale_price: Money::from_cents(price),
            margin: crate::resolver::margin_ratio(Money::from_cents(price), Money::from_cents(cost)),
        }
    }

    #[test]
    fn bucket_boundaries_are_lower_inclusive() {
        assert_eq!(MarginBucket::classify(-0.01), MarginBucket::Negative);
        assert_eq!(MarginBucket::classify(0.0), MarginBucket::Low);
        assert_eq!(MarginBucket::classify(0.1499), MarginBucket::Low);
        assert_eq!(MarginBucket::classify(0.15), MarginBucket::Medium);
        assert_eq!(MarginBucket::classify(0.2999), MarginBucket::Medium);
        assert_eq!(MarginBucket::classify(0.30), MarginBucket::Healthy);
        assert_eq!(MarginBucket::classify(0.4999), MarginBucket::Healthy);
        assert_eq!(MarginBucket::classify(0.50), MarginBucket::High);
        assert_eq!(MarginBucket::classify(0.95), MarginBucket::High);
    }

    #[test]
    fn distribution_counts_each_band() {
        let items = vec![
            priced("a", 1200, 1000),  // negative
            priced("b", 950, 1000),   // low (5%)
            priced("c", 800, 1000),   // medium (20%)
            priced("d", 600, 1000),   // healthy (40%)
            priced("e", 300, 1000),   // high (70%)
            priced("f", 250, 1000),   // high (75%)
        ];

        let stats = compute_margin_stats(&items, 6, 0, 0);
        assert_eq!(stats.distribution.negative, 1);
        assert_eq!(stats.distribution.low, 1);
        assert_eq!(stats.distribution.medium, 1);
        assert_eq!(stats.distribution.healthy, 1);
        assert_eq!(stats.distribution.high, 2);
        assert_eq!(stats.priced_items, 6);
    }

    #[test]
    fn rankings_are_ordered_and_capped_at_five() {
        let items: Vec<PricedItem> = (0..8)
            .map(|i| priced(&format!("i{i}"), 1000 - i * 100, 1000))
            .collect();

        let stats = compute_margin_stats(&items, 8, 0, 0);

        assert_eq!(stats.top_margin_items.len(), 5);
        assert_eq!(stats.bottom_margin_items.len(), 5);
        // Top is highest margin first (lowest cost).
        assert_eq!(stats.top_margin_items[0].item_id, "i7");
        assert_eq!(stats.bottom_margin_items[0].item_id, "i0");

        for pair in stats.top_margin_items.windows(2) {
            assert!(pair[0].margin.unwrap() >= pair[1].margin.unwrap());
        }
        for pair in stats.bottom_margin_items.windows(2) {
            assert!(pair[0].margin.unwrap() <= pair[1].margin.unwrap());
        }
    }

    #[test]
    fn ranking_ties_break_on_item_id() {
        // Three identical margins: id order decides.
        let items = vec![priced("c", 500, 1000), priced("a", 500, 1000), priced("b", 500, 1000)];
        let stats = compute_margin_stats(&items, 3, 0, 0);

        let top_ids: Vec<&str> = stats.top_margin_items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(top_ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn zero_price_items_stay_out_of_distribution() {
        let items = vec![priced("a", 100, 0), priced("b", 500, 1000)];
        let stats = compute_margin_stats(&items, 2, 0, 0);

        assert_eq!(stats.priced_items, 2);
        let d = &stats.distribution;
        assert_eq!(d.negative + d.low + d.medium + d.healthy + d.high, 1);
        assert_eq!(stats.top_margin_items.len(), 1);
        // The zero-price item must not drag the average.
        assert_eq!(stats.average_margin, Some(0.5));
    }

    #[test]
    fn average_margin_is_the_mean_over_margin_bearing_items() {
        // Margins 0.2, 0.4, 0.6; mean 0.4.
        let items = vec![priced("a", 800, 1000), priced("b", 600, 1000), priced("c", 400, 1000)];
        let stats = compute_margin_stats(&items, 3, 0, 0);

        let avg = stats.average_margin.unwrap();
        assert!((avg - 0.4).abs() < 1e-12, "got {avg}");
    }

    #[test]
    fn average_margin_is_none_when_nothing_carries_a_margin() {
        assert_eq!(compute_margin_stats(&[], 0, 0, 0).average_margin, None);

        let only_zero_price = vec![priced("a", 100, 0)];
        assert_eq!(compute_margin_stats(&only_zero_price, 1, 0, 0).average_margin, None);
    }

    #[test]
    fn dashboard_payload_carries_the_average_margin() {
        let stats = compute_margin_stats(&[priced("a", 500, 1000)], 1, 0, 0);
        let payload = serde_json::to_value(&stats).unwrap();
        assert_eq!(payload["average_margin"], serde_json::json!(0.5));
    }

    #[test]
    fn missing_counters_pass_through() {
        let stats = compute_margin_stats(&[], 10, 3, 4);
        assert_eq!(stats.total_items, 10);
        assert_eq!(stats.priced_items, 0);
        assert_eq!(stats.items_missing_markup, 3);
        assert_eq!(stats.items_missing_sale_price, 4);
    }
}

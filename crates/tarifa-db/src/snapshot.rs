//! # Pricing Store
//!
//! Assembles [`PricingSnapshot`]s from storage and runs the pure
//! resolver over them.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  load_snapshot()                                                    │
//! │       │                                                             │
//! │       ├── markup_rules        (one read)                            │
//! │       ├── price_lists + price_list_items                            │
//! │       └── customer_groups + customer_group_members                  │
//! │       ▼                                                             │
//! │  PricingSnapshot (in memory, consistently ordered)                  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  tarifa_core::resolve(item, &snapshot, as_of, customer)             │
//! │                                                                     │
//! │  The snapshot is loaded once per request (or once per lot           │
//! │  operation) and then consulted in memory for every item, so         │
//! │  pricing a 50k-item catalog costs a handful of queries, not 50k.    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tarifa_core::{
    compute_margin_stats, resolve, Category, CustomerGroup, DashboardStats, GroupRoster, Item,
    MarkupRule, PriceList, PriceListHeader, PricedItem, PricingSnapshot, ResolvedPrice,
};

/// Read-side facade: snapshot assembly, single-item resolution, and the
/// margin dashboard.
#[derive(Debug, Clone)]
pub struct PricingStore {
    pool: SqlitePool,
}

impl PricingStore {
    /// Creates a new PricingStore.
    pub fn new(pool: SqlitePool) -> Self {
        PricingStore { pool }
    }

    /// Loads a consistent snapshot of all pricing rule state.
    pub async fn load_snapshot(&self) -> DbResult<PricingSnapshot> {
        let mut conn = self.pool.acquire().await?;
        load_snapshot_with(&mut conn).await
    }

    /// Resolves the price of one item, optionally for a customer.
    pub async fn resolve_item(
        &self,
        item_id: &str,
        customer_id: Option<&str>,
        as_of: DateTime<Utc>,
    ) -> DbResult<ResolvedPrice> {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?1")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Item", item_id))?;

        let snapshot = self.load_snapshot().await?;
        let resolved = resolve(&item, &snapshot, as_of, customer_id)?;
        Ok(resolved)
    }

    /// Builds the margin dashboard over every active item.
    ///
    /// An item counts as "missing markup" when its category has no
    /// active rule, whether or not something else (explicit price, list
    /// override) still prices it. "Missing sale price" counts items
    /// resolution rejected outright.
    pub async fn dashboard(&self, as_of: DateTime<Utc>) -> DbResult<DashboardStats> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE is_active = 1 ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let snapshot = self.load_snapshot().await?;

        let mut priced = Vec::with_capacity(items.len());
        let mut missing_markup: u64 = 0;
        let mut missing_sale_price: u64 = 0;

        for item in &items {
            if !snapshot.has_active_rule(item.category) {
                missing_markup += 1;
            }
            match resolve(item, &snapshot, as_of, None) {
                Ok(resolved) => priced.push(PricedItem {
                    item_id: item.id.clone(),
                    sku: item.sku.clone(),
                    name: item.name.clone(),
                    category: item.category,
                    purchase_cost: item.purchase_cost(),
                    sale_price: resolved.final_price,
                    margin: resolved.margin,
                }),
                Err(_) => missing_sale_price += 1,
            }
        }

        debug!(
            total = items.len(),
            priced = priced.len(),
            missing_markup,
            missing_sale_price,
            "Dashboard computed"
        );

        Ok(compute_margin_stats(&priced, items.len() as u64, missing_markup, missing_sale_price))
    }

    /// Categories without an active markup rule (rules screen warning).
    pub async fn categories_missing_rules(&self) -> DbResult<Vec<Category>> {
        let snapshot = self.load_snapshot().await?;
        Ok(Category::ALL
            .into_iter()
            .filter(|c| !snapshot.has_active_rule(*c))
            .collect())
    }
}

/// Assembles a [`PricingSnapshot`] over a single connection.
///
/// Takes `&mut SqliteConnection` so callers that already hold a
/// transaction (the apply path) read rule state with the same isolation
/// as their writes.
pub(crate) async fn load_snapshot_with(conn: &mut SqliteConnection) -> DbResult<PricingSnapshot> {
    let rules = sqlx::query_as::<_, MarkupRule>("SELECT * FROM markup_rules")
        .fetch_all(&mut *conn)
        .await?;

    let headers = sqlx::query_as::<_, PriceListHeader>("SELECT * FROM price_lists")
        .fetch_all(&mut *conn)
        .await?;

    let override_rows: Vec<(String, String, i64)> =
        sqlx::query_as("SELECT list_id, item_id, override_price_cents FROM price_list_items")
            .fetch_all(&mut *conn)
            .await?;

    let mut overrides_by_list: HashMap<String, HashMap<String, i64>> = HashMap::new();
    for (list_id, item_id, cents) in override_rows {
        overrides_by_list.entry(list_id).or_default().insert(item_id, cents);
    }

    let lists = headers
        .into_iter()
        .map(|header| {
            let overrides = overrides_by_list.remove(&header.id).unwrap_or_default();
            PriceList { header, overrides }
        })
        .collect();

    let groups = sqlx::query_as::<_, CustomerGroup>("SELECT * FROM customer_groups")
        .fetch_all(&mut *conn)
        .await?;

    let member_rows: Vec<(String, String)> =
        sqlx::query_as("SELECT group_id, customer_id FROM customer_group_members")
            .fetch_all(&mut *conn)
            .await?;

    let mut members_by_group: HashMap<String, std::collections::HashSet<String>> = HashMap::new();
    for (group_id, customer_id) in member_rows {
        members_by_group.entry(group_id).or_default().insert(customer_id);
    }

    let rosters = groups
        .into_iter()
        .map(|group| {
            let member_ids = members_by_group.remove(&group.id).unwrap_or_default();
            GroupRoster { group, member_ids }
        })
        .collect();

    Ok(PricingSnapshot::new(rules, lists, rosters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::item::NewItem;
    use tarifa_core::PriceSource;

    async fn seed_item(db: &Database, sku: &str, category: Category, cost: i64, explicit: Option<i64>) -> Item {
        db.items()
            .insert(NewItem {
                sku: sku.to_string(),
                name: format!("Part {sku}"),
                category,
                purchase_cost_cents: cost,
                explicit_sale_price_cents: explicit,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn resolve_item_uses_markup_rule() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.markup_rules().upsert(Category::Frenos, 4000, true).await.unwrap();
        let item = seed_item(&db, "R-1", Category::Frenos, 2500, None).await;

        let resolved = db.pricing().resolve_item(&item.id, None, Utc::now()).await.unwrap();
        assert_eq!(resolved.final_price.cents(), 3500);
        assert_eq!(resolved.source, PriceSource::CategoryMarkup { markup_bps: 4000 });
    }

    #[tokio::test]
    async fn resolve_item_applies_group_discount() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.markup_rules().upsert(Category::Frenos, 3000, true).await.unwrap();
        let item = seed_item(&db, "R-2", Category::Frenos, 1000, None).await;

        let group = db.customer_groups().insert("Talleres", 1500).await.unwrap();
        db.customer_groups().add_member(&group.id, "cust-1").await.unwrap();

        let resolved =
            db.pricing().resolve_item(&item.id, Some("cust-1"), Utc::now()).await.unwrap();
        assert_eq!(resolved.final_price.cents(), 1105);
        assert_eq!(resolved.group_id, Some(group.id));
    }

    #[tokio::test]
    async fn unresolvable_item_surfaces_domain_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = seed_item(&db, "R-3", Category::Hidraulico, 900, None).await;

        let err = db.pricing().resolve_item(&item.id, None, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(tarifa_core::CoreError::NoPriceAvailable { .. })));
    }

    #[tokio::test]
    async fn dashboard_counts_and_buckets() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.markup_rules().upsert(Category::Frenos, 4000, true).await.unwrap();

        // Priced by markup: margin 1000/3500 ≈ 28.6% (MEDIUM)
        seed_item(&db, "D-1", Category::Frenos, 2500, None).await;
        // Explicit price, category without a rule: priced but missing markup
        seed_item(&db, "D-2", Category::Motor, 1000, Some(2000)).await;
        // No price at all
        seed_item(&db, "D-3", Category::Motor, 1000, None).await;

        let stats = db.pricing().dashboard(Utc::now()).await.unwrap();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.priced_items, 2);
        assert_eq!(stats.items_missing_markup, 2);
        assert_eq!(stats.items_missing_sale_price, 1);
        assert_eq!(stats.distribution.medium, 1);
        assert_eq!(stats.distribution.high, 1); // 50% margin on D-2

        // Mean of 1000/3500 and 1000/2000; the unresolved item stays out.
        let avg = stats.average_margin.unwrap();
        let expected = (1000.0 / 3500.0 + 0.5) / 2.0;
        assert!((avg - expected).abs() < 1e-12, "got {avg}");
    }

    #[tokio::test]
    async fn categories_without_rules_are_reported() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.markup_rules().upsert(Category::Frenos, 4000, true).await.unwrap();
        db.markup_rules().upsert(Category::Motor, 3000, false).await.unwrap();

        let missing = db.pricing().categories_missing_rules().await.unwrap();
        assert!(!missing.contains(&Category::Frenos));
        assert!(missing.contains(&Category::Motor));
        assert_eq!(missing.len(), Category::ALL.len() - 1);
    }
}

//! # Repricing Engine
//!
//! Executes lot simulations, applies, and reverts against storage.
//!
//! ## Concurrency Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Lot Mutation Path                              │
//! │                                                                     │
//! │  apply(lot) / revert(lot)                                           │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  acquire process-wide repricing mutex  ← one mutation at a time     │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  BEGIN TRANSACTION                                                  │
//! │       │                                                             │
//! │       ├── UPDATE repricing_lots SET state = ...                     │
//! │       │        WHERE id = ? AND state IN (legal states)             │
//! │       │   rows_affected = 0 → ROLLBACK, Conflict                    │
//! │       │                                                             │
//! │       ├── write snapshots / item prices                             │
//! │       ▼                                                             │
//! │  COMMIT  ← all or nothing; a crash mid-apply leaves no half-lot     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Simulation takes no lock and writes nothing (besides the advisory
//! DRAFT→SIMULATED flip on stored lots): it is the same arithmetic the
//! apply path runs, over the same snapshot assembly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::lot::LotRepository;
use crate::snapshot::{load_snapshot_with, PricingStore};
use tarifa_core::{
    resolve, Adjustment, Category, Item, LotState, Money, PricingSnapshot, RepricingLot,
};

// =============================================================================
// Simulation Report
// =============================================================================

/// One item's before/after in a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationLine {
    pub item_id: String,
    pub sku: String,
    pub name: String,
    pub category: Category,
    pub price_before: Money,
    pub price_after: Money,
}

impl SimulationLine {
    /// Signed price movement for this item.
    pub fn delta(&self) -> Money {
        self.price_after - self.price_before
    }
}

/// Full simulation output: what apply WOULD do, without doing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub affected_count: u64,
    /// Items the filter matched but resolution could not price; they
    /// are skipped by apply too.
    pub skipped_count: u64,
    pub lines: Vec<SimulationLine>,
}

// =============================================================================
// Engine
// =============================================================================

/// Runs lot simulations and the serialized apply/revert transactions.
#[derive(Debug, Clone)]
pub struct RepricingEngine {
    pool: SqlitePool,
    lock: Arc<Mutex<()>>,
}

impl RepricingEngine {
    /// Creates a new engine sharing the given mutation lock.
    pub fn new(pool: SqlitePool, lock: Arc<Mutex<()>>) -> Self {
        RepricingEngine { pool, lock }
    }

    fn lots(&self) -> LotRepository {
        LotRepository::new(self.pool.clone())
    }

    fn pricing(&self) -> PricingStore {
        PricingStore::new(self.pool.clone())
    }

    /// Computes the before/after lines an adjustment would produce over
    /// the current catalog. Pure preview; nothing is written.
    ///
    /// Items outside the category filter, inactive items, and items
    /// with no resolvable price are excluded from the affected set.
    pub async fn simulate(
        &self,
        adjustment: Adjustment,
        category_filter: &[Category],
        as_of: DateTime<Utc>,
    ) -> DbResult<SimulationReport> {
        tarifa_core::validation::validate_adjustment(&adjustment)
            .map_err(tarifa_core::CoreError::from)?;

        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE is_active = 1 ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let snapshot = self.pricing().load_snapshot().await?;

        let report = build_report(&items, &snapshot, &adjustment, category_filter, as_of);
        debug!(
            affected = report.affected_count,
            skipped = report.skipped_count,
            "Simulation computed"
        );
        Ok(report)
    }

    /// Simulates a stored lot.
    ///
    /// Flips a DRAFT lot to SIMULATED (advisory marker; re-simulating a
    /// SIMULATED lot leaves it untouched). Rejected once the lot is
    /// APPLIED or REVERTED.
    pub async fn simulate_lot(&self, lot_id: &str, as_of: DateTime<Utc>) -> DbResult<SimulationReport> {
        let lot = self.lots().get_by_id(lot_id).await?;
        let next = lot.state.on_simulate(lot_id)?;

        if lot.state == LotState::Draft {
            sqlx::query("UPDATE repricing_lots SET state = ?1 WHERE id = ?2 AND state = 'DRAFT'")
                .bind(next.as_str())
                .bind(lot_id)
                .execute(&self.pool)
                .await?;
        }

        self.simulate(lot.adjustment, &lot.category_filter, as_of).await
    }

    /// Applies a lot: resolves every matching item, writes the adjusted
    /// price as its explicit sale price, and snapshots the before/after
    /// pair, all in one transaction.
    pub async fn apply(&self, lot_id: &str, as_of: DateTime<Utc>) -> DbResult<RepricingLot> {
        let _guard = self.lock.lock().await;

        let lot = self.lots().get_by_id(lot_id).await?;
        lot.state.on_apply(lot_id)?;

        let applied_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        // State flip first: it takes the write lock for the whole
        // transaction and guards against a concurrent apply.
        let result = sqlx::query(
            r#"
            UPDATE repricing_lots
            SET state = 'APPLIED', applied_at = ?1
            WHERE id = ?2 AND state IN ('DRAFT', 'SIMULATED')
            "#,
        )
        .bind(applied_at)
        .bind(lot_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict(format!("lot {lot_id} was modified concurrently")));
        }

        // Prices are resolved at apply time, inside the transaction, so
        // the affected set and every snapshotted price_before reflect the
        // exact catalog these writes land on. A repository write cannot
        // slip in between the read and the item updates.
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE is_active = 1 ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;
        let snapshot = load_snapshot_with(&mut tx).await?;
        let report = build_report(&items, &snapshot, &lot.adjustment, &lot.category_filter, as_of);

        sqlx::query("UPDATE repricing_lots SET affected_count = ?1 WHERE id = ?2")
            .bind(report.affected_count as i64)
            .bind(lot_id)
            .execute(&mut *tx)
            .await?;

        for line in &report.lines {
            sqlx::query(
                r#"
                INSERT INTO repricing_lot_snapshots
                    (lot_id, item_id, price_before_cents, price_after_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(lot_id)
            .bind(&line.item_id)
            .bind(line.price_before.cents())
            .bind(line.price_after.cents())
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE items SET explicit_sale_price_cents = ?1, updated_at = ?2 WHERE id = ?3",
            )
            .bind(line.price_after.cents())
            .bind(applied_at)
            .bind(&line.item_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            lot_id,
            affected = report.affected_count,
            skipped = report.skipped_count,
            "Repricing lot applied"
        );

        self.lots().get_by_id(lot_id).await
    }

    /// Reverts an applied lot: every snapshotted item gets its pre-apply
    /// resolved price back as its explicit sale price, so resolution
    /// afterwards returns exactly the prices from before apply.
    pub async fn revert(&self, lot_id: &str) -> DbResult<RepricingLot> {
        let _guard = self.lock.lock().await;

        let lot = self.lots().get_by_id(lot_id).await?;
        lot.state.on_revert(lot_id)?;

        let snapshots = self.lots().snapshots(lot_id).await?;
        let reverted_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE repricing_lots
            SET state = 'REVERTED', reverted_at = ?1
            WHERE id = ?2 AND state = 'APPLIED'
            "#,
        )
        .bind(reverted_at)
        .bind(lot_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict(format!("lot {lot_id} was modified concurrently")));
        }

        for snapshot in &snapshots {
            sqlx::query(
                "UPDATE items SET explicit_sale_price_cents = ?1, updated_at = ?2 WHERE id = ?3",
            )
            .bind(snapshot.price_before_cents)
            .bind(reverted_at)
            .bind(&snapshot.item_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(lot_id, restored = snapshots.len(), "Repricing lot reverted");

        self.lots().get_by_id(lot_id).await
    }
}

/// Resolves every matching item and pairs it with its adjusted price.
///
/// Pure: both simulate and apply run this over whatever catalog state
/// they loaded, so preview and mutation share one arithmetic path.
fn build_report(
    items: &[Item],
    snapshot: &PricingSnapshot,
    adjustment: &Adjustment,
    category_filter: &[Category],
    as_of: DateTime<Utc>,
) -> SimulationReport {
    let mut lines = Vec::new();
    let mut skipped: u64 = 0;

    for item in items {
        if !category_filter.is_empty() && !category_filter.contains(&item.category) {
            continue;
        }
        match resolve(item, snapshot, as_of, None) {
            Ok(resolved) => {
                let before = resolved.final_price;
                lines.push(SimulationLine {
                    item_id: item.id.clone(),
                    sku: item.sku.clone(),
                    name: item.name.clone(),
                    category: item.category,
                    price_before: before,
                    price_after: adjustment.apply_to(before),
                });
            }
            Err(_) => skipped += 1,
        }
    }

    SimulationReport {
        affected_count: lines.len() as u64,
        skipped_count: skipped,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::item::NewItem;
    use crate::repository::lot::NewLot;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

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

    async fn new_lot(db: &Database, adjustment: Adjustment, filter: Vec<Category>) -> RepricingLot {
        db.lots()
            .insert(NewLot { label: "Ajuste de prueba".to_string(), adjustment, category_filter: filter })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn simulation_changes_nothing() {
        let db = db().await;
        db.markup_rules().upsert(Category::Frenos, 4000, true).await.unwrap();
        let item = seed_item(&db, "S-1", Category::Frenos, 2500, None).await;

        let report = db
            .engine()
            .simulate(Adjustment::percentage(1000), &[], Utc::now())
            .await
            .unwrap();
        assert_eq!(report.affected_count, 1);
        assert_eq!(report.lines[0].price_before.cents(), 3500);
        assert_eq!(report.lines[0].price_after.cents(), 3850);

        // Catalog untouched: same resolution as before.
        let resolved = db.pricing().resolve_item(&item.id, None, Utc::now()).await.unwrap();
        assert_eq!(resolved.final_price.cents(), 3500);
        assert_eq!(db.items().get_by_id(&item.id).await.unwrap().explicit_sale_price_cents, None);
    }

    #[tokio::test]
    async fn apply_writes_explicit_prices_and_snapshots() {
        let db = db().await;
        db.markup_rules().upsert(Category::Frenos, 4000, true).await.unwrap();
        let item = seed_item(&db, "A-1", Category::Frenos, 2500, None).await;

        let lot = new_lot(&db, Adjustment::percentage(1000), vec![]).await;
        let applied = db.engine().apply(&lot.id, Utc::now()).await.unwrap();

        assert_eq!(applied.state, LotState::Applied);
        assert_eq!(applied.affected_count, Some(1));
        assert!(applied.applied_at.is_some());

        let updated = db.items().get_by_id(&item.id).await.unwrap();
        assert_eq!(updated.explicit_sale_price_cents, Some(3850));

        let snapshots = db.lots().snapshots(&lot.id).await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].price_before_cents, 3500);
        assert_eq!(snapshots[0].price_after_cents, 3850);
    }

    #[tokio::test]
    async fn revert_restores_resolved_prices_exactly() {
        let db = db().await;
        db.markup_rules().upsert(Category::Frenos, 4000, true).await.unwrap();
        let derived = seed_item(&db, "R-1", Category::Frenos, 2500, None).await;
        let explicit = seed_item(&db, "R-2", Category::Frenos, 1000, Some(1999)).await;

        let before_derived =
            db.pricing().resolve_item(&derived.id, None, Utc::now()).await.unwrap().final_price;
        let before_explicit =
            db.pricing().resolve_item(&explicit.id, None, Utc::now()).await.unwrap().final_price;

        let lot = new_lot(&db, Adjustment::fixed_amount(500), vec![]).await;
        db.engine().apply(&lot.id, Utc::now()).await.unwrap();
        let reverted = db.engine().revert(&lot.id).await.unwrap();

        assert_eq!(reverted.state, LotState::Reverted);
        assert!(reverted.reverted_at.is_some());

        let after_derived =
            db.pricing().resolve_item(&derived.id, None, Utc::now()).await.unwrap().final_price;
        let after_explicit =
            db.pricing().resolve_item(&explicit.id, None, Utc::now()).await.unwrap().final_price;
        assert_eq!(after_derived, before_derived);
        assert_eq!(after_explicit, before_explicit);
    }

    #[tokio::test]
    async fn double_apply_and_double_revert_are_rejected() {
        let db = db().await;
        db.markup_rules().upsert(Category::Motor, 2000, true).await.unwrap();
        seed_item(&db, "DD-1", Category::Motor, 1000, None).await;

        let lot = new_lot(&db, Adjustment::percentage(500), vec![]).await;
        db.engine().apply(&lot.id, Utc::now()).await.unwrap();

        let err = db.engine().apply(&lot.id, Utc::now()).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(tarifa_core::CoreError::InvalidLotState { .. })
        ));

        db.engine().revert(&lot.id).await.unwrap();
        let err = db.engine().revert(&lot.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(tarifa_core::CoreError::InvalidLotState { .. })
        ));
    }

    #[tokio::test]
    async fn revert_before_apply_is_rejected() {
        let db = db().await;
        let lot = new_lot(&db, Adjustment::percentage(500), vec![]).await;

        let err = db.engine().revert(&lot.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(tarifa_core::CoreError::InvalidLotState { .. })
        ));
    }

    #[tokio::test]
    async fn category_filter_limits_the_affected_set() {
        let db = db().await;
        db.markup_rules().upsert(Category::Frenos, 2000, true).await.unwrap();
        db.markup_rules().upsert(Category::Motor, 2000, true).await.unwrap();
        let frenos = seed_item(&db, "F-1", Category::Frenos, 1000, None).await;
        let motor = seed_item(&db, "M-1", Category::Motor, 1000, None).await;

        let lot = new_lot(&db, Adjustment::fixed_amount(100), vec![Category::Frenos]).await;
        let applied = db.engine().apply(&lot.id, Utc::now()).await.unwrap();
        assert_eq!(applied.affected_count, Some(1));

        assert_eq!(
            db.items().get_by_id(&frenos.id).await.unwrap().explicit_sale_price_cents,
            Some(1300)
        );
        assert_eq!(db.items().get_by_id(&motor.id).await.unwrap().explicit_sale_price_cents, None);
    }

    #[tokio::test]
    async fn unresolvable_items_are_skipped_not_failed() {
        let db = db().await;
        db.markup_rules().upsert(Category::Frenos, 2000, true).await.unwrap();
        seed_item(&db, "OK-1", Category::Frenos, 1000, None).await;
        let orphan = seed_item(&db, "NO-1", Category::Motor, 1000, None).await;

        let lot = new_lot(&db, Adjustment::percentage(1000), vec![]).await;
        let applied = db.engine().apply(&lot.id, Utc::now()).await.unwrap();

        assert_eq!(applied.affected_count, Some(1));
        assert_eq!(db.items().get_by_id(&orphan.id).await.unwrap().explicit_sale_price_cents, None);
    }

    #[tokio::test]
    async fn affected_set_is_computed_at_apply_time() {
        let db = db().await;
        db.markup_rules().upsert(Category::Frenos, 2000, true).await.unwrap();
        seed_item(&db, "T-1", Category::Frenos, 1000, None).await;

        let lot = new_lot(&db, Adjustment::percentage(1000), vec![]).await;
        let report = db.engine().simulate_lot(&lot.id, Utc::now()).await.unwrap();
        assert_eq!(report.affected_count, 1);
        assert_eq!(db.lots().get_by_id(&lot.id).await.unwrap().state, LotState::Simulated);

        // Catalog grows between simulate and apply.
        seed_item(&db, "T-2", Category::Frenos, 2000, None).await;

        let applied = db.engine().apply(&lot.id, Utc::now()).await.unwrap();
        assert_eq!(applied.affected_count, Some(2));
    }

    #[tokio::test]
    async fn apply_snapshots_prices_written_after_simulate() {
        let db = db().await;
        db.markup_rules().upsert(Category::Frenos, 2000, true).await.unwrap();
        let item = seed_item(&db, "W-1", Category::Frenos, 1000, None).await;

        let lot = new_lot(&db, Adjustment::percentage(1000), vec![]).await;
        let report = db.engine().simulate_lot(&lot.id, Utc::now()).await.unwrap();
        assert_eq!(report.lines[0].price_before.cents(), 1200);

        // An operator pins a price between simulate and apply.
        db.items().set_explicit_price(&item.id, Some(2000)).await.unwrap();

        db.engine().apply(&lot.id, Utc::now()).await.unwrap();

        // The snapshot holds the price from immediately before apply,
        // not the stale simulated one, and the item gets +10% of it.
        let snapshots = db.lots().snapshots(&lot.id).await.unwrap();
        assert_eq!(snapshots[0].price_before_cents, 2000);
        assert_eq!(snapshots[0].price_after_cents, 2200);
        assert_eq!(db.items().get_by_id(&item.id).await.unwrap().explicit_sale_price_cents, Some(2200));

        db.engine().revert(&lot.id).await.unwrap();
        assert_eq!(db.items().get_by_id(&item.id).await.unwrap().explicit_sale_price_cents, Some(2000));
    }

    #[tokio::test]
    async fn simulate_after_apply_is_rejected() {
        let db = db().await;
        db.markup_rules().upsert(Category::Frenos, 2000, true).await.unwrap();
        seed_item(&db, "SA-1", Category::Frenos, 1000, None).await;

        let lot = new_lot(&db, Adjustment::percentage(500), vec![]).await;
        db.engine().apply(&lot.id, Utc::now()).await.unwrap();

        let err = db.engine().simulate_lot(&lot.id, Utc::now()).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(tarifa_core::CoreError::InvalidLotState { .. })
        ));
    }

    #[tokio::test]
    async fn negative_adjustment_clamps_at_zero_through_apply() {
        let db = db().await;
        seed_item(&db, "Z-1", Category::Frenos, 100, Some(500)).await;

        let lot = new_lot(&db, Adjustment::fixed_amount(-1_000), vec![]).await;
        db.engine().apply(&lot.id, Utc::now()).await.unwrap();

        let snapshots = db.lots().snapshots(&lot.id).await.unwrap();
        assert_eq!(snapshots[0].price_before_cents, 500);
        assert_eq!(snapshots[0].price_after_cents, 0);
    }
}

//! # Repricing Lot Repository
//!
//! Database operations for lot records and their apply-time snapshots.
//!
//! State transitions (apply, revert) are NOT here: they belong to the
//! repricing engine, which runs them inside serialized transactions.
//! This repository covers creation and reads.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tarifa_core::validation::{validate_adjustment, validate_lot_label};
use tarifa_core::{Adjustment, Category, LotState, RepricingLot};

/// Parameters for creating a lot.
#[derive(Debug, Clone)]
pub struct NewLot {
    pub label: String,
    pub adjustment: Adjustment,
    /// Empty means every category.
    pub category_filter: Vec<Category>,
}

/// One before/after price pair captured at apply time.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LotSnapshot {
    pub lot_id: String,
    pub item_id: String,
    pub price_before_cents: i64,
    pub price_after_cents: i64,
}

/// Raw lot row; string columns are parsed into domain enums on the way
/// out.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LotRow {
    pub id: String,
    pub label: String,
    pub adjustment_type: String,
    pub adjustment_value: i64,
    pub category_filter: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub applied_at: Option<DateTime<Utc>>,
    pub reverted_at: Option<DateTime<Utc>>,
    pub affected_count: Option<i64>,
}

impl TryFrom<LotRow> for RepricingLot {
    type Error = DbError;

    fn try_from(row: LotRow) -> Result<Self, Self::Error> {
        let kind = row
            .adjustment_type
            .parse()
            .map_err(|e| DbError::Internal(format!("lot {}: {e}", row.id)))?;
        let state: LotState = row
            .state
            .parse()
            .map_err(|e| DbError::Internal(format!("lot {}: {e}", row.id)))?;
        let category_filter: Vec<Category> = serde_json::from_str(&row.category_filter)
            .map_err(|e| DbError::Internal(format!("lot {}: bad category_filter: {e}", row.id)))?;

        Ok(RepricingLot {
            id: row.id,
            label: row.label,
            adjustment: Adjustment { kind, value: row.adjustment_value },
            category_filter,
            state,
            created_at: row.created_at,
            applied_at: row.applied_at,
            reverted_at: row.reverted_at,
            affected_count: row.affected_count,
        })
    }
}

/// Repository for repricing lot records.
#[derive(Debug, Clone)]
pub struct LotRepository {
    pool: SqlitePool,
}

impl LotRepository {
    /// Creates a new LotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LotRepository { pool }
    }

    /// Creates a lot in DRAFT state.
    pub async fn insert(&self, new: NewLot) -> DbResult<RepricingLot> {
        validate_lot_label(&new.label).map_err(tarifa_core::CoreError::from)?;
        validate_adjustment(&new.adjustment).map_err(tarifa_core::CoreError::from)?;

        let lot = RepricingLot {
            id: Uuid::new_v4().to_string(),
            label: new.label.trim().to_string(),
            adjustment: new.adjustment,
            category_filter: new.category_filter,
            state: LotState::Draft,
            created_at: Utc::now(),
            applied_at: None,
            reverted_at: None,
            affected_count: None,
        };

        let filter_json = serde_json::to_string(&lot.category_filter)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO repricing_lots
                (id, label, adjustment_type, adjustment_value, category_filter,
                 state, created_at, applied_at, reverted_at, affected_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, NULL, NULL)
            "#,
        )
        .bind(&lot.id)
        .bind(&lot.label)
        .bind(lot.adjustment.kind.as_str())
        .bind(lot.adjustment.value)
        .bind(&filter_json)
        .bind(lot.state.as_str())
        .bind(lot.created_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %lot.id, label = %lot.label, "Repricing lot created");
        Ok(lot)
    }

    /// Fetches a lot by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<RepricingLot> {
        let row = sqlx::query_as::<_, LotRow>("SELECT * FROM repricing_lots WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("RepricingLot", id))?;

        row.try_into()
    }

    /// Lists lots, newest first.
    pub async fn list(&self) -> DbResult<Vec<RepricingLot>> {
        let rows = sqlx::query_as::<_, LotRow>(
            "SELECT * FROM repricing_lots ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RepricingLot::try_from).collect()
    }

    /// Lists the before/after snapshots captured when a lot was applied.
    pub async fn snapshots(&self, lot_id: &str) -> DbResult<Vec<LotSnapshot>> {
        let rows = sqlx::query_as::<_, LotSnapshot>(
            "SELECT * FROM repricing_lot_snapshots WHERE lot_id = ?1 ORDER BY item_id",
        )
        .bind(lot_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn insert_and_fetch_preserves_adjustment_and_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lot = db
            .lots()
            .insert(NewLot {
                label: "Subida proveedor Q3".to_string(),
                adjustment: Adjustment::percentage(800),
                category_filter: vec![Category::Frenos, Category::Motor],
            })
            .await
            .unwrap();

        let fetched = db.lots().get_by_id(&lot.id).await.unwrap();
        assert_eq!(fetched.state, LotState::Draft);
        assert_eq!(fetched.adjustment, Adjustment::percentage(800));
        assert_eq!(fetched.category_filter, vec![Category::Frenos, Category::Motor]);
        assert_eq!(fetched.affected_count, None);
    }

    #[tokio::test]
    async fn empty_label_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .lots()
            .insert(NewLot {
                label: "  ".to_string(),
                adjustment: Adjustment::fixed_amount(100),
                category_filter: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
    }

    #[tokio::test]
    async fn listing_orders_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for label in ["uno", "dos", "tres"] {
            db.lots()
                .insert(NewLot {
                    label: label.to_string(),
                    adjustment: Adjustment::fixed_amount(50),
                    category_filter: vec![],
                })
                .await
                .unwrap();
        }

        let lots = db.lots().list().await.unwrap();
        assert_eq!(lots.len(), 3);
    }

    #[tokio::test]
    async fn missing_lot_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.lots().get_by_id("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

//! # Price List Repository
//!
//! Database operations for price lists and their per-item overrides.
//!
//! A list is a header (type, priority, validity window) plus any number
//! of `(item_id, override_price_cents)` rows. Which list wins for an
//! item is decided by the resolver, never here.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tarifa_core::validation::{validate_name, validate_override_cents, validate_validity_window};
use tarifa_core::{PriceListHeader, PriceListItem, PriceListType};

/// Parameters for creating a price list.
#[derive(Debug, Clone)]
pub struct NewPriceList {
    pub name: String,
    pub list_type: PriceListType,
    pub priority: i64,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

/// Repository for price list operations.
#[derive(Debug, Clone)]
pub struct PriceListRepository {
    pool: SqlitePool,
}

impl PriceListRepository {
    /// Creates a new PriceListRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PriceListRepository { pool }
    }

    /// Creates a price list.
    pub async fn insert(&self, new: NewPriceList) -> DbResult<PriceListHeader> {
        validate_name("name", &new.name).map_err(tarifa_core::CoreError::from)?;
        validate_validity_window(new.valid_from, new.valid_to)
            .map_err(tarifa_core::CoreError::from)?;

        let header = PriceListHeader {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            list_type: new.list_type,
            priority: new.priority,
            valid_from: new.valid_from,
            valid_to: new.valid_to,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO price_lists
                (id, name, list_type, priority, valid_from, valid_to, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&header.id)
        .bind(&header.name)
        .bind(header.list_type)
        .bind(header.priority)
        .bind(header.valid_from)
        .bind(header.valid_to)
        .bind(header.is_active)
        .bind(header.created_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %header.id, name = %header.name, "Price list created");
        Ok(header)
    }

    /// Fetches a list header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<PriceListHeader> {
        sqlx::query_as::<_, PriceListHeader>("SELECT * FROM price_lists WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("PriceList", id))
    }

    /// Lists all headers in resolution order (priority, then id).
    pub async fn list(&self) -> DbResult<Vec<PriceListHeader>> {
        let lists = sqlx::query_as::<_, PriceListHeader>(
            "SELECT * FROM price_lists ORDER BY priority, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(lists)
    }

    /// Sets or replaces the override price for an item within a list.
    pub async fn set_override(&self, list_id: &str, item_id: &str, price_cents: i64) -> DbResult<PriceListItem> {
        validate_override_cents(price_cents).map_err(tarifa_core::CoreError::from)?;

        // Existence check first: a FK error from the insert would not say
        // which side is missing.
        self.get_by_id(list_id).await?;

        sqlx::query(
            r#"
            INSERT INTO price_list_items (list_id, item_id, override_price_cents)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(list_id, item_id) DO UPDATE SET
                override_price_cents = excluded.override_price_cents
            "#,
        )
        .bind(list_id)
        .bind(item_id)
        .bind(price_cents)
        .execute(&self.pool)
        .await?;

        Ok(PriceListItem {
            list_id: list_id.to_string(),
            item_id: item_id.to_string(),
            override_price_cents: price_cents,
        })
    }

    /// Removes an item's override from a list.
    pub async fn remove_override(&self, list_id: &str, item_id: &str) -> DbResult<()> {
        let result =
            sqlx::query("DELETE FROM price_list_items WHERE list_id = ?1 AND item_id = ?2")
                .bind(list_id)
                .bind(item_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PriceListItem", format!("{list_id}/{item_id}")));
        }
        Ok(())
    }

    /// Lists a list's overrides, ordered by item id.
    pub async fn overrides(&self, list_id: &str) -> DbResult<Vec<PriceListItem>> {
        let items = sqlx::query_as::<_, PriceListItem>(
            "SELECT * FROM price_list_items WHERE list_id = ?1 ORDER BY item_id",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Activates or deactivates a list.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE price_lists SET is_active = ?1 WHERE id = ?2")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PriceList", id));
        }
        Ok(())
    }
}

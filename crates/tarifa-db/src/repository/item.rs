//! # Item Repository
//!
//! Database operations for catalog items.
//!
//! ## Key Operations
//! - CRUD for parts
//! - Explicit sale price updates (operator edits and lot apply/revert)
//! - Active-item listing for the dashboard and the repricing engine

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tarifa_core::validation::{validate_name, validate_price_cents};
use tarifa_core::{Category, Item};

/// Parameters for creating a catalog item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub category: Category,
    pub purchase_cost_cents: i64,
    pub explicit_sale_price_cents: Option<i64>,
}

/// Repository for catalog item operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Inserts a new catalog item, returning it with generated id and
    /// timestamps.
    pub async fn insert(&self, new: NewItem) -> DbResult<Item> {
        validate_name("sku", &new.sku).map_err(tarifa_core::CoreError::from)?;
        validate_name("name", &new.name).map_err(tarifa_core::CoreError::from)?;
        validate_price_cents("purchase_cost_cents", new.purchase_cost_cents)
            .map_err(tarifa_core::CoreError::from)?;
        if let Some(price) = new.explicit_sale_price_cents {
            validate_price_cents("explicit_sale_price_cents", price)
                .map_err(tarifa_core::CoreError::from)?;
        }

        let item = Item {
            id: Uuid::new_v4().to_string(),
            sku: new.sku.trim().to_string(),
            name: new.name.trim().to_string(),
            category: new.category,
            purchase_cost_cents: new.purchase_cost_cents,
            explicit_sale_price_cents: new.explicit_sale_price_cents,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO items
                (id, sku, name, category, purchase_cost_cents,
                 explicit_sale_price_cents, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sku)
        .bind(&item.name)
        .bind(item.category)
        .bind(item.purchase_cost_cents)
        .bind(item.explicit_sale_price_cents)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %item.id, sku = %item.sku, "Item inserted");
        Ok(item)
    }

    /// Fetches an item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Lists every active item, ordered by id for stable output.
    pub async fn list_active(&self) -> DbResult<Vec<Item>> {
        let items =
            sqlx::query_as::<_, Item>("SELECT * FROM items WHERE is_active = 1 ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(items)
    }

    /// Counts active items.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Sets or clears an item's explicit sale price.
    pub async fn set_explicit_price(&self, id: &str, price_cents: Option<i64>) -> DbResult<Item> {
        if let Some(price) = price_cents {
            validate_price_cents("explicit_sale_price_cents", price)
                .map_err(tarifa_core::CoreError::from)?;
        }

        let result = sqlx::query(
            "UPDATE items SET explicit_sale_price_cents = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(price_cents)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.get_by_id(id).await
    }

    /// Deactivates an item. Inactive items keep their history but are
    /// excluded from pricing, dashboards, and repricing lots.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE items SET is_active = 0, updated_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }
        Ok(())
    }
}

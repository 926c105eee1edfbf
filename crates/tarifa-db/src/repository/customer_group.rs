//! # Customer Group Repository
//!
//! Database operations for discount groups and their rosters.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tarifa_core::validation::{validate_discount_bps, validate_name};
use tarifa_core::CustomerGroup;

/// Repository for customer group operations.
#[derive(Debug, Clone)]
pub struct CustomerGroupRepository {
    pool: SqlitePool,
}

impl CustomerGroupRepository {
    /// Creates a new CustomerGroupRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerGroupRepository { pool }
    }

    /// Creates a customer group.
    pub async fn insert(&self, name: &str, discount_bps: u32) -> DbResult<CustomerGroup> {
        validate_name("name", name).map_err(tarifa_core::CoreError::from)?;
        validate_discount_bps(discount_bps).map_err(tarifa_core::CoreError::from)?;

        let group = CustomerGroup {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            discount_bps,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO customer_groups (id, name, discount_bps, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&group.id)
        .bind(&group.name)
        .bind(group.discount_bps)
        .bind(group.is_active)
        .bind(group.created_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %group.id, name = %group.name, "Customer group created");
        Ok(group)
    }

    /// Fetches a group by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<CustomerGroup> {
        sqlx::query_as::<_, CustomerGroup>("SELECT * FROM customer_groups WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("CustomerGroup", id))
    }

    /// Lists all groups in resolution order (id ascending).
    pub async fn list(&self) -> DbResult<Vec<CustomerGroup>> {
        let groups = sqlx::query_as::<_, CustomerGroup>("SELECT * FROM customer_groups ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    /// Adds a customer to a group. Adding twice is a no-op.
    pub async fn add_member(&self, group_id: &str, customer_id: &str) -> DbResult<()> {
        self.get_by_id(group_id).await?;

        sqlx::query(
            r#"
            INSERT INTO customer_group_members (group_id, customer_id, added_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(group_id, customer_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(customer_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a customer from a group.
    pub async fn remove_member(&self, group_id: &str, customer_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "DELETE FROM customer_group_members WHERE group_id = ?1 AND customer_id = ?2",
        )
        .bind(group_id)
        .bind(customer_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("GroupMember", format!("{group_id}/{customer_id}")));
        }
        Ok(())
    }

    /// Lists a group's member IDs.
    pub async fn members(&self, group_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT customer_id FROM customer_group_members WHERE group_id = ?1 ORDER BY customer_id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Activates or deactivates a group.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE customer_groups SET is_active = ?1 WHERE id = ?2")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomerGroup", id));
        }
        Ok(())
    }
}
